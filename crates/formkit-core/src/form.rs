//! The form model: component tree, code structure and version state of one
//! design document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::code::CodeStructure;
use crate::component::{
    Component, ComponentTree, ContainerData, LayoutState, PropertyValue, TOP_COMPONENT,
};
use crate::error::ModelError;
use crate::id::{ComponentId, ExprId};
use crate::types::TypeName;
use crate::variable::VariableKind;
use crate::version::VersionLevels;

/// One loaded or newly created form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormModel {
    pub name: String,
    pub base_class: TypeName,
    pub components: ComponentTree,
    pub code: CodeStructure,
    pub version: VersionLevels,
}

impl FormModel {
    /// A form whose top container is an instance of `base_class`.
    pub fn new(name: &str, base_class: TypeName) -> Self {
        let mut code = CodeStructure::new();
        let expression = code.create_component_reference(TOP_COMPONENT, base_class.clone());
        let mut components = ComponentTree::default();
        let top = Component {
            id: TOP_COMPONENT,
            name: name.to_string(),
            class: base_class.clone(),
            parent: None,
            expression,
            variable: None,
            properties: IndexMap::new(),
            synthetic: IndexMap::new(),
            aux: IndexMap::new(),
            container: Some(empty_container(expression)),
        };
        // A fresh tree has no names to collide with.
        let _ = components.insert(top);
        FormModel {
            name: name.to_string(),
            base_class,
            components,
            code,
            version: VersionLevels::default(),
        }
    }

    pub fn top(&self) -> ComponentId {
        TOP_COMPONENT
    }

    /// Add a component with its canonical expression and a private field
    /// variable named after it.
    pub fn add_component(
        &mut self,
        parent: Option<ComponentId>,
        name: &str,
        class: TypeName,
        is_container: bool,
    ) -> Result<ComponentId, ModelError> {
        if self.components.id_of(name).is_some() {
            return Err(ModelError::DuplicateComponent {
                name: name.to_string(),
            });
        }
        if let Some(parent) = parent {
            let parent = self.components.get(parent)?;
            if !parent.is_container() {
                return Err(ModelError::NotAContainer {
                    name: parent.name.clone(),
                });
            }
        }

        let id = self.components.next_id();
        let variable = self.code.create_variable(
            VariableKind::FIELD | VariableKind::PRIVATE,
            class.clone(),
            name,
        )?;
        let expression = self.code.create_component_reference(id, class.clone());
        self.code.attach_expression_to_variable(expression, variable)?;

        self.components.insert(Component {
            id,
            name: name.to_string(),
            class,
            parent,
            expression,
            variable: Some(variable),
            properties: IndexMap::new(),
            synthetic: IndexMap::new(),
            aux: IndexMap::new(),
            container: is_container.then(|| empty_container(expression)),
        })
    }

    pub fn component(&self, id: ComponentId) -> Result<&Component, ModelError> {
        self.components.get(id)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Result<&mut Component, ModelError> {
        self.components.get_mut(id)
    }

    pub fn container_mut(&mut self, id: ComponentId) -> Result<&mut ContainerData, ModelError> {
        let component = self.components.get_mut(id)?;
        let name = component.name.clone();
        component
            .container
            .as_mut()
            .ok_or(ModelError::NotAContainer { name })
    }

    /// Redirect children of a container to another expression, such as a
    /// window's content pane.
    pub fn set_container_delegate(&mut self, id: ComponentId, delegate: ExprId) -> Result<(), ModelError> {
        self.code.expression(delegate)?;
        self.container_mut(id)?.delegate = delegate;
        Ok(())
    }

    pub fn set_layout(&mut self, id: ComponentId, layout: LayoutState) -> Result<(), ModelError> {
        self.container_mut(id)?.layout = layout;
        Ok(())
    }

    pub fn set_property(
        &mut self,
        id: ComponentId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), ModelError> {
        self.components
            .get_mut(id)?
            .properties
            .insert(name.to_string(), value);
        Ok(())
    }

    /// The stored value of a property, looked up by component name.
    pub fn property(&self, component: &str, property: &str) -> Option<&PropertyValue> {
        self.components
            .by_name(component)
            .and_then(|c| c.properties.get(property))
    }

    /// Visual components in depth-first order, the top container first.
    pub fn visual_components(&self) -> Vec<ComponentId> {
        let mut order = Vec::new();
        let mut stack = vec![TOP_COMPONENT];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Ok(component) = self.components.get(id) {
                stack.extend(component.children().iter().rev());
            }
        }
        order
    }
}

fn empty_container(delegate: ExprId) -> ContainerData {
    ContainerData {
        layout: LayoutState::Unknown,
        layout_properties: IndexMap::new(),
        layout_code: Vec::new(),
        delegate,
        children: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Origin;
    use crate::component::ComponentLookup;
    use crate::value::Value;

    fn panel_form() -> FormModel {
        FormModel::new("MyPanel", TypeName::new("javax.swing.JPanel"))
    }

    #[test]
    fn new_form_has_top_container() {
        let form = panel_form();
        let top = form.component(form.top()).unwrap();
        assert_eq!(top.name, "MyPanel");
        assert!(top.is_container());
        assert_eq!(top.variable, None);
        assert_eq!(form.components.expression_for("."), Some(top.expression));
        assert_eq!(form.components.reference_name(form.top()), Some("."));
    }

    #[test]
    fn components_get_canonical_expression_and_field() {
        let mut form = panel_form();
        let top = form.top();
        let button = form
            .add_component(Some(top), "jButton1", TypeName::new("javax.swing.JButton"), false)
            .unwrap();
        let component = form.component(button).unwrap();
        let expr = form.code.expression(component.expression).unwrap();
        assert!(matches!(expr.origin, Origin::Component { component, .. } if component == button));

        let var = form.code.variable(component.variable.unwrap()).unwrap();
        assert_eq!(var.name, "jButton1");
        assert_eq!(var.kind, VariableKind::FIELD | VariableKind::PRIVATE);
        assert_eq!(form.component(top).unwrap().children(), &[button]);
        assert_eq!(form.components.expression_for("jButton1"), Some(component.expression));
    }

    #[test]
    fn duplicate_names_and_non_containers_are_rejected() {
        let mut form = panel_form();
        let top = form.top();
        let label = form
            .add_component(Some(top), "jLabel1", TypeName::new("javax.swing.JLabel"), false)
            .unwrap();
        let err = form
            .add_component(Some(top), "jLabel1", TypeName::new("javax.swing.JLabel"), false)
            .unwrap_err();
        assert_eq!(err, ModelError::DuplicateComponent { name: "jLabel1".into() });

        let err = form
            .add_component(Some(label), "jLabel2", TypeName::new("javax.swing.JLabel"), false)
            .unwrap_err();
        assert_eq!(err, ModelError::NotAContainer { name: "jLabel1".into() });
        assert_eq!(form.components.len(), 2);
    }

    #[test]
    fn non_visual_components_have_no_parent() {
        let mut form = panel_form();
        let group = form
            .add_component(None, "buttonGroup1", TypeName::new("javax.swing.ButtonGroup"), false)
            .unwrap();
        assert_eq!(form.components.non_visual(), &[group]);
        assert_eq!(form.visual_components(), vec![form.top()]);
    }

    #[test]
    fn visual_order_is_depth_first() {
        let mut form = panel_form();
        let top = form.top();
        let inner = form
            .add_component(Some(top), "jPanel1", TypeName::new("javax.swing.JPanel"), true)
            .unwrap();
        let a = form
            .add_component(Some(inner), "a", TypeName::new("javax.swing.JLabel"), false)
            .unwrap();
        let b = form
            .add_component(Some(top), "b", TypeName::new("javax.swing.JLabel"), false)
            .unwrap();
        assert_eq!(form.visual_components(), vec![top, inner, a, b]);
    }

    #[test]
    fn properties_are_looked_up_by_component_name() {
        let mut form = panel_form();
        let top = form.top();
        let label = form
            .add_component(Some(top), "jLabel1", TypeName::new("javax.swing.JLabel"), false)
            .unwrap();
        form.set_property(label, "text", PropertyValue::plain(TypeName::string(), Value::Str("Name:".into())))
            .unwrap();
        assert_eq!(
            form.property("jLabel1", "text").and_then(PropertyValue::current),
            Some(&Value::Str("Name:".into()))
        );
        assert!(form.property("jLabel1", "icon").is_none());
    }
}
