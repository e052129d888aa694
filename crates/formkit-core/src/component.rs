//! The component tree of a form.
//!
//! Components own their property tables; containers additionally carry the
//! layout state and the statements that lay their children out. Each
//! component has exactly one canonical expression in the code structure,
//! which is what code refers to when it mentions the component.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::id::{ComponentId, ExprId, StmtId, VarId};
use crate::reference::DesignReference;
use crate::types::TypeName;
use crate::value::{TypedValue, Value};

/// Layout kinds with a fixed, known code shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardLayout {
    Border,
    Flow,
    Box,
    GridBag,
    Grid,
    Card,
    Absolute,
    /// Absolute positioning without a layout manager.
    Null,
    JScrollPane,
    ScrollPane,
    JSplitPane,
    JTabbedPane,
    JLayeredPane,
    ToolBar,
}

/// How a container lays out its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "layout", rename_all = "snake_case")]
pub enum LayoutState {
    /// Free-design layout, maintained by the layout designer.
    Natural,
    Standard(StandardLayout),
    /// Layout described only by the container's layout code.
    FromCode,
    /// Nothing known; children are added without constraints.
    Unknown,
}

/// A property's stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyValue {
    Value {
        #[serde(rename = "type")]
        ty: TypeName,
        value: Value,
    },
    /// Mirrors another component; `resolved` is filled in after load.
    Connected {
        #[serde(rename = "type")]
        ty: TypeName,
        reference: DesignReference,
        resolved: Option<Value>,
    },
}

impl PropertyValue {
    pub fn plain(ty: TypeName, value: Value) -> Self {
        PropertyValue::Value { ty, value }
    }

    /// The property type the value was stored as.
    pub fn ty(&self) -> &TypeName {
        match self {
            PropertyValue::Value { ty, .. } | PropertyValue::Connected { ty, .. } => ty,
        }
    }

    /// The value a reader of this property currently observes.
    pub fn current(&self) -> Option<&Value> {
        match self {
            PropertyValue::Value { value, .. } => Some(value),
            PropertyValue::Connected { resolved, .. } => resolved.as_ref(),
        }
    }
}

/// Container-only component data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerData {
    pub layout: LayoutState,
    /// Layout manager properties, by current property name.
    pub layout_properties: IndexMap<String, Value>,
    /// Statements setting up the layout and adding the children, in order.
    pub layout_code: Vec<StmtId>,
    /// The expression children are actually added to.
    pub delegate: ExprId,
    pub children: Vec<ComponentId>,
}

/// One component of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub class: TypeName,
    pub parent: Option<ComponentId>,
    pub expression: ExprId,
    pub variable: Option<VarId>,
    pub properties: IndexMap<String, PropertyValue>,
    pub synthetic: IndexMap<String, TypedValue>,
    pub aux: IndexMap<String, TypedValue>,
    pub container: Option<ContainerData>,
}

impl Component {
    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }

    pub fn children(&self) -> &[ComponentId] {
        self.container
            .as_ref()
            .map(|c| c.children.as_slice())
            .unwrap_or(&[])
    }
}

/// Name-based lookup of component expressions, as used by the code codec.
pub trait ComponentLookup {
    /// The canonical expression of the named component; `"."` names the
    /// top component.
    fn expression_for(&self, name: &str) -> Option<ExprId>;

    /// The name code uses for the component; `"."` for the top component.
    fn reference_name(&self, id: ComponentId) -> Option<&str>;
}

// ---------------------------------------------------------------------------
// ComponentTree
// ---------------------------------------------------------------------------

/// All components of a form, indexed by ID and by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentTree {
    components: Vec<Component>,
    #[serde(skip)]
    names: HashMap<String, ComponentId>,
    /// Components outside the visual hierarchy, in load order.
    non_visual: Vec<ComponentId>,
}

pub const TOP_COMPONENT: ComponentId = ComponentId(0);

impl ComponentTree {
    pub fn get(&self, id: ComponentId) -> Result<&Component, ModelError> {
        self.components
            .get(id.index())
            .ok_or(ModelError::ComponentNotFound { id })
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Result<&mut Component, ModelError> {
        self.components
            .get_mut(id.index())
            .ok_or(ModelError::ComponentNotFound { id })
    }

    pub fn id_of(&self, name: &str) -> Option<ComponentId> {
        self.names.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Component> {
        self.id_of(name).and_then(|id| self.get(id).ok())
    }

    pub fn top(&self) -> ComponentId {
        TOP_COMPONENT
    }

    pub fn non_visual(&self) -> &[ComponentId] {
        &self.non_visual
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Insert a new component; `parent` must be a container, and `None`
    /// files the component under the non-visual components.
    pub(crate) fn insert(&mut self, component: Component) -> Result<ComponentId, ModelError> {
        if self.names.contains_key(&component.name) {
            return Err(ModelError::DuplicateComponent {
                name: component.name,
            });
        }
        let id = component.id;
        match component.parent {
            Some(parent) => {
                let parent = self.get_mut(parent)?;
                let name = parent.name.clone();
                parent
                    .container
                    .as_mut()
                    .ok_or(ModelError::NotAContainer { name })?
                    .children
                    .push(id);
            }
            None if id != TOP_COMPONENT => self.non_visual.push(id),
            None => {}
        }
        self.names.insert(component.name.clone(), id);
        self.components.push(component);
        Ok(id)
    }

    pub(crate) fn next_id(&self) -> ComponentId {
        ComponentId(self.components.len() as u32)
    }

    /// Rebuild the name index after deserialization.
    pub fn reindex(&mut self) {
        self.names = self
            .components
            .iter()
            .map(|c| (c.name.clone(), c.id))
            .collect();
    }
}

impl ComponentLookup for ComponentTree {
    fn expression_for(&self, name: &str) -> Option<ExprId> {
        if name == "." {
            return self.get(TOP_COMPONENT).ok().map(|c| c.expression);
        }
        self.by_name(name).map(|c| c.expression)
    }

    fn reference_name(&self, id: ComponentId) -> Option<&str> {
        if id == TOP_COMPONENT {
            return Some(".");
        }
        self.get(id).ok().map(|c| c.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connected_value_is_observed_once_resolved() {
        let mut value = PropertyValue::Connected {
            ty: TypeName::string(),
            reference: DesignReference::property("jTextField1", "text"),
            resolved: None,
        };
        assert_eq!(value.current(), None);
        if let PropertyValue::Connected { resolved, .. } = &mut value {
            *resolved = Some(Value::Str("hello".into()));
        }
        assert_eq!(value.current(), Some(&Value::Str("hello".into())));
        assert_eq!(
            PropertyValue::plain(TypeName::int(), Value::Int(1)).current(),
            Some(&Value::Int(1))
        );
    }

    #[test]
    fn layout_state_serializes_with_tag() {
        let json = serde_json::to_string(&LayoutState::Standard(StandardLayout::GridBag)).unwrap();
        assert_eq!(json, r#"{"state":"standard","layout":"GridBag"}"#);
        let json = serde_json::to_string(&LayoutState::Natural).unwrap();
        assert_eq!(json, r#"{"state":"natural"}"#);
    }
}
