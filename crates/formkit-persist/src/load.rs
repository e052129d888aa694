//! Form loader: persisted document to [`FormModel`].
//!
//! Loading runs in three phases over one [`Pass`]:
//!
//! 1. the component tree with properties, synthetic properties and aux
//!    values; connection-valued properties are only collected,
//! 2. per container, the legacy layout and constraints or the layout code,
//!    children before their parent's layout code so that back-references
//!    resolve in document order,
//! 3. the collected connected properties, in dependency order.
//!
//! Only a bad root, version or base class aborts the load. Everything else
//! is recorded as a non-fatal error and the element is skipped.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use formkit_core::types::CONTAINER as CONTAINER_CLASS;
use formkit_core::{
    CodeStructure, ComponentId, ExprId, FormFeature, FormModel, LayoutState, ModelError, Origin,
    PropertyKey, PropertyValue, StandardLayout, StmtId, SymbolResolver, TypeName, TypedValue, Value, VersionLevels,
};

use crate::codec::{required, required_child, DecodeError, Decoder};
use crate::config::LoadOptions;
use crate::connected::ConnectedProperties;
use crate::document::{parse_document, Element};
use crate::error::{LoadPath, NonFatalError, PathSegment, PersistError};
use crate::forminfo::class_for_form_info;
use crate::legacy::layout::recognize_layout;
use crate::legacy::{
    convert_constraints, convert_layout, default_component_code, ConstraintConversion, LayoutConversion,
    LayoutTarget,
};
use crate::names::*;
use crate::pass::{CodeMode, Pass};
use crate::values::{read_reference, read_value};

/// A loaded form and the problems met on the way.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedForm {
    pub form: FormModel,
    pub errors: Vec<NonFatalError>,
}

const DEFAULT_FORM_NAME: &str = "Form";

/// Window classes whose children go into a content pane.
const WINDOW_CLASSES: [&str; 4] = [
    "javax.swing.JFrame",
    "javax.swing.JDialog",
    "javax.swing.JInternalFrame",
    "javax.swing.JApplet",
];

/// Whether `text` is a form document. Only the root element is checked.
pub fn can_load(text: &str) -> bool {
    parse_document(text).is_ok_and(|root| root.name == FORM)
}

/// Load a form document.
pub fn load_form<S: SymbolResolver + ?Sized>(
    text: &str,
    symbols: &S,
    options: &LoadOptions,
) -> Result<LoadedForm, PersistError> {
    let root = parse_document(text)?;
    if root.name != FORM {
        return Err(PersistError::MissingFormElement { found: root.name });
    }
    let version = VersionLevels::negotiate(root.attr(ATTR_VERSION), root.attr(ATTR_MAX_VERSION))
        .map_err(|err| match err {
            ModelError::UnsupportedVersion { token } => PersistError::UnsupportedVersion { token },
            other => PersistError::Model(other),
        })?;
    let base_class = base_class(&root, symbols, options)?;
    let name = options.form_name.as_deref().unwrap_or(DEFAULT_FORM_NAME);
    debug!(form = name, version = %version.current(), base_class = %base_class, "loading form");

    let mut form = FormModel::new(name, base_class);
    form.version = version;
    let mut loader = Loader {
        symbols,
        form,
        pass: Pass::new(CodeMode::Flow),
        connected: ConnectedProperties::new(),
    };

    let top = loader.load_top(&root);
    loader.load_layout(&top);
    loader.resolve_connected();
    loader.form.version.clamp();

    let Loader { form, pass, .. } = loader;
    let errors = pass.into_errors();
    debug!(
        components = form.components.len(),
        expressions = form.code.expression_count(),
        errors = errors.len(),
        "form loaded"
    );
    Ok(LoadedForm { form, errors })
}

fn base_class<S: SymbolResolver + ?Sized>(
    root: &Element,
    symbols: &S,
    options: &LoadOptions,
) -> Result<TypeName, PersistError> {
    let name = match options.base_class.as_deref() {
        Some(name) => name,
        None => root
            .attr(ATTR_TYPE)
            .and_then(class_for_form_info)
            .ok_or(PersistError::UnknownBaseClass)?,
    };
    symbols
        .resolve_class(name)
        .filter(|class| symbols.is_subclass(class, &TypeName::new(CONTAINER_CLASS)))
        .ok_or_else(|| PersistError::InvalidBaseClass(name.to_string()))
}

const CONTENT_PANE_GETTER: &str = "getContentPane";

/// A container persisted in the current format gets its window delegate
/// from its layout code.
fn defers_delegate(element: &Element) -> bool {
    element.child(LAYOUT_CODE).is_some() && element.child(LAYOUT).is_none()
}

/// The `getContentPane()` call on `container` that `statements` add to.
fn decoded_delegate(code: &CodeStructure, container: ExprId, statements: &[StmtId]) -> Option<ExprId> {
    statements.iter().find_map(|&id| {
        let receiver = code.statement(id).ok()?.parent?;
        match &code.expression(receiver).ok()?.origin {
            Origin::Method {
                parent: Some(owner),
                signature,
                ..
            } if *owner == container && signature.name == CONTENT_PANE_GETTER => Some(receiver),
            _ => None,
        }
    })
}

/// A loaded component with the element it came from.
struct LoadedNode<'e> {
    id: ComponentId,
    element: &'e Element,
    path: LoadPath,
    children: Vec<LoadedNode<'e>>,
}

fn component_elements(parent: &Element) -> impl Iterator<Item = &Element> {
    parent
        .children
        .iter()
        .filter(|c| c.name == COMPONENT || c.name == CONTAINER)
}

struct Loader<'a, S: SymbolResolver + ?Sized> {
    symbols: &'a S,
    form: FormModel,
    pass: Pass,
    connected: ConnectedProperties,
}

impl<S: SymbolResolver + ?Sized> Loader<'_, S> {
    // -- Phase 1: components ------------------------------------------------

    fn load_top<'e>(&mut self, root: &'e Element) -> LoadedNode<'e> {
        let top = self.form.top();
        let path = LoadPath::root();
        if let Some(non_visual) = root.child(NON_VISUAL_COMPONENTS) {
            for element in component_elements(non_visual) {
                // Non-visual components are never laid out.
                let _ = self.load_component(element, None, &path);
            }
        }
        if !defers_delegate(root) {
            self.setup_delegate(top, &path);
        }
        self.load_component_data(top, root, &path);
        let children = self.load_children(top, root, &path);
        LoadedNode {
            id: top,
            element: root,
            path,
            children,
        }
    }

    fn load_component<'e>(
        &mut self,
        element: &'e Element,
        parent: Option<ComponentId>,
        parent_path: &LoadPath,
    ) -> Option<LoadedNode<'e>> {
        let Some(name) = element.attr(ATTR_NAME) else {
            self.pass
                .record(parent_path.clone(), format!("<{}> without a name", element.name));
            return None;
        };
        let path = parent_path.component(name);
        let Some(class_name) = element.attr(ATTR_CLASS) else {
            self.pass.record(path, "component without a class");
            return None;
        };
        let Some(class) = self.symbols.resolve_class(class_name) else {
            self.pass
                .record(path, format!("unknown component class '{}'", class_name));
            return None;
        };

        let is_container = element.name == CONTAINER;
        let id = match self.form.add_component(parent, name, class, is_container) {
            Ok(id) => id,
            Err(err) => {
                self.pass.record(path, err.to_string());
                return None;
            }
        };
        let children = if is_container {
            if !defers_delegate(element) {
                self.setup_delegate(id, &path);
            }
            self.load_component_data(id, element, &path);
            self.load_children(id, element, &path)
        } else {
            self.load_component_data(id, element, &path);
            Vec::new()
        };
        Some(LoadedNode {
            id,
            element,
            path,
            children,
        })
    }

    fn load_children<'e>(&mut self, id: ComponentId, element: &'e Element, path: &LoadPath) -> Vec<LoadedNode<'e>> {
        let Some(sub_components) = element.child(SUB_COMPONENTS) else {
            return Vec::new();
        };
        component_elements(sub_components)
            .filter_map(|child| self.load_component(child, Some(id), path))
            .collect()
    }

    fn is_window(&self, class: &TypeName) -> bool {
        WINDOW_CLASSES
            .iter()
            .any(|window| self.symbols.is_subclass(class, &TypeName::new(*window)))
    }

    /// Route a window's children through `getContentPane()`.
    fn setup_delegate(&mut self, id: ComponentId, path: &LoadPath) {
        let Ok(component) = self.form.component(id) else {
            return;
        };
        let class = component.class.clone();
        let expression = component.expression;
        if !self.is_window(&class) {
            return;
        }

        let result = match self.symbols.resolve_method(&class, CONTENT_PANE_GETTER, &[]) {
            Some(sig) => self
                .form
                .code
                .create_method_call(Some(expression), sig, [])
                .and_then(|delegate| self.form.set_container_delegate(id, delegate))
                .map_err(|err| err.to_string()),
            None => Err(format!("no method {}.{}()", class, CONTENT_PANE_GETTER)),
        };
        if let Err(message) = result {
            self.pass.record(path.clone(), message);
        }
    }

    fn load_component_data(&mut self, id: ComponentId, element: &Element, path: &LoadPath) {
        if let Some(properties) = element.child(PROPERTIES) {
            for property in properties.children_named(PROPERTY) {
                self.load_property(id, property, path);
            }
        }

        let synthetic = self.read_named(
            element.child(SYNTHETIC_PROPERTIES),
            SYNTHETIC_PROPERTY,
            path,
            PathSegment::SyntheticProperty,
        );
        let aux = self.read_named(element.child(AUX_VALUES), AUX_VALUE, path, PathSegment::AuxValue);
        if let Ok(component) = self.form.component_mut(id) {
            component.synthetic.extend(synthetic);
            component.aux.extend(aux);
        }
    }

    /// Named typed values below `list`; unreadable ones are recorded.
    fn read_named(
        &mut self,
        list: Option<&Element>,
        item: &str,
        path: &LoadPath,
        segment: fn(String) -> PathSegment,
    ) -> Vec<(String, TypedValue)> {
        let mut values = Vec::new();
        for element in list.into_iter().flat_map(|list| list.children_named(item)) {
            let Some(name) = element.attr(ATTR_NAME) else {
                self.pass
                    .record(path.clone(), format!("<{}> without a name", element.name));
                continue;
            };
            match read_value(element, self.symbols) {
                Ok((ty, value)) => values.push((name.to_string(), TypedValue::new(ty, value))),
                Err(err) => self
                    .pass
                    .record(path.child(segment(name.to_string())), err.to_string()),
            }
        }
        values
    }

    fn load_property(&mut self, id: ComponentId, element: &Element, path: &LoadPath) {
        let Some(name) = element.attr(ATTR_NAME) else {
            self.pass.record(path.clone(), "property without a name");
            return;
        };
        let path = path.property(name);
        let value = if element.attr(ATTR_EDITOR) == Some(CONNECTION_EDITOR) {
            self.load_connection(id, name, element, &path)
        } else {
            read_value(element, self.symbols).map(|(ty, value)| PropertyValue::plain(ty, value))
        };
        let result = value.and_then(|value| Ok(self.form.set_property(id, name, value)?));
        if let Err(err) = result {
            self.pass.record(path, err.to_string());
        }
    }

    /// A connection-valued property, deferred to the resolver.
    fn load_connection(
        &mut self,
        id: ComponentId,
        name: &str,
        element: &Element,
        path: &LoadPath,
    ) -> Result<PropertyValue, DecodeError> {
        let type_name = required(element, ATTR_TYPE)?;
        let ty = self
            .symbols
            .resolve_class(type_name)
            .ok_or_else(|| DecodeError::UnknownClass(type_name.to_string()))?;
        let reference = read_reference(required_child(element, CONNECTION)?)?;
        let component = self.form.component(id)?.name.clone();
        self.connected
            .put(PropertyKey::new(component, name), reference.clone(), path.clone());
        Ok(PropertyValue::Connected {
            ty,
            reference,
            resolved: None,
        })
    }

    // -- Phase 2: layouts ---------------------------------------------------

    fn load_layout(&mut self, node: &LoadedNode<'_>) {
        let Ok(component) = self.form.component(node.id) else {
            return;
        };
        let Some(container) = &component.container else {
            return;
        };
        let mut target = LayoutTarget {
            container: component.expression,
            delegate: container.delegate,
        };
        let layout_element = node.element.child(LAYOUT);
        let code_element = node.element.child(LAYOUT_CODE);

        let mut layout = LayoutState::Unknown;
        let mut row = None;
        let mut statements = Vec::new();
        let mut properties = IndexMap::new();

        if let Some(layout_element) = layout_element {
            let path = node.path.child(PathSegment::Layout);
            match layout_element.attr(ATTR_CLASS) {
                None => {
                    layout = LayoutState::Natural;
                    self.form.version.require(FormFeature::NaturalLayout);
                }
                Some(class) => {
                    let stored = self.layout_parameters(layout_element, &path);
                    match convert_layout(&mut self.form.code, self.symbols, class, &stored, target) {
                        Ok(LayoutConversion::Converted(converted)) => {
                            layout = LayoutState::Standard(converted.layout);
                            row = Some(converted.row.layout);
                            statements = converted.statements;
                            properties = converted.properties;
                        }
                        Ok(LayoutConversion::Unknown) => debug!(class, "unknown legacy layout"),
                        Err(err) => self.pass.record(path, err.to_string()),
                    }
                }
            }
        }
        if layout == LayoutState::Unknown && code_element.is_some() {
            layout = LayoutState::FromCode;
        }

        if !matches!(layout, LayoutState::Natural | LayoutState::FromCode) {
            for child in &node.children {
                statements.extend(self.child_code(child, row, target));
            }
        }

        for child in &node.children {
            self.load_layout(child);
        }

        if let Some(code_element) = code_element {
            let decoded = self.load_layout_code(code_element, &node.path);
            if defers_delegate(node.element) {
                target.delegate = self.adopt_delegate(node, &decoded, target);
            }
            if layout == LayoutState::FromCode {
                let recognized = self.form.component(node.id).ok().and_then(|component| {
                    recognize_layout(&self.form.code, self.symbols, &component.class, &decoded, target.delegate)
                });
                if let Some(kind) = recognized {
                    layout = LayoutState::Standard(kind);
                }
            }
            statements.extend(decoded);
        }

        if let Ok(container) = self.form.container_mut(node.id) {
            container.layout = layout;
            container.layout_properties = properties;
            container.layout_code = statements;
        }
    }

    /// Set up a deferred window delegate, reusing the `getContentPane()`
    /// call the decoded code adds to.
    fn adopt_delegate(&mut self, node: &LoadedNode<'_>, decoded: &[StmtId], target: LayoutTarget) -> ExprId {
        let is_window = self
            .form
            .component(node.id)
            .is_ok_and(|component| self.is_window(&component.class));
        if !is_window {
            return target.delegate;
        }
        match decoded_delegate(&self.form.code, target.container, decoded) {
            Some(delegate) => {
                if let Err(err) = self.form.set_container_delegate(node.id, delegate) {
                    self.pass.record(node.path.clone(), err.to_string());
                }
            }
            None => self.setup_delegate(node.id, &node.path),
        }
        self.form
            .component(node.id)
            .ok()
            .and_then(|component| component.container.as_ref())
            .map_or(target.delegate, |container| container.delegate)
    }

    fn layout_parameters(&mut self, layout: &Element, path: &LoadPath) -> Vec<(String, Value)> {
        let mut stored = Vec::new();
        for property in layout.children_named(PROPERTY) {
            let Some(name) = property.attr(ATTR_NAME) else {
                continue;
            };
            match read_value(property, self.symbols) {
                Ok((_, value)) => stored.push((name.to_string(), value)),
                Err(err) => self.pass.record(path.property(name), err.to_string()),
            }
        }
        stored
    }

    /// Add code of one child: its first convertible constraints for the
    /// parent's layout, else the default add.
    fn child_code(
        &mut self,
        child: &LoadedNode<'_>,
        row: Option<StandardLayout>,
        target: LayoutTarget,
    ) -> Vec<StmtId> {
        let Ok(component) = self.form.component(child.id) else {
            return Vec::new();
        };
        let expression = component.expression;
        let path = child.path.child(PathSegment::Constraints);

        let constraints = child
            .element
            .child(CONSTRAINTS)
            .into_iter()
            .flat_map(|c| c.children_named(CONSTRAINT));
        for constraint in constraints {
            match convert_constraints(&mut self.form.code, self.symbols, row, constraint, expression, target) {
                Ok(ConstraintConversion::Converted { statements, layer }) => {
                    if let Some(layer) = layer {
                        self.set_layer(child.id, layer);
                    }
                    return statements;
                }
                Ok(ConstraintConversion::NotForLayout | ConstraintConversion::CannotConvert) => {}
                Err(err) => self.pass.record(path.clone(), err.to_string()),
            }
        }

        match default_component_code(&mut self.form.code, self.symbols, row, expression, target) {
            Ok(stmt) => vec![stmt],
            Err(err) => {
                self.pass.record(path, err.to_string());
                Vec::new()
            }
        }
    }

    fn set_layer(&mut self, id: ComponentId, layer: i64) {
        if let Ok(component) = self.form.component_mut(id) {
            component
                .aux
                .insert(AUX_LAYER.to_string(), TypedValue::new(TypeName::int(), Value::Int(layer)));
            self.form.version.require(FormFeature::LayeredPaneLayer);
        }
    }

    fn load_layout_code(&mut self, element: &Element, path: &LoadPath) -> Vec<StmtId> {
        let FormModel { code, components, .. } = &mut self.form;
        let fragment = Decoder::new(code, &*components, self.symbols, &mut self.pass).decode_fragment(element);
        let path = path.child(PathSegment::LayoutCode);
        for err in fragment.errors {
            self.pass.record(path.clone(), err.to_string());
        }
        fragment.statements
    }

    // -- Phase 3: connected properties --------------------------------------

    fn resolve_connected(&mut self) {
        let connected = std::mem::take(&mut self.connected);
        if connected.is_empty() {
            return;
        }
        debug!(entries = connected.len(), "resolving connected properties");
        for error in connected.resolve(&mut self.form) {
            self.pass.record(error.path, error.message);
        }
    }
}
