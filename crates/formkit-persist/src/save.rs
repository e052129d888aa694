//! Form saver: [`FormModel`] to persisted document.
//!
//! Always writes the current format. Legacy `<Layout>` elements are only
//! read; standard layouts live in each container's `<LayoutCode>`.

use tracing::debug;

use formkit_core::{
    Component, ComponentId, FormFeature, FormModel, FormVersion, LayoutState, ModelError, PropertyValue,
    StmtId, SymbolResolver, TypedValue,
};

use crate::codec::Encoder;
use crate::config::SaveOptions;
use crate::document::{write_document, Element};
use crate::error::PersistError;
use crate::forminfo::form_info_for_class;
use crate::names::*;
use crate::pass::{CodeMode, Pass};
use crate::values::{write_reference, write_value};

/// Save `form` as a document.
///
/// Raises the form's version when it uses features older versions cannot
/// store; the raised levels stay on the model.
pub fn save_form<S: SymbolResolver + ?Sized>(
    form: &mut FormModel,
    symbols: &S,
    options: &SaveOptions,
) -> Result<String, PersistError> {
    raise_version(form);
    let mut root = Element::new(FORM)
        .with_attr(ATTR_VERSION, form.version.current().token())
        .with_attr(ATTR_MAX_VERSION, form.version.max().token());
    if let Some(form_info) = form_info_for_class(symbols, &form.base_class) {
        root.set_attr(ATTR_TYPE, form_info);
    }

    let mut writer = FormWriter {
        form,
        pass: Pass::new(options.code_mode),
    };
    let non_visual = writer.form.components.non_visual().to_vec();
    if !non_visual.is_empty() {
        let mut list = Element::new(NON_VISUAL_COMPONENTS);
        for id in non_visual {
            list.push(writer.component(id)?);
        }
        root.push(list);
    }
    writer.body(&mut root, writer.form.top())?;

    debug!(
        form = %form.name,
        version = %form.version.current(),
        mode = ?options.code_mode,
        "form saved"
    );
    write_document(&root, options.indent)
}

/// Raise the version for every feature the form uses.
fn raise_version(form: &mut FormModel) {
    let mut natural = false;
    let mut layered = false;
    for component in form.components.iter() {
        natural |= component
            .container
            .as_ref()
            .is_some_and(|c| c.layout == LayoutState::Natural);
        layered |= component.aux.contains_key(AUX_LAYER);
    }
    if natural {
        form.version.require(FormFeature::NaturalLayout);
    }
    if layered {
        form.version.require(FormFeature::LayeredPaneLayer);
        form.version.set_max(FormVersion::LATEST);
    }
    form.version.clamp();
}

struct FormWriter<'a> {
    form: &'a FormModel,
    pass: Pass,
}

impl FormWriter<'_> {
    fn component(&mut self, id: ComponentId) -> Result<Element, PersistError> {
        let form = self.form;
        let component = form.component(id)?;
        let name = if component.is_container() { CONTAINER } else { COMPONENT };
        let mut element = Element::new(name)
            .with_attr(ATTR_CLASS, component.class.as_str())
            .with_attr(ATTR_NAME, component.name.as_str());
        self.body(&mut element, id)?;
        Ok(element)
    }

    /// Everything below a component's own element, in document order.
    fn body(&mut self, element: &mut Element, id: ComponentId) -> Result<(), PersistError> {
        let form = self.form;
        let component = form.component(id)?;
        if !component.properties.is_empty() {
            element.push(properties(component));
        }
        if let Some(list) = named_values(SYNTHETIC_PROPERTIES, SYNTHETIC_PROPERTY, &component.synthetic) {
            element.push(list);
        }
        if let Some(list) = named_values(AUX_VALUES, AUX_VALUE, &component.aux) {
            element.push(list);
        }

        let Some(container) = &component.container else {
            return Ok(());
        };
        if container.layout == LayoutState::Natural {
            element.push(Element::new(LAYOUT));
        }
        if !container.children.is_empty() {
            let mut sub_components = Element::new(SUB_COMPONENTS);
            for &child in &container.children {
                sub_components.push(self.component(child)?);
            }
            element.push(sub_components);
        }
        if !container.layout_code.is_empty() {
            element.push(self.layout_code(&container.layout_code)?);
        }
        Ok(())
    }

    fn layout_code(&mut self, statements: &[StmtId]) -> Result<Element, ModelError> {
        let mut element = Element::new(LAYOUT_CODE);
        if self.pass.mode() == CodeMode::Static {
            element.set_attr(ATTR_CODE_STRUCTURE, CODE_STRUCTURE_STATIC);
        }
        let form = self.form;
        let fragment = Encoder::new(&form.code, &form.components, &mut self.pass).encode_fragment(statements)?;
        element.children = fragment;
        Ok(element)
    }
}

fn properties(component: &Component) -> Element {
    let mut list = Element::new(PROPERTIES);
    for (name, value) in &component.properties {
        let mut property = Element::new(PROPERTY).with_attr(ATTR_NAME, name.as_str());
        match value {
            PropertyValue::Value { ty, value } => write_value(&mut property, ty, value),
            PropertyValue::Connected { ty, reference, .. } => {
                property.set_attr(ATTR_TYPE, ty.as_str());
                property.set_attr(ATTR_EDITOR, CONNECTION_EDITOR);
                property.push(write_reference(reference));
            }
        }
        list.push(property);
    }
    list
}

fn named_values(
    list: &str,
    item: &str,
    values: &indexmap::IndexMap<String, TypedValue>,
) -> Option<Element> {
    if values.is_empty() {
        return None;
    }
    let mut element = Element::new(list);
    for (name, typed) in values {
        let mut value = Element::new(item).with_attr(ATTR_NAME, name.as_str());
        write_value(&mut value, &typed.ty, &typed.value);
        element.push(value);
    }
    Some(element)
}
