//! Attribute-level value codec and design-reference elements.
//!
//! A value is written on its element as `type` plus either `value` (plain
//! text form) or `editor` and `value` (editor data). An element with a
//! `type` only holds null.

use formkit_core::{
    DesignReference, ReferenceMember, SubBinding, SymbolResolver, TypeName, Value,
};

use crate::codec::{required, DecodeError};
use crate::document::Element;
use crate::names::*;

/// Put `value` of type `ty` onto `element`.
pub fn write_value(element: &mut Element, ty: &TypeName, value: &Value) {
    element.set_attr(ATTR_TYPE, ty.as_str());
    match value {
        Value::Null => {}
        Value::Custom { editor, data } => {
            element.set_attr(ATTR_EDITOR, editor.as_str());
            element.set_attr(ATTR_VALUE, data.as_str());
        }
        other => {
            if let Some(text) = other.to_text() {
                element.set_attr(ATTR_VALUE, text);
            }
        }
    }
}

/// Read the value carried by `element`, resolving its `type` first.
pub fn read_value<S: SymbolResolver + ?Sized>(
    element: &Element,
    symbols: &S,
) -> Result<(TypeName, Value), DecodeError> {
    let type_name = required(element, ATTR_TYPE)?;
    let ty = symbols
        .resolve_class(type_name)
        .ok_or_else(|| DecodeError::UnknownClass(type_name.to_string()))?;
    let value = match (element.attr(ATTR_EDITOR), element.attr(ATTR_VALUE)) {
        (Some(editor), data) => Value::Custom {
            editor: editor.to_string(),
            data: data.unwrap_or_default().to_string(),
        },
        (None, Some(text)) => Value::parse(&ty, text)?,
        (None, None) => Value::Null,
    };
    Ok((ty, value))
}

/// `<Connection>` element for a design reference.
pub fn write_reference(reference: &DesignReference) -> Element {
    let mut element = Element::new(CONNECTION);
    if let Some(component) = &reference.component {
        element.set_attr(ATTR_COMPONENT, component.as_str());
    }
    let (kind, name) = match &reference.member {
        ReferenceMember::Property(name) => (CONNECTION_PROPERTY, name),
        ReferenceMember::Method(name) => (CONNECTION_METHOD, name),
        ReferenceMember::Code(code) => (CONNECTION_CODE, code),
    };
    element.set_attr(ATTR_NAME, name.as_str());
    element.set_attr(ATTR_TYPE, kind);
    for parameter in &reference.parameters {
        element.push(Element::new(PARAMETER).with_attr(ATTR_VALUE, parameter.as_str()));
    }
    for binding in &reference.sub_bindings {
        element.push(
            Element::new(SUB_BINDING)
                .with_attr(ATTR_SOURCE_PATH, binding.source_path.as_str())
                .with_attr(ATTR_TARGET_PATH, binding.target_path.as_str()),
        );
    }
    element
}

/// Read a `<Connection>` element.
pub fn read_reference(element: &Element) -> Result<DesignReference, DecodeError> {
    let name = required(element, ATTR_NAME)?.to_string();
    let kind = required(element, ATTR_TYPE)?;
    let member = match kind {
        CONNECTION_PROPERTY => ReferenceMember::Property(name),
        CONNECTION_METHOD => ReferenceMember::Method(name),
        CONNECTION_CODE => ReferenceMember::Code(name),
        other => {
            return Err(DecodeError::InvalidAttribute {
                attribute: ATTR_TYPE,
                value: other.to_string(),
            })
        }
    };
    let component = match member {
        ReferenceMember::Code(_) => None,
        _ => Some(required(element, ATTR_COMPONENT)?.to_string()),
    };
    let parameters = element
        .children_named(PARAMETER)
        .filter_map(|p| p.attr(ATTR_VALUE))
        .map(str::to_string)
        .collect();
    let sub_bindings = element
        .children_named(SUB_BINDING)
        .map(|b| {
            Ok(SubBinding {
                source_path: required(b, ATTR_SOURCE_PATH)?.to_string(),
                target_path: required(b, ATTR_TARGET_PATH)?.to_string(),
            })
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;
    Ok(DesignReference {
        component,
        member,
        parameters,
        sub_bindings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use formkit_core::SymbolTable;

    #[test]
    fn plain_values_use_the_value_attribute() {
        let mut element = Element::new(PROPERTY);
        write_value(&mut element, &TypeName::int(), &Value::Int(5));
        assert_eq!(element.attr(ATTR_TYPE), Some("int"));
        assert_eq!(element.attr(ATTR_VALUE), Some("5"));
        assert_eq!(element.attr(ATTR_EDITOR), None);

        let symbols = SymbolTable::with_builtins();
        assert_eq!(read_value(&element, &symbols).unwrap(), (TypeName::int(), Value::Int(5)));
    }

    #[test]
    fn null_has_neither_value_nor_editor() {
        let mut element = Element::new(VALUE);
        let ty = TypeName::new("java.awt.LayoutManager");
        write_value(&mut element, &ty, &Value::Null);
        assert_eq!(element.attributes.len(), 1);

        let symbols = SymbolTable::with_builtins();
        assert_eq!(read_value(&element, &symbols).unwrap().1, Value::Null);
    }

    #[test]
    fn editor_values_are_opaque() {
        let element = Element::new(PROPERTY)
            .with_attr(ATTR_TYPE, "java.awt.Color")
            .with_attr(ATTR_EDITOR, "org.netbeans.beaninfo.editors.ColorEditor")
            .with_attr(ATTR_VALUE, "255,0,0");
        let symbols = SymbolTable::with_builtins();
        let (_, value) = read_value(&element, &symbols).unwrap();
        assert_eq!(
            value,
            Value::Custom {
                editor: "org.netbeans.beaninfo.editors.ColorEditor".into(),
                data: "255,0,0".into(),
            }
        );
    }

    #[test]
    fn unknown_type_is_reported() {
        let element = Element::new(PROPERTY)
            .with_attr(ATTR_TYPE, "com.acme.Missing")
            .with_attr(ATTR_VALUE, "x");
        let symbols = SymbolTable::with_builtins();
        assert_eq!(
            read_value(&element, &symbols).unwrap_err(),
            DecodeError::UnknownClass("com.acme.Missing".into())
        );
    }

    #[test]
    fn references_round_trip() {
        let mut reference = DesignReference::method("jSlider1", "getValue");
        reference.parameters.push("1".into());
        reference.sub_bindings.push(SubBinding {
            source_path: "value".into(),
            target_path: "text".into(),
        });
        let element = write_reference(&reference);
        assert_eq!(element.attr(ATTR_TYPE), Some("method"));
        assert_eq!(read_reference(&element).unwrap(), reference);

        let code = DesignReference::code("getTitle()");
        assert_eq!(read_reference(&write_reference(&code)).unwrap(), code);
    }
}
