//! Property and literal values.
//!
//! Primitive, wrapper and string values have an attribute-level text form;
//! anything else is carried opaquely together with the name of the value
//! editor that produced it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::TypeName;

/// A value stored in a property, synthetic property, aux value or literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
    /// Editor-specific data that only the named editor can interpret.
    Custom { editor: String, data: String },
}

/// A value together with the type it was stored as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    #[serde(rename = "type")]
    pub ty: TypeName,
    pub value: Value,
}

impl TypedValue {
    pub fn new(ty: TypeName, value: Value) -> Self {
        TypedValue { ty, value }
    }
}

/// A value text that cannot be read as the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("'{text}' is not a valid {ty} value")]
    Malformed { ty: String, text: String },

    /// Values of this type are only persisted through a value editor.
    #[error("type {ty} has no plain text form")]
    NoTextForm { ty: String },
}

/// How a type's values are written as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextForm {
    Bool,
    Int,
    Float,
    Char,
    Str,
}

fn text_form(ty: &TypeName) -> Option<TextForm> {
    match ty.as_str() {
        "boolean" | "java.lang.Boolean" => Some(TextForm::Bool),
        "byte" | "short" | "int" | "long" | "java.lang.Byte" | "java.lang.Short"
        | "java.lang.Integer" | "java.lang.Long" => Some(TextForm::Int),
        "float" | "double" | "java.lang.Float" | "java.lang.Double" => Some(TextForm::Float),
        "char" | "java.lang.Character" => Some(TextForm::Char),
        "java.lang.String" => Some(TextForm::Str),
        _ => None,
    }
}

impl Value {
    /// Parse the persisted text form of a value of type `ty`.
    pub fn parse(ty: &TypeName, text: &str) -> Result<Value, ValueError> {
        let malformed = || ValueError::Malformed {
            ty: ty.to_string(),
            text: text.to_string(),
        };
        match text_form(ty) {
            Some(TextForm::Bool) => match text {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(malformed()),
            },
            Some(TextForm::Int) => text.trim().parse().map(Value::Int).map_err(|_| malformed()),
            Some(TextForm::Float) => text.trim().parse().map(Value::Float).map_err(|_| malformed()),
            Some(TextForm::Char) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(malformed()),
                }
            }
            Some(TextForm::Str) => Ok(Value::Str(text.to_string())),
            None => Err(ValueError::NoTextForm { ty: ty.to_string() }),
        }
    }

    /// Whether values of `ty` can be written as plain attribute text.
    pub fn has_text_form(ty: &TypeName) -> bool {
        text_form(ty).is_some()
    }

    /// The attribute text of this value; `None` for null.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Custom { data, .. } => Some(data.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(s) => f.write_str(s),
            Value::Custom { data, .. } => f.write_str(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primitives_and_wrappers() {
        assert_eq!(Value::parse(&TypeName::int(), "5").unwrap(), Value::Int(5));
        assert_eq!(
            Value::parse(&TypeName::new("java.lang.Integer"), "-3").unwrap(),
            Value::Int(-3)
        );
        assert_eq!(
            Value::parse(&TypeName::boolean(), "true").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            Value::parse(&TypeName::double(), "0.5").unwrap(),
            Value::Float(0.5)
        );
        assert_eq!(
            Value::parse(&TypeName::new("char"), "x").unwrap(),
            Value::Char('x')
        );
        assert_eq!(
            Value::parse(&TypeName::string(), "North").unwrap(),
            Value::Str("North".into())
        );
    }

    #[test]
    fn rejects_malformed_text() {
        let err = Value::parse(&TypeName::int(), "five").unwrap_err();
        assert_eq!(err.to_string(), "'five' is not a valid int value");
        assert!(Value::parse(&TypeName::boolean(), "yes").is_err());
        assert!(Value::parse(&TypeName::new("char"), "xy").is_err());
    }

    #[test]
    fn object_types_need_an_editor() {
        let err = Value::parse(&TypeName::new("java.awt.Color"), "255,0,0").unwrap_err();
        assert_eq!(
            err,
            ValueError::NoTextForm {
                ty: "java.awt.Color".into()
            }
        );
    }

    #[test]
    fn text_form_round_trips() {
        assert_eq!(Value::Int(5).to_text().as_deref(), Some("5"));
        assert_eq!(Value::Float(1.0).to_text().as_deref(), Some("1.0"));
        assert_eq!(Value::Null.to_text(), None);
        let custom = Value::Custom {
            editor: "ColorEditor".into(),
            data: "255,0,0".into(),
        };
        assert_eq!(custom.to_text().as_deref(), Some("255,0,0"));
    }
}
