//! Fully qualified type names used throughout the code structure.
//!
//! Types are carried by name only; knowing what a name denotes (its
//! constructors, methods, fields) is the job of a
//! [`SymbolResolver`](crate::symbols::SymbolResolver).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primitive type names, in the order they are usually listed.
pub const PRIMITIVES: [&str; 8] = [
    "boolean", "byte", "short", "int", "long", "float", "double", "char",
];

pub const OBJECT: &str = "java.lang.Object";
pub const STRING: &str = "java.lang.String";
pub const COMPONENT: &str = "java.awt.Component";
pub const CONTAINER: &str = "java.awt.Container";
pub const LAYOUT_MANAGER: &str = "java.awt.LayoutManager";

/// A fully qualified class name or primitive type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        TypeName(name.into())
    }

    pub fn int() -> Self {
        TypeName::new("int")
    }

    pub fn double() -> Self {
        TypeName::new("double")
    }

    pub fn boolean() -> Self {
        TypeName::new("boolean")
    }

    pub fn string() -> Self {
        TypeName::new(STRING)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_primitive(&self) -> bool {
        PRIMITIVES.contains(&self.0.as_str())
    }

    /// The class name without its package prefix.
    pub fn simple_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(dot) => &self.0[dot + 1..],
            None => &self.0,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        TypeName::new(name)
    }
}

/// Render a parameter type list the way it is persisted: `"int, int"`.
pub fn join_types(types: &[TypeName]) -> String {
    types
        .iter()
        .map(TypeName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split a persisted parameter type list; empty input yields no types.
pub fn split_types(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_detection() {
        assert!(TypeName::int().is_primitive());
        assert!(TypeName::new("char").is_primitive());
        assert!(!TypeName::string().is_primitive());
    }

    #[test]
    fn simple_name_strips_package() {
        assert_eq!(TypeName::new("javax.swing.JPanel").simple_name(), "JPanel");
        assert_eq!(TypeName::int().simple_name(), "int");
    }

    #[test]
    fn type_lists_join_and_split() {
        let types = vec![TypeName::int(), TypeName::new("java.awt.Insets")];
        let joined = join_types(&types);
        assert_eq!(joined, "int, java.awt.Insets");
        assert_eq!(split_types(&joined), vec!["int", "java.awt.Insets"]);
        assert!(split_types("").is_empty());
        assert!(split_types(" , ").is_empty());
    }
}
