//! Design references: property values that mirror another component's
//! property or method result, plus the keys that identify them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one property of one component: `[component, property]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyKey {
    pub component: String,
    pub property: String,
}

impl PropertyKey {
    pub fn new(component: impl Into<String>, property: impl Into<String>) -> Self {
        PropertyKey {
            component: component.into(),
            property: property.into(),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.component, self.property)
    }
}

/// What a design reference points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum ReferenceMember {
    Property(String),
    Method(String),
    /// Free-form user code; has no source component.
    Code(String),
}

/// A path binding inside a referenced value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubBinding {
    pub source_path: String,
    pub target_path: String,
}

/// A live reference to another component's property or method result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignReference {
    pub component: Option<String>,
    pub member: ReferenceMember,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub sub_bindings: Vec<SubBinding>,
}

impl DesignReference {
    pub fn property(component: impl Into<String>, property: impl Into<String>) -> Self {
        DesignReference {
            component: Some(component.into()),
            member: ReferenceMember::Property(property.into()),
            parameters: Vec::new(),
            sub_bindings: Vec::new(),
        }
    }

    pub fn method(component: impl Into<String>, method: impl Into<String>) -> Self {
        DesignReference {
            component: Some(component.into()),
            member: ReferenceMember::Method(method.into()),
            parameters: Vec::new(),
            sub_bindings: Vec::new(),
        }
    }

    pub fn code(code: impl Into<String>) -> Self {
        DesignReference {
            component: None,
            member: ReferenceMember::Code(code.into()),
            parameters: Vec::new(),
            sub_bindings: Vec::new(),
        }
    }

    /// The property this reference reads from, if it reads a property at
    /// all. A getter method maps to the property it reads.
    pub fn source_key(&self) -> Option<PropertyKey> {
        let component = self.component.as_ref()?;
        let property = match &self.member {
            ReferenceMember::Property(name) => name.clone(),
            ReferenceMember::Method(name) => property_name_for_getter(name)?,
            ReferenceMember::Code(_) => return None,
        };
        Some(PropertyKey::new(component.clone(), property))
    }
}

/// `getText` -> `text`, `isEnabled` -> `enabled`, `getURL` -> `URL`.
pub fn property_name_for_getter(method: &str) -> Option<String> {
    let rest = method
        .strip_prefix("get")
        .or_else(|| method.strip_prefix("is"))?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    let second_upper = chars.next().is_some_and(char::is_uppercase);
    if second_upper {
        Some(rest.to_string())
    } else {
        let mut name: String = first.to_lowercase().collect();
        name.push_str(&rest[first.len_utf8()..]);
        Some(name)
    }
}
