//! Stable ID newtypes for design-model entities.
//!
//! All IDs are distinct newtype wrappers over `u32` indexing into the arenas
//! owned by [`CodeStructure`](crate::code::CodeStructure) and
//! [`ComponentTree`](crate::component::ComponentTree), so that an `ExprId`
//! cannot be accidentally used where a `StmtId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Expression node identifier within one form's code structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExprId(pub u32);

/// Statement node identifier within one form's code structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StmtId(pub u32);

/// Variable identifier within one form's variable namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub u32);

/// Component identifier within one form's component tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u32);

// Display implementations -- just print the inner value.

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ExprId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl StmtId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl VarId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl ComponentId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prints_inner_value() {
        assert_eq!(ExprId(7).to_string(), "7");
        assert_eq!(StmtId(0).to_string(), "0");
        assert_eq!(VarId(12).to_string(), "12");
        assert_eq!(ComponentId(3).to_string(), "3");
    }

    #[test]
    fn ids_serialize_as_bare_numbers() {
        let json = serde_json::to_string(&ExprId(42)).unwrap();
        assert_eq!(json, "42");
        let back: ExprId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ExprId(42));
    }
}
