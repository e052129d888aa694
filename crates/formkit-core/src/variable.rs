//! Variables: named storage slots that expressions can be bound to.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::id::ExprId;
use crate::types::TypeName;

/// Variable kind flags, persisted as their integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableKind(pub u32);

impl VariableKind {
    pub const PUBLIC: VariableKind = VariableKind(0x0001);
    pub const PRIVATE: VariableKind = VariableKind(0x0002);
    pub const PROTECTED: VariableKind = VariableKind(0x0004);
    pub const STATIC: VariableKind = VariableKind(0x0008);
    pub const FINAL: VariableKind = VariableKind(0x0010);
    pub const VOLATILE: VariableKind = VariableKind(0x0040);
    pub const TRANSIENT: VariableKind = VariableKind(0x0080);
    pub const LOCAL: VariableKind = VariableKind(0x1000);
    pub const FIELD: VariableKind = VariableKind(0x2000);
    pub const EXPLICIT_DECLARATION: VariableKind = VariableKind(0x4000);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: VariableKind) -> bool {
        self.0 & other.0 == other.0
    }

    /// A local variable the builder declared on its own; such a variable
    /// yields its name when a persisted variable claims it.
    pub fn is_implicit_local(self) -> bool {
        self.0 & (Self::LOCAL.0 | Self::EXPLICIT_DECLARATION.0) == Self::LOCAL.0
    }
}

impl BitOr for VariableKind {
    type Output = VariableKind;

    fn bitor(self, rhs: VariableKind) -> VariableKind {
        VariableKind(self.0 | rhs.0)
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named variable; its name is unique within the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
    pub declared_type: TypeName,
    /// Expressions bound to this variable, in attachment order.
    pub expressions: Vec<ExprId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_local_requires_local_without_explicit_declaration() {
        assert!(VariableKind::LOCAL.is_implicit_local());
        assert!((VariableKind::LOCAL | VariableKind::FINAL).is_implicit_local());
        assert!(!(VariableKind::LOCAL | VariableKind::EXPLICIT_DECLARATION).is_implicit_local());
        assert!(!(VariableKind::FIELD | VariableKind::PRIVATE).is_implicit_local());
    }

    #[test]
    fn combined_flags_keep_their_bits() {
        let kind = VariableKind::FIELD | VariableKind::PRIVATE;
        assert_eq!(kind.bits(), 0x2002);
        assert!(kind.contains(VariableKind::PRIVATE));
        assert!(!kind.contains(VariableKind::STATIC));
    }
}
