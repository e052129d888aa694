//! Core error types for formkit-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! the failure modes of the in-memory design model.

use crate::id::{ComponentId, ExprId, StmtId, VarId};
use thiserror::Error;

/// Errors produced by the design model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// An expression ID does not index into the code structure.
    #[error("expression not found: ExprId({id})", id = id.0)]
    ExpressionNotFound { id: ExprId },

    /// A statement ID does not index into the code structure.
    #[error("statement not found: StmtId({id})", id = id.0)]
    StatementNotFound { id: StmtId },

    /// A variable ID does not index into the variable namespace.
    #[error("variable not found: VarId({id})", id = id.0)]
    VariableNotFound { id: VarId },

    /// A component ID does not index into the component tree.
    #[error("component not found: ComponentId({id})", id = id.0)]
    ComponentNotFound { id: ComponentId },

    /// A variable name is already taken in the form.
    #[error("duplicate variable name: '{name}'")]
    DuplicateVariable { name: String },

    /// A component name is already taken in the form.
    #[error("duplicate component name: '{name}'")]
    DuplicateComponent { name: String },

    /// A container-only operation was applied to a plain component.
    #[error("component '{name}' is not a container")]
    NotAContainer { name: String },

    /// Statement data does not fit the statement shape.
    #[error("inconsistent statement: {reason}")]
    InconsistentStatement { reason: String },

    /// A version token is not one of the known format versions.
    #[error("unsupported form version: '{token}'")]
    UnsupportedVersion { token: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_entity() {
        let err = ModelError::ExpressionNotFound { id: ExprId(9) };
        assert_eq!(err.to_string(), "expression not found: ExprId(9)");

        let err = ModelError::DuplicateVariable {
            name: "jButton1".into(),
        };
        assert_eq!(err.to_string(), "duplicate variable name: 'jButton1'");
    }
}
