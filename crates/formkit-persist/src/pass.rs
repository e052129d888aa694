//! Per-call pass context threaded through every load and save step.
//!
//! A [`Pass`] is created fresh by each load or save and dropped when the
//! call returns, so no identity or error state survives between calls.

use std::collections::HashSet;

use formkit_core::VarId;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{LoadPath, NonFatalError};
use crate::identity::IdentityMap;

/// How statements are laid out in a persisted code fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeMode {
    /// A flat, ordered statement list; each statement carries its parent.
    #[default]
    Flow,
    /// Statements nested inside the expression that defines them.
    Static,
}

impl std::str::FromStr for CodeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flow" => Ok(CodeMode::Flow),
            "static" => Ok(CodeMode::Static),
            other => Err(format!("unknown code mode '{}' (expected flow or static)", other)),
        }
    }
}

/// State of one load or save call.
#[derive(Debug)]
pub struct Pass {
    pub identity: IdentityMap,
    declared_variables: HashSet<VarId>,
    in_progress: HashSet<String>,
    errors: Vec<NonFatalError>,
    mode: CodeMode,
}

impl Pass {
    pub fn new(mode: CodeMode) -> Self {
        Pass {
            identity: IdentityMap::new(),
            declared_variables: HashSet::new(),
            in_progress: HashSet::new(),
            errors: Vec::new(),
            mode,
        }
    }

    pub fn mode(&self) -> CodeMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CodeMode) {
        self.mode = mode;
    }

    /// Mark a variable as declared; `true` the first time only.
    pub fn declare_variable(&mut self, var: VarId) -> bool {
        self.declared_variables.insert(var)
    }

    pub fn is_declared(&self, var: VarId) -> bool {
        self.declared_variables.contains(&var)
    }

    /// Enter the definition of persisted node `key`; `false` if that
    /// definition is already being decoded further up.
    pub fn begin_definition(&mut self, key: &str) -> bool {
        self.in_progress.insert(key.to_string())
    }

    pub fn end_definition(&mut self, key: &str) {
        self.in_progress.remove(key);
    }

    /// Collect a non-fatal error.
    pub fn record(&mut self, path: LoadPath, message: impl Into<String>) {
        let error = NonFatalError {
            path,
            message: message.into(),
        };
        warn!(%error, "non-fatal persistence error");
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[NonFatalError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<NonFatalError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_are_declared_once() {
        let mut pass = Pass::new(CodeMode::Flow);
        assert!(pass.declare_variable(VarId(1)));
        assert!(!pass.declare_variable(VarId(1)));
        assert!(pass.declare_variable(VarId(2)));
    }

    #[test]
    fn definitions_cannot_nest_themselves() {
        let mut pass = Pass::new(CodeMode::Static);
        assert!(pass.begin_definition("4"));
        assert!(!pass.begin_definition("4"));
        pass.end_definition("4");
        assert!(pass.begin_definition("4"));
    }

    #[test]
    fn errors_are_kept_in_order() {
        let mut pass = Pass::new(CodeMode::Flow);
        pass.record(LoadPath::root().component("a"), "first");
        pass.record(LoadPath::root().component("b"), "second");
        let messages: Vec<_> = pass.into_errors().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn code_mode_parses_from_config_text() {
        assert_eq!("static".parse::<CodeMode>().unwrap(), CodeMode::Static);
        assert!("nested".parse::<CodeMode>().is_err());
    }
}
