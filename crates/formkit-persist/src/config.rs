//! Load and save options, and the JSON configuration file grouping them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use formkit_core::{ClassInfo, SymbolTable};

use crate::error::PersistError;
use crate::pass::CodeMode;

/// Options for loading a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Name of the top component.
    /// `None` means the file stem when loading a file, else `"Form"`.
    pub form_name: Option<String>,

    /// Base class of the form, overriding the document's FormInfo type.
    pub base_class: Option<String>,
}

/// Options for saving a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    /// How layout code fragments are written.
    pub code_mode: CodeMode,

    /// Spaces per indentation level.
    pub indent: usize,
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions {
            code_mode: CodeMode::Flow,
            indent: 2,
        }
    }
}

/// Everything a `--config` file can set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    pub load: LoadOptions,
    pub save: SaveOptions,

    /// Classes registered on top of the built-in symbol table.
    pub extra_classes: Vec<ClassInfo>,
}

impl PersistConfig {
    pub fn from_json(text: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, PersistError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// The built-in symbol table extended with `extra_classes`.
    pub fn symbol_table(&self) -> SymbolTable {
        let mut table = SymbolTable::with_builtins();
        for class in &self.extra_classes {
            table.register(class.clone());
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formkit_core::{SymbolResolver, TypeName};

    #[test]
    fn empty_config_uses_defaults() {
        let config = PersistConfig::from_json("{}").unwrap();
        assert_eq!(config.load, LoadOptions::default());
        assert_eq!(config.save.code_mode, CodeMode::Flow);
        assert_eq!(config.save.indent, 2);
        assert!(config.extra_classes.is_empty());
    }

    #[test]
    fn extra_classes_extend_the_symbol_table() {
        let config = PersistConfig::from_json(
            r#"{
                "save": { "code_mode": "static" },
                "load": { "base_class": "com.acme.Wizard" },
                "extra_classes": [
                    { "name": "com.acme.Wizard", "superclass": "javax.swing.JPanel",
                      "methods": [ { "name": "next", "params": [] } ] }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.save.code_mode, CodeMode::Static);
        assert_eq!(config.load.base_class.as_deref(), Some("com.acme.Wizard"));

        let symbols = config.symbol_table();
        let wizard = TypeName::new("com.acme.Wizard");
        assert!(symbols.resolve_class("com.acme.Wizard").is_some());
        assert!(symbols.is_subclass(&wizard, &TypeName::new("java.awt.Container")));
        assert_eq!(
            symbols.resolve_method(&wizard, "next", &[]).unwrap().returns,
            TypeName::new("void")
        );
    }

    #[test]
    fn malformed_config_is_a_config_error() {
        let err = PersistConfig::from_json("{ \"save\": 3 }").unwrap_err();
        assert!(matches!(err, PersistError::Config(_)));
    }
}
