//! Error types for formkit-persist.
//!
//! Two tiers: [`PersistError`] aborts a whole load or save, while
//! [`NonFatalError`] records a problem with one part of a document and lets
//! the pass continue.

use std::fmt;

use formkit_core::ModelError;
use serde::Serialize;
use thiserror::Error;

/// Errors that abort a load or save.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The document is not well-formed XML.
    #[error("invalid XML: {0}")]
    Xml(String),

    /// The document has no root element at all.
    #[error("empty document")]
    EmptyDocument,

    /// The root element is not `<Form>`.
    #[error("missing main element: expected <Form>, found <{found}>")]
    MissingFormElement { found: String },

    /// The `version` attribute is missing or not a known version.
    #[error("unsupported form version: '{token}'")]
    UnsupportedVersion { token: String },

    /// Neither the options nor the document name the form's base class.
    #[error("cannot determine the form's base class")]
    UnknownBaseClass,

    /// The base class is named but cannot be resolved.
    #[error("invalid base class: {0}")]
    InvalidBaseClass(String),

    /// A model invariant failed while building structurally mandatory nodes.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Reading or writing the storage file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Load paths
// ---------------------------------------------------------------------------

/// One step of a [`LoadPath`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum PathSegment {
    Form,
    Component(String),
    Property(String),
    SyntheticProperty(String),
    AuxValue(String),
    Layout,
    Constraints,
    LayoutCode,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Form => f.write_str("Form"),
            PathSegment::Component(name) => f.write_str(name),
            PathSegment::Property(name) => write!(f, "Property {}", name),
            PathSegment::SyntheticProperty(name) => write!(f, "Synthetic property {}", name),
            PathSegment::AuxValue(name) => write!(f, "Aux value {}", name),
            PathSegment::Layout => f.write_str("Layout"),
            PathSegment::Constraints => f.write_str("Layout constraints"),
            PathSegment::LayoutCode => f.write_str("Layout code"),
        }
    }
}

/// Where in a document a non-fatal error occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadPath(Vec<PathSegment>);

impl LoadPath {
    /// The path of the document root.
    pub fn root() -> Self {
        LoadPath(vec![PathSegment::Form])
    }

    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        LoadPath(segments)
    }

    pub fn component(&self, name: &str) -> Self {
        self.child(PathSegment::Component(name.to_string()))
    }

    pub fn property(&self, name: &str) -> Self {
        self.child(PathSegment::Property(name.to_string()))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for LoadPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// A problem with one part of a document; the rest still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{path}: {message}")]
pub struct NonFatalError {
    pub path: LoadPath,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_renders_with_arrows() {
        let path = LoadPath::root()
            .component("jPanel1")
            .child(PathSegment::Layout)
            .property("horizontalGap");
        assert_eq!(
            path.to_string(),
            "Form -> jPanel1 -> Layout -> Property horizontalGap"
        );
    }

    #[test]
    fn non_fatal_error_prefixes_path() {
        let err = NonFatalError {
            path: LoadPath::root().component("jButton1").property("icon"),
            message: "unknown class 'com.acme.Icon'".into(),
        };
        assert_eq!(
            err.to_string(),
            "Form -> jButton1 -> Property icon: unknown class 'com.acme.Icon'"
        );
    }
}
