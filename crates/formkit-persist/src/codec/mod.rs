//! Graph codec for the expression/statement code structure.
//!
//! The [`Encoder`] walks code from given roots and emits every expression
//! once, writing a bare `<CodeExpression id=".."/>` for each repeat. The
//! [`Decoder`] is its inverse: it materializes nodes dependencies-first,
//! resolves repeats through the pass identity map and turns component
//! references into the components' existing expressions.

mod decode;
mod encode;

pub use decode::{DecodedFragment, Decoder};
pub use encode::Encoder;

use formkit_core::{ModelError, ValueError};
use thiserror::Error;

use crate::document::Element;

/// Failure to decode one node of a code fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("<{element}> is missing attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("<{element}> is missing child <{child}>")]
    MissingChild {
        element: String,
        child: &'static str,
    },

    #[error("invalid value '{value}' for attribute '{attribute}'")]
    InvalidAttribute {
        attribute: &'static str,
        value: String,
    },

    /// A bare back-reference to an ID no definition has introduced.
    #[error("unresolved expression reference '{id}'")]
    UnresolvedReference { id: String },

    /// An expression definition that contains itself.
    #[error("expression '{id}' is defined inside its own origin")]
    CyclicDefinition { id: String },

    #[error("unknown class '{0}'")]
    UnknownClass(String),

    #[error("no constructor {class}({params})")]
    UnknownConstructor { class: String, params: String },

    #[error("no method {class}.{name}({params})")]
    UnknownMethod {
        class: String,
        name: String,
        params: String,
    },

    #[error("no field {class}.{name}")]
    UnknownField { class: String, name: String },

    #[error("no component named '{0}'")]
    UnknownComponent(String),

    #[error("unknown {element} type '{kind}'")]
    UnknownProvider { element: String, kind: String },

    #[error("inconsistent statement: {0}")]
    InconsistentStatement(String),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// The value of a mandatory attribute.
pub(crate) fn required<'e>(element: &'e Element, attribute: &'static str) -> Result<&'e str, DecodeError> {
    element.attr(attribute).ok_or_else(|| DecodeError::MissingAttribute {
        element: element.name.clone(),
        attribute,
    })
}

/// The first child element named `child`, which must exist.
pub(crate) fn required_child<'e>(element: &'e Element, child: &'static str) -> Result<&'e Element, DecodeError> {
    element.child(child).ok_or_else(|| DecodeError::MissingChild {
        element: element.name.clone(),
        child,
    })
}
