//! Conversion of the legacy layout format into layout code.
//!
//! Old forms store a container's layout as a `Layout` element naming a
//! legacy layout class with a few parameters, and each child's placement as
//! `Constraint` elements naming a legacy constraints class. The converters
//! here rebuild the equivalent code: a `setLayout` call on the container
//! delegate and per-child add statements, driven by [`table::LEGACY_LAYOUTS`].

pub mod constraints;
pub mod layout;
pub mod table;

pub use constraints::{convert_constraints, default_component_code, ConstraintConversion};
pub use layout::{convert_layout, ConvertedLayout, LayoutConversion};
pub use table::{LegacyLayoutEntry, LEGACY_LAYOUTS};

use formkit_core::{
    types::join_types, CodeStructure, ConstructorSig, ExprId, FieldSig, MethodSig, ModelError,
    SymbolResolver, TypeName,
};
use thiserror::Error;

/// A legacy element that matched the table but could not be turned into
/// code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("no constructor {class}({params})")]
    MissingConstructor { class: String, params: String },

    #[error("no method {class}.{name}({params})")]
    MissingMethod {
        class: String,
        name: String,
        params: String,
    },

    #[error("no field {class}.{name}")]
    MissingField { class: String, name: String },

    #[error("invalid value '{value}' for '{attribute}'")]
    InvalidValue { attribute: String, value: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// The expressions layout code is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutTarget {
    /// The container's own expression.
    pub container: ExprId,
    /// Where children are added and the layout is set; equal to
    /// `container` unless the container has a content pane.
    pub delegate: ExprId,
}

fn type_list(names: &[&str]) -> Vec<TypeName> {
    names.iter().map(|n| TypeName::new(*n)).collect()
}

pub(crate) fn constructor<S: SymbolResolver + ?Sized>(
    symbols: &S,
    class: &str,
    params: &[&str],
) -> Result<ConstructorSig, ConvertError> {
    let params = type_list(params);
    symbols
        .resolve_constructor(&TypeName::new(class), &params)
        .ok_or_else(|| ConvertError::MissingConstructor {
            class: class.to_string(),
            params: join_types(&params),
        })
}

/// Resolve `name(params)` on the type of `receiver`.
pub(crate) fn method_on<S: SymbolResolver + ?Sized>(
    code: &CodeStructure,
    symbols: &S,
    receiver: ExprId,
    name: &str,
    params: &[&str],
) -> Result<MethodSig, ConvertError> {
    let class = code.expression(receiver)?.value_type().clone();
    let params = type_list(params);
    symbols
        .resolve_method(&class, name, &params)
        .ok_or_else(|| ConvertError::MissingMethod {
            class: class.to_string(),
            name: name.to_string(),
            params: join_types(&params),
        })
}

pub(crate) fn field<S: SymbolResolver + ?Sized>(
    symbols: &S,
    class: &str,
    name: &str,
) -> Result<FieldSig, ConvertError> {
    symbols
        .resolve_field(&TypeName::new(class), name)
        .ok_or_else(|| ConvertError::MissingField {
            class: class.to_string(),
            name: name.to_string(),
        })
}
