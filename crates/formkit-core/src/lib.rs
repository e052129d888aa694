//! In-memory design model for visual-builder forms.
//!
//! Nothing in this crate knows how forms are persisted. It provides:
//!
//! - [`id`]: ID newtypes for expressions, statements, variables, components
//! - [`code`]: the expression/statement arena ([`CodeStructure`])
//! - [`symbols`]: member signatures and the [`SymbolResolver`] seam
//! - [`component`] and [`form`]: the component tree and [`FormModel`]
//! - [`reference`]: design references behind connected properties
//! - [`version`]: format versions and the version negotiator

pub mod code;
pub mod component;
pub mod error;
pub mod form;
pub mod id;
pub mod reference;
pub mod symbols;
pub mod types;
pub mod value;
pub mod variable;
pub mod version;

// Re-export commonly used types
pub use code::{CodeStructure, Expression, Origin, Params, Statement, StatementKind};
pub use component::{
    Component, ComponentLookup, ComponentTree, ContainerData, LayoutState, PropertyValue,
    StandardLayout,
};
pub use error::ModelError;
pub use form::FormModel;
pub use id::{ComponentId, ExprId, StmtId, VarId};
pub use reference::{DesignReference, PropertyKey, ReferenceMember, SubBinding};
pub use symbols::{ClassInfo, ConstructorSig, FieldSig, MethodSig, SymbolResolver, SymbolTable};
pub use types::TypeName;
pub use value::{TypedValue, Value, ValueError};
pub use variable::{Variable, VariableKind};
pub use version::{FormFeature, FormVersion, VersionLevels};
