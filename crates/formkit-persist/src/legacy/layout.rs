//! Legacy `Layout` elements to `setLayout` code.

use formkit_core::types::{CONTAINER, LAYOUT_MANAGER};
use formkit_core::{
    CodeStructure, ExprId, Origin, StandardLayout, StatementKind, StmtId, SymbolResolver, TypeName, Value,
};
use indexmap::IndexMap;

use super::table::{entry_for_layout_class, LegacyLayoutEntry, ParamDefault, LEGACY_LAYOUTS};
use super::{constructor, method_on, ConvertError, LayoutTarget};

/// A legacy layout rebuilt as code.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedLayout {
    /// The table row the legacy class matched. Children's constraints are
    /// matched against this row.
    pub row: &'static LegacyLayoutEntry,
    /// The resulting layout; differs from `row.layout` only for the null
    /// layout stored as an absolute layout.
    pub layout: StandardLayout,
    /// The `setLayout` statement, if the kind has a layout manager.
    pub statements: Vec<StmtId>,
    /// Stored parameters under their current property names.
    pub properties: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutConversion {
    /// The class is not in the legacy table.
    Unknown,
    Converted(ConvertedLayout),
}

const ABSOLUTE_LAYOUT: &str = "org.netbeans.lib.awtextra.AbsoluteLayout";

fn default_value(default: ParamDefault) -> Value {
    match default {
        ParamDefault::Int(n) => Value::Int(n),
        ParamDefault::Bool(b) => Value::Bool(b),
    }
}

fn has_manager(layout: StandardLayout) -> bool {
    matches!(
        layout,
        StandardLayout::Border
            | StandardLayout::Flow
            | StandardLayout::Box
            | StandardLayout::GridBag
            | StandardLayout::Grid
            | StandardLayout::Card
    )
}

/// Convert a legacy layout with its stored `(name, value)` parameters.
///
/// Missing parameters take the row's defaults; which leading parameters are
/// passed to the layout constructor follows the row's shapes.
pub fn convert_layout<S: SymbolResolver + ?Sized>(
    code: &mut CodeStructure,
    symbols: &S,
    legacy_class: &str,
    stored: &[(String, Value)],
    target: LayoutTarget,
) -> Result<LayoutConversion, ConvertError> {
    let Some(row) = entry_for_layout_class(legacy_class) else {
        return Ok(LayoutConversion::Unknown);
    };

    let found: Vec<Option<&Value>> = row
        .legacy_params
        .iter()
        .map(|name| stored.iter().find(|(n, _)| n == name).map(|(_, v)| v))
        .collect();

    let mut properties = IndexMap::new();
    for (value, property) in found.iter().zip(row.delegate_properties) {
        if let (Some(value), Some(property)) = (value, property) {
            properties.insert(property.to_string(), (*value).clone());
        }
    }

    let (layout, manager) = match row.layout {
        StandardLayout::Absolute => {
            let null_layout = found
                .first()
                .copied()
                .flatten()
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if null_layout {
                (StandardLayout::Null, code.create_null(TypeName::new(LAYOUT_MANAGER)))
            } else {
                let sig = constructor(symbols, ABSOLUTE_LAYOUT, &[])?;
                (StandardLayout::Absolute, code.create_constructor_call(sig, [])?)
            }
        }
        // The old layered-pane support is a null layout.
        StandardLayout::JLayeredPane => (
            StandardLayout::JLayeredPane,
            code.create_null(TypeName::new(LAYOUT_MANAGER)),
        ),
        kind if has_manager(kind) => (kind, manager_expression(code, symbols, row, &found, target)?),
        kind => {
            return Ok(LayoutConversion::Converted(ConvertedLayout {
                row,
                layout: kind,
                statements: Vec::new(),
                properties,
            }))
        }
    };

    let set_layout = method_on(code, symbols, target.delegate, "setLayout", &[LAYOUT_MANAGER])?;
    let statement = code.create_method_statement(Some(target.delegate), set_layout, [manager])?;
    Ok(LayoutConversion::Converted(ConvertedLayout {
        row,
        layout,
        statements: vec![statement],
        properties,
    }))
}

fn manager_expression<S: SymbolResolver + ?Sized>(
    code: &mut CodeStructure,
    symbols: &S,
    row: &LegacyLayoutEntry,
    found: &[Option<&Value>],
    target: LayoutTarget,
) -> Result<ExprId, ConvertError> {
    let stored: Vec<bool> = found.iter().map(Option::is_some).collect();
    let arity = row.arity(&stored);

    let mut params = Vec::with_capacity(arity + 1);
    let mut types = Vec::with_capacity(arity + 1);
    if row.takes_container {
        params.push(target.delegate);
        types.push(CONTAINER);
    }
    for (value, default) in found.iter().zip(row.defaults).take(arity) {
        let value = value.cloned().unwrap_or_else(|| default_value(*default));
        params.push(code.create_literal(TypeName::int(), value));
        types.push("int");
    }

    let class = row.current_class.unwrap_or(LAYOUT_MANAGER);
    let sig = constructor(symbols, class, &types)?;
    Ok(code.create_constructor_call(sig, params)?)
}

/// The standard layout a container's decoded layout code sets up.
///
/// Containers with built-in child handling (scroll, split, tabbed and
/// layered panes, tool bars) are recognized by class. Otherwise the first
/// `setLayout` on the delegate decides: a known manager constructor gives its
/// kind, `null` gives the null layout. `None` when neither applies.
pub fn recognize_layout<S: SymbolResolver + ?Sized>(
    code: &CodeStructure,
    symbols: &S,
    container_class: &TypeName,
    statements: &[StmtId],
    delegate: ExprId,
) -> Option<StandardLayout> {
    let intrinsic = LEGACY_LAYOUTS.iter().find(|row| {
        !has_manager(row.layout)
            && row.layout != StandardLayout::Absolute
            && row
                .current_class
                .is_some_and(|class| symbols.is_subclass(container_class, &TypeName::new(class)))
    });
    if let Some(row) = intrinsic {
        return Some(row.layout);
    }

    let manager = statements.iter().find_map(|&id| {
        let statement = code.statement(id).ok()?;
        match &statement.kind {
            StatementKind::Method { signature }
                if signature.name == "setLayout" && statement.parent == Some(delegate) =>
            {
                statement.params.first().copied()
            }
            _ => None,
        }
    })?;
    match &code.expression(manager).ok()?.origin {
        Origin::Literal { value: Value::Null, .. } => Some(StandardLayout::Null),
        Origin::Constructor { signature, .. } => LEGACY_LAYOUTS
            .iter()
            .find(|row| {
                (has_manager(row.layout) || row.layout == StandardLayout::Absolute)
                    && row.current_class == Some(signature.declaring.as_str())
            })
            .map(|row| row.layout),
        _ => None,
    }
}
