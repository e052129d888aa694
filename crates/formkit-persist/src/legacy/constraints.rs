//! Legacy `Constraint` elements to add statements.
//!
//! Old forms kept every constraints object ever set on a component, one
//! `Constraint` element per layout kind. Only the one matching the parent
//! container's legacy layout is converted; the others are ignored.

use formkit_core::types::{COMPONENT, OBJECT, STRING};
use formkit_core::{CodeStructure, ExprId, StandardLayout, StmtId, SymbolResolver, TypeName, Value};

use super::table::entry_for_constraints_class;
use super::{constructor, field, method_on, ConvertError, LayoutTarget};
use crate::document::Element;
use crate::names::{ATTR_NAME, ATTR_VALUE, PROPERTY};
use crate::values::read_value;

/// Outcome of converting one `Constraint` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintConversion {
    /// Not a legacy constraints class, or one for another layout.
    NotForLayout,
    /// Matched, but carries nothing the current code can express.
    CannotConvert,
    Converted {
        statements: Vec<StmtId>,
        /// A non-default layered-pane layer for the component.
        layer: Option<i64>,
    },
}

const BORDER_CONSTRAINTS: &str = "BorderConstraints";
const GRID_BAG_CONSTRAINTS: &str = "GridBagConstraints";
const TABBED_CONSTRAINTS: &str = "JTabbedPaneConstraints";
const SPLIT_CONSTRAINTS: &str = "JSplitPaneConstraints";
const CARD_CONSTRAINTS: &str = "CardConstraints";
const LAYERED_CONSTRAINTS: &str = "JLayeredPaneConstraints";
const ABSOLUTE_CONSTRAINTS: &str = "AbsoluteConstraints";

const GRID_BAG_CLASS: &str = "java.awt.GridBagConstraints";
const INSETS_CLASS: &str = "java.awt.Insets";
const ABSOLUTE_CONSTRAINTS_CLASS: &str = "org.netbeans.lib.awtextra.AbsoluteConstraints";
const ABSOLUTE_LAYOUT_CLASS: &str = "org.netbeans.lib.awtextra.AbsoluteLayout";
const ICON: &str = "javax.swing.Icon";

/// `(attribute, field)`; the last two fields are `double`, the rest `int`.
const GRID_BAG_FIELDS: [(&str, &str); 10] = [
    ("gridX", "gridx"),
    ("gridY", "gridy"),
    ("gridWidth", "gridwidth"),
    ("gridHeight", "gridheight"),
    ("fill", "fill"),
    ("ipadX", "ipadx"),
    ("ipadY", "ipady"),
    ("anchor", "anchor"),
    ("weightX", "weightx"),
    ("weightY", "weighty"),
];

const INSETS_ATTRS: [&str; 4] = ["insetsTop", "insetsLeft", "insetsBottom", "insetsRight"];

const BOUNDS_ATTRS: [&str; 4] = ["x", "y", "width", "height"];

/// Convert one `Constraint` element of `component`.
///
/// `row` is the legacy layout row of the parent container; `None` when the
/// container has no legacy layout, in which case any constraints kind is
/// accepted.
pub fn convert_constraints<S: SymbolResolver + ?Sized>(
    code: &mut CodeStructure,
    symbols: &S,
    row: Option<StandardLayout>,
    constraint: &Element,
    component: ExprId,
    target: LayoutTarget,
) -> Result<ConstraintConversion, ConvertError> {
    let Some(entry) = constraint.attr(ATTR_VALUE).and_then(entry_for_constraints_class) else {
        return Ok(ConstraintConversion::NotForLayout);
    };
    if row.is_some_and(|row| row != entry.layout) {
        return Ok(ConstraintConversion::NotForLayout);
    }
    if !entry.reasonable_constraints {
        return Ok(ConstraintConversion::CannotConvert);
    }
    let Some(data) = constraint.children.first() else {
        return Ok(ConstraintConversion::CannotConvert);
    };

    let mut converter = Converter {
        code,
        symbols,
        component,
        target,
        statements: Vec::new(),
        layer: None,
    };
    let converted = match (entry.layout, data.name.as_str()) {
        (StandardLayout::Border, BORDER_CONSTRAINTS) => converter.named_add(data, "direction")?,
        (StandardLayout::Card, CARD_CONSTRAINTS) => converter.named_add(data, "cardName")?,
        (StandardLayout::GridBag, GRID_BAG_CONSTRAINTS) => converter.grid_bag(data)?,
        (StandardLayout::JTabbedPane, TABBED_CONSTRAINTS) => converter.tab(data)?,
        (StandardLayout::JSplitPane, SPLIT_CONSTRAINTS) => converter.split(data)?,
        (StandardLayout::JLayeredPane, LAYERED_CONSTRAINTS) => converter.layered(data)?,
        (StandardLayout::Absolute, ABSOLUTE_CONSTRAINTS) => converter.absolute(data)?,
        _ => false,
    };
    if !converted {
        return Ok(ConstraintConversion::CannotConvert);
    }
    Ok(ConstraintConversion::Converted {
        statements: converter.statements,
        layer: converter.layer,
    })
}

/// The add statement of a child without usable constraints.
pub fn default_component_code<S: SymbolResolver + ?Sized>(
    code: &mut CodeStructure,
    symbols: &S,
    row: Option<StandardLayout>,
    component: ExprId,
    target: LayoutTarget,
) -> Result<StmtId, ConvertError> {
    if row == Some(StandardLayout::JScrollPane) {
        let sig = method_on(code, symbols, target.container, "setViewportView", &[COMPONENT])?;
        return Ok(code.create_method_statement(Some(target.container), sig, [component])?);
    }
    let sig = method_on(code, symbols, target.delegate, "add", &[COMPONENT])?;
    Ok(code.create_method_statement(Some(target.delegate), sig, [component])?)
}

// ---------------------------------------------------------------------------
// Per-kind conversion
// ---------------------------------------------------------------------------

struct Converter<'a, S: ?Sized> {
    code: &'a mut CodeStructure,
    symbols: &'a S,
    component: ExprId,
    target: LayoutTarget,
    statements: Vec<StmtId>,
    layer: Option<i64>,
}

fn parse_int(attribute: &str, text: &str) -> Result<i64, ConvertError> {
    text.trim().parse().map_err(|_| ConvertError::InvalidValue {
        attribute: attribute.to_string(),
        value: text.to_string(),
    })
}

fn parse_double(attribute: &str, text: &str) -> Result<f64, ConvertError> {
    text.trim().parse().map_err(|_| ConvertError::InvalidValue {
        attribute: attribute.to_string(),
        value: text.to_string(),
    })
}

impl<S: SymbolResolver + ?Sized> Converter<'_, S> {
    fn int(&mut self, value: i64) -> ExprId {
        self.code.create_literal(TypeName::int(), Value::Int(value))
    }

    fn string(&mut self, value: &str) -> ExprId {
        self.code.create_literal(TypeName::string(), Value::Str(value.to_string()))
    }

    fn call(&mut self, receiver: ExprId, name: &str, types: &[&str], params: Vec<ExprId>) -> Result<(), ConvertError> {
        let sig = method_on(self.code, self.symbols, receiver, name, types)?;
        let stmt = self.code.create_method_statement(Some(receiver), sig, params)?;
        self.statements.push(stmt);
        Ok(())
    }

    fn add_with_constraints(&mut self, constraints: ExprId) -> Result<(), ConvertError> {
        let delegate = self.target.delegate;
        let component = self.component;
        self.call(delegate, "add", &[COMPONENT, OBJECT], vec![component, constraints])
    }

    fn simple_add(&mut self) -> Result<(), ConvertError> {
        let delegate = self.target.delegate;
        let component = self.component;
        self.call(delegate, "add", &[COMPONENT], vec![component])
    }

    /// `x y width height`, defaulting to `0 0 -1 -1`.
    fn bounds(&mut self, data: &Element) -> Result<Vec<ExprId>, ConvertError> {
        let mut params = Vec::with_capacity(4);
        for (i, attribute) in BOUNDS_ATTRS.iter().enumerate() {
            let value = match data.attr(attribute) {
                Some(text) => parse_int(attribute, text)?,
                None if i < 2 => 0,
                None => -1,
            };
            params.push(self.int(value));
        }
        Ok(params)
    }

    /// `add(component, "<attribute value>")` on the delegate.
    fn named_add(&mut self, data: &Element, attribute: &str) -> Result<bool, ConvertError> {
        let Some(name) = data.attr(attribute) else {
            return Ok(false);
        };
        let name = self.string(name);
        self.add_with_constraints(name)?;
        Ok(true)
    }

    fn grid_bag(&mut self, data: &Element) -> Result<bool, ConvertError> {
        let sig = constructor(self.symbols, GRID_BAG_CLASS, &[])?;
        let constraints = self.code.create_constructor_call(sig, [])?;

        for (i, (attribute, name)) in GRID_BAG_FIELDS.iter().enumerate() {
            let Some(text) = data.attr(attribute) else {
                continue;
            };
            let value = if i < 8 {
                self.int(parse_int(attribute, text)?)
            } else {
                let value = parse_double(attribute, text)?;
                self.code.create_literal(TypeName::double(), Value::Float(value))
            };
            let sig = field(self.symbols, GRID_BAG_CLASS, name)?;
            let stmt = self.code.create_field_statement(Some(constraints), sig, value)?;
            self.statements.push(stmt);
        }

        let mut insets = Vec::with_capacity(4);
        for attribute in INSETS_ATTRS {
            let value = data.attr(attribute).map(|t| parse_int(attribute, t)).transpose()?;
            insets.push(self.int(value.unwrap_or(0)));
        }
        let sig = constructor(self.symbols, INSETS_CLASS, &["int", "int", "int", "int"])?;
        let insets = self.code.create_constructor_call(sig, insets)?;
        let sig = field(self.symbols, GRID_BAG_CLASS, "insets")?;
        let stmt = self.code.create_field_statement(Some(constraints), sig, insets)?;
        self.statements.push(stmt);

        self.add_with_constraints(constraints)?;
        Ok(true)
    }

    fn tab(&mut self, data: &Element) -> Result<bool, ConvertError> {
        let mut title = None;
        let mut tool_tip = None;
        let mut icon = None;
        for property in data.children_named(PROPERTY) {
            // An unreadable tab property is left out like a missing one.
            let Ok((_, value)) = read_value(property, self.symbols) else {
                continue;
            };
            match property.attr(ATTR_NAME) {
                Some("tabTitle") => title = Some(value),
                Some("tabToolTip") => tool_tip = Some(value),
                Some("tabIcon") => icon = Some(value),
                _ => {}
            }
        }
        let title = title.or_else(|| data.attr("tabName").map(|t| Value::Str(t.to_string())));
        let tool_tip = tool_tip.or_else(|| data.attr("toolTip").map(|t| Value::Str(t.to_string())));

        let container = self.target.container;
        let component = self.component;
        let title = self.code.create_literal(TypeName::string(), title.unwrap_or(Value::Null));
        match (tool_tip, icon) {
            (Some(tool_tip), icon) => {
                let icon = self.code.create_literal(TypeName::new(ICON), icon.unwrap_or(Value::Null));
                let tool_tip = self.code.create_literal(TypeName::string(), tool_tip);
                self.call(
                    container,
                    "addTab",
                    &[STRING, ICON, COMPONENT, STRING],
                    vec![title, icon, component, tool_tip],
                )?;
            }
            (None, Some(icon)) => {
                let icon = self.code.create_literal(TypeName::new(ICON), icon);
                self.call(container, "addTab", &[STRING, ICON, COMPONENT], vec![title, icon, component])?;
            }
            (None, None) => {
                self.call(container, "addTab", &[STRING, COMPONENT], vec![title, component])?;
            }
        }
        Ok(true)
    }

    fn split(&mut self, data: &Element) -> Result<bool, ConvertError> {
        let method = match data.attr("position") {
            Some("top") => "setTopComponent",
            Some("bottom") => "setBottomComponent",
            Some("left") => "setLeftComponent",
            Some("right") => "setRightComponent",
            _ => return Ok(false),
        };
        let container = self.target.container;
        let component = self.component;
        self.call(container, method, &[COMPONENT], vec![component])?;
        Ok(true)
    }

    fn layered(&mut self, data: &Element) -> Result<bool, ConvertError> {
        let bounds = self.bounds(data)?;
        let component = self.component;
        self.call(component, "setBounds", &["int", "int", "int", "int"], bounds)?;
        self.simple_add()?;

        if let Some(text) = data.attr("layer") {
            let layer = parse_int("layer", text)?;
            // 0 is the default layer.
            if layer != 0 {
                self.layer = Some(layer);
            }
        }
        Ok(true)
    }

    fn absolute(&mut self, data: &Element) -> Result<bool, ConvertError> {
        let bounds = self.bounds(data)?;

        // The same constraints class serves the null layout; tell them
        // apart by the layout already set on the delegate.
        let set_layout = self.code.method_statements(self.target.delegate, "setLayout")?;
        let null_layout = match set_layout.first() {
            Some(&stmt) => {
                let statement = self.code.statement(stmt)?;
                match statement.params.first() {
                    Some(&manager) => {
                        self.code.expression(manager)?.value_type().as_str() != ABSOLUTE_LAYOUT_CLASS
                    }
                    None => true,
                }
            }
            None => true,
        };

        if null_layout {
            let component = self.component;
            self.call(component, "setBounds", &["int", "int", "int", "int"], bounds)?;
            self.simple_add()?;
        } else {
            let sig = constructor(self.symbols, ABSOLUTE_CONSTRAINTS_CLASS, &["int", "int", "int", "int"])?;
            let constraints = self.code.create_constructor_call(sig, bounds)?;
            self.add_with_constraints(constraints)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formkit_core::{ComponentId, Origin, StatementKind, SymbolTable};

    use crate::legacy::layout::{convert_layout, LayoutConversion};

    const PKG: &str = "org.netbeans.modules.form.compat2.layouts.";

    struct Fixture {
        symbols: SymbolTable,
        code: CodeStructure,
        target: LayoutTarget,
        button: ExprId,
    }

    fn fixture(container_class: &str) -> Fixture {
        let mut code = CodeStructure::new();
        let container = code.create_component_reference(ComponentId(1), TypeName::new(container_class));
        let button = code.create_component_reference(ComponentId(2), TypeName::new("javax.swing.JButton"));
        Fixture {
            symbols: SymbolTable::with_builtins(),
            code,
            target: LayoutTarget {
                container,
                delegate: container,
            },
            button,
        }
    }

    fn constraint(class: &str, data: Element) -> Element {
        Element::new("Constraint")
            .with_attr("layoutClass", format!("{}{}", PKG, class))
            .with_attr(ATTR_VALUE, format!("{}{}", PKG, class))
            .with_child(data)
    }

    fn convert(f: &mut Fixture, row: Option<StandardLayout>, el: &Element) -> ConstraintConversion {
        convert_constraints(&mut f.code, &f.symbols, row, el, f.button, f.target).unwrap()
    }

    fn statements(result: ConstraintConversion) -> Vec<StmtId> {
        match result {
            ConstraintConversion::Converted { statements, .. } => statements,
            other => panic!("expected converted constraints, got {:?}", other),
        }
    }

    fn method_name(code: &CodeStructure, stmt: StmtId) -> String {
        match &code.statement(stmt).unwrap().kind {
            StatementKind::Method { signature } => signature.name.clone(),
            other => panic!("not a method statement: {:?}", other),
        }
    }

    fn literal(code: &CodeStructure, expr: ExprId) -> Value {
        match &code.expression(expr).unwrap().origin {
            Origin::Literal { value, .. } => value.clone(),
            other => panic!("not a literal: {:?}", other),
        }
    }

    #[test]
    fn border_direction_becomes_add_with_constraints() {
        let mut f = fixture("javax.swing.JPanel");
        let el = constraint(
            "DesignBorderLayout$BorderConstraintsDescription",
            Element::new("BorderConstraints").with_attr("direction", "North"),
        );
        let stmts = statements(convert(&mut f, Some(StandardLayout::Border), &el));
        assert_eq!(stmts.len(), 1);
        let stmt = f.code.statement(stmts[0]).unwrap();
        assert_eq!(stmt.parent, Some(f.target.delegate));
        assert_eq!(stmt.params[0], f.button);
        assert_eq!(literal(&f.code, stmt.params[1]), Value::Str("North".into()));
    }

    #[test]
    fn constraints_of_another_layout_are_skipped() {
        let mut f = fixture("javax.swing.JPanel");
        let el = constraint(
            "DesignBorderLayout$BorderConstraintsDescription",
            Element::new("BorderConstraints").with_attr("direction", "North"),
        );
        assert_eq!(
            convert(&mut f, Some(StandardLayout::GridBag), &el),
            ConstraintConversion::NotForLayout
        );
        assert_eq!(f.code.statement_count(), 0);
    }

    #[test]
    fn unreasonable_kinds_cannot_convert() {
        let mut f = fixture("javax.swing.JPanel");
        let el = constraint(
            "DesignFlowLayout$FlowConstraintsDescription",
            Element::new("FlowConstraints"),
        );
        assert_eq!(
            convert(&mut f, Some(StandardLayout::Flow), &el),
            ConstraintConversion::CannotConvert
        );
    }

    #[test]
    fn grid_bag_sets_fields_and_insets() {
        let mut f = fixture("javax.swing.JPanel");
        let el = constraint(
            "DesignGridBagLayout$GridBagConstraintsDescription",
            Element::new("GridBagConstraints")
                .with_attr("gridX", "1")
                .with_attr("gridY", "2")
                .with_attr("weightX", "0.5")
                .with_attr("insetsTop", "4"),
        );
        let stmts = statements(convert(&mut f, Some(StandardLayout::GridBag), &el));
        assert_eq!(stmts.len(), 5);
        assert_eq!(method_name(&f.code, stmts[4]), "add");
        let add = f.code.statement(stmts[4]).unwrap();
        let constraints = add.params[1];

        let fields: Vec<(String, StmtId)> = f
            .code
            .expression(constraints)
            .unwrap()
            .statements
            .iter()
            .map(|&s| match &f.code.statement(s).unwrap().kind {
                StatementKind::FieldAssign { signature } => (signature.name.clone(), s),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["gridx", "gridy", "weightx", "insets"]);

        let weight = f.code.statement(fields[2].1).unwrap().params[0];
        assert_eq!(literal(&f.code, weight), Value::Float(0.5));

        let insets = f.code.statement(fields[3].1).unwrap().params[0];
        let values: Vec<Value> = f
            .code
            .expression(insets)
            .unwrap()
            .origin
            .params()
            .iter()
            .map(|&p| literal(&f.code, p))
            .collect();
        assert_eq!(values, vec![Value::Int(4), Value::Int(0), Value::Int(0), Value::Int(0)]);
    }

    #[test]
    fn malformed_number_is_an_error() {
        let mut f = fixture("javax.swing.JPanel");
        let el = constraint(
            "DesignGridBagLayout$GridBagConstraintsDescription",
            Element::new("GridBagConstraints").with_attr("gridX", "left"),
        );
        let err = convert_constraints(&mut f.code, &f.symbols, None, &el, f.button, f.target).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidValue { .. }));
    }

    #[test]
    fn tab_with_tool_tip_uses_the_four_argument_form() {
        let mut f = fixture("javax.swing.JTabbedPane");
        let el = constraint(
            "support.JTabbedPaneSupportLayout$JTabbedPaneConstraintsDescription",
            Element::new("JTabbedPaneConstraints")
                .with_attr("tabName", "General")
                .with_attr("toolTip", "General settings"),
        );
        let stmts = statements(convert(&mut f, Some(StandardLayout::JTabbedPane), &el));
        let stmt = f.code.statement(stmts[0]).unwrap();
        assert_eq!(stmt.parent, Some(f.target.container));
        assert_eq!(stmt.params.len(), 4);
        assert_eq!(literal(&f.code, stmt.params[0]), Value::Str("General".into()));
        assert_eq!(literal(&f.code, stmt.params[1]), Value::Null);
        assert_eq!(stmt.params[2], f.button);
    }

    #[test]
    fn tab_title_property_wins_over_attribute() {
        let mut f = fixture("javax.swing.JTabbedPane");
        let el = constraint(
            "support.JTabbedPaneSupportLayout$JTabbedPaneConstraintsDescription",
            Element::new("JTabbedPaneConstraints")
                .with_attr("tabName", "old")
                .with_child(
                    Element::new(PROPERTY)
                        .with_attr(ATTR_NAME, "tabTitle")
                        .with_attr("type", STRING)
                        .with_attr(ATTR_VALUE, "new"),
                ),
        );
        let stmts = statements(convert(&mut f, Some(StandardLayout::JTabbedPane), &el));
        let stmt = f.code.statement(stmts[0]).unwrap();
        assert_eq!(stmt.params.len(), 2);
        assert_eq!(literal(&f.code, stmt.params[0]), Value::Str("new".into()));
    }

    #[test]
    fn split_position_selects_the_setter() {
        let mut f = fixture("javax.swing.JSplitPane");
        let row = Some(StandardLayout::JSplitPane);
        let class = "support.JSplitPaneSupportLayout$JSplitPaneConstraintsDescription";

        let left = constraint(class, Element::new("JSplitPaneConstraints").with_attr("position", "left"));
        let stmts = statements(convert(&mut f, row, &left));
        assert_eq!(method_name(&f.code, stmts[0]), "setLeftComponent");

        let odd = constraint(class, Element::new("JSplitPaneConstraints").with_attr("position", "middle"));
        assert_eq!(convert(&mut f, row, &odd), ConstraintConversion::CannotConvert);
    }

    #[test]
    fn layered_pane_constraints_carry_bounds_and_layer() {
        let mut f = fixture("javax.swing.JLayeredPane");
        let el = constraint(
            "support.JLayeredPaneSupportLayout$JLayeredPaneConstraintsDescription",
            Element::new("JLayeredPaneConstraints")
                .with_attr("x", "10")
                .with_attr("y", "20")
                .with_attr("layer", "100"),
        );
        let result = convert(&mut f, Some(StandardLayout::JLayeredPane), &el);
        let ConstraintConversion::Converted { statements, layer } = result else {
            panic!("expected converted constraints");
        };
        assert_eq!(layer, Some(100));
        assert_eq!(method_name(&f.code, statements[0]), "setBounds");
        assert_eq!(method_name(&f.code, statements[1]), "add");
        let bounds: Vec<Value> = f
            .code
            .statement(statements[0])
            .unwrap()
            .params
            .iter()
            .map(|&p| literal(&f.code, p))
            .collect();
        assert_eq!(bounds, vec![Value::Int(10), Value::Int(20), Value::Int(-1), Value::Int(-1)]);
    }

    #[test]
    fn absolute_constraints_follow_the_converted_layout() {
        let class = "DesignAbsoluteLayout$AbsoluteConstraintsDescription";
        let data = Element::new("AbsoluteConstraints").with_attr("width", "80");

        for (null_layout, expected) in [(false, "add"), (true, "setBounds")] {
            let mut f = fixture("javax.swing.JPanel");
            let stored = vec![("useNullLayout".to_string(), Value::Bool(null_layout))];
            let layout = convert_layout(
                &mut f.code,
                &f.symbols,
                &format!("{}DesignAbsoluteLayout", PKG),
                &stored,
                f.target,
            )
            .unwrap();
            let LayoutConversion::Converted(layout) = layout else {
                panic!("expected converted layout");
            };
            let el = constraint(class, data.clone());
            let stmts = statements(convert(&mut f, Some(layout.row.layout), &el));
            assert_eq!(method_name(&f.code, stmts[0]), expected, "null layout: {}", null_layout);
        }
    }

    #[test]
    fn default_code_for_scroll_pane_sets_the_viewport() {
        let mut f = fixture("javax.swing.JScrollPane");
        let stmt = default_component_code(
            &mut f.code,
            &f.symbols,
            Some(StandardLayout::JScrollPane),
            f.button,
            f.target,
        )
        .unwrap();
        assert_eq!(method_name(&f.code, stmt), "setViewportView");

        let mut f = fixture("javax.swing.JPanel");
        let stmt = default_component_code(&mut f.code, &f.symbols, None, f.button, f.target).unwrap();
        assert_eq!(method_name(&f.code, stmt), "add");
        assert_eq!(f.code.statement(stmt).unwrap().params.len(), 1);
    }
}
