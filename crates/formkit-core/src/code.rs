//! The code structure: an arena of expressions, statements and variables.
//!
//! Expressions and statements reference each other by ID, so a
//! sub-expression shared by many statements is a single node. Identity is
//! the ID: two expressions with equal origins created separately are
//! different nodes.
//!
//! Nodes are only ever added. Every `create_*` method validates the IDs it
//! is given, so an arena never holds a dangling reference.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::ModelError;
use crate::id::{ComponentId, ExprId, StmtId, VarId};
use crate::symbols::{ConstructorSig, FieldSig, MethodSig};
use crate::types::TypeName;
use crate::value::Value;
use crate::variable::{Variable, VariableKind};

/// Parameter list of an origin or statement.
pub type Params = SmallVec<[ExprId; 4]>;

// ---------------------------------------------------------------------------
// Node types
// ---------------------------------------------------------------------------

/// How an expression's value is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum Origin {
    Literal {
        ty: TypeName,
        value: Value,
        text: String,
    },
    Constructor {
        signature: ConstructorSig,
        params: Params,
    },
    Method {
        parent: Option<ExprId>,
        signature: MethodSig,
        params: Params,
    },
    Field {
        parent: Option<ExprId>,
        signature: FieldSig,
    },
    /// The canonical expression of a component. There is exactly one per
    /// component; it is created with the component and never decoded anew.
    Component {
        component: ComponentId,
        class: TypeName,
    },
}

impl Origin {
    /// The type of the value this origin produces.
    pub fn value_type(&self) -> &TypeName {
        match self {
            Origin::Literal { ty, .. } => ty,
            Origin::Constructor { signature, .. } => &signature.declaring,
            Origin::Method { signature, .. } => &signature.returns,
            Origin::Field { signature, .. } => &signature.ty,
            Origin::Component { class, .. } => class,
        }
    }

    pub fn parent(&self) -> Option<ExprId> {
        match self {
            Origin::Method { parent, .. } | Origin::Field { parent, .. } => *parent,
            _ => None,
        }
    }

    pub fn params(&self) -> &[ExprId] {
        match self {
            Origin::Constructor { params, .. } | Origin::Method { params, .. } => params,
            _ => &[],
        }
    }
}

/// A value-producing node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub origin: Origin,
    pub variable: Option<VarId>,
    /// Statements whose parent is this expression, in creation order.
    pub statements: Vec<StmtId>,
}

impl Expression {
    pub fn value_type(&self) -> &TypeName {
        self.origin.value_type()
    }
}

/// The operation a statement performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StatementKind {
    Method { signature: MethodSig },
    FieldAssign { signature: FieldSig },
    /// Assign the parent expression to its bound variable.
    VariableAssign { variable: VarId },
}

/// A side-effecting node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    /// Receiver; `None` for free-standing statements.
    pub parent: Option<ExprId>,
    pub params: Params,
}

// ---------------------------------------------------------------------------
// CodeStructure
// ---------------------------------------------------------------------------

/// Arena owning all expressions, statements and variables of one form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeStructure {
    expressions: Vec<Expression>,
    statements: Vec<Statement>,
    variables: Vec<Variable>,
    #[serde(skip)]
    variable_names: HashMap<String, VarId>,
}

impl CodeStructure {
    pub fn new() -> Self {
        CodeStructure::default()
    }

    // -- Lookups ------------------------------------------------------------

    pub fn expression(&self, id: ExprId) -> Result<&Expression, ModelError> {
        self.expressions
            .get(id.index())
            .ok_or(ModelError::ExpressionNotFound { id })
    }

    pub fn statement(&self, id: StmtId) -> Result<&Statement, ModelError> {
        self.statements
            .get(id.index())
            .ok_or(ModelError::StatementNotFound { id })
    }

    pub fn variable(&self, id: VarId) -> Result<&Variable, ModelError> {
        self.variables
            .get(id.index())
            .ok_or(ModelError::VariableNotFound { id })
    }

    pub fn variable_by_name(&self, name: &str) -> Option<VarId> {
        self.variable_names.get(name).copied()
    }

    pub fn expression_count(&self) -> usize {
        self.expressions.len()
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn expressions(&self) -> impl Iterator<Item = (ExprId, &Expression)> {
        self.expressions
            .iter()
            .enumerate()
            .map(|(i, e)| (ExprId(i as u32), e))
    }

    pub fn statements(&self) -> impl Iterator<Item = (StmtId, &Statement)> {
        self.statements
            .iter()
            .enumerate()
            .map(|(i, s)| (StmtId(i as u32), s))
    }

    /// Statements defined on `expr` that satisfy `predicate`, in order.
    pub fn find_statements<F>(&self, expr: ExprId, predicate: F) -> Result<Vec<StmtId>, ModelError>
    where
        F: Fn(&Statement) -> bool,
    {
        let expression = self.expression(expr)?;
        let mut found = Vec::new();
        for &id in &expression.statements {
            if predicate(self.statement(id)?) {
                found.push(id);
            }
        }
        Ok(found)
    }

    /// Method-call statements on `expr` invoking a method named `name`.
    pub fn method_statements(&self, expr: ExprId, name: &str) -> Result<Vec<StmtId>, ModelError> {
        self.find_statements(expr, |stmt| {
            matches!(&stmt.kind, StatementKind::Method { signature } if signature.name == name)
        })
    }

    fn check_expression(&self, id: ExprId) -> Result<(), ModelError> {
        self.expression(id).map(|_| ())
    }

    fn check_all(&self, ids: &[ExprId]) -> Result<(), ModelError> {
        ids.iter().try_for_each(|&id| self.check_expression(id))
    }

    // -- Expressions --------------------------------------------------------

    /// Add an expression node for `origin`.
    pub fn create_expression(&mut self, origin: Origin) -> Result<ExprId, ModelError> {
        if let Some(parent) = origin.parent() {
            self.check_expression(parent)?;
        }
        self.check_all(origin.params())?;
        let id = ExprId(self.expressions.len() as u32);
        self.expressions.push(Expression {
            origin,
            variable: None,
            statements: Vec::new(),
        });
        Ok(id)
    }

    /// A literal whose rendered text is the value's display form.
    pub fn create_literal(&mut self, ty: TypeName, value: Value) -> ExprId {
        let text = value.to_string();
        let id = ExprId(self.expressions.len() as u32);
        self.expressions.push(Expression {
            origin: Origin::Literal { ty, value, text },
            variable: None,
            statements: Vec::new(),
        });
        id
    }

    pub fn create_null(&mut self, ty: TypeName) -> ExprId {
        self.create_literal(ty, Value::Null)
    }

    pub fn create_constructor_call(
        &mut self,
        signature: ConstructorSig,
        params: impl IntoIterator<Item = ExprId>,
    ) -> Result<ExprId, ModelError> {
        self.create_expression(Origin::Constructor {
            signature,
            params: params.into_iter().collect(),
        })
    }

    pub fn create_method_call(
        &mut self,
        parent: Option<ExprId>,
        signature: MethodSig,
        params: impl IntoIterator<Item = ExprId>,
    ) -> Result<ExprId, ModelError> {
        self.create_expression(Origin::Method {
            parent,
            signature,
            params: params.into_iter().collect(),
        })
    }

    pub fn create_field_access(
        &mut self,
        parent: Option<ExprId>,
        signature: FieldSig,
    ) -> Result<ExprId, ModelError> {
        self.create_expression(Origin::Field { parent, signature })
    }

    pub fn create_component_reference(&mut self, component: ComponentId, class: TypeName) -> ExprId {
        let id = ExprId(self.expressions.len() as u32);
        self.expressions.push(Expression {
            origin: Origin::Component { component, class },
            variable: None,
            statements: Vec::new(),
        });
        id
    }

    // -- Statements ---------------------------------------------------------

    /// Add a statement; a statement with a parent is attached to it.
    pub fn create_statement(
        &mut self,
        parent: Option<ExprId>,
        kind: StatementKind,
        params: impl IntoIterator<Item = ExprId>,
    ) -> Result<StmtId, ModelError> {
        let params: Params = params.into_iter().collect();
        if let Some(parent) = parent {
            self.check_expression(parent)?;
        }
        self.check_all(&params)?;
        match &kind {
            StatementKind::FieldAssign { signature } if params.len() != 1 => {
                return Err(ModelError::InconsistentStatement {
                    reason: format!(
                        "assignment to field '{}' takes exactly one value, got {}",
                        signature.name,
                        params.len()
                    ),
                });
            }
            StatementKind::VariableAssign { variable } => {
                self.variable(*variable)?;
                let bound = match parent {
                    Some(parent) => self.expression(parent)?.variable,
                    None => None,
                };
                if bound != Some(*variable) {
                    return Err(ModelError::InconsistentStatement {
                        reason: "variable assignment must be defined on an expression bound to that variable"
                            .to_string(),
                    });
                }
            }
            _ => {}
        }

        let id = StmtId(self.statements.len() as u32);
        self.statements.push(Statement { kind, parent, params });
        if let Some(parent) = parent {
            self.expressions[parent.index()].statements.push(id);
        }
        Ok(id)
    }

    pub fn create_method_statement(
        &mut self,
        parent: Option<ExprId>,
        signature: MethodSig,
        params: impl IntoIterator<Item = ExprId>,
    ) -> Result<StmtId, ModelError> {
        self.create_statement(parent, StatementKind::Method { signature }, params)
    }

    pub fn create_field_statement(
        &mut self,
        parent: Option<ExprId>,
        signature: FieldSig,
        value: ExprId,
    ) -> Result<StmtId, ModelError> {
        self.create_statement(parent, StatementKind::FieldAssign { signature }, [value])
    }

    /// The assignment of `expr` to its variable, created on first request.
    pub fn variable_assignment(&mut self, expr: ExprId) -> Result<StmtId, ModelError> {
        let expression = self.expression(expr)?;
        let variable = expression
            .variable
            .ok_or_else(|| ModelError::InconsistentStatement {
                reason: format!("expression {} is not bound to a variable", expr),
            })?;
        let existing = self.find_statements(expr, |stmt| {
            stmt.kind == StatementKind::VariableAssign { variable }
        })?;
        if let Some(&stmt) = existing.first() {
            return Ok(stmt);
        }
        self.create_statement(Some(expr), StatementKind::VariableAssign { variable }, [])
    }

    // -- Variables ----------------------------------------------------------

    pub fn create_variable(
        &mut self,
        kind: VariableKind,
        declared_type: TypeName,
        name: &str,
    ) -> Result<VarId, ModelError> {
        if self.variable_names.contains_key(name) {
            return Err(ModelError::DuplicateVariable {
                name: name.to_string(),
            });
        }
        let id = VarId(self.variables.len() as u32);
        self.variables.push(Variable {
            name: name.to_string(),
            kind,
            declared_type,
            expressions: Vec::new(),
        });
        self.variable_names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Bind `expr` to `var`, releasing any previous binding of `expr`.
    pub fn attach_expression_to_variable(&mut self, expr: ExprId, var: VarId) -> Result<(), ModelError> {
        self.variable(var)?;
        let previous = self.expression(expr)?.variable;
        if previous == Some(var) {
            return Ok(());
        }
        if let Some(previous) = previous {
            self.variables[previous.index()]
                .expressions
                .retain(|&e| e != expr);
        }
        self.expressions[expr.index()].variable = Some(var);
        self.variables[var.index()].expressions.push(expr);
        Ok(())
    }

    pub fn rename_variable(&mut self, var: VarId, new_name: &str) -> Result<(), ModelError> {
        let old_name = self.variable(var)?.name.clone();
        if old_name == new_name {
            return Ok(());
        }
        if self.variable_names.contains_key(new_name) {
            return Err(ModelError::DuplicateVariable {
                name: new_name.to_string(),
            });
        }
        self.variable_names.remove(&old_name);
        self.variable_names.insert(new_name.to_string(), var);
        self.variables[var.index()].name = new_name.to_string();
        Ok(())
    }

    /// The first of `base1`, `base2`, ... that no variable uses.
    pub fn find_free_variable_name(&self, base: &str) -> String {
        (1u32..)
            .map(|n| format!("{}{}", base, n))
            .find(|candidate| !self.variable_names.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Rebuild the name index after deserialization.
    pub fn reindex_variables(&mut self) {
        self.variable_names = self
            .variables
            .iter()
            .enumerate()
            .map(|(i, v)| (v.name.clone(), VarId(i as u32)))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn int_literal(code: &mut CodeStructure, value: i64) -> ExprId {
        code.create_literal(TypeName::int(), Value::Int(value))
    }

    fn border_ctor() -> ConstructorSig {
        ConstructorSig {
            declaring: TypeName::new("java.awt.BorderLayout"),
            params: vec![TypeName::int(), TypeName::int()],
        }
    }

    fn set_layout() -> MethodSig {
        MethodSig {
            declaring: TypeName::new("java.awt.Container"),
            name: "setLayout".into(),
            params: vec![TypeName::new("java.awt.LayoutManager")],
            returns: TypeName::new("void"),
        }
    }

    #[test]
    fn literal_text_is_rendered_from_value() {
        let mut code = CodeStructure::new();
        let five = int_literal(&mut code, 5);
        match &code.expression(five).unwrap().origin {
            Origin::Literal { text, .. } => assert_eq!(text, "5"),
            other => panic!("unexpected origin {:?}", other),
        }
        let null = code.create_null(TypeName::new("java.awt.LayoutManager"));
        assert_eq!(
            code.expression(null).unwrap().value_type().as_str(),
            "java.awt.LayoutManager"
        );
    }

    #[test]
    fn shared_parameters_stay_single_nodes() {
        let mut code = CodeStructure::new();
        let gap = int_literal(&mut code, 5);
        let layout = code.create_constructor_call(border_ctor(), [gap, gap]).unwrap();
        assert_eq!(code.expression_count(), 2);
        assert_eq!(code.expression(layout).unwrap().origin.params(), &[gap, gap]);
    }

    #[test]
    fn dangling_ids_are_rejected() {
        let mut code = CodeStructure::new();
        let err = code
            .create_constructor_call(border_ctor(), [ExprId(3)])
            .unwrap_err();
        assert_eq!(err, ModelError::ExpressionNotFound { id: ExprId(3) });
        assert_eq!(code.expression_count(), 0);
    }

    #[test]
    fn statements_attach_to_parent() {
        let mut code = CodeStructure::new();
        let container = code.create_component_reference(ComponentId(0), TypeName::new("javax.swing.JPanel"));
        let layout = code.create_constructor_call(
            ConstructorSig {
                declaring: TypeName::new("java.awt.BorderLayout"),
                params: vec![],
            },
            [],
        );
        let layout = layout.unwrap();
        let stmt = code
            .create_method_statement(Some(container), set_layout(), [layout])
            .unwrap();
        assert_eq!(code.expression(container).unwrap().statements, vec![stmt]);
        assert_eq!(code.method_statements(container, "setLayout").unwrap(), vec![stmt]);
        assert!(code.method_statements(container, "add").unwrap().is_empty());
    }

    #[test]
    fn field_assignment_takes_one_value() {
        let mut code = CodeStructure::new();
        let gbc = code
            .create_constructor_call(
                ConstructorSig {
                    declaring: TypeName::new("java.awt.GridBagConstraints"),
                    params: vec![],
                },
                [],
            )
            .unwrap();
        let field = FieldSig {
            declaring: TypeName::new("java.awt.GridBagConstraints"),
            name: "gridx".into(),
            ty: TypeName::int(),
        };
        let one = int_literal(&mut code, 1);
        let err = code
            .create_statement(Some(gbc), StatementKind::FieldAssign { signature: field.clone() }, [one, one])
            .unwrap_err();
        assert!(matches!(err, ModelError::InconsistentStatement { .. }));
        assert!(code.create_field_statement(Some(gbc), field, one).is_ok());
    }

    #[test]
    fn variable_assignment_is_created_once() {
        let mut code = CodeStructure::new();
        let expr = int_literal(&mut code, 1);
        assert!(code.variable_assignment(expr).is_err());

        let var = code
            .create_variable(VariableKind::LOCAL, TypeName::int(), "count")
            .unwrap();
        code.attach_expression_to_variable(expr, var).unwrap();
        let first = code.variable_assignment(expr).unwrap();
        let second = code.variable_assignment(expr).unwrap();
        assert_eq!(first, second);
        assert_eq!(code.statement_count(), 1);
    }

    #[test]
    fn variable_names_are_unique_and_renamable() {
        let mut code = CodeStructure::new();
        let var = code
            .create_variable(VariableKind::LOCAL, TypeName::int(), "panel1")
            .unwrap();
        assert!(code
            .create_variable(VariableKind::LOCAL, TypeName::int(), "panel1")
            .is_err());
        assert_eq!(code.find_free_variable_name("panel"), "panel2");

        code.rename_variable(var, "panel2").unwrap();
        assert_eq!(code.variable_by_name("panel2"), Some(var));
        assert_eq!(code.variable_by_name("panel1"), None);
        assert_eq!(code.find_free_variable_name("panel"), "panel1");
    }

    proptest! {
        #[test]
        fn free_names_never_collide(taken in prop::collection::vec(1u32..20, 0..12)) {
            let mut code = CodeStructure::new();
            for n in &taken {
                let name = format!("label{}", n);
                if code.variable_by_name(&name).is_none() {
                    code.create_variable(VariableKind::LOCAL, TypeName::int(), &name).unwrap();
                }
            }
            let free = code.find_free_variable_name("label");
            prop_assert!(code.variable_by_name(&free).is_none());
            prop_assert!(free.starts_with("label"));
        }
    }

    #[test]
    fn rebinding_moves_expression_between_variables() {
        let mut code = CodeStructure::new();
        let expr = int_literal(&mut code, 0);
        let a = code.create_variable(VariableKind::LOCAL, TypeName::int(), "a").unwrap();
        let b = code.create_variable(VariableKind::LOCAL, TypeName::int(), "b").unwrap();
        code.attach_expression_to_variable(expr, a).unwrap();
        code.attach_expression_to_variable(expr, b).unwrap();
        assert!(code.variable(a).unwrap().expressions.is_empty());
        assert_eq!(code.variable(b).unwrap().expressions, vec![expr]);
    }
}
