//! Graph encoder: code structure to persisted elements.

use indexmap::IndexSet;

use formkit_core::types::join_types;
use formkit_core::{
    CodeStructure, ComponentLookup, ConstructorSig, ExprId, FieldSig, MethodSig, ModelError,
    Origin, StatementKind, StmtId, VarId,
};

use crate::document::Element;
use crate::names::*;
use crate::pass::{CodeMode, Pass};
use crate::values::write_value;

/// Encodes expressions and statements using the identity map of a pass.
pub struct Encoder<'a> {
    code: &'a CodeStructure,
    components: &'a dyn ComponentLookup,
    pass: &'a mut Pass,
}

impl<'a> Encoder<'a> {
    pub fn new(code: &'a CodeStructure, components: &'a dyn ComponentLookup, pass: &'a mut Pass) -> Self {
        Encoder {
            code,
            components,
            pass,
        }
    }

    /// Encode `statements` as the children of a code fragment, in the
    /// pass's code mode.
    pub fn encode_fragment(&mut self, statements: &[StmtId]) -> Result<Vec<Element>, ModelError> {
        match self.pass.mode() {
            CodeMode::Flow => statements
                .iter()
                .map(|&stmt| self.encode_statement(stmt))
                .collect(),
            CodeMode::Static => self.encode_static(statements),
        }
    }

    /// Static structure: free statements directly, every other statement
    /// through the expression that defines it.
    fn encode_static(&mut self, statements: &[StmtId]) -> Result<Vec<Element>, ModelError> {
        let code = self.code;
        let mut roots: IndexSet<ExprId> = IndexSet::new();
        let mut elements = Vec::new();
        for &id in statements {
            match code.statement(id)?.parent {
                Some(parent) => {
                    roots.insert(parent);
                }
                None => elements.push(self.encode_statement(id)?),
            }
        }
        for root in roots {
            // Already written in full, statements included.
            if self.pass.identity.key_of(root).is_some() {
                continue;
            }
            elements.push(self.encode_expression(root)?);
        }
        Ok(elements)
    }

    /// Encode one expression; repeats become bare references.
    pub fn encode_expression(&mut self, id: ExprId) -> Result<Element, ModelError> {
        if let Some(key) = self.pass.identity.key_of(id) {
            return Ok(Element::new(CODE_EXPRESSION).with_attr(ATTR_ID, key));
        }
        let code = self.code;
        let expression = code.expression(id)?;
        let variable = match expression.variable {
            Some(var) => Some(code.variable(var)?),
            None => None,
        };
        let key = self
            .pass
            .identity
            .assign(id, variable.map(|v| v.name.as_str()));

        let mut element = Element::new(CODE_EXPRESSION).with_attr(ATTR_ID, key);
        // A component's variable belongs to the component, not to code.
        let is_component = matches!(expression.origin, Origin::Component { .. });
        if let (Some(var), false) = (expression.variable, is_component) {
            element.push(self.encode_variable(var)?);
        }
        element.push(self.encode_origin(&expression.origin)?);

        if self.pass.mode() == CodeMode::Static && !expression.statements.is_empty() {
            let mut nested = Element::new(STATEMENTS);
            for &stmt in &expression.statements {
                nested.push(self.encode_statement(stmt)?);
            }
            element.push(nested);
        }
        Ok(element)
    }

    fn encode_variable(&mut self, id: VarId) -> Result<Element, ModelError> {
        let variable = self.code.variable(id)?;
        let mut element = Element::new(CODE_VARIABLE).with_attr(ATTR_NAME, variable.name.as_str());
        if self.pass.declare_variable(id) {
            element.set_attr(ATTR_TYPE, variable.kind.bits().to_string());
            element.set_attr(ATTR_DECLARED_TYPE, variable.declared_type.as_str());
        }
        Ok(element)
    }

    fn encode_origin(&mut self, origin: &Origin) -> Result<Element, ModelError> {
        let mut element = Element::new(EXPRESSION_ORIGIN);
        if let Some(parent) = origin.parent() {
            element.push(self.encode_expression(parent)?);
        }
        match origin {
            Origin::Literal { ty, value, .. } => {
                let mut literal = Element::new(VALUE);
                write_value(&mut literal, ty, value);
                element.push(literal);
            }
            Origin::Constructor { signature, .. } => {
                element.push(provider(EXPRESSION_PROVIDER, CODE_CONSTRUCTOR, constructor_element(signature)));
            }
            Origin::Method { signature, .. } => {
                element.push(provider(EXPRESSION_PROVIDER, CODE_METHOD, method_element(signature)));
            }
            Origin::Field { signature, .. } => {
                element.push(provider(EXPRESSION_PROVIDER, CODE_FIELD, field_element(signature)));
            }
            Origin::Component { component, .. } => {
                let name = self
                    .components
                    .reference_name(*component)
                    .ok_or(ModelError::ComponentNotFound { id: *component })?;
                let reference = Element::new(COMPONENT_REF).with_attr(ATTR_NAME, name);
                element.push(provider(EXPRESSION_PROVIDER, COMPONENT_REF, reference));
            }
        }
        if !origin.params().is_empty() {
            element.push(self.encode_parameters(origin.params())?);
        }
        Ok(element)
    }

    /// Encode one statement. In code-flow mode it carries its parent.
    pub fn encode_statement(&mut self, id: StmtId) -> Result<Element, ModelError> {
        let code = self.code;
        let statement = code.statement(id)?;
        let mut element = Element::new(CODE_STATEMENT);
        if self.pass.mode() == CodeMode::Flow {
            if let Some(parent) = statement.parent {
                element.push(self.encode_expression(parent)?);
            }
        }
        let statement_provider = match &statement.kind {
            StatementKind::Method { signature } => {
                provider(STATEMENT_PROVIDER, CODE_METHOD, method_element(signature))
            }
            StatementKind::FieldAssign { signature } => {
                provider(STATEMENT_PROVIDER, CODE_FIELD, field_element(signature))
            }
            StatementKind::VariableAssign { .. } => {
                let target = statement.parent.ok_or_else(|| ModelError::InconsistentStatement {
                    reason: format!("variable assignment {} has no expression", id),
                })?;
                provider(STATEMENT_PROVIDER, CODE_EXPRESSION, self.encode_expression(target)?)
            }
        };
        element.push(statement_provider);
        if !statement.params.is_empty() {
            element.push(self.encode_parameters(&statement.params)?);
        }
        Ok(element)
    }

    fn encode_parameters(&mut self, params: &[ExprId]) -> Result<Element, ModelError> {
        let mut element = Element::new(PARAMETERS);
        for &param in params {
            element.push(self.encode_expression(param)?);
        }
        Ok(element)
    }
}

fn provider(element: &str, kind: &str, member: Element) -> Element {
    Element::new(element)
        .with_attr(ATTR_TYPE, kind)
        .with_child(member)
}

fn constructor_element(signature: &ConstructorSig) -> Element {
    Element::new(CODE_CONSTRUCTOR)
        .with_attr(ATTR_CLASS, signature.declaring.as_str())
        .with_attr(ATTR_PARAMETER_TYPES, join_types(&signature.params))
}

fn method_element(signature: &MethodSig) -> Element {
    Element::new(CODE_METHOD)
        .with_attr(ATTR_NAME, signature.name.as_str())
        .with_attr(ATTR_CLASS, signature.declaring.as_str())
        .with_attr(ATTR_PARAMETER_TYPES, join_types(&signature.params))
}

fn field_element(signature: &FieldSig) -> Element {
    Element::new(CODE_FIELD)
        .with_attr(ATTR_NAME, signature.name.as_str())
        .with_attr(ATTR_CLASS, signature.declaring.as_str())
}
