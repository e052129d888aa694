//! Graph decoder: persisted elements to code structure.
//!
//! Origins are decoded before the node they describe, and a node is
//! registered in the identity map before any statement nested under it, so
//! a nested statement may refer back to the node it is defined on.

use tracing::debug;

use formkit_core::types::{join_types, split_types};
use formkit_core::{
    CodeStructure, ComponentLookup, ConstructorSig, ExprId, FieldSig, MethodSig, Origin, Params,
    StatementKind, StmtId, SymbolResolver, TypeName, VarId, VariableKind,
};

use super::{required, required_child, DecodeError};
use crate::document::Element;
use crate::names::*;
use crate::pass::{CodeMode, Pass};
use crate::values::read_value;

/// Statements materialized from one code fragment, with the errors of the
/// nodes that could not be decoded.
#[derive(Debug, Default)]
pub struct DecodedFragment {
    pub statements: Vec<StmtId>,
    pub errors: Vec<DecodeError>,
}

enum DecodedOrigin {
    New(Origin),
    /// The component's canonical expression.
    Existing(ExprId),
}

/// Decodes code elements into a [`CodeStructure`].
pub struct Decoder<'a, S: SymbolResolver + ?Sized> {
    code: &'a mut CodeStructure,
    components: &'a dyn ComponentLookup,
    symbols: &'a S,
    pass: &'a mut Pass,
    collected: Vec<StmtId>,
    nested_errors: Vec<DecodeError>,
}

impl<'a, S: SymbolResolver + ?Sized> Decoder<'a, S> {
    pub fn new(
        code: &'a mut CodeStructure,
        components: &'a dyn ComponentLookup,
        symbols: &'a S,
        pass: &'a mut Pass,
    ) -> Self {
        Decoder {
            code,
            components,
            symbols,
            pass,
            collected: Vec::new(),
            nested_errors: Vec::new(),
        }
    }

    /// Decode the children of a `<LayoutCode>` fragment. The fragment's
    /// `codeStructure` attribute selects the code mode.
    pub fn decode_fragment(&mut self, fragment: &Element) -> DecodedFragment {
        let mode = match fragment.attr(ATTR_CODE_STRUCTURE) {
            Some(CODE_STRUCTURE_STATIC) => CodeMode::Static,
            _ => CodeMode::Flow,
        };
        self.pass.set_mode(mode);

        let mut errors = Vec::new();
        for child in &fragment.children {
            let result = match child.name.as_str() {
                CODE_STATEMENT => self.decode_statement(child, None).map(|_| ()),
                CODE_EXPRESSION if mode == CodeMode::Static => {
                    self.decode_expression(child).map(|_| ())
                }
                _ => Ok(()),
            };
            errors.append(&mut self.nested_errors);
            if let Err(err) = result {
                errors.push(err);
            }
        }
        debug!(
            statements = self.collected.len(),
            failed = errors.len(),
            "decoded code fragment"
        );
        DecodedFragment {
            statements: std::mem::take(&mut self.collected),
            errors,
        }
    }

    // -- Expressions --------------------------------------------------------

    /// Decode an expression definition or back-reference.
    pub fn decode_expression(&mut self, element: &Element) -> Result<ExprId, DecodeError> {
        let key = required(element, ATTR_ID)?;
        if let Some(existing) = self.pass.identity.node_of(key) {
            return Ok(existing);
        }
        let Some(origin) = element.child(EXPRESSION_ORIGIN) else {
            return Err(DecodeError::UnresolvedReference { id: key.to_string() });
        };
        if !self.pass.begin_definition(key) {
            return Err(DecodeError::CyclicDefinition { id: key.to_string() });
        }
        let result = self.decode_definition(key, element, origin);
        self.pass.end_definition(key);
        result
    }

    fn decode_definition(&mut self, key: &str, element: &Element, origin: &Element) -> Result<ExprId, DecodeError> {
        let expr = match self.decode_origin(origin)? {
            DecodedOrigin::Existing(expr) => expr,
            DecodedOrigin::New(origin) => {
                let variable = element
                    .child(CODE_VARIABLE)
                    .map(|v| self.decode_variable(v))
                    .transpose()?;
                let expr = self.code.create_expression(origin)?;
                if let Some(variable) = variable {
                    self.code.attach_expression_to_variable(expr, variable)?;
                }
                expr
            }
        };
        self.pass.identity.bind(key.to_string(), expr);

        if self.pass.mode() == CodeMode::Static {
            if let Some(statements) = element.child(STATEMENTS) {
                for statement in statements.children_named(CODE_STATEMENT) {
                    if let Err(err) = self.decode_statement(statement, Some(expr)) {
                        self.nested_errors.push(err);
                    }
                }
            }
        }
        Ok(expr)
    }

    fn decode_origin(&mut self, element: &Element) -> Result<DecodedOrigin, DecodeError> {
        let parent = element
            .child(CODE_EXPRESSION)
            .map(|p| self.decode_expression(p))
            .transpose()?;
        let params = match element.child(PARAMETERS) {
            Some(list) => self.decode_parameters(list)?,
            None => Params::new(),
        };

        if let Some(provider) = element.child(EXPRESSION_PROVIDER) {
            let kind = required(provider, ATTR_TYPE)?;
            let member = provider
                .children
                .first()
                .ok_or_else(|| DecodeError::MissingChild {
                    element: provider.name.clone(),
                    child: "member",
                })?;
            let origin = match kind {
                CODE_CONSTRUCTOR => Origin::Constructor {
                    signature: self.constructor(member)?,
                    params,
                },
                CODE_METHOD => Origin::Method {
                    parent,
                    signature: self.method(member)?,
                    params,
                },
                CODE_FIELD => Origin::Field {
                    parent,
                    signature: self.field(member)?,
                },
                COMPONENT_REF => {
                    let name = required(member, ATTR_NAME)?;
                    let expr = self
                        .components
                        .expression_for(name)
                        .ok_or_else(|| DecodeError::UnknownComponent(name.to_string()))?;
                    return Ok(DecodedOrigin::Existing(expr));
                }
                other => {
                    return Err(DecodeError::UnknownProvider {
                        element: provider.name.clone(),
                        kind: other.to_string(),
                    })
                }
            };
            return Ok(DecodedOrigin::New(origin));
        }

        let literal = required_child(element, VALUE)?;
        let (ty, value) = read_value(literal, self.symbols)?;
        let text = value.to_string();
        Ok(DecodedOrigin::New(Origin::Literal { ty, value, text }))
    }

    fn decode_parameters(&mut self, element: &Element) -> Result<Params, DecodeError> {
        element
            .children_named(CODE_EXPRESSION)
            .map(|p| self.decode_expression(p))
            .collect()
    }

    /// A persisted variable. A variable this pass already decoded is reused,
    /// as is any other existing variable of the same name except an
    /// implicit local, which is renamed out of the way.
    fn decode_variable(&mut self, element: &Element) -> Result<VarId, DecodeError> {
        let name = required(element, ATTR_NAME)?;
        if let Some(existing) = self.code.variable_by_name(name) {
            if self.pass.is_declared(existing) || !self.code.variable(existing)?.kind.is_implicit_local() {
                return Ok(existing);
            }
            let base = name.trim_end_matches(|c: char| c.is_ascii_digit());
            let base = if base.is_empty() { name } else { base };
            let free = self.code.find_free_variable_name(base);
            debug!(from = name, to = %free, "renaming implicit local variable");
            self.code.rename_variable(existing, &free)?;
        }

        let kind_text = required(element, ATTR_TYPE)?;
        let kind = kind_text
            .parse::<u32>()
            .map_err(|_| DecodeError::InvalidAttribute {
                attribute: ATTR_TYPE,
                value: kind_text.to_string(),
            })?;
        let declared = self.class(required(element, ATTR_DECLARED_TYPE)?)?;
        let var = self.code.create_variable(VariableKind(kind), declared, name)?;
        self.pass.declare_variable(var);
        Ok(var)
    }

    // -- Statements ---------------------------------------------------------

    /// Decode a statement. `parent` is the enclosing expression of a
    /// statement nested in static structure; flow statements carry their own.
    pub fn decode_statement(&mut self, element: &Element, parent: Option<ExprId>) -> Result<StmtId, DecodeError> {
        let parent = match (parent, element.child(CODE_EXPRESSION)) {
            (Some(parent), _) => Some(parent),
            (None, Some(parent)) => Some(self.decode_expression(parent)?),
            (None, None) => None,
        };
        let provider = required_child(element, STATEMENT_PROVIDER)?;
        let params = match element.child(PARAMETERS) {
            Some(list) => self.decode_parameters(list)?,
            None => Params::new(),
        };

        let kind = required(provider, ATTR_TYPE)?;
        let member = provider
            .children
            .first()
            .ok_or_else(|| DecodeError::MissingChild {
                element: provider.name.clone(),
                child: "member",
            })?;
        let statement = match kind {
            CODE_METHOD => {
                let signature = self.method(member)?;
                self.code
                    .create_statement(parent, StatementKind::Method { signature }, params)?
            }
            CODE_FIELD => {
                if params.len() != 1 {
                    return Err(DecodeError::InconsistentStatement(format!(
                        "field assignment with {} values",
                        params.len()
                    )));
                }
                let signature = self.field(member)?;
                self.code
                    .create_statement(parent, StatementKind::FieldAssign { signature }, params)?
            }
            CODE_EXPRESSION => {
                let target = self.decode_expression(member)?;
                if Some(target) != parent {
                    return Err(DecodeError::InconsistentStatement(
                        "assigned expression differs from the statement's parent".to_string(),
                    ));
                }
                if self.code.expression(target)?.variable.is_none() {
                    return Err(DecodeError::InconsistentStatement(
                        "assigned expression has no variable".to_string(),
                    ));
                }
                self.code.variable_assignment(target)?
            }
            other => {
                return Err(DecodeError::UnknownProvider {
                    element: provider.name.clone(),
                    kind: other.to_string(),
                })
            }
        };
        self.collected.push(statement);
        Ok(statement)
    }

    // -- Member descriptors -------------------------------------------------

    fn class(&self, name: &str) -> Result<TypeName, DecodeError> {
        self.symbols
            .resolve_class(name)
            .ok_or_else(|| DecodeError::UnknownClass(name.to_string()))
    }

    fn parameter_types(&self, member: &Element) -> Result<Vec<TypeName>, DecodeError> {
        split_types(member.attr(ATTR_PARAMETER_TYPES).unwrap_or(""))
            .into_iter()
            .map(|name| self.class(name))
            .collect()
    }

    fn constructor(&self, member: &Element) -> Result<ConstructorSig, DecodeError> {
        let class = self.class(required(member, ATTR_CLASS)?)?;
        let params = self.parameter_types(member)?;
        self.symbols
            .resolve_constructor(&class, &params)
            .ok_or_else(|| DecodeError::UnknownConstructor {
                class: class.to_string(),
                params: join_types(&params),
            })
    }

    fn method(&self, member: &Element) -> Result<MethodSig, DecodeError> {
        let name = required(member, ATTR_NAME)?;
        let class = self.class(required(member, ATTR_CLASS)?)?;
        let params = self.parameter_types(member)?;
        self.symbols
            .resolve_method(&class, name, &params)
            .ok_or_else(|| DecodeError::UnknownMethod {
                class: class.to_string(),
                name: name.to_string(),
                params: join_types(&params),
            })
    }

    fn field(&self, member: &Element) -> Result<FieldSig, DecodeError> {
        let name = required(member, ATTR_NAME)?;
        let class = self.class(required(member, ATTR_CLASS)?)?;
        self.symbols
            .resolve_field(&class, name)
            .ok_or_else(|| DecodeError::UnknownField {
                class: class.to_string(),
                name: name.to_string(),
            })
    }
}
