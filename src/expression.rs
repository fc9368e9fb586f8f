//! Expression trees and the boundary extractor.
//!
//! Bindings are parsed once at compile time into an owned, serializable tree so
//! render backends never ship a JavaScript parser. The default parser lowers
//! oxc's AST into [`ExpressionTree`]; callers may plug in their own.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, ArrayExpressionElement, CallExpression, ChainElement, ComputedMemberExpression,
    Expression, ObjectPropertyKind, PropertyKey, StaticMemberExpression,
};
use oxc_parser::Parser;
use oxc_span::SourceType;
use serde::{Deserialize, Serialize};

use crate::error::SimplifyError;
use crate::mustache::BindingDetector;

// ═══════════════════════════════════════════════════════════════════════════════
// EXPRESSION TREE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Boolean(bool),
    Number(f64),
    String(String),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectMember {
    Property {
        key: Box<ExpressionTree>,
        value: Box<ExpressionTree>,
        computed: bool,
    },
    Spread {
        argument: Box<ExpressionTree>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExpressionTree {
    Identifier {
        name: String,
    },
    Literal {
        value: LiteralValue,
    },
    Template {
        quasis: Vec<String>,
        expressions: Vec<ExpressionTree>,
    },
    Array {
        /// `None` marks a hole (`[a, , b]`).
        elements: Vec<Option<ExpressionTree>>,
    },
    Object {
        properties: Vec<ObjectMember>,
    },
    Member {
        object: Box<ExpressionTree>,
        property: Box<ExpressionTree>,
        computed: bool,
        optional: bool,
    },
    Call {
        callee: Box<ExpressionTree>,
        arguments: Vec<ExpressionTree>,
        optional: bool,
    },
    Unary {
        operator: String,
        argument: Box<ExpressionTree>,
    },
    Binary {
        operator: String,
        left: Box<ExpressionTree>,
        right: Box<ExpressionTree>,
    },
    Logical {
        operator: String,
        left: Box<ExpressionTree>,
        right: Box<ExpressionTree>,
    },
    Conditional {
        test: Box<ExpressionTree>,
        consequent: Box<ExpressionTree>,
        alternate: Box<ExpressionTree>,
    },
    Sequence {
        expressions: Vec<ExpressionTree>,
    },
    Spread {
        argument: Box<ExpressionTree>,
    },
}

impl ExpressionTree {
    pub fn identifier(name: &str) -> Self {
        ExpressionTree::Identifier {
            name: name.to_string(),
        }
    }

    pub fn string(value: &str) -> Self {
        ExpressionTree::Literal {
            value: LiteralValue::String(value.to_string()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARSER
// ═══════════════════════════════════════════════════════════════════════════════

pub trait ExpressionParser {
    /// Parse a complete binding expression. Errors abort the whole pass.
    fn parse_expression(&self, source: &str) -> Result<ExpressionTree, SimplifyError>;
}

/// JavaScript expression parser backed by oxc.
#[derive(Debug, Default, Clone, Copy)]
pub struct OxcExpressionParser;

impl ExpressionParser for OxcExpressionParser {
    fn parse_expression(&self, source: &str) -> Result<ExpressionTree, SimplifyError> {
        let allocator = Allocator::default();
        let source_type = SourceType::default();
        let expression = Parser::new(&allocator, source, source_type)
            .parse_expression()
            .map_err(|errors| SimplifyError::Expression {
                expression: source.to_string(),
                message: errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            })?;

        Lowering { source }.expression(&expression)
    }
}

/// Copies an oxc expression out of its arena into an owned tree.
struct Lowering<'s> {
    source: &'s str,
}

impl Lowering<'_> {
    fn unsupported(&self, kind: &str) -> SimplifyError {
        SimplifyError::UnsupportedSyntax {
            kind: kind.to_string(),
            expression: self.source.to_string(),
        }
    }

    fn boxed(&self, expr: &Expression) -> Result<Box<ExpressionTree>, SimplifyError> {
        self.expression(expr).map(Box::new)
    }

    fn expression(&self, expr: &Expression) -> Result<ExpressionTree, SimplifyError> {
        let tree = match expr {
            Expression::ParenthesizedExpression(paren) => return self.expression(&paren.expression),
            Expression::Identifier(ident) => ExpressionTree::Identifier {
                name: ident.name.to_string(),
            },
            Expression::BooleanLiteral(lit) => ExpressionTree::Literal {
                value: LiteralValue::Boolean(lit.value),
            },
            Expression::NullLiteral(_) => ExpressionTree::Literal {
                value: LiteralValue::Null,
            },
            Expression::NumericLiteral(lit) => ExpressionTree::Literal {
                value: LiteralValue::Number(lit.value),
            },
            Expression::StringLiteral(lit) => ExpressionTree::Literal {
                value: LiteralValue::String(lit.value.to_string()),
            },
            Expression::TemplateLiteral(tpl) => ExpressionTree::Template {
                quasis: tpl
                    .quasis
                    .iter()
                    .map(|quasi| match &quasi.value.cooked {
                        Some(cooked) => cooked.to_string(),
                        None => quasi.value.raw.to_string(),
                    })
                    .collect(),
                expressions: tpl
                    .expressions
                    .iter()
                    .map(|e| self.expression(e))
                    .collect::<Result<_, _>>()?,
            },
            Expression::ArrayExpression(array) => {
                let mut elements = Vec::with_capacity(array.elements.len());
                for element in &array.elements {
                    elements.push(match element {
                        ArrayExpressionElement::Elision(_) => None,
                        ArrayExpressionElement::SpreadElement(spread) => {
                            Some(ExpressionTree::Spread {
                                argument: self.boxed(&spread.argument)?,
                            })
                        }
                        other => match other.as_expression() {
                            Some(e) => Some(self.expression(e)?),
                            None => return Err(self.unsupported("array element")),
                        },
                    });
                }
                ExpressionTree::Array { elements }
            }
            Expression::ObjectExpression(object) => {
                let mut properties = Vec::with_capacity(object.properties.len());
                for property in &object.properties {
                    properties.push(match property {
                        ObjectPropertyKind::ObjectProperty(prop) => {
                            if prop.method {
                                return Err(self.unsupported("object method"));
                            }
                            ObjectMember::Property {
                                key: Box::new(self.property_key(&prop.key)?),
                                value: self.boxed(&prop.value)?,
                                computed: prop.computed,
                            }
                        }
                        ObjectPropertyKind::SpreadProperty(spread) => ObjectMember::Spread {
                            argument: self.boxed(&spread.argument)?,
                        },
                    });
                }
                ExpressionTree::Object { properties }
            }
            Expression::StaticMemberExpression(member) => self.static_member(member)?,
            Expression::ComputedMemberExpression(member) => self.computed_member(member)?,
            Expression::CallExpression(call) => self.call(call)?,
            Expression::ChainExpression(chain) => match &chain.expression {
                ChainElement::CallExpression(call) => self.call(call)?,
                ChainElement::StaticMemberExpression(member) => self.static_member(member)?,
                ChainElement::ComputedMemberExpression(member) => self.computed_member(member)?,
                _ => return Err(self.unsupported("optional chain")),
            },
            Expression::UnaryExpression(unary) => ExpressionTree::Unary {
                operator: unary.operator.as_str().to_string(),
                argument: self.boxed(&unary.argument)?,
            },
            Expression::BinaryExpression(binary) => ExpressionTree::Binary {
                operator: binary.operator.as_str().to_string(),
                left: self.boxed(&binary.left)?,
                right: self.boxed(&binary.right)?,
            },
            Expression::LogicalExpression(logical) => ExpressionTree::Logical {
                operator: logical.operator.as_str().to_string(),
                left: self.boxed(&logical.left)?,
                right: self.boxed(&logical.right)?,
            },
            Expression::ConditionalExpression(cond) => ExpressionTree::Conditional {
                test: self.boxed(&cond.test)?,
                consequent: self.boxed(&cond.consequent)?,
                alternate: self.boxed(&cond.alternate)?,
            },
            Expression::SequenceExpression(seq) => ExpressionTree::Sequence {
                expressions: seq
                    .expressions
                    .iter()
                    .map(|e| self.expression(e))
                    .collect::<Result<_, _>>()?,
            },
            other => return Err(self.unsupported(describe(other))),
        };
        Ok(tree)
    }

    fn property_key(&self, key: &PropertyKey) -> Result<ExpressionTree, SimplifyError> {
        match key {
            PropertyKey::StaticIdentifier(ident) => Ok(ExpressionTree::Identifier {
                name: ident.name.to_string(),
            }),
            PropertyKey::PrivateIdentifier(_) => Err(self.unsupported("private name")),
            other => match other.as_expression() {
                Some(e) => self.expression(e),
                None => Err(self.unsupported("property key")),
            },
        }
    }

    fn static_member(&self, member: &StaticMemberExpression) -> Result<ExpressionTree, SimplifyError> {
        Ok(ExpressionTree::Member {
            object: self.boxed(&member.object)?,
            property: Box::new(ExpressionTree::Identifier {
                name: member.property.name.to_string(),
            }),
            computed: false,
            optional: member.optional,
        })
    }

    fn computed_member(
        &self,
        member: &ComputedMemberExpression,
    ) -> Result<ExpressionTree, SimplifyError> {
        Ok(ExpressionTree::Member {
            object: self.boxed(&member.object)?,
            property: self.boxed(&member.expression)?,
            computed: true,
            optional: member.optional,
        })
    }

    fn call(&self, call: &CallExpression) -> Result<ExpressionTree, SimplifyError> {
        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(match argument {
                Argument::SpreadElement(spread) => ExpressionTree::Spread {
                    argument: self.boxed(&spread.argument)?,
                },
                other => match other.as_expression() {
                    Some(e) => self.expression(e)?,
                    None => return Err(self.unsupported("call argument")),
                },
            });
        }
        Ok(ExpressionTree::Call {
            callee: self.boxed(&call.callee)?,
            arguments,
            optional: call.optional,
        })
    }
}

fn describe(expr: &Expression) -> &'static str {
    match expr {
        Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_) => "function",
        Expression::AssignmentExpression(_) => "assignment",
        Expression::UpdateExpression(_) => "update expression",
        Expression::NewExpression(_) => "new expression",
        Expression::ThisExpression(_) => "this",
        Expression::RegExpLiteral(_) => "regular expression",
        Expression::BigIntLiteral(_) => "bigint literal",
        Expression::TaggedTemplateExpression(_) => "tagged template",
        Expression::ClassExpression(_) => "class expression",
        Expression::AwaitExpression(_) | Expression::YieldExpression(_) => "await/yield",
        _ => "expression",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BOUNDARY EXTRACTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Decides where a raw value stops being a literal and starts being a binding.
#[derive(Clone, Copy)]
pub struct Extractor<'a> {
    detector: &'a dyn BindingDetector,
    parser: &'a dyn ExpressionParser,
}

impl<'a> Extractor<'a> {
    pub fn new(detector: &'a dyn BindingDetector, parser: &'a dyn ExpressionParser) -> Self {
        Extractor { detector, parser }
    }

    /// `None` means the value is static and should stay a literal.
    pub fn extract(&self, raw: &str) -> Result<Option<ExpressionTree>, SimplifyError> {
        let binding = self.detector.detect_binding(raw);
        if !binding.has_binding {
            return Ok(None);
        }
        self.parser.parse_expression(&binding.normalized).map(Some)
    }

    /// Parse a source the markup parser has already stripped of mustaches.
    pub fn parse(&self, exp: &str) -> Result<ExpressionTree, SimplifyError> {
        self.parser.parse_expression(exp)
    }

    /// Absent and empty fragments carry no expression.
    pub fn parse_fragment(&self, exp: Option<&str>) -> Result<Option<ExpressionTree>, SimplifyError> {
        match exp {
            Some(exp) if !exp.is_empty() => self.parse(exp).map(Some),
            _ => Ok(None),
        }
    }
}
