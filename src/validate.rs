use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::config::{DirectiveConfig, TRANSIENT_TAG};
use crate::expression::ExpressionTree;
use crate::raw_ast::{NodeType, BOOKKEEPING_FIELDS};
use crate::visitor::SimplifiedVisitor;

// ═══════════════════════════════════════════════════════════════════════════════
// INVARIANT CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const INV_RAW_FIELD: &str = "SIMP001";
pub const INV_VALUE_WITH_EXPS: &str = "SIMP002";
pub const INV_EMPTY_ATTRS: &str = "SIMP003";
pub const INV_EXPS_KIND: &str = "SIMP004";
pub const INV_CONDITION_CHAIN: &str = "SIMP005";
pub const INV_TRANSIENT_TAG: &str = "SIMP006";
pub const INV_DIRECTIVE_ATTR: &str = "SIMP007";

/// Fields that must not survive simplification besides parser bookkeeping.
const DIRECTIVE_FIELDS: [&str; 6] = ["if", "elseif", "else", "_if", "_tempIf", "attrsMap"];

// ═══════════════════════════════════════════════════════════════════════════════
// GUARANTEES
// ═══════════════════════════════════════════════════════════════════════════════

fn get_guarantee(code: &str) -> &'static str {
    match code {
        INV_RAW_FIELD => "Parser bookkeeping and directive fields never reach the generator.",
        INV_VALUE_WITH_EXPS => {
            "An attribute carries either a literal value or an extracted expression, never both."
        }
        INV_EMPTY_ATTRS => "Static nodes omit their attribute list instead of sending it empty.",
        INV_EXPS_KIND => "Every expression slot holds the expression kind its position implies.",
        INV_CONDITION_CHAIN => {
            "Condition lists start at their anchor and keep source order."
        }
        INV_TRANSIENT_TAG => "Synthetic parser wrappers are renamed to the generic block tag.",
        INV_DIRECTIVE_ATTR => "Directive attributes are consumed by the simplifier.",
        _ => "Unknown invariant.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerError {
    pub code: String,
    pub error_type: String,
    pub message: String,
    pub guarantee: String,
    /// Location of the offending node, e.g. `root.children[1].ifConditions[2]`.
    pub path: String,
}

impl CompilerError {
    pub fn new(code: &str, message: &str, path: &str) -> Self {
        CompilerError {
            code: code.to_string(),
            error_type: "SIMPLIFIED_AST_CONTRACT_VIOLATION".to_string(),
            message: message.to_string(),
            guarantee: get_guarantee(code).to_string(),
            path: path.to_string(),
        }
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (at {})", self.code, self.message, self.path)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IR TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Extracted expressions, keyed by the kind of slot they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Exps {
    Text(ExpressionTree),
    For(ExpressionTree),
    /// `[static, dynamic]` fragments, or `[whole]` for a single mustache value.
    ClassOrStyle(Vec<Option<ExpressionTree>>),
    EventMap(Vec<EventExps>),
    Generic(ExpressionTree),
}

impl Exps {
    pub fn kind(&self) -> &'static str {
        match self {
            Exps::Text(_) => "text",
            Exps::For(_) => "for",
            Exps::ClassOrStyle(_) => "classOrStyle",
            Exps::EventMap(_) => "eventMap",
            Exps::Generic(_) => "generic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventExps {
    pub event_name: String,
    pub handler_expressions: Vec<ExpressionTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedAttr {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "__exps", default, skip_serializing_if = "Option::is_none")]
    pub exps: Option<Exps>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForDirective {
    #[serde(rename = "__exps")]
    pub exps: Exps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Serializes as the string `"self"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorRef {
    #[serde(rename = "self")]
    Anchor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IfTarget {
    Anchor(AnchorRef),
    Block(Box<SimplifiedNode>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfCondition {
    pub is_expression: bool,
    pub target: IfTarget,
    pub expression: Option<ExpressionTree>,
}

impl IfCondition {
    pub fn anchor(expression: ExpressionTree) -> Self {
        IfCondition {
            is_expression: true,
            target: IfTarget::Anchor(AnchorRef::Anchor),
            expression: Some(expression),
        }
    }

    /// An `elif` (with expression) or `else` (without) folded into its anchor.
    pub fn branch(expression: Option<ExpressionTree>, node: SimplifiedNode) -> Self {
        IfCondition {
            is_expression: expression.is_some(),
            target: IfTarget::Block(Box::new(node)),
            expression,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedNode {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs_list: Option<Vec<SimplifiedAttr>>,
    #[serde(rename = "__exps", default, skip_serializing_if = "Option::is_none")]
    pub exps: Option<Exps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_conditions: Option<Vec<IfCondition>>,
    #[serde(rename = "for", default, skip_serializing_if = "Option::is_none")]
    pub for_: Option<ForDirective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SimplifiedNode>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SimplifiedNode {
    pub fn children(&self) -> &[SimplifiedNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn attrs(&self) -> &[SimplifiedAttr] {
        self.attrs_list.as_deref().unwrap_or(&[])
    }

    pub fn conditions(&self) -> &[IfCondition] {
        self.if_conditions.as_deref().unwrap_or(&[])
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALIDATION (Return Option, not Result)
// ═══════════════════════════════════════════════════════════════════════════════

struct ContractChecker<'c> {
    config: &'c DirectiveConfig,
    path: Vec<String>,
    error: Option<CompilerError>,
}

impl ContractChecker<'_> {
    fn fail(&mut self, code: &str, message: String) {
        if self.error.is_none() {
            self.error = Some(CompilerError::new(code, &message, &self.path.join(".")));
        }
    }

    fn check_node(&mut self, node: &SimplifiedNode) {
        if let Some(field) = BOOKKEEPING_FIELDS
            .iter()
            .chain(DIRECTIVE_FIELDS.iter())
            .find(|field| node.extra.contains_key(**field))
        {
            self.fail(INV_RAW_FIELD, format!("Field \"{}\" survived simplification.", field));
        }

        if node.tag.as_deref() == Some(TRANSIENT_TAG) {
            self.fail(
                INV_TRANSIENT_TAG,
                format!("Transient tag <{}> was not renamed.", TRANSIENT_TAG),
            );
        }

        if matches!(&node.attrs_list, Some(list) if list.is_empty()) {
            self.fail(INV_EMPTY_ATTRS, "Empty attrsList was emitted.".to_string());
        }

        if let Some(exps) = &node.exps {
            if !matches!(exps, Exps::Text(_)) || node.node_type != NodeType::Text {
                self.fail(
                    INV_EXPS_KIND,
                    format!("Node-level __exps of kind \"{}\" outside a text node.", exps.kind()),
                );
            }
        }

        if let Some(for_) = &node.for_ {
            if !matches!(for_.exps, Exps::For(_)) {
                self.fail(
                    INV_EXPS_KIND,
                    format!("for.__exps has kind \"{}\".", for_.exps.kind()),
                );
            }
        }

        self.check_conditions(node.conditions());
    }

    fn check_conditions(&mut self, conditions: &[IfCondition]) {
        for (i, condition) in conditions.iter().enumerate() {
            let is_anchor = matches!(condition.target, IfTarget::Anchor(_));
            if is_anchor != (i == 0) {
                self.fail(
                    INV_CONDITION_CHAIN,
                    format!("Condition {} has a misplaced \"self\" target.", i),
                );
            }
            if condition.is_expression != condition.expression.is_some() {
                self.fail(
                    INV_CONDITION_CHAIN,
                    format!("Condition {} expression does not match isExpression.", i),
                );
            }
        }
    }
}

impl SimplifiedVisitor for ContractChecker<'_> {
    fn visit_node(&mut self, node: &SimplifiedNode) {
        self.check_node(node);

        for (i, attr) in node.attrs().iter().enumerate() {
            self.path.push(format!("attrsList[{}]", i));
            self.visit_attr(attr);
            self.path.pop();
        }
        for (i, condition) in node.conditions().iter().enumerate() {
            self.path.push(format!("ifConditions[{}]", i));
            self.visit_if_condition(condition);
            self.path.pop();
        }
        self.visit_children(node.children());
    }

    fn visit_attr(&mut self, attr: &SimplifiedAttr) {
        if self.config.is_directive(&attr.name) {
            self.fail(
                INV_DIRECTIVE_ATTR,
                format!("Directive attribute \"{}\" survived.", attr.name),
            );
        }
        if attr.value.is_some() && attr.exps.is_some() {
            self.fail(
                INV_VALUE_WITH_EXPS,
                format!("Attribute \"{}\" has both value and __exps.", attr.name),
            );
        }
        if let Some(exps @ (Exps::Text(_) | Exps::For(_))) = &attr.exps {
            self.fail(
                INV_EXPS_KIND,
                format!("Attribute \"{}\" holds __exps of kind \"{}\".", attr.name, exps.kind()),
            );
        }
    }

    fn visit_children(&mut self, children: &[SimplifiedNode]) {
        for (i, child) in children.iter().enumerate() {
            self.path.push(format!("children[{}]", i));
            self.visit_node(child);
            self.path.pop();
        }
    }
}

/// Check a simplified tree against the generator-facing contract.
pub fn validate_simplified(
    root: &SimplifiedNode,
    config: &DirectiveConfig,
) -> Option<CompilerError> {
    let mut checker = ContractChecker {
        config,
        path: vec!["root".to_string()],
        error: None,
    };
    checker.visit_node(root);
    checker.error
}
