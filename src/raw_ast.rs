//! Raw template AST as emitted by the markup parser.
//!
//! Only the fields the simplifier reads are typed; everything else lands in
//! `extra` and is carried through to the simplified node untouched.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::validate::Exps;

/// Parser bookkeeping that never reaches the generator.
pub const BOOKKEEPING_FIELDS: [&str; 4] = ["parent", "exps", "unary", "ifProcessed"];

/// Set by the parser on nodes that were already folded into a condition chain.
pub const PLACEHOLDER_FLAG: &str = "_tempIf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NodeType {
    Element,
    Text,
}

impl TryFrom<u8> for NodeType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(NodeType::Element),
            3 => Ok(NodeType::Text),
            other => Err(format!("unsupported node type {}", other)),
        }
    }
}

impl From<NodeType> for u8 {
    fn from(value: NodeType) -> Self {
        match value {
            NodeType::Element => 1,
            NodeType::Text => 3,
        }
    }
}

/// `if` / `elif` directive payload. `exp` is already stripped of mustaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectiveExp {
    #[serde(default)]
    pub raw: Option<String>,
    pub exp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFor {
    #[serde(default)]
    pub raw: Option<String>,
    pub exp: String,
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttr {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub static_class_exp: Option<String>,
    #[serde(default)]
    pub dynamic_class_exp: Option<String>,
    #[serde(default)]
    pub static_style_exp: Option<String>,
    #[serde(default)]
    pub dynamic_style_exp: Option<String>,
    /// Event name → handler descriptor sources, in authoring order.
    #[serde(default)]
    pub event_config_map: Option<IndexMap<String, Option<Vec<String>>>>,
    /// Set when an earlier stage already extracted this attribute.
    #[serde(rename = "__exps", default)]
    pub exps: Option<Exps>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attrs_list: Option<Vec<RawAttr>>,
    #[serde(default)]
    pub attrs_map: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub children: Option<Vec<RawNode>>,
    #[serde(rename = "if", default)]
    pub if_: Option<DirectiveExp>,
    #[serde(default)]
    pub elseif: Option<DirectiveExp>,
    #[serde(rename = "else", default)]
    pub else_: bool,
    #[serde(rename = "for", default)]
    pub for_: Option<RawFor>,
    /// Outcome of static condition folding, when it could be decided.
    #[serde(rename = "_if", default)]
    pub static_if: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawNode {
    pub fn element(tag: &str) -> Self {
        RawNode {
            node_type: NodeType::Element,
            tag: Some(tag.to_string()),
            text: None,
            attrs_list: None,
            attrs_map: None,
            children: None,
            if_: None,
            elseif: None,
            else_: false,
            for_: None,
            static_if: None,
            extra: Map::new(),
        }
    }

    pub fn text(text: &str) -> Self {
        RawNode {
            node_type: NodeType::Text,
            tag: None,
            text: Some(text.to_string()),
            ..RawNode::element("")
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.extra.get(PLACEHOLDER_FLAG).and_then(Value::as_bool) == Some(true)
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    pub fn children(&self) -> &[RawNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn attrs(&self) -> &[RawAttr] {
        self.attrs_list.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parser_output_deserializes() {
        let node: RawNode = serde_json::from_value(json!({
            "type": 1,
            "tag": "view",
            "attrsList": [{ "name": "wx:if", "value": "{{show}}" }],
            "attrsMap": { "wx:if": "{{show}}" },
            "if": { "raw": "{{show}}", "exp": "show" },
            "unary": false,
            "isComponent": false,
            "children": [{ "type": 3, "text": "hi" }]
        }))
        .unwrap();

        assert_eq!(node.tag.as_deref(), Some("view"));
        assert_eq!(node.if_.as_ref().unwrap().exp, "show");
        assert!(!node.else_);
        assert_eq!(node.children().len(), 1);
        assert!(node.children()[0].is_text());
        assert_eq!(node.extra.get("unary"), Some(&json!(false)));
        assert_eq!(node.extra.get("isComponent"), Some(&json!(false)));
    }

    #[test]
    fn test_placeholder_flag() {
        let flagged: RawNode =
            serde_json::from_value(json!({ "type": 1, "tag": "block", "_tempIf": true })).unwrap();
        assert!(flagged.is_placeholder());

        let cleared: RawNode =
            serde_json::from_value(json!({ "type": 1, "tag": "block", "_tempIf": false })).unwrap();
        assert!(!cleared.is_placeholder());
        assert!(!RawNode::element("view").is_placeholder());
    }

    #[test]
    fn test_rejects_unknown_node_type() {
        let result: Result<RawNode, _> = serde_json::from_value(json!({ "type": 8 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_event_map_keeps_authoring_order() {
        let attr: RawAttr = serde_json::from_value(json!({
            "name": "data-eventconfigs",
            "eventConfigMap": { "tap": ["a"], "longpress": null, "touchstart": ["b"] }
        }))
        .unwrap();
        let names: Vec<&str> = attr
            .event_config_map
            .as_ref()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(names, vec!["tap", "longpress", "touchstart"]);
    }
}
