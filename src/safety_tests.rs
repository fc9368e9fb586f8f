//! Safety gate tests for the simplified AST contract.
//!
//! Each case hand-builds an output tree that breaks exactly one guarantee and
//! checks that `validate_simplified` reports it with the right code and path.

#[cfg(test)]
mod tests {
    use crate::config::{Mode, SimplifyOptions};
    use crate::raw_ast::RawNode;
    use crate::transform::simplify_template;
    use crate::validate::{
        validate_simplified, IfCondition, SimplifiedAttr, SimplifiedNode, INV_CONDITION_CHAIN,
        INV_DIRECTIVE_ATTR, INV_EMPTY_ATTRS, INV_EXPS_KIND, INV_RAW_FIELD, INV_TRANSIENT_TAG,
        INV_VALUE_WITH_EXPS,
    };
    use crate::visitor::{walk_node, SimplifiedVisitor};
    use rstest::rstest;
    use serde_json::{json, Value};

    fn node(value: Value) -> SimplifiedNode {
        serde_json::from_value(value).unwrap()
    }

    fn ident(name: &str) -> Value {
        json!({ "type": "Identifier", "name": name })
    }

    fn check(value: Value) -> Option<(String, String)> {
        validate_simplified(&node(value), Mode::Wx.directives()).map(|e| (e.code, e.path))
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // SIMP001-SIMP007: One violation per tree
    // ═══════════════════════════════════════════════════════════════════════════════

    #[rstest]
    #[case::bookkeeping(
        json!({ "type": 1, "tag": "view", "parent": null }),
        INV_RAW_FIELD,
        "root"
    )]
    #[case::temp_if(
        json!({ "type": 1, "tag": "view", "_tempIf": true }),
        INV_RAW_FIELD,
        "root"
    )]
    #[case::value_and_exps(
        json!({
            "type": 1,
            "tag": "image",
            "attrsList": [{ "name": "src", "value": "{{u}}", "__exps": { "kind": "generic", "value": ident("u") } }]
        }),
        INV_VALUE_WITH_EXPS,
        "root.attrsList[0]"
    )]
    #[case::empty_attrs(
        json!({ "type": 1, "tag": "view", "attrsList": [] }),
        INV_EMPTY_ATTRS,
        "root"
    )]
    #[case::text_exps_on_element(
        json!({ "type": 1, "tag": "view", "__exps": { "kind": "text", "value": ident("a") } }),
        INV_EXPS_KIND,
        "root"
    )]
    #[case::for_exps_on_attr(
        json!({
            "type": 1,
            "tag": "view",
            "attrsList": [{ "name": "id", "__exps": { "kind": "for", "value": ident("a") } }]
        }),
        INV_EXPS_KIND,
        "root.attrsList[0]"
    )]
    #[case::wrong_for_kind(
        json!({ "type": 1, "tag": "view", "for": { "__exps": { "kind": "generic", "value": ident("l") } } }),
        INV_EXPS_KIND,
        "root"
    )]
    #[case::transient_tag(
        json!({ "type": 1, "tag": "temp-node" }),
        INV_TRANSIENT_TAG,
        "root"
    )]
    #[case::directive_attr(
        json!({
            "type": 1,
            "tag": "view",
            "attrsList": [{ "name": "id", "value": "x" }, { "name": "wx:key", "value": "id" }]
        }),
        INV_DIRECTIVE_ATTR,
        "root.attrsList[1]"
    )]
    fn test_contract_violation(#[case] tree: Value, #[case] code: &str, #[case] path: &str) {
        assert_eq!(check(tree), Some((code.to_string(), path.to_string())));
    }

    #[test]
    fn test_condition_chain_must_start_at_anchor() {
        let tree = json!({
            "type": 1,
            "tag": "view",
            "ifConditions": [
                { "isExpression": true, "target": { "type": 1, "tag": "view" }, "expression": ident("a") }
            ]
        });
        assert_eq!(
            check(tree),
            Some((INV_CONDITION_CHAIN.to_string(), "root".to_string()))
        );
    }

    #[test]
    fn test_branches_after_else_are_accepted() {
        let tree = json!({
            "type": 1,
            "tag": "view",
            "ifConditions": [
                { "isExpression": true, "target": "self", "expression": ident("a") },
                { "isExpression": false, "target": { "type": 1, "tag": "view" }, "expression": null },
                { "isExpression": true, "target": { "type": 1, "tag": "view" }, "expression": ident("b") },
                { "isExpression": false, "target": { "type": 1, "tag": "view" }, "expression": null }
            ]
        });
        assert_eq!(check(tree), None);
    }

    #[test]
    fn test_expression_presence_matches_flag() {
        let tree = json!({
            "type": 1,
            "tag": "view",
            "ifConditions": [
                { "isExpression": true, "target": "self", "expression": null }
            ]
        });
        assert_eq!(
            check(tree),
            Some((INV_CONDITION_CHAIN.to_string(), "root".to_string()))
        );
    }

    #[test]
    fn test_violation_inside_branch_reports_nested_path() {
        let tree = json!({
            "type": 1,
            "tag": "page",
            "children": [{
                "type": 1,
                "tag": "view",
                "ifConditions": [
                    { "isExpression": true, "target": "self", "expression": ident("a") },
                    { "isExpression": false, "target": { "type": 1, "tag": "temp-node" }, "expression": null }
                ]
            }]
        });
        assert_eq!(
            check(tree),
            Some((
                INV_TRANSIENT_TAG.to_string(),
                "root.children[0].ifConditions[1]".to_string()
            ))
        );
    }

    #[test]
    fn test_guarantee_is_attached() {
        let err = validate_simplified(
            &node(json!({ "type": 1, "tag": "temp-node" })),
            Mode::Wx.directives(),
        )
        .unwrap();
        assert_eq!(err.error_type, "SIMPLIFIED_AST_CONTRACT_VIOLATION");
        assert!(err.guarantee.contains("block tag"));
        assert!(err.to_string().starts_with("[SIMP006]"));
    }

    #[test]
    fn test_directive_check_follows_mode() {
        let tree = node(json!({
            "type": 1,
            "tag": "view",
            "attrsList": [{ "name": "wx:if", "value": "x" }]
        }));
        assert!(validate_simplified(&tree, Mode::Swan.directives()).is_none());
        assert!(validate_simplified(&tree, Mode::Wx.directives()).is_some());
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // Simplifier output always passes
    // ═══════════════════════════════════════════════════════════════════════════════

    fn full_template() -> RawNode {
        serde_json::from_value(json!({
            "type": 1,
            "tag": "temp-node",
            "children": [
                {
                    "type": 1,
                    "tag": "view",
                    "attrsList": [
                        { "name": "wx:if", "value": "{{a}}" },
                        { "name": "class", "value": "x {{y}}", "staticClassExp": "'x'", "dynamicClassExp": "y" }
                    ],
                    "if": { "exp": "a" },
                    "children": [{ "type": 3, "text": "{{a}} items" }]
                },
                { "type": 3, "text": " " },
                {
                    "type": 1,
                    "tag": "temp-node",
                    "attrsList": [{ "name": "wx:else" }],
                    "else": true,
                    "children": [{ "type": 1, "tag": "text", "attrsList": [{ "name": "style", "value": "color: {{c}}" }] }]
                },
                {
                    "type": 1,
                    "tag": "view",
                    "attrsList": [{ "name": "wx:for", "value": "{{rows}}" }, { "name": "wx:key", "value": "id" }],
                    "for": { "exp": "rows", "item": "row", "key": "id" },
                    "_if": true
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_simplified_output_passes_contract() {
        let mut options = SimplifyOptions::new(Mode::Wx);
        options.validate_output = false;
        let out = simplify_template(&full_template(), &options).unwrap();
        assert_eq!(validate_simplified(&out, Mode::Wx.directives()), None);
    }

    #[derive(Default)]
    struct Census {
        nodes: usize,
        attrs: usize,
        conditions: usize,
    }

    impl SimplifiedVisitor for Census {
        fn visit_node(&mut self, node: &SimplifiedNode) {
            self.nodes += 1;
            walk_node(self, node);
        }

        fn visit_attr(&mut self, _attr: &SimplifiedAttr) {
            self.attrs += 1;
        }

        fn visit_if_condition(&mut self, condition: &IfCondition) {
            self.conditions += 1;
            crate::visitor::walk_if_condition(self, condition);
        }
    }

    #[test]
    fn test_visitor_reaches_folded_branches() {
        let out = simplify_template(&full_template(), &SimplifyOptions::new(Mode::Wx)).unwrap();

        let mut census = Census::default();
        census.visit_node(&out);

        // block, view + text child, " ", else block + text child, for view
        assert_eq!(census.nodes, 7);
        assert_eq!(census.conditions, 2);
        // class on the anchor, style on the nested text
        assert_eq!(census.attrs, 2);
    }
}
