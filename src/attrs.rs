//! Attribute simplification.
//!
//! Directive attributes are dropped; every other attribute either keeps its
//! literal `value` or trades it for an extracted `__exps`.

use crate::config::{DirectiveConfig, EVENT_CONFIG_ATTR};
use crate::error::SimplifyError;
use crate::expression::{ExpressionTree, Extractor};
use crate::raw_ast::RawAttr;
use crate::validate::{EventExps, Exps, SimplifiedAttr};

/// Returns `None` when nothing but directives was authored.
pub fn simplify_attrs(
    attrs: &[RawAttr],
    config: &DirectiveConfig,
    extractor: &Extractor,
) -> Result<Option<Vec<SimplifiedAttr>>, SimplifyError> {
    let simplified = attrs
        .iter()
        .filter(|attr| !config.is_directive(&attr.name))
        .map(|attr| simplify_attr(attr, extractor))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(if simplified.is_empty() {
        None
    } else {
        Some(simplified)
    })
}

pub fn simplify_attr(attr: &RawAttr, extractor: &Extractor) -> Result<SimplifiedAttr, SimplifyError> {
    // Already extracted by an earlier stage.
    let exps = match &attr.exps {
        Some(existing) => Some(reuse(existing)),
        None => match attr.name.as_str() {
            "class" => class_or_style(
                attr,
                attr.static_class_exp.as_deref(),
                attr.dynamic_class_exp.as_deref(),
                extractor,
            )?,
            "style" => class_or_style(
                attr,
                attr.static_style_exp.as_deref(),
                attr.dynamic_style_exp.as_deref(),
                extractor,
            )?,
            EVENT_CONFIG_ATTR => event_map(attr, extractor)?,
            _ => generic(attr, extractor)?.map(Exps::Generic),
        },
    };

    Ok(SimplifiedAttr {
        name: attr.name.clone(),
        value: if exps.is_some() {
            None
        } else {
            attr.value.clone()
        },
        exps,
        extra: attr.extra.clone(),
    })
}

/// Node-level kinds have no meaning on an attribute.
fn reuse(existing: &Exps) -> Exps {
    match existing {
        Exps::Text(tree) | Exps::For(tree) => Exps::Generic(tree.clone()),
        other => other.clone(),
    }
}

fn generic(
    attr: &RawAttr,
    extractor: &Extractor,
) -> Result<Option<ExpressionTree>, SimplifyError> {
    match attr.value.as_deref() {
        Some(value) => extractor.extract(value),
        None => Ok(None),
    }
}

fn class_or_style(
    attr: &RawAttr,
    static_exp: Option<&str>,
    dynamic_exp: Option<&str>,
    extractor: &Extractor,
) -> Result<Option<Exps>, SimplifyError> {
    let authored = |exp: Option<&str>| exp.is_some_and(|e| !e.is_empty());

    if authored(static_exp) || authored(dynamic_exp) {
        return Ok(Some(Exps::ClassOrStyle(vec![
            extractor.parse_fragment(static_exp)?,
            extractor.parse_fragment(dynamic_exp)?,
        ])));
    }

    Ok(generic(attr, extractor)?.map(|whole| Exps::ClassOrStyle(vec![Some(whole)])))
}

fn event_map(attr: &RawAttr, extractor: &Extractor) -> Result<Option<Exps>, SimplifyError> {
    let Some(config_map) = &attr.event_config_map else {
        return Ok(None);
    };

    let mut events = Vec::with_capacity(config_map.len());
    for (event_name, handlers) in config_map {
        let handler_expressions = handlers
            .iter()
            .flatten()
            .map(|handler| extractor.parse(handler))
            .collect::<Result<Vec<_>, _>>()?;
        events.push(EventExps {
            event_name: event_name.clone(),
            handler_expressions,
        });
    }
    Ok(Some(Exps::EventMap(events)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::expression::OxcExpressionParser;
    use crate::mustache::MustacheDetector;
    use serde_json::json;

    fn attr(value: serde_json::Value) -> RawAttr {
        serde_json::from_value(value).unwrap()
    }

    fn run(raw: RawAttr) -> SimplifiedAttr {
        let extractor = Extractor::new(&MustacheDetector, &OxcExpressionParser);
        simplify_attr(&raw, &extractor).unwrap()
    }

    #[test]
    fn test_static_attr_keeps_value() {
        let out = run(attr(json!({ "name": "id", "value": "main" })));
        assert_eq!(out.value.as_deref(), Some("main"));
        assert!(out.exps.is_none());
    }

    #[test]
    fn test_generic_binding_replaces_value() {
        let out = run(attr(json!({ "name": "src", "value": "{{url}}" })));
        assert!(out.value.is_none());
        assert_eq!(out.exps, Some(Exps::Generic(ExpressionTree::identifier("url"))));
    }

    #[test]
    fn test_class_fragments_keep_static_dynamic_order() {
        let out = run(attr(json!({
            "name": "class",
            "value": "a {{b}}",
            "staticClassExp": "'a'",
            "dynamicClassExp": "b"
        })));
        assert!(out.value.is_none());
        assert_eq!(
            out.exps,
            Some(Exps::ClassOrStyle(vec![
                Some(ExpressionTree::string("a")),
                Some(ExpressionTree::identifier("b")),
            ]))
        );
        assert!(!out.extra.contains_key("staticClassExp"));
    }

    #[test]
    fn test_style_with_only_dynamic_fragment() {
        let out = run(attr(json!({
            "name": "style",
            "value": "{{s}}",
            "staticStyleExp": "",
            "dynamicStyleExp": "s"
        })));
        assert_eq!(
            out.exps,
            Some(Exps::ClassOrStyle(vec![None, Some(ExpressionTree::identifier("s"))]))
        );
    }

    #[test]
    fn test_class_with_only_static_fragment() {
        let out = run(attr(json!({
            "name": "class",
            "value": "a",
            "staticClassExp": "'a'"
        })));
        assert_eq!(
            out.exps,
            Some(Exps::ClassOrStyle(vec![Some(ExpressionTree::string("a")), None]))
        );
    }

    #[test]
    fn test_class_without_fragments_falls_back_to_mustache() {
        let out = run(attr(json!({ "name": "class", "value": "{{cls}}" })));
        assert_eq!(
            out.exps,
            Some(Exps::ClassOrStyle(vec![Some(ExpressionTree::identifier("cls"))]))
        );

        let literal = run(attr(json!({ "name": "class", "value": "plain" })));
        assert_eq!(literal.value.as_deref(), Some("plain"));
        assert!(literal.exps.is_none());
    }

    #[test]
    fn test_event_map_preserves_handler_order() {
        let out = run(attr(json!({
            "name": "data-eventconfigs",
            "value": "",
            "eventConfigMap": { "tap": ["onTap", "onTapExtra"], "longpress": null }
        })));
        let Some(Exps::EventMap(events)) = out.exps else {
            panic!("expected event map");
        };
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_name, "tap");
        assert_eq!(
            events[0].handler_expressions,
            vec![
                ExpressionTree::identifier("onTap"),
                ExpressionTree::identifier("onTapExtra"),
            ]
        );
        assert_eq!(events[1].event_name, "longpress");
        assert!(events[1].handler_expressions.is_empty());
        assert!(out.value.is_none());
    }

    #[test]
    fn test_event_attr_without_map_is_untouched() {
        let out = run(attr(json!({ "name": "data-eventconfigs", "value": "{{x}}" })));
        assert_eq!(out.value.as_deref(), Some("{{x}}"));
        assert!(out.exps.is_none());
    }

    #[test]
    fn test_existing_exps_are_not_re_extracted() {
        let existing = Exps::Generic(ExpressionTree::identifier("cached"));
        let mut raw = attr(json!({ "name": "src", "value": "{{url}}" }));
        raw.exps = Some(existing.clone());
        let out = run(raw);
        assert_eq!(out.exps, Some(existing));
        assert!(out.value.is_none());
    }

    #[test]
    fn test_reused_node_level_exps_become_generic() {
        for kind in ["text", "for"] {
            let raw = attr(json!({
                "name": "src",
                "value": "{{url}}",
                "__exps": { "kind": kind, "value": { "type": "Identifier", "name": "url" } }
            }));
            let out = run(raw);
            assert_eq!(out.exps, Some(Exps::Generic(ExpressionTree::identifier("url"))));
        }
    }

    #[test]
    fn test_directives_are_stripped_and_empty_list_omitted() {
        let extractor = Extractor::new(&MustacheDetector, &OxcExpressionParser);
        let config = Mode::Wx.directives();
        let attrs = vec![
            attr(json!({ "name": "wx:if", "value": "{{a}}" })),
            attr(json!({ "name": "wx:key", "value": "id" })),
        ];
        assert_eq!(simplify_attrs(&attrs, config, &extractor).unwrap(), None);

        let attrs = vec![
            attr(json!({ "name": "wx:for", "value": "{{list}}" })),
            attr(json!({ "name": "id", "value": "x" })),
        ];
        let out = simplify_attrs(&attrs, config, &extractor).unwrap().unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "id");
    }

    #[test]
    fn test_malformed_binding_propagates() {
        let extractor = Extractor::new(&MustacheDetector, &OxcExpressionParser);
        let raw = attr(json!({ "name": "src", "value": "{{ a + }}" }));
        assert!(matches!(
            simplify_attr(&raw, &extractor),
            Err(SimplifyError::Expression { .. })
        ));
    }
}
