#[cfg(feature = "napi")]
use napi_derive::napi;
use serde_json::Map;
use tracing::debug;

use crate::attrs::simplify_attrs;
use crate::conditional::{attach_branch, find_anchor, prune, ChainRole, Slot, SlotKind};
#[cfg(feature = "napi")]
use crate::config::Mode;
use crate::config::{DirectiveConfig, SimplifyOptions, BLOCK_TAG, TRANSIENT_TAG};
use crate::error::SimplifyError;
use crate::expression::{ExpressionParser, Extractor, OxcExpressionParser};
use crate::mustache::{BindingDetector, MustacheDetector};
use crate::raw_ast::{RawFor, RawNode, BOOKKEEPING_FIELDS, PLACEHOLDER_FLAG};
use crate::validate::{validate_simplified, Exps, ForDirective, IfCondition, SimplifiedNode};

// ═══════════════════════════════════════════════════════════════════════════════
// SIMPLIFIER
// ═══════════════════════════════════════════════════════════════════════════════

/// One pass over a raw template tree.
///
/// Input nodes are only borrowed; every output node is built fresh, so the
/// parser's tree stays usable after the pass.
struct Simplifier<'a> {
    config: &'a DirectiveConfig,
    extractor: Extractor<'a>,
}

impl Simplifier<'_> {
    fn simplify_root(&self, root: &RawNode) -> Result<SimplifiedNode, SimplifyError> {
        match ChainRole::of(root) {
            ChainRole::Start { exp } => {
                let expression = self.extractor.parse(exp)?;
                let mut node = self.simplify_node(root)?;
                node.if_conditions = Some(vec![IfCondition::anchor(expression)]);
                Ok(node)
            }
            ChainRole::ElseIf { .. } | ChainRole::Else => {
                log_orphan(root);
                self.simplify_node(root)
            }
            ChainRole::None => self.simplify_node(root),
        }
    }

    /// Place one child into its parent's slot list, resolving its chain role.
    fn place_child(&self, slots: &mut Vec<Slot>, raw: &RawNode) -> Result<(), SimplifyError> {
        if raw.is_placeholder() {
            slots.push(Slot::Placeholder);
            return Ok(());
        }

        let dead = raw.static_if == Some(false);

        let kind = match ChainRole::of(raw) {
            ChainRole::Start { exp } => {
                let expression = self.extractor.parse(exp)?;
                let mut node = self.simplify_node(raw)?;
                node.if_conditions = Some(vec![IfCondition::anchor(expression)]);
                slots.push(Slot::Placed {
                    node,
                    kind: SlotKind::Anchor,
                    dead,
                });
                return Ok(());
            }
            role @ (ChainRole::ElseIf { .. } | ChainRole::Else) => match find_anchor(slots) {
                Some(anchor) => {
                    let expression = match role {
                        ChainRole::ElseIf { exp } => Some(self.extractor.parse(exp)?),
                        _ => None,
                    };
                    let node = self.simplify_node(raw)?;
                    attach_branch(slots, anchor, IfCondition::branch(expression, node));
                    return Ok(());
                }
                None => {
                    log_orphan(raw);
                    SlotKind::Element
                }
            },
            ChainRole::None if raw.is_text() => SlotKind::Text,
            ChainRole::None => SlotKind::Element,
        };

        let node = self.simplify_node(raw)?;
        slots.push(Slot::Placed { node, kind, dead });
        Ok(())
    }

    fn simplify_node(&self, raw: &RawNode) -> Result<SimplifiedNode, SimplifyError> {
        let for_ = raw
            .for_
            .as_ref()
            .map(|directive| self.simplify_for(directive))
            .transpose()?;

        let attrs_list = simplify_attrs(raw.attrs(), self.config, &self.extractor)?;

        let (text, exps) = match (&raw.text, raw.is_text()) {
            (Some(text), true) => match self.extractor.extract(text)? {
                Some(tree) => (None, Some(Exps::Text(tree))),
                None => (Some(text.clone()), None),
            },
            (text, _) => (text.clone(), None),
        };

        let children = self.simplify_children(raw.children())?;

        let tag = raw.tag.as_deref().map(|tag| {
            if tag == TRANSIENT_TAG {
                BLOCK_TAG.to_string()
            } else {
                tag.to_string()
            }
        });

        let mut extra = Map::new();
        for (key, value) in &raw.extra {
            if !BOOKKEEPING_FIELDS.contains(&key.as_str()) && key != PLACEHOLDER_FLAG {
                extra.insert(key.clone(), value.clone());
            }
        }

        Ok(SimplifiedNode {
            node_type: raw.node_type,
            tag,
            text,
            attrs_list,
            exps,
            if_conditions: None,
            for_,
            children,
            extra,
        })
    }

    fn simplify_for(&self, directive: &RawFor) -> Result<ForDirective, SimplifyError> {
        Ok(ForDirective {
            exps: Exps::For(self.extractor.parse(&directive.exp)?),
            index: directive.index.clone(),
            item: directive.item.clone(),
            key: directive.key.clone(),
            extra: directive.extra.clone(),
        })
    }

    fn simplify_children(
        &self,
        children: &[RawNode],
    ) -> Result<Option<Vec<SimplifiedNode>>, SimplifyError> {
        let mut slots = Vec::with_capacity(children.len());
        for child in children {
            self.place_child(&mut slots, child)?;
        }

        let kept = prune(slots);
        Ok(if kept.is_empty() { None } else { Some(kept) })
    }
}

fn log_orphan(raw: &RawNode) {
    let directive = if raw.elseif.is_some() { "elif" } else { "else" };
    debug!(
        directive,
        tag = raw.tag.as_deref().unwrap_or(""),
        "orphan conditional directive dropped"
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Simplify a raw template tree with the default oxc parser and mustache detector.
pub fn simplify_template(
    root: &RawNode,
    options: &SimplifyOptions,
) -> Result<SimplifiedNode, SimplifyError> {
    simplify_template_with(root, options, &OxcExpressionParser, &MustacheDetector)
}

/// Simplify with caller-supplied expression parser and binding detector.
pub fn simplify_template_with(
    root: &RawNode,
    options: &SimplifyOptions,
    parser: &dyn ExpressionParser,
    detector: &dyn BindingDetector,
) -> Result<SimplifiedNode, SimplifyError> {
    debug!(mode = %options.mode, tag = root.tag.as_deref().unwrap_or(""), "simplifying template");

    let config = options.mode.directives();
    let simplifier = Simplifier {
        config,
        extractor: Extractor::new(detector, parser),
    };
    let simplified = simplifier.simplify_root(root)?;

    if options.validate_output {
        if let Some(violation) = validate_simplified(&simplified, config) {
            return Err(SimplifyError::Invariant(violation));
        }
    }

    Ok(simplified)
}

/// JSON in, JSON out. `options_json` is a serialized [`SimplifyOptions`].
pub fn simplify_template_json(ast_json: &str, options_json: &str) -> Result<String, SimplifyError> {
    let root: RawNode =
        serde_json::from_str(ast_json).map_err(|e| SimplifyError::InvalidAst(e.to_string()))?;
    let options: SimplifyOptions = serde_json::from_str(options_json)
        .map_err(|e| SimplifyError::InvalidAst(format!("options: {}", e)))?;

    let simplified = simplify_template(&root, &options)?;
    serde_json::to_string(&simplified).map_err(|e| SimplifyError::Serialize(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn simplify_template_native(ast_json: String, mode: String) -> napi::Result<String> {
    let mode: Mode = mode
        .parse()
        .map_err(|e: SimplifyError| napi::Error::from_reason(e.to_string()))?;
    let root: RawNode = serde_json::from_str(&ast_json)
        .map_err(|e| napi::Error::from_reason(format!("AST parse error: {}", e)))?;

    let simplified = simplify_template(&root, &SimplifyOptions::new(mode))
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;

    serde_json::to_string(&simplified)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}
