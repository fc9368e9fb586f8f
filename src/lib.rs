//! # Template Simplifier
//!
//! Takes the raw AST of a mini-program template, as produced by the markup
//! parser, and returns a smaller tree for the code generator: directives are
//! resolved, and every dynamic value is pre-parsed into an [`ExpressionTree`].
//!
//! ## Output Invariants
//!
//! 1. **Directives Consumed**: no node carries `if`, `elseif`, `else`, `_if` or
//!    `_tempIf`, and no directive attribute of the active [`Mode`] is left in
//!    `attrsList`.
//!
//! 2. **Condition Chains**: an `if` node becomes an anchor whose
//!    `ifConditions` lists itself (`target: "self"`) first, then each following
//!    `elif`, then at most one `else`, in source order. Folded branches no
//!    longer appear as siblings.
//!
//! 3. **Orphans Render**: an `elif`/`else` with no anchor before it (the
//!    nearest non-text sibling is a plain element, or there is none) loses its
//!    directive and renders unconditionally. This is not an error.
//!
//! 4. **Static Folding**: children marked `_if: false` are removed; `_if: true`
//!    children stay as plain nodes.
//!
//! 5. **Value or Expression**: an attribute keeps its literal `value` or trades
//!    it for `__exps`, never both. Text nodes do the same with `text`.
//!
//! 6. **Fresh Output**: the input tree is only borrowed. Parser bookkeeping
//!    (`parent`, `exps`, `unary`, `ifProcessed`, `attrsMap`) is not copied.
//!
//! Any expression that fails to parse aborts the pass with no partial output.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod attrs;
mod conditional;
mod config;
mod error;
mod expression;
mod mustache;
mod raw_ast;
mod transform;
mod validate;
mod visitor;

#[cfg(test)]
mod safety_tests;

pub use config::{DirectiveConfig, Mode, SimplifyOptions, BLOCK_TAG, TRANSIENT_TAG};
pub use error::SimplifyError;
pub use expression::{
    ExpressionParser, ExpressionTree, LiteralValue, ObjectMember, OxcExpressionParser,
};
pub use mustache::{Binding, BindingDetector, MustacheDetector};
pub use raw_ast::{DirectiveExp, NodeType, RawAttr, RawFor, RawNode};
pub use transform::{simplify_template, simplify_template_json, simplify_template_with};
pub use validate::*;
pub use visitor::{walk_children, walk_if_condition, walk_node, SimplifiedVisitor};

#[cfg(feature = "napi")]
pub use transform::simplify_template_native;

#[cfg(feature = "napi")]
#[napi]
pub fn compile_bridge() -> String {
    "Template Simplifier Native Bridge Connected".to_string()
}
