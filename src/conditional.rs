//! `if` / `elif` / `else` chain resolution over one sibling list.
//!
//! Siblings are placed into [`Slot`]s in source order. An `if` node becomes an
//! anchor; each later `elif`/`else` is folded into the nearest anchor's
//! condition list and leaves a placeholder behind, so following branches still
//! reach the same anchor. Placeholders and statically dead nodes are dropped
//! by [`prune`] once the whole list has been placed.

use crate::raw_ast::RawNode;
use crate::validate::{IfCondition, SimplifiedNode};

/// Directive role of a raw node within its sibling list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainRole<'n> {
    Start { exp: &'n str },
    ElseIf { exp: &'n str },
    Else,
    None,
}

impl<'n> ChainRole<'n> {
    pub fn of(node: &'n RawNode) -> Self {
        if let Some(directive) = &node.if_ {
            ChainRole::Start {
                exp: &directive.exp,
            }
        } else if let Some(directive) = &node.elseif {
            ChainRole::ElseIf {
                exp: &directive.exp,
            }
        } else if node.else_ {
            ChainRole::Else
        } else {
            ChainRole::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Anchor,
    Element,
    Text,
}

#[derive(Debug)]
pub enum Slot {
    Placed {
        node: SimplifiedNode,
        kind: SlotKind,
        /// Statically folded to "never render".
        dead: bool,
    },
    /// Position vacated by a branch folded into its anchor.
    Placeholder,
}

/// Backward scan for the anchor an `elif`/`else` attaches to.
///
/// Text siblings and placeholders are transparent; any other element ends the
/// search, which makes the branch an orphan.
pub fn find_anchor(slots: &[Slot]) -> Option<usize> {
    for (index, slot) in slots.iter().enumerate().rev() {
        match slot {
            Slot::Placeholder => continue,
            Slot::Placed {
                kind: SlotKind::Text,
                ..
            } => continue,
            Slot::Placed {
                kind: SlotKind::Anchor,
                ..
            } => return Some(index),
            Slot::Placed {
                kind: SlotKind::Element,
                ..
            } => return None,
        }
    }
    None
}

/// Fold a branch into the anchor at `anchor` and vacate its own position.
pub fn attach_branch(slots: &mut Vec<Slot>, anchor: usize, condition: IfCondition) {
    if let Some(Slot::Placed { node, .. }) = slots.get_mut(anchor) {
        node.if_conditions.get_or_insert_with(Vec::new).push(condition);
    }
    slots.push(Slot::Placeholder);
}

/// Keep only nodes that will actually render, in order.
pub fn prune(slots: Vec<Slot>) -> Vec<SimplifiedNode> {
    let total = slots.len();
    let kept: Vec<SimplifiedNode> = slots
        .into_iter()
        .filter_map(|slot| match slot {
            Slot::Placed { node, dead: false, .. } => Some(node),
            Slot::Placed { dead: true, .. } | Slot::Placeholder => None,
        })
        .collect();
    if kept.len() != total {
        tracing::trace!(removed = total - kept.len(), kept = kept.len(), "pruned children");
    }
    kept
}
