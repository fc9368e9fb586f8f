use crate::validate::{IfCondition, IfTarget, SimplifiedAttr, SimplifiedNode};

/// Read-only traversal over a simplified tree.
///
/// Rules:
/// 1. Attributes are visited before condition targets, condition targets before children.
/// 2. Implementers override `visit_*` methods to add behavior.
/// 3. Implementers call the matching `walk_*` function to keep descending.
/// 4. Folded `elif`/`else` blocks are reached through their anchor's conditions only.
pub trait SimplifiedVisitor {
    fn visit_node(&mut self, node: &SimplifiedNode) {
        walk_node(self, node);
    }

    fn visit_attr(&mut self, _attr: &SimplifiedAttr) {
        // Leaf, nothing to walk by default
    }

    fn visit_if_condition(&mut self, condition: &IfCondition) {
        walk_if_condition(self, condition);
    }

    fn visit_children(&mut self, children: &[SimplifiedNode]) {
        walk_children(self, children);
    }
}

pub fn walk_node<V: SimplifiedVisitor + ?Sized>(visitor: &mut V, node: &SimplifiedNode) {
    for attr in node.attrs() {
        visitor.visit_attr(attr);
    }
    for condition in node.conditions() {
        visitor.visit_if_condition(condition);
    }
    visitor.visit_children(node.children());
}

pub fn walk_if_condition<V: SimplifiedVisitor + ?Sized>(visitor: &mut V, condition: &IfCondition) {
    if let IfTarget::Block(node) = &condition.target {
        visitor.visit_node(node);
    }
}

pub fn walk_children<V: SimplifiedVisitor + ?Sized>(visitor: &mut V, children: &[SimplifiedNode]) {
    for node in children {
        visitor.visit_node(node);
    }
}
