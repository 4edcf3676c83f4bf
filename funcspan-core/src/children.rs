//! Direct-child enumeration
//!
//! Positional operands come first, then named fields in `Field` order.
//! List-valued fields contribute each element in order.

use crate::node::{Child, SyntaxNode};

/// Direct children of `node`, in deterministic order, without deduplication
pub fn children_of(node: &SyntaxNode) -> Vec<&SyntaxNode> {
    let mut children: Vec<&SyntaxNode> = node.operands().iter().collect();

    for (_, child) in node.fields() {
        match child {
            Child::One(only) => children.push(only),
            Child::Many(list) => children.extend(list.iter()),
        }
    }

    children
}
