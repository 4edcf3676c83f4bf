//! Dotted-name resolution for assignment targets
//!
//! `a.b.c` parses as `(a.b).c`; resolution walks the member-access chain with
//! an explicit stack so long chains cannot exhaust the call stack.

use crate::error::StructuralError;
use crate::node::{NodeKind, SyntaxNode};

/// Resolve an identifier or member-access chain into a dotted name
///
/// Member access resolves to `object + "." + property`. Identifier-like
/// leaves (`x`, `this`, `super`, `#private`) resolve to their value. Any other
/// node kind is not a name.
pub fn resolve_name(node: &SyntaxNode) -> Result<String, StructuralError> {
    let mut segments: Vec<&str> = Vec::new();
    let mut pending = vec![node];

    while let Some(current) = pending.pop() {
        match current.kind {
            NodeKind::Dot => {
                let object = member_operand(current, 0)?;
                let property = member_operand(current, 1)?;
                // Object is popped first so segments stay left to right
                pending.push(property);
                pending.push(object);
            }
            kind if kind.is_name_leaf() => {
                let value = current.value.as_deref().ok_or(StructuralError::MissingValue {
                    kind,
                    line: current.lineno,
                })?;
                segments.push(value);
            }
            kind => {
                return Err(StructuralError::InvalidNameTarget {
                    kind,
                    line: current.lineno,
                })
            }
        }
    }

    Ok(segments.join("."))
}

fn member_operand(node: &SyntaxNode, index: usize) -> Result<&SyntaxNode, StructuralError> {
    node.operand(index).ok_or(StructuralError::MissingOperand {
        kind: node.kind,
        index,
        line: node.lineno,
    })
}
