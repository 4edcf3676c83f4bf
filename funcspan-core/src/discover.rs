//! Function discovery over the lowered syntax tree
//!
//! Global invariants enforced:
//! - Depth-first pre-order traversal in child-enumeration order
//! - One accumulator per run; the last-visited definition of a name wins
//! - The tree is only read, never mutated
//!
//! Detection rules, checked per node (at most one can match):
//! - Named function: a function node with a non-empty name
//! - Assigned function: an assignment whose right operand is an anonymous
//!   function; the name is the resolved left operand (`x`, `a.b.c`)

use crate::children::children_of;
use crate::error::{Error, StructuralError};
use crate::node::{NodeKind, SyntaxNode};
use crate::resolve::resolve_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{trace, warn};

/// What to do when an assigned function's target is not a dotted name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedTargets {
    /// Abort the run with a structural error
    #[default]
    Error,
    /// Log a warning and leave the function out of the table
    Skip,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectOptions {
    pub unresolved_targets: UnresolvedTargets,
}

/// Resolved function name to the node defining it
///
/// Names keep the position of their first insertion; a later insert under the
/// same name replaces the node only.
#[derive(Debug, Default)]
pub struct FunctionTable<'a> {
    entries: Vec<(String, &'a SyntaxNode)>,
    index: HashMap<String, usize>,
}

impl<'a> FunctionTable<'a> {
    pub fn new() -> Self {
        FunctionTable::default()
    }

    /// Insert or overwrite; returns the node previously stored under `name`
    pub fn insert(&mut self, name: String, function: &'a SyntaxNode) -> Option<&'a SyntaxNode> {
        match self.index.get(&name) {
            Some(&slot) => Some(std::mem::replace(&mut self.entries[slot].1, function)),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, function));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&'a SyntaxNode> {
        self.index.get(name).map(|&slot| self.entries[slot].1)
    }

    /// Look up `name`, failing with `NameNotFound`
    pub fn require(&self, name: &str) -> Result<&'a SyntaxNode, Error> {
        self.get(name).ok_or_else(|| Error::NameNotFound {
            name: name.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in first-insertion order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &'a SyntaxNode)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), *node))
    }
}

/// Collect every named function under `root`
pub fn collect_functions(root: &SyntaxNode) -> Result<FunctionTable<'_>, StructuralError> {
    collect_functions_with(root, &CollectOptions::default())
}

/// Collect every named function under `root` with explicit options
pub fn collect_functions_with<'a>(
    root: &'a SyntaxNode,
    options: &CollectOptions,
) -> Result<FunctionTable<'a>, StructuralError> {
    let mut table = FunctionTable::new();
    let mut pending = vec![root];

    while let Some(node) = pending.pop() {
        if let Some((name, function)) = match_function(node, options)? {
            trace!(name = %name, line = function.lineno, "discovered function");
            table.insert(name, function);
        }

        // Reversed so the first child is visited next
        pending.extend(children_of(node).into_iter().rev());
    }

    Ok(table)
}

/// Apply the detection rules to a single node
fn match_function<'a>(
    node: &'a SyntaxNode,
    options: &CollectOptions,
) -> Result<Option<(String, &'a SyntaxNode)>, StructuralError> {
    match node.kind {
        NodeKind::Function => Ok(node
            .function_name()
            .map(|name| (name.to_string(), node))),
        NodeKind::Assign => {
            let value = assign_operand(node, 1)?;
            if !value.is_function() || value.function_name().is_some() {
                return Ok(None);
            }
            let target = assign_operand(node, 0)?;
            match resolve_name(target) {
                Ok(name) => Ok(Some((name, value))),
                Err(err) if options.unresolved_targets == UnresolvedTargets::Skip => {
                    warn!(line = node.lineno, "skipping assigned function: {}", err);
                    Ok(None)
                }
                Err(err) => Err(err),
            }
        }
        _ => Ok(None),
    }
}

fn assign_operand(node: &SyntaxNode, index: usize) -> Result<&SyntaxNode, StructuralError> {
    node.operand(index).ok_or(StructuralError::MissingOperand {
        kind: node.kind,
        index,
        line: node.lineno,
    })
}
