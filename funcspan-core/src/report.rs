//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Entries follow function-table order (first discovery of each name)
//! - Byte-for-byte identical output across runs

use crate::discover::FunctionTable;
use crate::error::{Result, StructuralError};
use crate::node::{FunctionForm, SyntaxNode};
use serde::Serialize;

/// One discovered function in report format
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionEntry {
    pub name: String,
    /// Byte offset of the first byte (inclusive)
    pub start: usize,
    /// Byte offset one past the last byte (exclusive)
    pub end: usize,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FunctionForm>,
}

impl FunctionEntry {
    fn new(name: &str, node: &SyntaxNode) -> Self {
        FunctionEntry {
            name: name.to_string(),
            start: node.span.start,
            end: node.span.end,
            line: node.lineno,
            form: node.form,
        }
    }
}

/// Flatten a function table into report entries
pub fn function_entries(table: &FunctionTable<'_>) -> Vec<FunctionEntry> {
    table
        .iter()
        .map(|(name, node)| FunctionEntry::new(name, node))
        .collect()
}

/// Render entries as text output, one `Function => name` line each
pub fn render_text(entries: &[FunctionEntry]) -> String {
    let mut output = String::new();
    for entry in entries {
        output.push_str(&format!("Function => {}\n", entry.name));
    }
    output
}

/// Render entries as JSON output
pub fn render_json(entries: &[FunctionEntry]) -> String {
    serde_json::to_string_pretty(entries).unwrap_or_else(|_| "[]".to_string())
}

/// Source text of the function registered under `name`
pub fn function_source<'s>(source: &'s str, table: &FunctionTable<'_>, name: &str) -> Result<&'s str> {
    let node = table.require(name)?;
    let span = node.span;
    span.slice(source).ok_or_else(|| {
        StructuralError::SpanOutOfBounds {
            start: span.start,
            end: span.end,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::node::NodeKind;
    use crate::span::SourceSpan;

    fn function(name: &str, start: usize, end: usize) -> SyntaxNode {
        SyntaxNode::new(NodeKind::Function, SourceSpan::new(start, end), 1)
            .with_name(Some(name.to_string()))
            .with_form(FunctionForm::Declared)
    }

    #[test]
    fn test_render_text_lines() {
        let foo = function("foo", 0, 16);
        let bar = function("bar", 17, 33);
        let mut table = FunctionTable::new();
        table.insert("foo".to_string(), &foo);
        table.insert("bar".to_string(), &bar);

        let output = render_text(&function_entries(&table));
        assert_eq!(output, "Function => foo\nFunction => bar\n");
    }

    #[test]
    fn test_render_text_empty() {
        assert_eq!(render_text(&[]), "");
    }

    #[test]
    fn test_render_json_fields() {
        let foo = function("foo", 0, 16);
        let mut table = FunctionTable::new();
        table.insert("foo".to_string(), &foo);

        let json: serde_json::Value =
            serde_json::from_str(&render_json(&function_entries(&table))).unwrap();
        assert_eq!(json[0]["name"], "foo");
        assert_eq!(json[0]["start"], 0);
        assert_eq!(json[0]["end"], 16);
        assert_eq!(json[0]["line"], 1);
        assert_eq!(json[0]["form"], "declared");
    }

    #[test]
    fn test_function_source_slices_span() {
        let source = "function foo() {}\nfunction bar() {}";
        let bar = function("bar", 18, 35);
        let mut table = FunctionTable::new();
        table.insert("bar".to_string(), &bar);

        assert_eq!(function_source(source, &table, "bar").unwrap(), "function bar() {}");
    }

    #[test]
    fn test_function_source_unknown_name() {
        let table = FunctionTable::new();
        assert!(matches!(
            function_source("", &table, "missing"),
            Err(Error::NameNotFound { name }) if name == "missing"
        ));
    }

    #[test]
    fn test_function_source_span_outside_text() {
        let foo = function("foo", 0, 100);
        let mut table = FunctionTable::new();
        table.insert("foo".to_string(), &foo);
        assert!(matches!(
            function_source("short", &table, "foo"),
            Err(Error::Structural(StructuralError::SpanOutOfBounds { start: 0, end: 100 }))
        ));
    }
}
