//! funcspan core library - named-function discovery and source slicing for JavaScript and TypeScript

// Global invariants enforced in this crate:
// - The syntax tree is read-only once lowered
// - No global mutable state
// - No randomness, clocks, or async
// - Parsing and lowering run on one scoped thread sized from `max_depth`
// - Deterministic traversal order must be explicit
// - Every span indexes into the text the file was read as

pub mod children;
pub mod config;
pub mod discover;
pub mod error;
pub mod extract;
pub mod language;
pub mod lower;
pub mod node;
pub mod parser;
pub mod report;
pub mod resolve;
pub mod script;
pub mod span;

pub use config::ResolvedConfig;
pub use discover::{collect_functions, collect_functions_with, CollectOptions, FunctionTable};
pub use error::{Error, Result, StructuralError};
pub use extract::{load_document, parse_document, Document};
pub use node::{NodeKind, SyntaxNode};
pub use report::{function_entries, render_json, render_text, FunctionEntry};
pub use resolve::resolve_name;
pub use span::SourceSpan;
