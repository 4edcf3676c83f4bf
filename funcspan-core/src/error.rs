//! Error taxonomy for function extraction
//!
//! Every failure kind is distinguishable by the caller. Nothing in the core
//! retries or recovers: errors bubble to the driver unmodified.

use crate::node::NodeKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors emitted while reading, parsing, walking, or querying a script.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type for `{path}`")]
    UnsupportedFile { path: PathBuf },

    #[error("Failed to parse `{path}`: {message}")]
    Parse { path: PathBuf, message: String },

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("Function `{name}` not found")]
    NameNotFound { name: String },

    #[error("Failed to start the parser thread: {0}")]
    Thread(#[source] std::io::Error),
}

/// A node lacks what the walk expects of it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("Cannot resolve a name from a {kind} node (line {line})")]
    InvalidNameTarget { kind: NodeKind, line: u32 },

    #[error("{kind} node is missing operand {index} (line {line})")]
    MissingOperand {
        kind: NodeKind,
        index: usize,
        line: u32,
    },

    #[error("{kind} node has no value (line {line})")]
    MissingValue { kind: NodeKind, line: u32 },

    #[error("Syntax tree nests deeper than {limit} levels (line {line})")]
    TooDeep { limit: usize, line: u32 },

    #[error("Span {start}..{end} does not fit the source text")]
    SpanOutOfBounds { start: usize, end: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
