//! Document loading: read, parse, and lower one input file

use crate::config::ResolvedConfig;
use crate::discover::{collect_functions_with, CollectOptions, FunctionTable};
use crate::error::{Error, Result};
use crate::language::SourceKind;
use crate::lower::Lowerer;
use crate::node::{NodeKind, SyntaxNode};
use crate::parser;
use crate::report;
use crate::script::extract_scripts;
use crate::span::{LineIndex, SourceSpan};
use std::path::{Path, PathBuf};
use swc_common::{sync::Lrc, SourceMap};
use tracing::debug;

/// An input file together with its lowered syntax tree
///
/// Every span in `root` indexes into `source`.
#[derive(Debug)]
pub struct Document {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub source: String,
    pub root: SyntaxNode,
}

impl Document {
    /// Run function discovery over the document
    pub fn functions(&self, options: &CollectOptions) -> Result<FunctionTable<'_>> {
        Ok(collect_functions_with(&self.root, options)?)
    }

    /// Source text of the function registered under `name`
    pub fn function_source<'d>(&'d self, table: &FunctionTable<'_>, name: &str) -> Result<&'d str> {
        report::function_source(&self.source, table, name)
    }
}

/// Read `path` once and build its document
pub fn load_document(path: &Path, config: &ResolvedConfig) -> Result<Document> {
    let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(path, source, config)
}

/// Stack reserved for each level of `max_depth`; sized for unoptimized builds
const STACK_PER_LEVEL: usize = 64 * 1024;
/// Stack for the parser itself and everything above the first level
const BASE_STACK: usize = 8 * 1024 * 1024;

/// Stack size for the thread that parses and lowers under `max_depth`
fn lowering_stack_size(max_depth: usize) -> usize {
    BASE_STACK.saturating_add(max_depth.saturating_mul(STACK_PER_LEVEL))
}

/// Build a document from text already in memory
///
/// `path` picks the syntax (by extension) and names the file in errors.
/// Parsing and lowering recurse once per nesting level, so they run on a
/// thread whose stack covers `max_depth` levels.
pub fn parse_document(path: &Path, source: String, config: &ResolvedConfig) -> Result<Document> {
    let kind = SourceKind::from_path(path);
    if kind.is_html() && !config.html_scripts {
        return Err(Error::UnsupportedFile {
            path: path.to_path_buf(),
        });
    }

    let root = std::thread::scope(|scope| {
        std::thread::Builder::new()
            .name("funcspan-parse".to_string())
            .stack_size(lowering_stack_size(config.lower.max_depth))
            .spawn_scoped(scope, || lower_source(path, &source, kind, config))
            .map_err(Error::Thread)?
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    })?;

    Ok(Document {
        path: path.to_path_buf(),
        kind,
        source,
        root,
    })
}

/// Parse `source` and lower it into one `Script` root
fn lower_source(
    path: &Path,
    source: &str,
    kind: SourceKind,
    config: &ResolvedConfig,
) -> Result<SyntaxNode> {
    let filename = path.to_string_lossy();
    let cm: Lrc<SourceMap> = Default::default();
    let lines = LineIndex::new(source);

    if !kind.is_html() {
        debug!(file = %filename, ?kind, "parsing script");
        let parsed = parser::parse_source(source, &cm, &filename, kind)?;
        return Ok(
            Lowerer::new(source, &lines, parsed.file.start_pos, 0, config.lower)
                .lower_program(&parsed.program)?,
        );
    }

    let mut blocks = Vec::new();
    for block in extract_scripts(source) {
        debug!(file = %filename, offset = block.offset, "parsing inline script");
        let parsed = parser::parse_source(&block.text, &cm, &filename, kind)?;
        let lowered = Lowerer::new(
            source,
            &lines,
            parsed.file.start_pos,
            block.offset,
            config.lower,
        )
        .lower_program(&parsed.program)?;
        blocks.push(lowered);
    }

    Ok(SyntaxNode::new(NodeKind::Script, SourceSpan::new(0, source.len()), 1).with_operands(blocks))
}
