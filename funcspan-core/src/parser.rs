//! TypeScript and JavaScript parser using SWC
//!
//! Global invariants enforced:
//! - Deterministic parsing order
//! - Formatting, comments, and whitespace must not affect results

use crate::error::{Error, Result};
use crate::language::SourceKind;
use swc_common::{sync::Lrc, FileName, SourceFile, SourceMap};
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax};
use tracing::warn;

/// Parsed program plus the source file its spans are relative to
pub struct ParsedSource {
    pub program: Program,
    pub file: Lrc<SourceFile>,
}

/// Determine the syntax configuration for a source kind
fn syntax_for_kind(kind: SourceKind, filename: &str) -> Syntax {
    match kind {
        SourceKind::TypeScriptReact => Syntax::Typescript(swc_ecma_parser::TsSyntax {
            tsx: true,
            decorators: true,
            dts: false,
            ..Default::default()
        }),
        SourceKind::TypeScript => Syntax::Typescript(swc_ecma_parser::TsSyntax {
            tsx: false,
            decorators: true,
            dts: filename.ends_with(".d.ts"),
            ..Default::default()
        }),
        SourceKind::JavaScriptReact => Syntax::Es(swc_ecma_parser::EsSyntax {
            jsx: true,
            decorators: false,
            ..Default::default()
        }),
        // Inline HTML scripts are plain JavaScript
        SourceKind::JavaScript | SourceKind::Html => Syntax::Es(swc_ecma_parser::EsSyntax {
            jsx: false,
            decorators: false,
            ..Default::default()
        }),
    }
}

/// Parse script source into an SWC program
///
/// Scripts and modules are both accepted; the parser decides from the
/// presence of `import`/`export`. Recoverable diagnostics are logged and
/// parsing continues; the first fatal error becomes `Error::Parse`.
pub fn parse_source(
    src: &str,
    source_map: &Lrc<SourceMap>,
    filename: &str,
    kind: SourceKind,
) -> Result<ParsedSource> {
    let syntax = syntax_for_kind(kind, filename);

    let source_file: Lrc<SourceFile> = source_map.new_source_file(
        FileName::Custom(filename.into()).into(),
        src.to_string(),
    );

    let input = StringInput::from(&*source_file);
    let lexer = Lexer::new(syntax, EsVersion::Es2022, input, None);
    let mut parser = Parser::new_from(lexer);

    let program = parser.parse_program().map_err(|e| Error::Parse {
        path: filename.into(),
        message: e.kind().msg().to_string(),
    })?;

    for diagnostic in parser.take_errors() {
        warn!(file = filename, "recovered from parse error: {}", diagnostic.kind().msg());
    }

    Ok(ParsedSource {
        program,
        file: source_file,
    })
}

#[cfg(test)]
#[path = "parser/tests.rs"]
mod tests;
