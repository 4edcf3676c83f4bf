//! Inline `<script>` extraction from HTML pages
//!
//! Each block keeps the byte offset of its first character in the page so
//! spans computed inside a block can be shifted back onto the page text.

use regex::Regex;
use std::ops::Range;
use tracing::debug;

/// One inline script block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock {
    /// Byte offset of the block's first byte in the page
    pub offset: usize,
    /// Block text, same length as in the page, with comment wrappers blanked
    pub text: String,
}

const JAVASCRIPT_TYPES: &[&str] = &[
    "text/javascript",
    "application/javascript",
    "application/x-javascript",
    "text/ecmascript",
    "application/ecmascript",
    "text/jscript",
    "module",
];

/// Extract every inline JavaScript block from `html`, in page order
///
/// Blocks with a `src` attribute or a non-JavaScript `type` are skipped.
pub fn extract_scripts(html: &str) -> Vec<ScriptBlock> {
    static SCRIPT_RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let re = SCRIPT_RE
        .get_or_init(|| Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").unwrap());

    re.captures_iter(html)
        .filter_map(|caps| {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let body = caps.get(2)?;
            if !is_inline_javascript(attrs) {
                debug!(offset = body.start(), "skipping non-inline script block");
                return None;
            }
            Some(ScriptBlock {
                offset: body.start(),
                text: blank_comment_wrappers(body.as_str()),
            })
        })
        .collect()
}

fn is_inline_javascript(attrs: &str) -> bool {
    static SRC_RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    static TYPE_RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let src_re = SRC_RE.get_or_init(|| Regex::new(r"(?i)(?:^|\s)src\s*=").unwrap());
    let type_re = TYPE_RE
        .get_or_init(|| Regex::new(r#"(?i)(?:^|\s)type\s*=\s*["']?([^"'\s>]*)"#).unwrap());

    if src_re.is_match(attrs) {
        return false;
    }

    match type_re.captures(attrs).and_then(|caps| caps.get(1)) {
        None => true,
        Some(ty) => {
            let ty = ty.as_str().to_ascii_lowercase();
            ty.is_empty() || JAVASCRIPT_TYPES.contains(&ty.as_str())
        }
    }
}

/// Replace a leading `<!--` line and a trailing `-->` with spaces
fn blank_comment_wrappers(text: &str) -> String {
    let mut out = text.to_string();

    let lead = text.len() - text.trim_start().len();
    if text[lead..].starts_with("<!--") {
        let line_end = text[lead..].find('\n').map_or(text.len(), |i| lead + i);
        blank(&mut out, lead..line_end);
    }

    let trimmed_len = out.trim_end().len();
    if out[..trimmed_len].ends_with("-->") {
        blank(&mut out, trimmed_len - 3..trimmed_len);
    }

    out
}

fn blank(text: &mut String, range: Range<usize>) {
    let spaces = " ".repeat(range.len());
    text.replace_range(range, &spaces);
}
