//! Parser-independent source spans
//!
//! Offsets are byte offsets into the text the driver read from disk.
//! The convention is half-open: a span covers `source[start..end]`.

use serde::{Deserialize, Serialize};

/// Contiguous region of the original source text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Byte offset of the first byte (inclusive)
    pub start: usize,
    /// Byte offset one past the last byte (exclusive)
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        SourceSpan { start, end }
    }

    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Move the span right by `offset` bytes
    pub fn shifted(self, offset: usize) -> Self {
        SourceSpan {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    /// Slice the span out of `source`
    ///
    /// Returns `None` when the span runs past the end of `source` or does not
    /// fall on character boundaries.
    pub fn slice<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.start..self.end)
    }
}

/// Byte offset to 1-based line lookup over a whole document
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { line_starts }
    }

    /// 1-based line containing `offset`
    pub fn line_of(&self, offset: usize) -> u32 {
        self.line_starts.partition_point(|&start| start <= offset) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_and_empty() {
        let span = SourceSpan::new(10, 20);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());

        let backwards = SourceSpan::new(20, 10);
        assert_eq!(backwards.len(), 0);
        assert!(backwards.is_empty());
    }

    #[test]
    fn test_slice_is_half_open() {
        let src = "function foo(){}";
        assert_eq!(SourceSpan::new(0, 8).slice(src), Some("function"));
        assert_eq!(SourceSpan::new(0, src.len()).slice(src), Some(src));
        assert_eq!(SourceSpan::new(0, src.len() + 1).slice(src), None);
    }

    #[test]
    fn test_shifted() {
        assert_eq!(SourceSpan::new(2, 5).shifted(10), SourceSpan::new(12, 15));
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("a\nbb\n\nccc");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(1), 1); // the newline itself
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(5), 3);
        assert_eq!(index.line_of(6), 4);
        assert_eq!(index.line_of(100), 4);
    }
}
