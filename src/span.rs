//! Byte spans and the pure splice primitives.
//!
//! Every rewrite in this crate compiles down to one of the four functions in
//! this module. They never mutate their input: each call allocates a fresh
//! buffer built from `source[..start]`, the replacement, and `source[end..]`.
//!
//! A [`Span`] is only meaningful against the buffer it was computed from.
//! After any splice the offsets behind the splice point shift, so spans taken
//! from the old buffer must be recomputed from the new one.

use std::ops::Range;
use thiserror::Error;

/// Half-open byte range `[start, end)` into a source buffer.
///
/// Offsets are 0-based, the same convention tree-sitter uses for
/// `byte_range()`. Use [`Span::from_positions`] when working with 1-based
/// positions ("offset of first byte plus one").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    /// Starting byte offset (inclusive)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpliceError {
    #[error("span [{start}, {end}) out of range for buffer of length {len}")]
    OutOfRange { start: usize, end: usize, len: usize },

    #[error("inverted span: start {start} is after end {end}")]
    Inverted { start: usize, end: usize },

    #[error("position 0 is not a valid 1-based position")]
    ZeroPosition,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span, used as an insertion anchor.
    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    /// Build a span from 1-based positions, where `pos` is the position of
    /// the first byte and `end` the position of the first byte after.
    pub fn from_positions(pos: usize, end: usize) -> Result<Self, SpliceError> {
        if pos == 0 || end == 0 {
            return Err(SpliceError::ZeroPosition);
        }
        Ok(Self::new(pos - 1, end - 1))
    }

    /// The 1-based `(pos, end)` pair addressing the same bytes.
    pub fn positions(&self) -> (usize, usize) {
        (self.start + 1, self.end + 1)
    }

    /// Span of a tree-sitter node.
    pub fn of(node: tree_sitter::Node<'_>) -> Self {
        let range = node.byte_range();
        Self::new(range.start, range.end)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Check that the span lies within a buffer of `len` bytes.
    pub fn check(&self, len: usize) -> Result<(), SpliceError> {
        if self.start > self.end {
            return Err(SpliceError::Inverted {
                start: self.start,
                end: self.end,
            });
        }
        if self.end > len {
            return Err(SpliceError::OutOfRange {
                start: self.start,
                end: self.end,
                len,
            });
        }
        Ok(())
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Bytes covered by `span`.
pub fn code_of(source: &[u8], span: Span) -> Result<&[u8], SpliceError> {
    span.check(source.len())?;
    Ok(&source[span.range()])
}

/// Text covered by `span`, lossily decoded.
pub fn text_of(source: &[u8], span: Span) -> Result<String, SpliceError> {
    code_of(source, span).map(|code| String::from_utf8_lossy(code).into_owned())
}

/// `source` with `span` removed.
pub fn delete_span(source: &[u8], span: Span) -> Result<Vec<u8>, SpliceError> {
    replace_span(source, span, &[])
}

/// `source` with `span` replaced by `new_bytes`.
pub fn replace_span(source: &[u8], span: Span, new_bytes: &[u8]) -> Result<Vec<u8>, SpliceError> {
    span.check(source.len())?;
    Ok(merge(&[
        &source[..span.start],
        new_bytes,
        &source[span.end..],
    ]))
}

/// Like [`replace_span`] but surrounds `new_bytes` with `newlines` newline
/// bytes on both sides.
///
/// Statement-level insertions (an import block after the package clause)
/// need to be lexically separated from their neighbours; a later formatting
/// pass collapses the extra blank lines.
pub fn replace_span_padded(
    source: &[u8],
    span: Span,
    new_bytes: &[u8],
    newlines: usize,
) -> Result<Vec<u8>, SpliceError> {
    span.check(source.len())?;
    let padding = vec![b'\n'; newlines];
    Ok(merge(&[
        &source[..span.start],
        &padding,
        new_bytes,
        &padding,
        &source[span.end..],
    ]))
}

fn merge(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}
