//! Source location tracking.
//!
//! Provides [`Span`], the back-reference every bound node and operation
//! keeps to the syntax it came from. Spans are plain values; the syntax tree
//! itself is never owned by this crate.

use std::fmt;

/// A span of source code, represented by its starting position and length.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub const fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub const fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// Spans on different lines keep the earlier start and sum the lengths,
    /// which is enough for display purposes.
    pub fn cover(self, other: Span) -> Span {
        let (first, second) = if (other.line, other.col) < (self.line, self.col) {
            (other, self)
        } else {
            (self, other)
        };

        if first.line == second.line {
            let end = (first.col + first.len).max(second.col + second.len);
            Span::new(first.line, first.col, end - first.col)
        } else {
            Span::new(first.line, first.col, first.len + second.len)
        }
    }

    /// Whether `other` starts inside this span on the same line.
    pub fn contains(&self, other: Span) -> bool {
        self.line == other.line && other.col >= self.col && other.col + other.len <= self.col + self.len
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.line, self.col, self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
