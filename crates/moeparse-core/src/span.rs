//! Source location tracking for tokens.
//!
//! Every token records the byte range of the input it was produced from,
//! including tokens produced while re-tokenizing a tag body. Concatenating
//! the spans of a top-level token sequence reproduces the input exactly.

/// A byte range in the source text.
///
/// Spans use byte offsets (not character offsets) and are
/// inclusive-exclusive: `[start, end)`.
///
/// # Example
///
/// ```rust
/// use moeparse_core::span::Span;
///
/// let span = Span::new(3, 10);
/// assert_eq!(span.len(), 7);
/// assert_eq!(span.slice("[b]hello[/b]"), "hello[/");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// Starting byte offset (inclusive).
    pub start: u32,
    /// Ending byte offset (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span from byte offsets.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub(crate) fn from_range(base: usize, start: usize, end: usize) -> Self {
        Self::new((base + start) as u32, (base + end) as u32)
    }

    /// Get the length of this span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if this span contains a byte offset.
    #[inline]
    pub const fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Merge two spans into one covering both.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Borrow the text this span covers.
    ///
    /// Returns an empty string if the span does not fall on valid
    /// boundaries of `input`.
    #[inline]
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        input
            .get(self.start as usize..self.end as usize)
            .unwrap_or("")
    }
}
