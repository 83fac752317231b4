//! Span - half-open byte range into the source text
//!
//! Tokens, elements and tree nodes all reference the source through spans,
//! so element images are sliced lazily instead of copied.

/// A half-open `[start, end)` byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first byte
    pub start: usize,
    /// Byte offset one past the last byte
    pub end: usize,
}

impl Span {
    /// Create a new span
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    #[inline]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if this span is empty
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`
    #[inline]
    pub fn union(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Forward containment: `[start, end)`.
    ///
    /// A caret sitting right before a boundary belongs to the element that
    /// starts there.
    #[inline]
    pub const fn contains_forward(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Backward containment: `(start, end]`.
    ///
    /// A caret sitting right after a boundary belongs to the element that
    /// ends there.
    #[inline]
    pub const fn contains_backward(&self, offset: usize) -> bool {
        self.start < offset && offset <= self.end
    }

    /// Containment using the rule for the given search direction
    #[inline]
    pub const fn contains(&self, offset: usize, forward: bool) -> bool {
        if forward {
            self.contains_forward(offset)
        } else {
            self.contains_backward(offset)
        }
    }

    /// Extract the covered text from the source.
    ///
    /// Returns an empty string when the span does not fit the source or does
    /// not fall on character boundaries.
    #[inline]
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}
