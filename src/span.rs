//! Byte-offset span types for locating errors inside a config line.

#[cfg(test)]
#[path = "./span_tests.rs"]
mod tests;

/// A byte-offset range within a single config line.
///
/// Convertible to and from [`Range<u32>`](std::ops::Range) and
/// [`Range<usize>`](std::ops::Range).
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: u32,
    /// End byte offset (exclusive).
    pub end: u32,
}

impl Span {
    /// Creates a new [`Span`] from start and end byte offsets.
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Returns `true` if both start and end are zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    /// Span of `part` relative to the start of `whole`.
    ///
    /// `part` must be a subslice of `whole`; anything else yields an empty span.
    pub fn of(part: &str, whole: &str) -> Self {
        let base = whole.as_ptr() as usize;
        let at = part.as_ptr() as usize;
        if at < base || at + part.len() > base + whole.len() {
            return Self::default();
        }
        let start = (at - base) as u32;
        Self::new(start, start + part.len() as u32)
    }

    /// Returns the text this span covers in `line`, if it is in bounds.
    pub fn slice<'l>(&self, line: &'l str) -> Option<&'l str> {
        line.get(self.start as usize..self.end as usize)
    }
}

impl From<Span> for (u32, u32) {
    fn from(s: Span) -> (u32, u32) {
        (s.start, s.end)
    }
}

impl From<Span> for (usize, usize) {
    fn from(s: Span) -> (usize, usize) {
        (s.start as usize, s.end as usize)
    }
}

impl From<std::ops::Range<u32>> for Span {
    fn from(s: std::ops::Range<u32>) -> Self {
        Self::new(s.start, s.end)
    }
}

impl From<Span> for std::ops::Range<u32> {
    fn from(s: Span) -> Self {
        s.start..s.end
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(s: Span) -> Self {
        s.start as usize..s.end as usize
    }
}
