use std::fmt;

/// A zero-copy `[head, tail)` window into a borrowed byte slice.
///
/// The tokenizer grows a span while scanning unquoted or quoted bytes and only
/// materializes it into an owned [`String`] when a field is closed. Borrowing
/// the backing slice means a span can never outlive the buffer it points into.
#[derive(Clone, Copy)]
pub struct Span<'a> {
    bytes: &'a [u8],
    head: usize,
    tail: usize,
}

impl<'a> Span<'a> {
    /// Create an empty span at `at`.
    #[inline]
    pub fn new(bytes: &'a [u8], at: usize) -> Self {
        debug_assert!(at <= bytes.len());

        Self {
            bytes,
            head: at,
            tail: at,
        }
    }

    #[inline(always)]
    pub fn head(&self) -> usize {
        self.head
    }

    #[inline(always)]
    pub fn tail(&self) -> usize {
        self.tail
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.tail - self.head
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.tail == self.head
    }

    /// Grow the span so that it ends at `to`. The head never moves.
    #[inline(always)]
    pub fn extend(&mut self, to: usize) {
        debug_assert!(to >= self.tail && to <= self.bytes.len());
        self.tail = to;
    }

    /// Collapse the span to an empty one at `at`.
    #[inline(always)]
    pub fn reset(&mut self, at: usize) {
        debug_assert!(at <= self.bytes.len());
        self.head = at;
        self.tail = at;
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.bytes[self.head..self.tail]
    }

    /// Copy the spanned bytes into an owned string, replacing invalid UTF-8
    /// sequences.
    #[inline]
    pub fn materialize(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

impl fmt::Display for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Debug for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Span({}..{}, {:?})", self.head, self.tail, self.materialize())
    }
}
