use std::ops::Range;

/// A byte range in the source code
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Some value together with the place in the source it came from
pub type Spanned<T> = (T, Span);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span covering exactly one character starting at `start`
    pub fn single(start: usize) -> Self {
        Self::new(start, start + 1)
    }

    /// Empty span, e.g. for the end of input
    pub fn marker(at: usize) -> Self {
        Self::new(at, at)
    }

    /// Smallest span containing both spans
    pub fn union(self, other: Span) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl chumsky::Span for Span {
    type Context = ();
    type Offset = usize;

    fn new(_context: Self::Context, range: Range<Self::Offset>) -> Self {
        Span::new(range.start, range.end)
    }

    fn context(&self) -> Self::Context {}

    fn start(&self) -> Self::Offset {
        self.start
    }

    fn end(&self) -> Self::Offset {
        self.end
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.end.saturating_sub(span.start)).into()
    }
}
