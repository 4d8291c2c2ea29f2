//! Source locations.
//!
//! Node locations are byte offsets into the query text, stored as a signed
//! integer where any negative value means "unknown". Spans are used for
//! tokens and statement boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A byte offset into the source text, or unknown.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(pub i32);

impl Location {
    /// The "no location" sentinel.
    pub const UNKNOWN: Location = Location(-1);

    /// Location of a byte offset. Offsets beyond `i32::MAX` saturate.
    #[inline]
    pub fn new(offset: usize) -> Self {
        Location(i32::try_from(offset).unwrap_or(i32::MAX))
    }

    #[inline]
    pub fn is_known(self) -> bool {
        self.0 >= 0
    }

    /// The byte offset, if known.
    #[inline]
    pub fn offset(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }

    /// The left-most of two locations, treating unknown as absent.
    #[inline]
    pub fn leftmost(self, other: Location) -> Location {
        if !self.is_known() {
            other
        } else if !other.is_known() {
            self
        } else {
            Location(self.0.min(other.0))
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::UNKNOWN
    }
}

impl From<usize> for Location {
    fn from(offset: usize) -> Self {
        Location::new(offset)
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "@{}", self.0)
        } else {
            write!(f, "@?")
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A span in source text, defined by a start offset and a length.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub struct TextSpan {
    /// The byte offset where this span starts.
    pub start: usize,
    /// The length of this span in bytes.
    pub length: usize,
}

impl TextSpan {
    #[inline]
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Create a span from start and end offsets.
    #[inline]
    pub fn from_bounds(start: usize, end: usize) -> Self {
        debug_assert!(end >= start);
        Self {
            start,
            length: end - start,
        }
    }

    /// The end offset of this span (exclusive).
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end()
    }

    /// The text covered by this span, if it lies within `source`.
    pub fn slice<'t>(&self, source: &'t str) -> Option<&'t str> {
        source.get(self.as_range())
    }

    #[inline]
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.start, self.end())
    }
}

impl From<Range<usize>> for TextSpan {
    fn from(range: Range<usize>) -> Self {
        Self::from_bounds(range.start, range.end)
    }
}
