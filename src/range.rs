//! Version-stamped text ranges and their translation across edits.
//!
//! Offsets are UTF-8 byte offsets into the document text. A range is only
//! meaningful together with the document version it was taken at; moving it
//! to a newer version goes through [`TextRange::translate`], which replays the
//! edits in between with an edge-exclusive policy: text inserted exactly at
//! either boundary stays outside the range.

use serde::Serialize;

/// Monotonically increasing document version.
pub type Version = u64;

/// Half-open byte range `start..start + len` at a given document version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextRange {
    start: usize,
    len: usize,
    version: Version,
}

/// One replacement applied to a document: `old_len` bytes at `start` were
/// replaced by `new_len` bytes. Offsets are in the coordinates of the version
/// the edit was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub old_len: usize,
    pub new_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bias {
    Left,
    Right,
}

impl TextEdit {
    pub fn new(start: usize, old_len: usize, new_len: usize) -> Self {
        Self {
            start,
            old_len,
            new_len,
        }
    }

    fn old_end(&self) -> usize {
        self.start + self.old_len
    }

    /// Map an offset through this edit. Offsets inside the replaced region
    /// snap to one side of the replacement depending on `bias`.
    fn map_offset(&self, offset: usize, bias: Bias) -> usize {
        if offset < self.start {
            offset
        } else if offset > self.old_end() {
            offset - self.old_len + self.new_len
        } else {
            match bias {
                Bias::Left => self.start,
                Bias::Right => self.start + self.new_len,
            }
        }
    }
}

impl TextRange {
    pub fn new(start: usize, len: usize, version: Version) -> Self {
        Self {
            start,
            len,
            version,
        }
    }

    /// Build a range from `start..end`. An inverted pair collapses to an
    /// empty range at `start`.
    pub fn from_bounds(start: usize, end: usize, version: Version) -> Self {
        Self::new(start, end.saturating_sub(start), version)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_span(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }

    /// True if the two ranges share at least one byte.
    pub fn overlaps(&self, other: &TextRange) -> bool {
        self.start.max(other.start) < self.end().min(other.end())
    }

    /// True if the two ranges overlap or touch. An empty range intersects a
    /// range that contains or borders its position.
    pub fn intersects(&self, other: &TextRange) -> bool {
        self.start <= other.end() && other.start <= self.end()
    }

    pub fn contains(&self, other: &TextRange) -> bool {
        self.start <= other.start && other.end() <= self.end()
    }

    /// The part of `self` inside `bounds`, if the two overlap.
    pub fn clip(&self, bounds: &TextRange) -> Option<TextRange> {
        let start = self.start.max(bounds.start);
        let end = self.end().min(bounds.end());
        (start < end).then(|| TextRange::from_bounds(start, end, self.version))
    }

    /// Clamp the range so it does not extend past `doc_len`.
    pub fn clamp_to(&self, doc_len: usize) -> TextRange {
        let start = self.start.min(doc_len);
        let end = self.end().min(doc_len);
        TextRange::from_bounds(start, end, self.version)
    }

    /// Replay `edits` (oldest first) over this range and stamp the result
    /// with `to`. The start tracks rightwards and the end leftwards, so an
    /// insertion at either boundary never widens the range, and a range whose
    /// text was replaced entirely collapses to empty.
    pub fn translate(&self, edits: &[TextEdit], to: Version) -> TextRange {
        let mut start = self.start;
        let mut end = self.end();
        for edit in edits {
            start = edit.map_offset(start, Bias::Right);
            end = edit.map_offset(end, Bias::Left);
            if end < start {
                end = start;
            }
        }
        TextRange::from_bounds(start, end, to)
    }

    /// Same range stamped with a different version, used when the caller knows
    /// no edits happened in between.
    pub fn at_version(&self, version: Version) -> TextRange {
        TextRange { version, ..*self }
    }
}

/// Sort ranges and merge the ones that overlap or touch. All inputs are
/// expected to be at the same version; empty ranges are dropped.
pub fn coalesce(mut ranges: Vec<TextRange>) -> Vec<TextRange> {
    ranges.retain(|r| !r.is_empty());
    ranges.sort_by_key(|r| (r.start, r.end()));

    let mut merged: Vec<TextRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end() => {
                let end = last.end().max(range.end());
                *last = TextRange::from_bounds(last.start, end, last.version);
            }
            _ => merged.push(range),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: usize, end: usize) -> TextRange {
        TextRange::from_bounds(start, end, 0)
    }

    #[test]
    fn test_overlap_and_intersection() {
        assert!(r(0, 5).overlaps(&r(4, 8)));
        assert!(!r(0, 5).overlaps(&r(5, 8)));
        assert!(r(0, 5).intersects(&r(5, 8)));
        assert!(!r(0, 5).intersects(&r(6, 8)));
        assert!(r(3, 3).intersects(&r(0, 5)));
        assert!(!r(3, 3).overlaps(&r(0, 5)));
    }

    #[test]
    fn test_insertion_at_boundaries_is_excluded() {
        let word = r(3, 10);
        // insert 2 bytes right before the word
        let before = word.translate(&[TextEdit::new(3, 0, 2)], 1);
        assert_eq!((before.start(), before.end()), (5, 12));
        // insert 2 bytes right after the word
        let after = word.translate(&[TextEdit::new(10, 0, 2)], 1);
        assert_eq!((after.start(), after.end()), (3, 10));
        assert_eq!(after.version(), 1);
    }

    #[test]
    fn test_edits_before_and_inside() {
        let word = r(10, 15);
        let shifted = word.translate(&[TextEdit::new(0, 4, 1)], 1);
        assert_eq!((shifted.start(), shifted.end()), (7, 12));

        let grown = word.translate(&[TextEdit::new(12, 0, 3)], 1);
        assert_eq!((grown.start(), grown.end()), (10, 18));

        let shrunk = word.translate(&[TextEdit::new(11, 2, 0)], 1);
        assert_eq!((shrunk.start(), shrunk.end()), (10, 13));
    }

    #[test]
    fn test_replaced_word_collapses() {
        let word = r(3, 10);
        let deleted = word.translate(&[TextEdit::new(3, 7, 0)], 1);
        assert!(deleted.is_empty());

        let replaced = word.translate(&[TextEdit::new(3, 7, 8)], 1);
        assert!(replaced.is_empty());

        let swallowed = word.translate(&[TextEdit::new(0, 20, 1)], 1);
        assert!(swallowed.is_empty());
    }

    #[test]
    fn test_translate_through_several_edits() {
        let word = r(4, 8);
        let edits = [TextEdit::new(0, 0, 2), TextEdit::new(20, 3, 0)];
        let moved = word.translate(&edits, 2);
        assert_eq!((moved.start(), moved.end(), moved.version()), (6, 10, 2));
    }

    #[test]
    fn test_clip_and_clamp() {
        assert_eq!(r(0, 10).clip(&r(4, 20)), Some(r(4, 10)));
        assert_eq!(r(0, 4).clip(&r(4, 20)), None);
        assert_eq!(r(5, 30).clamp_to(12), r(5, 12));
        assert!(r(15, 30).clamp_to(12).is_empty());
    }

    #[test]
    fn test_coalesce() {
        let merged = coalesce(vec![r(10, 12), r(0, 3), r(2, 5), r(5, 7), r(8, 8)]);
        assert_eq!(merged, vec![r(0, 7), r(10, 12)]);
        assert!(coalesce(Vec::new()).is_empty());
    }
}
