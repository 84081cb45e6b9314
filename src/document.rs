//! Host buffer capability and the in-crate document implementation.

use crate::error::EditError;
use crate::range::{TextEdit, TextRange, Version};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

pub const DEFAULT_HISTORY_LIMIT: usize = 4096;

/// What the engine needs from the buffer it watches.
pub trait TextBuffer: Send + Sync {
    fn current_version(&self) -> Version;

    /// Immutable view of the whole text at the current version.
    fn snapshot(&self) -> Snapshot;

    /// Text under `range`, translated to the current version first.
    fn current_text(&self, range: TextRange) -> Option<String>;

    /// Move `range` forward to version `to`. Ranges from versions older than
    /// the retained history come back empty.
    fn translate(&self, range: TextRange, to: Version) -> TextRange;
}

/// Immutable text of a document at one version.
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: Version,
    text: Arc<str>,
}

impl Snapshot {
    pub fn new(version: Version, text: impl Into<Arc<str>>) -> Self {
        Self {
            version,
            text: text.into(),
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn shared_text(&self) -> &Arc<str> {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn full_range(&self) -> TextRange {
        TextRange::new(0, self.text.len(), self.version)
    }

    /// Text under `range`, or `None` if it is out of bounds or splits a
    /// character.
    pub fn slice(&self, range: TextRange) -> Option<&str> {
        self.text.get(range.as_span())
    }
}

/// Changes produced by one document edit, in the coordinates of `version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditEvent {
    pub version: Version,
    pub changes: Vec<TextRange>,
}

#[derive(Debug)]
struct DocumentState {
    text: String,
    version: Version,
    /// `history[i]` turned version `base + i` into `base + i + 1`.
    history: VecDeque<TextEdit>,
    base: Version,
}

/// A UTF-8 text buffer with a version counter and a bounded edit history.
#[derive(Debug)]
pub struct Document {
    state: RwLock<DocumentState>,
    history_limit: usize,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_history_limit(text, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(text: impl Into<String>, history_limit: usize) -> Self {
        Self {
            state: RwLock::new(DocumentState {
                text: text.into(),
                version: 0,
                history: VecDeque::new(),
                base: 0,
            }),
            history_limit: history_limit.max(1),
        }
    }

    pub fn text(&self) -> String {
        self.state.read().text.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn full_range(&self) -> TextRange {
        let state = self.state.read();
        TextRange::new(0, state.text.len(), state.version)
    }

    /// Replace `old_len` bytes at `start` with `new_text` and bump the version.
    pub fn edit(&self, start: usize, old_len: usize, new_text: &str) -> Result<EditEvent, EditError> {
        let mut state = self.state.write();
        let len = state.text.len();
        let end = start.saturating_add(old_len);
        if end > len {
            return Err(EditError::OutOfBounds { start, end, len });
        }
        for offset in [start, end] {
            if !state.text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary(offset));
            }
        }

        state.text.replace_range(start..end, new_text);
        state.version += 1;
        state.history.push_back(TextEdit::new(start, old_len, new_text.len()));
        while state.history.len() > self.history_limit {
            state.history.pop_front();
            state.base += 1;
        }

        Ok(EditEvent {
            version: state.version,
            changes: vec![TextRange::new(start, new_text.len(), state.version)],
        })
    }

    /// Expand `range` to whole lines, line breaks excluded. A range that
    /// reaches past the end of its first line (line break included) extends to
    /// the end of the line containing its end.
    pub fn line_extent(&self, range: TextRange) -> TextRange {
        let state = self.state.read();
        let range = translate_locked(&state, range, state.version).clamp_to(state.text.len());
        let text = state.text.as_str();

        let first = line_bounds(text, range.start());
        let end = if first.with_break < range.end() {
            line_bounds(text, range.end()).end
        } else {
            first.end
        };
        TextRange::from_bounds(first.start, end, state.version)
    }

    /// Every line of the current text, line breaks excluded.
    pub fn line_extents(&self) -> Vec<TextRange> {
        let state = self.state.read();
        let text = state.text.as_str();
        let mut lines = Vec::new();
        let mut start = 0;
        while start < text.len() {
            let bounds = line_bounds(text, start);
            lines.push(TextRange::from_bounds(bounds.start, bounds.end, state.version));
            start = bounds.with_break;
        }
        lines
    }

    /// 1-indexed line and column (in characters) of a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let state = self.state.read();
        let text = state.text.as_str();
        let offset = floor_char_boundary(text, offset.min(text.len()));
        let before = &text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = text[line_start..offset].chars().count() + 1;
        (line, column)
    }
}

impl TextBuffer for Document {
    fn current_version(&self) -> Version {
        self.state.read().version
    }

    fn snapshot(&self) -> Snapshot {
        let state = self.state.read();
        Snapshot::new(state.version, state.text.as_str())
    }

    fn current_text(&self, range: TextRange) -> Option<String> {
        let state = self.state.read();
        let range = translate_locked(&state, range, state.version);
        state.text.get(range.as_span()).map(str::to_string)
    }

    fn translate(&self, range: TextRange, to: Version) -> TextRange {
        translate_locked(&self.state.read(), range, to)
    }
}

fn translate_locked(state: &DocumentState, range: TextRange, to: Version) -> TextRange {
    let to = to.min(state.version);
    if range.version() >= to {
        return range;
    }
    if range.version() < state.base {
        return TextRange::new(0, 0, to);
    }
    let from = (range.version() - state.base) as usize;
    let until = (to - state.base) as usize;
    let edits: Vec<TextEdit> = state.history.range(from..until).copied().collect();
    range.translate(&edits, to)
}

struct LineBounds {
    start: usize,
    end: usize,
    with_break: usize,
}

fn line_bounds(text: &str, offset: usize) -> LineBounds {
    let offset = floor_char_boundary(text, offset);
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let (mut end, with_break) = match text[offset..].find('\n') {
        Some(i) => (offset + i, offset + i + 1),
        None => (text.len(), text.len()),
    };
    if end > start && text.as_bytes()[end - 1] == b'\r' {
        end -= 1;
    }
    LineBounds {
        start,
        end: end.max(start),
        with_break,
    }
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
