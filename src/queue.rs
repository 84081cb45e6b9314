use crate::range::TextRange;
use parking_lot::Mutex;
use tracing::trace;

/// Ranges invalidated by edits and not yet reconciled.
///
/// Producers only append; the reconciler takes everything at once. Overlapping
/// and duplicate entries are kept as they are, the engine coalesces them.
#[derive(Debug, Default)]
pub struct DirtyRangeQueue {
    pending: Mutex<Vec<TextRange>>,
}

impl DirtyRangeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, range: TextRange) {
        if range.is_empty() {
            return;
        }
        trace!(start = range.start(), len = range.len(), version = range.version(), "range dirtied");
        self.pending.lock().push(range);
    }

    pub fn extend(&self, ranges: impl IntoIterator<Item = TextRange>) {
        let mut pending = self.pending.lock();
        pending.extend(ranges.into_iter().filter(|r| !r.is_empty()));
    }

    /// Remove and return everything queued so far, in insertion order.
    pub fn drain_all(&self) -> Vec<TextRange> {
        std::mem::take(&mut *self.pending.lock())
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
