use crate::document::TextBuffer;
use crate::range::{TextRange, Version};
use crate::SpellError;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug)]
struct StoreState {
    errors: Vec<SpellError>,
    open: bool,
}

/// Current spelling errors of one document.
///
/// Every operation runs inside one critical section, so readers observe either
/// the state before a commit or the state after it. Stored ranges are rebased
/// onto the buffer's current version whenever the lock is taken; errors whose
/// word was edited away collapse to empty ranges and are dropped.
pub struct ErrorStore {
    state: Mutex<StoreState>,
    buffer: Arc<dyn TextBuffer>,
}

impl ErrorStore {
    pub fn new(buffer: Arc<dyn TextBuffer>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                errors: Vec::new(),
                open: true,
            }),
            buffer,
        }
    }

    /// Errors whose range intersects any of `ranges`, rebased onto the current
    /// version and ordered by position.
    pub fn query(&self, ranges: &[TextRange]) -> Vec<SpellError> {
        if ranges.is_empty() {
            return Vec::new();
        }

        let mut state = self.state.lock();
        if state.errors.is_empty() {
            return Vec::new();
        }

        let current = self.buffer.current_version();
        self.rebase(&mut state.errors, current);
        let wanted: Vec<TextRange> = ranges
            .iter()
            .map(|r| self.buffer.translate(*r, current))
            .collect();

        state
            .errors
            .iter()
            .filter(|e| !e.range.is_empty())
            .filter(|e| wanted.iter().any(|w| w.intersects(&e.range)))
            .cloned()
            .collect()
    }

    /// Replace the errors overlapping `range` with `new_errors`.
    ///
    /// Returns `false` without touching anything once the store is closed.
    pub fn reconcile_range(&self, range: TextRange, new_errors: Vec<SpellError>) -> bool {
        self.reconcile(vec![(range, new_errors)])
    }

    /// Apply several range replacements as one atomic update.
    ///
    /// Stored errors that overlap any of the ranges, and errors whose range has
    /// become empty, are removed before the new errors are inserted.
    pub fn reconcile(&self, batch: Vec<(TextRange, Vec<SpellError>)>) -> bool {
        let mut state = self.state.lock();
        if !state.open {
            debug!("commit to a closed error store ignored");
            return false;
        }

        let current = self.buffer.current_version();
        self.rebase(&mut state.errors, current);

        let mut ranges = Vec::with_capacity(batch.len());
        let mut incoming = Vec::new();
        for (range, errors) in batch {
            ranges.push(self.buffer.translate(range, current));
            incoming.extend(errors);
        }
        self.rebase(&mut incoming, current);

        let before = state.errors.len();
        state
            .errors
            .retain(|e| !e.range.is_empty() && !ranges.iter().any(|r| r.overlaps(&e.range)));
        let removed = before - state.errors.len();

        for error in incoming {
            if error.range.is_empty() || state.errors.iter().any(|e| e.range.overlaps(&error.range)) {
                continue;
            }
            state.errors.push(error);
        }
        state.errors.sort_by_key(|e| e.range.start());

        trace!(removed, stored = state.errors.len(), version = current, "error store reconciled");
        true
    }

    /// Drop every error and refuse further commits.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.open = false;
        state.errors.clear();
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    pub fn len(&self) -> usize {
        self.state.lock().errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().errors.is_empty()
    }

    fn rebase(&self, errors: &mut Vec<SpellError>, current: Version) {
        for error in errors.iter_mut() {
            if error.range.version() != current {
                error.range = self.buffer.translate(error.range, current);
            }
        }
        errors.retain(|e| !e.range.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use std::thread;

    fn error(start: usize, word: &str, version: u64) -> SpellError {
        SpellError::new(TextRange::new(start, word.len(), version), word, vec![])
    }

    fn store_for(text: &str) -> (Arc<Document>, ErrorStore) {
        let doc = Arc::new(Document::new(text));
        let store = ErrorStore::new(doc.clone());
        (doc, store)
    }

    #[test]
    fn test_query_empty_inputs() {
        let (doc, store) = store_for("teh cat");
        assert!(store.query(&[doc.full_range()]).is_empty());
        store.reconcile_range(doc.full_range(), vec![error(0, "teh", 0)]);
        assert!(store.query(&[]).is_empty());
        assert_eq!(store.query(&[doc.full_range()]).len(), 1);
    }

    #[test]
    fn test_reconcile_replaces_overlapping_errors() {
        let (doc, store) = store_for("teh cat sat on teh mat");
        store.reconcile_range(doc.full_range(), vec![error(0, "teh", 0), error(15, "teh", 0)]);

        // re-check only the first word: the second error must survive
        store.reconcile_range(TextRange::new(0, 3, 0), vec![]);
        let remaining = store.query(&[doc.full_range()]);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].range.start(), 15);
    }

    #[test]
    fn test_query_rebases_after_edits() {
        let (doc, store) = store_for("teh cat");
        store.reconcile_range(doc.full_range(), vec![error(0, "teh", 0)]);
        doc.edit(0, 0, "so ").unwrap();

        let found = store.query(&[doc.full_range()]);
        assert_eq!(found[0].range, TextRange::new(3, 3, 1));
        assert_eq!(found[0].version, 0);
        assert!(store.query(&[TextRange::new(0, 2, 1)]).is_empty());
    }

    #[test]
    fn test_deleted_word_is_dropped() {
        let (doc, store) = store_for("teh cat");
        store.reconcile_range(doc.full_range(), vec![error(0, "teh", 0)]);
        doc.edit(0, 4, "").unwrap();
        assert!(store.query(&[doc.full_range()]).is_empty());

        store.reconcile_range(TextRange::new(0, 0, 1), vec![]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_closed_store_ignores_commits() {
        let (doc, store) = store_for("teh");
        store.close();
        assert!(!store.reconcile_range(doc.full_range(), vec![error(0, "teh", 0)]));
        assert!(store.query(&[doc.full_range()]).is_empty());
    }

    #[test]
    fn test_stored_errors_never_overlap() {
        let (doc, store) = store_for("aaaa bbbb cccc dddd");
        store.reconcile_range(TextRange::new(0, 9, 0), vec![error(0, "aaaa", 0), error(5, "bbbb", 0)]);
        store.reconcile_range(
            TextRange::new(5, 9, 0),
            vec![error(5, "bbbb", 0), error(10, "cccc", 0)],
        );
        let errors = store.query(&[doc.full_range()]);
        assert_eq!(errors.len(), 3);
        for pair in errors.windows(2) {
            assert!(!pair[0].range.overlaps(&pair[1].range));
        }
    }

    #[test]
    fn test_readers_see_whole_commits() {
        let (doc, store) = store_for("aaaa bbbb cccc dddd");
        let store = Arc::new(store);
        let full = doc.full_range();
        let old = vec![error(0, "aaaa", 0), error(5, "bbbb", 0)];
        let new = vec![error(10, "cccc", 0), error(15, "dddd", 0)];
        store.reconcile_range(full, old.clone());

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..500 {
                    let next = if i % 2 == 0 { new.clone() } else { old.clone() };
                    store.reconcile_range(full, next);
                }
            })
        };

        for _ in 0..500 {
            let seen: Vec<usize> = store.query(&[full]).iter().map(|e| e.range.start()).collect();
            assert!(seen == vec![0, 5] || seen == vec![10, 15], "torn read: {seen:?}");
        }
        writer.join().unwrap();
    }
}
