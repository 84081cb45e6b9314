//! The reconciliation pass: drain dirty ranges, keep the natural-language
//! parts, tokenize them, ask the spell oracle and commit the result.

pub mod scheduler;

use crate::checker::tokenizer::Tokenizer;
use crate::checker::{guarded, spell_or_accept, suggest_or_none, SpellProvider};
use crate::document::{Snapshot, TextBuffer};
use crate::notify::ChangeNotifier;
use crate::parser::{ClassificationProvider, SpanClass};
use crate::queue::DirtyRangeQueue;
use crate::range::{coalesce, TextRange};
use crate::store::ErrorStore;
use crate::SpellError;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EngineState {
    Idle,
    Draining,
    Classifying,
    Tokenizing,
    Checking,
    Committing,
}

impl EngineState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => EngineState::Draining,
            2 => EngineState::Classifying,
            3 => EngineState::Tokenizing,
            4 => EngineState::Checking,
            5 => EngineState::Committing,
            _ => EngineState::Idle,
        }
    }
}

/// What one call to [`ReconciliationEngine::run_pass`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Another pass was still running.
    Skipped,
    /// Nothing was queued.
    Idle,
    /// The store was torn down before the commit.
    Discarded,
    Reconciled { ranges: usize, errors: usize },
}

/// Everything a pass needs, shared with the session that owns it.
pub struct ReconciliationEngine {
    buffer: Arc<dyn TextBuffer>,
    classifier: Arc<dyn ClassificationProvider>,
    speller: Arc<dyn SpellProvider>,
    queue: Arc<DirtyRangeQueue>,
    store: Arc<ErrorStore>,
    notifier: Arc<ChangeNotifier>,
    tokenizer: Tokenizer,
    natural_language: Vec<SpanClass>,
    running: AtomicBool,
    state: AtomicU8,
}

/// Clears the running flag however the pass ends.
struct PassGuard<'a>(&'a ReconciliationEngine);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.set_state(EngineState::Idle);
        self.0.running.store(false, Ordering::Release);
    }
}

impl ReconciliationEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        buffer: Arc<dyn TextBuffer>,
        classifier: Arc<dyn ClassificationProvider>,
        speller: Arc<dyn SpellProvider>,
        queue: Arc<DirtyRangeQueue>,
        store: Arc<ErrorStore>,
        notifier: Arc<ChangeNotifier>,
        tokenizer: Tokenizer,
        natural_language: Vec<SpanClass>,
    ) -> Self {
        Self {
            buffer,
            classifier,
            speller,
            queue,
            store,
            notifier,
            tokenizer,
            natural_language,
            running: AtomicBool::new(false),
            state: AtomicU8::new(EngineState::Idle as u8),
        }
    }

    pub fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn set_state(&self, state: EngineState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Run one reconciliation pass. At most one pass runs at a time; a call
    /// made while another is in flight returns [`PassOutcome::Skipped`].
    pub fn run_pass(&self) -> PassOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!("reconciliation already running, tick skipped");
            return PassOutcome::Skipped;
        }
        let _guard = PassGuard(self);

        self.set_state(EngineState::Draining);
        let pending = self.queue.drain_all();
        if pending.is_empty() {
            return PassOutcome::Idle;
        }

        let snapshot = self.buffer.snapshot();
        let drained = pending.len();
        let translated: Vec<TextRange> = pending
            .into_iter()
            .map(|r| self.buffer.translate(r, snapshot.version()).clamp_to(snapshot.len()))
            .collect();
        let ranges = coalesce(translated);
        debug!(
            drained,
            ranges = ranges.len(),
            version = snapshot.version(),
            "reconciliation pass started"
        );

        let mut batch = Vec::with_capacity(ranges.len());
        let mut total = 0;
        for range in &ranges {
            let errors = self.check_range(&snapshot, *range);
            total += errors.len();
            batch.push((*range, errors));
        }

        self.set_state(EngineState::Committing);
        if !self.store.reconcile(batch) {
            debug!("document closed during reconciliation, results discarded");
            return PassOutcome::Discarded;
        }
        for range in &ranges {
            self.notifier.publish(self.buffer.translate(*range, self.buffer.current_version()));
        }

        debug!(ranges = ranges.len(), errors = total, "reconciliation pass committed");
        PassOutcome::Reconciled {
            ranges: ranges.len(),
            errors: total,
        }
    }

    /// Spelling errors inside `range`. A classifier fault yields no errors.
    fn check_range(&self, snapshot: &Snapshot, range: TextRange) -> Vec<SpellError> {
        self.set_state(EngineState::Classifying);
        let Some(spans) = guarded("classify", || self.classifier.classify(snapshot, range)) else {
            return Vec::new();
        };

        let mut errors = Vec::new();
        for span in spans {
            if !self.natural_language.contains(&span.class) {
                continue;
            }
            let Some(span_range) = span.range.at_version(snapshot.version()).clip(&range) else {
                continue;
            };
            let Some(text) = snapshot.slice(span_range) else {
                continue;
            };

            self.set_state(EngineState::Tokenizing);
            let tokens: Vec<_> = self.tokenizer.tokens(text).collect();

            self.set_state(EngineState::Checking);
            for token in tokens {
                if spell_or_accept(self.speller.as_ref(), token.text) {
                    continue;
                }
                let Some(suggestions) = suggest_or_none(self.speller.as_ref(), token.text) else {
                    continue;
                };
                let at = TextRange::new(span_range.start() + token.offset, token.len(), snapshot.version());
                trace!(word = token.text, start = at.start(), "misspelling found");
                errors.push(SpellError::new(at, token.text, suggestions));
            }
        }
        errors
    }
}
