//! Per-document wiring of queue, store, notifier and reconciler.

use crate::checker::tokenizer::Tokenizer;
use crate::checker::SpellProvider;
use crate::document::{Document, EditEvent, TextBuffer};
use crate::engine::{scheduler, PassOutcome, ReconciliationEngine};
use crate::error::EditError;
use crate::notify::{ChangeNotifier, SubscriptionId};
use crate::parser::{ClassificationProvider, FileType, SpanClass};
use crate::queue::DirtyRangeQueue;
use crate::range::{TextRange, Version};
use crate::store::ErrorStore;
use crate::{Config, SpellError};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One open document and its spelling state.
///
/// Nothing is shared between sessions except the providers they were given.
pub struct Session {
    document: Arc<Document>,
    queue: Arc<DirtyRangeQueue>,
    store: Arc<ErrorStore>,
    notifier: Arc<ChangeNotifier>,
    engine: Arc<ReconciliationEngine>,
    cancel: CancellationToken,
    tick_interval: Duration,
    recheck_on_classification_change: bool,
}

impl Session {
    /// Wire a session around `document` and mark all of it dirty.
    pub fn open(
        document: Arc<Document>,
        speller: Arc<dyn SpellProvider>,
        classifier: Arc<dyn ClassificationProvider>,
        natural_language: Vec<SpanClass>,
        config: &Config,
    ) -> Self {
        let buffer: Arc<dyn TextBuffer> = document.clone();
        let queue = Arc::new(DirtyRangeQueue::new());
        let store = Arc::new(ErrorStore::new(buffer.clone()));
        let notifier = Arc::new(ChangeNotifier::new());
        let engine = Arc::new(ReconciliationEngine::new(
            buffer,
            classifier,
            speller,
            queue.clone(),
            store.clone(),
            notifier.clone(),
            Tokenizer::new(&config.word_breakers),
            natural_language,
        ));

        queue.extend(document.line_extents());

        Self {
            document,
            queue,
            store,
            notifier,
            engine,
            cancel: CancellationToken::new(),
            tick_interval: config.tick_interval(),
            recheck_on_classification_change: config.recheck_on_classification_change,
        }
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn engine(&self) -> &Arc<ReconciliationEngine> {
        &self.engine
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Apply an edit to the document and dirty the lines it touched.
    pub fn edit(&self, start: usize, old_len: usize, new_text: &str) -> Result<Version, EditError> {
        if self.is_closed() {
            return Err(EditError::Closed);
        }
        let event = self.document.edit(start, old_len, new_text)?;
        self.handle_edit(&event);
        Ok(event.version)
    }

    /// Feed an edit the host already applied to the document.
    pub fn handle_edit(&self, event: &EditEvent) {
        for change in &event.changes {
            let lines = self.document.line_extent(*change);
            self.queue.enqueue(lines);
            self.notifier.publish(lines);
        }
    }

    /// The classification of `range` changed without an edit, e.g. a block
    /// comment was opened further up.
    pub fn classification_changed(&self, range: TextRange) {
        let range = self.document.translate(range, self.document.current_version());
        if self.recheck_on_classification_change {
            self.queue.enqueue(range);
        }
        self.notifier.publish(range);
    }

    /// Errors visible in any of `ranges`.
    pub fn errors(&self, ranges: &[TextRange]) -> Vec<SpellError> {
        self.store.query(ranges)
    }

    pub fn all_errors(&self) -> Vec<SpellError> {
        self.store.query(&[self.document.full_range()])
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(TextRange) + Send + Sync + 'static,
    {
        self.notifier.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Run one reconciliation pass on the calling thread.
    pub fn reconcile_now(&self) -> PassOutcome {
        self.engine.run_pass()
    }

    /// Start the periodic reconciler on the ambient tokio runtime.
    pub fn start(&self) -> JoinHandle<()> {
        scheduler::spawn(self.engine.clone(), self.tick_interval, self.cancel.clone())
    }

    /// Replace the word of `error` with `replacement`.
    pub fn apply_suggestion(&self, error: &SpellError, replacement: &str) -> Result<Version, EditError> {
        let current = self.document.current_version();
        let range = self.document.translate(error.range, current);
        if range.is_empty() {
            return Err(EditError::StaleRange);
        }
        self.edit(range.start(), range.len(), replacement)
    }

    pub fn close(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        debug!("closing spelling session");
        self.cancel.cancel();
        self.store.close();
        self.queue.drain_all();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

/// Open documents keyed by an id chosen by the host, sharing one speller.
pub struct Workspace {
    sessions: DashMap<String, Arc<Session>>,
    speller: Arc<dyn SpellProvider>,
    config: Config,
}

impl Workspace {
    pub fn new(speller: Arc<dyn SpellProvider>, config: Config) -> Self {
        Self {
            sessions: DashMap::new(),
            speller,
            config,
        }
    }

    /// Open `text` as document `id`, replacing any session already open
    /// under that id.
    pub fn open(&self, id: impl Into<String>, text: impl Into<String>, file_type: FileType) -> Arc<Session> {
        let document = Arc::new(Document::with_history_limit(text, self.config.history_limit));
        let session = Arc::new(Session::open(
            document,
            self.speller.clone(),
            file_type.classifier(),
            file_type.natural_language(&self.config.natural_language),
            &self.config,
        ));
        if let Some(previous) = self.sessions.insert(id.into(), session.clone()) {
            previous.close();
        }
        session
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|s| s.value().clone())
    }

    pub fn close(&self, id: &str) -> bool {
        match self.sessions.remove(id) {
            Some((_, session)) => {
                session.close();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
