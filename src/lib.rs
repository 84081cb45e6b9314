pub mod checker;
pub mod cli;
pub mod config;
pub mod dict;
pub mod document;
pub mod engine;
pub mod error;
pub mod notify;
pub mod parser;
pub mod queue;
pub mod range;
pub mod session;
pub mod store;

pub use checker::{DictionarySpellProvider, FallbackSpellProvider, SpellProvider};
pub use config::Config;
pub use document::{Document, EditEvent, Snapshot, TextBuffer};
pub use engine::{EngineState, PassOutcome, ReconciliationEngine};
pub use error::{EditError, ProviderError};
pub use notify::{ChangeNotifier, SubscriptionId};
pub use parser::{ClassificationProvider, ClassificationSpan, FileType, SpanClass};
pub use queue::DirtyRangeQueue;
pub use range::{TextRange, Version};
pub use session::{Session, Workspace};
pub use store::ErrorStore;

/// A misspelled word and its replacement candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellError {
    /// Where the word is, rebased onto the latest version the store has seen.
    pub range: TextRange,
    pub word: String,
    pub suggestions: Vec<String>,
    /// Document version the word was checked at.
    pub version: Version,
}

impl SpellError {
    pub fn new(range: TextRange, word: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            range,
            word: word.into(),
            suggestions,
            version: range.version(),
        }
    }
}
