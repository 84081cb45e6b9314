use thiserror::Error;

/// Failure to apply an edit to a [`Document`](crate::document::Document).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("edit {start}..{end} is outside the document (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("offset {0} does not fall on a character boundary")]
    NotCharBoundary(usize),

    #[error("range no longer exists in the current document")]
    StaleRange,

    #[error("document is closed")]
    Closed,
}

/// Fault reported by a spelling or classification oracle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for ProviderError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}
