use crate::document::Snapshot;
use crate::error::ProviderError;
use crate::parser::{ClassificationProvider, ClassificationSpan, SpanClass};
use crate::range::TextRange;

/// Plain text is prose from start to end.
pub struct PlainTextClassifier;

impl ClassificationProvider for PlainTextClassifier {
    fn classify(&self, snapshot: &Snapshot, range: TextRange) -> Result<Vec<ClassificationSpan>, ProviderError> {
        if range.end() > snapshot.len() {
            return Err(ProviderError::new("range extends past the snapshot"));
        }
        if range.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![ClassificationSpan::new(range, SpanClass::Other)])
    }
}
