use crate::document::Snapshot;
use crate::error::ProviderError;
use crate::parser::{partition, ClassificationProvider, ClassificationSpan, SpanClass};
use crate::range::TextRange;
use parking_lot::Mutex;
use pulldown_cmark::{Event, Parser, Tag};
use std::sync::Arc;

type Region = (usize, usize, SpanClass);

/// Marks code blocks, inline code and raw HTML as code; everything else is
/// prose and reported as [`SpanClass::Other`].
#[derive(Default)]
pub struct MarkdownClassifier {
    cache: Mutex<Option<(Arc<str>, Arc<Vec<Region>>)>>,
}

impl MarkdownClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn regions(&self, snapshot: &Snapshot) -> Arc<Vec<Region>> {
        let mut cache = self.cache.lock();
        if let Some((text, regions)) = cache.as_ref() {
            if Arc::ptr_eq(text, snapshot.shared_text()) {
                return Arc::clone(regions);
            }
        }
        let regions = Arc::new(code_regions(snapshot.text()));
        *cache = Some((Arc::clone(snapshot.shared_text()), Arc::clone(&regions)));
        regions
    }
}

impl ClassificationProvider for MarkdownClassifier {
    fn classify(&self, snapshot: &Snapshot, range: TextRange) -> Result<Vec<ClassificationSpan>, ProviderError> {
        if range.version() != snapshot.version() {
            return Err(ProviderError::new("range and snapshot versions differ"));
        }
        let regions = self.regions(snapshot);
        let first = regions.partition_point(|(_, end, _)| *end <= range.start());
        let relevant = regions[first..]
            .iter()
            .take_while(|(start, _, _)| *start < range.end())
            .copied();
        Ok(partition(range, relevant, SpanClass::Other))
    }
}

fn code_regions(content: &str) -> Vec<Region> {
    let mut regions: Vec<Region> = Vec::new();

    for (event, span) in Parser::new(content).into_offset_iter() {
        let is_code = matches!(
            event,
            Event::Start(Tag::CodeBlock(_))
                | Event::Start(Tag::HtmlBlock)
                | Event::Code(_)
                | Event::Html(_)
                | Event::InlineHtml(_)
        );
        if !is_code {
            continue;
        }
        // nested events of a block already covered by an earlier region
        match regions.last_mut() {
            Some(last) if span.start < last.1 => last.1 = last.1.max(span.end),
            _ => regions.push((span.start, span.end, SpanClass::Code)),
        }
    }

    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_parsing() {
        let content = r#"
# Title

This is a test paragraph with some words.

```rust
fn main() {
    println!("This should be ignored");
}
```

More text with `inline_code` here.
"#;

        let snapshot = Snapshot::new(0, content);
        let spans = MarkdownClassifier::new()
            .classify(&snapshot, snapshot.full_range())
            .unwrap();

        let code: Vec<&str> = spans
            .iter()
            .filter(|s| s.class == SpanClass::Code)
            .map(|s| snapshot.slice(s.range).unwrap())
            .collect();
        assert_eq!(code.len(), 2);
        assert!(code[0].contains("println"));
        assert_eq!(code[1], "`inline_code`");

        let prose: String = spans
            .iter()
            .filter(|s| s.class == SpanClass::Other)
            .map(|s| snapshot.slice(s.range).unwrap())
            .collect();
        assert!(prose.contains("test paragraph"));
        assert!(!prose.contains("println"));
    }

    #[test]
    fn test_partial_range() {
        let content = "Some `code` text";
        let snapshot = Snapshot::new(0, content);
        let range = TextRange::from_bounds(7, 16, 0);
        let spans = MarkdownClassifier::new().classify(&snapshot, range).unwrap();
        let shape: Vec<_> = spans.iter().map(|s| (s.range.as_span(), s.class)).collect();
        assert_eq!(shape, vec![(7..11, SpanClass::Code), (11..16, SpanClass::Other)]);
    }
}
