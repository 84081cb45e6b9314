pub mod markdown;
pub mod plaintext;
pub mod source_code;

use crate::document::Snapshot;
use crate::error::ProviderError;
use crate::range::TextRange;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Semantic class of a region of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanClass {
    Comment,
    String,
    Code,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationSpan {
    pub range: TextRange,
    pub class: SpanClass,
}

impl ClassificationSpan {
    pub fn new(range: TextRange, class: SpanClass) -> Self {
        Self { range, class }
    }
}

/// Splits text into classified regions.
///
/// `classify` must return spans that partition `range` exactly, in order,
/// stamped with the snapshot's version.
pub trait ClassificationProvider: Send + Sync {
    fn classify(&self, snapshot: &Snapshot, range: TextRange) -> Result<Vec<ClassificationSpan>, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Markdown,
    SourceCode(SourceLang),
    PlainText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLang {
    Rust,
    JavaScript,
    TypeScript,
    Python,
    Go,
    Java,
    C,
    Cpp,
    Jsx,
    Tsx,
    Other,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "md" | "mdx" | "markdown" => FileType::Markdown,
            "rs" => FileType::SourceCode(SourceLang::Rust),
            "js" | "mjs" | "cjs" => FileType::SourceCode(SourceLang::JavaScript),
            "ts" | "mts" | "cts" => FileType::SourceCode(SourceLang::TypeScript),
            "jsx" => FileType::SourceCode(SourceLang::Jsx),
            "tsx" => FileType::SourceCode(SourceLang::Tsx),
            "py" | "pyw" => FileType::SourceCode(SourceLang::Python),
            "go" => FileType::SourceCode(SourceLang::Go),
            "java" => FileType::SourceCode(SourceLang::Java),
            "c" | "h" => FileType::SourceCode(SourceLang::C),
            "cpp" | "cc" | "cxx" | "hpp" | "hh" => FileType::SourceCode(SourceLang::Cpp),
            _ => FileType::PlainText,
        }
    }

    pub fn classifier(&self) -> Arc<dyn ClassificationProvider> {
        match self {
            FileType::Markdown => Arc::new(markdown::MarkdownClassifier::new()),
            FileType::SourceCode(lang) => Arc::new(source_code::LexicalClassifier::new(*lang)),
            FileType::PlainText => Arc::new(plaintext::PlainTextClassifier),
        }
    }

    /// Prose formats report their text as [`SpanClass::Other`], which has to
    /// count as natural language for them.
    pub fn natural_language(&self, configured: &[SpanClass]) -> Vec<SpanClass> {
        let mut classes = configured.to_vec();
        if !matches!(self, FileType::SourceCode(_)) && !classes.contains(&SpanClass::Other) {
            classes.push(SpanClass::Other);
        }
        classes
    }
}

/// Turn sorted, non-overlapping `marked` regions into a partition of `range`,
/// clipping them to it and filling the gaps with `filler`.
pub(crate) fn partition(
    range: TextRange,
    marked: impl IntoIterator<Item = (usize, usize, SpanClass)>,
    filler: SpanClass,
) -> Vec<ClassificationSpan> {
    let version = range.version();
    let mut spans = Vec::new();
    let mut cursor = range.start();

    for (start, end, class) in marked {
        let start = start.max(cursor);
        let end = end.min(range.end());
        if start >= end {
            continue;
        }
        if cursor < start {
            spans.push(ClassificationSpan::new(TextRange::from_bounds(cursor, start, version), filler));
        }
        spans.push(ClassificationSpan::new(TextRange::from_bounds(start, end, version), class));
        cursor = end;
    }

    if cursor < range.end() {
        spans.push(ClassificationSpan::new(TextRange::from_bounds(cursor, range.end(), version), filler));
    }
    spans
}
