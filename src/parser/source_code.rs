use crate::document::Snapshot;
use crate::error::ProviderError;
use crate::parser::{partition, ClassificationProvider, ClassificationSpan, SourceLang, SpanClass};
use crate::range::TextRange;
use parking_lot::Mutex;
use std::sync::Arc;

/// Comment or string body found by the scanner, delimiters excluded.
type Region = (usize, usize, SpanClass);

/// Classifies source code into comments, string literals and code.
///
/// The whole snapshot is scanned once and the regions are reused for every
/// range classified against the same snapshot.
pub struct LexicalClassifier {
    lang: SourceLang,
    cache: Mutex<Option<(Arc<str>, Arc<Vec<Region>>)>>,
}

impl LexicalClassifier {
    pub fn new(lang: SourceLang) -> Self {
        Self {
            lang,
            cache: Mutex::new(None),
        }
    }

    fn regions(&self, snapshot: &Snapshot) -> Arc<Vec<Region>> {
        let mut cache = self.cache.lock();
        if let Some((text, regions)) = cache.as_ref() {
            if Arc::ptr_eq(text, snapshot.shared_text()) {
                return Arc::clone(regions);
            }
        }
        let regions = Arc::new(scan(snapshot.text(), self.lang));
        *cache = Some((Arc::clone(snapshot.shared_text()), Arc::clone(&regions)));
        regions
    }
}

impl ClassificationProvider for LexicalClassifier {
    fn classify(&self, snapshot: &Snapshot, range: TextRange) -> Result<Vec<ClassificationSpan>, ProviderError> {
        if range.version() != snapshot.version() {
            return Err(ProviderError::new(format!(
                "range is at version {} but snapshot is at {}",
                range.version(),
                snapshot.version()
            )));
        }
        let regions = self.regions(snapshot);
        let first = regions.partition_point(|(_, end, _)| *end <= range.start());
        let relevant = regions[first..]
            .iter()
            .take_while(|(start, _, _)| *start < range.end())
            .copied();
        Ok(partition(range, relevant, SpanClass::Code))
    }
}

fn scan(text: &str, lang: SourceLang) -> Vec<Region> {
    match lang {
        SourceLang::Python => scan_python_style(text),
        _ => scan_c_style(text, lang),
    }
}

fn scan_c_style(text: &str, lang: SourceLang) -> Vec<Region> {
    let bytes = text.as_bytes();
    let single_quote_strings = matches!(
        lang,
        SourceLang::JavaScript | SourceLang::TypeScript | SourceLang::Jsx | SourceLang::Tsx
    );
    let backtick_strings = single_quote_strings || lang == SourceLang::Go;

    let mut regions = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = line_end(text, i);
                regions.push((i + 2, end, SpanClass::Comment));
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let body = i + 2;
                let (end, next) = match text[body..].find("*/") {
                    Some(at) => (body + at, body + at + 2),
                    None => (bytes.len(), bytes.len()),
                };
                regions.push((body, end, SpanClass::Comment));
                i = next;
            }
            b'"' => i = quoted(text, i, b'"', true, &mut regions),
            b'`' if backtick_strings => i = quoted(text, i, b'`', true, &mut regions),
            b'\'' if single_quote_strings => i = quoted(text, i, b'\'', false, &mut regions),
            b'\'' => i = skip_char_literal(text, i),
            _ => i += 1,
        }
    }
    regions
}

fn scan_python_style(text: &str) -> Vec<Region> {
    let bytes = text.as_bytes();
    let mut regions = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'#' => {
                let end = line_end(text, i);
                regions.push((i + 1, end, SpanClass::Comment));
                i = end;
            }
            quote @ (b'"' | b'\'') => {
                let triple = [quote; 3];
                if bytes[i..].starts_with(&triple) {
                    let body = i + 3;
                    let (end, next) = match find_bytes(&bytes[body..], &triple) {
                        Some(at) => (body + at, body + at + 3),
                        None => (bytes.len(), bytes.len()),
                    };
                    regions.push((body, end, SpanClass::String));
                    i = next;
                } else {
                    i = quoted(text, i, quote, false, &mut regions);
                }
            }
            _ => i += 1,
        }
    }
    regions
}

/// Record the body of a quoted literal opening at `open` and return the
/// offset just past it. Backslash escapes are honored; unless `multiline`, an
/// unterminated literal stops at the end of the line.
fn quoted(text: &str, open: usize, quote: u8, multiline: bool, regions: &mut Vec<Region>) -> usize {
    let bytes = text.as_bytes();
    let body = open + 1;
    let mut j = body;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' if !multiline => break,
            b if b == quote => {
                regions.push((body, j, SpanClass::String));
                return j + 1;
            }
            _ => j += 1,
        }
    }
    let end = j.min(bytes.len());
    regions.push((body, end, SpanClass::String));
    end
}

/// Step over `'x'` or `'\n'` char literals; a lone quote (a Rust lifetime)
/// is treated as plain code.
fn skip_char_literal(text: &str, open: usize) -> usize {
    let rest = &text[open + 1..];
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, '\\')) => match rest.get(2..).and_then(|tail| tail.find('\'')) {
            Some(at) if at <= 10 => open + 4 + at,
            _ => open + 1,
        },
        Some((_, _)) => match chars.next() {
            Some((at, '\'')) => open + 1 + at + 1,
            _ => open + 1,
        },
        None => open + 1,
    }
}

fn line_end(text: &str, from: usize) -> usize {
    text[from..].find('\n').map_or(text.len(), |at| from + at)
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
