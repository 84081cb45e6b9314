use anyhow::{Context, Result};
use fst::automaton::{AlwaysMatch, Str};
use fst::{Automaton, IntoStreamer, Set, Streamer};
use std::fs;
use std::path::{Path, PathBuf};

/// English words bundled into the binary for when no dictionary is installed.
const FALLBACK_WORDS: &str = include_str!("../../data/en_common.txt");

/// A sorted, deduplicated word set. Lookups are exact; callers normalize case.
pub struct Dictionary {
    words: Set<Vec<u8>>,
}

impl Dictionary {
    /// Index `words` in memory. Empty entries and duplicates are dropped.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        let mut sorted: Vec<&str> = words
            .iter()
            .map(AsRef::as_ref)
            .filter(|w| !w.is_empty())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();

        let words = Set::from_iter(sorted).context("Failed to index word list")?;
        Ok(Self { words })
    }

    /// The installed dictionary for `language`, or the bundled list when none is installed.
    pub fn for_language(language: &str) -> Result<Self> {
        let path = Self::installed_path(language)?;
        if path.exists() {
            return Self::read(&path);
        }
        tracing::debug!(language, "no installed dictionary, using bundled word list");
        Self::fallback()
    }

    pub fn fallback() -> Result<Self> {
        let words: Vec<&str> = FALLBACK_WORDS
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();
        Self::from_words(words.as_slice())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to open dictionary: {}", path.display()))?;
        let words = Set::new(bytes)
            .with_context(|| format!("Not a dictionary file: {}", path.display()))?;
        Ok(Self { words })
    }

    /// Persist in the format `read` accepts, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
        fs::write(path, self.words.as_fst().as_bytes())
            .with_context(|| format!("Failed to write dictionary: {}", path.display()))
    }

    /// Where `dict build` installs the dictionary for `language`.
    pub fn installed_path(language: &str) -> Result<PathBuf> {
        let data_dir = crate::config::Config::data_dir().context("Failed to get data directory")?;
        Ok(data_dir.join(format!("{}.dict", language)))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.collect(Str::new(prefix).starts_with())
    }

    /// Every word, in order. Linear in the dictionary size.
    pub fn words(&self) -> Vec<String> {
        self.collect(AlwaysMatch)
    }

    fn collect<A: Automaton>(&self, automaton: A) -> Vec<String> {
        let mut stream = self.words.search(automaton).into_stream();
        let mut found = Vec::new();
        while let Some(key) = stream.next() {
            if let Ok(word) = std::str::from_utf8(key) {
                found.push(word.to_owned());
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_words_dedups_and_sorts() {
        let dict = Dictionary::from_words(&["world", "hello", "", "hello"]).unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.words(), vec!["hello".to_string(), "world".to_string()]);
        assert_eq!(dict.with_prefix("wo"), vec!["world".to_string()]);
        assert!(dict.with_prefix("x").is_empty());
    }

    #[test]
    fn test_fallback_list() {
        let dict = Dictionary::fallback().unwrap();
        assert!(dict.contains("receive"));
        assert!(dict.contains("message"));
        assert!(!dict.contains("recieve"));
        assert!(!dict.words().iter().any(|w| w.starts_with('#')));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("xx.dict");

        Dictionary::from_words(&["comment", "value"]).unwrap().write(&path).unwrap();

        let dict = Dictionary::read(&path).unwrap();
        assert_eq!(dict.len(), 2);
        assert!(dict.contains("value"));
        assert!(!dict.contains("valeu"));
    }

    #[test]
    fn test_read_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.dict");
        fs::write(&path, b"not an fst").unwrap();
        assert!(Dictionary::read(&path).is_err());
    }
}
