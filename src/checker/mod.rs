pub mod dictionary;
pub mod suggestions;
pub mod tokenizer;

use crate::error::ProviderError;
use crate::Config;
use anyhow::{Context, Result};
use dictionary::Dictionary;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Spelling oracle consulted for every natural-language token.
///
/// Implementations may fail; callers treat any failure as "spelled correctly".
pub trait SpellProvider: Send + Sync {
    fn spell(&self, word: &str) -> Result<bool, ProviderError>;

    /// Replacement candidates, best first. May be empty.
    fn suggest(&self, word: &str) -> Result<Vec<String>, ProviderError>;
}

/// Run an oracle call, turning errors and panics into `None`.
pub(crate) fn guarded<T>(
    oracle: &'static str,
    call: impl FnOnce() -> Result<T, ProviderError>,
) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            warn!(oracle, error = %err, "oracle call failed");
            None
        }
        Err(_) => {
            warn!(oracle, "oracle call panicked");
            None
        }
    }
}

/// Whether `word` is spelled correctly, failing open.
pub fn spell_or_accept(provider: &dyn SpellProvider, word: &str) -> bool {
    guarded("spell", || provider.spell(word)).unwrap_or(true)
}

/// Suggestions for `word`, or `None` if the provider failed.
pub fn suggest_or_none(provider: &dyn SpellProvider, word: &str) -> Option<Vec<String>> {
    guarded("suggest", || provider.suggest(word))
}

/// Dictionary-backed provider with a personal word list and ignore patterns.
pub struct DictionarySpellProvider {
    dictionary: Dictionary,
    personal_words: HashSet<String>,
    ignore_patterns: Vec<Regex>,
    max_suggestions: usize,
    case_sensitive: bool,
}

impl DictionarySpellProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let dictionary = Dictionary::for_language(&config.language)?;
        Self::with_dictionary(dictionary, config)
    }

    pub fn with_dictionary(dictionary: Dictionary, config: &Config) -> Result<Self> {
        let mut personal_words = HashSet::new();
        if let Some(personal_dict_path) = &config.personal_dictionary {
            if personal_dict_path.exists() {
                personal_words = read_word_list(personal_dict_path)?;
            }
        }

        let mut ignore_patterns = Vec::new();
        for pattern in &config.ignore_patterns {
            match Regex::new(pattern) {
                Ok(re) => ignore_patterns.push(re),
                Err(e) => warn!(pattern = %pattern, error = %e, "invalid ignore pattern"),
            }
        }

        Ok(Self {
            dictionary,
            personal_words,
            ignore_patterns,
            max_suggestions: config.max_suggestions,
            case_sensitive: config.case_sensitive,
        })
    }

    pub fn add_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.personal_words.insert(word.as_ref().to_lowercase());
        }
    }

    fn normalize(&self, word: &str) -> String {
        if self.case_sensitive {
            word.to_string()
        } else {
            word.to_lowercase()
        }
    }

    fn should_ignore(&self, word: &str) -> bool {
        if word.chars().count() <= 1 {
            return true;
        }

        if word.chars().all(|c| c.is_numeric()) {
            return true;
        }

        self.ignore_patterns.iter().any(|p| p.is_match(word))
    }
}

impl SpellProvider for DictionarySpellProvider {
    fn spell(&self, word: &str) -> Result<bool, ProviderError> {
        if self.should_ignore(word) || self.personal_words.contains(&word.to_lowercase()) {
            return Ok(true);
        }
        Ok(self.dictionary.contains(&self.normalize(word)))
    }

    fn suggest(&self, word: &str) -> Result<Vec<String>, ProviderError> {
        Ok(suggestions::generate(
            &self.normalize(word),
            &self.dictionary,
            self.max_suggestions,
        ))
    }
}

/// Chains providers, e.g. one per language.
///
/// A word is correct if any provider accepts it. Suggestions come from the
/// first provider that has any. A failing provider is skipped.
pub struct FallbackSpellProvider {
    providers: Vec<Arc<dyn SpellProvider>>,
}

impl FallbackSpellProvider {
    pub fn new(providers: Vec<Arc<dyn SpellProvider>>) -> Self {
        Self { providers }
    }
}

impl SpellProvider for FallbackSpellProvider {
    fn spell(&self, word: &str) -> Result<bool, ProviderError> {
        let mut answered = false;
        for provider in &self.providers {
            match guarded("spell", || provider.spell(word)) {
                Some(true) => return Ok(true),
                Some(false) => answered = true,
                None => {}
            }
        }
        if answered || self.providers.is_empty() {
            Ok(false)
        } else {
            Err(ProviderError::new("every spell provider failed"))
        }
    }

    fn suggest(&self, word: &str) -> Result<Vec<String>, ProviderError> {
        for provider in &self.providers {
            if let Some(found) = guarded("suggest", || provider.suggest(word)) {
                if !found.is_empty() {
                    return Ok(found);
                }
            }
        }
        Ok(Vec::new())
    }
}

/// Read a personal dictionary: one word per line, `#` starts a comment line.
pub fn read_word_list(path: &Path) -> Result<HashSet<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read word list: {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty() && !w.starts_with('#'))
        .map(str::to_lowercase)
        .collect())
}
