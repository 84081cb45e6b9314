//! Word tokenizer for natural-language regions.
//!
//! A token is a maximal run of characters that are neither whitespace nor in
//! the breaker set. Offsets are byte offsets relative to the input text.

use lazy_static::lazy_static;
use std::str::CharIndices;

/// Characters that separate words in addition to Unicode whitespace.
pub const DEFAULT_WORD_BREAKERS: &str = "\"'\\{}()[]-:;.,!?_\t/*@";

lazy_static! {
    static ref DEFAULT_TOKENIZER: Tokenizer = Tokenizer::default();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub offset: usize,
    pub text: &'a str,
}

impl Token<'_> {
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    breakers: Vec<char>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_WORD_BREAKERS)
    }
}

impl Tokenizer {
    pub fn new(breakers: &str) -> Self {
        Self {
            breakers: breakers.chars().collect(),
        }
    }

    pub fn is_breaker(&self, ch: char) -> bool {
        ch.is_whitespace() || self.breakers.contains(&ch)
    }

    pub fn tokens<'a>(&'a self, text: &'a str) -> Tokens<'a> {
        Tokens {
            tokenizer: self,
            text,
            chars: text.char_indices(),
        }
    }
}

/// Tokenize with the default breaker set.
pub fn tokenize(text: &str) -> Tokens<'_> {
    DEFAULT_TOKENIZER.tokens(text)
}

/// Lazy token iterator returned by [`Tokenizer::tokens`].
pub struct Tokens<'a> {
    tokenizer: &'a Tokenizer,
    text: &'a str,
    chars: CharIndices<'a>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = loop {
            let (i, ch) = self.chars.next()?;
            if !self.tokenizer.is_breaker(ch) {
                break i;
            }
        };

        let end = loop {
            match self.chars.next() {
                Some((i, ch)) if self.tokenizer.is_breaker(ch) => break i,
                Some(_) => {}
                None => break self.text.len(),
            }
        };

        Some(Token {
            offset: start,
            text: &self.text[start..end],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(text: &str) -> Vec<(&str, usize, usize)> {
        tokenize(text).map(|t| (t.text, t.offset, t.len())).collect()
    }

    #[test]
    fn test_words_and_offsets() {
        assert_eq!(spans("hello, world!"), vec![("hello", 0, 5), ("world", 7, 5)]);
    }

    #[test]
    fn test_breakers_split_words() {
        let words: Vec<_> = tokenize("snake_case kebab-case a/b \"quoted\" user@host")
            .map(|t| t.text)
            .collect();
        assert_eq!(
            words,
            vec!["snake", "case", "kebab", "case", "a", "b", "quoted", "user", "host"]
        );
    }

    #[test]
    fn test_empty_and_breaker_only_input() {
        assert!(spans("").is_empty());
        assert!(spans(" \t\n.,;!?").is_empty());
    }

    #[test]
    fn test_unicode_offsets_are_bytes() {
        assert_eq!(spans("прывет мир"), vec![("прывет", 0, 12), ("мир", 13, 6)]);
        assert_eq!(spans("a\u{00A0}b"), vec![("a", 0, 1), ("b", 3, 1)]);
    }

    #[test]
    fn test_tokenizing_is_pure() {
        let text = "// recieve the mesage";
        assert_eq!(spans(text), spans(text));
        assert_eq!(spans(text), vec![("recieve", 3, 7), ("the", 11, 3), ("mesage", 15, 6)]);
    }

    #[test]
    fn test_custom_breakers() {
        let tokenizer = Tokenizer::new("#");
        let words: Vec<_> = tokenizer.tokens("one#two-three").map(|t| t.text).collect();
        assert_eq!(words, vec!["one", "two-three"]);
    }
}
