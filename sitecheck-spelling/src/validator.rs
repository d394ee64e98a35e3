use crate::dictionary::{CustomWordSet, Dictionary};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one validation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Unknown words in page order, duplicates kept, original case.
    pub misspelled: Vec<String>,
    /// How many words were looked up.
    pub checked: usize,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.misspelled.is_empty()
    }
}

/// Candidate words of `text`, in order.
///
/// Newlines, colons and hyphens separate words, so `well-known:` yields
/// `well` and `known`. Punctuation around a token is stripped; what remains
/// must be purely ASCII letters, so numbers and code are skipped.
///
/// ```
/// let words = sitecheck_spelling::words("well-known: example, (abc123) 42.");
/// assert_eq!(words, ["well", "known", "example"]);
/// ```
pub fn words(text: &str) -> Vec<String> {
    let normalized: String = text
        .chars()
        .map(|c| if matches!(c, '\n' | ':' | '-') { ' ' } else { c })
        .collect();
    normalized
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| c.is_ascii_punctuation()))
        .filter(|word| !word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic()))
        .map(str::to_string)
        .collect()
}

/// Spell checker over a base dictionary plus the project's custom words.
/// Immutable once built; share it behind an `Arc`.
#[derive(Clone)]
pub struct ContentValidator {
    dictionary: Arc<dyn Dictionary>,
    custom: CustomWordSet,
}

impl std::fmt::Debug for ContentValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentValidator")
            .field("custom_words", &self.custom.len())
            .finish_non_exhaustive()
    }
}

impl ContentValidator {
    pub fn new(dictionary: impl Dictionary + 'static, custom: CustomWordSet) -> Self {
        Self {
            dictionary: Arc::new(dictionary),
            custom,
        }
    }

    pub fn is_known(&self, word: &str) -> bool {
        self.custom.contains(word) || self.dictionary.check(word)
    }

    pub fn validate(&self, text: &str) -> ValidationResult {
        let candidates = words(text);
        let checked = candidates.len();
        let misspelled = candidates
            .into_iter()
            .filter(|word| !self.is_known(word))
            .collect();
        ValidationResult {
            misspelled,
            checked,
        }
    }
}
