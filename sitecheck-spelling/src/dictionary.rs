use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum DictionaryError {
    #[error("failed to read dictionary {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dictionary {0} contains no words")]
    Empty(PathBuf),
}

/// Word membership check.
pub trait Dictionary: Send + Sync {
    fn check(&self, word: &str) -> bool;
}

/// In-memory word list.
///
/// Case follows the usual spell-checker convention: a word is accepted in
/// the form it was listed, a lowercase entry also accepts its Capitalised and
/// ALL-CAPS forms, and any entry accepts its ALL-CAPS form.
///
/// ```
/// use sitecheck_spelling::{Dictionary, WordList};
///
/// let words = WordList::from_words(["hello", "GitHub"]);
/// assert!(words.check("Hello"));
/// assert!(words.check("GITHUB"));
/// assert!(!words.check("github"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct WordList {
    exact: HashSet<String>,
    upper: HashSet<String>,
}

impl WordList {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for word in words {
            list.insert(word.as_ref());
        }
        list
    }

    /// Load a word-per-line file. Hunspell `.dic` files work too: the leading
    /// entry count and `/FLAGS` suffixes are ignored. Affix rules are not
    /// expanded, so prefer fully inflected lists such as `/usr/share/dict/words`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::parse(&content);
        if list.is_empty() {
            return Err(DictionaryError::Empty(path.to_path_buf()));
        }
        tracing::debug!(path = %path.display(), words = list.len(), "dictionary loaded");
        Ok(list)
    }

    fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .map(|entry| entry.split('/').next().unwrap_or(entry))
            .filter(|entry| !entry.is_empty() && !entry.chars().all(|c| c.is_ascii_digit()));
        Self::from_words(entries)
    }

    pub fn insert(&mut self, word: &str) {
        let word = word.trim();
        if word.is_empty() {
            return;
        }
        self.upper.insert(word.to_uppercase());
        self.exact.insert(word.to_string());
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

impl Dictionary for WordList {
    fn check(&self, word: &str) -> bool {
        if self.exact.contains(word) {
            return true;
        }
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        let rest = chars.as_str();
        if first.is_uppercase() && rest.chars().all(|c| !c.is_uppercase()) {
            let lowered: String = first.to_lowercase().chain(rest.chars()).collect();
            if self.exact.contains(&lowered) {
                return true;
            }
        }
        word.chars().all(|c| !c.is_lowercase()) && self.upper.contains(word)
    }
}

/// Words accepted regardless of the base dictionary. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct CustomWordSet {
    words: WordList,
}

impl CustomWordSet {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: WordList::from_words(words),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.check(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for CustomWordSet {
    fn check(&self, word: &str) -> bool {
        self.contains(word)
    }
}
