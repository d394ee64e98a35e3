//! Spell checking of rendered page text.
//!
//! - [`Dictionary`]: word membership, the only thing the validator needs
//! - [`WordList`]: dictionary loaded from a word-per-line file
//! - [`CustomWordSet`]: project words that are always accepted
//! - [`ContentValidator`]: tokenises text and reports unknown words
pub mod dictionary;
pub mod validator;

pub use dictionary::{CustomWordSet, Dictionary, DictionaryError, WordList};
pub use validator::{words, ContentValidator, ValidationResult};
