//! Common types and utilities shared across sitecheck crates.
//!
//! This crate defines the shared error type, the browser kind and the
//! observability helpers used throughout the sitecheck workspace. It is kept
//! dependency-minimal so that every crate can depend on it.
//!
//! # Overview
//!
//! - [`SiteCheckError`] and [`Result`]: Shared error handling
//! - [`BrowserKind`]: Which WebDriver-backed browser a session runs in
//! - [`observability`]: Centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use sitecheck_common::BrowserKind;
//!
//! let kind = BrowserKind::from_name("Chrome").unwrap();
//! assert_eq!(kind, BrowserKind::Chrome);
//! assert_eq!(BrowserKind::default(), BrowserKind::Firefox);
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod observability;

/// Browser used for a test session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Firefox,
    Chrome,
}

impl BrowserKind {
    /// Parse a browser name case-insensitively. Returns `None` for names
    /// outside the supported set.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "firefox" | "gecko" => Some(Self::Firefox),
            "chrome" | "chromium" => Some(Self::Chrome),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Firefox => "firefox",
            Self::Chrome => "chrome",
        }
    }

    /// Where the matching WebDriver service listens by default
    /// (geckodriver / chromedriver).
    pub fn default_webdriver_url(&self) -> &'static str {
        match self {
            Self::Firefox => "http://localhost:4444",
            Self::Chrome => "http://localhost:9515",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error types used across sitecheck.
#[derive(thiserror::Error, Debug)]
pub enum SiteCheckError {
    /// No resolution strategy located an element for the token.
    #[error("Can't find the element {0}")]
    ElementNotFound(String),

    /// A browser-level assertion (title, link, ...) did not hold.
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// The browser automation layer reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// No registered step definition matched the step text.
    #[error("No step definition matches: {0}")]
    StepNotMatched(String),

    /// A step handler received arguments it cannot work with.
    #[error("Invalid step arguments: {0}")]
    InvalidStepArgs(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SiteCheckError {
    /// Build an assertion failure from anything printable.
    pub fn assertion(msg: impl Into<String>) -> Self {
        Self::Assertion(msg.into())
    }
}

/// Convenient alias for results that use [`SiteCheckError`].
pub type Result<T> = std::result::Result<T, SiteCheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_names_are_case_insensitive() {
        assert_eq!(BrowserKind::from_name("FIREFOX"), Some(BrowserKind::Firefox));
        assert_eq!(BrowserKind::from_name(" chromium "), Some(BrowserKind::Chrome));
        assert_eq!(BrowserKind::from_name("opera"), None);
    }

    #[test]
    fn element_not_found_mentions_token() {
        let err = SiteCheckError::ElementNotFound("about".into());
        assert_eq!(err.to_string(), "Can't find the element about");
    }
}
