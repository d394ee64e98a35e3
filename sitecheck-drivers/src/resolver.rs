//! Element resolution from an untyped search token.
//!
//! A token coming out of a step may be an element id, a CSS class, the
//! visible text of an element or a pattern over that text. The resolver
//! tries those readings in a fixed precedence and stops at the first one
//! that finds something. Nothing is cached: each call queries the live page.
use crate::site_browser::{Browser, Selector};
use regex::Regex;
use sitecheck_common::{Result, SiteCheckError};
use tracing::{debug, info};

/// One reading of a search token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Id,
    Class,
    Text,
    TextPattern,
}

impl Strategy {
    /// Most specific first; the pattern scan is the loosest and most
    /// expensive so it runs last.
    pub const PRECEDENCE: [Strategy; 4] = [
        Strategy::Id,
        Strategy::Class,
        Strategy::Text,
        Strategy::TextPattern,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Class => "css_class",
            Self::Text => "text",
            Self::TextPattern => "text_regex",
        }
    }

    /// Selector for `token` under this reading. `None` when the token cannot
    /// be read this way (a pattern that does not compile).
    fn selector(&self, token: &str, escape_patterns: bool) -> Option<Selector> {
        match self {
            Self::Id => Some(Selector::Id(token.to_string())),
            Self::Class => Some(Selector::Class(token.to_string())),
            Self::Text => Some(Selector::Text(token.to_string())),
            Self::TextPattern => {
                let source = if escape_patterns {
                    regex::escape(token)
                } else {
                    token.to_string()
                };
                match Regex::new(&source) {
                    Ok(re) => Some(Selector::TextPattern(re)),
                    Err(err) => {
                        debug!(target: "browser.resolver", %token, %err, "token is not a valid pattern");
                        None
                    }
                }
            }
        }
    }
}

/// Maps search tokens to elements. See the module docs for the precedence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementResolver {
    escape_patterns: bool,
}

impl ElementResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat the token literally in the pattern strategy instead of as a regex.
    pub fn escape_patterns(mut self, escape: bool) -> Self {
        self.escape_patterns = escape;
        self
    }

    /// Resolve `token` to the first element found by the first strategy that
    /// matches anything.
    pub async fn resolve<B>(&self, browser: &B, token: &str) -> Result<B::Element>
    where
        B: Browser + ?Sized,
    {
        Ok(self.resolve_with_strategy(browser, token).await?.0)
    }

    /// Like [`resolve`](Self::resolve), also reporting which strategy hit.
    pub async fn resolve_with_strategy<B>(
        &self,
        browser: &B,
        token: &str,
    ) -> Result<(B::Element, Strategy)>
    where
        B: Browser + ?Sized,
    {
        for strategy in Strategy::PRECEDENCE {
            let Some(selector) = strategy.selector(token, self.escape_patterns) else {
                continue;
            };
            if browser.exists(&selector).await? {
                let element = browser.get(&selector).await?;
                info!(target: "browser.resolver", %token, strategy = strategy.name(), "resolved element");
                return Ok((element, strategy));
            }
            debug!(target: "browser.resolver", %token, strategy = strategy.name(), "no match");
        }
        Err(SiteCheckError::ElementNotFound(token.to_string()))
    }
}
