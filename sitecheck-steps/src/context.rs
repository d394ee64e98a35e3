use serde::Serialize;
use sitecheck_config::{AliasTable, SiteConfig};
use sitecheck_drivers::{Browser, ElementResolver};
use sitecheck_spelling::ContentValidator;
use std::fmt;
use std::sync::Arc;

/// Process-wide collaborators, built once at startup and read-only after.
#[derive(Debug)]
pub struct StepEnv {
    pub aliases: AliasTable,
    pub resolver: ElementResolver,
    pub validator: ContentValidator,
}

impl StepEnv {
    pub fn new(aliases: AliasTable, resolver: ElementResolver, validator: ContentValidator) -> Self {
        Self {
            aliases,
            resolver,
            validator,
        }
    }

    /// Aliases and resolver settings from `config`.
    pub fn from_config(config: &SiteConfig, validator: ContentValidator) -> Self {
        Self::new(
            config.aliases.clone(),
            ElementResolver::new().escape_patterns(config.resolver.escape_patterns),
            validator,
        )
    }
}

/// What a step handler sees: the scenario's browser plus the shared env.
pub struct StepContext<B: Browser> {
    pub browser: Arc<B>,
    pub env: Arc<StepEnv>,
}

impl<B: Browser> StepContext<B> {
    pub fn new(browser: Arc<B>, env: Arc<StepEnv>) -> Self {
        Self { browser, env }
    }
}

impl<B: Browser> Clone for StepContext<B> {
    fn clone(&self) -> Self {
        Self {
            browser: self.browser.clone(),
            env: self.env.clone(),
        }
    }
}

/// A failure a step reports without aborting the scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SoftFailure {
    Spelling { misspelled: Vec<String> },
}

impl fmt::Display for SoftFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spelling { misspelled } => {
                write!(f, "misspelled words {}", misspelled.join(", "))
            }
        }
    }
}

/// Successful step completion. Hard failures travel as `Err` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Passed,
    SoftFailure(SoftFailure),
}
