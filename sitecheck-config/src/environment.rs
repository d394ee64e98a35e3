//! Deployment environments and the per-environment site alias tables.
use crate::ConfigError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The deployment a test run points at. Closed set: anything else is rejected
/// while the configuration loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Local preview server.
    Test,
    /// The published site.
    Prod,
}

impl Environment {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Prod => "prod",
        }
    }

    fn builtin_aliases(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Test => &[("main blog site", "http://localhost:4000")],
            Self::Prod => &[("main blog site", "http://rlgomes.github.com")],
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "test" => Ok(Self::Test),
            "prod" => Ok(Self::Prod),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Symbolic site names mapped to base URLs for one environment.
///
/// Selected once at startup and read-only afterwards; names without an entry
/// are treated as literal URLs.
///
/// ```
/// use sitecheck_config::{AliasTable, Environment};
///
/// let table = AliasTable::for_environment(Environment::Prod);
/// assert_eq!(table.resolve_url("main blog site"), "http://rlgomes.github.com");
/// assert_eq!(table.resolve_url("http://example.com"), "http://example.com");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

impl AliasTable {
    /// Built-in table for `env`.
    pub fn for_environment(env: Environment) -> Self {
        let entries = env
            .builtin_aliases()
            .iter()
            .map(|(name, url)| (name.to_string(), url.to_string()))
            .collect();
        Self { entries }
    }

    /// Add or replace one alias.
    pub(crate) fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.entries.insert(name.into(), url.into());
    }

    /// Map `name` to its URL, or hand `name` back unchanged.
    pub fn resolve_url<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
