//! Loader for sitecheck configuration with YAML + environment overlays.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults (`browser: firefox`, `env: test`, ...)
//! 2. YAML files or inline snippets added through [`SiteConfigLoader`]
//! 3. `SITECHECK_`-prefixed environment variables, `__` between nested keys
//!    (`SITECHECK_HEADLESS`, `SITECHECK_SPELLING__DICTIONARY`)
//! 4. the bare `BROWSER` and `ENV` process variables
//!
//! String values may reference other variables as `${VAR}`.
use config::{Config, Environment as EnvSource, File};
use serde::Deserialize;
use serde_json::Value;
use sitecheck_common::BrowserKind;
use std::path::{Path, PathBuf};
use url::Url;

mod environment;

pub use environment::{AliasTable, Environment};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "SITECHECK";

/// Process variable selecting the browser.
pub const BROWSER_VAR: &str = "BROWSER";
/// Process variable selecting the environment.
pub const ENV_VAR: &str = "ENV";

pub const DEFAULT_DICTIONARY: &str = "/usr/share/dict/words";

/// Words always accepted by the spell check on top of the dictionary.
pub const DEFAULT_CUSTOM_WORDS: &[&str] = &[
    "prolog",
    "java",
    "python",
    "sst",
    "freshen",
    "rodney",
    "lopes",
    "gomes",
    "disqus",
    "memoize",
    "corun",
    "kif",
    "github",
    "nic",
    "GitHub",
    "rlgomes.github.com",
    "pyperf",
    "clifu",
    "pangu",
    "jsdb",
];

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Unknown environment {0}")]
    UnknownEnvironment(String),

    #[error("Unknown browser {0}")]
    UnknownBrowser(String),

    #[error("Invalid URL for {name}: {url}")]
    InvalidUrl { name: String, url: String },

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

/// Validated configuration for one process.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub browser: BrowserKind,
    pub environment: Environment,
    /// Explicit WebDriver endpoint; `None` means the browser's default.
    pub webdriver_url: Option<String>,
    pub headless: bool,
    pub aliases: AliasTable,
    pub resolver: ResolverConfig,
    pub spelling: SpellingConfig,
}

impl SiteConfig {
    /// WebDriver endpoint to connect to.
    pub fn webdriver_endpoint(&self) -> &str {
        self.webdriver_url
            .as_deref()
            .unwrap_or_else(|| self.browser.default_webdriver_url())
    }
}

/// Element resolution knobs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolverConfig {
    /// Escape regex metacharacters before the text-pattern lookup, so tokens
    /// only ever match their literal text.
    #[serde(default)]
    pub escape_patterns: bool,
}

#[derive(Debug, Clone)]
pub struct SpellingConfig {
    /// Word list backing the dictionary.
    pub dictionary: PathBuf,
    /// Built-in custom words followed by any configured extras.
    pub custom_words: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    browser: String,
    env: String,
    #[serde(default)]
    webdriver_url: Option<String>,
    #[serde(default)]
    headless: bool,
    #[serde(default)]
    aliases: Vec<RawAlias>,
    #[serde(default)]
    resolver: ResolverConfig,
    spelling: RawSpelling,
}

#[derive(Debug, Deserialize)]
struct RawAlias {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RawSpelling {
    dictionary: PathBuf,
    #[serde(default)]
    custom_words: Vec<String>,
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring.
pub struct SiteConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SiteConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteConfigLoader {
    /// Defaults plus environment overlays; add files before calling [`load`](Self::load).
    ///
    /// ```
    /// use sitecheck_config::{Environment, SiteConfigLoader};
    ///
    /// temp_env::with_vars([("ENV", None::<&str>), ("BROWSER", None)], || {
    ///     let cfg = SiteConfigLoader::new()
    ///         .with_yaml_str("env: prod\nbrowser: chrome")
    ///         .load()
    ///         .expect("valid config");
    ///
    ///     assert_eq!(cfg.environment, Environment::Prod);
    ///     assert_eq!(cfg.webdriver_endpoint(), "http://localhost:9515");
    /// });
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources and validate them into a [`SiteConfig`].
    ///
    /// An environment outside the recognised set fails here, before any
    /// browser session or scenario exists.
    pub fn load(self) -> Result<SiteConfig, ConfigError> {
        let cfg = self
            .builder
            .set_default("browser", BrowserKind::default().name())?
            .set_default("env", Environment::Test.name())?
            .set_default("headless", false)?
            .set_default("spelling.dictionary", DEFAULT_DICTIONARY)?
            .add_source(
                EnvSource::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("spelling.custom_words"),
            )
            .set_override_option(BROWSER_VAR.to_lowercase(), std::env::var(BROWSER_VAR).ok())?
            .set_override_option(ENV_VAR.to_lowercase(), std::env::var(ENV_VAR).ok())?
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let raw: RawConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        validate(raw)
    }
}

fn validate(raw: RawConfig) -> Result<SiteConfig, ConfigError> {
    let environment: Environment = raw.env.parse()?;
    let browser =
        BrowserKind::from_name(&raw.browser).ok_or(ConfigError::UnknownBrowser(raw.browser))?;

    if let Some(endpoint) = &raw.webdriver_url {
        check_url("webdriver_url", endpoint)?;
    }

    let mut aliases = AliasTable::for_environment(environment);
    for alias in raw.aliases {
        check_url(&alias.name, &alias.url)?;
        aliases.insert(alias.name, alias.url);
    }

    let custom_words = DEFAULT_CUSTOM_WORDS
        .iter()
        .map(|w| w.to_string())
        .chain(
            raw.spelling
                .custom_words
                .into_iter()
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty()),
        )
        .collect();

    tracing::debug!(
        %environment,
        %browser,
        aliases = aliases.len(),
        "configuration loaded"
    );

    Ok(SiteConfig {
        browser,
        environment,
        webdriver_url: raw.webdriver_url,
        headless: raw.headless,
        aliases,
        resolver: raw.resolver,
        spelling: SpellingConfig {
            dictionary: raw.spelling.dictionary,
            custom_words,
        },
    })
}

fn check_url(name: &str, url: &str) -> Result<(), ConfigError> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidUrl {
            name: name.to_string(),
            url: url.to_string(),
        })
}
