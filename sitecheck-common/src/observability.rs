//! Process-wide `tracing` setup for the `sitecheck` binary and test suites.
//!
//! Events go to a file that rolls over at midnight, and optionally to
//! `stderr` too. The subscriber is global, so only the first
//! [`init_logging`] call installs anything; every call returns the path of
//! today's log file.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Keeps the non-blocking file writer flushing for the life of the process.
static FILE_WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static ACTIVE_LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

/// Environment variable consulted for the log directory when none is given.
pub const LOG_DIR_ENV: &str = "SITECHECK_LOG_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// `text` or `json`, any case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Names the log file and the fallback directory.
    pub app_name: &'static str,
    /// Where log files go. Unset: `SITECHECK_LOG_DIR`, then
    /// `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Mirror every event to `stderr`.
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Filter directives used when `RUST_LOG` is not set.
    pub default_filter: &'static str,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "sitecheck",
            log_dir: None,
            emit_stderr: true,
            format: LogFormat::Text,
            default_filter: "info",
        }
    }
}

impl LogConfig {
    fn directory(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return expand_home(dir);
        }
        match std::env::var(LOG_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => expand_home(Path::new(&dir)),
            _ => fallback_dir(self.app_name),
        }
    }
}

/// Install the global subscriber and return today's log file.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = ACTIVE_LOG_FILE.get() {
        return Ok(path.clone());
    }

    let dir = config.directory();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let file_stem = format!("{}.log", config.app_name);
    let today_file = dated_log_file(&dir, &file_stem, Local::now().date_naive());

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &file_stem));
    let _ = FILE_WRITER_GUARD.set(guard);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter));

    let file = file_layer(config.format, writer);
    let stderr = config.emit_stderr.then(|| stderr_layer(config.format));

    tracing_subscriber::registry()
        .with(filter)
        .with(file)
        .with(stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install tracing subscriber: {e}"))?;

    let _ = ACTIVE_LOG_FILE.set(today_file.clone());
    Ok(today_file)
}

fn file_layer<S>(format: LogFormat, writer: NonBlocking) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(false).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

fn stderr_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    }
}

/// The rolling appender names files `<stem>.<YYYY-MM-DD>`.
fn dated_log_file(dir: &Path, stem: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{stem}.{}", date.format("%Y-%m-%d")))
}

fn expand_home(path: &Path) -> PathBuf {
    let home = std::env::var_os("HOME");
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

fn fallback_dir(app_name: &str) -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".local/share"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(app_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config(log_dir: Option<PathBuf>) -> LogConfig {
        LogConfig {
            log_dir,
            ..LogConfig::default()
        }
    }

    #[test]
    #[serial]
    fn explicit_dir_beats_environment() {
        let tmp = tempfile::tempdir().unwrap();
        temp_env::with_var(LOG_DIR_ENV, Some("/var/log/elsewhere"), || {
            assert_eq!(config(Some(tmp.path().into())).directory(), tmp.path());
        });
    }

    #[test]
    #[serial]
    fn environment_dir_beats_home() {
        temp_env::with_vars(
            [(LOG_DIR_ENV, Some("~/logs")), ("HOME", Some("/home/tester"))],
            || assert_eq!(config(None).directory(), PathBuf::from("/home/tester/logs")),
        );
    }

    #[test]
    #[serial]
    fn falls_back_to_local_share() {
        temp_env::with_vars(
            [(LOG_DIR_ENV, None), ("HOME", Some("/home/tester"))],
            || {
                assert_eq!(
                    config(None).directory(),
                    PathBuf::from("/home/tester/.local/share/sitecheck")
                )
            },
        );
    }

    #[test]
    fn log_file_carries_the_date_suffix() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(
            dated_log_file(Path::new("/tmp/logs"), "sitecheck.log", date),
            PathBuf::from("/tmp/logs/sitecheck.log.2026-03-09")
        );
    }

    #[test]
    fn parses_log_formats() {
        assert_eq!(LogFormat::parse(" JSON "), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("text"), Some(LogFormat::Text));
        assert_eq!(LogFormat::parse("yaml"), None);
    }

    #[test]
    fn relative_paths_are_left_alone() {
        assert_eq!(expand_home(Path::new("logs/run")), PathBuf::from("logs/run"));
    }
}
