use clap::Parser;
use sitecheck_common::observability::LogFormat;
use std::path::PathBuf;

/// Run browser scenarios from feature files against a site.
#[derive(Parser, Debug)]
#[command(name = "sitecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML configuration file. Defaults to `sitecheck.yaml` when present.
    #[arg(short, long, env = "SITECHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log encoding: text or json
    #[arg(long, default_value = "text", value_parser = parse_log_format)]
    pub log_format: LogFormat,

    /// Mirror log events to stderr as well as the log file
    #[arg(long)]
    pub stderr: bool,

    /// Feature files to run, in order
    #[arg(required = true)]
    pub features: Vec<PathBuf>,
}

fn parse_log_format(raw: &str) -> Result<LogFormat, String> {
    LogFormat::parse(raw).ok_or_else(|| format!("unknown log format {raw}, expected text or json"))
}
