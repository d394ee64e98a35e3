use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use sitecheck_common::observability::{init_logging, LogConfig};
use sitecheck_config::{SiteConfig, SiteConfigLoader};
use sitecheck_drivers::site_browser::driver::{WebDriverBrowser, WebDriverFactory};
use sitecheck_spelling::{ContentValidator, CustomWordSet, WordList};
use sitecheck_steps::{
    default_registry, Feature, ScenarioReport, ScenarioRunner, ScenarioStatus, StepEnv,
};
use std::process::ExitCode;
use tracing::{debug, info};

mod cli;

const DEFAULT_CONFIG_FILE: &str = "sitecheck.yaml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Config first: an unknown ENV must stop us before anything else runs.
    let loader = match &cli.config {
        Some(path) => SiteConfigLoader::new().with_file(path),
        None => SiteConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let cfg: SiteConfig = loader.load()?;

    let log_path = init_logging(LogConfig {
        emit_stderr: cli.stderr,
        format: cli.log_format,
        ..LogConfig::default()
    })?;
    info!(
        browser = %cfg.browser,
        environment = %cfg.environment,
        log = %log_path.display(),
        "sitecheck starting"
    );
    for (name, url) in cfg.aliases.iter() {
        debug!(%name, %url, "site alias");
    }

    let runner = build_runner(&cfg)?;

    let mut failed = 0usize;
    let mut total = 0usize;
    for path in &cli.features {
        let feature = Feature::from_file(path)?;
        for report in runner.run_feature(&feature).await {
            total += 1;
            if !report.passed() {
                failed += 1;
            }
            println!("{}", summary_line(&feature, &report));
        }
    }

    info!(total, failed, "run finished");
    println!("{} scenarios, {} failed", total, failed);
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn build_runner(cfg: &SiteConfig) -> Result<ScenarioRunner<WebDriverFactory>> {
    let dictionary = WordList::from_file(&cfg.spelling.dictionary).with_context(|| {
        format!(
            "loading dictionary (set SITECHECK_SPELLING__DICTIONARY to override {})",
            cfg.spelling.dictionary.display()
        )
    })?;
    let custom = CustomWordSet::new(cfg.spelling.custom_words.iter());
    let env = StepEnv::from_config(cfg, ContentValidator::new(dictionary, custom));
    let registry = default_registry::<WebDriverBrowser>()?;
    let factory = WebDriverFactory::new(cfg.browser, cfg.webdriver_endpoint(), cfg.headless);
    Ok(ScenarioRunner::new(factory, registry, env))
}

fn summary_line(feature: &Feature, report: &ScenarioReport) -> String {
    let status = match report.status {
        ScenarioStatus::Passed => "PASS",
        ScenarioStatus::Failed => "FAIL",
        ScenarioStatus::Errored => "ERROR",
    };
    let mut line = format!("{status:<5} {} / {}", feature.name, report.name);
    if let Some(err) = &report.error {
        line.push_str(&format!(": {err}"));
    } else if let Some(soft) = report.soft_failures.first() {
        line.push_str(&format!(": {soft}"));
    }
    line
}
