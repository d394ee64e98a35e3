#![allow(dead_code)]
use std::sync::OnceLock;

use sitecheck_common::observability::{init_logging, LogConfig, LogFormat};
use sitecheck_config::{AliasTable, Environment};
use sitecheck_drivers::site_browser::fake::{FakeBrowser, FakeElement, FakePage};
use sitecheck_drivers::ElementResolver;
use sitecheck_spelling::{ContentValidator, CustomWordSet, WordList};
use sitecheck_steps::StepEnv;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub const HOME: &str = "http://localhost:4000";
pub const ABOUT: &str = "http://localhost:4000/about";

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "sitecheck-tests",
            log_dir: Some(std::env::temp_dir().join("sitecheck-tests")),
            emit_stderr: true,
            format: if std::env::var("SITECHECK_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug",
        };

        init_logging(config).unwrap_or_default()
    });
}

pub fn blog_browser() -> FakeBrowser {
    FakeBrowser::new()
        .with_page(
            HOME,
            FakePage::new("Rodney Gomes")
                .with(FakeElement::new("h1", "Rodney Gomes"))
                .with(FakeElement::link("About", ABOUT).with_id("about"))
                .with(FakeElement::link("Projects", "/projects").with_class("projects"))
                .with(FakeElement::new("h2", "Recent posts"))
                .with(FakeElement::new("p", "Notes on Python and Prolog: well-known tricks")),
        )
        .with_page(
            ABOUT,
            FakePage::new("About")
                .with(FakeElement::new("h1", "About"))
                .with(FakeElement::new("p", "I wrote sst and freshen steps on GitHub")),
        )
}

pub fn step_env() -> StepEnv {
    let dictionary = WordList::from_words([
        "rodney", "about", "projects", "recent", "posts", "notes", "on", "and", "well", "known",
        "tricks", "i", "wrote", "steps",
    ]);
    let custom = CustomWordSet::new(["prolog", "python", "sst", "freshen", "gomes", "GitHub"]);
    StepEnv::new(
        AliasTable::for_environment(Environment::Test),
        ElementResolver::new(),
        ContentValidator::new(dictionary, custom),
    )
}
