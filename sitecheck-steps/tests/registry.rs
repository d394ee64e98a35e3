mod common;

use common::{blog_browser, step_env, HOME};
use sitecheck_common::{Result, SiteCheckError};
use sitecheck_drivers::site_browser::fake::FakeBrowser;
use sitecheck_drivers::Browser;
use sitecheck_steps::registry::split_list;
use sitecheck_steps::{
    default_registry, StepArg, StepArgs, StepContext, StepKind, StepOutcome, StepRegistry,
};
use std::sync::Arc;

async fn passes(_ctx: StepContext<FakeBrowser>, _args: StepArgs) -> Result<StepOutcome> {
    Ok(StepOutcome::Passed)
}

#[test]
fn list_placeholder_yields_trimmed_names() {
    let registry = default_registry::<FakeBrowser>().unwrap();

    let (pattern, args) = registry
        .find(StepKind::Then, "I should see the links about, projects ,archive")
        .unwrap();

    assert_eq!(pattern, "I should see the links? {list}");
    assert_eq!(
        args.list(0).unwrap(),
        ["about".to_string(), "projects".into(), "archive".into()]
    );
}

#[test]
fn singular_and_plural_forms_match() {
    let registry = default_registry::<FakeBrowser>().unwrap();
    let (_, args) = registry
        .find(StepKind::Then, "I should see the header Recent posts")
        .unwrap();
    assert_eq!(args.list(0).unwrap(), ["Recent posts".to_string()]);
}

#[test]
fn plain_groups_capture_text() {
    let registry = default_registry::<FakeBrowser>().unwrap();
    let (pattern, args) = registry
        .find(StepKind::Given, "I am at main blog site")
        .unwrap();
    assert_eq!(pattern, "I am at (.*)");
    assert_eq!(args.text(0).unwrap(), "main blog site");
}

#[test]
fn keyword_does_not_restrict_matching() {
    let registry = default_registry::<FakeBrowser>().unwrap();
    let (pattern, _) = registry
        .find(StepKind::Then, "I am at main blog site")
        .unwrap();
    assert_eq!(pattern, "I am at (.*)");
}

#[test]
fn unmatched_text_reports_the_written_keyword() {
    let registry = default_registry::<FakeBrowser>().unwrap();
    let err = registry.find(StepKind::Then, "I fly away").unwrap_err();
    assert!(matches!(err, SiteCheckError::StepNotMatched(ref t) if t == "Then I fly away"));
}

#[test]
fn patterns_are_anchored() {
    let registry = default_registry::<FakeBrowser>().unwrap();
    assert!(registry.find(StepKind::When, "I click back twice").is_err());
    assert!(registry.find(StepKind::When, "Then I click back").is_err());
}

#[test]
fn first_registered_definition_wins() {
    let mut registry = StepRegistry::<FakeBrowser>::new();
    registry
        .when("I click (.*)", passes)
        .unwrap()
        .when("I click back", passes)
        .unwrap();
    let (pattern, _) = registry.find(StepKind::When, "I click back").unwrap();
    assert_eq!(pattern, "I click (.*)");
}

#[test]
fn transforms_can_be_mixed_with_plain_groups() {
    let mut registry = StepRegistry::<FakeBrowser>::new();
    registry.transform("{list}", r"[\w, ]+", split_list);
    registry
        .then("on (.*) I see {list}", passes)
        .unwrap();

    let (_, args) = registry
        .find(StepKind::Then, "on the home page I see a, b")
        .unwrap();
    assert_eq!(
        args,
        StepArgs::new(vec![
            StepArg::Text("the home page".into()),
            StepArg::List(vec!["a".into(), "b".into()]),
        ])
    );
}

#[test]
fn invalid_pattern_is_a_config_error() {
    let mut registry = StepRegistry::<FakeBrowser>::new();
    let err = registry.given("I am at (", passes).err().unwrap();
    assert!(matches!(err, SiteCheckError::Config(_)));
}

#[tokio::test]
async fn dispatch_runs_the_matching_handler() {
    common::init_test_tracing();
    let registry = default_registry::<FakeBrowser>().unwrap();
    let browser = Arc::new(blog_browser());
    let ctx = StepContext::new(browser.clone(), Arc::new(step_env()));

    let outcome = registry
        .dispatch(ctx, StepKind::Given, "I am at main blog site")
        .await
        .unwrap();

    assert_eq!(outcome, StepOutcome::Passed);
    assert_eq!(browser.current_url().as_deref(), Some(HOME));
    assert_eq!(browser.title().await.unwrap(), "Rodney Gomes");
}

#[tokio::test]
async fn dispatch_without_match_is_an_error() {
    let registry = default_registry::<FakeBrowser>().unwrap();
    let ctx = StepContext::new(Arc::new(blog_browser()), Arc::new(step_env()));

    let err = registry
        .dispatch(ctx, StepKind::When, "I dance")
        .await
        .unwrap_err();
    assert!(matches!(err, SiteCheckError::StepNotMatched(ref t) if t == "When I dance"));
}
