mod common;

use common::{blog_browser, step_env, ABOUT, HOME};
use sitecheck_drivers::site_browser::fake::{FakeBrowser, FakeElement, FakePage};
use sitecheck_steps::{
    default_registry, parse_feature, ScenarioRunner, ScenarioStatus, SoftFailure, StepStatus,
};

fn runner(browser: &FakeBrowser) -> ScenarioRunner<FakeBrowser> {
    common::init_test_tracing();
    ScenarioRunner::new(
        browser.clone(),
        default_registry::<FakeBrowser>().expect("builtin steps compile"),
        step_env(),
    )
}

fn scenario(body: &str) -> sitecheck_steps::Scenario {
    let source = format!("Feature: blog\n  Scenario: under test\n{body}");
    parse_feature(&source)
        .expect("feature parses")
        .scenarios
        .remove(0)
}

#[tokio::test]
async fn browsing_the_blog_passes() {
    let browser = blog_browser();
    let report = runner(&browser)
        .run(&scenario(
            r#"
    Given I am at main blog site
    Then I should see the title Rodney Gomes
    And I should see the links about, projects
    And I should see the headers Rodney Gomes, Recent posts
    And I should see everything spelled correctly
    When I click on about
    Then I should see the title About
    When I click back
    Then I should see the title Rodney Gomes
"#,
        ))
        .await;

    assert_eq!(report.status, ScenarioStatus::Passed, "{report:#?}");
    assert!(report.steps.iter().all(|s| s.status == StepStatus::Passed));
    assert_eq!(browser.clicks(), vec!["About".to_string()]);
    assert_eq!(browser.current_url().as_deref(), Some(HOME));
    assert_eq!(browser.launches(), 1);
    assert_eq!(browser.close_window_calls(), 1);
    assert_eq!(browser.stop_calls(), 1);
}

#[tokio::test]
async fn literal_urls_bypass_the_alias_table() {
    let browser = blog_browser();
    let report = runner(&browser)
        .run(&scenario(&format!(
            "    Given I am at {ABOUT}\n    Then I should see the title About\n"
        )))
        .await;

    assert!(report.passed(), "{report:#?}");
    assert_eq!(browser.current_url().as_deref(), Some(ABOUT));
}

#[tokio::test]
async fn and_after_given_runs_a_when_step() {
    let browser = blog_browser();
    let report = runner(&browser)
        .run(&scenario(
            r#"
    Given I am at main blog site
    And I click on about
    Then I should see the title About
"#,
        ))
        .await;

    assert!(report.passed(), "{report:#?}");
    assert_eq!(report.steps[1].keyword, "And");
    assert_eq!(browser.current_url().as_deref(), Some(ABOUT));
}

#[tokio::test]
async fn missing_element_aborts_but_still_tears_down() {
    let browser = blog_browser();
    let report = runner(&browser)
        .run(&scenario(
            r#"
    Given I am at main blog site
    Then I should see the links about, contact
    And I should see the title Rodney Gomes
"#,
        ))
        .await;

    assert_eq!(report.status, ScenarioStatus::Errored);
    assert_eq!(
        report.error.as_deref(),
        Some("Can't find the element contact")
    );
    assert!(matches!(report.steps[1].status, StepStatus::Failed(_)));
    assert_eq!(report.steps[2].status, StepStatus::Skipped);
    assert_eq!(browser.close_window_calls(), 1);
    assert_eq!(browser.stop_calls(), 1);
}

#[tokio::test]
async fn headings_are_not_links() {
    let browser = blog_browser();
    let report = runner(&browser)
        .run(&scenario(
            "    Given I am at main blog site\n    Then I should see the link Recent posts\n",
        ))
        .await;

    assert_eq!(report.status, ScenarioStatus::Errored);
    assert!(report
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("Assertion failed")));
}

#[tokio::test]
async fn spelling_mistakes_fail_softly_and_the_scenario_continues() {
    let browser = FakeBrowser::new().with_page(
        HOME,
        FakePage::new("Rodney Gomes")
            .with(FakeElement::new("p", "Teh notes on Python"))
            .with(FakeElement::new("p", "42 posts: teh end")),
    );
    let report = runner(&browser)
        .run(&scenario(
            r#"
    Given I am at main blog site
    Then I should see everything spelled correctly
    And I should see the title Rodney Gomes
"#,
        ))
        .await;

    assert_eq!(report.status, ScenarioStatus::Failed);
    assert_eq!(
        report.soft_failures,
        vec![SoftFailure::Spelling {
            misspelled: vec!["Teh".into(), "teh".into(), "end".into()]
        }]
    );
    assert!(matches!(report.steps[1].status, StepStatus::SoftFailed(_)));
    assert_eq!(report.steps[2].status, StepStatus::Passed);
    assert_eq!(browser.stop_calls(), 1);
}

#[tokio::test]
async fn failing_window_close_still_stops_the_session() {
    let browser = blog_browser().failing_close_window();
    let report = runner(&browser)
        .run(&scenario("    Given I am at main blog site\n"))
        .await;

    assert!(report.passed());
    assert_eq!(browser.close_window_calls(), 1);
    assert_eq!(browser.stop_calls(), 1);
}

#[tokio::test]
async fn unmatched_step_errors_the_scenario() {
    let browser = blog_browser();
    let report = runner(&browser)
        .run(&scenario("    Given I am at main blog site\n    When I dance\n"))
        .await;

    assert_eq!(report.status, ScenarioStatus::Errored);
    assert_eq!(browser.stop_calls(), 1);
}

#[tokio::test]
async fn every_scenario_gets_its_own_session() {
    let browser = blog_browser();
    let feature = parse_feature(
        r#"
Feature: Blog
  Background:
    Given I am at main blog site

  Scenario: title
    Then I should see the title Rodney Gomes

  Scenario: broken
    Then I should see the title Someone Else
"#,
    )
    .unwrap();

    let reports = runner(&browser).run_feature(&feature).await;

    assert_eq!(reports.len(), 2);
    assert!(reports[0].passed());
    assert_eq!(reports[1].status, ScenarioStatus::Errored);
    assert_eq!(browser.launches(), 2);
    assert_eq!(browser.close_window_calls(), 2);
    assert_eq!(browser.stop_calls(), 2);
}

#[tokio::test]
async fn reports_serialise_for_tooling() {
    let browser = FakeBrowser::new().with_page(
        HOME,
        FakePage::new("Rodney Gomes").with(FakeElement::new("p", "Helo")),
    );
    let report = runner(&browser)
        .run(&scenario(
            "    Given I am at main blog site\n    Then I should see everything spelled correctly\n",
        ))
        .await;

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "failed");
    assert_eq!(json["soft_failures"][0]["kind"], "spelling");
    assert_eq!(json["soft_failures"][0]["misspelled"][0], "Helo");
    assert_eq!(json["steps"][1]["status"]["status"], "soft_failed");
}
