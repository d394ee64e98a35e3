//! Sequential scenario execution with guaranteed teardown.
use crate::context::{SoftFailure, StepContext, StepEnv, StepOutcome};
use crate::feature::{Feature, Scenario, Step};
use crate::registry::StepRegistry;
use serde::Serialize;
use sitecheck_drivers::BrowserFactory;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    SoftFailed(String),
    Failed(String),
    /// Not run because an earlier step failed hard.
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub keyword: String,
    pub text: String,
    pub line: usize,
    pub status: StepStatus,
}

impl StepReport {
    fn new(step: &Step, status: StepStatus) -> Self {
        Self {
            keyword: step.keyword.clone(),
            text: step.text.clone(),
            line: step.line,
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    /// Every step ran but at least one reported a soft failure.
    Failed,
    /// A step (or the session launch) raised an error.
    Errored,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub status: ScenarioStatus,
    pub steps: Vec<StepReport>,
    pub soft_failures: Vec<SoftFailure>,
    pub error: Option<String>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

/// Runs scenarios one at a time, each in a fresh browser session.
///
/// Steps run in order. An error aborts the rest of the scenario; a soft
/// failure is recorded and the scenario carries on. The registry's `After`
/// hooks run exactly once per launched session, pass or fail.
pub struct ScenarioRunner<F: BrowserFactory> {
    factory: F,
    registry: Arc<StepRegistry<F::Browser>>,
    env: Arc<StepEnv>,
}

impl<F> ScenarioRunner<F>
where
    F: BrowserFactory,
    F::Browser: 'static,
{
    pub fn new(factory: F, registry: StepRegistry<F::Browser>, env: StepEnv) -> Self {
        Self {
            factory,
            registry: Arc::new(registry),
            env: Arc::new(env),
        }
    }

    pub async fn run_feature(&self, feature: &Feature) -> Vec<ScenarioReport> {
        let mut reports = Vec::with_capacity(feature.scenarios.len());
        for scenario in &feature.scenarios {
            let span = info_span!("scenario", feature = %feature.name, scenario = %scenario.name);
            reports.push(self.run(scenario).instrument(span).await);
        }
        reports
    }

    pub async fn run(&self, scenario: &Scenario) -> ScenarioReport {
        let browser = match self.factory.launch().await {
            Ok(browser) => Arc::new(browser),
            Err(err) => {
                error!(target: "steps", %err, "could not start browser session");
                return ScenarioReport {
                    name: scenario.name.clone(),
                    status: ScenarioStatus::Errored,
                    steps: scenario
                        .steps
                        .iter()
                        .map(|s| StepReport::new(s, StepStatus::Skipped))
                        .collect(),
                    soft_failures: Vec::new(),
                    error: Some(err.to_string()),
                };
            }
        };

        let ctx = StepContext::new(browser.clone(), self.env.clone());
        let mut steps = Vec::with_capacity(scenario.steps.len());
        let mut soft_failures = Vec::new();
        let mut failure: Option<String> = None;

        for step in &scenario.steps {
            if failure.is_some() {
                steps.push(StepReport::new(step, StepStatus::Skipped));
                continue;
            }
            info!(target: "steps", keyword = %step.keyword, text = %step.text, "step");
            let status = match self
                .registry
                .dispatch(ctx.clone(), step.kind, &step.text)
                .await
            {
                Ok(StepOutcome::Passed) => StepStatus::Passed,
                Ok(StepOutcome::SoftFailure(soft)) => {
                    warn!(target: "steps", line = step.line, %soft, "step failed softly");
                    let detail = soft.to_string();
                    soft_failures.push(soft);
                    StepStatus::SoftFailed(detail)
                }
                Err(err) => {
                    error!(target: "steps", line = step.line, %err, "step failed");
                    failure = Some(err.to_string());
                    StepStatus::Failed(err.to_string())
                }
            };
            steps.push(StepReport::new(step, status));
        }

        for hook in self.registry.after_hooks() {
            if let Err(err) = hook(browser.clone()).await {
                warn!(target: "steps", %err, "after hook failed");
            }
        }

        let status = if failure.is_some() {
            ScenarioStatus::Errored
        } else if !soft_failures.is_empty() {
            ScenarioStatus::Failed
        } else {
            ScenarioStatus::Passed
        };
        info!(target: "steps", scenario = %scenario.name, ?status, "scenario finished");

        ScenarioReport {
            name: scenario.name.clone(),
            status,
            steps,
            soft_failures,
            error: failure,
        }
    }
}
