//! Natural-language test steps for browsing a site.
//!
//! Step text such as `Given I am at main blog site` is matched against an
//! explicit, ordered [`StepRegistry`] and dispatched to async handlers that
//! drive a [`Browser`](sitecheck_drivers::Browser). Scenarios come from
//! feature files ([`feature`]) and run through the [`ScenarioRunner`], which
//! always tears the browser session down afterwards.
pub mod context;
pub mod feature;
pub mod registry;
pub mod runner;
pub mod steps;

pub use context::{SoftFailure, StepContext, StepEnv, StepOutcome};
pub use feature::{parse_feature, Feature, FeatureFileError, ParseError, Scenario, Step};
pub use registry::{StepArg, StepArgs, StepKind, StepRegistry};
pub use runner::{ScenarioReport, ScenarioRunner, ScenarioStatus, StepReport, StepStatus};
pub use steps::default_registry;
