//! Ordered step definitions and their dispatch.
use crate::context::{StepContext, StepOutcome};
use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use serde::Serialize;
use sitecheck_common::{Result, SiteCheckError};
use sitecheck_drivers::Browser;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Keyword a step definition answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepKind {
    Given,
    When,
    Then,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
        })
    }
}

/// One captured argument, after any named transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepArg {
    Text(String),
    List(Vec<String>),
}

/// Arguments captured from step text, in capture-group order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepArgs(Vec<StepArg>);

impl StepArgs {
    pub fn new(args: Vec<StepArg>) -> Self {
        Self(args)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn text(&self, index: usize) -> Result<&str> {
        match self.0.get(index) {
            Some(StepArg::Text(s)) => Ok(s),
            other => Err(SiteCheckError::InvalidStepArgs(format!(
                "expected text at {index}, got {other:?}"
            ))),
        }
    }

    pub fn list(&self, index: usize) -> Result<&[String]> {
        match self.0.get(index) {
            Some(StepArg::List(items)) => Ok(items),
            other => Err(SiteCheckError::InvalidStepArgs(format!(
                "expected list at {index}, got {other:?}"
            ))),
        }
    }
}

/// A `{placeholder}` usable in step patterns, with the text it captures and
/// how that capture is converted.
#[derive(Debug, Clone)]
pub struct NamedTransform {
    placeholder: String,
    pattern: String,
    convert: fn(&str) -> StepArg,
}

type Handler<B> =
    Arc<dyn Fn(StepContext<B>, StepArgs) -> BoxFuture<'static, Result<StepOutcome>> + Send + Sync>;
type Hook<B> = Arc<dyn Fn(Arc<B>) -> BoxFuture<'static, Result<()>> + Send + Sync>;

struct StepDefinition<B: Browser> {
    kind: StepKind,
    source: String,
    regex: Regex,
    /// Transform index per capture group (group 0 excluded).
    group_transforms: Vec<Option<usize>>,
    handler: Handler<B>,
}

/// Step definitions in registration order plus `After` hooks.
///
/// Patterns are anchored at both ends. When several definitions match the
/// same text, the one registered first wins, whatever keyword they were
/// registered under.
pub struct StepRegistry<B: Browser> {
    transforms: Vec<NamedTransform>,
    steps: Vec<StepDefinition<B>>,
    after: Vec<Hook<B>>,
}

impl<B: Browser> Default for StepRegistry<B> {
    fn default() -> Self {
        Self {
            transforms: Vec::new(),
            steps: Vec::new(),
            after: Vec::new(),
        }
    }
}

impl<B: Browser + 'static> StepRegistry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `{name}`. `pattern` must not contain capture groups of its own.
    pub fn transform(
        &mut self,
        placeholder: &str,
        pattern: &str,
        convert: fn(&str) -> StepArg,
    ) -> &mut Self {
        self.transforms.push(NamedTransform {
            placeholder: placeholder.to_string(),
            pattern: pattern.to_string(),
            convert,
        });
        self
    }

    pub fn given<H, Fut>(&mut self, pattern: &str, handler: H) -> Result<&mut Self>
    where
        H: Fn(StepContext<B>, StepArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<StepOutcome>> + Send + 'static,
    {
        self.register(StepKind::Given, pattern, handler)
    }

    pub fn when<H, Fut>(&mut self, pattern: &str, handler: H) -> Result<&mut Self>
    where
        H: Fn(StepContext<B>, StepArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<StepOutcome>> + Send + 'static,
    {
        self.register(StepKind::When, pattern, handler)
    }

    pub fn then<H, Fut>(&mut self, pattern: &str, handler: H) -> Result<&mut Self>
    where
        H: Fn(StepContext<B>, StepArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<StepOutcome>> + Send + 'static,
    {
        self.register(StepKind::Then, pattern, handler)
    }

    /// Run `hook` once after every scenario, whatever its outcome.
    pub fn after<H, Fut>(&mut self, hook: H) -> &mut Self
    where
        H: Fn(Arc<B>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.after.push(Arc::new(move |browser| hook(browser).boxed()));
        self
    }

    pub fn register<H, Fut>(&mut self, kind: StepKind, pattern: &str, handler: H) -> Result<&mut Self>
    where
        H: Fn(StepContext<B>, StepArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<StepOutcome>> + Send + 'static,
    {
        let (regex, group_transforms) = self.compile(pattern)?;
        self.steps.push(StepDefinition {
            kind,
            source: pattern.to_string(),
            regex,
            group_transforms,
            handler: Arc::new(move |ctx, args| handler(ctx, args).boxed()),
        });
        Ok(self)
    }

    fn compile(&self, pattern: &str) -> Result<(Regex, Vec<Option<usize>>)> {
        let mut expanded = pattern.to_string();
        for (index, transform) in self.transforms.iter().enumerate() {
            let mut occurrence = 0;
            while let Some(at) = expanded.find(&transform.placeholder) {
                let group = format!("(?P<xf{index}_{occurrence}>{})", transform.pattern);
                expanded.replace_range(at..at + transform.placeholder.len(), &group);
                occurrence += 1;
            }
        }

        let regex = Regex::new(&format!("^(?:{expanded})$")).map_err(|e| {
            SiteCheckError::Config(format!("invalid step pattern {pattern:?}: {e}"))
        })?;

        let group_transforms = regex
            .capture_names()
            .skip(1)
            .map(|name| {
                name.and_then(|n| n.strip_prefix("xf"))
                    .and_then(|rest| rest.split('_').next())
                    .and_then(|index| index.parse().ok())
            })
            .collect();
        Ok((regex, group_transforms))
    }

    /// Match `text` against every definition in registration order. The
    /// keyword a definition was registered under does not restrict matching,
    /// so `And I click on about` after a `Given` still finds the `When` step;
    /// `kind` only labels the error. Returns the pattern that matched and the
    /// converted arguments.
    pub fn find(&self, kind: StepKind, text: &str) -> Result<(&str, StepArgs)> {
        self.lookup(kind, text)
            .map(|(def, args)| (def.source.as_str(), args))
    }

    fn lookup(&self, kind: StepKind, text: &str) -> Result<(&StepDefinition<B>, StepArgs)> {
        let text = text.trim();
        self.steps
            .iter()
            .find_map(|def| {
                def.regex
                    .captures(text)
                    .map(|caps| (def, self.arguments(def, &caps)))
            })
            .ok_or_else(|| SiteCheckError::StepNotMatched(format!("{kind} {text}")))
    }

    fn arguments(&self, def: &StepDefinition<B>, caps: &regex::Captures<'_>) -> StepArgs {
        let args = def
            .group_transforms
            .iter()
            .enumerate()
            .filter_map(|(i, transform)| {
                let raw = caps.get(i + 1)?.as_str();
                Some(match transform.and_then(|t| self.transforms.get(t)) {
                    Some(t) => (t.convert)(raw),
                    None => StepArg::Text(raw.to_string()),
                })
            })
            .collect();
        StepArgs::new(args)
    }

    /// Find the handler for `text` and run it.
    pub async fn dispatch(
        &self,
        ctx: StepContext<B>,
        kind: StepKind,
        text: &str,
    ) -> Result<StepOutcome> {
        let (def, args) = self.lookup(kind, text)?;
        tracing::debug!(
            target: "steps",
            written_as = %kind,
            defined_as = %def.kind,
            pattern = %def.source,
            ?args,
            "dispatching"
        );
        (def.handler)(ctx, args).await
    }

    pub(crate) fn after_hooks(&self) -> &[Hook<B>] {
        &self.after
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Comma-separated names, trimmed, empty pieces dropped.
pub fn split_list(raw: &str) -> StepArg {
    StepArg::List(
        raw.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
    )
}
