//! The site-browsing step vocabulary.
use crate::context::{SoftFailure, StepContext, StepOutcome};
use crate::registry::{split_list, StepArgs, StepRegistry};
use sitecheck_common::Result;
use sitecheck_drivers::{Browser, Selector};
use std::sync::Arc;
use tracing::{info, warn};

/// Registry holding every built-in step, the `{list}` transform and the
/// session teardown hook.
pub fn default_registry<B: Browser + 'static>() -> Result<StepRegistry<B>> {
    let mut registry = StepRegistry::new();
    registry
        .transform("{list}", r"[\w, ]+", split_list)
        .after(teardown::<B>);
    registry
        .given("I am at (.*)", i_am_at::<B>)?
        .then("I should see the title (.*)", should_see_the_title::<B>)?
        .then("I should see the links? {list}", should_see_the_links::<B>)?
        .then("I should see the headers? {list}", should_see_the_headers::<B>)?
        .then("I should see everything spelled correctly", verify_page_spelling::<B>)?
        .when("I click back", click_back::<B>)?
        .when("I click on (.*)", click_on::<B>)?;
    Ok(registry)
}

/// Close the window and end the session. Both calls are made even if the
/// first one fails; the first error is returned.
pub async fn teardown<B: Browser>(browser: Arc<B>) -> Result<()> {
    let closed = browser.close_window().await;
    let stopped = browser.stop().await;
    closed.and(stopped)
}

async fn i_am_at<B: Browser>(ctx: StepContext<B>, args: StepArgs) -> Result<StepOutcome> {
    let name = args.text(0)?;
    let url = ctx.env.aliases.resolve_url(name);
    info!(target: "steps", %name, %url, "opening site");
    ctx.browser.go_to(url).await?;
    Ok(StepOutcome::Passed)
}

async fn should_see_the_title<B: Browser>(
    ctx: StepContext<B>,
    args: StepArgs,
) -> Result<StepOutcome> {
    ctx.browser.assert_title(args.text(0)?).await?;
    Ok(StepOutcome::Passed)
}

async fn should_see_the_links<B: Browser>(
    ctx: StepContext<B>,
    args: StepArgs,
) -> Result<StepOutcome> {
    for link in args.list(0)? {
        let element = ctx.env.resolver.resolve(ctx.browser.as_ref(), link).await?;
        ctx.browser.assert_link(&element).await?;
    }
    Ok(StepOutcome::Passed)
}

async fn should_see_the_headers<B: Browser>(
    ctx: StepContext<B>,
    args: StepArgs,
) -> Result<StepOutcome> {
    for header in args.list(0)? {
        ctx.browser.get(&Selector::heading(header)).await?;
    }
    Ok(StepOutcome::Passed)
}

async fn verify_page_spelling<B: Browser>(
    ctx: StepContext<B>,
    _args: StepArgs,
) -> Result<StepOutcome> {
    let body = ctx.browser.get(&Selector::Tag("body".to_string())).await?;
    let text = ctx.browser.text_of(&body).await?;
    let result = ctx.env.validator.validate(&text);
    if result.is_ok() {
        info!(target: "steps", checked = result.checked, "spelling ok");
        return Ok(StepOutcome::Passed);
    }
    warn!(target: "steps", misspelled = ?result.misspelled, "misspelled words");
    Ok(StepOutcome::SoftFailure(SoftFailure::Spelling {
        misspelled: result.misspelled,
    }))
}

async fn click_back<B: Browser>(ctx: StepContext<B>, _args: StepArgs) -> Result<StepOutcome> {
    ctx.browser.go_back().await?;
    Ok(StepOutcome::Passed)
}

async fn click_on<B: Browser>(ctx: StepContext<B>, args: StepArgs) -> Result<StepOutcome> {
    let token = args.text(0)?;
    let element = ctx.env.resolver.resolve(ctx.browser.as_ref(), token).await?;
    ctx.browser.click(&element).await?;
    Ok(StepOutcome::Passed)
}
