//! The browser automation contract and its implementations.
use async_trait::async_trait;
use sitecheck_common::{Result, SiteCheckError};

pub mod driver;
pub mod fake;
pub mod selector;

pub use selector::{xpath_literal, Selector, SelectorKind};

/// Narrow automation surface used by step handlers.
///
/// Every query runs against the live page; nothing is cached between calls.
/// When a selector matches several elements, [`get`](Browser::get) returns
/// the first one in document order.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Opaque handle to an element, valid for the current page.
    type Element: Clone + Send + Sync + 'static;

    async fn go_to(&self, url: &str) -> Result<()>;

    async fn go_back(&self) -> Result<()>;

    async fn title(&self) -> Result<String>;

    /// Whether at least one element matches.
    async fn exists(&self, selector: &Selector) -> Result<bool>;

    /// First matching element, or [`SiteCheckError::ElementNotFound`].
    async fn get(&self, selector: &Selector) -> Result<Self::Element>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Rendered text of the element and its descendants.
    async fn text_of(&self, element: &Self::Element) -> Result<String>;

    /// Lowercase tag name.
    async fn tag_name(&self, element: &Self::Element) -> Result<String>;

    async fn close_window(&self) -> Result<()>;

    /// End the session.
    async fn stop(&self) -> Result<()>;

    async fn assert_title(&self, expected: &str) -> Result<()> {
        let actual = self.title().await?;
        if actual == expected {
            Ok(())
        } else {
            Err(SiteCheckError::assertion(format!(
                "title is {actual:?}, expected {expected:?}"
            )))
        }
    }

    async fn assert_link(&self, element: &Self::Element) -> Result<()> {
        let tag = self.tag_name(element).await?;
        if tag.eq_ignore_ascii_case("a") {
            Ok(())
        } else {
            let text = self.text_of(element).await.unwrap_or_default();
            Err(SiteCheckError::assertion(format!(
                "element {text:?} is a <{tag}>, not a link"
            )))
        }
    }
}

/// Opens one browser session per scenario.
#[async_trait]
pub trait BrowserFactory: Send + Sync {
    type Browser: Browser;

    async fn launch(&self) -> Result<Self::Browser>;
}
