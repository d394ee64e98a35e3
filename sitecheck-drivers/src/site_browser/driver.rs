use crate::site_browser::{Browser, BrowserFactory, Selector};
use async_trait::async_trait;
use fantoccini::{elements::Element, Client, ClientBuilder, Locator};
use regex::Regex;
use serde_json::json;
use sitecheck_common::{BrowserKind, Result, SiteCheckError};
use tracing::{debug, info};
use webdriver::capabilities::Capabilities;

const TEXT_BEARING: &str = "//body//*[text()[normalize-space()]]";
const NESTED_TEXT_BEARING: &str = ".//*[text()[normalize-space()]]";

/// A pattern hit counts only if none of the element's text-bearing
/// descendants match on their own.
fn is_innermost_match(pattern: &Regex, descendant_texts: &[String]) -> bool {
    !descendant_texts.iter().any(|text| pattern.is_match(text))
}

fn driver_err<E>(err: E) -> SiteCheckError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SiteCheckError::Driver(anyhow::Error::from(err))
}

/// Thin wrapper around a `fantoccini` WebDriver client.
pub struct WebDriverBrowser {
    pub client: Client,
}

impl WebDriverBrowser {
    /// Wrap an already connected client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// All matches for `selector`, in document order.
    async fn locate(&self, selector: &Selector) -> Result<Vec<Element>> {
        match selector {
            Selector::Any(parts) if selector.to_xpath().is_none() => {
                let mut matched = Vec::new();
                for part in parts {
                    matched.extend(self.locate_one(part).await?);
                }
                Ok(matched)
            }
            other => self.locate_one(other).await,
        }
    }

    async fn locate_one(&self, selector: &Selector) -> Result<Vec<Element>> {
        match selector {
            Selector::Tag(tag) => self
                .client
                .find_all(Locator::Css(tag))
                .await
                .map_err(driver_err),
            Selector::TextPattern(pattern) => {
                // XPath 1.0 has no regex support: walk elements carrying their
                // own text and filter on the rendered text, keeping only the
                // innermost hits so `<li>Read <a>Projects</a></li>` yields the `a`.
                let candidates = self
                    .client
                    .find_all(Locator::XPath(TEXT_BEARING))
                    .await
                    .map_err(driver_err)?;
                let mut matched = Vec::new();
                for element in candidates {
                    let text = element.text().await.map_err(driver_err)?;
                    if !pattern.is_match(&text) {
                        continue;
                    }
                    let mut nested = Vec::new();
                    for child in element
                        .find_all(Locator::XPath(NESTED_TEXT_BEARING))
                        .await
                        .map_err(driver_err)?
                    {
                        nested.push(child.text().await.map_err(driver_err)?);
                    }
                    if is_innermost_match(pattern, &nested) {
                        matched.push(element);
                    }
                }
                Ok(matched)
            }
            other => {
                let xpath = other.to_xpath().ok_or_else(|| {
                    SiteCheckError::InvalidStepArgs(format!("no query form for {other}"))
                })?;
                self.client
                    .find_all(Locator::XPath(&xpath))
                    .await
                    .map_err(driver_err)
            }
        }
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    type Element = Element;

    async fn go_to(&self, url: &str) -> Result<()> {
        info!(target: "browser.nav", %url, "navigating");
        self.client.goto(url).await.map_err(driver_err)
    }

    async fn go_back(&self) -> Result<()> {
        info!(target: "browser.nav", "navigating back");
        self.client.back().await.map_err(driver_err)
    }

    async fn title(&self) -> Result<String> {
        self.client.title().await.map_err(driver_err)
    }

    async fn exists(&self, selector: &Selector) -> Result<bool> {
        let found = !self.locate(selector).await?.is_empty();
        debug!(target: "browser.selector", %selector, found, "existence check");
        Ok(found)
    }

    async fn get(&self, selector: &Selector) -> Result<Element> {
        self.locate(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SiteCheckError::ElementNotFound(selector.to_string()))
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await.map_err(driver_err)
    }

    async fn text_of(&self, element: &Element) -> Result<String> {
        element.text().await.map_err(driver_err)
    }

    async fn tag_name(&self, element: &Element) -> Result<String> {
        element
            .tag_name()
            .await
            .map(|t| t.to_ascii_lowercase())
            .map_err(driver_err)
    }

    async fn close_window(&self) -> Result<()> {
        self.client.close_window().await.map_err(driver_err)
    }

    async fn stop(&self) -> Result<()> {
        self.client.clone().close().await.map_err(driver_err)
    }
}

/// Connects [`WebDriverBrowser`] sessions to a running WebDriver service
/// (geckodriver, chromedriver or a grid).
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    kind: BrowserKind,
    endpoint: String,
    headless: bool,
}

impl WebDriverFactory {
    pub fn new(kind: BrowserKind, endpoint: impl Into<String>, headless: bool) -> Self {
        Self {
            kind,
            endpoint: endpoint.into(),
            headless,
        }
    }

    /// Session capabilities for the configured browser.
    pub fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::new();
        caps.insert("browserName".to_string(), json!(self.kind.name()));
        match self.kind {
            BrowserKind::Firefox => {
                let args: Vec<&str> = if self.headless { vec!["-headless"] } else { vec![] };
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            BrowserKind::Chrome => {
                let mut args = vec!["--disable-dev-shm-usage"];
                if self.headless {
                    args.push("--headless");
                    args.push("--disable-gpu");
                }
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }
        caps
    }
}

#[async_trait]
impl BrowserFactory for WebDriverFactory {
    type Browser = WebDriverBrowser;

    async fn launch(&self) -> Result<WebDriverBrowser> {
        info!(
            target: "browser.session",
            browser = %self.kind,
            endpoint = %self.endpoint,
            headless = self.headless,
            "starting session"
        );
        let client = ClientBuilder::native()
            .capabilities(self.capabilities())
            .connect(&self.endpoint)
            .await
            .map_err(driver_err)?;
        Ok(WebDriverBrowser::new(client))
    }
}
