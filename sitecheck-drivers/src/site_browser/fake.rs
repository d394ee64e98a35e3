//! In-memory browser for exercising steps without a WebDriver service.
//!
//! Pages are registered up front by URL. Every lookup, click and teardown
//! call is recorded so tests can assert on how the browser was driven.
use crate::site_browser::{Browser, BrowserFactory, Selector, SelectorKind};
use anyhow::anyhow;
use async_trait::async_trait;
use sitecheck_common::{Result, SiteCheckError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// One element of a fake page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeElement {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub text: String,
    pub href: Option<String>,
}

impl FakeElement {
    pub fn new(tag: &str, text: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            text: text.to_string(),
            href: None,
        }
    }

    /// An `<a>` pointing at `href`.
    pub fn link(text: &str, href: &str) -> Self {
        Self::new("a", text).with_href(href)
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    fn matches(&self, selector: &Selector) -> Result<bool> {
        Ok(match selector {
            Selector::Id(id) => self.id.as_deref() == Some(id.as_str()),
            Selector::Class(class) => self.classes.iter().any(|c| c == class.trim()),
            Selector::Text(text) => self.text.trim() == text.trim(),
            Selector::TextPattern(pattern) => pattern.is_match(&self.text),
            Selector::Tag(tag) => self.tag.eq_ignore_ascii_case(tag),
            Selector::TagWithText { tag, text } => {
                self.tag.eq_ignore_ascii_case(tag) && self.text.trim() == text.trim()
            }
            Selector::XPath(query) => {
                return Err(SiteCheckError::Driver(anyhow!(
                    "fake browser cannot evaluate xpath {query}"
                )))
            }
            Selector::Any(parts) => {
                for part in parts {
                    if self.matches(part)? {
                        return Ok(true);
                    }
                }
                false
            }
        })
    }
}

/// A page: its title plus a flat list of elements in document order.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub title: String,
    pub elements: Vec<FakeElement>,
}

impl FakePage {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            elements: Vec::new(),
        }
    }

    pub fn with(mut self, element: FakeElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Rendered `<body>` text: element texts, one per line.
    pub fn body_text(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Handle to an element of the page at `url`; `index: None` is `<body>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeHandle {
    url: String,
    index: Option<usize>,
}

#[derive(Debug, Default)]
struct FakeState {
    pages: HashMap<String, FakePage>,
    history: Vec<String>,
    lookups: Vec<SelectorKind>,
    clicks: Vec<String>,
    close_window_calls: usize,
    stop_calls: usize,
    launches: usize,
    fail_close_window: bool,
}

impl FakeState {
    fn current(&self) -> Result<(&String, &FakePage)> {
        let url = self
            .history
            .last()
            .ok_or_else(|| SiteCheckError::Driver(anyhow!("no page loaded")))?;
        let page = self
            .pages
            .get(url)
            .ok_or_else(|| SiteCheckError::Driver(anyhow!("no page registered for {url}")))?;
        Ok((url, page))
    }

    fn find(&self, selector: &Selector) -> Result<Option<FakeHandle>> {
        let (url, page) = self.current()?;
        if let Selector::Tag(tag) = selector {
            if tag.eq_ignore_ascii_case("body") {
                return Ok(Some(FakeHandle {
                    url: url.clone(),
                    index: None,
                }));
            }
        }
        for (index, element) in page.elements.iter().enumerate() {
            if element.matches(selector)? {
                return Ok(Some(FakeHandle {
                    url: url.clone(),
                    index: Some(index),
                }));
            }
        }
        Ok(None)
    }

    fn element(&self, handle: &FakeHandle) -> Result<Option<&FakeElement>> {
        let page = self
            .pages
            .get(&handle.url)
            .ok_or_else(|| SiteCheckError::Driver(anyhow!("stale element on {}", handle.url)))?;
        match handle.index {
            None => Ok(None),
            Some(i) => page
                .elements
                .get(i)
                .map(Some)
                .ok_or_else(|| SiteCheckError::Driver(anyhow!("stale element on {}", handle.url))),
        }
    }
}

/// Shared-state fake; clones observe the same pages and counters.
#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `page` under `url`.
    pub fn with_page(self, url: &str, page: FakePage) -> Self {
        self.state().pages.insert(url.to_string(), page);
        self
    }

    /// Make `close_window` report an error (it is still counted).
    pub fn failing_close_window(self) -> Self {
        self.state().fail_close_window = true;
        self
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn current_url(&self) -> Option<String> {
        self.state().history.last().cloned()
    }

    /// Selector kinds of every `exists`/`get` call, in order.
    pub fn lookups(&self) -> Vec<SelectorKind> {
        self.state().lookups.clone()
    }

    pub fn clear_lookups(&self) {
        self.state().lookups.clear();
    }

    /// Text of every clicked element, in order.
    pub fn clicks(&self) -> Vec<String> {
        self.state().clicks.clone()
    }

    pub fn close_window_calls(&self) -> usize {
        self.state().close_window_calls
    }

    pub fn stop_calls(&self) -> usize {
        self.state().stop_calls
    }

    /// Sessions handed out through [`BrowserFactory::launch`].
    pub fn launches(&self) -> usize {
        self.state().launches
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    type Element = FakeHandle;

    async fn go_to(&self, url: &str) -> Result<()> {
        let mut state = self.state();
        if !state.pages.contains_key(url) {
            return Err(SiteCheckError::Driver(anyhow!("no page registered for {url}")));
        }
        state.history.push(url.to_string());
        Ok(())
    }

    async fn go_back(&self) -> Result<()> {
        let mut state = self.state();
        if state.history.len() > 1 {
            state.history.pop();
        }
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        let state = self.state();
        let (_, page) = state.current()?;
        Ok(page.title.clone())
    }

    async fn exists(&self, selector: &Selector) -> Result<bool> {
        let mut state = self.state();
        state.lookups.push(selector.kind());
        Ok(state.find(selector)?.is_some())
    }

    async fn get(&self, selector: &Selector) -> Result<FakeHandle> {
        let mut state = self.state();
        state.lookups.push(selector.kind());
        state
            .find(selector)?
            .ok_or_else(|| SiteCheckError::ElementNotFound(selector.to_string()))
    }

    async fn click(&self, element: &FakeHandle) -> Result<()> {
        let mut state = self.state();
        let (text, href) = match state.element(element)? {
            Some(e) => (e.text.clone(), e.href.clone()),
            None => (String::from("<body>"), None),
        };
        state.clicks.push(text);
        if let Some(href) = href {
            if state.pages.contains_key(&href) {
                state.history.push(href);
            }
        }
        Ok(())
    }

    async fn text_of(&self, element: &FakeHandle) -> Result<String> {
        let state = self.state();
        match state.element(element)? {
            Some(e) => Ok(e.text.clone()),
            None => Ok(state
                .pages
                .get(&element.url)
                .map(FakePage::body_text)
                .unwrap_or_default()),
        }
    }

    async fn tag_name(&self, element: &FakeHandle) -> Result<String> {
        let state = self.state();
        Ok(match state.element(element)? {
            Some(e) => e.tag.to_ascii_lowercase(),
            None => "body".to_string(),
        })
    }

    async fn close_window(&self) -> Result<()> {
        let mut state = self.state();
        state.close_window_calls += 1;
        if state.fail_close_window {
            return Err(SiteCheckError::Driver(anyhow!("window already gone")));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.state().stop_calls += 1;
        Ok(())
    }
}

#[async_trait]
impl BrowserFactory for FakeBrowser {
    type Browser = FakeBrowser;

    async fn launch(&self) -> Result<FakeBrowser> {
        let mut state = self.state();
        state.launches += 1;
        state.history.clear();
        drop(state);
        Ok(self.clone())
    }
}
