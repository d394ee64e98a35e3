//! Driver layer for browser automation.
//!
//! This crate exposes the browser seam that step handlers talk to, the
//! WebDriver-backed implementation and the element resolver.
//!
//! - [`site_browser::Browser`]: the narrow automation contract used by steps
//! - [`site_browser::driver::WebDriverBrowser`]: `fantoccini` client wrapper
//! - [`site_browser::fake::FakeBrowser`]: in-memory page model for tests
//! - [`resolver::ElementResolver`]: id → class → text → text pattern lookup
pub mod resolver;
pub mod site_browser;

pub use resolver::{ElementResolver, Strategy};
pub use site_browser::{Browser, BrowserFactory, Selector, SelectorKind};
