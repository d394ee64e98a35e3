use sitecheck_common::SiteCheckError;
use sitecheck_drivers::site_browser::fake::{FakeBrowser, FakeElement, FakePage};
use sitecheck_drivers::{Browser, ElementResolver, SelectorKind, Strategy};

const HOME: &str = "http://localhost:4000";

async fn home(page: FakePage) -> FakeBrowser {
    let browser = FakeBrowser::new().with_page(HOME, page);
    browser.go_to(HOME).await.expect("page loads");
    browser
}

#[tokio::test]
async fn id_match_short_circuits_other_strategies() {
    let browser = home(
        FakePage::new("Blog")
            .with(FakeElement::link("projects", "/projects").with_class("projects"))
            .with(FakeElement::link("Projects", "/p").with_id("projects")),
    )
    .await;

    let (link, strategy) = ElementResolver::new()
        .resolve_with_strategy(&browser, "projects")
        .await
        .unwrap();

    assert_eq!(strategy, Strategy::Id);
    assert_eq!(browser.text_of(&link).await.unwrap(), "Projects");
    assert_eq!(browser.lookups(), vec![SelectorKind::Id, SelectorKind::Id]);
}

#[tokio::test]
async fn falls_through_to_class_then_text() {
    let browser = home(
        FakePage::new("Blog")
            .with(FakeElement::new("div", "Archive").with_class("archive"))
            .with(FakeElement::link("About me", "/about")),
    )
    .await;
    let resolver = ElementResolver::new();

    let (_, strategy) = resolver
        .resolve_with_strategy(&browser, "archive")
        .await
        .unwrap();
    assert_eq!(strategy, Strategy::Class);

    browser.clear_lookups();
    let (_, strategy) = resolver
        .resolve_with_strategy(&browser, "About me")
        .await
        .unwrap();
    assert_eq!(strategy, Strategy::Text);
    assert_eq!(
        browser.lookups(),
        vec![
            SelectorKind::Id,
            SelectorKind::Class,
            SelectorKind::Text,
            SelectorKind::Text
        ]
    );
}

#[tokio::test]
async fn pattern_is_the_last_resort() {
    let browser = home(FakePage::new("Blog").with(FakeElement::link("Projects (12)", "/projects"))).await;

    let (link, strategy) = ElementResolver::new()
        .resolve_with_strategy(&browser, "Proj.*")
        .await
        .unwrap();

    assert_eq!(strategy, Strategy::TextPattern);
    assert_eq!(browser.text_of(&link).await.unwrap(), "Projects (12)");
}

#[tokio::test]
async fn metacharacters_are_live_unless_escaped() {
    let browser = home(FakePage::new("Blog").with(FakeElement::link("C++ tips", "/cpp"))).await;

    // "C+" read as a pattern matches "C++ tips"
    assert!(ElementResolver::new().resolve(&browser, "C+").await.is_ok());

    let err = ElementResolver::new()
        .escape_patterns(true)
        .resolve(&browser, "C+ tips")
        .await
        .unwrap_err();
    assert!(matches!(err, SiteCheckError::ElementNotFound(_)));
}

#[tokio::test]
async fn multiple_matches_yield_the_first_in_document_order() {
    let browser = FakeBrowser::new()
        .with_page(
            HOME,
            FakePage::new("Blog")
                .with(FakeElement::link("Read more", "/one"))
                .with(FakeElement::link("Read more", "/two")),
        )
        .with_page("/one", FakePage::new("One"))
        .with_page("/two", FakePage::new("Two"));
    browser.go_to(HOME).await.unwrap();

    let link = ElementResolver::new()
        .resolve(&browser, "Read more")
        .await
        .unwrap();
    browser.click(&link).await.unwrap();
    assert_eq!(browser.title().await.unwrap(), "One");
}

#[tokio::test]
async fn nothing_matching_is_element_not_found() {
    let browser = home(FakePage::new("Blog").with(FakeElement::new("p", "hello"))).await;

    let err = ElementResolver::new()
        .resolve(&browser, "contact")
        .await
        .unwrap_err();

    assert!(matches!(err, SiteCheckError::ElementNotFound(ref t) if t == "contact"));
    assert_eq!(browser.lookups().len(), 4);
}

#[tokio::test]
async fn broken_pattern_skips_the_pattern_strategy() {
    let browser = home(FakePage::new("Blog").with(FakeElement::new("p", "hello"))).await;

    let err = ElementResolver::new()
        .resolve(&browser, "unclosed (")
        .await
        .unwrap_err();

    assert!(matches!(err, SiteCheckError::ElementNotFound(_)));
    assert_eq!(
        browser.lookups(),
        vec![SelectorKind::Id, SelectorKind::Class, SelectorKind::Text]
    );
}
