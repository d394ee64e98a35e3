use regex::Regex;
use std::fmt;

/// How to locate elements on the current page.
#[derive(Debug, Clone)]
pub enum Selector {
    /// `id` attribute equal to the value.
    Id(String),
    /// One of the element's classes equals the value.
    Class(String),
    /// Visible text equal to the value.
    Text(String),
    /// Visible text matching the pattern anywhere.
    TextPattern(Regex),
    /// Tag name, e.g. `body`.
    Tag(String),
    /// Element of the given tag whose own text equals `text`.
    TagWithText { tag: String, text: String },
    /// Raw structural query.
    XPath(String),
    /// First element, in document order, matched by any of the selectors.
    Any(Vec<Selector>),
}

/// Discriminant of a [`Selector`], handy for logging and call accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    Id,
    Class,
    Text,
    TextPattern,
    Tag,
    TagWithText,
    XPath,
    Any,
}

impl Selector {
    pub fn kind(&self) -> SelectorKind {
        match self {
            Self::Id(_) => SelectorKind::Id,
            Self::Class(_) => SelectorKind::Class,
            Self::Text(_) => SelectorKind::Text,
            Self::TextPattern(_) => SelectorKind::TextPattern,
            Self::Tag(_) => SelectorKind::Tag,
            Self::TagWithText { .. } => SelectorKind::TagWithText,
            Self::XPath(_) => SelectorKind::XPath,
            Self::Any(_) => SelectorKind::Any,
        }
    }

    /// Any `h1`..`h4` heading whose text is exactly `text`.
    pub fn heading(text: &str) -> Self {
        Self::Any(
            ["h1", "h2", "h3", "h4"]
                .iter()
                .map(|tag| Self::TagWithText {
                    tag: tag.to_string(),
                    text: text.to_string(),
                })
                .collect(),
        )
    }

    /// XPath equivalent, when one exists. Pattern matching has no XPath 1.0
    /// form and has to be evaluated client side.
    pub fn to_xpath(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(format!("//*[@id={}]", xpath_literal(id))),
            Self::Class(class) => Some(format!(
                "//*[contains(concat(' ', normalize-space(@class), ' '), {})]",
                xpath_literal(&format!(" {} ", class.trim()))
            )),
            Self::Text(text) => {
                let lit = xpath_literal(text.trim());
                // innermost element carrying the text, not every ancestor
                Some(format!(
                    "//body//*[normalize-space(.)={lit}][not(*[normalize-space(.)={lit}])]"
                ))
            }
            Self::TextPattern(_) => None,
            Self::Tag(tag) => Some(format!("//{tag}")),
            Self::TagWithText { tag, text } => Some(format!(
                "//{tag}[normalize-space(text())={}]",
                xpath_literal(text.trim())
            )),
            Self::XPath(query) => Some(query.clone()),
            Self::Any(parts) => {
                let parts: Option<Vec<String>> = parts.iter().map(Selector::to_xpath).collect();
                parts.map(|p| p.join(" | "))
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(v) => write!(f, "id={v}"),
            Self::Class(v) => write!(f, "css_class={v}"),
            Self::Text(v) => write!(f, "text={v}"),
            Self::TextPattern(re) => write!(f, "text_regex={}", re.as_str()),
            Self::Tag(v) => write!(f, "tag={v}"),
            Self::TagWithText { tag, text } => write!(f, "{tag}[text()={text}]"),
            Self::XPath(v) => write!(f, "xpath={v}"),
            Self::Any(parts) => {
                let rendered: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
                write!(f, "any({})", rendered.join(" | "))
            }
        }
    }
}

/// Quote `s` as an XPath 1.0 string literal. XPath has no escape sequences,
/// so strings holding both quote kinds are assembled with `concat()`.
pub fn xpath_literal(s: &str) -> String {
    if !s.contains('"') {
        return format!("\"{s}\"");
    }
    if !s.contains('\'') {
        return format!("'{s}'");
    }
    let pieces: Vec<String> = s
        .split('"')
        .map(|piece| format!("\"{piece}\""))
        .collect();
    format!("concat({})", pieces.join(", '\"', "))
}
