//! Minimal Gherkin reader: `Feature`, `Background`, `Scenario`, and
//! `Given`/`When`/`Then`/`And`/`But` steps. Comments (`#`) and tag lines
//! (`@...`) are ignored; free text is only allowed as the feature
//! description.
use crate::registry::StepKind;
use std::path::Path;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    /// Keyword as written (`And`, `But`, ...).
    pub keyword: String,
    pub text: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub line: usize,
    /// Background steps first, then the scenario's own.
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub scenarios: Vec<Scenario>,
}

#[derive(thiserror::Error, Debug)]
pub enum FeatureFileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
}

impl Feature {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FeatureFileError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|source| FeatureFileError::Io {
            path: display.clone(),
            source,
        })?;
        parse_feature(&source).map_err(|source| FeatureFileError::Parse {
            path: display,
            source,
        })
    }
}

enum Block {
    Preamble,
    Background,
    Scenario,
}

pub fn parse_feature(source: &str) -> Result<Feature, ParseError> {
    let mut name: Option<String> = None;
    let mut background: Vec<Step> = Vec::new();
    let mut scenarios: Vec<Scenario> = Vec::new();
    let mut block = Block::Preamble;
    let mut last_kind: Option<StepKind> = None;

    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('@') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("Feature:") {
            if name.is_some() {
                return Err(ParseError::new(line_no, "second Feature in one file"));
            }
            name = Some(rest.trim().to_string());
            continue;
        }
        if name.is_none() {
            return Err(ParseError::new(line_no, "expected Feature:"));
        }

        if line.starts_with("Background:") {
            if !scenarios.is_empty() {
                return Err(ParseError::new(line_no, "Background must precede scenarios"));
            }
            block = Block::Background;
            last_kind = None;
            continue;
        }
        if line.starts_with("Scenario Outline:") || line.starts_with("Examples:") {
            return Err(ParseError::new(line_no, "scenario outlines are not supported"));
        }
        if let Some(rest) = line.strip_prefix("Scenario:") {
            scenarios.push(Scenario {
                name: rest.trim().to_string(),
                line: line_no,
                steps: background.clone(),
            });
            block = Block::Scenario;
            last_kind = None;
            continue;
        }

        match split_keyword(line) {
            Some((keyword, text)) => {
                let kind = match keyword {
                    "Given" => StepKind::Given,
                    "When" => StepKind::When,
                    "Then" => StepKind::Then,
                    _ => last_kind.ok_or_else(|| {
                        ParseError::new(line_no, format!("{keyword} without a preceding step"))
                    })?,
                };
                last_kind = Some(kind);
                let step = Step {
                    kind,
                    keyword: keyword.to_string(),
                    text: text.to_string(),
                    line: line_no,
                };
                match block {
                    Block::Preamble => {
                        return Err(ParseError::new(line_no, "step outside a scenario"))
                    }
                    Block::Background => background.push(step),
                    Block::Scenario => {
                        if let Some(scenario) = scenarios.last_mut() {
                            scenario.steps.push(step);
                        }
                    }
                }
            }
            None => match block {
                // feature description
                Block::Preamble => continue,
                _ => return Err(ParseError::new(line_no, format!("unexpected line: {line}"))),
            },
        }
    }

    let name = name.ok_or_else(|| ParseError::new(1, "expected Feature:"))?;
    Ok(Feature { name, scenarios })
}

fn split_keyword(line: &str) -> Option<(&str, &str)> {
    ["Given", "When", "Then", "And", "But"]
        .into_iter()
        .find_map(|keyword| {
            line.strip_prefix(keyword)
                .filter(|rest| rest.starts_with(char::is_whitespace))
                .map(|rest| (keyword, rest.trim()))
        })
}
