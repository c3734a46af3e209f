use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::TranslateError;

pub const DEFAULT_TEMPERATURE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Translate,
    Dictionary,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Translate => "translate",
            Mode::Dictionary => "dictionary",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = TranslateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "translate" => Ok(Mode::Translate),
            "dictionary" => Ok(Mode::Dictionary),
            other => Err(TranslateError::config(format!("unknown mode '{}'", other))),
        }
    }
}

/// Steers a regeneration of a previous translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerunHint {
    Retry,
    MoreLiteral,
    MoreNatural,
}

impl RerunHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            RerunHint::Retry => "retry",
            RerunHint::MoreLiteral => "more_literal",
            RerunHint::MoreNatural => "more_natural",
        }
    }
}

impl FromStr for RerunHint {
    type Err = TranslateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "retry" => Ok(RerunHint::Retry),
            "more_literal" => Ok(RerunHint::MoreLiteral),
            "more_natural" => Ok(RerunHint::MoreNatural),
            other => Err(TranslateError::config(format!(
                "unknown rerun hint '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslateRequest {
    pub text: String,
    /// `"auto"` asks the model to detect the source language.
    pub source_lang: String,
    pub target_lang: String,
    pub mode: Mode,
    pub tone: String,
    pub tone_instructions: Option<String>,
    /// Language used for notes and other explanatory text.
    pub explain_lang: String,
    pub rerun: Option<RerunHint>,
    pub seed: Option<i64>,
    pub temperature: f64,
}

impl TranslateRequest {
    pub fn new(
        text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            mode: Mode::Translate,
            tone: "neutral".to_string(),
            tone_instructions: None,
            explain_lang: "EN".to_string(),
            rerun: None,
            seed: None,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslateResult {
    pub translation: String,
    pub alternatives: Option<Vec<String>>,
    pub notes: Option<String>,
    pub detected_source_lang: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionarySense {
    pub meaning: String,
    pub example_source: Option<String>,
    pub example_target: Option<String>,
    pub usage_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryEntry {
    pub pos: Option<String>,
    pub senses: Vec<DictionarySense>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryResult {
    pub term: String,
    pub entries: Vec<DictionaryEntry>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub latency_ms: Option<u64>,
}

/// Either result shape; serializes as the inner payload with no tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Translation(TranslateResult),
    Dictionary(DictionaryResult),
}

impl Outcome {
    pub fn model(&self) -> Option<&str> {
        match self {
            Outcome::Translation(result) => result.model.as_deref(),
            Outcome::Dictionary(result) => result.model.as_deref(),
        }
    }

    pub fn latency_ms(&self) -> Option<u64> {
        match self {
            Outcome::Translation(result) => result.latency_ms,
            Outcome::Dictionary(result) => result.latency_ms,
        }
    }
}
