use anyhow::{Result, anyhow};
use std::path::Path;

pub mod coerce;
pub mod error;
pub mod extract;
pub mod logging;
pub mod models;
pub mod prompts;
pub mod providers;
pub mod render;
pub mod settings;
mod translator;

pub use error::TranslateError;
pub use models::{
    DictionaryEntry, DictionaryResult, DictionarySense, Mode, Outcome, RerunHint,
    TranslateRequest, TranslateResult,
};
pub use providers::{Ollama, ProviderKind, Transport};
pub use render::RenderOptions;
pub use translator::Translator;

/// Command-line inputs; `None` falls back to the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings_path: Option<String>,
    pub mode: Option<String>,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
    pub tone: Option<String>,
    pub tone_instructions: Option<String>,
    pub explain_lang: Option<String>,
    pub rerun: Option<String>,
    pub seed: Option<i64>,
    pub temperature: Option<f64>,
    pub json: bool,
    pub pretty: bool,
    pub with_using_model: bool,
}

pub async fn run(config: Config, input: Option<String>) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;

    let input = input.unwrap_or_default();
    if input.trim().is_empty() {
        return Err(anyhow!(
            "no input provided (pass TEXT argument or pipe via stdin)"
        ));
    }

    let translator = Translator::from_settings(&settings)?;
    let request = build_request(&config, &settings, input)?;
    let outcome = translator.exec(&request).await?;

    render::render(
        &outcome,
        RenderOptions {
            json: config.json,
            pretty: config.pretty,
            with_using_model: config.with_using_model,
        },
    )
}

pub fn build_request(
    config: &Config,
    settings: &settings::Settings,
    text: String,
) -> Result<TranslateRequest> {
    let mode = match config.mode.as_deref() {
        Some(mode) => mode.parse::<Mode>()?,
        None => Mode::Translate,
    };
    let rerun = config
        .rerun
        .as_deref()
        .map(str::parse::<RerunHint>)
        .transpose()?;
    let temperature = config.temperature.unwrap_or(settings.temperature);
    if !temperature.is_finite() || temperature < 0.0 {
        return Err(anyhow!(
            "temperature must be a non-negative number (got {})",
            temperature
        ));
    }

    Ok(TranslateRequest {
        text,
        source_lang: pick(&config.source_lang, &settings.source_lang),
        target_lang: pick(&config.target_lang, &settings.target_lang),
        mode,
        tone: pick(&config.tone, &settings.tone),
        tone_instructions: config
            .tone_instructions
            .clone()
            .filter(|value| !value.trim().is_empty()),
        explain_lang: pick(&config.explain_lang, &settings.explain_lang),
        rerun,
        seed: config.seed,
        temperature,
    })
}

fn pick(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
        .to_string()
}
