use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::DEFAULT_TEMPERATURE;
use crate::providers::{DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_TIMEOUT, ProviderKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub provider: String,
    pub ollama_host: String,
    pub ollama_model: String,
    pub ollama_timeout: Duration,
    pub source_lang: String,
    pub target_lang: String,
    pub tone: String,
    pub explain_lang: String,
    pub temperature: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama.as_str().to_string(),
            ollama_host: DEFAULT_HOST.to_string(),
            ollama_model: DEFAULT_MODEL.to_string(),
            ollama_timeout: DEFAULT_TIMEOUT,
            source_lang: "auto".to_string(),
            target_lang: "ZH".to_string(),
            tone: "neutral".to_string(),
            explain_lang: "EN".to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    provider: Option<ProviderSettings>,
    ollama: Option<OllamaSettings>,
    defaults: Option<DefaultSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderSettings {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaSettings {
    host: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct DefaultSettings {
    source_lang: Option<String>,
    target_lang: Option<String>,
    tone: Option<String>,
    explain_lang: Option<String>,
    temperature: Option<f64>,
}

/// Loads config layers, later files overriding earlier ones:
/// `~/.llm-translate/config.toml`, `./config.toml`, `./config.local.toml`,
/// then `extra_path`.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut ordered_paths = Vec::new();
    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("config.toml"));
    }
    ordered_paths.push(PathBuf::from("config.toml"));
    ordered_paths.push(PathBuf::from("config.local.toml"));

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("config file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    load_layers(&ordered_paths)
}

fn load_layers(paths: &[PathBuf]) -> Result<Settings> {
    let mut settings = Settings::default();
    for path in paths {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            settings.merge(parsed);
        }
    }
    settings.validate()?;
    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(provider) = incoming.provider {
            merge_string(&mut self.provider, provider.name);
        }
        if let Some(ollama) = incoming.ollama {
            merge_string(&mut self.ollama_host, ollama.host);
            merge_string(&mut self.ollama_model, ollama.model);
            if let Some(secs) = ollama.timeout_secs {
                if secs > 0 {
                    self.ollama_timeout = Duration::from_secs(secs);
                }
            }
        }
        if let Some(defaults) = incoming.defaults {
            merge_string(&mut self.source_lang, defaults.source_lang);
            merge_string(&mut self.target_lang, defaults.target_lang);
            merge_string(&mut self.tone, defaults.tone);
            merge_string(&mut self.explain_lang, defaults.explain_lang);
            if let Some(temperature) = defaults.temperature {
                self.temperature = temperature;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(anyhow!(
                "defaults.temperature must be a non-negative number (got {})",
                self.temperature
            ));
        }
        Ok(())
    }
}

fn merge_string(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        if !value.trim().is_empty() {
            *target = value.trim().to_string();
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".llm-translate"))
        }
    })
}
