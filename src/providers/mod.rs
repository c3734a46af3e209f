use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

use crate::error::{Result, TranslateError};
use crate::prompts::Prompts;

mod ollama;

pub use ollama::Ollama;
pub(crate) use ollama::{DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_TIMEOUT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "ollama",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            _ => Err(TranslateError::config(format!(
                "unsupported provider '{}' (only 'ollama' is implemented)",
                name.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingOptions {
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

/// Role-tagged request for the structured chat endpoint.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub options: SamplingOptions,
}

/// Single-prompt request for the flat completion endpoint.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub options: SamplingOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub content: String,
    pub model: Option<String>,
    pub latency_ms: u64,
}

pub type TransportFuture = Pin<Box<dyn Future<Output = Result<RawResponse>> + Send>>;

pub trait Transport: Send + Sync {
    fn chat(&self, request: ChatRequest) -> TransportFuture;
    fn generate(&self, request: GenerateRequest) -> TransportFuture;
}

/// Sends the prompts in structured mode, falling back once to flat mode
/// when the structured exchange fails at the transport level.
///
/// Only the flat-mode error is ever returned for a transport failure.
pub async fn exchange<T>(
    transport: &T,
    model: &str,
    prompts: &Prompts,
    options: SamplingOptions,
) -> Result<RawResponse>
where
    T: Transport + ?Sized,
{
    let chat = ChatRequest {
        model: model.to_string(),
        system: prompts.system.clone(),
        user: prompts.user.clone(),
        options,
    };
    debug!("sending structured chat request (model {})", model);
    match transport.chat(chat).await {
        Ok(response) => Ok(response),
        Err(err) if err.is_transport() => {
            warn!("structured request failed ({}); retrying in flat mode", err);
            let generate = GenerateRequest {
                model: model.to_string(),
                prompt: prompts.flattened(),
                options,
            };
            transport.generate(generate).await
        }
        Err(err) => Err(err),
    }
}
