use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{
    ChatRequest, GenerateRequest, RawResponse, SamplingOptions, Transport, TransportFuture,
};
use crate::error::{Result, TranslateError};

pub(crate) const DEFAULT_HOST: &str = "http://localhost:11434";
pub(crate) const DEFAULT_MODEL: &str = "gpt-oss:20b";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for a local Ollama daemon (`/api/chat` and `/api/generate`).
#[derive(Debug, Clone)]
pub struct Ollama {
    client: Client,
    host: String,
}

impl Ollama {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self> {
        let host: String = host.into();
        let host = host.trim().trim_end_matches('/');
        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            host: host.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.host, path)
    }
}

impl Transport for Ollama {
    fn chat(&self, request: ChatRequest) -> TransportFuture {
        let client = self.client.clone();
        let url = self.endpoint("api/chat");
        Box::pin(async move {
            let body = ChatBody {
                model: &request.model,
                messages: [
                    WireMessage {
                        role: "system",
                        content: &request.system,
                    },
                    WireMessage {
                        role: "user",
                        content: &request.user,
                    },
                ],
                stream: false,
                format: "json",
                options: request.options,
            };
            let (raw, latency_ms) = post_json(&client, &url, &body).await?;
            let envelope: ChatEnvelope = parse_envelope(&raw)?;
            let content = envelope
                .message
                .and_then(|message| message.content)
                .ok_or_else(|| {
                    TranslateError::transport(
                        "response has no message.content",
                        Some(raw.clone()),
                    )
                })?;
            Ok(RawResponse {
                content,
                model: envelope.model,
                latency_ms,
            })
        })
    }

    fn generate(&self, request: GenerateRequest) -> TransportFuture {
        let client = self.client.clone();
        let url = self.endpoint("api/generate");
        Box::pin(async move {
            let body = GenerateBody {
                model: &request.model,
                prompt: &request.prompt,
                stream: false,
                format: "json",
                options: request.options,
            };
            let (raw, latency_ms) = post_json(&client, &url, &body).await?;
            let envelope: GenerateEnvelope = parse_envelope(&raw)?;
            let content = envelope.response.ok_or_else(|| {
                TranslateError::transport("response has no 'response' field", Some(raw.clone()))
            })?;
            Ok(RawResponse {
                content,
                model: envelope.model,
                latency_ms,
            })
        })
    }
}

async fn post_json<B>(client: &Client, url: &str, body: &B) -> Result<(String, u64)>
where
    B: Serialize,
{
    debug!("POST {}", url);
    let started = Instant::now();
    let response = client.post(url).json(body).send().await?;
    let status = response.status();
    let text = response.text().await?;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if !status.is_success() {
        let detail = extract_ollama_error(&text)
            .map(|message| format!(": {}", message))
            .unwrap_or_default();
        return Err(TranslateError::transport(
            format!("Ollama HTTP {}{}", status, detail),
            Some(text),
        ));
    }
    debug!("{} answered in {}ms", url, latency_ms);
    Ok((text, latency_ms))
}

fn parse_envelope<T>(raw: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de> + HasError,
{
    let envelope: T = serde_json::from_str(raw).map_err(|err| {
        TranslateError::transport(
            format!("invalid JSON envelope from Ollama: {}", err),
            Some(raw.to_string()),
        )
    })?;
    if let Some(message) = envelope.error() {
        return Err(TranslateError::transport(
            format!("Ollama error: {}", message),
            Some(raw.to_string()),
        ));
    }
    Ok(envelope)
}

fn extract_ollama_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.error.filter(|message| !message.trim().is_empty())
}

trait HasError {
    fn error(&self) -> Option<&str>;
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
    stream: bool,
    format: &'static str,
    options: SamplingOptions,
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'static str,
    options: SamplingOptions,
}

#[derive(Debug, Deserialize)]
struct ChatEnvelope {
    message: Option<ChatMessage>,
    model: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateEnvelope {
    response: Option<String>,
    model: Option<String>,
    error: Option<String>,
}

impl HasError for ChatEnvelope {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl HasError for GenerateEnvelope {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
