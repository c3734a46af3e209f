use tracing::{debug, info};

use crate::coerce::{self, Provenance};
use crate::error::{Result, TranslateError};
use crate::models::{Outcome, TranslateRequest};
use crate::prompts;
use crate::providers::{self, Ollama, ProviderKind, SamplingOptions, Transport};
use crate::settings::Settings;

/// Runs one request through prompts, exchange, extraction and coercion.
#[derive(Debug, Clone)]
pub struct Translator<T: Transport> {
    transport: T,
    provider: ProviderKind,
    model: String,
}

impl Translator<Ollama> {
    /// Fails with a configuration error for any provider other than Ollama.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let provider = ProviderKind::from_name(&settings.provider)?;
        let model = settings.ollama_model.trim();
        if model.is_empty() {
            return Err(TranslateError::config("ollama.model is empty"));
        }
        let transport = Ollama::new(settings.ollama_host.as_str(), settings.ollama_timeout)?;
        Ok(Self {
            transport,
            provider,
            model: model.to_string(),
        })
    }
}

impl<T: Transport> Translator<T> {
    pub fn new(transport: T, model: impl Into<String>) -> Self {
        Self {
            transport,
            provider: ProviderKind::Ollama,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn exec(&self, request: &TranslateRequest) -> Result<Outcome> {
        if request.text.trim().is_empty() {
            return Err(TranslateError::config("input text is empty"));
        }

        let prompt_pair = prompts::build_prompts(request)?;
        let options = SamplingOptions {
            temperature: request.temperature,
            seed: request.seed,
        };
        info!(
            "{} request to {} (model {}, prompt v{})",
            request.mode,
            self.provider.as_str(),
            self.model,
            prompts::PROMPT_VERSION
        );
        let response =
            providers::exchange(&self.transport, &self.model, &prompt_pair, options).await?;
        debug!("provider answered in {}ms", response.latency_ms);

        let object = coerce::parse_object(&response.content)?;
        let model = response
            .model
            .filter(|value| !value.trim().is_empty())
            .or_else(|| Some(self.model.clone()));
        let provenance = Provenance {
            provider: Some(self.provider.as_str().to_string()),
            model,
            latency_ms: Some(response.latency_ms),
        };
        coerce::coerce(request, &object, provenance, &response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mode;
    use crate::providers::stub::{StubTransport, fail, ok};

    #[tokio::test]
    async fn translates_through_prose_wrapped_reply() {
        let transport = StubTransport::new(
            ok(r#"Sure! {"translation": "Bonjour", "alternatives": null, "notes": null, "detected_source_lang": "EN"}"#),
            ok("unused"),
        );
        let translator = Translator::new(transport.clone(), "llama3");
        let request = TranslateRequest::new("Hello", "auto", "FR");
        let Outcome::Translation(result) = translator.exec(&request).await.unwrap() else {
            panic!("expected translation");
        };
        assert_eq!(result.translation, "Bonjour");
        assert_eq!(result.detected_source_lang.as_deref(), Some("EN"));
        assert_eq!(result.alternatives, None);
        assert_eq!(result.notes, None);
        assert_eq!(result.provider.as_deref(), Some("ollama"));
        assert_eq!(result.model.as_deref(), Some("stub-model"));
        assert_eq!(result.latency_ms, Some(7));

        let chats = transport.chats.lock().unwrap();
        assert_eq!(chats[0].model, "llama3");
        assert!(chats[0].user.contains("Target language: FR."));
    }

    #[tokio::test]
    async fn request_options_reach_the_transport() {
        let transport = StubTransport::new(fail("down", "x"), ok(r#"{"translation": "ok"}"#));
        let translator = Translator::new(transport.clone(), "llama3");
        let mut request = TranslateRequest::new("Hello", "EN", "DE");
        request.seed = Some(11);
        request.temperature = 0.7;
        translator.exec(&request).await.unwrap();

        let generates = transport.generates.lock().unwrap();
        assert_eq!(generates[0].options.seed, Some(11));
        assert_eq!(generates[0].options.temperature, 0.7);
        assert!(generates[0].prompt.contains("\n\nTranslate the text."));
    }

    #[tokio::test]
    async fn validation_error_carries_provider_text() {
        let raw = r#"{"translation": ""}"#;
        let transport = StubTransport::new(ok(raw), ok("unused"));
        let translator = Translator::new(transport, "llama3");
        let err = translator
            .exec(&TranslateRequest::new("Hello", "auto", "FR"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::Validation { .. }));
        assert_eq!(err.raw_response(), Some(raw));
    }

    #[tokio::test]
    async fn extraction_errors_are_not_retried() {
        let transport = StubTransport::new(ok("I refuse."), ok("unused"));
        let translator = Translator::new(transport.clone(), "llama3");
        let err = translator
            .exec(&TranslateRequest::new("Hello", "auto", "FR"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::Extraction { .. }));
        assert!(transport.generates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dictionary_mode_uses_request_text_as_term() {
        let transport = StubTransport::new(
            ok(r#"{"entries": [{"pos": "noun", "senses": [{"meaning": "banque"}]}]}"#),
            ok("unused"),
        );
        let translator = Translator::new(transport, "llama3");
        let request = TranslateRequest::new(" bank ", "EN", "FR").with_mode(Mode::Dictionary);
        let Outcome::Dictionary(result) = translator.exec(&request).await.unwrap() else {
            panic!("expected dictionary");
        };
        assert_eq!(result.term, "bank");
        assert_eq!(result.entries[0].pos.as_deref(), Some("noun"));
    }

    #[tokio::test]
    async fn empty_input_is_rejected_before_any_exchange() {
        let transport = StubTransport::new(ok("unused"), ok("unused"));
        let translator = Translator::new(transport.clone(), "llama3");
        let err = translator
            .exec(&TranslateRequest::new("   ", "auto", "FR"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::Config { .. }));
        assert!(transport.chats.lock().unwrap().is_empty());
    }

    #[test]
    fn unsupported_provider_is_a_config_error() {
        let settings = Settings {
            provider: "openai".to_string(),
            ..Settings::default()
        };
        let err = Translator::from_settings(&settings).unwrap_err();
        assert!(matches!(err, TranslateError::Config { .. }));
    }
}
