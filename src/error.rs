use thiserror::Error;

pub type Result<T, E = TranslateError> = std::result::Result<T, E>;

/// Failures of the provider-response contract.
///
/// Every variant except `Config` and `Prompt` keeps the raw provider text
/// so the caller can show it in a debug view.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("failed to render prompt: {0}")]
    Prompt(#[from] tera::Error),

    #[error("transport error: {message}")]
    Transport {
        message: String,
        raw: Option<String>,
    },

    #[error("model did not return a JSON object")]
    Extraction { raw: String },

    #[error("unterminated JSON object in model output")]
    UnterminatedObject { raw: String },

    #[error("failed to parse JSON from model output: {message}")]
    Parse { message: String, raw: String },

    #[error("invalid model output: {message}")]
    Validation { message: String, raw: String },
}

impl TranslateError {
    pub fn config(message: impl Into<String>) -> Self {
        TranslateError::Config {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>, raw: Option<String>) -> Self {
        TranslateError::Transport {
            message: message.into(),
            raw,
        }
    }

    pub fn parse(message: impl Into<String>, raw: impl Into<String>) -> Self {
        TranslateError::Parse {
            message: message.into(),
            raw: raw.into(),
        }
    }

    pub fn validation(message: impl Into<String>, raw: impl Into<String>) -> Self {
        TranslateError::Validation {
            message: message.into(),
            raw: raw.into(),
        }
    }

    pub fn raw_response(&self) -> Option<&str> {
        match self {
            TranslateError::Config { .. } | TranslateError::Prompt(_) => None,
            TranslateError::Transport { raw, .. } => raw.as_deref(),
            TranslateError::Extraction { raw }
            | TranslateError::UnterminatedObject { raw }
            | TranslateError::Parse { raw, .. }
            | TranslateError::Validation { raw, .. } => Some(raw.as_str()),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, TranslateError::Transport { .. })
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_connect() {
            format!("failed to reach provider: {}", err)
        } else {
            err.to_string()
        };
        TranslateError::transport(message, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_response_is_exposed_for_provider_failures() {
        let err = TranslateError::transport("HTTP 500", Some("boom".to_string()));
        assert_eq!(err.raw_response(), Some("boom"));
        assert!(err.is_transport());

        let err = TranslateError::validation("missing translation", "{}");
        assert_eq!(err.raw_response(), Some("{}"));
        assert!(!err.is_transport());

        let err = TranslateError::config("unsupported provider 'openai'");
        assert_eq!(err.raw_response(), None);
        assert_eq!(
            err.to_string(),
            "configuration error: unsupported provider 'openai'"
        );
    }
}
