mod gemini;
mod mock;
mod openai;

use log::info;
use serde_json::Value;
use thiserror::Error;

use crate::config::{AppConfig, BackendKind};

pub use gemini::GeminiClient;
pub use mock::MockClient;
pub use openai::OpenAiClient;

#[derive(Debug, Error)]
pub enum CompletionError {
    /// Raised before any request is made. Callers surface it like every
    /// other failure, as a toast; it is never written into the chat
    /// history as an assistant reply.
    #[error("API key is not configured. Please check your environment variables.")]
    MissingCredential,

    #[error("API request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to get a valid response from {0} API")]
    InvalidResponse(&'static str),

    #[error("Request to the completion API failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The backend that turns a prompt into an assistant reply.
pub enum CompletionClient {
    OpenAi(OpenAiClient),
    Gemini(GeminiClient),
    Mock(MockClient),
}

impl CompletionClient {
    pub fn from_config(config: &AppConfig) -> Self {
        let client = match config.backend {
            BackendKind::OpenAi => CompletionClient::OpenAi(OpenAiClient::new(config.openai.clone())),
            BackendKind::Gemini => CompletionClient::Gemini(GeminiClient::new(
                config.gemini.clone(),
                MockClient::new(config.mock_delay),
            )),
            BackendKind::Mock => CompletionClient::Mock(MockClient::new(config.mock_delay)),
        };
        info!("Using completion backend: {}", client.provider_label());
        client
    }

    pub async fn generate_response(&self, prompt: &str) -> Result<String, CompletionError> {
        match self {
            CompletionClient::OpenAi(client) => client.generate_response(prompt).await,
            CompletionClient::Gemini(client) => client.generate_response(prompt).await,
            CompletionClient::Mock(client) => client.generate_response(prompt).await,
        }
    }

    /// Short line shown under the panel title.
    pub fn provider_label(&self) -> &'static str {
        match self {
            CompletionClient::OpenAi(_) => "Powered by OpenAI",
            CompletionClient::Gemini(_) => "Powered by Gemini",
            CompletionClient::Mock(_) => "Demo responses",
        }
    }
}

/// Pulls `error.message` out of an upstream error body.
fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| "Unknown error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(backend: BackendKind) -> AppConfig {
        let mut config = AppConfig::from_lookup(|_| None).unwrap();
        config.backend = backend;
        config.mock_delay = Duration::ZERO;
        config
    }

    #[test]
    fn backend_follows_configuration() {
        assert!(matches!(
            CompletionClient::from_config(&config(BackendKind::OpenAi)),
            CompletionClient::OpenAi(_)
        ));
        assert!(matches!(
            CompletionClient::from_config(&config(BackendKind::Gemini)),
            CompletionClient::Gemini(_)
        ));
        let mock = CompletionClient::from_config(&config(BackendKind::Mock));
        assert_eq!(mock.provider_label(), "Demo responses");
    }

    #[tokio::test]
    async fn openai_without_key_reports_configuration_error() {
        let client = CompletionClient::from_config(&config(BackendKind::OpenAi));
        let err = client.generate_response("hello").await.unwrap_err();
        assert!(matches!(err, CompletionError::MissingCredential));
    }

    #[test]
    fn status_error_mentions_the_status_code() {
        let err = CompletionError::Status {
            status: 429,
            message: "Rate limit reached".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API request failed with status 429: Rate limit reached"
        );
    }

    #[test]
    fn extracts_upstream_error_message() {
        assert_eq!(
            upstream_error_message(r#"{"error":{"message":"quota exceeded"}}"#),
            "quota exceeded"
        );
        assert_eq!(upstream_error_message("{}"), "Unknown error");
    }
}
