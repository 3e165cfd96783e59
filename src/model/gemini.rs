use log::{debug, error, info};
use reqwest::Client;
use serde_json::{json, Value};

use super::mock::MockClient;
use super::{upstream_error_message, CompletionError};
use crate::config::GeminiConfig;

const PLACEHOLDER_KEY: &str = "YOUR_API_KEY";

/// Client for the Gemini `generateContent` endpoint.
///
/// Without a usable key it answers from the mock table instead.
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
    fallback: MockClient,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig, fallback: MockClient) -> Self {
        Self {
            config,
            client: Client::new(),
            fallback,
        }
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| *key != PLACEHOLDER_KEY)
    }

    pub async fn generate_response(&self, prompt: &str) -> Result<String, CompletionError> {
        let api_key = match self.api_key() {
            Some(key) => key,
            None => {
                info!("No Gemini API key configured, falling back to mock responses");
                return self.fallback.generate_response(prompt).await;
            }
        };

        debug!("Calling Gemini API with prompt: {}", prompt);
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model
        );

        let payload = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ],
            "generationConfig": {
                "temperature": 0.7,
                "topK": 40,
                "topP": 0.95,
                "maxOutputTokens": 1024
            }
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Gemini API error ({}): {}", status, body);
            return Err(CompletionError::Status {
                status: status.as_u16(),
                message: upstream_error_message(&body),
            });
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|_| CompletionError::InvalidResponse("Gemini"))?;

        let text = response_json
            .get("candidates")
            .and_then(|candidates| candidates.get(0))
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.get(0))
            .and_then(|part| part.get("text"))
            .and_then(|text| text.as_str())
            .ok_or(CompletionError::InvalidResponse("Gemini"))?;

        info!("Response length: {} characters", text.len());
        Ok(text.to_string())
    }
}
