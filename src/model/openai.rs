use log::{debug, error, info};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};

use super::{upstream_error_message, CompletionError};
use crate::config::OpenAiConfig;

const SYSTEM_INSTRUCTION: &str = "You are a helpful AI assistant for a shop management system. \
Provide concise, practical advice about inventory management, sales strategies, customer relations, \
employee management, and other retail business topics. Limit responses to 2-3 paragraphs maximum.";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 500;

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum WireRole {
    System,
    User,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: WireRole,
    content: &'a str,
}

/// Client for an OpenAI-style chat completions endpoint.
///
/// Each call sends the fixed system instruction and the single prompt;
/// no earlier turns are included.
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        info!("OpenAI client targets {} with model {}", config.api_url, config.model);
        Self {
            config,
            client: Client::new(),
        }
    }

    pub async fn generate_response(&self, prompt: &str) -> Result<String, CompletionError> {
        debug!("Calling OpenAI API with prompt: {}", prompt);

        let api_key = match self.config.api_key.as_deref() {
            Some(key) => key,
            None => {
                error!("OpenAI API key is not configured");
                return Err(CompletionError::MissingCredential);
            }
        };

        let messages = vec![
            WireMessage {
                role: WireRole::System,
                content: SYSTEM_INSTRUCTION,
            },
            WireMessage {
                role: WireRole::User,
                content: prompt,
            },
        ];

        let payload = json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = upstream_error_message(&body);
            error!("OpenAI API error ({}): {}", status, body);
            return Err(CompletionError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|_| CompletionError::InvalidResponse("OpenAI"))?;
        debug!("Response JSON: {}", response_json);

        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or(CompletionError::InvalidResponse("OpenAI"))?;

        info!("Response length: {} characters", content.len());
        Ok(content.to_string())
    }
}
