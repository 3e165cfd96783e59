use anyhow::{bail, Result};
use log::warn;
use std::env;
use std::time::Duration;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

/// Which completion backend answers chat messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    OpenAi,
    Gemini,
    Mock,
}

impl BackendKind {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(BackendKind::OpenAi),
            "gemini" => Ok(BackendKind::Gemini),
            "mock" => Ok(BackendKind::Mock),
            other => bail!("Unknown ASSISTANT_BACKEND '{}' (expected openai, gemini or mock)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Settings read once at startup and handed to the server and clients.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    pub backend: BackendKind,
    pub openai: OpenAiConfig,
    pub gemini: GeminiConfig,
    pub mock_delay: Duration,
    pub max_sessions: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("ASSISTANT_BACKEND") {
            Some(value) => BackendKind::parse(&value)?,
            None => BackendKind::OpenAi,
        };

        let port = parse_or(&lookup, "PORT", 8080u16);
        let mock_delay_ms = parse_or(&lookup, "MOCK_DELAY_MS", 1000u64);
        let max_sessions = parse_or(&lookup, "MAX_SESSIONS", 1000usize);

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            backend,
            openai: OpenAiConfig {
                api_url: lookup("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
                model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                api_key: non_empty(lookup("OPENAI_API_KEY")),
            },
            gemini: GeminiConfig {
                api_url: lookup("GEMINI_API_URL").unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                api_key: non_empty(lookup("GEMINI_API_KEY")),
            },
            mock_delay: Duration::from_millis(mock_delay_ms),
            max_sessions,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!("Ignoring invalid {} value '{}', using {}", name, raw, default);
            default
        }),
        None => default,
    }
}

// An empty key counts as missing.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
