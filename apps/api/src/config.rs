use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;

use crate::llm_client::ProviderKind;

pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Endpoint, model and credential for one upstream provider.
/// `api_key` is optional on purpose: a missing key only fails the requests that need it.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Application configuration loaded once from environment variables.
/// Fails at startup only on malformed values; provider keys are optional.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub gemini: ProviderSettings,
    pub groq: ProviderSettings,
    pub generation: GenerationSettings,
    pub provider_timeout: Duration,
    pub provider_max_concurrency: usize,
    /// Empty means permissive CORS.
    pub cors_allowed_origins: Vec<HeaderValue>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            gemini: ProviderSettings {
                endpoint: env_or("GEMINI_API_URL", DEFAULT_GEMINI_API_URL),
                model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                api_key: optional_env("GEMINI_API_KEY"),
            },
            groq: ProviderSettings {
                endpoint: env_or("GROQ_API_URL", DEFAULT_GROQ_API_URL),
                model: env_or("GROQ_MODEL", DEFAULT_GROQ_MODEL),
                api_key: optional_env("GROQ_API_KEY"),
            },
            generation: GenerationSettings {
                max_tokens: parse_env("LLM_MAX_TOKENS", 1000)?,
                temperature: parse_env("LLM_TEMPERATURE", 0.7)?,
            },
            provider_timeout: Duration::from_secs(parse_env("PROVIDER_TIMEOUT_SECS", 30)?),
            provider_max_concurrency: parse_env("PROVIDER_MAX_CONCURRENCY", 16)?,
            cors_allowed_origins: parse_origins(
                optional_env("CORS_ALLOWED_ORIGINS").as_deref().unwrap_or_default(),
            )?,
        })
    }

    pub fn provider(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::Groq => &self.groq,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("CORS_ALLOWED_ORIGINS contains an invalid origin '{origin}'"))
        })
        .collect()
}

#[cfg(test)]
pub fn test_config(gemini_url: &str, groq_url: &str) -> Config {
    Config {
        port: 0,
        rust_log: "debug".to_string(),
        gemini: ProviderSettings {
            endpoint: gemini_url.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_key: Some("test-gemini-key".to_string()),
        },
        groq: ProviderSettings {
            endpoint: groq_url.to_string(),
            model: DEFAULT_GROQ_MODEL.to_string(),
            api_key: Some("test-groq-key".to_string()),
        },
        generation: GenerationSettings {
            max_tokens: 1000,
            temperature: 0.7,
        },
        provider_timeout: Duration::from_secs(5),
        provider_max_concurrency: 4,
        cors_allowed_origins: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_skips_empty() {
        let origins = parse_origins(" http://localhost:3000 ,,https://vidya.app ").unwrap();
        assert_eq!(origins, vec!["http://localhost:3000", "https://vidya.app"]);
        assert!(parse_origins("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_origins_rejects_control_characters() {
        assert!(parse_origins("http://bad\norigin").is_err());
    }

    #[test]
    fn test_provider_lookup() {
        let config = test_config("http://gemini", "http://groq");
        assert_eq!(config.provider(ProviderKind::Gemini).endpoint, "http://gemini");
        assert_eq!(config.provider(ProviderKind::Groq).endpoint, "http://groq");
    }
}
