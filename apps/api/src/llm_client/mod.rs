/// LLM Client — the single point of entry for all upstream model calls in Vidya.
///
/// ARCHITECTURAL RULE: No other module may call Gemini or Groq directly.
/// Handlers go through `LlmClient::generate`, which owns credential checks,
/// the per-provider concurrency cap and the call deadline.
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::{Config, ProviderSettings};

pub mod gemini;
pub mod groq;
pub mod prompts;

pub use prompts::Conversation;

/// Upstream backend selected by the request's `model` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Groq,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Gemini, ProviderKind::Groq];

    /// Exact, case-sensitive match on the wire name. Unknown names are never defaulted.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "gemini" => Some(ProviderKind::Gemini),
            "groq" => Some(ProviderKind::Groq),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Groq => "groq",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Gemini",
            ProviderKind::Groq => "Groq",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key not configured")]
    NotConfigured,

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API returned {status}: {body}")]
    Api {
        provider: ProviderKind,
        status: u16,
        body: String,
    },

    #[error("Invalid response format from {provider} API")]
    InvalidResponse { provider: ProviderKind },

    #[error("Invalid response format from {provider} API: {body}")]
    MalformedBody { provider: ProviderKind, body: String },

    #[error("{0}")]
    Blocked(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// One upstream chat backend. Implementations build their own payload shape
/// from the conversation and return only the reply text.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn generate(
        &self,
        conversation: &Conversation<'_>,
        model: &str,
        api_key: &str,
    ) -> Result<String, LlmError>;
}

#[derive(Clone)]
struct ProviderSlot {
    provider: Arc<dyn ChatProvider>,
    model: String,
    api_key: Option<String>,
    permits: Arc<Semaphore>,
}

/// Public view of a provider's configuration, safe to return to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    pub name: ProviderKind,
    pub model: String,
    pub configured: bool,
}

/// Dispatches chat generation to the configured providers.
#[derive(Clone)]
pub struct LlmClient {
    gemini: ProviderSlot,
    groq: ProviderSlot,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self> {
        // No client-level timeout: the deadline is enforced per call in `generate`.
        let http = Client::builder().build()?;

        let gemini = gemini::GeminiProvider::new(
            http.clone(),
            config.gemini.endpoint.clone(),
            config.generation,
        );
        let groq = groq::GroqProvider::new(http, config.groq.endpoint.clone(), config.generation);

        Ok(Self::with_providers(config, Arc::new(gemini), Arc::new(groq)))
    }

    /// Builds a client around arbitrary provider implementations.
    pub fn with_providers(
        config: &Config,
        gemini: Arc<dyn ChatProvider>,
        groq: Arc<dyn ChatProvider>,
    ) -> Self {
        debug_assert_eq!(gemini.kind(), ProviderKind::Gemini);
        debug_assert_eq!(groq.kind(), ProviderKind::Groq);

        let slot = |provider: Arc<dyn ChatProvider>, settings: &ProviderSettings| ProviderSlot {
            provider,
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            permits: Arc::new(Semaphore::new(config.provider_max_concurrency.max(1))),
        };

        Self {
            gemini: slot(gemini, config.provider(ProviderKind::Gemini)),
            groq: slot(groq, config.provider(ProviderKind::Groq)),
            timeout: config.provider_timeout,
        }
    }

    fn slot(&self, kind: ProviderKind) -> &ProviderSlot {
        match kind {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::Groq => &self.groq,
        }
    }

    pub fn providers(&self) -> Vec<ProviderInfo> {
        ProviderKind::ALL
            .iter()
            .map(|&kind| {
                let slot = self.slot(kind);
                ProviderInfo {
                    name: kind,
                    model: slot.model.clone(),
                    configured: slot.api_key.is_some(),
                }
            })
            .collect()
    }

    /// Produces one reply from `kind`.
    ///
    /// Fails with `NotConfigured` before any network I/O when the key is missing.
    /// Waiting for a concurrency permit counts against the deadline.
    /// Dropping the returned future aborts the in-flight upstream request.
    pub async fn generate(
        &self,
        kind: ProviderKind,
        conversation: &Conversation<'_>,
    ) -> Result<String, LlmError> {
        let slot = self.slot(kind);
        let api_key = slot.api_key.as_deref().ok_or(LlmError::NotConfigured)?;

        debug!(
            provider = %kind,
            model = %slot.model,
            history = conversation.history.len(),
            "Calling provider"
        );

        let call = async {
            // The semaphore is owned by the slot and never closed.
            let _permit = slot
                .permits
                .acquire()
                .await
                .expect("provider semaphore closed");
            slot.provider
                .generate(conversation, &slot.model, api_key)
                .await
        };

        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(provider = %kind, "Provider call exceeded {:?}", self.timeout);
                Err(LlmError::Timeout(self.timeout))
            }
        }
    }
}

/// Reads a non-success response into an `Api` error, keeping the raw body for debugging.
pub(crate) async fn api_error(provider: ProviderKind, response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!("{provider} API returned {status}: {body}");
    LlmError::Api {
        provider,
        status,
        body,
    }
}

/// Decodes a 2xx body, keeping the raw text when it is not the expected shape.
pub(crate) fn parse_body<T: DeserializeOwned>(
    provider: ProviderKind,
    text: &str,
) -> Result<T, LlmError> {
    serde_json::from_str(text).map_err(|e| {
        warn!("{provider} API returned an unreadable body ({e}): {text}");
        LlmError::MalformedBody {
            provider,
            body: text.to_string(),
        }
    })
}
