use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::{LlmError, ProviderKind};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{"error": "<Display>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{provider} API key not configured")]
    Configuration { provider: ProviderKind },

    #[error("{provider} API Error: {source}")]
    Provider {
        provider: ProviderKind,
        #[source]
        source: LlmError,
    },

    #[error("Server Error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// A missing credential is an operator problem, not an upstream failure.
    pub fn from_llm(provider: ProviderKind, err: LlmError) -> Self {
        match err {
            LlmError::NotConfigured => AppError::Configuration { provider },
            source => AppError::Provider { provider, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration { .. } | AppError::Provider { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Unreadable bodies are reported like any other unexpected failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Internal(anyhow::anyhow!(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::InvalidInput(msg) => tracing::debug!("Rejected request: {msg}"),
            AppError::Configuration { provider } => {
                tracing::error!("{provider} API key not configured")
            }
            AppError::Provider { provider, source } => {
                tracing::error!("{provider} API error: {source}")
            }
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
        }

        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
