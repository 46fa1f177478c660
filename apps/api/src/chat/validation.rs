use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::ProviderKind;
use crate::models::chat::{ChatRequest, ChatTurn};

pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const INVALID_MODEL: &str = "Invalid model selected";
pub const INVALID_HISTORY: &str = "Invalid history format";

/// Request body as sent by the client, before any checks.
/// Fields stay untyped so a wrongly-typed value is a validation failure, not a body rejection.
#[derive(Debug, Deserialize)]
pub struct RawChatRequest {
    pub message: Option<Value>,
    pub model: Option<Value>,
    pub history: Option<Value>,
}

/// Validates a raw body. Checked in order: message, model, history. All
/// checks run before anything touches the network.
pub fn validate_chat_request(raw: RawChatRequest) -> Result<ChatRequest, AppError> {
    let message = match raw.message {
        Some(Value::String(m)) if !m.trim().is_empty() => m,
        _ => return Err(AppError::InvalidInput(MESSAGE_REQUIRED.to_string())),
    };

    let provider = raw
        .model
        .as_ref()
        .and_then(Value::as_str)
        .and_then(ProviderKind::parse)
        .ok_or_else(|| AppError::InvalidInput(INVALID_MODEL.to_string()))?;

    let history = match raw.history {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value::<Vec<ChatTurn>>(value)
            .map_err(|_| AppError::InvalidInput(INVALID_HISTORY.to_string()))?,
    };

    Ok(ChatRequest {
        message,
        provider,
        history,
    })
}
