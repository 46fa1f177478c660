use serde::{Deserialize, Serialize};

use crate::llm_client::ProviderKind;

/// Speaker of a history turn.
///
/// Clients send free-form role strings; only `"user"` maps to `User`,
/// everything else (including a missing or null role) is an assistant turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum Role {
    User,
    #[default]
    Assistant,
}

impl From<Option<String>> for Role {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("user") => Role::User,
            _ => Role::Assistant,
        }
    }
}

/// One prior exchange in the client-held conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

#[cfg(test)]
impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A request that passed validation. Only constructed by `chat::validation`.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub provider: ProviderKind,
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}
