//! Axum route handlers for the Chat API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::chat::prompts::{GENERAL_ASSISTANT, INTERVIEW_COACH};
use crate::chat::validation::{validate_chat_request, RawChatRequest};
use crate::errors::AppError;
use crate::llm_client::prompts::Persona;
use crate::llm_client::{Conversation, ProviderInfo, ProviderKind};
use crate::models::chat::ChatReply;
use crate::state::AppState;

/// Provider the front end should preselect.
pub const DEFAULT_PROVIDER: ProviderKind = ProviderKind::Groq;

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub default: ProviderKind,
    pub providers: Vec<ProviderInfo>,
}

/// POST /api/chat
pub async fn handle_interview_chat(
    State(state): State<AppState>,
    body: Result<Json<RawChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    respond_as(&state, &INTERVIEW_COACH, body).await
}

/// POST /api/general-chat
pub async fn handle_general_chat(
    State(state): State<AppState>,
    body: Result<Json<RawChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    respond_as(&state, &GENERAL_ASSISTANT, body).await
}

/// GET /api/providers
pub async fn handle_list_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        default: DEFAULT_PROVIDER,
        providers: state.llm.providers(),
    })
}

/// Shared body of both chat endpoints: validate → build conversation → one provider call.
async fn respond_as(
    state: &AppState,
    persona: &Persona,
    body: Result<Json<RawChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(raw) = body?;
    let request = validate_chat_request(raw)?;

    info!(
        persona = persona.name,
        provider = request.provider.as_str(),
        history = request.history.len(),
        "Chat request"
    );

    let conversation = Conversation {
        persona,
        history: &request.history,
        message: &request.message,
    };

    let response = state
        .llm
        .generate(request.provider, &conversation)
        .await
        .map_err(|e| AppError::from_llm(request.provider, e))?;

    Ok(Json(ChatReply { response }))
}
