//! Groq provider — OpenAI-compatible `chat/completions` over raw HTTP.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompts::{build_messages, ChatMessage};
use super::{api_error, parse_body, ChatProvider, Conversation, LlmError, ProviderKind};
use crate::config::GenerationSettings;

#[derive(Debug, Serialize)]
struct GroqRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GroqResponse {
    choices: Option<Vec<GroqChoice>>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: Option<GroqMessage>,
}

#[derive(Debug, Deserialize)]
struct GroqMessage {
    content: Option<String>,
}

impl GroqResponse {
    fn into_text(self) -> Option<String> {
        self.choices?.into_iter().next()?.message?.content
    }
}

pub struct GroqProvider {
    client: Client,
    endpoint: String,
    generation: GenerationSettings,
}

impl GroqProvider {
    pub fn new(client: Client, endpoint: String, generation: GenerationSettings) -> Self {
        Self {
            client,
            endpoint,
            generation,
        }
    }

    fn request_body<'a>(&self, conversation: &Conversation<'_>, model: &'a str) -> GroqRequest<'a> {
        GroqRequest {
            model,
            messages: build_messages(conversation),
            max_tokens: self.generation.max_tokens,
            temperature: self.generation.temperature,
        }
    }
}

#[async_trait]
impl ChatProvider for GroqProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    async fn generate(
        &self,
        conversation: &Conversation<'_>,
        model: &str,
        api_key: &str,
    ) -> Result<String, LlmError> {
        let body = self.request_body(conversation, model);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(ProviderKind::Groq, response).await);
        }

        let text = response.text().await?;
        let parsed: GroqResponse = parse_body(ProviderKind::Groq, &text)?;

        let reply = parsed.into_text().ok_or(LlmError::InvalidResponse {
            provider: ProviderKind::Groq,
        })?;

        debug!("Groq reply received ({} chars)", reply.len());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::prompts::Persona;
    use crate::models::chat::ChatTurn;
    use crate::test_support::{spawn_stub, StubReply};
    use axum::http::StatusCode;

    const PERSONA: Persona = Persona {
        name: "test",
        instructions: "You are terse.",
        system_suffix: None,
        user_label: "User",
        assistant_label: "Assistant",
    };

    fn provider(endpoint: String) -> GroqProvider {
        GroqProvider::new(
            Client::new(),
            endpoint,
            GenerationSettings {
                max_tokens: 1000,
                temperature: 0.7,
            },
        )
    }

    #[test]
    fn test_into_text_requires_choice_message_content() {
        let empty: GroqResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.into_text().is_none());

        let no_choices: GroqResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(no_choices.into_text().is_none());

        let no_message: GroqResponse = serde_json::from_str(r#"{"choices":[{}]}"#).unwrap();
        assert!(no_message.into_text().is_none());

        let ok: GroqResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"Hi"}}]}"#)
                .unwrap();
        assert_eq!(ok.into_text().as_deref(), Some("Hi"));
    }

    #[tokio::test]
    async fn test_generate_sends_structured_payload_with_bearer_key() {
        let stub = spawn_stub(StubReply::json(
            StatusCode::OK,
            r#"{"choices":[{"message":{"content":"Sure..."}}]}"#,
        ))
        .await;
        let history = vec![ChatTurn::user("Hi"), ChatTurn::assistant("Hello!")];
        let conversation = Conversation {
            persona: &PERSONA,
            history: &history,
            message: "Tell me about yourself",
        };

        let reply = provider(stub.url("/openai/v1/chat/completions"))
            .generate(&conversation, "llama-3.1-8b-instant", "gsk-test")
            .await
            .unwrap();

        assert_eq!(reply, "Sure...");
        let seen = stub.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "/openai/v1/chat/completions");
        assert_eq!(seen[0].header("authorization"), Some("Bearer gsk-test"));
        let body = &seen[0].body;
        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["max_tokens"], 1000);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "Hi");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3]["content"], "Tell me about yourself");
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported_with_body() {
        let stub = spawn_stub(StubReply::json(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Invalid API Key"}}"#,
        ))
        .await;
        let conversation = Conversation {
            persona: &PERSONA,
            history: &[],
            message: "Hi",
        };

        let err = provider(stub.url("/chat"))
            .generate(&conversation, "m", "bad-key")
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("401"), "{message}");
        assert!(message.contains("Invalid API Key"), "{message}");
    }

    #[tokio::test]
    async fn test_missing_choices_is_invalid_format() {
        let stub = spawn_stub(StubReply::json(StatusCode::OK, "{}")).await;
        let conversation = Conversation {
            persona: &PERSONA,
            history: &[],
            message: "Hi",
        };

        let err = provider(stub.url("/chat"))
            .generate(&conversation, "m", "key")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::InvalidResponse { .. }));
        assert_eq!(err.to_string(), "Invalid response format from Groq API");
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_invalid_format_with_body() {
        let stub = spawn_stub(StubReply::json(StatusCode::OK, "<html>gateway</html>")).await;
        let conversation = Conversation {
            persona: &PERSONA,
            history: &[],
            message: "Hi",
        };

        let err = provider(stub.url("/chat"))
            .generate(&conversation, "m", "key")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::MalformedBody { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid response format from Groq API: <html>gateway</html>"
        );
    }
}
