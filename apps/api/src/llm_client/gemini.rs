//! Gemini provider — REST `generateContent` with a single flattened text prompt.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompts::build_text_prompt;
use super::{api_error, parse_body, ChatProvider, Conversation, LlmError, ProviderKind};
use crate::config::GenerationSettings;

/// Finish reasons after which the candidate text must not be relayed.
const BLOCKED_FINISH_REASONS: &[&str] = &["SAFETY", "RECITATION", "LANGUAGE"];

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiTextPart>,
}

#[derive(Debug, Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl GeminiResponse {
    /// Concatenates the text parts of the first candidate.
    fn into_text(self) -> Result<String, LlmError> {
        let candidate = self.candidates.and_then(|c| c.into_iter().next());

        let Some(candidate) = candidate else {
            if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(LlmError::Blocked(format!(
                    "Response was blocked due to {reason}"
                )));
            }
            return Err(LlmError::InvalidResponse {
                provider: ProviderKind::Gemini,
            });
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if BLOCKED_FINISH_REASONS.contains(&reason) {
                return Err(LlmError::Blocked(format!(
                    "Candidate was blocked due to {reason}"
                )));
            }
        }

        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if texts.is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: ProviderKind::Gemini,
            });
        }

        Ok(texts.concat())
    }
}

pub struct GeminiProvider {
    client: Client,
    /// Base models URL; the model id and `:generateContent` are appended per call.
    endpoint: String,
    generation: GenerationSettings,
}

impl GeminiProvider {
    pub fn new(client: Client, endpoint: String, generation: GenerationSettings) -> Self {
        Self {
            client,
            endpoint,
            generation,
        }
    }

    fn url(&self, model: &str) -> String {
        format!(
            "{}/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            model
        )
    }

    fn request_body(&self, conversation: &Conversation<'_>) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiTextPart {
                    text: build_text_prompt(conversation),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.generation.max_tokens,
                temperature: self.generation.temperature,
            },
        }
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn generate(
        &self,
        conversation: &Conversation<'_>,
        model: &str,
        api_key: &str,
    ) -> Result<String, LlmError> {
        let response = self
            .client
            .post(self.url(model))
            .header("x-goog-api-key", api_key)
            .json(&self.request_body(conversation))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(ProviderKind::Gemini, response).await);
        }

        let text = response.text().await?;
        let reply = parse_body::<GeminiResponse>(ProviderKind::Gemini, &text)?.into_text()?;

        debug!("Gemini reply received ({} chars)", reply.len());
        Ok(reply)
    }
}
