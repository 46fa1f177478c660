// Payload builders shared by every persona.
// Persona text itself lives next to the chat handlers in chat/prompts.rs.

use serde::Serialize;

use crate::models::chat::{ChatTurn, Role};

/// A fixed assistant character: instructions plus the speaker labels used
/// when the conversation is flattened into a single text prompt.
#[derive(Debug)]
pub struct Persona {
    pub name: &'static str,
    pub instructions: &'static str,
    /// Appended to the system message of structured payloads only.
    pub system_suffix: Option<&'static str>,
    pub user_label: &'static str,
    pub assistant_label: &'static str,
}

impl Persona {
    fn label(&self, role: Role) -> &'static str {
        match role {
            Role::User => self.user_label,
            Role::Assistant => self.assistant_label,
        }
    }

    pub fn system_prompt(&self) -> String {
        match self.system_suffix {
            Some(suffix) => format!("{}\n\n{}", self.instructions, suffix),
            None => self.instructions.to_string(),
        }
    }
}

/// Everything a provider needs to produce one reply.
#[derive(Debug, Clone, Copy)]
pub struct Conversation<'a> {
    pub persona: &'a Persona,
    pub history: &'a [ChatTurn],
    pub message: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Role-tagged entry of an OpenAI-style `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Flattens the conversation into one prompt ending with an open assistant cue,
/// so the model continues as the persona.
pub fn build_text_prompt(conversation: &Conversation<'_>) -> String {
    let persona = conversation.persona;
    let mut prompt = String::from(persona.instructions);

    if !conversation.history.is_empty() {
        let context = conversation
            .history
            .iter()
            .map(|turn| format!("{}: {}", persona.label(turn.role), turn.content))
            .collect::<Vec<_>>()
            .join("\n");
        prompt.push_str("\n\nCurrent conversation context:\n");
        prompt.push_str(&context);
    }

    prompt.push_str(&format!(
        "\n\n{}: {}\n{}:",
        persona.user_label, conversation.message, persona.assistant_label
    ));
    prompt
}

/// System entry, then history in the order given, then the current message.
/// Always `history.len() + 2` entries.
pub fn build_messages(conversation: &Conversation<'_>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(conversation.history.len() + 2);

    messages.push(ChatMessage {
        role: MessageRole::System,
        content: conversation.persona.system_prompt(),
    });

    messages.extend(conversation.history.iter().map(|turn| ChatMessage {
        role: match turn.role {
            Role::User => MessageRole::User,
            Role::Assistant => MessageRole::Assistant,
        },
        content: turn.content.clone(),
    }));

    messages.push(ChatMessage {
        role: MessageRole::User,
        content: conversation.message.to_string(),
    });

    messages
}
