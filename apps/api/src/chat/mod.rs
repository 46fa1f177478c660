// Chat API: two personas sharing one handler.
// All provider calls go through llm_client — no direct Gemini/Groq calls here.

pub mod handlers;
pub mod prompts;
pub mod validation;
