use phq_core::error::AppError;

/// Capability: given a system prompt and a user prompt, return generated text.
pub trait ChatModel {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AppError>;
}

pub mod ollama_chat;
pub mod openai_chat;

#[derive(Debug, Clone, serde::Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

pub(crate) fn chat_messages<'a>(system_prompt: &'a str, user_prompt: &'a str) -> [ChatMessage<'a>; 2] {
    [
        ChatMessage {
            role: "system",
            content: system_prompt,
        },
        ChatMessage {
            role: "user",
            content: user_prompt,
        },
    ]
}

pub(crate) fn non_empty_answer(content: Option<String>) -> Result<String, AppError> {
    match content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AppError::new("GENERATION_FAILED", "Chat response was empty")),
    }
}
