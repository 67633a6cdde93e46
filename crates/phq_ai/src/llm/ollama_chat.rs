use std::time::Duration;

use phq_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::{chat_messages, non_empty_answer, ChatMessage, ChatModel};
use crate::http::post_json;
use crate::ollama::OllamaClient;

#[derive(Debug, Clone)]
pub struct OllamaChat {
    client: OllamaClient,
    model: String,
    temperature: f32,
}

impl OllamaChat {
    pub fn new(client: OllamaClient, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

impl ChatModel for OllamaChat {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/api/chat", self.client.base_url());
        let req = ChatRequest {
            model: &self.model,
            messages: chat_messages(system_prompt, user_prompt),
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };
        let resp: ChatResponse =
            post_json(&url, None, &req, Duration::from_secs(120), "GENERATION_FAILED")?;
        non_empty_answer(resp.message.and_then(|m| m.content))
    }
}
