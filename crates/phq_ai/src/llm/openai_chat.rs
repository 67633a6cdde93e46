use std::time::Duration;

use phq_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::{chat_messages, non_empty_answer, ChatMessage, ChatModel};
use crate::http::post_json;
use crate::openai::OpenAiClient;

#[derive(Debug, Clone)]
pub struct OpenAiChat {
    client: OpenAiClient,
    model: String,
    temperature: f32,
}

impl OpenAiChat {
    pub fn new(client: OpenAiClient, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

impl ChatModel for OpenAiChat {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AppError> {
        let url = self.client.endpoint("chat/completions");
        let req = CompletionRequest {
            model: &self.model,
            messages: chat_messages(system_prompt, user_prompt),
            temperature: self.temperature,
        };
        let resp: CompletionResponse = post_json(
            &url,
            self.client.api_key(),
            &req,
            Duration::from_secs(120),
            "GENERATION_FAILED",
        )?;
        non_empty_answer(resp.choices.into_iter().next().and_then(|c| c.message.content))
    }
}
