use std::sync::Arc;

use phq_core::config::{ChatConfig, EmbeddingsConfig, ModelProvider};
use phq_core::error::AppError;

use crate::embeddings::ollama_embed::OllamaEmbedder;
use crate::embeddings::openai_embed::OpenAiEmbedder;
use crate::embeddings::Embedder;
use crate::llm::ollama_chat::OllamaChat;
use crate::llm::openai_chat::OpenAiChat;
use crate::llm::ChatModel;
use crate::ollama::OllamaClient;
use crate::openai::OpenAiClient;

pub type SharedEmbedder = Arc<dyn Embedder + Send + Sync>;
pub type SharedChatModel = Arc<dyn ChatModel + Send + Sync>;

pub fn embedder_from_config(cfg: &EmbeddingsConfig) -> Result<SharedEmbedder, AppError> {
    let embedder: SharedEmbedder = match cfg.provider {
        ModelProvider::Ollama => Arc::new(OllamaEmbedder::new(
            OllamaClient::new(&cfg.base_url)?,
            cfg.model.as_str(),
            cfg.batch_size,
        )),
        ModelProvider::OpenAi => Arc::new(OpenAiEmbedder::new(
            OpenAiClient::new(&cfg.base_url, cfg.api_key.clone())?,
            cfg.model.as_str(),
            cfg.batch_size,
        )),
    };
    tracing::debug!(provider = ?cfg.provider, model = %cfg.model, "configured embedder");
    Ok(embedder)
}

pub fn chat_from_config(cfg: &ChatConfig) -> Result<SharedChatModel, AppError> {
    let chat: SharedChatModel = match cfg.provider {
        ModelProvider::Ollama => Arc::new(OllamaChat::new(
            OllamaClient::new(&cfg.base_url)?,
            cfg.model.as_str(),
            cfg.temperature,
        )),
        ModelProvider::OpenAi => {
            if cfg.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
                tracing::warn!(base_url = %cfg.base_url, "chat api_key is not set; requests will be unauthenticated");
            }
            Arc::new(OpenAiChat::new(
                OpenAiClient::new(&cfg.base_url, cfg.api_key.clone())?,
                cfg.model.as_str(),
                cfg.temperature,
            ))
        }
    };
    tracing::debug!(provider = ?cfg.provider, model = %cfg.model, "configured chat model");
    Ok(chat)
}

/// Probe the local Ollama daemon when either capability is served by it.
pub fn check_local_models(embeddings: &EmbeddingsConfig, chat: &ChatConfig) -> Result<(), AppError> {
    for (provider, base_url) in [
        (embeddings.provider, embeddings.base_url.as_str()),
        (chat.provider, chat.base_url.as_str()),
    ] {
        if provider == ModelProvider::Ollama {
            OllamaClient::new(base_url)?.health_check()?;
        }
    }
    Ok(())
}
