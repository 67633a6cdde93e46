//! Layered configuration: built-in defaults, then `philquery.toml`, then `PHILQUERY_*`
//! environment variables (nested keys split on `__`, e.g. `PHILQUERY_CHAT__API_KEY`).

use std::env;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::domain::SourceDescriptor;
use crate::error::AppError;

pub const DEFAULT_CONFIG_FILE: &str = "philquery.toml";
pub const CONFIG_PATH_ENV: &str = "PHILQUERY_CONFIG";
const ENV_PREFIX: &str = "PHILQUERY_";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// Local Ollama daemon on 127.0.0.1.
    Ollama,
    /// Any OpenAI-compatible endpoint (OpenAI, Groq, vLLM, ...).
    OpenAi,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkingConfig {
    /// Requested token budget per chunk before clamping to the model limit.
    pub chunk_size_tokens: usize,
    /// Maximum sequence length of the tokenizer's model.
    pub model_max_length: usize,
    /// Slots reserved for special tokens such as `[CLS]`/`[SEP]`.
    pub special_tokens: usize,
    /// HuggingFace `tokenizer.json` used to measure and split paragraphs. The defaults
    /// above match `bert-base-uncased`, whose file is published at
    /// <https://huggingface.co/bert-base-uncased/resolve/main/tokenizer.json>.
    pub tokenizer_path: PathBuf,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size_tokens: 450,
            model_max_length: 512,
            special_tokens: 2,
            tokenizer_path: PathBuf::from("tokenizer.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingsConfig {
    pub provider: ModelProvider,
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Maximum texts per HTTP request; larger inputs are sent in several requests.
    pub batch_size: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Ollama,
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "all-minilm".to_string(),
            api_key: None,
            batch_size: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatConfig {
    pub provider: ModelProvider,
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub temperature: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::OpenAi,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            api_key: None,
            temperature: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
    /// Browser origins allowed to call the HTTP API.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhilQueryConfig {
    /// Artifacts are written as `{index_prefix}.index` and `{index_prefix}_chunk_store.json`.
    pub index_prefix: PathBuf,
    /// Base directory for relative source file paths.
    pub data_dir: PathBuf,
    pub default_top_k: usize,
    pub chunking: ChunkingConfig,
    pub embeddings: EmbeddingsConfig,
    pub chat: ChatConfig,
    pub server: ServerConfig,
    pub sources: Vec<SourceDescriptor>,
}

impl Default for PhilQueryConfig {
    fn default() -> Self {
        Self {
            index_prefix: PathBuf::from("rousseau_works"),
            data_dir: PathBuf::from("data"),
            default_top_k: 5,
            chunking: ChunkingConfig::default(),
            embeddings: EmbeddingsConfig::default(),
            chat: ChatConfig::default(),
            server: ServerConfig::default(),
            sources: Vec::new(),
        }
    }
}

impl PhilQueryConfig {
    /// Load from `path`, or from `$PHILQUERY_CONFIG`, or from `./philquery.toml`.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => env::var(CONFIG_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
        };
        tracing::debug!(path = %path.display(), "loading configuration");

        let figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(&path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self, AppError> {
        let cfg: Self = figment.extract().map_err(|e| {
            AppError::new("CONFIG_INVALID", "Failed to load configuration").with_details(e.to_string())
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.chunking.chunk_size_tokens == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "chunking.chunk_size_tokens must be positive",
            ));
        }
        if self.default_top_k == 0 {
            return Err(AppError::new("CONFIG_INVALID", "default_top_k must be positive"));
        }
        if self.embeddings.batch_size == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "embeddings.batch_size must be positive",
            ));
        }
        for (field, value) in [
            ("embeddings.base_url", &self.embeddings.base_url),
            ("embeddings.model", &self.embeddings.model),
            ("chat.base_url", &self.chat.base_url),
            ("chat.model", &self.chat.model),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::new("CONFIG_INVALID", format!("{field} must not be empty")));
            }
        }
        for src in self.sources.iter() {
            if src.metadata.source_title.trim().is_empty() {
                return Err(AppError::new("CONFIG_INVALID", "Source title must not be empty")
                    .with_details(format!("filepath={}", src.filepath.display())));
            }
            if let Some(position) = src.section_headers.iter().position(|h| h.trim().is_empty()) {
                return Err(AppError::new("CONFIG_INVALID", "Section headers must not be blank")
                    .with_details(format!("filepath={}; position={position}", src.filepath.display())));
            }
        }
        if let Some(origin) = self.server.cors_origins.iter().find(|o| o.trim().is_empty()) {
            return Err(AppError::new("CONFIG_INVALID", "server.cors_origins entries must not be empty")
                .with_details(format!("origin={origin:?}")));
        }
        Ok(())
    }

    /// Source descriptors with relative file paths resolved against `data_dir`.
    pub fn resolved_sources(&self) -> Vec<SourceDescriptor> {
        self.sources
            .iter()
            .map(|s| {
                let mut s = s.clone();
                if s.filepath.is_relative() {
                    s.filepath = self.data_dir.join(&s.filepath);
                }
                s
            })
            .collect()
    }
}
