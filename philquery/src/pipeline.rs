use std::sync::Arc;

use phq_ai::answer::{ask, AskResponse, PromptMode};
use phq_ai::corpus::{self, BuildReport, ChunkingOptions, HfTokenizer, IndexedCorpus};
use phq_ai::embeddings::Embedder;
use phq_ai::providers::{chat_from_config, embedder_from_config, SharedChatModel, SharedEmbedder};
use phq_core::config::PhilQueryConfig;
use phq_core::domain::{list_sources, SourceDescriptor, SourceListing};
use phq_core::error::AppError;

/// Everything a front end needs to answer questions: the loaded pair, the two model
/// capabilities and the source catalog. Read-only once constructed.
#[derive(Clone)]
pub struct Pipeline {
    corpus: Arc<IndexedCorpus>,
    embedder: SharedEmbedder,
    chat: SharedChatModel,
    sources: Vec<SourceListing>,
    default_top_k: usize,
}

impl Pipeline {
    pub fn new(
        corpus: IndexedCorpus,
        embedder: SharedEmbedder,
        chat: SharedChatModel,
        sources: &[SourceDescriptor],
        default_top_k: usize,
    ) -> Self {
        Self {
            corpus: Arc::new(corpus),
            embedder,
            chat,
            sources: list_sources(sources),
            default_top_k,
        }
    }

    /// Wire the configured providers and load the persisted pair, building it first when
    /// it is not available and `build_if_missing` is set.
    pub fn from_config(cfg: &PhilQueryConfig, build_if_missing: bool) -> Result<Self, AppError> {
        let embedder = embedder_from_config(&cfg.embeddings)?;
        let chat = chat_from_config(&cfg.chat)?;
        let corpus = load_or_build(cfg, embedder.as_ref(), build_if_missing)?;
        Ok(Self::new(corpus, embedder, chat, &cfg.sources, cfg.default_top_k))
    }

    /// Answer one question. `top_k` falls back to the configured default.
    pub fn ask(&self, question: &str, mode: PromptMode, top_k: Option<usize>) -> Result<AskResponse, AppError> {
        let top_k = top_k.unwrap_or(self.default_top_k);
        ask(
            &self.corpus,
            self.embedder.as_ref(),
            self.chat.as_ref(),
            question,
            mode,
            top_k,
        )
    }

    pub fn sources(&self) -> &[SourceListing] {
        &self.sources
    }

    pub fn chunk_count(&self) -> usize {
        self.corpus.len()
    }
}

pub fn chunking_options(cfg: &PhilQueryConfig) -> ChunkingOptions {
    ChunkingOptions {
        max_tokens: cfg.chunking.chunk_size_tokens,
        model_max_length: cfg.chunking.model_max_length,
        special_tokens: cfg.chunking.special_tokens,
    }
}

/// Run the offline build and replace the persisted pair.
pub fn build_and_save(
    cfg: &PhilQueryConfig,
    embedder: &dyn Embedder,
) -> Result<(IndexedCorpus, BuildReport), AppError> {
    let tokenizer = HfTokenizer::from_file(&cfg.chunking.tokenizer_path)?;
    let sources = cfg.resolved_sources();
    let (built, report) = corpus::build_corpus(&sources, &tokenizer, embedder, &chunking_options(cfg))?;
    corpus::save(&built, &cfg.index_prefix)?;
    tracing::info!(
        sources = report.sources_total,
        skipped = report.sources_skipped,
        chunks = report.chunks_total,
        unique = report.chunks_unique,
        "index build complete"
    );
    Ok((built, report))
}

pub fn load_or_build(
    cfg: &PhilQueryConfig,
    embedder: &dyn Embedder,
    build_if_missing: bool,
) -> Result<IndexedCorpus, AppError> {
    if let Some(loaded) = corpus::load(&cfg.index_prefix) {
        return Ok(loaded);
    }
    if !build_if_missing {
        return Err(AppError::new(
            "INDEX_NOT_AVAILABLE",
            "No valid index found; run build_index or pass --build-if-missing",
        )
        .with_details(format!("index_prefix={}", cfg.index_prefix.display())));
    }

    tracing::info!(prefix = %cfg.index_prefix.display(), "building index from scratch");
    let (built, _) = build_and_save(cfg, embedder)?;
    Ok(built)
}
