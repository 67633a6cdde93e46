use std::fs;

use phq_core::domain::SourceDescriptor;
use phq_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::chunking::{chunk_document, ChunkingOptions};
use super::dedupe::dedupe;
use super::index::{build_index, IndexedCorpus};
use super::model::Chunk;
use super::tokenize::TextTokenizer;
use crate::embeddings::Embedder;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildReport {
    pub sources_total: usize,
    pub sources_skipped: usize,
    /// Chunks produced before deduplication.
    pub chunks_total: usize,
    pub chunks_unique: usize,
}

/// Read and chunk every source. A source that cannot be read or tokenized is logged and
/// skipped; an invalid token budget fails before any file is touched.
pub fn chunk_sources(
    sources: &[SourceDescriptor],
    tokenizer: &dyn TextTokenizer,
    opts: &ChunkingOptions,
) -> Result<(Vec<Chunk>, BuildReport), AppError> {
    let budget = opts.token_budget()?;
    tracing::info!(sources = sources.len(), budget, "chunking sources");

    let mut report = BuildReport {
        sources_total: sources.len(),
        ..BuildReport::default()
    };
    let mut all = Vec::new();
    for src in sources {
        let raw = match fs::read_to_string(&src.filepath) {
            Ok(raw) => raw,
            Err(e) => {
                let err = AppError::new("CORPUS_SOURCE_UNREADABLE", "Failed to read source file")
                    .with_details(format!("path={}; err={}", src.filepath.display(), e));
                tracing::warn!(error = %err, "skipping source");
                report.sources_skipped += 1;
                continue;
            }
        };

        match chunk_document(&raw, &src.metadata, &src.section_headers, tokenizer, opts) {
            Ok(chunks) => {
                tracing::info!(
                    source = %src.metadata.source_title,
                    chunks = chunks.len(),
                    "chunked source"
                );
                all.extend(chunks);
            }
            Err(e) => {
                tracing::warn!(source = %src.metadata.source_title, error = %e, "skipping source");
                report.sources_skipped += 1;
            }
        }
    }

    report.chunks_total = all.len();
    Ok((all, report))
}

/// Chunk, dedupe, embed and index the configured sources.
pub fn build_corpus(
    sources: &[SourceDescriptor],
    tokenizer: &dyn TextTokenizer,
    embedder: &dyn Embedder,
    opts: &ChunkingOptions,
) -> Result<(IndexedCorpus, BuildReport), AppError> {
    let (chunks, mut report) = chunk_sources(sources, tokenizer, opts)?;
    let unique = dedupe(chunks);
    report.chunks_unique = unique.len();
    tracing::info!(
        original = report.chunks_total,
        unique = report.chunks_unique,
        "deduplicated chunks"
    );

    if unique.is_empty() {
        return Err(AppError::new("CORPUS_EMPTY", "No chunks were produced from the sources")
            .with_details(format!(
                "sources={}; skipped={}",
                report.sources_total, report.sources_skipped
            )));
    }

    let corpus = build_index(unique, embedder)?;
    Ok((corpus, report))
}
