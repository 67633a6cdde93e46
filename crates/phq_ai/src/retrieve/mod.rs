use phq_core::error::AppError;

use crate::corpus::{Chunk, IndexedCorpus};
use crate::embeddings::Embedder;

pub mod distance;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievedChunk<'a> {
    pub chunk: &'a Chunk,
    /// 1-based position in the search result.
    pub rank: u32,
    pub distance: f32,
}

/// Embed `query` and return the `top_k` nearest chunks, nearest first.
///
/// Asking for more chunks than the corpus holds returns all of them.
pub fn retrieve<'a>(
    corpus: &'a IndexedCorpus,
    embedder: &dyn Embedder,
    query: &str,
    top_k: usize,
) -> Result<Vec<RetrievedChunk<'a>>, AppError> {
    let q = query.trim();
    if q.is_empty() {
        return Err(AppError::new("RETRIEVAL_INVALID_REQUEST", "Query must not be empty"));
    }
    if top_k == 0 {
        return Err(AppError::new(
            "RETRIEVAL_INVALID_REQUEST",
            "top_k must be a positive integer",
        ));
    }

    let qv = embedder.embed_one(q).map_err(|e| {
        AppError::new("RETRIEVAL_FAILED", "Failed to embed query")
            .with_details(e.to_string())
            .with_retryable(e.retryable)
    })?;
    let neighbors = corpus.index().search(&qv, top_k)?;

    let mut out = Vec::with_capacity(neighbors.len());
    for (pos, n) in neighbors.into_iter().enumerate() {
        let chunk = corpus.chunks().get(n.id).ok_or_else(|| {
            AppError::new("RETRIEVAL_FAILED", "Search returned an id outside the chunk store")
                .with_details(format!("id={}; chunks={}", n.id, corpus.len()))
        })?;
        out.push(RetrievedChunk {
            chunk,
            rank: pos as u32 + 1,
            distance: n.distance,
        });
    }
    tracing::debug!(requested = top_k, returned = out.len(), "retrieved chunks");
    Ok(out)
}
