use std::cmp::Ordering;

use phq_core::error::AppError;

use super::model::Chunk;
use crate::embeddings::Embedder;
use crate::retrieve::distance::{all_finite, squared_l2};

/// Exact (brute-force) L2 index. Vector `i` is stored at `data[i * dims..(i + 1) * dims]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dims: usize,
    data: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: usize,
    /// Squared L2 distance to the query.
    pub distance: f32,
}

impl FlatL2Index {
    pub fn from_vectors(vectors: Vec<Vec<f32>>) -> Result<Self, AppError> {
        let dims = vectors.first().map(Vec::len).unwrap_or(0);
        if dims == 0 {
            return Err(AppError::new(
                "INDEX_BUILD_FAILED",
                "Cannot build an index from zero vectors",
            ));
        }
        let mut data = Vec::with_capacity(vectors.len() * dims);
        for (i, v) in vectors.into_iter().enumerate() {
            if v.len() != dims {
                return Err(AppError::new(
                    "INDEX_BUILD_FAILED",
                    "Embedding dimension mismatch across chunks",
                )
                .with_details(format!("expected={dims}; got={}; position={i}", v.len())));
            }
            if !all_finite(&v) {
                return Err(AppError::new(
                    "INDEX_BUILD_FAILED",
                    "Embedding contains non-finite values",
                )
                .with_details(format!("position={i}")));
            }
            data.extend(v);
        }
        Ok(Self { dims, data })
    }

    pub(crate) fn from_raw(dims: usize, data: Vec<f32>) -> Result<Self, AppError> {
        if dims == 0 || data.len() % dims != 0 {
            return Err(AppError::new("INDEX_INCONSISTENT", "Index vector data is malformed")
                .with_details(format!("dims={dims}; values={}", data.len())));
        }
        Ok(Self { dims, data })
    }

    pub(crate) fn raw_data(&self) -> &[f32] {
        &self.data
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Number of stored vectors.
    pub fn ntotal(&self) -> usize {
        self.data.len() / self.dims
    }

    /// The `k` nearest stored vectors, nearest first. Equal distances keep storage order.
    /// `k` above `ntotal` returns every vector.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, AppError> {
        if query.len() != self.dims {
            return Err(AppError::new(
                "RETRIEVAL_FAILED",
                "Query embedding dims do not match index dims",
            )
            .with_details(format!("index_dims={}; query_dims={}", self.dims, query.len())));
        }
        if !all_finite(query) {
            return Err(AppError::new(
                "RETRIEVAL_FAILED",
                "Query embedding contains non-finite values",
            ));
        }

        let mut hits: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dims)
            .enumerate()
            .map(|(id, v)| Neighbor {
                id,
                distance: squared_l2(query, v),
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        hits.truncate(k);
        Ok(hits)
    }
}

/// An index paired with its chunk store. Construction enforces `ntotal == chunks.len()`,
/// so a value of this type is always a consistent pair.
#[derive(Debug, Clone)]
pub struct IndexedCorpus {
    index: FlatL2Index,
    chunks: Vec<Chunk>,
}

impl IndexedCorpus {
    pub fn new(index: FlatL2Index, chunks: Vec<Chunk>) -> Result<Self, AppError> {
        if index.ntotal() != chunks.len() {
            return Err(AppError::new(
                "INDEX_INCONSISTENT",
                "Index vector count does not match chunk store length",
            )
            .with_details(format!("ntotal={}; chunks={}", index.ntotal(), chunks.len())));
        }
        Ok(Self { index, chunks })
    }

    pub fn index(&self) -> &FlatL2Index {
        &self.index
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Embed every chunk in one batched call and pair the resulting index with the chunks.
pub fn build_index(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<IndexedCorpus, AppError> {
    if chunks.is_empty() {
        return Err(AppError::new("CORPUS_EMPTY", "No chunks to index"));
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embedder.embed_batch(&texts)?;
    if vectors.len() != chunks.len() {
        return Err(AppError::new(
            "INDEX_BUILD_FAILED",
            "Embedder returned a different number of vectors than chunks",
        )
        .with_details(format!("chunks={}; vectors={}", chunks.len(), vectors.len())));
    }

    let index = FlatL2Index::from_vectors(vectors)?;
    tracing::info!(vectors = index.ntotal(), dims = index.dims(), "built vector index");
    IndexedCorpus::new(index, chunks)
}
