use std::time::Duration;

use phq_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::{check_batch_shape, Embedder};
use crate::http::post_json;
use crate::openai::OpenAiClient;

#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
    batch_size: usize,
}

impl OpenAiEmbedder {
    pub fn new(client: OpenAiClient, model: impl Into<String>, batch_size: usize) -> Self {
        Self {
            client,
            model: model.into(),
            batch_size: batch_size.max(1),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

impl Embedder for OpenAiEmbedder {
    fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        let url = self.client.endpoint("embeddings");
        let mut out: Vec<Vec<f32>> = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(self.batch_size) {
            let req = EmbeddingsRequest {
                model: &self.model,
                input: batch,
            };
            let mut resp: EmbeddingsResponse = post_json(
                &url,
                self.client.api_key(),
                &req,
                Duration::from_secs(60),
                "EMBEDDINGS_FAILED",
            )?;
            // The API does not promise response order; `index` is authoritative.
            resp.data.sort_by_key(|item| item.index);
            let vectors: Vec<Vec<f32>> = resp.data.into_iter().map(|item| item.embedding).collect();
            check_batch_shape(batch.len(), &vectors)?;
            out.extend(vectors);
        }
        check_batch_shape(inputs.len(), &out)?;
        tracing::debug!(count = out.len(), model = %self.model, "embedded batch via openai-compatible api");
        Ok(out)
    }
}
