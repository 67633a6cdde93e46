use std::time::Duration;

use phq_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::{check_batch_shape, Embedder};
use crate::http::post_json;
use crate::ollama::OllamaClient;

#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
    batch_size: usize,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: impl Into<String>, batch_size: usize) -> Self {
        Self {
            client,
            model: model.into(),
            batch_size: batch_size.max(1),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl Embedder for OllamaEmbedder {
    fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        let url = format!("{}/api/embed", self.client.base_url());
        let mut out: Vec<Vec<f32>> = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(self.batch_size) {
            let req = EmbedRequest {
                model: &self.model,
                input: batch,
            };
            let resp: EmbedResponse =
                post_json(&url, None, &req, Duration::from_secs(60), "EMBEDDINGS_FAILED")?;
            check_batch_shape(batch.len(), &resp.embeddings)?;
            out.extend(resp.embeddings);
        }
        check_batch_shape(inputs.len(), &out)?;
        tracing::debug!(count = out.len(), model = %self.model, "embedded batch via ollama");
        Ok(out)
    }
}
