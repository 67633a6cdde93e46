use phq_core::error::AppError;

/// Capability: turn texts into fixed-dimension vectors, one per input, in input order.
pub trait Embedder {
    fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError>;

    fn embed_one(&self, input: &str) -> Result<Vec<f32>, AppError> {
        let mut out = self.embed_batch(&[input.to_string()])?;
        match out.pop() {
            Some(v) if out.is_empty() => Ok(v),
            _ => Err(AppError::new(
                "EMBEDDINGS_FAILED",
                "Embedder returned an unexpected number of vectors",
            )),
        }
    }
}

pub mod ollama_embed;
pub mod openai_embed;

/// Check the shape of a batch response: one non-empty vector per input, all the same length.
pub(crate) fn check_batch_shape(inputs: usize, vectors: &[Vec<f32>]) -> Result<(), AppError> {
    if vectors.len() != inputs {
        return Err(AppError::new(
            "EMBEDDINGS_FAILED",
            "Embeddings response count does not match input count",
        )
        .with_details(format!("inputs={inputs}; vectors={}", vectors.len())));
    }
    if let Some(first) = vectors.first() {
        if first.is_empty() {
            return Err(AppError::new("EMBEDDINGS_FAILED", "Embeddings response was empty"));
        }
        if let Some(pos) = vectors.iter().position(|v| v.len() != first.len()) {
            return Err(AppError::new(
                "EMBEDDINGS_FAILED",
                "Embedding dimension mismatch across inputs",
            )
            .with_details(format!("expected={}; got={}; position={pos}", first.len(), vectors[pos].len())));
        }
    }
    Ok(())
}
