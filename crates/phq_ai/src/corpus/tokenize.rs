use std::path::Path;

use phq_core::error::AppError;
use tokenizers::Tokenizer;

/// Token counting and windowing used by the chunker. Ids never include special tokens.
pub trait TextTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, AppError>;

    fn decode(&self, ids: &[u32]) -> Result<String, AppError>;

    fn count(&self, text: &str) -> Result<usize, AppError> {
        Ok(self.encode(text)?.len())
    }
}

const BERT_TOKENIZER_URL: &str = "https://huggingface.co/bert-base-uncased/resolve/main/tokenizer.json";

/// HuggingFace tokenizer loaded from a `tokenizer.json` (e.g. `bert-base-uncased`).
pub struct HfTokenizer {
    inner: Tokenizer,
}

impl HfTokenizer {
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        if !path.is_file() {
            return Err(AppError::new("TOKENIZER_LOAD_FAILED", "Tokenizer file not found").with_details(format!(
                "path={}; expected a HuggingFace tokenizer.json such as {BERT_TOKENIZER_URL}",
                path.display()
            )));
        }
        let inner = Tokenizer::from_file(path).map_err(|e| {
            AppError::new("TOKENIZER_LOAD_FAILED", "Failed to load tokenizer")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "loaded tokenizer");
        Self::unbounded(inner)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AppError> {
        let inner = Tokenizer::from_bytes(bytes).map_err(|e| {
            AppError::new("TOKENIZER_LOAD_FAILED", "Failed to parse tokenizer")
                .with_details(e.to_string())
        })?;
        Self::unbounded(inner)
    }

    /// Drops truncation and padding carried by the file so counts see the whole text.
    fn unbounded(mut inner: Tokenizer) -> Result<Self, AppError> {
        inner.with_truncation(None).map_err(|e| {
            AppError::new("TOKENIZER_LOAD_FAILED", "Failed to disable truncation")
                .with_details(e.to_string())
        })?;
        inner.with_padding(None);
        Ok(Self { inner })
    }
}

impl TextTokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, AppError> {
        let enc = self.inner.encode(text, false).map_err(|e| {
            AppError::new("TOKENIZER_ENCODE_FAILED", "Tokenization failed").with_details(e.to_string())
        })?;
        Ok(enc.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, AppError> {
        self.inner.decode(ids, true).map_err(|e| {
            AppError::new("TOKENIZER_DECODE_FAILED", "Detokenization failed").with_details(e.to_string())
        })
    }
}
