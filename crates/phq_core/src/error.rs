use serde::{Deserialize, Serialize};
use std::fmt;

/// Single structured error shape used by the pipeline, the build command and the HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

/// Coarse grouping of error codes, used by front ends to pick a response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad configuration or unreadable build input.
    Configuration,
    /// Persisted index/store pair is missing or does not match.
    Consistency,
    /// Caller supplied an invalid request (empty query, unknown mode, zero top_k).
    InvalidRequest,
    /// Embedding or nearest-neighbor search failed.
    Retrieval,
    /// Chat service failed or returned nothing usable.
    Generation,
    Other,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn category(&self) -> ErrorCategory {
        let code = self.code.as_str();
        if code.starts_with("REQUEST_") || code == "RETRIEVAL_INVALID_REQUEST" {
            ErrorCategory::InvalidRequest
        } else if code.starts_with("CONFIG_")
            || code.starts_with("CORPUS_")
            || code.starts_with("TOKENIZER_")
        {
            ErrorCategory::Configuration
        } else if code.starts_with("INDEX_") {
            ErrorCategory::Consistency
        } else if code.starts_with("RETRIEVAL_") || code.starts_with("EMBEDDINGS_") {
            ErrorCategory::Retrieval
        } else if code.starts_with("GENERATION_") {
            ErrorCategory::Generation
        } else {
            ErrorCategory::Other
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = self.details.as_deref() {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}
