use phq_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::corpus::{Citation, IndexedCorpus};
use crate::embeddings::Embedder;
use crate::llm::ChatModel;
use crate::retrieve::retrieve;

mod prompts;

pub use prompts::{build_citations, compose, ComposedPrompt, PromptMode};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AskResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
}

/// Retrieve, compose and generate. Any failure along the way is returned as the single
/// error of the call; there is no partial answer.
pub fn ask(
    corpus: &IndexedCorpus,
    embedder: &dyn Embedder,
    chat: &dyn ChatModel,
    question: &str,
    mode: PromptMode,
    top_k: usize,
) -> Result<AskResponse, AppError> {
    let retrieved = retrieve(corpus, embedder, question, top_k)?;
    let prompt = compose(question.trim(), &retrieved, mode);
    tracing::info!(
        mode = %mode,
        top_k,
        sources = retrieved.len(),
        "asking chat model"
    );

    let raw = chat.complete(prompt.system_prompt, &prompt.user_prompt)?;
    let answer = raw.trim();
    if answer.is_empty() {
        return Err(AppError::new("GENERATION_FAILED", "Chat model returned an empty answer"));
    }

    Ok(AskResponse {
        answer: answer.to_string(),
        citations: prompt.citations,
    })
}
