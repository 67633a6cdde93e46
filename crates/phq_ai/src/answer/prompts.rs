use std::fmt;
use std::str::FromStr;

use phq_core::error::AppError;
use phq_core::normalize::text::excerpt;
use serde::{Deserialize, Serialize};

use crate::corpus::Citation;
use crate::retrieve::RetrievedChunk;

const SOURCE_DELIMITER: &str = "\n\n---\n\n";
const EXCERPT_CHARS: usize = 60;
const MISSING_URL: &str = "#";

/// Output contract for the generated answer. Retrieval is identical in both modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// Thematic, cited synthesis drawn only from the context.
    #[default]
    Understanding,
    /// One titled excerpt section per retrieved source.
    Retrieval,
}

impl PromptMode {
    pub const ALL: [PromptMode; 2] = [PromptMode::Understanding, PromptMode::Retrieval];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptMode::Understanding => "understanding",
            PromptMode::Retrieval => "retrieval",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            PromptMode::Understanding => UNDERSTANDING_PROMPT,
            PromptMode::Retrieval => RETRIEVAL_PROMPT,
        }
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PromptMode::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| {
                AppError::new("REQUEST_INVALID_MODE", "Unknown answer mode")
                    .with_details(format!("mode={s}; expected one of: understanding, retrieval"))
            })
    }
}

const UNDERSTANDING_PROMPT: &str = r#"You are a research assistant for political philosophy.

Explain the author's views on the question using ONLY the numbered sources in the context.

Rules (non-negotiable):
1) Do not use knowledge that is not present in the context.
2) Open with one sentence that frames the topic.
3) Group the answer under thematic headings drawn from the sources.
4) Under each heading, explain the position in 4-6 sentences with arguments or examples from the text, and relate it to the question.
5) Cite the source number(s) for every point, e.g. (Source 2).
6) Close with a summary paragraph showing how the themes fit together.
7) If the context is not enough to answer, say so and do not answer.
8) Never reproduce a full source; the sources are shown to the reader separately.
"#;

const RETRIEVAL_PROMPT: &str = r#"You are a research assistant for political philosophy.

Present the passages from the context that address the question.

Rules (non-negotiable):
1) Write exactly one section for EACH source in the context, numbered to match (Source 1 .. Source N), in the same order.
2) Never skip a source, even if it looks less relevant.
3) Each section has:
   - a bold heading "**Source N: <descriptive title>**"
   - on a new line, "Summary:" followed by 2-3 sentences
   - on a new line, "Quote:" followed by a short snippet in double quotes
4) Never quote a full source, only a brief snippet.
5) Do not add commentary about relevance or citations.
"#;

/// Everything the chat call needs, plus the citations that accompany its answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPrompt {
    pub system_prompt: &'static str,
    pub user_prompt: String,
    pub citations: Vec<Citation>,
}

pub fn compose(question: &str, retrieved: &[RetrievedChunk<'_>], mode: PromptMode) -> ComposedPrompt {
    let context = retrieved
        .iter()
        .map(|r| {
            format!(
                "Source {} (Title: {}, Author: {}):\n{}",
                r.rank, r.chunk.metadata.source_title, r.chunk.metadata.author, r.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join(SOURCE_DELIMITER);

    ComposedPrompt {
        system_prompt: mode.system_prompt(),
        user_prompt: format!("Context:\n{context}\n\nQuestion: {question}\nAnswer:"),
        citations: build_citations(retrieved),
    }
}

pub fn build_citations(retrieved: &[RetrievedChunk<'_>]) -> Vec<Citation> {
    retrieved
        .iter()
        .map(|r| {
            let meta = &r.chunk.metadata;
            Citation {
                citation_id: r.rank,
                source_title: meta.source_title.clone(),
                author: meta.author.clone(),
                excerpt: excerpt(&r.chunk.text, EXCERPT_CHARS),
                full_text: r.chunk.text.clone(),
                url: meta
                    .url
                    .clone()
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or_else(|| MISSING_URL.to_string()),
            }
        })
        .collect()
}
