use phq_core::domain::SourceMetadata;
use phq_core::error::AppError;
use phq_core::normalize::text::{normalize_line_endings, word_count};

use super::model::{Chunk, ChunkMetadata};
use super::tokenize::TextTokenizer;

/// Paragraphs starting with these are structural headings, not content.
const STRUCTURAL_PREFIXES: [&str; 2] = ["CHAPTER", "BOOK"];
/// Paragraphs with this many words or fewer are treated as noise.
const NOISE_MAX_WORDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingOptions {
    pub max_tokens: usize,
    pub model_max_length: usize,
    pub special_tokens: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            max_tokens: 450,
            model_max_length: 512,
            special_tokens: 2,
        }
    }
}

impl ChunkingOptions {
    /// Effective per-chunk budget: the requested size clamped to what the model accepts
    /// once special tokens are reserved.
    pub fn token_budget(&self) -> Result<usize, AppError> {
        let model_room = self.model_max_length.saturating_sub(self.special_tokens);
        let budget = self.max_tokens.min(model_room);
        if budget == 0 {
            return Err(AppError::new(
                "CONFIG_TOKEN_BUDGET_INVALID",
                "Chunk token budget must be positive",
            )
            .with_details(format!(
                "max_tokens={}; model_max_length={}; special_tokens={}",
                self.max_tokens, self.model_max_length, self.special_tokens
            )));
        }
        Ok(budget)
    }
}

/// Split one document into section-tagged chunks.
///
/// Each header's span starts at the header's first occurrence in the text and ends at the
/// next header's first occurrence after it (or at the end of the text). Headers that do
/// not occur are skipped; blank headers are a configuration error. Repeated header strings resolve to the same first occurrence,
/// so callers should dedupe the combined output.
pub fn chunk_document(
    raw_text: &str,
    metadata: &SourceMetadata,
    section_headers: &[String],
    tokenizer: &dyn TextTokenizer,
    opts: &ChunkingOptions,
) -> Result<Vec<Chunk>, AppError> {
    let budget = opts.token_budget()?;
    if let Some(position) = section_headers.iter().position(|h| h.trim().is_empty()) {
        return Err(AppError::new("CONFIG_INVALID", "Section headers must not be blank")
            .with_details(format!("source={}; position={position}", metadata.source_title)));
    }
    let raw = normalize_line_endings(raw_text);

    let mut out = Vec::new();
    for (i, header) in section_headers.iter().enumerate() {
        let Some(start) = raw.find(header.as_str()) else {
            tracing::debug!(header = %header, source = %metadata.source_title, "section header not found");
            continue;
        };

        let after_header = start + header.len();
        let end = section_headers
            .get(i + 1)
            .and_then(|next| raw[after_header..].find(next.as_str()))
            .map_or(raw.len(), |p| after_header + p);

        let section_title = header.trim();
        let section_meta = ChunkMetadata::for_section(metadata, Some(section_title));
        let before = out.len();
        for para in raw[start..end].trim().split("\n\n") {
            let para = para.trim();
            if is_noise(para, section_title) {
                if !para.is_empty() {
                    tracing::trace!(section = section_title, words = word_count(para), "dropping noise paragraph");
                }
                continue;
            }

            let ids = tokenizer.encode(para)?;
            if ids.len() <= budget {
                out.push(Chunk {
                    text: para.to_string(),
                    metadata: section_meta.clone(),
                });
            } else {
                for window in ids.chunks(budget) {
                    push_window(window, budget, tokenizer, &section_meta, &mut out)?;
                }
            }
        }
        tracing::debug!(section = section_title, chunks = out.len() - before, "chunked section");
    }

    Ok(out)
}

fn is_noise(para: &str, section_title: &str) -> bool {
    para.is_empty()
        || para == section_title
        || STRUCTURAL_PREFIXES.iter().any(|p| para.starts_with(p))
        || word_count(para) <= NOISE_MAX_WORDS
}

/// Decode a token window into a chunk. Decoding and re-encoding is not always an identity,
/// so a window whose text re-encodes over budget is halved until it fits.
fn push_window(
    window: &[u32],
    budget: usize,
    tokenizer: &dyn TextTokenizer,
    meta: &ChunkMetadata,
    out: &mut Vec<Chunk>,
) -> Result<(), AppError> {
    let decoded = tokenizer.decode(window)?;
    let text = decoded.trim();
    if text.is_empty() {
        return Ok(());
    }
    if window.len() > 1 && tokenizer.count(text)? > budget {
        let (left, right) = window.split_at(window.len() / 2);
        push_window(left, budget, tokenizer, meta, out)?;
        return push_window(right, budget, tokenizer, meta, out);
    }
    out.push(Chunk {
        text: text.to_string(),
        metadata: meta.clone(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Words;

    impl TextTokenizer for Words {
        fn encode(&self, text: &str) -> Result<Vec<u32>, AppError> {
            Ok(text.split_whitespace().map(|w| w.len() as u32).collect())
        }

        fn decode(&self, ids: &[u32]) -> Result<String, AppError> {
            Ok(ids.iter().map(|n| "x".repeat(*n as usize)).collect::<Vec<_>>().join(" "))
        }
    }

    fn meta() -> SourceMetadata {
        SourceMetadata {
            source_title: "Emile".to_string(),
            author: "Jean-Jacques Rousseau".to_string(),
            url: None,
        }
    }

    #[test]
    fn budget_is_clamped_to_model_room() {
        let opts = ChunkingOptions {
            max_tokens: 1000,
            model_max_length: 512,
            special_tokens: 2,
        };
        assert_eq!(opts.token_budget().expect("budget"), 510);
    }

    #[test]
    fn non_positive_budget_is_a_configuration_error() {
        let opts = ChunkingOptions {
            max_tokens: 450,
            model_max_length: 2,
            special_tokens: 2,
        };
        let err = chunk_document("ANY\n\nsome words here now", &meta(), &["ANY".to_string()], &Words, &opts)
            .expect_err("invalid budget");
        assert_eq!(err.code, "CONFIG_TOKEN_BUDGET_INVALID");
    }

    #[test]
    fn drops_header_structural_and_short_paragraphs() {
        let text = "PREFACE\n\nBOOK I of the work\n\nCHAPTER ONE begins here now\n\ntoo short\n\nThis paragraph has enough words to count.";
        let chunks = chunk_document(text, &meta(), &["PREFACE".to_string()], &Words, &ChunkingOptions::default())
            .expect("chunks");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "This paragraph has enough words to count.");
        assert_eq!(chunks[0].metadata.section_title.as_deref(), Some("PREFACE"));
    }

    #[test]
    fn spans_end_at_the_next_header() {
        let text = "FIRST\n\nalpha beta gamma delta epsilon\n\nSECOND\n\nzeta eta theta iota kappa\r\n\r\nlambda mu nu xi omicron";
        let headers = vec!["FIRST".to_string(), "MISSING".to_string(), "SECOND".to_string()];
        let chunks = chunk_document(text, &meta(), &headers, &Words, &ChunkingOptions::default())
            .expect("chunks");
        let got: Vec<(&str, Option<&str>)> = chunks
            .iter()
            .map(|c| (c.text.as_str(), c.metadata.section_title.as_deref()))
            .collect();
        // "MISSING" is never found, so FIRST runs to the end of the text.
        assert_eq!(
            got,
            vec![
                ("alpha beta gamma delta epsilon", Some("FIRST")),
                ("zeta eta theta iota kappa", Some("FIRST")),
                ("lambda mu nu xi omicron", Some("FIRST")),
                ("zeta eta theta iota kappa", Some("SECOND")),
                ("lambda mu nu xi omicron", Some("SECOND")),
            ]
        );
    }

    #[test]
    fn blank_headers_are_rejected() {
        let text = "FIRST\n\nalpha beta gamma delta epsilon\n\nSECOND\n\nzeta eta theta iota kappa";
        for blank in ["", "   "] {
            let headers = vec!["FIRST".to_string(), blank.to_string(), "SECOND".to_string()];
            let err = chunk_document(text, &meta(), &headers, &Words, &ChunkingOptions::default())
                .expect_err("blank header");
            assert_eq!(err.code, "CONFIG_INVALID");
            assert!(err.details.as_deref().unwrap_or("").contains("position=1"));
        }
    }

    #[test]
    fn oversized_paragraphs_are_split_into_budget_windows() {
        let para = vec!["word"; 25].join(" ");
        let text = format!("ONLY\n\n{para}");
        let opts = ChunkingOptions {
            max_tokens: 10,
            ..ChunkingOptions::default()
        };
        let chunks = chunk_document(&text, &meta(), &["ONLY".to_string()], &Words, &opts).expect("chunks");
        let sizes: Vec<usize> = chunks.iter().map(|c| c.text.split_whitespace().count()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
    }
}
