use std::cell::RefCell;

use phq_ai::answer::{ask, PromptMode};
use phq_ai::corpus::{build_index, Chunk, ChunkMetadata, IndexedCorpus};
use phq_ai::embeddings::Embedder;
use phq_ai::llm::ChatModel;
use phq_core::error::AppError;
use pretty_assertions::assert_eq;

struct LengthEmbedder;

impl Embedder for LengthEmbedder {
    fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        Ok(inputs.iter().map(|s| vec![s.len() as f32]).collect())
    }
}

/// Records every prompt pair and answers with a fixed reply.
struct MockChat {
    reply: Result<String, AppError>,
    calls: RefCell<Vec<(String, String)>>,
}

impl MockChat {
    fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn failing(err: AppError) -> Self {
        Self {
            reply: Err(err),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ChatModel for MockChat {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AppError> {
        self.calls
            .borrow_mut()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        self.reply.clone()
    }
}

fn corpus(n: usize) -> IndexedCorpus {
    let chunks = (0..n)
        .map(|i| Chunk {
            // Lengths grow with i, so chunk 0 is nearest to a short query.
            text: format!("Passage {i} on the general will{}", ".".repeat(i * 3)),
            metadata: ChunkMetadata {
                source_title: format!("Work {i}"),
                author: "Jean-Jacques Rousseau".to_string(),
                url: (i % 2 == 0).then(|| format!("https://www.gutenberg.org/ebooks/{i}")),
                section_title: None,
            },
        })
        .collect();
    build_index(chunks, &LengthEmbedder).expect("build_index")
}

#[test]
fn citation_count_is_min_of_k_and_store_size() {
    let store = corpus(4);
    for (k, expected) in [(1, 1), (3, 3), (4, 4), (9, 4)] {
        let chat = MockChat::replying("An answer (Source 1).");
        let resp = ask(&store, &LengthEmbedder, &chat, "What is the general will?", PromptMode::Understanding, k)
            .expect("ask");
        assert_eq!(resp.citations.len(), expected, "k={k}");
    }
}

#[test]
fn retrieval_mode_with_three_chunks_cites_one_two_three() {
    let store = corpus(3);
    let chat = MockChat::replying("**Source 1: ...**");
    let resp = ask(&store, &LengthEmbedder, &chat, "Where does sovereignty lie?", PromptMode::Retrieval, 3)
        .expect("ask");

    let ids: Vec<u32> = resp.citations.iter().map(|c| c.citation_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let calls = chat.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, PromptMode::Retrieval.system_prompt());
    assert!(calls[0].1.starts_with("Context:\nSource 1 (Title: "));
    assert!(calls[0].1.ends_with("Question: Where does sovereignty lie?\nAnswer:"));
    assert_eq!(calls[0].1.matches("\n\n---\n\n").count(), 2);
}

#[test]
fn answer_is_trimmed_and_citations_follow_rank() {
    let store = corpus(2);
    let chat = MockChat::replying("\n  The sovereign is the people.  \n");
    let resp = ask(&store, &LengthEmbedder, &chat, "Who is sovereign?", PromptMode::Understanding, 2)
        .expect("ask");

    assert_eq!(resp.answer, "The sovereign is the people.");
    assert_eq!(resp.citations[0].source_title, "Work 0");
    assert_eq!(resp.citations[0].url, "https://www.gutenberg.org/ebooks/0");
    assert_eq!(resp.citations[1].source_title, "Work 1");
    assert_eq!(resp.citations[1].url, "#");
    assert!(resp.citations[1].excerpt.ends_with("..."));

    let json = serde_json::to_value(&resp).expect("json");
    assert_eq!(json["citations"][0]["citation_id"], 1);
}

#[test]
fn chat_failure_is_the_single_error_of_the_call() {
    let store = corpus(2);
    let chat = MockChat::failing(
        AppError::new("GENERATION_FAILED", "Chat request failed").with_retryable(true),
    );
    let err = ask(&store, &LengthEmbedder, &chat, "Why?", PromptMode::Understanding, 2)
        .err()
        .expect("chat failure");
    assert_eq!(err.code, "GENERATION_FAILED");
    assert!(err.retryable);
}

#[test]
fn blank_answer_is_a_generation_error() {
    let store = corpus(1);
    let chat = MockChat::replying("   ");
    let err = ask(&store, &LengthEmbedder, &chat, "Why?", PromptMode::Understanding, 1)
        .err()
        .expect("blank");
    assert_eq!(err.code, "GENERATION_FAILED");
}

#[test]
fn invalid_request_never_reaches_the_chat_model() {
    let store = corpus(2);
    let chat = MockChat::replying("unused");
    let err = ask(&store, &LengthEmbedder, &chat, "", PromptMode::Understanding, 2)
        .err()
        .expect("empty question");
    assert_eq!(err.code, "RETRIEVAL_INVALID_REQUEST");
    assert!(chat.calls.borrow().is_empty());
}
