use phq_ai::corpus::{build_index, Chunk, ChunkMetadata, IndexedCorpus};
use phq_ai::embeddings::Embedder;
use phq_ai::retrieve::retrieve;
use phq_core::error::AppError;

/// Counts 'a' and 'b' characters, so distances are easy to reason about.
struct CountABEmbedder;

impl Embedder for CountABEmbedder {
    fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        Ok(inputs
            .iter()
            .map(|s| {
                let a = s.chars().filter(|c| *c == 'a').count();
                let b = s.chars().filter(|c| *c == 'b').count();
                vec![a as f32, b as f32]
            })
            .collect())
    }
}

/// Returns vectors of a different width than the index was built with.
struct WideEmbedder;

impl Embedder for WideEmbedder {
    fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        Ok(inputs.iter().map(|_| vec![0.0; 3]).collect())
    }
}

fn corpus(texts: &[&str]) -> IndexedCorpus {
    let chunks = texts
        .iter()
        .map(|t| Chunk {
            text: t.to_string(),
            metadata: ChunkMetadata {
                source_title: "The Social Contract".to_string(),
                author: "Jean-Jacques Rousseau".to_string(),
                url: None,
                section_title: None,
            },
        })
        .collect();
    build_index(chunks, &CountABEmbedder).expect("build_index")
}

#[test]
fn ranks_follow_non_decreasing_distance() {
    let corpus = corpus(&["bbbb", "aaaa", "aabb", "ab", "aaab"]);
    for k in 1..=corpus.len() {
        let hits = retrieve(&corpus, &CountABEmbedder, "aaaa", k).expect("retrieve");
        assert_eq!(hits.len(), k);
        for (i, h) in hits.iter().enumerate() {
            assert_eq!(h.rank as usize, i + 1);
        }
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    let hits = retrieve(&corpus, &CountABEmbedder, "aaaa", 2).expect("retrieve");
    assert_eq!(hits[0].chunk.text, "aaaa");
    assert_eq!(hits[0].distance, 0.0);
    assert_eq!(hits[1].chunk.text, "aaab");
}

#[test]
fn equal_distances_keep_store_order() {
    let corpus = corpus(&["ba", "ab", "aabb"]);
    let hits = retrieve(&corpus, &CountABEmbedder, "ab", 3).expect("retrieve");
    let texts: Vec<&str> = hits.iter().map(|h| h.chunk.text.as_str()).collect();
    assert_eq!(texts, vec!["ba", "ab", "aabb"]);
}

#[test]
fn top_k_above_store_size_returns_everything() {
    let corpus = corpus(&["a", "b"]);
    let hits = retrieve(&corpus, &CountABEmbedder, "a", 50).expect("retrieve");
    assert_eq!(hits.len(), 2);
}

#[test]
fn rejects_empty_query_and_zero_top_k() {
    let corpus = corpus(&["a", "b"]);
    let err = retrieve(&corpus, &CountABEmbedder, "   ", 3).err().expect("empty query");
    assert_eq!(err.code, "RETRIEVAL_INVALID_REQUEST");
    let err = retrieve(&corpus, &CountABEmbedder, "a", 0).err().expect("zero top_k");
    assert_eq!(err.code, "RETRIEVAL_INVALID_REQUEST");
}

#[test]
fn query_dims_must_match_index() {
    let corpus = corpus(&["a", "b"]);
    let err = retrieve(&corpus, &WideEmbedder, "a", 1).err().expect("dims");
    assert_eq!(err.code, "RETRIEVAL_FAILED");
}
