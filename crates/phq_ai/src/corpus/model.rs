use phq_core::domain::SourceMetadata;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub source_title: String,
    pub author: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
}

impl ChunkMetadata {
    pub fn for_section(source: &SourceMetadata, section_title: Option<&str>) -> Self {
        Self {
            source_title: source.source_title.clone(),
            author: source.author.clone(),
            url: source.url.clone(),
            section_title: section_title.map(str::to_string),
        }
    }
}

/// A retrievable passage. Chunks have no id of their own; a chunk is identified by its
/// position in the chunk store, which matches the position of its vector in the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Per-query pointer from an answer back to the passage it was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    /// 1-based retrieval rank.
    pub citation_id: u32,
    pub source_title: String,
    pub author: String,
    pub excerpt: String,
    pub full_text: String,
    pub url: String,
}
