use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Provenance attached to every chunk cut from a source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceMetadata {
    pub source_title: String,
    pub author: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// One build-input entry: a document on disk plus the section headers that split it.
///
/// `section_headers` must be listed in the order they appear in the document; span
/// boundaries are found by searching for the next header in the list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub filepath: PathBuf,
    pub metadata: SourceMetadata,
    #[serde(default)]
    pub section_headers: Vec<String>,
}

/// Listing entry returned to front ends; a read-only view of the configured corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceListing {
    pub source_title: String,
    pub author: String,
    pub url: Option<String>,
}

pub fn list_sources(sources: &[SourceDescriptor]) -> Vec<SourceListing> {
    sources
        .iter()
        .map(|s| SourceListing {
            source_title: s.metadata.source_title.clone(),
            author: s.metadata.author.clone(),
            url: s.metadata.url.clone(),
        })
        .collect()
}
