use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use phq_core::error::AppError;
use phq_core::normalize::timestamps::now_rfc3339_utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::index::{FlatL2Index, IndexedCorpus};
use super::model::Chunk;

const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub index: PathBuf,
    pub chunk_store: PathBuf,
}

/// `{prefix}.index` and `{prefix}_chunk_store.json`.
pub fn artifact_paths(prefix: &Path) -> ArtifactPaths {
    ArtifactPaths {
        index: with_suffix(prefix, ".index"),
        chunk_store: with_suffix(prefix, "_chunk_store.json"),
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexFile {
    format_version: u32,
    dims: usize,
    ntotal: usize,
    built_at: String,
    /// Digest of the chunk store bytes this index was written with.
    chunk_store_sha256: String,
    vectors: Vec<f32>,
}

/// Persist the pair. Each artifact is written to a `.tmp` sibling and renamed into place;
/// the chunk store goes first, and the index carries its digest, so a reader that races a
/// rebuild sees either a matching pair or a mismatch, never a silently mixed one.
pub fn save(corpus: &IndexedCorpus, prefix: &Path) -> Result<ArtifactPaths, AppError> {
    let paths = artifact_paths(prefix);
    if let Some(dir) = paths.index.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::new("INDEX_WRITE_FAILED", "Failed to create index directory")
                .with_details(format!("path={}; err={}", dir.display(), e))
        })?;
    }

    let store_json = serde_json::to_vec(corpus.chunks()).map_err(|e| {
        AppError::new("INDEX_WRITE_FAILED", "Failed to encode chunk store").with_details(e.to_string())
    })?;

    let index = corpus.index();
    let file = IndexFile {
        format_version: INDEX_FORMAT_VERSION,
        dims: index.dims(),
        ntotal: index.ntotal(),
        built_at: now_rfc3339_utc()?,
        chunk_store_sha256: sha256_hex(&store_json),
        vectors: index.raw_data().to_vec(),
    };
    let index_json = serde_json::to_vec(&file).map_err(|e| {
        AppError::new("INDEX_WRITE_FAILED", "Failed to encode index").with_details(e.to_string())
    })?;

    write_atomic(&paths.chunk_store, &store_json)?;
    write_atomic(&paths.index, &index_json)?;
    tracing::info!(
        index = %paths.index.display(),
        chunk_store = %paths.chunk_store.display(),
        chunks = corpus.len(),
        "saved index and chunk store"
    );
    Ok(paths)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let tmp = with_suffix(path, ".tmp");
    fs::write(&tmp, bytes).map_err(|e| {
        AppError::new("INDEX_WRITE_FAILED", "Failed to write artifact")
            .with_details(format!("path={}; err={}", tmp.display(), e))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        AppError::new("INDEX_WRITE_FAILED", "Failed to finalize artifact write")
            .with_details(format!("tmp={}; dest={}; err={}", tmp.display(), path.display(), e))
    })?;
    Ok(())
}

/// Load the pair, or `None` when it is missing, unreadable or inconsistent.
pub fn load(prefix: &Path) -> Option<IndexedCorpus> {
    match try_load(prefix) {
        Ok(corpus) => Some(corpus),
        Err(e) => {
            tracing::warn!(prefix = %prefix.display(), error = %e, "index not available");
            None
        }
    }
}

/// Like [`load`], but reports why the pair is not available.
pub fn try_load(prefix: &Path) -> Result<IndexedCorpus, AppError> {
    let paths = artifact_paths(prefix);

    let index_bytes = read_artifact(&paths.index)?;
    let store_bytes = read_artifact(&paths.chunk_store)?;

    let file: IndexFile = serde_json::from_slice(&index_bytes).map_err(|e| {
        AppError::new("INDEX_INCONSISTENT", "Failed to decode index")
            .with_details(format!("path={}; err={}", paths.index.display(), e))
    })?;
    if file.format_version != INDEX_FORMAT_VERSION {
        return Err(AppError::new("INDEX_INCONSISTENT", "Unsupported index format version")
            .with_details(format!("version={}", file.format_version)));
    }
    let chunks: Vec<Chunk> = serde_json::from_slice(&store_bytes).map_err(|e| {
        AppError::new("INDEX_INCONSISTENT", "Failed to decode chunk store")
            .with_details(format!("path={}; err={}", paths.chunk_store.display(), e))
    })?;

    let index = FlatL2Index::from_raw(file.dims, file.vectors)?;
    if index.ntotal() != file.ntotal || file.ntotal != chunks.len() {
        return Err(AppError::new(
            "INDEX_INCONSISTENT",
            "Index vector count does not match chunk store length",
        )
        .with_details(format!(
            "header_ntotal={}; vectors={}; chunks={}",
            file.ntotal,
            index.ntotal(),
            chunks.len()
        )));
    }
    if sha256_hex(&store_bytes) != file.chunk_store_sha256 {
        return Err(AppError::new(
            "INDEX_INCONSISTENT",
            "Chunk store does not belong to this index",
        ));
    }

    let corpus = IndexedCorpus::new(index, chunks)?;
    tracing::info!(
        vectors = corpus.index().ntotal(),
        chunks = corpus.len(),
        built_at = %file.built_at,
        "loaded index and chunk store"
    );
    Ok(corpus)
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, AppError> {
    fs::read(path).map_err(|e| {
        AppError::new("INDEX_NOT_AVAILABLE", "Failed to read index artifact")
            .with_details(format!("path={}; err={}", path.display(), e))
    })
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}
