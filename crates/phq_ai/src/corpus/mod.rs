pub mod build;
pub mod chunking;
pub mod dedupe;
pub mod index;
pub mod model;
pub mod store;
pub mod tokenize;

pub use build::{build_corpus, chunk_sources, BuildReport};
pub use chunking::{chunk_document, ChunkingOptions};
pub use dedupe::dedupe;
pub use index::{build_index, FlatL2Index, IndexedCorpus, Neighbor};
pub use model::{Chunk, ChunkMetadata, Citation};
pub use store::{artifact_paths, load, save, try_load, ArtifactPaths};
pub use tokenize::{HfTokenizer, TextTokenizer};
