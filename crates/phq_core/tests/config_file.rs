use std::fs;
use std::path::{Path, PathBuf};

use phq_core::config::{ModelProvider, PhilQueryConfig};
use phq_core::domain::list_sources;
use pretty_assertions::assert_eq;

const CATALOG: &str = r#"
index_prefix = "out/rousseau_works"
default_top_k = 3

[embeddings]
provider = "openai"
base_url = "https://api.openai.com/v1"
model = "text-embedding-3-small"

[[sources]]
filepath = "The Social Contract.txt"
section_headers = ["SUBJECT OF THE FIRST BOOK", "THE FIRST SOCIETIES", "BOOK", "BOOK"]
[sources.metadata]
source_title = "The Social Contract"
author = "Jean-Jacques Rousseau"
url = "https://www.gutenberg.org/cache/epub/46333/pg46333-images.html#link2H_4_0004"

[[sources]]
filepath = "A Discourse on Political Economy.txt"
section_headers = ["A DISCOURSE ON POLITICAL ECONOMY"]
[sources.metadata]
source_title = "A Discourse on Political Economy"
author = "Jean-Jacques Rousseau"
"#;

#[test]
fn loads_catalog_from_file_and_lists_sources_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("philquery.toml");
    fs::write(&path, CATALOG).expect("write config");

    let cfg = PhilQueryConfig::load(Some(&path)).expect("config");
    assert_eq!(cfg.index_prefix, PathBuf::from("out/rousseau_works"));
    assert_eq!(cfg.default_top_k, 3);
    assert_eq!(cfg.embeddings.provider, ModelProvider::OpenAi);
    assert_eq!(cfg.embeddings.batch_size, 64);

    // Repeated headers are kept verbatim; chunking resolves them positionally.
    assert_eq!(cfg.sources[0].section_headers.len(), 4);

    let listing = list_sources(&cfg.sources);
    let got: Vec<(&str, Option<&str>)> = listing
        .iter()
        .map(|s| (s.source_title.as_str(), s.url.as_deref()))
        .collect();
    assert_eq!(
        got,
        vec![
            (
                "The Social Contract",
                Some("https://www.gutenberg.org/cache/epub/46333/pg46333-images.html#link2H_4_0004")
            ),
            ("A Discourse on Political Economy", None),
        ]
    );
}

#[test]
fn malformed_file_is_a_configuration_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("philquery.toml");
    fs::write(&path, "default_top_k = \"five\"\n").expect("write config");

    let err = PhilQueryConfig::load(Some(&path)).expect_err("invalid");
    assert_eq!(err.code, "CONFIG_INVALID");
}

#[test]
fn shipped_catalog_loads_with_bert_tokenizer_limits() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../philquery.toml");
    let cfg = PhilQueryConfig::load(Some(&path)).expect("shipped config");

    assert_eq!(cfg.sources.len(), 4);
    assert_eq!(cfg.chunking.tokenizer_path, PathBuf::from("tokenizer.json"));
    assert_eq!(cfg.chunking.model_max_length, 512);
    assert_eq!(cfg.chunking.special_tokens, 2);
    assert_eq!(
        cfg.server.cors_origins,
        vec!["http://localhost:3000", "http://localhost:5173"]
    );

    let documented = fs::read_to_string(&path).expect("read config");
    assert!(documented.contains("huggingface.co/bert-base-uncased/resolve/main/tokenizer.json"));
}
