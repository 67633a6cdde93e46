use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use phq_ai::corpus::artifact_paths;
use phq_ai::providers::embedder_from_config;
use phq_core::config::PhilQueryConfig;
use philquery_lib::init_tracing;
use philquery_lib::pipeline::build_and_save;

/// Chunk, embed and index the configured sources, replacing the persisted pair.
#[derive(Debug, Parser)]
#[command(name = "build_index", version)]
struct Args {
    /// Configuration file (defaults to $PHILQUERY_CONFIG, then ./philquery.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `index_prefix`.
    #[arg(long)]
    prefix: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut cfg = PhilQueryConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(prefix) = args.prefix {
        cfg.index_prefix = prefix;
    }
    if cfg.sources.is_empty() {
        anyhow::bail!("no sources configured; add [[sources]] entries to the configuration file");
    }

    let embedder = embedder_from_config(&cfg.embeddings)?;
    let (corpus, report) = build_and_save(&cfg, embedder.as_ref())?;

    let paths = artifact_paths(&cfg.index_prefix);
    println!(
        "Indexed {} unique chunks ({} before dedupe) from {} of {} sources",
        corpus.len(),
        report.chunks_total,
        report.sources_total - report.sources_skipped,
        report.sources_total
    );
    println!("  index:       {}", paths.index.display());
    println!("  chunk store: {}", paths.chunk_store.display());
    Ok(())
}
