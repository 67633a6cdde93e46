use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use phq_ai::answer::PromptMode;
use phq_ai::providers::check_local_models;
use phq_core::config::PhilQueryConfig;
use phq_core::domain::list_sources;
use philquery_lib::pipeline::Pipeline;
use philquery_lib::{api, init_tracing, session};

#[derive(Debug, Parser)]
#[command(name = "philquery", version, about = "Ask questions of a corpus of philosophical texts")]
struct Cli {
    /// Configuration file (defaults to $PHILQUERY_CONFIG, then ./philquery.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Build and persist the index when no valid one is found.
    #[arg(long, global = true)]
    build_if_missing: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Overrides `server.bind`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Interactive question session on the terminal.
    Chat {
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long, default_value = "understanding")]
        mode: String,
    },
    /// Answer a single question and print the response as JSON.
    Ask {
        question: String,
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long, default_value = "understanding")]
        mode: String,
    },
    /// List the configured sources.
    Sources,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = PhilQueryConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Sources => {
            let listing = list_sources(&cfg.sources);
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::Serve { bind } => {
            if let Err(e) = check_local_models(&cfg.embeddings, &cfg.chat) {
                tracing::warn!(error = %e, "local model check failed; continuing");
            }
            let pipeline = Arc::new(Pipeline::from_config(&cfg, cli.build_if_missing)?);
            let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());
            let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            runtime.block_on(api::serve(pipeline, &bind, &cfg.server.cors_origins))?;
        }
        Command::Chat { top_k, mode } => {
            let mode: PromptMode = mode.parse()?;
            let pipeline = Pipeline::from_config(&cfg, cli.build_if_missing)?;
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            session::run(&pipeline, stdin.lock(), &mut stdout, mode, top_k)?;
        }
        Command::Ask { question, top_k, mode } => {
            let mode: PromptMode = mode.parse()?;
            let pipeline = Pipeline::from_config(&cfg, cli.build_if_missing)?;
            let resp = pipeline.ask(&question, mode, top_k)?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
    }
    Ok(())
}
