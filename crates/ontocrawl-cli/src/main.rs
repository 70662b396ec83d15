//! Ontocrawl CLI - Crawl property paths through ontologies

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, contexts, crawl, imports};
use config::{config_file_path, Config};
use ontocrawl_backend::{CancelHandle, DocumentLoader, HttpDocumentSource};

#[derive(Parser)]
#[command(name = "ontocrawl")]
#[command(author, version, about = "Crawl property paths through ontologies and SPARQL endpoints")]
pub struct Cli {
    /// Config file (default: user config dir)
    #[arg(short, long, global = true, env = "ONTOCRAWL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file_path)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl a document or endpoint from a set of seeds
    Crawl(crawl::CrawlArgs),
    /// Load the owl:imports closure of a document
    Imports(imports::ImportsArgs),
    /// Crawl every context of a context table
    Contexts(contexts::ContextsArgs),
    /// Manage the config file
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Shared state for commands that touch documents or endpoints
pub struct AppContext {
    pub config: Config,
    pub loader: DocumentLoader,
    pub cancel: CancelHandle,
}

impl AppContext {
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        let path = cli.config_path();
        tracing::debug!("Using config at: {:?}", path);
        let config = Config::load(&path)?;

        let source = HttpDocumentSource::new(config.loader.timeout())?;
        let loader = DocumentLoader::new(Arc::new(source)).with_policy(config.loader.policy());

        let cancel = CancelHandle::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling");
                on_interrupt.cancel();
            }
        });

        Ok(Self {
            config,
            loader,
            cancel,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries the result graph, so logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting ontocrawl CLI");

    match &cli.command {
        Commands::Config(args) => commands::config::run(args, &cli)?,
        Commands::Completions(args) => completions::run(args)?,
        Commands::Crawl(args) => {
            let ctx = AppContext::new(&cli)?;
            crawl::run(args, &cli, &ctx).await?
        }
        Commands::Imports(args) => {
            let ctx = AppContext::new(&cli)?;
            imports::run(args, &cli, &ctx).await?
        }
        Commands::Contexts(args) => {
            let ctx = AppContext::new(&cli)?;
            contexts::run(args, &cli, &ctx).await?
        }
    }

    Ok(())
}
