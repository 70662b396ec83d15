//! Contexts command

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Deserialize;

use super::{read_query, CrawlFlags};
use crate::output::{DirectorySink, OutputFormat};
use crate::{AppContext, Cli};
use ontocrawl_backend::LocalBackend;
use ontocrawl_core::Graph;
use ontocrawl_engine::{ContextTable, CrawlOptions, Orchestrator};

#[derive(Args)]
pub struct ContextsArgs {
    /// Document the seeds are selected from
    pub seed_source: String,

    /// Seed query template with a prefix placeholder, inline or @file
    #[arg(short, long)]
    pub template: String,

    /// TOML file with [[contexts]] rows (default: the config file's)
    #[arg(long)]
    pub contexts: Option<PathBuf>,

    /// Also crawl each context's owl:imports closure
    #[arg(long)]
    pub imports: bool,

    /// Contexts processed at once
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,

    #[command(flatten)]
    pub flags: CrawlFlags,

    /// Directory receiving one <key>.nt file per context
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "ntriples")]
    pub format: OutputFormat,
}

#[derive(Deserialize)]
struct ContextsFile {
    #[serde(default)]
    contexts: ContextTable,
}

fn context_table(args: &ContextsArgs, ctx: &AppContext) -> anyhow::Result<ContextTable> {
    match &args.contexts {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let file: ContextsFile = toml::from_str(&content)
                .with_context(|| format!("Invalid context table {}", path.display()))?;
            Ok(file.contexts)
        }
        None => Ok(ctx.config.contexts.clone()),
    }
}

pub async fn run(args: &ContextsArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let table = context_table(args, ctx)?;
    if table.is_empty() {
        anyhow::bail!("No contexts given; pass --contexts or add [[contexts]] to the config file");
    }

    let config = args.flags.apply(&ctx.config.crawl)?;
    let template = read_query(&args.template)?;

    let seed_document = ctx
        .loader
        .load(&args.seed_source)
        .await
        .map_err(ontocrawl_core::Error::from)?;
    let seed_source = LocalBackend::from_document(seed_document);

    let orchestrator = Orchestrator::new(ctx.loader.clone(), config)
        .with_cancel(ctx.cancel.clone())
        .with_context_concurrency(args.jobs);
    let report = orchestrator
        .crawl_contexts(
            &seed_source,
            &template,
            &table,
            CrawlOptions {
                expand_imports: args.imports,
                inplace: false,
            },
        )
        .await?;

    if let Some(dir) = &args.output_dir {
        let mut sink = DirectorySink::create(dir)?;
        report.deliver(&mut sink)?;
        if args.format == OutputFormat::NTriples && !cli.quiet {
            eprintln!("Wrote {} context graphs to {}", sink.written().len(), dir.display());
        }
    }

    if !cli.quiet {
        for (key, reason) in &report.skipped {
            eprintln!("Skipped context {}: {:?}", key, reason);
        }
        for failure in &report.failures {
            eprintln!("Failed context {}: {}", failure.key, failure.failure);
        }
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::NTriples if args.output_dir.is_none() => {
            let mut merged = Graph::new();
            for graph in report.graphs.values() {
                merged.merge(graph);
            }
            print!("{}", merged.to_ntriples());
        }
        OutputFormat::NTriples => {}
    }
    Ok(())
}
