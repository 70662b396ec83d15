//! Imports command

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::output::{emit, OutputFormat};
use crate::{AppContext, Cli};
use ontocrawl_core::{ErrorPolicy, LoadFailure};
use ontocrawl_engine::ImportResolver;

#[derive(Args)]
pub struct ImportsArgs {
    /// Root document path or URL
    pub source: String,

    /// Output the root graph merged with its closure
    #[arg(long)]
    pub inplace: bool,

    /// Skip imports that cannot be loaded instead of failing
    #[arg(long)]
    pub ignore_errors: bool,

    /// Output file for the closure graph (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "ntriples")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ImportsSummary<'a> {
    root: &'a str,
    documents: &'a [String],
    failures: &'a [LoadFailure],
    triples: usize,
}

pub async fn run(args: &ImportsArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let policy = if args.ignore_errors {
        ErrorPolicy::Ignore
    } else {
        ctx.config.crawl.error_policy
    };

    let root = ctx
        .loader
        .load(&args.source)
        .await
        .map_err(ontocrawl_core::Error::from)?;

    let resolver =
        ImportResolver::new(ctx.loader.clone(), policy).with_cancel(ctx.cancel.clone());
    let closure = resolver
        .resolve_from(&root.graph, Some(root.locator.as_str()))
        .await?;

    let graph = if args.inplace {
        root.graph.union(&closure.graph)
    } else {
        closure.graph.clone()
    };

    for failure in &closure.failures {
        if !cli.quiet {
            eprintln!("Skipped import: {}", failure);
        }
    }

    let summary = ImportsSummary {
        root: &root.locator,
        documents: &closure.documents,
        failures: &closure.failures,
        triples: graph.len(),
    };
    emit(&graph, &summary, args.output.as_deref(), args.format, cli.quiet)
}
