//! Crawl command

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use super::{read_query, CrawlFlags, SourceArgs};
use crate::output::{emit, OutputFormat};
use crate::{AppContext, Cli};
use ontocrawl_core::Node;
use ontocrawl_engine::{CrawlOptions, CrawlStats, ImportClosure, Orchestrator, SeedSelector};

#[derive(Args)]
pub struct CrawlArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Seed IRI (repeatable)
    #[arg(short, long = "seed", conflicts_with = "seed_query")]
    pub seeds: Vec<String>,

    /// SELECT query binding one variable to the seeds, inline or @file
    #[arg(long)]
    pub seed_query: Option<String>,

    /// Also crawl the owl:imports closure of the source
    #[arg(long)]
    pub imports: bool,

    /// Output the source graph merged with the result
    #[arg(long)]
    pub inplace: bool,

    #[command(flatten)]
    pub flags: CrawlFlags,

    /// Output file for the result graph (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "ntriples")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct CrawlSummary<'a> {
    seeds: usize,
    triples: usize,
    stats: &'a CrawlStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    imports: Option<&'a ImportClosure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a PathBuf>,
}

pub async fn run(args: &CrawlArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let config = args.flags.apply(&ctx.config.crawl)?;

    let explicit = (!args.seeds.is_empty())
        .then(|| args.seeds.iter().map(|iri| Node::iri(iri.as_str())).collect());
    let query = args.seed_query.as_deref().map(read_query).transpose()?;
    let selector = SeedSelector::from_parts(explicit, query)?;

    let source = args.source.open(ctx).await?;
    let orchestrator =
        Orchestrator::new(ctx.loader.clone(), config).with_cancel(ctx.cancel.clone());
    let crawl = orchestrator
        .crawl_graph(
            source,
            &selector,
            CrawlOptions {
                expand_imports: args.imports,
                inplace: args.inplace,
            },
        )
        .await?;

    tracing::info!(
        "Crawled {} seeds into {} triples",
        crawl.seeds.len(),
        crawl.graph.len()
    );

    let summary = CrawlSummary {
        seeds: crawl.seeds.len(),
        triples: crawl.graph.len(),
        stats: &crawl.stats,
        imports: crawl.imports.as_ref(),
        output: args.output.as_ref(),
    };
    emit(
        &crawl.graph,
        &summary,
        args.output.as_deref(),
        args.format,
        cli.quiet,
    )
}
