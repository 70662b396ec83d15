//! Crawl sessions: seeds, imports and crawler composed

use crate::context::{ContextFailure, ContextReport, ContextRow, ContextTable, SkipReason};
use crate::crawler::{CrawlStats, Crawler};
use crate::imports::{ImportClosure, ImportResolver};
use crate::seeds::{SeedResolver, SeedSelector};
use futures::stream::{self, StreamExt};
use ontocrawl_backend::{CancelHandle, DocumentLoader, GraphBackend, LocalBackend, UnionBackend};
use ontocrawl_core::vocab::{owl, rdf};
use ontocrawl_core::{
    CrawlConfig, Error, ErrorPolicy, Graph, Node, PatternQuery, PatternTerm, Result, SeedSet,
    TriplePattern,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

const DEFAULT_CONTEXT_CONCURRENCY: usize = 4;

/// Per-session switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlOptions {
    /// Crawl over the source merged with its `owl:imports` closure
    pub expand_imports: bool,
    /// Return the source graph merged with the crawl result
    pub inplace: bool,
}

/// Result of one crawl session
#[derive(Debug, Clone)]
pub struct GraphCrawl {
    pub graph: Graph,
    pub seeds: SeedSet,
    pub stats: CrawlStats,
    pub imports: Option<ImportClosure>,
}

/// Runs crawl sessions
pub struct Orchestrator {
    loader: DocumentLoader,
    config: CrawlConfig,
    cancel: CancelHandle,
    context_concurrency: usize,
}

impl Orchestrator {
    pub fn new(loader: DocumentLoader, config: CrawlConfig) -> Self {
        Self {
            loader,
            config,
            cancel: CancelHandle::new(),
            context_concurrency: DEFAULT_CONTEXT_CONCURRENCY,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_context_concurrency(mut self, width: usize) -> Self {
        self.context_concurrency = width.max(1);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    fn import_resolver(&self) -> ImportResolver {
        ImportResolver::new(self.loader.clone(), self.config.error_policy)
            .with_cancel(self.cancel.clone())
    }

    /// Resolve seeds against `source`, optionally pull in its import
    /// closure, and crawl.
    pub async fn crawl_graph(
        &self,
        source: Arc<dyn GraphBackend>,
        selector: &SeedSelector,
        options: CrawlOptions,
    ) -> Result<GraphCrawl> {
        if options.inplace && source.snapshot().is_none() {
            return Err(Error::Configuration(format!(
                "In-place output needs a local source, got a {:?} backend",
                source.kind()
            )));
        }

        let seeds = SeedResolver::resolve(source.as_ref(), selector).await?;

        let (traversal, imports): (Arc<dyn GraphBackend>, Option<ImportClosure>) =
            if options.expand_imports {
                let resolver = self.import_resolver();
                match source.snapshot() {
                    Some(graph) => {
                        let closure = resolver.resolve_from(graph, source.origin()).await?;
                        let mut merged = LocalBackend::new(graph.union(&closure.graph));
                        if let Some(origin) = source.origin() {
                            merged = merged.with_origin(origin);
                        }
                        let merged: Arc<dyn GraphBackend> = Arc::new(merged);
                        (merged, Some(closure))
                    }
                    None => {
                        let closure = resolver.resolve_backend(source.as_ref()).await?;
                        let imported: Arc<dyn GraphBackend> =
                            Arc::new(LocalBackend::new(closure.graph.clone()));
                        let union: Arc<dyn GraphBackend> =
                            Arc::new(UnionBackend::new(vec![source.clone(), imported]));
                        (union, Some(closure))
                    }
                }
            } else {
                (source.clone(), None)
            };

        let outcome = Crawler::new(traversal, self.config.clone())
            .with_cancel(self.cancel.clone())
            .crawl_with_stats(&seeds)
            .await?;

        let graph = match source.snapshot() {
            Some(input) if options.inplace => input.union(&outcome.graph),
            _ => outcome.graph,
        };

        Ok(GraphCrawl {
            graph,
            seeds,
            stats: outcome.stats,
            imports,
        })
    }

    /// Crawl every context of a table.
    ///
    /// Seeds come from `seed_source` through the template with each row's
    /// prefix substituted in; the row's own document is the traversal
    /// graph. Contexts run concurrently. Under [`ErrorPolicy::Ignore`] a
    /// context whose document cannot be loaded is recorded and the others
    /// continue.
    pub async fn crawl_contexts(
        &self,
        seed_source: &dyn GraphBackend,
        template: &str,
        contexts: &ContextTable,
        options: CrawlOptions,
    ) -> Result<ContextReport> {
        let own_ontologies = self.declared_ontologies(seed_source).await?;
        let mut report = ContextReport::default();
        let mut active = Vec::new();

        for row in contexts.iter() {
            let reason = if row.locator.trim().is_empty() {
                Some(SkipReason::EmptyLocator)
            } else if seed_source.origin() == Some(row.locator.as_str()) {
                Some(SkipReason::SeedOrigin)
            } else if own_ontologies.contains(&row.locator) {
                Some(SkipReason::SeedOntology)
            } else {
                None
            };

            match reason {
                Some(reason) => {
                    tracing::info!("Skipping context {}: {:?}", row.key, reason);
                    report.skipped.push((row.key.clone(), reason));
                }
                None => {
                    let query = row.seed_query(template)?;
                    active.push((row, query));
                }
            }
        }

        let mut results = stream::iter(active)
            .map(|(row, query)| async move {
                let outcome = self.crawl_context(seed_source, row, query, options).await;
                (row, outcome)
            })
            .buffer_unordered(self.context_concurrency);

        while let Some((row, outcome)) = results.next().await {
            match outcome {
                Ok(crawl) => {
                    tracing::info!(
                        "Context {}: {} seeds, {} triples",
                        row.key,
                        crawl.seeds.len(),
                        crawl.graph.len()
                    );
                    report.stats.insert(row.key.clone(), crawl.stats);
                    report.graphs.insert(row.key.clone(), crawl.graph);
                }
                Err(Error::Parse(failure)) if self.config.error_policy == ErrorPolicy::Ignore => {
                    tracing::warn!("Ignoring context {}: {}", row.key, failure);
                    report.failures.push(ContextFailure {
                        key: row.key.clone(),
                        failure,
                    });
                }
                Err(err) => return Err(err),
            }
        }

        report.failures.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(report)
    }

    async fn crawl_context(
        &self,
        seed_source: &dyn GraphBackend,
        row: &ContextRow,
        seed_query: String,
        options: CrawlOptions,
    ) -> Result<GraphCrawl> {
        let document = self.loader.load(&row.locator).await?;
        let context: Arc<dyn GraphBackend> = Arc::new(LocalBackend::from_document(document));

        let seeds = SeedResolver::resolve(seed_source, &SeedSelector::Query(seed_query)).await?;
        self.crawl_graph(context, &SeedSelector::Explicit(seeds), options)
            .await
    }

    /// IRIs the seed source declares as `owl:Ontology`
    async fn declared_ontologies(&self, source: &dyn GraphBackend) -> Result<HashSet<String>> {
        let query = PatternQuery::new(TriplePattern::new(
            PatternTerm::var("o"),
            Node::iri(rdf::TYPE),
            Node::iri(owl::ONTOLOGY),
        ));
        Ok(source
            .query(&query)
            .await?
            .into_iter()
            .filter_map(|mut binding| binding.remove("o"))
            .filter_map(|node| node.as_iri().map(str::to_string))
            .collect())
    }
}
