//! Property-path crawler
//!
//! Expansion is edge by edge rather than one transitive property-path query,
//! so every discovered edge keeps its predicate label.

use futures::stream::{self, StreamExt};
use ontocrawl_backend::{CancelHandle, GraphBackend};
use ontocrawl_core::{
    Binding, CrawlConfig, Direction, Error, Graph, Node, PatternQuery, PatternTerm, Result,
    SeedSet, Triple, TriplePattern,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

const PREDICATE_VAR: &str = "p";
const NEIGHBOR_VAR: &str = "n";

/// Backend queries allowed in flight at once
const DEFAULT_CONCURRENCY: usize = 8;

/// Crawl statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    pub seeds: usize,
    pub queries: usize,
    pub triples_added: usize,
    pub upstream_visited: usize,
    pub downstream_visited: usize,
}

/// Result graph of one crawl plus its statistics
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub graph: Graph,
    pub stats: CrawlStats,
}

/// One pending expansion: a node and the direction to expand it in
#[derive(Debug, Clone)]
struct Step {
    node: Node,
    direction: Direction,
}

impl Step {
    fn query(&self, config: &CrawlConfig) -> PatternQuery {
        let node = self.node.clone();
        let pattern = match self.direction {
            Direction::Downstream => TriplePattern::new(
                node,
                PatternTerm::var(PREDICATE_VAR),
                PatternTerm::var(NEIGHBOR_VAR),
            ),
            Direction::Upstream => TriplePattern::new(
                PatternTerm::var(NEIGHBOR_VAR),
                PatternTerm::var(PREDICATE_VAR),
                node,
            ),
        };
        PatternQuery::new(pattern).restricted_to(config.predicates.clone())
    }

    fn edge(&self, predicate: Node, neighbor: Node) -> Triple {
        match self.direction {
            Direction::Downstream => Triple::new(self.node.clone(), predicate, neighbor),
            Direction::Upstream => Triple::new(neighbor, predicate, self.node.clone()),
        }
    }
}

/// State of a single crawl invocation; dropped when the crawl returns
struct CrawlSession {
    result: Graph,
    upstream_seen: HashSet<Node>,
    downstream_seen: HashSet<Node>,
    frontier: VecDeque<Step>,
    blank_anchors: bool,
    stats: CrawlStats,
}

impl CrawlSession {
    /// Seeds start out visited in both directions
    fn new(seeds: &SeedSet, blank_anchors: bool) -> Self {
        Self {
            result: Graph::new(),
            upstream_seen: seeds.iter().cloned().collect(),
            downstream_seen: seeds.iter().cloned().collect(),
            frontier: VecDeque::new(),
            blank_anchors,
            stats: CrawlStats {
                seeds: seeds.len(),
                ..Default::default()
            },
        }
    }

    fn seen_mut(&mut self, direction: Direction) -> &mut HashSet<Node> {
        match direction {
            Direction::Upstream => &mut self.upstream_seen,
            Direction::Downstream => &mut self.downstream_seen,
        }
    }

    fn schedule(&mut self, node: Node, direction: Direction) {
        // Literals have no outgoing edges; remote blank labels cannot be re-queried
        if node.is_literal() || (node.is_blank() && !self.blank_anchors) {
            return;
        }
        self.frontier.push_back(Step { node, direction });
    }

    fn absorb(&mut self, step: &Step, bindings: Vec<Binding>, shallow: bool) -> Result<()> {
        self.stats.queries += 1;
        for mut binding in bindings {
            let (Some(predicate), Some(neighbor)) =
                (binding.remove(PREDICATE_VAR), binding.remove(NEIGHBOR_VAR))
            else {
                return Err(Error::Consistency(format!(
                    "Answer for {} {} lacks ?{} or ?{}",
                    step.direction, step.node, PREDICATE_VAR, NEIGHBOR_VAR
                )));
            };

            if self.result.insert(step.edge(predicate, neighbor.clone())) {
                self.stats.triples_added += 1;
            }
            let fresh = self.seen_mut(step.direction).insert(neighbor.clone());
            if fresh && !shallow {
                self.schedule(neighbor, step.direction);
            }
        }
        Ok(())
    }

    fn finish(mut self) -> CrawlOutcome {
        self.stats.upstream_visited = self.upstream_seen.len();
        self.stats.downstream_visited = self.downstream_seen.len();
        CrawlOutcome {
            graph: self.result,
            stats: self.stats,
        }
    }
}

/// Bidirectional, cycle-safe property-path crawler.
///
/// Pending expansions are processed in waves; the queries of one wave run
/// concurrently and their answers are folded into the session one at a
/// time, so the result does not depend on completion order.
pub struct Crawler {
    backend: Arc<dyn GraphBackend>,
    config: CrawlConfig,
    cancel: CancelHandle,
    concurrency: usize,
}

impl Crawler {
    pub fn new(backend: Arc<dyn GraphBackend>, config: CrawlConfig) -> Self {
        Self {
            backend,
            config,
            cancel: CancelHandle::new(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawl from the seeds and return the result graph
    pub async fn crawl(&self, seeds: &SeedSet) -> Result<Graph> {
        Ok(self.crawl_with_stats(seeds).await?.graph)
    }

    pub async fn crawl_with_stats(&self, seeds: &SeedSet) -> Result<CrawlOutcome> {
        self.config.validate()?;
        tracing::info!(
            "Crawling from {} seeds ({:?} backend)",
            seeds.len(),
            self.backend.kind()
        );

        let mut session = CrawlSession::new(seeds, self.backend.supports_blank_anchors());
        for direction in self.config.directions() {
            for seed in seeds {
                session.schedule(seed.clone(), direction);
            }
        }

        while !session.frontier.is_empty() {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let wave: Vec<Step> = session.frontier.drain(..).collect();
            tracing::debug!("Expanding {} nodes", wave.len());

            let mut answers = stream::iter(wave)
                .map(|step| self.expand(step))
                .buffer_unordered(self.concurrency);
            while let Some(answer) = answers.next().await {
                let (step, bindings) = answer?;
                let shallow = self.config.is_shallow(step.direction);
                session.absorb(&step, bindings, shallow)?;
            }
        }

        let outcome = session.finish();
        tracing::info!(
            "Crawl finished: {} triples from {} queries (visited {} upstream, {} downstream)",
            outcome.graph.len(),
            outcome.stats.queries,
            outcome.stats.upstream_visited,
            outcome.stats.downstream_visited
        );
        Ok(outcome)
    }

    async fn expand(&self, step: Step) -> Result<(Step, Vec<Binding>)> {
        let query = step.query(&self.config);
        let bindings = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(Error::Cancelled),
            answer = self.backend.query(&query) => answer?,
        };
        Ok((step, bindings))
    }
}
