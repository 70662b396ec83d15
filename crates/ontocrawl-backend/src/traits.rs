//! Graph backend trait definitions

use crate::error::BackendResult;
use async_trait::async_trait;
use ontocrawl_core::{Binding, Graph, PatternQuery, SelectResults};
use serde::{Deserialize, Serialize};

/// Which capability set a backend provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Pattern matching against an in-memory graph
    Local,
    /// Queries submitted to a SPARQL endpoint
    Remote,
    /// Several backends queried together
    Union,
}

/// Trait for graph backend implementations
///
/// Local and remote backends return the same binding shape for the same
/// query and map failures onto the same error taxonomy.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Locator the data was obtained from, if known
    fn origin(&self) -> Option<&str> {
        None
    }

    /// Whether blank nodes can be used as bound terms in later queries.
    ///
    /// Blank node labels returned by a remote endpoint do not identify the
    /// same node in a subsequent request.
    fn supports_blank_anchors(&self) -> bool {
        true
    }

    /// The in-memory graph behind this backend, for backends that have one
    fn snapshot(&self) -> Option<&Graph> {
        None
    }

    /// Health check
    async fn health_check(&self) -> BackendResult<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Evaluate a triple pattern, optionally restricted to a predicate set
    async fn query(&self, query: &PatternQuery) -> BackendResult<Vec<Binding>>;

    /// Evaluate a SPARQL SELECT query
    async fn select(&self, sparql: &str) -> BackendResult<SelectResults>;

    /// Evaluate a SPARQL ASK query
    async fn ask(&self, sparql: &str) -> BackendResult<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Graph Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Merge two graphs into a new one
    fn merge(&self, a: &Graph, b: &Graph) -> Graph {
        a.union(b)
    }
}
