//! In-memory graph backend

use crate::convert::{node_from_term, quad_from_triple};
use crate::error::{BackendError, BackendResult};
use crate::loader::LoadedDocument;
use crate::traits::{BackendKind, GraphBackend};
use async_trait::async_trait;
use ontocrawl_core::{Binding, Graph, PatternQuery, SelectResults};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use std::sync::OnceLock;

/// Backend over a graph held in memory
///
/// Pattern queries run directly against the graph indexes. SPARQL text is
/// evaluated by an oxigraph store built from the graph on first use.
pub struct LocalBackend {
    graph: Graph,
    origin: Option<String>,
    store: OnceLock<Store>,
}

impl LocalBackend {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            origin: None,
            store: OnceLock::new(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn from_document(document: LoadedDocument) -> Self {
        Self::new(document.graph).with_origin(document.locator)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    fn store(&self) -> BackendResult<&Store> {
        if let Some(store) = self.store.get() {
            return Ok(store);
        }

        let store = Store::new().map_err(|e| BackendError::Store(e.to_string()))?;
        let mut skipped = 0usize;
        for triple in self.graph.iter() {
            match quad_from_triple(triple)? {
                Some(quad) => {
                    store
                        .insert(&quad)
                        .map_err(|e| BackendError::Store(e.to_string()))?;
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!("{} generalized triples left out of the SPARQL store", skipped);
        }

        Ok(self.store.get_or_init(|| store))
    }

    fn evaluate(&self, sparql: &str) -> BackendResult<QueryResults> {
        self.store()?
            .query(sparql)
            .map_err(|e| BackendError::InvalidQuery(e.to_string()))
    }
}

#[async_trait]
impl GraphBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    fn snapshot(&self) -> Option<&Graph> {
        Some(&self.graph)
    }

    async fn health_check(&self) -> BackendResult<bool> {
        Ok(true)
    }

    async fn query(&self, query: &PatternQuery) -> BackendResult<Vec<Binding>> {
        Ok(self.graph.evaluate(query))
    }

    async fn select(&self, sparql: &str) -> BackendResult<SelectResults> {
        match self.evaluate(sparql)? {
            QueryResults::Solutions(solutions) => {
                let variables = solutions
                    .variables()
                    .iter()
                    .map(|v| v.as_str().to_string())
                    .collect();
                let mut results = SelectResults::new(variables);
                for solution in solutions {
                    let solution =
                        solution.map_err(|e| BackendError::InvalidQuery(e.to_string()))?;
                    let row: Binding = solution
                        .iter()
                        .map(|(var, term)| (var.as_str().to_string(), node_from_term(term)))
                        .collect();
                    results.rows.push(row);
                }
                Ok(results)
            }
            QueryResults::Boolean(_) => Err(BackendError::UnexpectedResults(
                "expected SELECT solutions, got a boolean".to_string(),
            )),
            QueryResults::Graph(_) => Err(BackendError::UnexpectedResults(
                "expected SELECT solutions, got a graph".to_string(),
            )),
        }
    }

    async fn ask(&self, sparql: &str) -> BackendResult<bool> {
        match self.evaluate(sparql)? {
            QueryResults::Boolean(answer) => Ok(answer),
            _ => Err(BackendError::UnexpectedResults(
                "expected an ASK answer".to_string(),
            )),
        }
    }
}
