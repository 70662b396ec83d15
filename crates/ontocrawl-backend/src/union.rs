//! Composite backend over several members

use crate::error::{BackendError, BackendResult};
use crate::traits::{BackendKind, GraphBackend};
use async_trait::async_trait;
use futures::future::try_join_all;
use ontocrawl_core::{Binding, PatternQuery, SelectResults};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Queries every member and returns the de-duplicated union of their
/// bindings.
///
/// Typical use: a remote endpoint crawled together with a locally loaded
/// import closure.
pub struct UnionBackend {
    members: Vec<Arc<dyn GraphBackend>>,
}

impl UnionBackend {
    pub fn new(members: Vec<Arc<dyn GraphBackend>>) -> Self {
        Self { members }
    }

    pub fn push(&mut self, member: Arc<dyn GraphBackend>) {
        self.members.push(member);
    }

    pub fn members(&self) -> &[Arc<dyn GraphBackend>] {
        &self.members
    }

    fn ensure_members(&self) -> BackendResult<()> {
        if self.members.is_empty() {
            return Err(BackendError::Configuration(
                "Union backend has no members".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl GraphBackend for UnionBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Union
    }

    fn origin(&self) -> Option<&str> {
        self.members.first().and_then(|m| m.origin())
    }

    /// Blank anchors are only safe when every member keeps stable labels
    fn supports_blank_anchors(&self) -> bool {
        self.members.iter().all(|m| m.supports_blank_anchors())
    }

    async fn health_check(&self) -> BackendResult<bool> {
        let checks = try_join_all(self.members.iter().map(|m| m.health_check())).await?;
        Ok(checks.into_iter().all(|ok| ok))
    }

    async fn query(&self, query: &PatternQuery) -> BackendResult<Vec<Binding>> {
        self.ensure_members()?;
        let answers = try_join_all(self.members.iter().map(|m| m.query(query))).await?;

        let mut seen = BTreeSet::new();
        Ok(answers
            .into_iter()
            .flatten()
            .filter(|b| seen.insert(b.clone()))
            .collect())
    }

    async fn select(&self, sparql: &str) -> BackendResult<SelectResults> {
        self.ensure_members()?;
        let answers = try_join_all(self.members.iter().map(|m| m.select(sparql))).await?;

        let mut merged = SelectResults::default();
        let mut seen = BTreeSet::new();
        for answer in answers {
            for var in answer.variables {
                if !merged.variables.contains(&var) {
                    merged.variables.push(var);
                }
            }
            merged
                .rows
                .extend(answer.rows.into_iter().filter(|b| seen.insert(b.clone())));
        }
        Ok(merged)
    }

    async fn ask(&self, sparql: &str) -> BackendResult<bool> {
        self.ensure_members()?;
        let answers = try_join_all(self.members.iter().map(|m| m.ask(sparql))).await?;
        Ok(answers.into_iter().any(|yes| yes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalBackend;
    use ontocrawl_core::{Graph, Node, PatternTerm, Triple, TriplePattern};

    const P: &str = "http://example.org/p";

    fn local(triples: Vec<Triple>) -> Arc<dyn GraphBackend> {
        Arc::new(LocalBackend::new(Graph::from(triples)))
    }

    #[tokio::test]
    async fn test_union_deduplicates_bindings() {
        let union = UnionBackend::new(vec![
            local(vec![
                Triple::iris("http://example.org/A", P, "http://example.org/B"),
                Triple::iris("http://example.org/A", P, "http://example.org/C"),
            ]),
            local(vec![
                Triple::iris("http://example.org/A", P, "http://example.org/B"),
                Triple::iris("http://example.org/A", P, "http://example.org/D"),
            ]),
        ]);

        let query = PatternQuery::new(TriplePattern::new(
            Node::iri("http://example.org/A"),
            Node::iri(P),
            PatternTerm::var("o"),
        ));
        let bindings = union.query(&query).await.unwrap();
        assert_eq!(bindings.len(), 3);
        assert_eq!(union.kind(), BackendKind::Union);
        assert!(union.supports_blank_anchors());
        assert!(union.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_union_ask_and_select() {
        let union = UnionBackend::new(vec![
            local(vec![Triple::iris("http://example.org/A", P, "http://example.org/B")]),
            local(vec![Triple::iris("http://example.org/X", P, "http://example.org/B")]),
        ]);

        assert!(union
            .ask("ASK { <http://example.org/X> ?p ?o }")
            .await
            .unwrap());
        let results = union
            .select("SELECT ?s WHERE { ?s <http://example.org/p> <http://example.org/B> }")
            .await
            .unwrap();
        assert_eq!(results.variables, vec!["s".to_string()]);
        assert_eq!(results.rows.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_union_rejected() {
        let union = UnionBackend::new(Vec::new());
        let query = PatternQuery::new(TriplePattern::new(
            PatternTerm::var("s"),
            PatternTerm::var("p"),
            PatternTerm::var("o"),
        ));
        assert!(matches!(
            union.query(&query).await,
            Err(BackendError::Configuration(_))
        ));
    }
}
