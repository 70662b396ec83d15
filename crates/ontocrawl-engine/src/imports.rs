//! Transitive `owl:imports` resolution

use ontocrawl_backend::{CancelHandle, DocumentLoader, GraphBackend};
use ontocrawl_core::vocab::{owl, rdf};
use ontocrawl_core::{Error, ErrorPolicy, Graph, LoadFailure, Node, Result, Triple};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Documents reachable through `owl:imports`, and their merged contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportClosure {
    /// Locators of loaded documents, in load order
    pub documents: Vec<String>,
    /// Documents skipped under [`ErrorPolicy::Ignore`]
    pub failures: Vec<LoadFailure>,
    #[serde(skip)]
    pub graph: Graph,
}

impl ImportClosure {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Loads the import closure of a graph.
///
/// Each document IRI is fetched at most once per resolution, so import
/// cycles terminate. The caller's graph is never modified.
#[derive(Clone)]
pub struct ImportResolver {
    loader: DocumentLoader,
    policy: ErrorPolicy,
    cancel: CancelHandle,
}

impl ImportResolver {
    pub fn new(loader: DocumentLoader, policy: ErrorPolicy) -> Self {
        Self {
            loader,
            policy,
            cancel: CancelHandle::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Resolve the closure of an in-memory graph
    pub async fn resolve(&self, graph: &Graph) -> Result<ImportClosure> {
        self.resolve_from(graph, None).await
    }

    /// Resolve the closure of a graph loaded from `root`.
    ///
    /// Only fetched locators count as seen; `root` is marked up front so an
    /// import cycle back to it does not fetch it again.
    pub async fn resolve_from(&self, graph: &Graph, root: Option<&str>) -> Result<ImportClosure> {
        let mut seen: HashSet<String> = root.into_iter().map(str::to_string).collect();
        let mut pending: VecDeque<String> = imports_of(graph).into_iter().collect();
        let mut closure = ImportClosure::default();

        while let Some(iri) = pending.pop_front() {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if !seen.insert(iri.clone()) {
                continue;
            }

            match self.loader.load(&iri).await {
                Ok(document) => {
                    pending.extend(imports_of(&document.graph));
                    closure.graph.merge(&document.graph);
                    closure.documents.push(iri);
                }
                Err(failure) => match self.policy {
                    ErrorPolicy::FailFast => return Err(failure.into()),
                    ErrorPolicy::Ignore => {
                        tracing::warn!("Ignoring import: {}", failure);
                        closure.failures.push(failure);
                    }
                },
            }
        }

        tracing::info!(
            "Import closure: {} documents, {} triples, {} skipped",
            closure.documents.len(),
            closure.graph.len(),
            closure.failures.len()
        );
        Ok(closure)
    }

    /// Resolve the closure and return it alone, or merged with the input
    /// graph when `inplace` is set
    pub async fn resolve_graph(&self, graph: &Graph, inplace: bool) -> Result<Graph> {
        let closure = self.resolve(graph).await?;
        if inplace {
            Ok(graph.union(&closure.graph))
        } else {
            Ok(closure.graph)
        }
    }

    /// Resolve the closure of the data behind any backend.
    ///
    /// Only the ontology declarations are read from the backend; the
    /// imported documents themselves are loaded locally.
    pub async fn resolve_backend(&self, backend: &dyn GraphBackend) -> Result<ImportClosure> {
        let results = backend
            .select(&format!(
                "SELECT DISTINCT ?ontology ?import WHERE {{ ?ontology <{}> <{}> . OPTIONAL {{ ?ontology <{}> ?import }} }}",
                rdf::TYPE,
                owl::ONTOLOGY,
                owl::IMPORTS
            ))
            .await?;

        let mut declarations = Graph::new();
        for row in results.rows {
            let Some(ontology) = row.get("ontology") else {
                continue;
            };
            declarations.insert(Triple::new(
                ontology.clone(),
                Node::iri(rdf::TYPE),
                Node::iri(owl::ONTOLOGY),
            ));
            if let Some(import) = row.get("import") {
                declarations.insert(Triple::new(
                    ontology.clone(),
                    Node::iri(owl::IMPORTS),
                    import.clone(),
                ));
            }
        }
        self.resolve_from(&declarations, backend.origin()).await
    }
}

/// `owl:imports` targets of every ontology declared in the graph, sorted
fn imports_of(graph: &Graph) -> BTreeSet<String> {
    let imports = Node::iri(owl::IMPORTS);
    graph
        .subjects_with(&Node::iri(rdf::TYPE), &Node::iri(owl::ONTOLOGY))
        .into_iter()
        .flat_map(|ontology| graph.objects_of(ontology, &imports))
        .filter_map(|node| node.as_iri().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ontocrawl_backend::{
        BackendResult, DocumentSource, FetchedDocument, LocalBackend, MemoryDocumentSource,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    const D1: &str = "http://example.org/d1";
    const D2: &str = "http://example.org/d2";
    const D3: &str = "http://example.org/d3";

    /// Counts fetches per locator
    struct CountingSource {
        inner: MemoryDocumentSource,
        fetches: Mutex<HashMap<String, usize>>,
    }

    impl CountingSource {
        fn count(&self, locator: &str) -> usize {
            self.fetches.lock().unwrap().get(locator).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl DocumentSource for CountingSource {
        async fn fetch(&self, locator: &str) -> BackendResult<FetchedDocument> {
            *self
                .fetches
                .lock()
                .unwrap()
                .entry(locator.to_string())
                .or_insert(0) += 1;
            self.inner.fetch(locator).await
        }
    }

    fn ontology(iri: &str, imports: &[&str], class: &str) -> String {
        let mut doc = format!(
            "@prefix owl: <http://www.w3.org/2002/07/owl#> .\n<{}> a owl:Ontology",
            iri
        );
        for import in imports {
            doc.push_str(&format!(" ; owl:imports <{}>", import));
        }
        doc.push_str(&format!(" .\n<{}> a owl:Class .\n", class));
        doc
    }

    fn source(docs: &[(&str, String)]) -> Arc<CountingSource> {
        let inner = MemoryDocumentSource::new();
        for (locator, body) in docs {
            inner.insert(*locator, body.clone());
        }
        Arc::new(CountingSource {
            inner,
            fetches: Mutex::new(HashMap::new()),
        })
    }

    async fn root_graph(source: &Arc<CountingSource>) -> Graph {
        DocumentLoader::new(source.clone())
            .load(D1)
            .await
            .unwrap()
            .graph
    }

    fn class(name: &str) -> Triple {
        Triple::iris(&format!("http://example.org/{}", name), rdf::TYPE, owl::CLASS)
    }

    #[tokio::test]
    async fn test_import_chain() {
        let source = source(&[
            (D1, ontology(D1, &[D2], "http://example.org/C1")),
            (D2, ontology(D2, &[D3], "http://example.org/C2")),
            (D3, ontology(D3, &[], "http://example.org/C3")),
        ]);
        let root = root_graph(&source).await;
        let resolver = ImportResolver::new(DocumentLoader::new(source.clone()), ErrorPolicy::FailFast);

        let closure = resolver.resolve(&root).await.unwrap();
        assert_eq!(closure.documents, vec![D2.to_string(), D3.to_string()]);
        assert!(closure.graph.contains(&class("C2")));
        assert!(closure.graph.contains(&class("C3")));
        assert!(!closure.graph.contains(&class("C1")));
        assert_eq!(source.count(D2), 1);
        assert_eq!(source.count(D3), 1);

        let merged = resolver.resolve_graph(&root, true).await.unwrap();
        assert!(merged.contains(&class("C1")) && merged.contains(&class("C3")));
        assert_eq!(merged.len(), root.len() + closure.graph.len());
    }

    #[tokio::test]
    async fn test_import_cycle_terminates() {
        let source = source(&[
            (D1, ontology(D1, &[D2], "http://example.org/C1")),
            (D2, ontology(D2, &[D3], "http://example.org/C2")),
            (D3, ontology(D3, &[D1], "http://example.org/C3")),
        ]);
        let root = root_graph(&source).await;
        let resolver = ImportResolver::new(DocumentLoader::new(source.clone()), ErrorPolicy::FailFast);

        let closure = resolver.resolve_from(&root, Some(D1)).await.unwrap();
        let merged = root.union(&closure.graph);
        assert!(merged.contains(&class("C1")));
        assert!(merged.contains(&class("C2")));
        assert!(merged.contains(&class("C3")));
        // The root was fetched once by the test itself, never by the resolver
        assert_eq!(source.count(D1), 1);
        assert_eq!(source.count(D2), 1);
        assert_eq!(source.count(D3), 1);

        // Without a known root the cycle still ends after one extra fetch
        let closure = resolver.resolve(&root).await.unwrap();
        assert_eq!(
            closure.documents,
            vec![D2.to_string(), D3.to_string(), D1.to_string()]
        );
        assert_eq!(source.count(D1), 2);
        assert_eq!(source.count(D2), 2);
    }

    #[tokio::test]
    async fn test_import_typed_as_ontology_is_still_loaded() {
        let root = format!(
            "@prefix owl: <http://www.w3.org/2002/07/owl#> .\n\
             <{d1}> a owl:Ontology ; owl:imports <{d2}> .\n\
             <{d2}> a owl:Ontology .\n",
            d1 = D1,
            d2 = D2
        );
        let source = source(&[
            (D1, root),
            (D2, ontology(D2, &[D3], "http://example.org/C2")),
            (D3, ontology(D3, &[], "http://example.org/C3")),
        ]);
        let root = root_graph(&source).await;
        let resolver = ImportResolver::new(DocumentLoader::new(source.clone()), ErrorPolicy::FailFast);

        let closure = resolver.resolve_from(&root, Some(D1)).await.unwrap();
        assert_eq!(closure.documents, vec![D2.to_string(), D3.to_string()]);
        assert!(closure.graph.contains(&class("C2")));
        assert!(closure.graph.contains(&class("C3")));
        assert_eq!(source.count(D2), 1);
    }

    #[tokio::test]
    async fn test_fail_fast_and_ignore() {
        let source = source(&[
            (D1, ontology(D1, &[D2, D3], "http://example.org/C1")),
            (D2, "<<< definitely not rdf".to_string()),
            (D3, ontology(D3, &[], "http://example.org/C3")),
        ]);
        let root = root_graph(&source).await;

        let strict = ImportResolver::new(DocumentLoader::new(source.clone()), ErrorPolicy::FailFast);
        let err = strict.resolve(&root).await.unwrap_err();
        match err {
            Error::Parse(failure) => {
                assert_eq!(failure.locator, D2);
                assert!(!failure.attempts.is_empty());
            }
            other => panic!("expected parse error, got {:?}", other),
        }

        let lenient = ImportResolver::new(DocumentLoader::new(source.clone()), ErrorPolicy::Ignore);
        let closure = lenient.resolve(&root).await.unwrap();
        assert_eq!(closure.documents, vec![D3.to_string()]);
        assert_eq!(closure.failures.len(), 1);
        assert!(!closure.is_complete());
        assert!(closure.graph.contains(&class("C3")));
    }

    #[tokio::test]
    async fn test_unreachable_import_follows_policy() {
        let source = source(&[(D1, ontology(D1, &[D2], "http://example.org/C1"))]);
        let root = root_graph(&source).await;

        let lenient = ImportResolver::new(DocumentLoader::new(source.clone()), ErrorPolicy::Ignore);
        let closure = lenient.resolve(&root).await.unwrap();
        assert!(closure.graph.is_empty());
        assert!(closure.failures[0].fetch_error.is_some());
    }

    #[tokio::test]
    async fn test_resolve_through_backend_declarations() {
        let source = source(&[
            (D1, ontology(D1, &[D2], "http://example.org/C1")),
            (D2, ontology(D2, &[], "http://example.org/C2")),
        ]);
        let backend = LocalBackend::new(root_graph(&source).await);
        let resolver = ImportResolver::new(DocumentLoader::new(source.clone()), ErrorPolicy::FailFast);

        let closure = resolver.resolve_backend(&backend).await.unwrap();
        assert_eq!(closure.documents, vec![D2.to_string()]);
        assert_eq!(source.count(D1), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_loading() {
        let source = source(&[
            (D1, ontology(D1, &[D2], "http://example.org/C1")),
            (D2, ontology(D2, &[], "http://example.org/C2")),
        ]);
        let root = root_graph(&source).await;
        let cancel = CancelHandle::new();
        cancel.cancel();
        let resolver = ImportResolver::new(DocumentLoader::new(source.clone()), ErrorPolicy::Ignore)
            .with_cancel(cancel);

        assert!(matches!(resolver.resolve(&root).await, Err(Error::Cancelled)));
        assert_eq!(source.count(D2), 0);
    }
}
