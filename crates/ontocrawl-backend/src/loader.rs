//! Document loading with ordered format fallback

use crate::convert::triple_from_quad;
use crate::format::{DocumentFormat, FormatPolicy};
use crate::source::{DocumentSource, FetchedDocument};
use ontocrawl_core::{FormatAttempt, Graph, LoadFailure};
use oxigraph::io::RdfParser;
use std::sync::Arc;

/// A successfully parsed document
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub locator: String,
    /// The format that parsed it
    pub format: DocumentFormat,
    pub graph: Graph,
}

/// Fetches documents and parses them with the first format that accepts them
#[derive(Clone)]
pub struct DocumentLoader {
    source: Arc<dyn DocumentSource>,
    policy: FormatPolicy,
}

impl DocumentLoader {
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self {
            source,
            policy: FormatPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FormatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &FormatPolicy {
        &self.policy
    }

    /// Fetch and parse one document.
    ///
    /// Fails only after every format in the attempt order was rejected, or
    /// when the bytes could not be fetched at all.
    pub async fn load(&self, locator: &str) -> Result<LoadedDocument, LoadFailure> {
        let fetched = self
            .source
            .fetch(locator)
            .await
            .map_err(|e| LoadFailure::fetch(locator, e.to_string()))?;
        self.parse(&fetched)
    }

    /// Parse already fetched bytes.
    ///
    /// A format that parses without error but yields no triples is kept as
    /// a fallback: later formats may still produce triples, and only when
    /// none does is the document loaded as an empty graph.
    pub fn parse(&self, document: &FetchedDocument) -> Result<LoadedDocument, LoadFailure> {
        let order = self
            .policy
            .attempt_order(&document.locator, document.media_type.as_deref());
        let mut attempts = Vec::with_capacity(order.len());
        let mut empty: Option<DocumentFormat> = None;

        for format in order {
            match parse_as(format, document) {
                Ok(graph) if graph.is_empty() => {
                    tracing::debug!("{} parsed as {} with no triples", document.locator, format);
                    empty.get_or_insert(format);
                }
                Ok(graph) => {
                    tracing::info!(
                        "Loaded {} as {} ({} triples)",
                        document.locator,
                        format,
                        graph.len()
                    );
                    return Ok(LoadedDocument {
                        locator: document.locator.clone(),
                        format,
                        graph,
                    });
                }
                Err(message) => {
                    tracing::debug!("{} is not {}: {}", document.locator, format, message);
                    attempts.push(FormatAttempt {
                        format: format.name().to_string(),
                        message,
                    });
                }
            }
        }

        match empty {
            Some(format) => {
                tracing::info!("Loaded {} as {} (no triples)", document.locator, format);
                Ok(LoadedDocument {
                    locator: document.locator.clone(),
                    format,
                    graph: Graph::new(),
                })
            }
            None => Err(LoadFailure::exhausted(document.locator.clone(), attempts)),
        }
    }
}

fn parse_as(format: DocumentFormat, document: &FetchedDocument) -> Result<Graph, String> {
    let mut parser = RdfParser::from_format(format.rdf_format()).rename_blank_nodes();
    if let Some(base) = &document.base_iri {
        parser = parser.with_base_iri(base).map_err(|e| e.to_string())?;
    }

    let mut graph = Graph::new();
    for quad in parser.for_reader(document.bytes.as_slice()) {
        let quad = quad.map_err(|e| e.to_string())?;
        graph.insert(triple_from_quad(&quad));
    }
    Ok(graph)
}
