//! Seed resolution

use ontocrawl_backend::GraphBackend;
use ontocrawl_core::{Error, Node, Result, SeedSet};
use serde::{Deserialize, Serialize};

/// How the roots of a crawl are chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedSelector {
    /// A fixed collection of nodes
    Explicit(SeedSet),
    /// A SELECT query projecting exactly one variable
    Query(String),
}

impl SeedSelector {
    pub fn explicit<I: IntoIterator<Item = Node>>(nodes: I) -> Self {
        Self::Explicit(nodes.into_iter().collect())
    }

    pub fn query(sparql: impl Into<String>) -> Self {
        Self::Query(sparql.into())
    }

    /// Build a selector from two mutually exclusive inputs; exactly one must
    /// be given
    pub fn from_parts(explicit: Option<Vec<Node>>, query: Option<String>) -> Result<Self> {
        match (explicit, query) {
            (Some(nodes), None) => Ok(Self::explicit(nodes)),
            (None, Some(sparql)) => Ok(Self::Query(sparql)),
            (Some(_), Some(_)) => Err(Error::Configuration(
                "Seeds and seed query are mutually exclusive; set exactly one".to_string(),
            )),
            (None, None) => Err(Error::Configuration(
                "Either seeds or a seed query is required".to_string(),
            )),
        }
    }
}

/// Turns a [`SeedSelector`] into a concrete seed set
pub struct SeedResolver;

impl SeedResolver {
    /// Resolve seeds against a backend.
    ///
    /// An empty result is valid. A query that projects no variable is a
    /// consistency error; one that projects more than one is a
    /// configuration error.
    pub async fn resolve(backend: &dyn GraphBackend, selector: &SeedSelector) -> Result<SeedSet> {
        let sparql = match selector {
            SeedSelector::Explicit(seeds) => return Ok(seeds.clone()),
            SeedSelector::Query(sparql) => sparql,
        };

        let results = backend.select(sparql).await?;
        let variable = match results.variables.as_slice() {
            [only] => only,
            [] => {
                return Err(Error::Consistency(
                    "Seed query binds no variable".to_string(),
                ))
            }
            many => {
                return Err(Error::Configuration(format!(
                    "Seed query must bind exactly one variable, got {}: {}",
                    many.len(),
                    many.join(", ")
                )))
            }
        };

        let seeds: SeedSet = results
            .rows
            .into_iter()
            .filter_map(|mut row| row.remove(variable))
            .collect();
        tracing::info!("Resolved {} seeds", seeds.len());
        Ok(seeds)
    }
}
