//! CLI command implementations

pub mod completions;
pub mod config;
pub mod contexts;
pub mod crawl;
pub mod imports;

use std::sync::Arc;

use clap::Args;

use crate::AppContext;
use ontocrawl_backend::{GraphBackend, LocalBackend, RemoteBackend};
use ontocrawl_core::{CrawlConfig, Direction, ErrorPolicy, PredicateSet};

/// Where the graph comes from: a document or a SPARQL endpoint
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Document path or URL
    #[arg(conflicts_with = "endpoint")]
    pub source: Option<String>,

    /// SPARQL endpoint URL (falls back to [remote].endpoint)
    #[arg(long)]
    pub endpoint: Option<String>,
}

impl SourceArgs {
    pub async fn open(&self, ctx: &AppContext) -> anyhow::Result<Arc<dyn GraphBackend>> {
        match &self.source {
            Some(locator) => {
                let document = ctx
                    .loader
                    .load(locator)
                    .await
                    .map_err(ontocrawl_core::Error::from)?;
                tracing::info!(
                    "Loaded {} as {} ({} triples)",
                    document.locator,
                    document.format.name(),
                    document.graph.len()
                );
                Ok(Arc::new(LocalBackend::from_document(document)))
            }
            None => {
                let remote = ctx.config.remote.connect(self.endpoint.as_deref())?;
                tracing::info!("Querying endpoint {}", remote.endpoint);
                let backend = RemoteBackend::new(remote)?.with_cancel(ctx.cancel.clone());
                Ok(Arc::new(backend))
            }
        }
    }
}

/// Crawl settings that override the `[crawl]` section
#[derive(Args, Debug, Clone, Default)]
pub struct CrawlFlags {
    /// Predicate IRI to follow (repeatable; replaces the configured set)
    #[arg(short = 'P', long = "predicate")]
    pub predicates: Vec<String>,

    /// Do not expand upstream
    #[arg(long)]
    pub no_upstream: bool,

    /// Do not expand downstream
    #[arg(long)]
    pub no_downstream: bool,

    /// Recurse in both directions instead of expanding one hop
    #[arg(long)]
    pub deep: bool,

    /// Recurse upstream
    #[arg(long)]
    pub deep_upstream: bool,

    /// Recurse downstream
    #[arg(long)]
    pub deep_downstream: bool,

    /// Skip documents that cannot be loaded instead of failing
    #[arg(long)]
    pub ignore_errors: bool,
}

impl CrawlFlags {
    pub fn apply(&self, base: &CrawlConfig) -> anyhow::Result<CrawlConfig> {
        let mut config = base.clone();
        if !self.predicates.is_empty() {
            config.predicates = PredicateSet::try_from(self.predicates.clone())?;
        }
        if self.no_upstream {
            config = config.with_direction(Direction::Upstream, false);
        }
        if self.no_downstream {
            config = config.with_direction(Direction::Downstream, false);
        }
        if self.deep || self.deep_upstream {
            config = config.with_shallow_direction(Direction::Upstream, false);
        }
        if self.deep || self.deep_downstream {
            config = config.with_shallow_direction(Direction::Downstream, false);
        }
        if self.ignore_errors {
            config = config.with_error_policy(ErrorPolicy::Ignore);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Read a query given inline or as `@path`
pub fn read_query(query: &str) -> anyhow::Result<String> {
    match query.strip_prefix('@') {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(query.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontocrawl_core::Node;

    #[test]
    fn test_flags_override_config() {
        let flags = CrawlFlags {
            predicates: vec!["http://example.org/partOf".to_string()],
            no_upstream: true,
            deep_downstream: true,
            ignore_errors: true,
            ..Default::default()
        };
        let config = flags.apply(&CrawlConfig::default()).unwrap();

        assert_eq!(config.predicates.len(), 1);
        assert!(config.predicates.contains(&Node::iri("http://example.org/partOf")));
        assert!(!config.is_enabled(Direction::Upstream));
        assert!(!config.is_shallow(Direction::Downstream));
        assert_eq!(config.error_policy, ErrorPolicy::Ignore);
    }

    #[test]
    fn test_relative_predicate_rejected() {
        let flags = CrawlFlags {
            predicates: vec!["subClassOf".to_string()],
            ..Default::default()
        };
        let err = flags.apply(&CrawlConfig::default()).unwrap_err();
        assert!(err.to_string().contains("not an absolute IRI"));
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let base = CrawlConfig::default().with_shallow(false);
        assert_eq!(CrawlFlags::default().apply(&base).unwrap(), base);
    }

    #[test]
    fn test_read_query_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seeds.rq");
        std::fs::write(&path, "SELECT ?c WHERE { ?c a ?t }").unwrap();

        let query = read_query(&format!("@{}", path.display())).unwrap();
        assert!(query.starts_with("SELECT"));
        assert_eq!(read_query("ASK {}").unwrap(), "ASK {}");
    }
}
