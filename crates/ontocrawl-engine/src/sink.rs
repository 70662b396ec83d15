//! Destinations for crawl results

use ontocrawl_core::{Graph, Result};
use std::collections::BTreeMap;

/// Receives result graphs keyed by context.
///
/// Serialization and storage are the sink's business; the engine only hands
/// graphs over.
pub trait ResultSink {
    fn accept(&mut self, key: &str, graph: &Graph) -> Result<()>;
}

/// Collects graphs in memory
impl ResultSink for BTreeMap<String, Graph> {
    fn accept(&mut self, key: &str, graph: &Graph) -> Result<()> {
        self.entry(key.to_string()).or_default().merge(graph);
        Ok(())
    }
}
