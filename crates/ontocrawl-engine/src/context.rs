//! Context tables and per-context crawl reports

use crate::crawler::CrawlStats;
use crate::sink::ResultSink;
use ontocrawl_core::{Error, Graph, LoadFailure, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Placeholder replaced by a row's prefix in a seed query template
pub const DEFAULT_PLACEHOLDER: &str = "%PREFIX%";

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

/// One context: a namespace prefix and the document to crawl for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRow {
    pub key: String,
    pub prefix: String,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Document IRI or path; rows without one are skipped
    #[serde(default)]
    pub locator: String,
}

impl ContextRow {
    pub fn new(
        key: impl Into<String>,
        prefix: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            prefix: prefix.into(),
            placeholder: default_placeholder(),
            locator: locator.into(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Substitute this row's prefix into a seed query template
    pub fn seed_query(&self, template: &str) -> Result<String> {
        if self.placeholder.is_empty() || !template.contains(&self.placeholder) {
            return Err(Error::Configuration(format!(
                "Seed query template has no '{}' placeholder for context {}",
                self.placeholder, self.key
            )));
        }
        Ok(template.replace(&self.placeholder, &self.prefix))
    }
}

/// Ordered list of context rows with unique keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ContextRow>", into = "Vec<ContextRow>")]
pub struct ContextTable {
    rows: Vec<ContextRow>,
}

impl ContextTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ContextRow) -> Result<()> {
        if self.rows.iter().any(|r| r.key == row.key) {
            return Err(Error::Configuration(format!(
                "Duplicate context key: {}",
                row.key
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContextRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TryFrom<Vec<ContextRow>> for ContextTable {
    type Error = Error;

    fn try_from(rows: Vec<ContextRow>) -> Result<Self> {
        let mut keys = HashSet::new();
        if let Some(dup) = rows.iter().find(|r| !keys.insert(r.key.as_str())) {
            return Err(Error::Configuration(format!(
                "Duplicate context key: {}",
                dup.key
            )));
        }
        Ok(Self { rows })
    }
}

impl From<ContextTable> for Vec<ContextRow> {
    fn from(table: ContextTable) -> Self {
        table.rows
    }
}

/// Why a context row was not crawled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    EmptyLocator,
    /// The locator is the document the seeds come from
    SeedOrigin,
    /// The seed graph declares the locator as one of its own ontologies
    SeedOntology,
}

/// A context whose document could not be loaded under the Ignore policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFailure {
    pub key: String,
    pub failure: LoadFailure,
}

/// Outcome of crawling a context table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextReport {
    #[serde(skip)]
    pub graphs: BTreeMap<String, Graph>,
    pub stats: BTreeMap<String, CrawlStats>,
    pub skipped: Vec<(String, SkipReason)>,
    pub failures: Vec<ContextFailure>,
}

impl ContextReport {
    pub fn graph(&self, key: &str) -> Option<&Graph> {
        self.graphs.get(key)
    }

    /// Hand every produced graph to a sink, in key order
    pub fn deliver(&self, sink: &mut dyn ResultSink) -> Result<()> {
        for (key, graph) in &self.graphs {
            sink.accept(key, graph)?;
        }
        Ok(())
    }
}
