//! Crawl configuration types

use crate::error::{Error, Result};
use crate::node::Node;
use crate::vocab::{owl, rdf, rdfs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Direction of expansion relative to a seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Follow edges pointing into the node: `(?x, p, node)`
    Upstream,
    /// Follow edges pointing out of the node: `(node, p, ?x)`
    Downstream,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Upstream, Direction::Downstream];
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upstream => write!(f, "upstream"),
            Self::Downstream => write!(f, "downstream"),
        }
    }
}

/// What to do when a document cannot be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Abort the whole resolution with a parse error
    #[default]
    FailFast,
    /// Log, contribute no triples, continue with siblings
    Ignore,
}

/// The predicates a crawl may traverse.
///
/// Membership is exact IRI match; order is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PredicateSet(BTreeSet<Node>);

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_iris<I, S>(iris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(iris.into_iter().map(Node::iri).collect())
    }

    pub fn insert(&mut self, predicate: Node) -> bool {
        self.0.insert(predicate)
    }

    pub fn contains(&self, predicate: &Node) -> bool {
        self.0.contains(predicate)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.0.iter()
    }
}

impl TryFrom<Vec<String>> for PredicateSet {
    type Error = Error;

    fn try_from(iris: Vec<String>) -> Result<Self> {
        if let Some(bad) = iris.iter().find(|iri| !looks_like_iri(iri)) {
            return Err(Error::Configuration(format!(
                "Predicate is not an absolute IRI: {}",
                bad
            )));
        }
        Ok(Self::from_iris(iris))
    }
}

impl From<PredicateSet> for Vec<String> {
    fn from(set: PredicateSet) -> Self {
        set.0.into_iter().map(|p| p.value().to_string()).collect()
    }
}

impl FromIterator<Node> for PredicateSet {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn looks_like_iri(value: &str) -> bool {
    match value.split_once(':') {
        Some((scheme, rest)) => {
            !scheme.is_empty()
                && !rest.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// `rdf:type`, `rdfs:subClassOf` and `owl:equivalentClass`
pub fn default_predicates() -> PredicateSet {
    PredicateSet::from_iris([rdf::TYPE, rdfs::SUB_CLASS_OF, owl::EQUIVALENT_CLASS])
}

/// Settings for one crawl invocation.
///
/// A shallow direction expands exactly one hop from each seed; a deep one
/// recurses until no unseen node is discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub predicates: PredicateSet,
    pub upstream: bool,
    pub downstream: bool,
    pub upstream_shallow: bool,
    pub downstream_shallow: bool,
    pub error_policy: ErrorPolicy,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            predicates: default_predicates(),
            upstream: true,
            downstream: true,
            upstream_shallow: true,
            downstream_shallow: true,
            error_policy: ErrorPolicy::default(),
        }
    }
}

impl CrawlConfig {
    pub fn new(predicates: PredicateSet) -> Self {
        Self {
            predicates,
            ..Default::default()
        }
    }

    /// Enable or disable a direction
    pub fn with_direction(mut self, direction: Direction, enabled: bool) -> Self {
        match direction {
            Direction::Upstream => self.upstream = enabled,
            Direction::Downstream => self.downstream = enabled,
        }
        self
    }

    /// Set shallow expansion for one direction
    pub fn with_shallow_direction(mut self, direction: Direction, shallow: bool) -> Self {
        match direction {
            Direction::Upstream => self.upstream_shallow = shallow,
            Direction::Downstream => self.downstream_shallow = shallow,
        }
        self
    }

    /// Set shallow expansion for both directions at once
    pub fn with_shallow(self, shallow: bool) -> Self {
        self.with_shallow_direction(Direction::Upstream, shallow)
            .with_shallow_direction(Direction::Downstream, shallow)
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn is_enabled(&self, direction: Direction) -> bool {
        match direction {
            Direction::Upstream => self.upstream,
            Direction::Downstream => self.downstream,
        }
    }

    pub fn is_shallow(&self, direction: Direction) -> bool {
        match direction {
            Direction::Upstream => self.upstream_shallow,
            Direction::Downstream => self.downstream_shallow,
        }
    }

    /// Directions this configuration expands, upstream first
    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.is_enabled(*d))
    }

    pub fn validate(&self) -> Result<()> {
        if self.predicates.is_empty() {
            return Err(Error::Configuration(
                "Predicate set must not be empty".to_string(),
            ));
        }
        if !self.upstream && !self.downstream {
            tracing::warn!("Both crawl directions are disabled; result will be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CrawlConfig::default();
        assert_eq!(config.predicates.len(), 3);
        assert!(config.predicates.contains(&Node::iri(rdfs::SUB_CLASS_OF)));
        assert!(config.upstream && config.downstream);
        assert!(config.upstream_shallow && config.downstream_shallow);
        assert_eq!(config.error_policy, ErrorPolicy::FailFast);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shallow_overrides_both_directions() {
        let config = CrawlConfig::default().with_shallow(false);
        assert!(!config.is_shallow(Direction::Upstream));
        assert!(!config.is_shallow(Direction::Downstream));

        let config = config.with_shallow_direction(Direction::Downstream, true);
        assert!(config.is_shallow(Direction::Downstream));
        assert!(!config.is_shallow(Direction::Upstream));
    }

    #[test]
    fn test_directions_iteration() {
        let config = CrawlConfig::default().with_direction(Direction::Upstream, false);
        let dirs: Vec<_> = config.directions().collect();
        assert_eq!(dirs, vec![Direction::Downstream]);
    }

    #[test]
    fn test_empty_predicates_rejected() {
        let config = CrawlConfig::new(PredicateSet::new());
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_predicate_set_deserialize() {
        let set: PredicateSet =
            serde_json::from_str(r#"["http://example.org/p", "http://example.org/q"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Node::iri("http://example.org/p")));

        let bad = serde_json::from_str::<PredicateSet>(r#"["subClassOf"]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_config_deserialize_with_defaults() {
        let config: CrawlConfig = serde_json::from_str(
            r#"{"downstream_shallow": false, "error_policy": "ignore"}"#,
        )
        .unwrap();
        assert!(!config.downstream_shallow);
        assert!(config.upstream_shallow);
        assert_eq!(config.error_policy, ErrorPolicy::Ignore);
        assert_eq!(config.predicates, default_predicates());
    }
}
