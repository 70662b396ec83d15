//! In-memory triple store

use crate::config::PredicateSet;
use crate::node::Node;
use crate::pattern::{Binding, PatternQuery, TriplePattern};
use crate::triple::Triple;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Bound;

/// A set of triples.
///
/// Duplicate triples collapse, so union is associative and commutative. Two
/// graphs are equal when their triple sets are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Triple>", into = "Vec<Triple>")]
pub struct Graph {
    /// Triples in (subject, predicate, object) order
    spo: BTreeSet<Triple>,
    /// The same triples stored as (object, predicate, subject)
    ops: BTreeSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a triple; returns false if it was already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.spo.contains(&triple) {
            return false;
        }
        self.ops.insert(reversed(&triple));
        self.spo.insert(triple)
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.spo.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.spo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spo.is_empty()
    }

    /// Iterate triples in subject, predicate, object order
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.spo.iter()
    }

    /// Merge another graph into this one
    pub fn merge(&mut self, other: &Graph) {
        for triple in other.iter() {
            self.insert(triple.clone());
        }
    }

    /// Merge two graphs into a new one, leaving both inputs untouched
    pub fn union(&self, other: &Graph) -> Graph {
        let (mut base, extra) = if self.len() >= other.len() {
            (self.clone(), other)
        } else {
            (other.clone(), self)
        };
        base.merge(extra);
        base
    }

    /// Triples matching a pattern, optionally restricted to a predicate set.
    ///
    /// Subject- or object-anchored patterns use the ordered indexes; other
    /// patterns scan the whole graph.
    pub fn matching<'a>(
        &'a self,
        pattern: &'a TriplePattern,
        predicates: Option<&'a PredicateSet>,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        let candidates: Box<dyn Iterator<Item = &'a Triple> + 'a> =
            match (pattern.subject.as_bound(), pattern.object.as_bound()) {
                (Some(subject), _) => Box::new(anchored(&self.spo, subject)),
                (None, Some(object)) => Box::new(
                    anchored(&self.ops, object).filter_map(move |rev| self.spo.get(&reversed(rev))),
                ),
                (None, None) => Box::new(self.spo.iter()),
            };

        candidates.filter(move |t| {
            predicates.map_or(true, |set| set.contains(&t.predicate))
                && pattern.bind(&t.subject, &t.predicate, &t.object).is_some()
        })
    }

    /// Evaluate a pattern query into variable bindings
    pub fn evaluate(&self, query: &PatternQuery) -> Vec<Binding> {
        let mut seen = BTreeSet::new();
        self.matching(&query.pattern, query.predicates.as_ref())
            .filter_map(|t| query.pattern.bind(&t.subject, &t.predicate, &t.object))
            .filter(|b| seen.insert(b.clone()))
            .collect()
    }

    /// Subjects `s` with `(s, predicate, object)` in the graph
    pub fn subjects_with(&self, predicate: &Node, object: &Node) -> Vec<&Node> {
        anchored(&self.ops, object)
            .filter(|rev| &rev.predicate == predicate)
            .map(|rev| &rev.object)
            .collect()
    }

    /// Objects `o` with `(subject, predicate, o)` in the graph
    pub fn objects_of(&self, subject: &Node, predicate: &Node) -> Vec<&Node> {
        anchored(&self.spo, subject)
            .filter(|t| &t.predicate == predicate)
            .map(|t| &t.object)
            .collect()
    }

    /// Serialize as N-Triples, one statement per line
    pub fn to_ntriples(&self) -> String {
        let mut out = String::new();
        for triple in self.iter() {
            out.push_str(&triple.to_string());
            out.push('\n');
        }
        out
    }
}

/// Smallest possible node, used as a lower range bound
fn min_node() -> Node {
    Node::iri("")
}

fn reversed(triple: &Triple) -> Triple {
    Triple::new(
        triple.object.clone(),
        triple.predicate.clone(),
        triple.subject.clone(),
    )
}

/// Triples of an index whose first position equals `head`
fn anchored<'a>(index: &'a BTreeSet<Triple>, head: &Node) -> impl Iterator<Item = &'a Triple> {
    let head = head.clone();
    let start = Triple::new(head.clone(), min_node(), min_node());
    index
        .range((Bound::Included(start), Bound::Unbounded))
        .take_while(move |t| t.subject == head)
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.spo == other.spo
    }
}

impl Eq for Graph {}

impl Extend<Triple> for Graph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}

impl From<Vec<Triple>> for Graph {
    fn from(triples: Vec<Triple>) -> Self {
        triples.into_iter().collect()
    }
}

impl From<Graph> for Vec<Triple> {
    fn from(graph: Graph) -> Self {
        graph.spo.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::collections::btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.spo.iter()
    }
}
