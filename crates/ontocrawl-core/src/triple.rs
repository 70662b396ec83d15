//! Triple (edge) type

use crate::node::Node;
use serde::{Deserialize, Serialize};

/// An immutable (subject, predicate, object) fact
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Node,
    pub predicate: Node,
    pub object: Node,
}

impl Triple {
    pub fn new(subject: Node, predicate: Node, object: Node) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Shorthand for a triple whose three terms are IRIs
    pub fn iris(subject: &str, predicate: &str, object: &str) -> Self {
        Self::new(Node::iri(subject), Node::iri(predicate), Node::iri(object))
    }
}

impl std::fmt::Display for Triple {
    /// One N-Triples statement, without trailing newline
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_display() {
        let triple = Triple::iris(
            "http://example.org/A",
            "http://www.w3.org/2000/01/rdf-schema#subClassOf",
            "http://example.org/B",
        );
        assert_eq!(
            triple.to_string(),
            "<http://example.org/A> <http://www.w3.org/2000/01/rdf-schema#subClassOf> <http://example.org/B> ."
        );
    }
}
