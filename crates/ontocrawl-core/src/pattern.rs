//! Pattern query types shared by every backend

use crate::config::PredicateSet;
use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One solution row: variable name to bound node
pub type Binding = BTreeMap<String, Node>;

/// A position in a triple pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternTerm {
    Bound(Node),
    Var(String),
}

impl PatternTerm {
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    pub fn as_bound(&self) -> Option<&Node> {
        match self {
            Self::Bound(node) => Some(node),
            Self::Var(_) => None,
        }
    }

    pub fn as_var(&self) -> Option<&str> {
        match self {
            Self::Var(name) => Some(name),
            Self::Bound(_) => None,
        }
    }
}

impl From<Node> for PatternTerm {
    fn from(node: Node) -> Self {
        Self::Bound(node)
    }
}

/// A triple whose positions are bound nodes or variables
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriplePattern {
    pub subject: PatternTerm,
    pub predicate: PatternTerm,
    pub object: PatternTerm,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<PatternTerm>,
        predicate: impl Into<PatternTerm>,
        object: impl Into<PatternTerm>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Variables in subject, predicate, object order, without repeats
    pub fn variables(&self) -> Vec<&str> {
        let mut vars: Vec<&str> = Vec::with_capacity(3);
        for term in [&self.subject, &self.predicate, &self.object] {
            if let Some(name) = term.as_var() {
                if !vars.contains(&name) {
                    vars.push(name);
                }
            }
        }
        vars
    }

    /// Bind the pattern against concrete terms; None if a bound position or a
    /// repeated variable disagrees.
    pub fn bind(&self, subject: &Node, predicate: &Node, object: &Node) -> Option<Binding> {
        let mut binding = Binding::new();
        for (term, value) in [
            (&self.subject, subject),
            (&self.predicate, predicate),
            (&self.object, object),
        ] {
            match term {
                PatternTerm::Bound(node) => {
                    if node != value {
                        return None;
                    }
                }
                PatternTerm::Var(name) => match binding.get(name) {
                    Some(existing) if existing != value => return None,
                    Some(_) => {}
                    None => {
                        binding.insert(name.clone(), value.clone());
                    }
                },
            }
        }
        Some(binding)
    }
}

/// A triple pattern plus an optional restriction on the predicate position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternQuery {
    pub pattern: TriplePattern,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicates: Option<PredicateSet>,
}

impl PatternQuery {
    pub fn new(pattern: TriplePattern) -> Self {
        Self {
            pattern,
            predicates: None,
        }
    }

    pub fn restricted_to(mut self, predicates: PredicateSet) -> Self {
        self.predicates = Some(predicates);
        self
    }

    /// Whether a predicate passes the restriction
    pub fn admits(&self, predicate: &Node) -> bool {
        self.predicates
            .as_ref()
            .map_or(true, |set| set.contains(predicate))
    }
}

/// Rows of a SELECT query with their projected variables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectResults {
    pub variables: Vec<String>,
    pub rows: Vec<Binding>,
}

impl SelectResults {
    pub fn new(variables: Vec<String>) -> Self {
        Self {
            variables,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
