//! Node (term) types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A literal value with optional datatype or language tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    /// Lexical form
    pub value: String,

    /// Datatype IRI (None for plain and language-tagged literals)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,

    /// Language tag, lowercased
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Literal {
    pub fn simple(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: Some(language.into().to_ascii_lowercase()),
        }
    }
}

/// A graph node: an IRI, a blank node or a literal.
///
/// Nodes are immutable values; two nodes are equal when their identifiers are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Iri { value: String },
    Blank { id: String },
    Literal(Literal),
}

impl Node {
    pub fn iri(value: impl Into<String>) -> Self {
        Self::Iri {
            value: value.into(),
        }
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Self::Blank { id: id.into() }
    }

    pub fn literal(literal: Literal) -> Self {
        Self::Literal(literal)
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Self::Iri { .. })
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank { .. })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// The IRI string, if this node is an IRI
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri { value } => Some(value),
            _ => None,
        }
    }

    /// Identifier without term syntax: the IRI, the blank label or the lexical form
    pub fn value(&self) -> &str {
        match self {
            Self::Iri { value } => value,
            Self::Blank { id } => id,
            Self::Literal(lit) => &lit.value,
        }
    }

    /// Whether the node can appear in subject position
    pub fn is_resource(&self) -> bool {
        !self.is_literal()
    }
}

impl std::fmt::Display for Node {
    /// N-Triples term syntax
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iri { value } => write!(f, "<{}>", value),
            Self::Blank { id } => write!(f, "_:{}", id),
            Self::Literal(lit) => {
                write!(f, "\"{}\"", escape_literal(&lit.value))?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{}", lang)
                } else if let Some(dt) = &lit.datatype {
                    write!(f, "^^<{}>", dt)
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Deduplicated set of traversal roots
pub type SeedSet = BTreeSet<Node>;
