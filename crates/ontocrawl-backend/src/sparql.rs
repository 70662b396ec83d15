//! SPARQL text rendering and the W3C SPARQL 1.1 JSON results codec

use crate::error::{BackendError, BackendResult};
use ontocrawl_core::vocab::xsd;
use ontocrawl_core::{Binding, Literal, Node, PatternQuery, PatternTerm, SelectResults};
use serde::Deserialize;
use std::collections::HashMap;

/// Media type requested from endpoints
pub const RESULTS_JSON: &str = "application/sparql-results+json";

/// Render a pattern query as a SPARQL SELECT.
///
/// Returns `None` when the predicate position is bound to a predicate the
/// restriction does not admit: such a query has no solutions and need not
/// be sent.
pub fn render_select(query: &PatternQuery) -> BackendResult<Option<String>> {
    let pattern = &query.pattern;
    if let Some(predicate) = pattern.predicate.as_bound() {
        if !query.admits(predicate) {
            return Ok(None);
        }
    }

    let variables = pattern.variables();
    for name in &variables {
        if !is_valid_variable(name) {
            return Err(BackendError::InvalidQuery(format!(
                "Invalid variable name: {}",
                name
            )));
        }
    }

    let projection = if variables.is_empty() {
        "*".to_string()
    } else {
        variables
            .iter()
            .map(|v| format!("?{}", v))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut sparql = format!(
        "SELECT DISTINCT {} WHERE {{ {} {} {} .",
        projection,
        render_term(&pattern.subject)?,
        render_term(&pattern.predicate)?,
        render_term(&pattern.object)?,
    );

    if let (Some(var), Some(predicates)) = (pattern.predicate.as_var(), &query.predicates) {
        let members = predicates
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        sparql.push_str(&format!(" FILTER(?{} IN ({}))", var, members));
    }
    sparql.push_str(" }");

    Ok(Some(sparql))
}

fn render_term(term: &PatternTerm) -> BackendResult<String> {
    match term {
        PatternTerm::Var(name) => Ok(format!("?{}", name)),
        PatternTerm::Bound(Node::Blank { id }) => Err(BackendError::InvalidQuery(format!(
            "Blank node _:{} cannot be used as a bound term in a remote query",
            id
        ))),
        // N-Triples term syntax is valid SPARQL
        PatternTerm::Bound(node) => Ok(node.to_string()),
    }
}

fn is_valid_variable(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON results format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ResultsDocument {
    #[serde(default)]
    head: Head,
    results: Option<ResultsBody>,
    boolean: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct Head {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ResultsBody {
    bindings: Vec<HashMap<String, JsonTerm>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum JsonTerm {
    Uri {
        value: String,
    },
    Literal {
        value: String,
        #[serde(rename = "xml:lang")]
        lang: Option<String>,
        datatype: Option<String>,
    },
    /// SPARQL 1.0 servers (Virtuoso among them) still emit this
    TypedLiteral {
        value: String,
        datatype: String,
    },
    Bnode {
        value: String,
    },
}

impl From<JsonTerm> for Node {
    fn from(term: JsonTerm) -> Self {
        match term {
            JsonTerm::Uri { value } => Node::iri(value),
            JsonTerm::Bnode { value } => Node::blank(value),
            JsonTerm::Literal {
                value,
                lang: Some(lang),
                ..
            } => Node::literal(Literal::tagged(value, lang)),
            JsonTerm::Literal {
                value,
                datatype: Some(datatype),
                ..
            }
            | JsonTerm::TypedLiteral { value, datatype } => {
                if datatype == xsd::STRING {
                    Node::literal(Literal::simple(value))
                } else {
                    Node::literal(Literal::typed(value, datatype))
                }
            }
            JsonTerm::Literal { value, .. } => Node::literal(Literal::simple(value)),
        }
    }
}

/// Decode a SELECT response body
pub fn decode_select(body: &[u8]) -> BackendResult<SelectResults> {
    let document: ResultsDocument = serde_json::from_slice(body)?;
    let body = document.results.ok_or_else(|| {
        BackendError::UnexpectedResults("expected SELECT bindings in response".to_string())
    })?;

    let mut results = SelectResults::new(document.head.vars);
    for row in body.bindings {
        let binding: Binding = row
            .into_iter()
            .map(|(name, term)| (name, Node::from(term)))
            .collect();
        results.rows.push(binding);
    }
    Ok(results)
}

/// Decode an ASK response body
pub fn decode_ask(body: &[u8]) -> BackendResult<bool> {
    let document: ResultsDocument = serde_json::from_slice(body)?;
    document.boolean.ok_or_else(|| {
        BackendError::UnexpectedResults("expected a boolean in ASK response".to_string())
    })
}
