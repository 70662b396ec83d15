//! Conversions between ontocrawl nodes and oxigraph terms

use crate::error::{BackendError, BackendResult};
use ontocrawl_core::vocab::xsd;
use ontocrawl_core::{Literal, Node, Triple};
use oxigraph::model::{
    BlankNode, GraphName, Literal as OxLiteral, NamedNode, Quad, Subject, Term,
};

const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

pub(crate) fn node_from_term(term: &Term) -> Node {
    match term {
        Term::NamedNode(n) => Node::iri(n.as_str()),
        Term::BlankNode(b) => Node::blank(b.as_str()),
        Term::Literal(l) => Node::Literal(literal_from(l)),
        // Quoted triples are kept by their textual form
        #[allow(unreachable_patterns)]
        other => Node::literal(Literal::simple(other.to_string())),
    }
}

fn literal_from(literal: &OxLiteral) -> Literal {
    if let Some(lang) = literal.language() {
        return Literal::tagged(literal.value(), lang);
    }
    let datatype = literal.datatype().as_str();
    if datatype == xsd::STRING || datatype == RDF_LANG_STRING {
        Literal::simple(literal.value())
    } else {
        Literal::typed(literal.value(), datatype)
    }
}

/// A parsed quad as a triple; the graph name is dropped
pub(crate) fn triple_from_quad(quad: &Quad) -> Triple {
    Triple::new(
        node_from_term(&Term::from(quad.subject.clone())),
        Node::iri(quad.predicate.as_str()),
        node_from_term(&quad.object),
    )
}

fn named_node(iri: &str) -> BackendResult<NamedNode> {
    NamedNode::new(iri).map_err(|e| BackendError::InvalidTerm(format!("<{}>: {}", iri, e)))
}

pub(crate) fn term_from_node(node: &Node) -> BackendResult<Term> {
    Ok(match node {
        Node::Iri { value } => named_node(value)?.into(),
        Node::Blank { id } => BlankNode::new(id)
            .map_err(|e| BackendError::InvalidTerm(format!("_:{}: {}", id, e)))?
            .into(),
        Node::Literal(lit) => {
            let literal = match (&lit.language, &lit.datatype) {
                (Some(lang), _) => OxLiteral::new_language_tagged_literal(&lit.value, lang)
                    .map_err(|e| BackendError::InvalidTerm(format!("@{}: {}", lang, e)))?,
                (None, Some(dt)) => OxLiteral::new_typed_literal(&lit.value, named_node(dt)?),
                (None, None) => OxLiteral::new_simple_literal(&lit.value),
            };
            literal.into()
        }
    })
}

/// A triple as a default-graph quad, or None if it has a literal subject or
/// a non-IRI predicate
pub(crate) fn quad_from_triple(triple: &Triple) -> BackendResult<Option<Quad>> {
    let subject: Subject = match &triple.subject {
        Node::Iri { value } => named_node(value)?.into(),
        Node::Blank { id } => BlankNode::new(id)
            .map_err(|e| BackendError::InvalidTerm(format!("_:{}: {}", id, e)))?
            .into(),
        Node::Literal(_) => return Ok(None),
    };
    let predicate = match triple.predicate.as_iri() {
        Some(iri) => named_node(iri)?,
        None => return Ok(None),
    };
    let object = term_from_node(&triple.object)?;
    Ok(Some(Quad::new(
        subject,
        predicate,
        object,
        GraphName::DefaultGraph,
    )))
}
