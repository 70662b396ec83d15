//! Serialization formats and the fallback order used when loading documents

use oxigraph::io::RdfFormat;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// RDF serialization formats the loader can parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    RdfXml,
    Turtle,
    N3,
    NTriples,
    NQuads,
    TriG,
}

/// Formats tried, in order, before any guess from the locator
pub const DEFAULT_FALLBACK: [DocumentFormat; 5] = [
    DocumentFormat::RdfXml,
    DocumentFormat::Turtle,
    DocumentFormat::N3,
    DocumentFormat::NTriples,
    DocumentFormat::TriG,
];

impl DocumentFormat {
    pub fn name(self) -> &'static str {
        match self {
            Self::RdfXml => "rdfxml",
            Self::Turtle => "turtle",
            Self::N3 => "n3",
            Self::NTriples => "ntriples",
            Self::NQuads => "nquads",
            Self::TriG => "trig",
        }
    }

    pub fn rdf_format(self) -> RdfFormat {
        match self {
            Self::RdfXml => RdfFormat::RdfXml,
            Self::Turtle => RdfFormat::Turtle,
            Self::N3 => RdfFormat::N3,
            Self::NTriples => RdfFormat::NTriples,
            Self::NQuads => RdfFormat::NQuads,
            Self::TriG => RdfFormat::TriG,
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "rdf" | "owl" | "xml" | "rdfs" => Some(Self::RdfXml),
            "ttl" | "turtle" => Some(Self::Turtle),
            "n3" => Some(Self::N3),
            "nt" | "ntriples" => Some(Self::NTriples),
            "nq" | "nquads" => Some(Self::NQuads),
            "trig" => Some(Self::TriG),
            _ => None,
        }
    }

    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/rdf+xml" | "application/xml" | "text/xml" => Some(Self::RdfXml),
            "text/turtle" | "application/x-turtle" => Some(Self::Turtle),
            "text/n3" | "text/rdf+n3" => Some(Self::N3),
            "application/n-triples" => Some(Self::NTriples),
            "application/n-quads" => Some(Self::NQuads),
            "application/trig" => Some(Self::TriG),
            _ => None,
        }
    }

    /// Best-effort guess from the last path segment of a locator
    pub fn guess(locator: &str) -> Option<Self> {
        let path = locator.split(&['?', '#'][..]).next().unwrap_or(locator);
        let segment = path.rsplit(&['/', '\\'][..]).next().unwrap_or(path);
        let (_, extension) = segment.rsplit_once('.')?;
        Self::from_extension(extension)
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rdfxml" | "xml" => Ok(Self::RdfXml),
            "turtle" | "ttl" => Ok(Self::Turtle),
            "n3" => Ok(Self::N3),
            "ntriples" | "nt" => Ok(Self::NTriples),
            "nquads" | "nq" => Ok(Self::NQuads),
            "trig" => Ok(Self::TriG),
            other => Err(format!("Unknown format: {}", other)),
        }
    }
}

/// Which formats to try when loading a document, and in what order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatPolicy {
    /// Fixed priority list
    pub formats: Vec<DocumentFormat>,
    /// After the list, try formats suggested by the media type and the
    /// locator's extension
    pub guess: bool,
}

impl Default for FormatPolicy {
    fn default() -> Self {
        Self {
            formats: DEFAULT_FALLBACK.to_vec(),
            guess: true,
        }
    }
}

impl FormatPolicy {
    pub fn new(formats: Vec<DocumentFormat>) -> Self {
        Self {
            formats,
            guess: true,
        }
    }

    pub fn without_guess(mut self) -> Self {
        self.guess = false;
        self
    }

    /// The complete attempt order for one document, without repeats
    pub fn attempt_order(&self, locator: &str, media_type: Option<&str>) -> Vec<DocumentFormat> {
        let mut order: Vec<DocumentFormat> = Vec::with_capacity(self.formats.len() + 2);
        for format in &self.formats {
            if !order.contains(format) {
                order.push(*format);
            }
        }
        if self.guess {
            let guesses = [
                media_type.and_then(DocumentFormat::from_media_type),
                DocumentFormat::guess(locator),
            ];
            for format in guesses.into_iter().flatten() {
                if !order.contains(&format) {
                    order.push(format);
                }
            }
        }
        order
    }
}
