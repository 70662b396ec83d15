//! Ontocrawl Core - Graph model for property-path crawling
//!
//! This crate provides the triple store, the node and pattern types shared by
//! every backend, the crawl configuration and the error taxonomy.

pub mod config;
pub mod error;
pub mod graph;
pub mod node;
pub mod pattern;
pub mod triple;
pub mod vocab;

pub use config::{CrawlConfig, Direction, ErrorPolicy, PredicateSet};
pub use error::{Error, FormatAttempt, LoadFailure, Result};
pub use graph::Graph;
pub use node::{Literal, Node, SeedSet};
pub use pattern::{Binding, PatternQuery, PatternTerm, SelectResults, TriplePattern};
pub use triple::Triple;
