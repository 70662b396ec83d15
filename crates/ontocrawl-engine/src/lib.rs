//! Ontocrawl Engine - Property-path crawling over graph backends
//!
//! The [`Orchestrator`] composes the pieces of one crawl session: seeds are
//! resolved by the [`SeedResolver`], the import closure is pulled in by the
//! [`ImportResolver`] and the [`Crawler`] expands property paths from the
//! seeds. [`Orchestrator::crawl_contexts`] repeats this for every row of a
//! [`ContextTable`].

#![allow(clippy::result_large_err)]

pub mod context;
pub mod crawler;
pub mod imports;
pub mod orchestrator;
pub mod seeds;
pub mod sink;

pub use context::{ContextFailure, ContextReport, ContextRow, ContextTable, SkipReason};
pub use crawler::{CrawlOutcome, CrawlStats, Crawler};
pub use imports::{ImportClosure, ImportResolver};
pub use orchestrator::{CrawlOptions, GraphCrawl, Orchestrator};
pub use seeds::{SeedResolver, SeedSelector};
pub use sink::ResultSink;
