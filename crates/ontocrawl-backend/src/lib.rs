//! Ontocrawl Backend - Graph sources the crawler runs against
//!
//! A [`GraphBackend`] answers pattern and SPARQL queries over either an
//! in-memory graph ([`LocalBackend`]) or a remote SPARQL endpoint
//! ([`RemoteBackend`]); [`UnionBackend`] composes several of them.
//! Documents are fetched and parsed with an ordered format fallback by the
//! [`DocumentLoader`].

#![allow(clippy::result_large_err)]

pub mod cancel;
mod convert;
pub mod error;
pub mod format;
pub mod loader;
pub mod local;
pub mod remote;
pub mod source;
pub mod sparql;
pub mod traits;
pub mod union;

pub use cancel::CancelHandle;
pub use error::{BackendError, BackendResult};
pub use format::{DocumentFormat, FormatPolicy};
pub use loader::{DocumentLoader, LoadedDocument};
pub use local::LocalBackend;
pub use remote::{RemoteBackend, RemoteConfig};
pub use source::{DocumentSource, FetchedDocument, HttpDocumentSource, MemoryDocumentSource};
pub use traits::{BackendKind, GraphBackend};
pub use union::UnionBackend;
