//! Document sources: where the loader gets raw bytes from

use crate::error::{BackendError, BackendResult};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

/// Media types sent when fetching documents over HTTP
const RDF_ACCEPT: &str = "application/rdf+xml, text/turtle;q=0.9, application/n-triples;q=0.8, \
                          text/n3;q=0.7, application/trig;q=0.6, */*;q=0.1";

/// Raw bytes of a document plus what is known about them
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Locator as requested
    pub locator: String,
    /// IRI relative references resolve against
    pub base_iri: Option<String>,
    /// Content type reported by the server
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Trait for document source implementations
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the raw bytes behind a locator (IRI or filesystem path)
    async fn fetch(&self, locator: &str) -> BackendResult<FetchedDocument>;
}

/// Fetches `http(s)` IRIs with reqwest and `file` IRIs or plain paths from disk
pub struct HttpDocumentSource {
    client: Client,
}

impl HttpDocumentSource {
    pub fn new(timeout: Duration) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ontocrawl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    async fn fetch_http(&self, locator: &str, url: Url) -> BackendResult<FetchedDocument> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, RDF_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Endpoint {
                status: status.as_u16(),
                body: format!("GET {}", locator),
            });
        }

        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        // Redirects (e.g. purl.obolibrary.org) change the base IRI
        let base_iri = response.url().to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(FetchedDocument {
            locator: locator.to_string(),
            base_iri: Some(base_iri),
            media_type,
            bytes,
        })
    }

    async fn fetch_file(&self, locator: &str, path: &Path) -> BackendResult<FetchedDocument> {
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BackendError::NotFound(path.display().to_string()),
            _ => BackendError::Io(e),
        })?;
        let base_iri = tokio::fs::canonicalize(path)
            .await
            .ok()
            .and_then(|abs| Url::from_file_path(abs).ok())
            .map(|url| url.to_string());

        Ok(FetchedDocument {
            locator: locator.to_string(),
            base_iri,
            media_type: None,
            bytes,
        })
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, locator: &str) -> BackendResult<FetchedDocument> {
        tracing::debug!("Fetching document: {}", locator);
        match Url::parse(locator) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                self.fetch_http(locator, url).await
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|_| {
                    BackendError::Configuration(format!("Invalid file IRI: {}", locator))
                })?;
                self.fetch_file(locator, &path).await
            }
            // Single-letter schemes are Windows drive letters
            Ok(url) if url.scheme().len() > 1 => Err(BackendError::Configuration(format!(
                "Unsupported locator scheme '{}': {}",
                url.scheme(),
                locator
            ))),
            _ => self.fetch_file(locator, Path::new(locator)).await,
        }
    }
}

/// In-memory document source
///
/// Useful for testing and for documents assembled by the caller.
pub struct MemoryDocumentSource {
    documents: RwLock<HashMap<String, (Option<String>, Vec<u8>)>>,
}

impl MemoryDocumentSource {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, locator: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.insert_with_media_type(locator, None, bytes);
    }

    pub fn insert_with_media_type(
        &self,
        locator: impl Into<String>,
        media_type: Option<&str>,
        bytes: impl Into<Vec<u8>>,
    ) {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(
                locator.into(),
                (media_type.map(str::to_string), bytes.into()),
            );
        }
    }
}

impl Default for MemoryDocumentSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentSource for MemoryDocumentSource {
    async fn fetch(&self, locator: &str) -> BackendResult<FetchedDocument> {
        let documents = self
            .documents
            .read()
            .map_err(|e| BackendError::Store(format!("Lock error: {}", e)))?;
        let (media_type, bytes) = documents
            .get(locator)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(locator.to_string()))?;

        Ok(FetchedDocument {
            locator: locator.to_string(),
            base_iri: Url::parse(locator).ok().map(|u| u.to_string()),
            media_type,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemoryDocumentSource::new();
        source.insert("http://example.org/a.ttl", "<a:x> <a:p> <a:y> .");

        let doc = source.fetch("http://example.org/a.ttl").await.unwrap();
        assert_eq!(doc.base_iri.as_deref(), Some("http://example.org/a.ttl"));
        assert!(!doc.bytes.is_empty());

        let missing = source.fetch("http://example.org/missing").await;
        assert!(matches!(missing, Err(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_file_source_reads_paths_and_file_iris() {
        let mut file = tempfile::Builder::new().suffix(".nt").tempfile().unwrap();
        writeln!(file, "<http://example.org/A> <http://example.org/p> <http://example.org/B> .")
            .unwrap();

        let source = HttpDocumentSource::new(Duration::from_secs(5)).unwrap();
        let locator = file.path().to_str().unwrap().to_string();
        let doc = source.fetch(&locator).await.unwrap();
        assert!(doc.base_iri.unwrap().starts_with("file://"));

        let iri = Url::from_file_path(file.path()).unwrap().to_string();
        let doc = source.fetch(&iri).await.unwrap();
        assert!(String::from_utf8(doc.bytes).unwrap().contains("example.org/A"));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nothing.owl");
        let source = HttpDocumentSource::new(Duration::from_secs(5)).unwrap();
        let result = source.fetch(missing.to_str().unwrap()).await;
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_http_source_reports_media_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/onto.ttl"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/turtle")
                    .set_body_string("<http://example.org/A> <http://example.org/p> <http://example.org/B> ."),
            )
            .mount(&server)
            .await;

        let source = HttpDocumentSource::new(Duration::from_secs(5)).unwrap();
        let locator = format!("{}/onto.ttl", server.uri());
        let doc = source.fetch(&locator).await.unwrap();
        assert_eq!(doc.media_type.as_deref(), Some("text/turtle"));

        let missing = source.fetch(&format!("{}/missing.owl", server.uri())).await;
        assert!(matches!(missing, Err(BackendError::Endpoint { status: 404, .. })));
    }
}
