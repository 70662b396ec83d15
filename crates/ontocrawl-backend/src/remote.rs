//! SPARQL endpoint backend

use crate::cancel::CancelHandle;
use crate::error::{BackendError, BackendResult};
use crate::sparql::{decode_ask, decode_select, render_select, RESULTS_JSON};
use crate::traits::{BackendKind, GraphBackend};
use async_trait::async_trait;
use ontocrawl_core::{Binding, PatternQuery, SelectResults};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Connection settings for a SPARQL endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Query URL of the endpoint
    pub endpoint: String,

    /// Credential attached to every request
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Name of the query parameter carrying the credential
    #[serde(default = "default_api_key_param")]
    pub api_key_param: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_key_param() -> String {
    "apikey".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl RemoteConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            api_key_param: default_api_key_param(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Backend that submits every query to a SPARQL endpoint.
///
/// Each request is bounded by the configured timeout and abandoned as soon
/// as the cancel handle fires.
pub struct RemoteBackend {
    client: Client,
    endpoint: Url,
    config: RemoteConfig,
    timeout: Duration,
    cancel: CancelHandle,
}

impl RemoteBackend {
    pub fn new(config: RemoteConfig) -> BackendResult<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            BackendError::Configuration(format!("Invalid endpoint {}: {}", config.endpoint, e))
        })?;
        let client = Client::builder()
            .user_agent(concat!("ontocrawl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            timeout: Duration::from_secs(config.timeout_secs),
            config,
            cancel: CancelHandle::new(),
        })
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn request_url(&self, sparql: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", sparql);
            if let Some(key) = &self.config.api_key {
                pairs.append_pair(&self.config.api_key_param, key);
            }
        }
        url
    }

    /// Send one query and return the raw response body
    async fn execute(&self, sparql: &str) -> BackendResult<Vec<u8>> {
        if self.cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        tracing::debug!("SPARQL {}: {}", self.endpoint, sparql);

        let request = async {
            let response = self
                .client
                .get(self.request_url(sparql))
                .header(ACCEPT, RESULTS_JSON)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(BackendError::Endpoint {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok(response.bytes().await?.to_vec())
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(BackendError::Cancelled),
            result = tokio::time::timeout(self.timeout, request) => {
                result.map_err(|_| BackendError::Timeout(self.timeout))?
            }
        }
    }
}

#[async_trait]
impl GraphBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn origin(&self) -> Option<&str> {
        Some(&self.config.endpoint)
    }

    fn supports_blank_anchors(&self) -> bool {
        false
    }

    async fn health_check(&self) -> BackendResult<bool> {
        self.ask("ASK {}").await.map(|_| true)
    }

    async fn query(&self, query: &PatternQuery) -> BackendResult<Vec<Binding>> {
        match render_select(query)? {
            Some(sparql) => Ok(self.select(&sparql).await?.rows),
            None => Ok(Vec::new()),
        }
    }

    async fn select(&self, sparql: &str) -> BackendResult<SelectResults> {
        let body = self.execute(sparql).await?;
        decode_select(&body)
    }

    async fn ask(&self, sparql: &str) -> BackendResult<bool> {
        let body = self.execute(sparql).await?;
        decode_ask(&body)
    }
}
