//! CLI configuration file

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use ontocrawl_backend::{DocumentFormat, FormatPolicy, RemoteConfig};
use ontocrawl_core::CrawlConfig;
use ontocrawl_engine::ContextTable;

/// Default location of the config file
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ontocrawl")
        .join("config.toml")
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub loader: LoaderSettings,
    pub remote: RemoteSettings,
    pub contexts: ContextTable,
}

/// Document fetching and format fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    pub formats: Vec<DocumentFormat>,
    pub guess: bool,
    pub timeout_secs: u64,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        let policy = FormatPolicy::default();
        Self {
            formats: policy.formats,
            guess: policy.guess,
            timeout_secs: 60,
        }
    }
}

impl LoaderSettings {
    pub fn policy(&self) -> FormatPolicy {
        FormatPolicy {
            formats: self.formats.clone(),
            guess: self.guess,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// SPARQL endpoint settings; the key itself never lives in the file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub endpoint: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    pub api_key_param: String,
    pub timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        let defaults = RemoteConfig::new("");
        Self {
            endpoint: None,
            api_key_env: None,
            api_key_param: defaults.api_key_param,
            timeout_secs: defaults.timeout_secs,
        }
    }
}

impl RemoteSettings {
    /// Connection settings for `endpoint`, or the configured one
    pub fn connect(&self, endpoint: Option<&str>) -> anyhow::Result<RemoteConfig> {
        let endpoint = endpoint
            .or(self.endpoint.as_deref())
            .context("No SPARQL endpoint given and none configured in [remote]")?;

        let mut config = RemoteConfig::new(endpoint);
        config.api_key_param = self.api_key_param.clone();
        config.timeout_secs = self.timeout_secs;

        if let Some(var) = &self.api_key_env {
            let key = std::env::var(var).map_err(|_| {
                anyhow::anyhow!("Environment variable {} not set for the endpoint API key", var)
            })?;
            config = config.with_api_key(key);
        }
        Ok(config)
    }
}

impl Config {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.crawl.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontocrawl_core::{ErrorPolicy, Node};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.crawl, CrawlConfig::default());
        assert!(config.contexts.is_empty());
        assert_eq!(config.remote.api_key_param, "apikey");
    }

    #[test]
    fn test_parse_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[crawl]
predicates = ["http://www.w3.org/2000/01/rdf-schema#subClassOf"]
downstream_shallow = false
error_policy = "ignore"

[loader]
formats = ["turtle", "ntriples"]
guess = false

[remote]
endpoint = "http://sparql.example.org/sparql"
api_key_env = "ONTOCRAWL_TEST_UNSET_KEY"

[[contexts]]
key = "chebi"
prefix = "http://purl.obolibrary.org/obo/CHEBI_"
locator = "http://purl.obolibrary.org/obo/chebi.owl"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.crawl.predicates.len(), 1);
        assert!(config
            .crawl
            .predicates
            .contains(&Node::iri("http://www.w3.org/2000/01/rdf-schema#subClassOf")));
        assert!(!config.crawl.downstream_shallow);
        assert!(config.crawl.upstream_shallow);
        assert_eq!(config.crawl.error_policy, ErrorPolicy::Ignore);
        assert_eq!(
            config.loader.policy(),
            FormatPolicy::new(vec![DocumentFormat::Turtle, DocumentFormat::NTriples]).without_guess()
        );
        assert_eq!(config.contexts.len(), 1);

        // The named variable is not set, so connecting must fail
        assert!(config.remote.connect(None).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.remote.endpoint = Some("http://sparql.example.org/sparql".to_string());
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.remote.endpoint, config.remote.endpoint);
        assert_eq!(reloaded.crawl, config.crawl);
    }

    #[test]
    fn test_endpoint_flag_overrides_file() {
        let mut settings = RemoteSettings::default();
        settings.endpoint = Some("http://configured.example.org/sparql".to_string());
        let remote = settings
            .connect(Some("http://flag.example.org/sparql"))
            .unwrap();
        assert_eq!(remote.endpoint, "http://flag.example.org/sparql");
        assert!(remote.api_key.is_none());

        assert!(RemoteSettings::default().connect(None).is_err());
    }
}
