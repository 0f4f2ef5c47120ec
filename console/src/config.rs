//! Console configuration.
//!
//! Read from an optional YAML file, then overridden from the environment.
//! Missing keys fall back to defaults, so an empty file is a valid config.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::io::{GraphQLClient, TransportError};

pub const ENV_API_ENDPOINT: &str = "CONSOLE_API_ENDPOINT";
pub const ENV_AUTH_TOKEN: &str = "CONSOLE_AUTH_TOKEN";
pub const ENV_LOG: &str = "CONSOLE_LOG";

pub const DEFAULT_API_ENDPOINT: &str = "https://api.graph.cool/system";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid api endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("request timeout must be at least one second")]
    InvalidTimeout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub api_endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
    /// `env_logger` filter directives, e.g. `info` or `graph_console=debug`
    pub log_filter: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            auth_token: None,
            request_timeout_secs: 30,
            log_filter: "info".to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Load from `path` (defaults when `None`), apply the process environment
    /// and validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("📄 Loaded console config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(endpoint) = lookup(ENV_API_ENDPOINT) {
            debug!("api_endpoint overridden by {}", ENV_API_ENDPOINT);
            self.api_endpoint = endpoint;
        }
        if let Some(token) = lookup(ENV_AUTH_TOKEN) {
            debug!("auth_token overridden by {}", ENV_AUTH_TOKEN);
            self.auth_token = Some(token);
        }
        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_url()?;
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            endpoint: self.api_endpoint.clone(),
            reason,
        };
        let url = Url::parse(&self.api_endpoint).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme {}", other))),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configuration as YAML with the auth token masked
    pub fn redacted_yaml(&self) -> Result<String, serde_yaml::Error> {
        let mut shown = self.clone();
        if shown.auth_token.is_some() {
            shown.auth_token = Some("********".to_string());
        }
        serde_yaml::to_string(&shown)
    }

    pub fn client(&self) -> Result<GraphQLClient, ConfigClientError> {
        let endpoint = self.endpoint_url()?;
        let client = GraphQLClient::new(endpoint, self.request_timeout())?;
        Ok(match &self.auth_token {
            Some(token) => client.with_auth_token(token.clone()),
            None => client,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build http client: {0}")]
    Transport(#[from] TransportError),
}
