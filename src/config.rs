//! Settings
//!
//! Read from an optional YAML file, then overridden by command-line flags.
//! Every field has a default, so an empty file (or no file) is valid.

use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::HttpGatewayConfig;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base URL of the pipeline backend
    pub backend_url: String,
    /// Per-request timeout; graph builds can take minutes
    pub timeout_secs: u64,
    /// Console port
    pub port: u16,
    /// Console bind address
    pub bind: IpAddr,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            port: DEFAULT_PORT,
            bind: IpAddr::from([127, 0, 0, 1]),
        }
    }
}

/// Values given on the command line; `None` keeps the loaded value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub port: Option<u16>,
}

impl Settings {
    /// Load settings from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.backend_url {
            self.backend_url = url;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout_secs = secs;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let url = self.backend_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("backend_url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "backend_url must start with http:// or https://: {url}"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn gateway(&self) -> HttpGatewayConfig {
        HttpGatewayConfig {
            base_url: self.backend_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
