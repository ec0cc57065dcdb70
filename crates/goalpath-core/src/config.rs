//! Client configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `GOALPATH_*` environment variables (a `.env` file is honored). Command-line
//! flags in the binary override all of these.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Default goal service base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default tutor socket endpoint (the user id is appended as the last segment)
pub const DEFAULT_TUTOR_URL: &str = "ws://localhost:8000/ws/tutor";

/// Default delay before a dropped tutor connection is retried
pub const DEFAULT_RECONNECT_SECS: u64 = 3;

/// Main client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Goal/auth service base URL
    pub api_url: String,

    /// Tutor WebSocket endpoint
    pub tutor_url: String,

    /// Where the bearer token is persisted (None keeps it in memory only)
    pub token_file: Option<PathBuf>,

    /// Tutor reconnect delay in seconds
    pub reconnect_delay_secs: u64,

    /// Optional HTTP request timeout; unset means no timeout
    pub http_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            tutor_url: DEFAULT_TUTOR_URL.to_string(),
            token_file: None,
            reconnect_delay_secs: DEFAULT_RECONNECT_SECS,
            http_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_tutor_url(mut self, url: impl Into<String>) -> Self {
        self.tutor_url = url.into();
        self
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    pub fn with_reconnect_delay_secs(mut self, secs: u64) -> Self {
        self.reconnect_delay_secs = secs;
        self
    }

    pub fn with_http_timeout_secs(mut self, secs: u64) -> Self {
        self.http_timeout_secs = Some(secs);
        self
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `GOALPATH_*` environment overrides, reading `.env` first if present.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        // A missing .env file is the normal case.
        let _ = dotenvy::dotenv();
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (used by `with_env` and tests)
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GOALPATH_API_URL") {
            self.api_url = url;
        }
        if let Some(url) = lookup("GOALPATH_TUTOR_URL") {
            self.tutor_url = url;
        }
        if let Some(path) = lookup("GOALPATH_TOKEN_FILE") {
            self.token_file = Some(PathBuf::from(path));
        }
        if let Some(secs) = lookup("GOALPATH_RECONNECT_SECS") {
            self.reconnect_delay_secs = parse_secs("GOALPATH_RECONNECT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("GOALPATH_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = Some(parse_secs("GOALPATH_HTTP_TIMEOUT_SECS", &secs)?);
        }
        Ok(self)
    }

    /// Check that both endpoints parse and use the expected schemes
    pub fn validate(&self) -> Result<(), ConfigError> {
        let api = self.api_endpoint()?;
        if !matches!(api.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "api_url must be http(s), got {}",
                api.scheme()
            )));
        }
        let tutor = Url::parse(&self.tutor_url).map_err(|source| ConfigError::Url {
            field: "tutor_url",
            source,
        })?;
        if !matches!(tutor.scheme(), "ws" | "wss") {
            return Err(ConfigError::Invalid(format!(
                "tutor_url must be ws(s), got {}",
                tutor.scheme()
            )));
        }
        if self.reconnect_delay_secs == 0 {
            return Err(ConfigError::Invalid(
                "reconnect_delay_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn api_endpoint(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api_url).map_err(|source| ConfigError::Url {
            field: "api_url",
            source,
        })
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    /// Build the shared HTTP client, applying the optional timeout
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.http_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {}", e)))
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} must be a whole number of seconds", key)))
}
