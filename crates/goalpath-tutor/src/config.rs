//! Tutor channel configuration

use goalpath_core::config::{ClientConfig, DEFAULT_RECONNECT_SECS, DEFAULT_TUTOR_URL};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{ChannelError, Result};

/// Main tutor channel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Socket endpoint; the user id is appended as the final path segment
    pub endpoint: String,

    /// Delay before a dropped connection is retried
    pub reconnect_delay_secs: u64,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TUTOR_URL.to_string(),
            reconnect_delay_secs: DEFAULT_RECONNECT_SECS,
        }
    }
}

impl From<&ClientConfig> for TutorConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.tutor_url.clone(),
            reconnect_delay_secs: config.reconnect_delay_secs,
        }
    }
}

impl TutorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the reconnect delay
    pub fn with_reconnect_delay_secs(mut self, secs: u64) -> Self {
        self.reconnect_delay_secs = secs;
        self
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    /// Full socket URL for `user_id`, e.g. `ws://localhost:8000/ws/tutor/u1`
    pub fn endpoint_for(&self, user_id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ChannelError::InvalidEndpoint(format!(
                "expected ws:// or wss://, got {}",
                self.endpoint
            )));
        }
        url.path_segments_mut()
            .map_err(|_| ChannelError::InvalidEndpoint(self.endpoint.clone()))?
            .pop_if_empty()
            .push(user_id);
        Ok(url)
    }
}
