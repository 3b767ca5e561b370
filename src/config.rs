//! Connection and retry settings.
//!
//! Missing fields take their defaults, so `{}` is a valid configuration.
//!
//! ```
//! use bawire::config::BawireConfig;
//!
//! let config = BawireConfig::from_json(r#"{ "retry": { "max_retries": 5 } }"#).unwrap();
//! assert_eq!(config.retry.max_retries, 5);
//! assert_eq!(config.retry.delay_ms, 500);
//! ```

use serde::{Deserialize, Serialize};

use crate::channel::{ChannelConfig, PipeChannel};
use crate::error::{BawireError, Result};
use crate::retry::{RetryConfig, RetryPolicy};
use crate::transport::PipeStream;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BawireConfig {
    /// Endpoint the engine listens on.
    pub pipe_path: Option<String>,
    /// Shared secret checked during the handshake.
    pub secret: String,
    pub channel: ChannelConfig,
    pub retry: RetryConfig,
}

impl BawireConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn pipe_path(mut self, path: impl Into<String>) -> Self {
        self.pipe_path = Some(path.into());
        self
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    pub fn channel(mut self, channel: ChannelConfig) -> Self {
        self.channel = channel;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// A fresh retry policy with these settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.retry)
    }

    /// Connect to the configured pipe and run the client handshake.
    pub async fn connect(&self) -> Result<PipeChannel<PipeStream>> {
        let path = self
            .pipe_path
            .as_deref()
            .ok_or_else(|| BawireError::InvalidArgument("no pipe path configured".to_string()))?;

        tracing::debug!(path, "connecting");
        PipeChannel::connect(path, &self.secret, self.channel.clone()).await
    }
}
