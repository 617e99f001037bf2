//! Enrichment stage configuration.

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use url::Url;

use super::error::ConfigError;

/// Round-trip budget for one enrichment call: connect, send, read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`Enrich`](super::Enrich).
///
/// Deserialises from `{"url": "http://10.0.0.5:7788/notify"}`. `timeout`
/// is optional, in seconds (fractions allowed), and defaults to
/// [`DEFAULT_TIMEOUT`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnrichConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_timeout", deserialize_with = "deserialize_secs")]
    pub timeout: Duration,
}

impl EnrichConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), timeout: DEFAULT_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks the configuration and returns the parsed endpoint.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingUrl`] if `url` is empty or whitespace
    /// - [`ConfigError::InvalidUrl`] if it is not an absolute URL
    /// - [`ConfigError::UnsupportedScheme`] for anything but http/https
    /// - [`ConfigError::ZeroTimeout`] if `timeout` is zero
    pub fn validate(&self) -> Result<Url, ConfigError> {
        let raw = self.url.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingUrl);
        }

        let url = Url::parse(raw)
            .map_err(|source| ConfigError::InvalidUrl { url: raw.to_owned(), source })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme { scheme: url.scheme().to_owned() });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(url)
    }
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn deserialize_secs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}
