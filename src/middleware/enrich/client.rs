//! HTTP client for the enrichment round trip.
//!
//! One POST per request: the captured body goes out verbatim, a `200 OK`
//! carrying a flat JSON object of strings comes back. Everything else is a
//! typed [`EnrichError`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span, warn};
use url::Url;

use super::error::{ConfigError, EnrichError};

/// Key/value pairs returned by the enrichment endpoint.
pub type Enrichment = HashMap<String, String>;

/// Client for the enrichment endpoint.
///
/// Holds one pooled `reqwest::Client` whose timeout bounds the whole round
/// trip. Cheap to clone; clones share the pool.
#[derive(Clone, Debug)]
pub struct EnrichClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl EnrichClient {
    /// Builds a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Client`] if the underlying HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POSTs `payload` to `url` and decodes the reply.
    ///
    /// Fails fast with [`EnrichError::Cancelled`] if `cancel` fires first; the
    /// in-flight request is dropped, which aborts it.
    ///
    /// # Errors
    ///
    /// - `Network` for connection and transport failures
    /// - `Timeout` when the round trip exceeds the configured timeout
    /// - `Status` for any status other than `200 OK`
    /// - `Decode` when the body is not a JSON object of string values
    /// - `Cancelled` when `cancel` fires while the call is outstanding
    pub async fn fetch(
        &self,
        url: &Url,
        payload: Bytes,
        cancel: &CancellationToken,
    ) -> Result<Enrichment, EnrichError> {
        let span = info_span!("enrich", url = %url, payload_bytes = payload.len());

        async move {
            let started = Instant::now();

            let result = tokio::select! {
                biased;

                () = cancel.cancelled() => Err(EnrichError::Cancelled),
                result = self.round_trip(url, payload) => result,
            };

            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            match &result {
                Ok(enrichment) => debug!(keys = enrichment.len(), elapsed_ms, "enrichment received"),
                Err(e) => warn!(elapsed_ms, "enrichment failed: {e}"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn round_trip(&self, url: &Url, payload: Bytes) -> Result<Enrichment, EnrichError> {
        let response = self
            .client
            .post(url.clone())
            .body(payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(EnrichError::Status { status });
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        decode(&body)
    }

    fn transport_error(&self, e: reqwest::Error) -> EnrichError {
        if e.is_timeout() {
            EnrichError::Timeout { timeout: self.timeout }
        } else {
            EnrichError::Network(e)
        }
    }
}

/// Decodes an enrichment response body.
///
/// Only a JSON object whose values are all strings is accepted. Numbers,
/// booleans, `null`, arrays and nested objects are rejected rather than
/// coerced.
pub fn decode(body: &[u8]) -> Result<Enrichment, EnrichError> {
    serde_json::from_slice(body).map_err(EnrichError::Decode)
}
