//! Error types for the enrichment stage.
//!
//! [`ConfigError`] is returned once, when the stage is built, and means the
//! stage must not serve. [`EnrichError`] is per request; each variant knows
//! which HTTP status it presents as.

use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

use crate::error::{BoxError, Error};

/// Nginx's non-standard "client closed request".
fn client_closed_request() -> StatusCode {
    match StatusCode::from_u16(499) {
        Ok(status) => status,
        Err(_) => unreachable!("499 is a valid status code"),
    }
}

/// Invalid enrichment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `url` was absent or blank.
    #[error("enrich: `url` is required")]
    MissingUrl,

    #[error("enrich: invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("enrich: url scheme must be http or https, got `{scheme}`")]
    UnsupportedScheme { scheme: String },

    #[error("enrich: timeout must be greater than zero")]
    ZeroTimeout,

    /// The HTTP client could not be built (e.g. TLS backend initialisation).
    #[error("enrich: failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A failed enrichment for one request.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// The inbound request body could not be read.
    #[error("failed to read request body: {0}")]
    ReadBody(#[source] BoxError),

    /// Connection, DNS or transport failure talking to the endpoint.
    #[error("enrichment endpoint unreachable: {0}")]
    Network(#[source] reqwest::Error),

    #[error("enrichment request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The endpoint answered with something other than `200 OK`.
    #[error("enrichment endpoint responded with {status}")]
    Status { status: StatusCode },

    /// The response body is not a flat JSON object of strings.
    #[error("enrichment response is not a string map: {0}")]
    Decode(#[source] serde_json::Error),

    /// The host cancelled the request while the call was outstanding.
    #[error("enrichment cancelled")]
    Cancelled,
}

impl EnrichError {
    /// The status the caller sees: 400 for an unreadable body, 499 for
    /// cancellation, 502 for everything the endpoint is responsible for.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ReadBody(_) => StatusCode::BAD_REQUEST,
            Self::Cancelled => client_closed_request(),
            Self::Network(_) | Self::Timeout { .. } | Self::Status { .. } | Self::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// True when the enrichment endpoint, not the client, is at fault.
    pub fn is_gateway_failure(&self) -> bool {
        self.status() == StatusCode::BAD_GATEWAY
    }
}

impl From<EnrichError> for Error {
    fn from(err: EnrichError) -> Self {
        Error::http(err.status(), err)
    }
}
