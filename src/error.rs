//! Unified error type.

use http::StatusCode;
use thiserror::Error;

use crate::response::{IntoResponse, Response};

/// A boxed, thread-safe error. Used for body stream failures and as the
/// payload of [`Error::Http`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type returned by queryenv's fallible operations.
///
/// Handlers express ordinary outcomes (404, 422, etc.) as [`Response`]
/// values. `Error` is what a middleware stage returns when it refuses to let
/// a request continue, plus the infrastructure failures of the server itself.
#[derive(Debug, Error)]
pub enum Error {
    /// Binding to a port or accepting a connection failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// A request-level failure that maps onto an HTTP status.
    #[error("{status}: {source}")]
    Http {
        status: StatusCode,
        source: BoxError,
    },
}

impl Error {
    /// Builds a request-level error carrying `status`.
    pub fn http(status: StatusCode, source: impl Into<BoxError>) -> Self {
        Self::Http { status, source: source.into() }
    }

    /// The HTTP status this error presents as.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Http { status, .. } => *status,
        }
    }
}

/// Renders the status with its canonical reason phrase as a plain-text body.
/// The underlying cause is logged by the server, never sent to the client.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        Response::builder()
            .status(status)
            .text(status.canonical_reason().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_keeps_status_and_message() {
        let err = Error::http(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "502 Bad Gateway: upstream down");
    }

    #[test]
    fn io_error_presents_as_internal_server_error() {
        let err = Error::from(std::io::Error::other("bind failed"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_response_hides_cause() {
        let response = Error::http(StatusCode::BAD_REQUEST, "secret detail").into_response();
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body().as_ref(), b"Bad Request");
    }
}
