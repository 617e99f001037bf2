//! Request enrichment middleware.
//!
//! For every request the stage reads the whole body, POSTs a copy of it to
//! the configured endpoint, and appends each key/value pair of the JSON
//! object it gets back to the request [`Context`](crate::Context). The
//! request then continues down the chain with its body intact.
//!
//! ```rust,no_run
//! use queryenv::middleware::enrich::{Enrich, EnrichConfig};
//! use queryenv::{Request, Response, Router};
//!
//! async fn notify(req: Request) -> Response {
//!     let service = req.context().get("service").unwrap_or("unknown");
//!     Response::text(service.to_owned())
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let enrich = Enrich::new(EnrichConfig::new("http://127.0.0.1:7788/wx_notify"))?;
//! let app = Router::new().layer(enrich).post("/notify", notify);
//! # Ok(())
//! # }
//! ```
//!
//! | Failure | Status |
//! |---|---|
//! | request body unreadable | 400 |
//! | endpoint unreachable, timed out, non-200, or not a string map | 502 |
//! | request cancelled by the host during the call | 499 |
//!
//! On any failure the next stage is never called and the context is left
//! untouched. Errors returned by the next stage are passed through as-is.

mod client;
mod config;
mod error;

use tracing::debug;
use url::Url;

pub use client::{EnrichClient, Enrichment, decode};
pub use config::{DEFAULT_TIMEOUT, EnrichConfig};
pub use error::{ConfigError, EnrichError};

use crate::error::Error;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// The enrichment stage. Build with [`Enrich::new`], mount with
/// [`Router::layer`](crate::Router::layer).
#[derive(Clone, Debug)]
pub struct Enrich {
    url: Url,
    client: EnrichClient,
}

impl Enrich {
    /// Validates `config` and builds the stage.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]: a stage that fails here must not serve.
    pub fn new(config: EnrichConfig) -> Result<Self, ConfigError> {
        let url = config.validate()?;
        let client = EnrichClient::new(config.timeout)?;
        Ok(Self { url, client })
    }

    /// The validated endpoint, with surrounding whitespace trimmed.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Captures the body, fetches the enrichment and merges it into the
    /// context. The context is only touched once the fetch has succeeded.
    async fn enrich(&self, req: &mut Request) -> Result<(), EnrichError> {
        let payload = req.buffer_body().await.map_err(EnrichError::ReadBody)?;
        let cancel = req.cancellation().clone();
        let enrichment = self.client.fetch(&self.url, payload, &cancel).await?;

        debug!(keys = enrichment.len(), path = req.path(), "merging enrichment into context");
        req.context_mut().extend(enrichment);
        Ok(())
    }
}

impl Middleware for Enrich {
    fn name(&self) -> &'static str {
        "enrich"
    }

    fn handle<'a>(&'a self, mut req: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response, Error>> {
        Box::pin(async move {
            self.enrich(&mut req).await?;
            next.run(req).await
        })
    }
}
