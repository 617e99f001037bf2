//! Middleware layer.
//!
//! Middleware runs between the server and the endpoint handler and is the
//! right place for cross-cutting concerns. Stages are registered on the
//! [`Router`](crate::Router) with [`layer`](crate::Router::layer) and run in
//! registration order for every matched route.
//!
//! A stage receives the request and a [`Next`]. Calling [`Next::run`]
//! continues down the chain; returning without calling it short-circuits.
//! Whatever `Next::run` returns, success or [`Error`], is the downstream
//! outcome, and a stage that does not care about it returns it as-is.
//!
//! ```rust,ignore
//! use queryenv::middleware::{BoxFuture, Middleware, Next};
//! use queryenv::{Error, Request, Response};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str { "timing" }
//!
//!     fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response, Error>> {
//!         Box::pin(async move {
//!             let started = std::time::Instant::now();
//!             let outcome = next.run(req).await;
//!             tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "handled");
//!             outcome
//!         })
//!     }
//! }
//! ```
//!
//! Built-in middleware:
//! - [`enrich`]: merges key/value pairs fetched from an external endpoint into the request context

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{Instrument, debug_span};

use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::Response;

pub mod enrich;

/// A boxed, `Send` future borrowing from the stage for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A stage in the request-processing chain.
pub trait Middleware: Send + Sync + 'static {
    /// Short name, recorded as the `stage` field of the span the stage runs in.
    fn name(&self) -> &'static str;

    /// Processes `req`, usually by calling `next.run(req)` exactly once.
    fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response, Error>>;
}

pub(crate) type BoxedMiddleware = Arc<dyn Middleware + Send + Sync + 'static>;

/// The rest of the chain after the current stage.
///
/// Consumed by [`run`](Next::run), so it can be invoked at most once.
pub struct Next<'a> {
    stack: &'a [BoxedMiddleware],
    endpoint: &'a BoxedHandler,
}

impl<'a> Next<'a> {
    pub(crate) fn new(stack: &'a [BoxedMiddleware], endpoint: &'a BoxedHandler) -> Self {
        Self { stack, endpoint }
    }

    /// Runs the remaining stages and then the endpoint handler.
    pub async fn run(self, req: Request) -> Result<Response, Error> {
        match self.stack.split_first() {
            Some((stage, rest)) => {
                let span = debug_span!("middleware", stage = stage.name());
                stage.handle(req, Next::new(rest, self.endpoint)).instrument(span).await
            }
            None => Ok(self.endpoint.call(req).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::body::Body;
    use crate::handler::Handler;

    struct Tag(&'static str);

    impl Middleware for Tag {
        fn name(&self) -> &'static str { "tag" }

        fn handle<'a>(&'a self, mut req: Request, next: Next<'a>) -> BoxFuture<'a, Result<Response, Error>> {
            Box::pin(async move {
                tracing::debug!(value = self.0, "tagging");
                req.context_mut().insert("order", self.0);
                next.run(req).await
            })
        }
    }

    struct Reject;

    impl Middleware for Reject {
        fn name(&self) -> &'static str { "reject" }

        fn handle<'a>(&'a self, _req: Request, _next: Next<'a>) -> BoxFuture<'a, Result<Response, Error>> {
            Box::pin(async { Err::<Response, _>(Error::http(StatusCode::FORBIDDEN, "rejected")) })
        }
    }

    async fn order(req: Request) -> Response {
        let seen: Vec<&str> = req.context().iter().map(|(_, v)| v).collect();
        Response::text(seen.join(","))
    }

    fn request() -> Request {
        http::Request::get("/").body(Body::empty()).unwrap().into()
    }

    #[tokio::test]
    async fn stages_run_in_registration_order() {
        let stack: Vec<BoxedMiddleware> = vec![Arc::new(Tag("first")), Arc::new(Tag("second"))];
        let endpoint = order.into_boxed_handler();

        let response = Next::new(&stack, &endpoint).run(request()).await.unwrap();
        assert_eq!(response.body().as_ref(), b"first,second");
    }

    #[tokio::test]
    async fn short_circuit_skips_endpoint() {
        let stack: Vec<BoxedMiddleware> = vec![Arc::new(Reject), Arc::new(Tag("unreached"))];
        let endpoint = order.into_boxed_handler();

        let err = Next::new(&stack, &endpoint).run(request()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn stage_events_carry_stage_name() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let stack: Vec<BoxedMiddleware> = vec![Arc::new(Tag("first"))];
        let endpoint = order.into_boxed_handler();
        Next::new(&stack, &endpoint).run(request()).await.unwrap();

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains(r#"middleware{stage="tag"}"#), "{logs}");
        assert!(logs.contains("tagging"), "{logs}");
    }
}
