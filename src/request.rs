//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method};
use tokio_util::sync::CancellationToken;

use crate::body::Body;
use crate::context::Context;
use crate::error::BoxError;

/// An incoming HTTP request as seen by middleware and handlers.
///
/// Besides the usual head and body it carries the request's [`Context`] and
/// a cancellation token that fires when the host gives up on the request.
#[derive(Debug)]
pub struct Request {
    pub(crate) head: Parts,
    pub(crate) body: Body,
    pub(crate) params: HashMap<String, String>,
    pub(crate) context: Context,
    pub(crate) cancellation: CancellationToken,
}

impl Request {
    pub fn method(&self) -> &Method { &self.head.method }
    pub fn path(&self) -> &str { self.head.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }
    pub fn context(&self) -> &Context { &self.context }
    pub fn context_mut(&mut self) -> &mut Context { &mut self.context }
    pub fn into_body(self) -> Body { self.body }

    /// Header lookup. Names are case-insensitive; non-UTF-8 values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Token cancelled when the host abandons this request.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Replaces the request's cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Reads the whole body into memory and puts an identical copy back.
    ///
    /// The returned bytes and the restored body share one allocation, so a
    /// later `buffer_body` or [`into_body`](Self::into_body) observes exactly
    /// the same content. On a stream error the body is left empty.
    pub async fn buffer_body(&mut self) -> Result<Bytes, BoxError> {
        let bytes = std::mem::take(&mut self.body).collect().await?;
        self.body = Body::from(bytes.clone());
        Ok(bytes)
    }
}

impl From<http::Request<Body>> for Request {
    fn from(req: http::Request<Body>) -> Self {
        let (head, body) = req.into_parts();
        Self {
            head,
            body,
            params: HashMap::new(),
            context: Context::new(),
            cancellation: CancellationToken::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(body: &'static str) -> Request {
        http::Request::post("/notify")
            .header("Content-Type", "application/xml")
            .body(Body::from(body))
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn buffered_body_is_readable_again() {
        let mut req = post("<xml>1</xml>");

        let first = req.buffer_body().await.unwrap();
        let second = req.buffer_body().await.unwrap();
        let last = req.into_body().collect().await.unwrap();

        assert_eq!(first.as_ref(), b"<xml>1</xml>");
        assert_eq!(first, second);
        assert_eq!(first, last);
    }

    #[tokio::test]
    async fn empty_body_survives_buffering() {
        let mut req = post("");
        assert!(req.buffer_body().await.unwrap().is_empty());
        assert!(req.into_body().collect().await.unwrap().is_empty());
    }

    #[test]
    fn head_accessors() {
        let req = post("");
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.path(), "/notify");
        assert_eq!(req.header("content-type"), Some("application/xml"));
        assert!(req.context().is_empty());
        assert!(!req.cancellation().is_cancelled());
    }
}
