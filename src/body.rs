//! Request body type.
//!
//! A [`Body`] is a stream of byte chunks. The server hands handlers the raw
//! hyper stream, so nothing is buffered until a stage asks for it. Once a
//! stage does buffer it (see [`Request::buffer_body`](crate::Request::buffer_body)),
//! the body is replaced by an in-memory copy that later stages read as if it
//! had never been touched.

use std::fmt;

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};

use crate::error::BoxError;

/// An HTTP request body.
pub struct Body(UnsyncBoxBody<Bytes, BoxError>);

impl Body {
    /// Wraps any [`http_body`](hyper::body::Body) implementation.
    pub fn new<B>(body: B) -> Self
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self(body.map_err(Into::<BoxError>::into).boxed_unsync())
    }

    /// A body with no content.
    pub fn empty() -> Self {
        Self::new(Empty::<Bytes>::new())
    }

    /// Reads the body to the end and returns every byte as one buffer.
    ///
    /// Fails with the stream's error if any chunk cannot be read.
    pub async fn collect(self) -> Result<Bytes, BoxError> {
        Ok(BodyExt::collect(self.0).await?.to_bytes())
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body").finish_non_exhaustive()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::new(Full::new(bytes))
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from(Bytes::from(bytes))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::from(Bytes::from(text))
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::from(Bytes::from_static(text.as_bytes()))
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from(Bytes::from_static(bytes))
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use hyper::body::Frame;

    use super::*;

    struct ResetBody;

    impl hyper::body::Body for ResetBody {
        type Data = Bytes;
        type Error = std::io::Error;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Self::Error>>> {
            Poll::Ready(Some(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "peer reset",
            ))))
        }
    }

    #[tokio::test]
    async fn collects_full_body() {
        let bytes = Body::from("hello").collect().await.unwrap();
        assert_eq!(bytes.as_ref(), b"hello");
    }

    #[tokio::test]
    async fn empty_body_collects_to_nothing() {
        assert!(Body::empty().collect().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stream_error_surfaces_from_collect() {
        let err = Body::new(ResetBody).collect().await.unwrap_err();
        assert_eq!(err.to_string(), "peer reset");
    }
}
