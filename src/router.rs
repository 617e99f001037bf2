//! Radix-tree request router with a middleware stack.
//!
//! One tree per HTTP method, O(path-length) lookup. Middleware registered
//! with [`Router::layer`] wraps every matched route; unmatched requests get a
//! bare `404` without entering the stack.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{BoxedMiddleware, Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Every builder method returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    layers: Vec<BoxedMiddleware>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), layers: Vec::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Appends a middleware stage. Stages run in the order they are added.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Routes one request through the middleware stack and its handler.
    ///
    /// This is what the server runs per request; tests call it directly to
    /// exercise a router without a socket.
    pub async fn call(&self, mut req: Request) -> Result<Response, Error> {
        let Some((handler, params)) = self.lookup(req.method(), req.path()) else {
            return Ok(Response::status(StatusCode::NOT_FOUND));
        };
        req.params = params;
        Next::new(&self.layers, handler).run(req).await
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(&BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((matched.value, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;

    async fn show_id(req: Request) -> Response {
        Response::text(req.param("id").unwrap_or("none").to_owned())
    }

    fn request(method: Method, uri: &str) -> Request {
        http::Request::builder().method(method).uri(uri).body(Body::empty()).unwrap().into()
    }

    #[tokio::test]
    async fn routes_by_method_and_extracts_params() {
        let router = Router::new().get("/users/{id}", show_id);

        let response = router.call(request(Method::GET, "/users/42")).await.unwrap();
        assert_eq!(response.body().as_ref(), b"42");

        let response = router.call(request(Method::POST, "/users/42")).await.unwrap();
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn same_path_dispatches_per_method() {
        let router = Router::new()
            .put("/orders/{id}", |_req: Request| async { Response::text("replaced") })
            .delete("/orders/{id}", |_req: Request| async { Response::status(StatusCode::NO_CONTENT) });

        let response = router.call(request(Method::PUT, "/orders/7")).await.unwrap();
        assert_eq!(response.body().as_ref(), b"replaced");

        let response = router.call(request(Method::DELETE, "/orders/7")).await.unwrap();
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

        let response = router.call(request(Method::GET, "/orders/7")).await.unwrap();
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let router = Router::new().get("/users/{id}", show_id);
        let response = router.call(request(Method::GET, "/orders")).await.unwrap();
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = Router::new().get("/users/{id}", show_id).get("/users/{id}", show_id);
    }
}
