//! # queryenv
//!
//! A minimal HTTP framework whose one built-in middleware asks an external
//! service about each request before the request is handled.
//!
//! ## The contract
//!
//! For every request the [`enrich`](middleware::enrich) stage:
//!
//! 1. reads the whole body, and puts an identical copy back for later stages;
//! 2. POSTs the bytes to the configured endpoint (10 s budget);
//! 3. expects `200 OK` with a flat JSON object of strings, e.g.
//!    `{"uri":"/v2/weChatNotify","service":"http://10.6.0.14:18099"}`;
//! 4. appends every pair to the request [`Context`];
//! 5. hands the request to the next stage untouched otherwise.
//!
//! An unreadable body answers `400`. Anything wrong with the endpoint answers
//! `502`. Nothing is cached and nothing is retried.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use queryenv::middleware::enrich::{Enrich, EnrichConfig};
//! use queryenv::{Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let enrich = Enrich::new(EnrichConfig::new("http://127.0.0.1:7788/wx_notify"))?;
//!
//!     let app = Router::new()
//!         .layer(enrich)
//!         .post("/notify", notify);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await?;
//!     Ok(())
//! }
//!
//! async fn notify(req: Request) -> Response {
//!     match req.context().get("service") {
//!         Some(service) => Response::text(format!("route to {service}")),
//!         None => Response::text("no service"),
//!     }
//! }
//! ```

mod body;
mod context;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use body::Body;
pub use context::Context;
pub use error::{BoxError, Error};
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
