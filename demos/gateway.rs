//! Enrichment gateway example: every POST to `/notify` is enriched before
//! the handler sees it.
//!
//! Run with:
//!   ENRICH_URL=http://127.0.0.1:7788/wx_notify RUST_LOG=queryenv=debug \
//!       cargo run --example gateway
//!
//! Try:
//!   curl -X POST http://localhost:3000/notify \
//!        -d '<xml><out_trade_no>GM240824133452586424</out_trade_no></xml>'

use queryenv::middleware::enrich::{Enrich, EnrichConfig};
use queryenv::{Request, Response, Router, Server, StatusCode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = std::env::var("ENRICH_URL").unwrap_or_default();
    let enrich = Enrich::new(EnrichConfig::new(url))?;

    let app = Router::new()
        .layer(enrich)
        .post("/notify", notify);

    Server::bind("0.0.0.0:3000").serve(app).await?;
    Ok(())
}

// POST /notify
//
// The enrichment endpoint decides which keys exist. This one expects `uri`
// and `service` and reports where the notification would be forwarded.
async fn notify(mut req: Request) -> Response {
    let Ok(body) = req.buffer_body().await else {
        return Response::status(StatusCode::BAD_REQUEST);
    };

    match (req.context().get("service"), req.context().get("uri")) {
        (Some(service), Some(uri)) => Response::json(format!(
            r#"{{"forward_to":"{service}{uri}","bytes":{}}}"#,
            body.len()
        )),
        _ => Response::status(StatusCode::UNPROCESSABLE_ENTITY),
    }
}
