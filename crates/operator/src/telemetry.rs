use axum::{http::{header, StatusCode}, response::IntoResponse, routing::get, Json, Router};
use once_cell::sync::Lazy;
use prometheus::{opts, Encoder, IntCounter, IntCounterVec, Registry, TextEncoder, TEXT_FORMAT};
use std::net::SocketAddr;
use tracing::{info, warn};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static RECONCILE_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(opts!("healthcheck_reconcile_total", "Reconcile passes by outcome"), &["outcome"])
        .expect("valid metric definition");
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

pub static STATUS_WRITES: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::with_opts(opts!("healthcheck_status_writes_total", "Status sub-resource writes"))
        .expect("valid metric definition");
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

pub static TEARDOWN_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(opts!("healthcheck_teardown_total", "External teardown attempts by result"), &["result"])
        .expect("valid metric definition");
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

/// Text exposition of every registered counter.
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let mut buf = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buf)?;
    String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// `/health` for the kubelet probes, `/metrics` for scraping.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "ok"})) }))
        .route(
            "/metrics",
            get(|| async {
                match render_metrics() {
                    Ok(body) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
                    Err(e) => {
                        warn!(error=%e, "metrics.encode_failed");
                        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
                    }
                }
            }),
        )
}

pub async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "metrics.listening");
    axum::serve(listener, router()).await?;
    Ok(())
}
