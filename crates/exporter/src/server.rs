//! HTTP endpoints: the metrics exposition and a liveness probe
//!
//! Each `/metrics` request opens a fresh remote session, runs one full
//! collection, closes the session, and serves whatever the gauge registry
//! holds. A failed collection leaves the previous samples in place and the
//! response stays 200; Prometheus sees staleness through the sample
//! timestamps, not through scrape failures.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use tokio::sync::Mutex;
use tracing::{error, info};
use vperf_lib::{HttpVimApi, Scraper, SessionConfig};

use crate::observability::ExporterMetrics;

/// Shared application state
pub struct AppState {
    pub scraper: Scraper,
    pub session: SessionConfig,
    pub metrics: ExporterMetrics,
    /// Serializes collections so concurrent Prometheus scrapes cannot
    /// interleave reset and record on the gauges.
    scrape_lock: Mutex<()>,
}

impl AppState {
    pub fn new(scraper: Scraper, session: SessionConfig, metrics: ExporterMetrics) -> Self {
        Self {
            scraper,
            session,
            metrics,
            scrape_lock: Mutex::new(()),
        }
    }
}

async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run one collection and serve the exposition. The endpoint itself never
/// fails: session or pipeline errors are counted and logged, and the
/// response falls through to whatever is currently registered.
async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let _guard = state.scrape_lock.lock().await;
    let started = Instant::now();

    match HttpVimApi::login(&state.session).await {
        Ok(session) => {
            match state.scraper.scrape(&session).await {
                Ok(published) => {
                    state.metrics.set_samples_published(published as i64);
                }
                Err(error) => {
                    state.metrics.inc_scrape_errors();
                    error!(%error, "collection failed");
                }
            }
            session.close().await;
        }
        Err(error) => {
            state.metrics.inc_scrape_errors();
            error!(%error, url = %state.session.url, "session login failed");
        }
    }
    state
        .metrics
        .observe_scrape_duration(started.elapsed().as_secs_f64());

    let mut families = state.scraper.gauges().gather();
    families.extend(prometheus::gather());

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(error) = encoder.encode(&families, &mut buffer) {
        error!(%error, "metric encoding failed");
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the HTTP router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(listen: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %listen, "Starting metrics server");

    let listener = tokio::net::TcpListener::bind(listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
