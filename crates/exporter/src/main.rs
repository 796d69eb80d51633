//! vperf-exporter - performance telemetry exporter
//!
//! Polls a virtualization management endpoint on every Prometheus scrape
//! and republishes inventory performance counters as timestamped gauges.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vperf_lib::models::CounterCatalog;
use vperf_lib::{ExporterConfig, GaugeSet, HttpVimApi, Scraper, SessionConfig};

mod config;
mod observability;
mod server;

const EXPORTER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let settings = config::Settings::load()?;

    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with(fmt::layer().json())
        .init();

    info!(version = EXPORTER_VERSION, "Starting vperf-exporter");
    let scrape_config = ExporterConfig::load_or_default(
        settings.config_path.as_deref().map(Path::new),
    )?;
    info!(
        url = %settings.url,
        counters = scrape_config.counters.len(),
        objects = scrape_config.objects.len(),
        "Exporter configured"
    );

    let session_config = settings.session_config();
    let gauges = bootstrap_gauges(&session_config).await;
    if gauges.is_empty() {
        warn!("serving an empty gauge set until the endpoint becomes reachable");
    }

    let metrics = observability::ExporterMetrics::new();
    let scraper = Scraper::new(scrape_config, gauges);
    let state = Arc::new(server::AppState::new(scraper, session_config, metrics));

    let listen = settings.listen.clone();
    let server_handle = tokio::spawn(async move { server::serve(&listen, state).await });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
        result = server_handle => {
            result??;
        }
    }

    Ok(())
}

/// Fetch the counter catalog once at startup and build the gauge registry
/// from it. An unreachable endpoint is not fatal here: the exporter starts
/// with an empty set and keeps answering probes.
async fn bootstrap_gauges(session_config: &SessionConfig) -> GaugeSet {
    let session = match HttpVimApi::login(session_config).await {
        Ok(session) => session,
        Err(error) => {
            warn!(%error, url = %session_config.url, "catalog bootstrap login failed");
            return GaugeSet::build(&CounterCatalog::default());
        }
    };

    let gauges = match session.perf_counters().await {
        Ok(descs) => {
            let catalog = CounterCatalog::new(descs.into_iter().map(Into::into).collect());
            info!(counters = catalog.counters().len(), "counter catalog loaded");
            GaugeSet::build(&catalog)
        }
        Err(error) => {
            warn!(%error, "counter catalog fetch failed");
            GaugeSet::build(&CounterCatalog::default())
        }
    };
    session.close().await;
    gauges
}
