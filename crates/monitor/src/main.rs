//! Capacity monitor - resource telemetry and capacity-planning daemon
//!
//! Samples multi-dimensional utilization metrics on a fixed cadence,
//! raises de-duplicated threshold alerts, and serves scaling
//! recommendations and capacity plans over HTTP.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use monitor_lib::{
    health::components, HealthRegistry, MonitoringController,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod probe;

const MONITOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!(version = MONITOR_VERSION, "Starting capacity-monitor");

    let config = config::MonitorConfig::load()?;
    info!(
        interval_secs = config.sample_interval_secs,
        max_samples = config.max_samples,
        "Monitor configured"
    );

    let health = HealthRegistry::new();
    health.register(components::PROBE).await;
    health.register(components::SAMPLER).await;

    let controller = Arc::new(
        MonitoringController::builder()
            .probe(Arc::new(probe::SyntheticProbe::new()))
            .interval(Duration::from_secs(config.sample_interval_secs))
            .max_samples(config.max_samples)
            .max_alerts(config.max_alerts)
            .build()?,
    );

    // Warmup tick so the query surface has a sample before the loop's
    // first scheduled tick
    controller.sample_once().await;
    controller.start_monitoring();
    health.set_ready(true).await;

    let app_state = Arc::new(api::AppState::new(Arc::clone(&controller), health.clone()));
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    // Periodic retention cleanup alongside the sampling loop
    let cleanup_controller = Arc::clone(&controller);
    let retention = Duration::from_secs(config.retention_secs);
    let cleanup_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval((retention / 4).max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            cleanup_controller.cleanup(retention);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    cleanup_handle.abort();
    api_handle.abort();
    controller.destroy().await;

    Ok(())
}
