//! HTTP API: health checks, Prometheus metrics and the read-only query
//! surface consumed by dashboards and reporting collaborators

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use monitor_lib::{
    ComponentStatus, HealthRegistry, MonitoringController, ThresholdOverrides, Timeframe,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<MonitoringController>,
    pub health: HealthRegistry,
}

impl AppState {
    pub fn new(controller: Arc<MonitoringController>, health: HealthRegistry) -> Self {
        Self { controller, health }
    }
}

/// Health check - 200 while operational, 503 once a component failed
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check - 200 once the sampling loop is running
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            e.to_string().into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

async fn current_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.controller.current_metrics() {
        Some(sample) => (StatusCode::OK, Json(json!(sample))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no samples collected yet" })),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    limit: Option<usize>,
}

async fn historical_metrics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> impl IntoResponse {
    Json(state.controller.historical_metrics(params.limit))
}

#[derive(Debug, Deserialize)]
struct AlertParams {
    #[serde(default)]
    include_resolved: bool,
}

async fn alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertParams>,
) -> impl IntoResponse {
    Json(state.controller.alerts(params.include_resolved))
}

async fn resolve_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    state.controller.resolve_alert(id);
    StatusCode::NO_CONTENT
}

async fn recommendations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.controller.scaling_recommendations())
}

async fn trends(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.controller.resource_trends())
}

#[derive(Debug, Deserialize)]
struct PlanParams {
    timeframe: Option<String>,
}

async fn capacity_plan(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlanParams>,
) -> impl IntoResponse {
    let key = params.timeframe.as_deref().unwrap_or("3months");
    match key.parse::<Timeframe>() {
        Ok(timeframe) => (
            StatusCode::OK,
            Json(json!(state.controller.generate_capacity_plan(timeframe))),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

async fn update_thresholds(
    State(state): State<Arc<AppState>>,
    Json(overrides): Json<ThresholdOverrides>,
) -> impl IntoResponse {
    state.controller.update_thresholds(overrides);
    StatusCode::NO_CONTENT
}

async fn thresholds(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.controller.thresholds())
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/metrics/current", get(current_metrics))
        .route("/api/v1/metrics/history", get(historical_metrics))
        .route("/api/v1/alerts", get(alerts))
        .route("/api/v1/alerts/:id/resolve", post(resolve_alert))
        .route("/api/v1/recommendations", get(recommendations))
        .route("/api/v1/trends", get(trends))
        .route("/api/v1/capacity-plan", get(capacity_plan))
        .route("/api/v1/thresholds", get(thresholds).post(update_thresholds))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
