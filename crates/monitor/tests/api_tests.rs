//! Integration tests for the monitor API endpoints

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use monitor_lib::{
    health::{components, ComponentHealth, ComponentStatus, HealthRegistry},
    CpuMetrics, MemoryMetrics, MetricsProbe, MonitoringController, NetworkMetrics,
    StorageMetrics, ThresholdOverrides, Timeframe,
};
use serde::Deserialize;
use serde_json::json;
use tower::ServiceExt;

/// Probe returning a steady mid-range reading
struct SteadyProbe;

#[async_trait::async_trait]
impl MetricsProbe for SteadyProbe {
    async fn sample_cpu(&self) -> anyhow::Result<CpuMetrics> {
        Ok(CpuMetrics {
            usage_percent: 40.0,
            cores: 4,
            ..Default::default()
        })
    }

    async fn sample_memory(&self) -> anyhow::Result<MemoryMetrics> {
        Ok(MemoryMetrics::default())
    }

    async fn sample_network(&self) -> anyhow::Result<NetworkMetrics> {
        Ok(NetworkMetrics::default())
    }

    async fn sample_storage(&self) -> anyhow::Result<StorageMetrics> {
        Ok(StorageMetrics::default())
    }
}

#[derive(Clone)]
struct AppState {
    controller: Arc<MonitoringController>,
    health: HealthRegistry,
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health.health().await;
    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health.readiness().await;
    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(readiness))
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

fn create_test_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/api/v1/capacity-plan", get(capacity_plan))
        .route("/api/v1/thresholds", get(thresholds).post(update_thresholds))
        .with_state(state)
}

async fn setup_test_app() -> (Router, Arc<AppState>) {
    let health = HealthRegistry::new();
    health.register(components::PROBE).await;
    health.register(components::SAMPLER).await;

    let controller = MonitoringController::builder()
        .probe(Arc::new(SteadyProbe))
        .build()
        .unwrap();

    let state = Arc::new(AppState {
        controller: Arc::new(controller),
        health,
    });
    let router = create_test_router(state.clone());

    (router, state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_healthz_returns_ok_when_healthy() {
    let (app, _state) = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert!(health["components"]["probe"].is_object());
    assert!(health["components"]["sampler"].is_object());
}

#[tokio::test]
async fn test_healthz_returns_503_when_unhealthy() {
    let (app, state) = setup_test_app().await;

    state
        .health
        .update(components::PROBE, ComponentHealth::unhealthy("probe stalled"))
        .await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["status"], "unhealthy");
}

#[tokio::test]
async fn test_readyz_returns_503_until_ready() {
    let (app, _state) = setup_test_app().await;

    // Not ready until the sampling loop is started
    let response = app
        .oneshot(
            Request::builder()
                .uri("/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["ready"], false);
}

#[tokio::test]
async fn test_readyz_returns_ok_when_ready() {
    let (app, state) = setup_test_app().await;

    state.health.set_ready(true).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["ready"], true);
}

#[tokio::test]
async fn test_capacity_plan_rejects_unknown_timeframe() {
    let (app, _state) = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/capacity-plan?timeframe=2weeks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = body_json(response).await;
    assert_eq!(
        error["error"],
        "invalid timeframe '2weeks', expected one of: 3months, 6months, 1year"
    );
}

#[tokio::test]
async fn test_capacity_plan_defaults_to_three_months() {
    let (app, _state) = setup_test_app().await;

    // No samples collected, so the plan list is empty but the request is valid
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/capacity-plan")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_thresholds_roundtrip() {
    let (app, _state) = setup_test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/thresholds")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let defaults = body_json(response).await;
    assert_eq!(defaults["cpu"]["warning"], 70.0);

    let overrides = json!({
        "cpu": { "warning": 60.0, "critical": 85.0, "scale_up": 75.0, "scale_down": 25.0 }
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/thresholds")
                .header("content-type", "application/json")
                .body(Body::from(overrides.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/thresholds")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let merged = body_json(response).await;
    // Only the supplied kind is replaced
    assert_eq!(merged["cpu"]["warning"], 60.0);
    assert_eq!(merged["memory"]["warning"], 75.0);
}
