//! Core library for the capacity monitor
//!
//! This crate provides the resource telemetry and capacity-planning engine:
//! - Periodic sampling orchestration over a pluggable probe
//! - Bounded in-memory sample history
//! - De-duplicated threshold alerts with subscriber delivery
//! - Usage trend computation
//! - Ranked scaling recommendations
//! - Multi-horizon capacity planning
//! - Health checks and Prometheus observability

pub mod alerts;
pub mod controller;
pub mod error;
pub mod health;
pub mod history;
pub mod models;
pub mod observability;
pub mod planner;
pub mod probe;

pub use alerts::{AlertEngine, SubscriberRegistry, Subscription, MAX_ALERTS};
pub use controller::{MonitoringController, MonitoringControllerBuilder, SamplingConfig};
pub use error::MonitorError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use history::{MetricHistory, MAX_SAMPLES};
pub use models::*;
pub use planner::{
    CapacityPlanner, RecommendationEngine, ResourceTrends, TrendAnalyzer, MIN_PLAN_SAMPLES,
    MIN_TREND_SAMPLES,
};
pub use probe::MetricsProbe;
