//! Trend analysis, scaling recommendations and capacity planning
//!
//! Everything in this module is a pure function of a history snapshot plus
//! the active thresholds; no state is mutated and results are recomputed
//! on each request.

mod capacity;
mod recommend;
mod trend;

pub use capacity::{CapacityPlanner, CostPolicy, HEADROOM_FACTOR, MIN_PLAN_SAMPLES};
pub use recommend::{ConfidencePolicy, RecommendationEngine, LATENCY_CEILING_MS};
pub use trend::{ResourceTrends, TrendAnalyzer, MIN_TREND_SAMPLES};
