//! Scaling and optimization recommendations
//!
//! Derives ranked advisory actions from the most recent usage, the active
//! thresholds and the trend direction. Confidence is an injectable policy:
//! it orders recommendations but never gates emission.

use std::cmp::Ordering;

use crate::models::{
    MetricSample, Priority, Recommendation, RecommendationAction, ResourceKind,
    ResourceThresholds, ThresholdSet,
};

use super::ResourceTrends;

/// Network latency above this ceiling triggers an optimize-network
/// recommendation regardless of the generic thresholds
pub const LATENCY_CEILING_MS: f64 = 500.0;

/// Confidence scoring policy: (trend magnitude, distance from the
/// warning/critical band midpoint) -> confidence in [0, 100]
pub type ConfidencePolicy = Box<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// Default confidence: monotonically increasing in trend steepness and in
/// distance from the threshold midpoint, capped at 100
fn default_confidence(trend_magnitude: f64, midpoint_distance: f64) -> f64 {
    let base = 40.0;
    let steepness = (trend_magnitude.abs() * 8.0).min(30.0);
    let distance = (midpoint_distance.abs() * 0.6).min(30.0);
    (base + steepness + distance).min(100.0)
}

/// Derives ranked scaling recommendations from a history snapshot
pub struct RecommendationEngine {
    latency_ceiling_ms: f64,
    confidence: ConfidencePolicy,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self {
            latency_ceiling_ms: LATENCY_CEILING_MS,
            confidence: Box::new(default_confidence),
        }
    }

    /// Replace the confidence policy
    pub fn with_confidence_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.confidence = policy;
        self
    }

    pub fn with_latency_ceiling(mut self, ceiling_ms: f64) -> Self {
        self.latency_ceiling_ms = ceiling_ms;
        self
    }

    /// Generate recommendations, sorted by priority then descending
    /// confidence. An empty history yields an empty list.
    pub fn generate(
        &self,
        samples: &[MetricSample],
        thresholds: &ThresholdSet,
        trends: &ResourceTrends,
    ) -> Vec<Recommendation> {
        let Some(latest) = samples.last() else {
            return Vec::new();
        };

        let mut recommendations = Vec::new();

        for kind in ResourceKind::ALL {
            let usage = latest.usage(kind);
            let bounds = thresholds.get(kind);
            let trend = trends.get(kind);

            if usage >= bounds.scale_up && trend >= 0.0 {
                let priority = if usage >= bounds.critical {
                    Priority::Critical
                } else {
                    Priority::High
                };
                recommendations.push(Recommendation {
                    resource: kind,
                    action: RecommendationAction::ScaleUp,
                    priority,
                    confidence: self.score(trend, usage, &bounds),
                    rationale: format!(
                        "{} usage {:.1}% is at or above the scale-up threshold {:.1}% and not falling",
                        kind, usage, bounds.scale_up
                    ),
                });
            } else if usage <= bounds.scale_down && trend <= 0.0 {
                let priority = if usage <= bounds.scale_down / 2.0 {
                    Priority::Medium
                } else {
                    Priority::Low
                };
                recommendations.push(Recommendation {
                    resource: kind,
                    action: RecommendationAction::ScaleDown,
                    priority,
                    confidence: self.score(trend, usage, &bounds),
                    rationale: format!(
                        "{} usage {:.1}% is at or below the scale-down threshold {:.1}% and not rising",
                        kind, usage, bounds.scale_down
                    ),
                });
            }
        }

        if latest.network.latency_ms > self.latency_ceiling_ms {
            let bounds = thresholds.get(ResourceKind::Network);
            recommendations.push(Recommendation {
                resource: ResourceKind::Network,
                action: RecommendationAction::OptimizeNetwork,
                priority: Priority::High,
                confidence: self.score(
                    trends.network,
                    latest.usage(ResourceKind::Network),
                    &bounds,
                ),
                rationale: format!(
                    "network latency {:.0}ms exceeds the {:.0}ms ceiling",
                    latest.network.latency_ms, self.latency_ceiling_ms
                ),
            });
        }

        // Storage in the warning band but below scale-up: suggest
        // reclamation before buying capacity.
        let storage_usage = latest.usage(ResourceKind::Storage);
        let storage_bounds = thresholds.get(ResourceKind::Storage);
        if storage_usage >= storage_bounds.warning && storage_usage < storage_bounds.scale_up {
            recommendations.push(Recommendation {
                resource: ResourceKind::Storage,
                action: RecommendationAction::OptimizeStorage,
                priority: Priority::Medium,
                confidence: self.score(trends.storage, storage_usage, &storage_bounds),
                rationale: format!(
                    "storage usage {:.1}% is in the warning band; reclaim space before scaling",
                    storage_usage
                ),
            });
        }

        recommendations.sort_by(|a, b| {
            a.priority
                .rank()
                .cmp(&b.priority.rank())
                .then_with(|| {
                    b.confidence
                        .partial_cmp(&a.confidence)
                        .unwrap_or(Ordering::Equal)
                })
        });
        recommendations
    }

    fn score(&self, trend: f64, usage: f64, bounds: &ResourceThresholds) -> f64 {
        let midpoint = (bounds.warning + bounds.critical) / 2.0;
        (self.confidence)(trend.abs(), usage - midpoint)
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}
