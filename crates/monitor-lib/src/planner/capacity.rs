//! Multi-horizon capacity planning
//!
//! Projects current utilization forward using the computed trend and
//! recommends physical capacity with headroom when the projection crosses
//! the planning threshold. Cost impact is a deterministic, nonnegative
//! policy of the capacity delta; real pricing backends are out of scope.

use tracing::debug;

use crate::models::{
    CapacityPlan, MetricSample, ResourceKind, Timeframe, NOMINAL_LINK_MBPS,
};

use super::ResourceTrends;

/// Minimum samples before a plan is produced
pub const MIN_PLAN_SAMPLES: usize = 20;

/// Projected usage above this percentage triggers a capacity step
pub const PLANNING_THRESHOLD_PERCENT: f64 = 80.0;

/// Headroom multiplier applied to current physical capacity
pub const HEADROOM_FACTOR: f64 = 1.5;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Cost policy: (resource kind, capacity delta in native units) ->
/// estimated monthly cost, always nonnegative
pub type CostPolicy = Box<dyn Fn(ResourceKind, f64) -> f64 + Send + Sync>;

/// Default monthly rates applied to the capacity delta:
/// $24 per CPU core, $4 per GiB of memory, $0.08 per GiB of storage,
/// $90 per Gbps of network capacity.
fn default_cost(kind: ResourceKind, delta: f64) -> f64 {
    let delta = delta.max(0.0);
    match kind {
        ResourceKind::Cpu => delta * 24.0,
        ResourceKind::Memory => delta / GIB * 4.0,
        ResourceKind::Storage => delta / GIB * 0.08,
        ResourceKind::Network => delta / 1000.0 * 90.0,
    }
}

/// Projects future usage and recommended capacity per timeframe horizon
pub struct CapacityPlanner {
    min_samples: usize,
    planning_threshold: f64,
    headroom_factor: f64,
    cost: CostPolicy,
}

impl CapacityPlanner {
    pub fn new() -> Self {
        Self {
            min_samples: MIN_PLAN_SAMPLES,
            planning_threshold: PLANNING_THRESHOLD_PERCENT,
            headroom_factor: HEADROOM_FACTOR,
            cost: Box::new(default_cost),
        }
    }

    /// Replace the cost policy
    pub fn with_cost_policy(mut self, policy: CostPolicy) -> Self {
        self.cost = policy;
        self
    }

    pub fn with_planning_threshold(mut self, threshold_percent: f64) -> Self {
        self.planning_threshold = threshold_percent;
        self
    }

    /// Generate a plan for every resource kind at the given horizon.
    ///
    /// Fewer than `min_samples` samples yields an empty list. Projected
    /// usage is deliberately not clamped at 100: values above it are the
    /// over-capacity signal the plan exists to surface.
    pub fn plan(
        &self,
        samples: &[MetricSample],
        trends: &ResourceTrends,
        timeframe: Timeframe,
    ) -> Vec<CapacityPlan> {
        if samples.len() < self.min_samples {
            debug!(
                samples = samples.len(),
                required = self.min_samples,
                "Insufficient history for capacity planning"
            );
            return Vec::new();
        }
        let Some(latest) = samples.last() else {
            return Vec::new();
        };

        let periods = timeframe.periods() as f64;

        ResourceKind::ALL
            .iter()
            .map(|&kind| {
                let current_usage = latest.usage(kind);
                let growth_rate = trends.get(kind);
                let projected = current_usage + growth_rate * periods;

                let current_capacity = physical_capacity(latest, kind);
                let recommended_capacity = if projected > self.planning_threshold {
                    step_up_capacity(kind, current_capacity, self.headroom_factor)
                } else {
                    current_capacity
                };

                let delta = (recommended_capacity - current_capacity).max(0.0);
                CapacityPlan {
                    resource: kind,
                    timeframe,
                    current_usage,
                    projected_usage: projected,
                    growth_rate_per_period: growth_rate,
                    recommended_capacity,
                    cost_impact: (self.cost)(kind, delta).max(0.0),
                }
            })
            .collect()
    }
}

impl Default for CapacityPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Current physical capacity of a resource kind, in its native unit
fn physical_capacity(sample: &MetricSample, kind: ResourceKind) -> f64 {
    match kind {
        ResourceKind::Cpu => sample.cpu.cores as f64,
        ResourceKind::Memory => sample.memory.total_bytes as f64,
        ResourceKind::Network => NOMINAL_LINK_MBPS,
        ResourceKind::Storage => sample.storage.total_bytes as f64,
    }
}

/// Headroom step: CPU rounds up to the next whole core tier, the
/// byte/bandwidth kinds scale by the headroom factor directly
fn step_up_capacity(kind: ResourceKind, current: f64, factor: f64) -> f64 {
    match kind {
        ResourceKind::Cpu => (current * factor).ceil(),
        _ => current * factor,
    }
}
