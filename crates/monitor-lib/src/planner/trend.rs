//! Usage trend computation
//!
//! The trend is the endpoint first-difference of a resource's utilization
//! across the retained window, normalized by window length: percentage
//! points per sample. This is deliberately not a regression; the sign
//! feeds the recommendation rules and the magnitude feeds confidence
//! scoring.

use serde::{Deserialize, Serialize};

use crate::models::{MetricSample, ResourceKind};

/// Minimum samples before trends are reported
pub const MIN_TREND_SAMPLES: usize = 10;

/// Per-resource utilization trend, in percentage points per sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceTrends {
    pub cpu: f64,
    pub memory: f64,
    pub network: f64,
    pub storage: f64,
}

impl ResourceTrends {
    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Cpu => self.cpu,
            ResourceKind::Memory => self.memory,
            ResourceKind::Network => self.network,
            ResourceKind::Storage => self.storage,
        }
    }
}

/// Computes normalized usage trends from a history snapshot
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    min_samples: usize,
}

impl TrendAnalyzer {
    pub fn new(min_samples: usize) -> Self {
        Self { min_samples }
    }

    /// Calculate trends for all resource kinds.
    ///
    /// Fewer than `min_samples` samples is an insufficient-data condition,
    /// not an error: all trends are zero.
    pub fn calculate(&self, samples: &[MetricSample]) -> ResourceTrends {
        if samples.len() < self.min_samples {
            return ResourceTrends::default();
        }

        ResourceTrends {
            cpu: self.first_difference(samples, ResourceKind::Cpu),
            memory: self.first_difference(samples, ResourceKind::Memory),
            network: self.first_difference(samples, ResourceKind::Network),
            storage: self.first_difference(samples, ResourceKind::Storage),
        }
    }

    fn first_difference(&self, samples: &[MetricSample], kind: ResourceKind) -> f64 {
        let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
            return 0.0;
        };
        (last.usage(kind) - first.usage(kind)) / samples.len() as f64
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(MIN_TREND_SAMPLES)
    }
}
