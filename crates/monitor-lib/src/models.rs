//! Core data models for the capacity monitor

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Resource dimensions tracked by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Cpu,
    Memory,
    Network,
    Storage,
}

impl ResourceKind {
    /// All tracked resource kinds, in evaluation order
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Cpu,
        ResourceKind::Memory,
        ResourceKind::Network,
        ResourceKind::Storage,
    ];
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Cpu => write!(f, "cpu"),
            ResourceKind::Memory => write!(f, "memory"),
            ResourceKind::Network => write!(f, "network"),
            ResourceKind::Storage => write!(f, "storage"),
        }
    }
}

/// Nominal link capacity used to express network bandwidth as a percentage
pub const NOMINAL_LINK_MBPS: f64 = 1000.0;

/// Compute reading for one sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuMetrics {
    pub usage_percent: f64,
    pub cores: u32,
    pub load_average: [f64; 3],
    pub process_count: u32,
}

/// Memory reading for one sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub percent: f64,
    pub swap_used_bytes: u64,
    pub swap_total_bytes: u64,
}

/// Network reading for one sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub bandwidth_mbps: f64,
    pub latency_ms: f64,
    pub connection_type: String,
}

/// Storage reading for one sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageMetrics {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub percent: f64,
    pub read_mbps: f64,
    pub write_mbps: f64,
}

/// One multi-dimensional utilization sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub cpu: CpuMetrics,
    pub memory: MemoryMetrics,
    pub network: NetworkMetrics,
    pub storage: StorageMetrics,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

impl MetricSample {
    /// Canonical utilization percentage for a resource kind.
    ///
    /// Network carries no native percentage, so utilization is bandwidth
    /// against a nominal 1 Gbps link, clamped to [0, 100].
    pub fn usage(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Cpu => self.cpu.usage_percent,
            ResourceKind::Memory => self.memory.percent,
            ResourceKind::Network => {
                (self.network.bandwidth_mbps / NOMINAL_LINK_MBPS * 100.0).clamp(0.0, 100.0)
            }
            ResourceKind::Storage => self.storage.percent,
        }
    }
}

/// Warning/critical/scaling boundaries for one resource kind, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceThresholds {
    pub warning: f64,
    pub critical: f64,
    pub scale_up: f64,
    pub scale_down: f64,
}

/// Active thresholds for all resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub cpu: ResourceThresholds,
    pub memory: ResourceThresholds,
    pub network: ResourceThresholds,
    pub storage: ResourceThresholds,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            cpu: ResourceThresholds {
                warning: 70.0,
                critical: 90.0,
                scale_up: 80.0,
                scale_down: 30.0,
            },
            memory: ResourceThresholds {
                warning: 75.0,
                critical: 90.0,
                scale_up: 85.0,
                scale_down: 40.0,
            },
            network: ResourceThresholds {
                warning: 70.0,
                critical: 85.0,
                scale_up: 75.0,
                scale_down: 25.0,
            },
            storage: ResourceThresholds {
                warning: 80.0,
                critical: 95.0,
                scale_up: 85.0,
                scale_down: 30.0,
            },
        }
    }
}

impl ThresholdSet {
    pub fn get(&self, kind: ResourceKind) -> ResourceThresholds {
        match kind {
            ResourceKind::Cpu => self.cpu,
            ResourceKind::Memory => self.memory,
            ResourceKind::Network => self.network,
            ResourceKind::Storage => self.storage,
        }
    }

    /// Merge partial overrides, replacing only the supplied kinds
    pub fn merge(&mut self, overrides: ThresholdOverrides) {
        if let Some(cpu) = overrides.cpu {
            self.cpu = cpu;
        }
        if let Some(memory) = overrides.memory {
            self.memory = memory;
        }
        if let Some(network) = overrides.network {
            self.network = network;
        }
        if let Some(storage) = overrides.storage {
            self.storage = storage;
        }
    }
}

/// Partial threshold update; `None` leaves a kind untouched
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ThresholdOverrides {
    pub cpu: Option<ResourceThresholds>,
    pub memory: Option<ResourceThresholds>,
    pub network: Option<ResourceThresholds>,
    pub storage: Option<ResourceThresholds>,
}

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// A threshold breach notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub resource: ResourceKind,
    pub severity: AlertSeverity,
    /// The boundary that was crossed, in percent
    pub threshold: f64,
    /// Utilization at the time of the breach, in percent
    pub current_value: f64,
    pub message: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    pub resolved: bool,
}

/// Advisory action a recommendation suggests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationAction {
    ScaleUp,
    ScaleDown,
    OptimizeNetwork,
    OptimizeStorage,
}

impl std::fmt::Display for RecommendationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationAction::ScaleUp => write!(f, "scale-up"),
            RecommendationAction::ScaleDown => write!(f, "scale-down"),
            RecommendationAction::OptimizeNetwork => write!(f, "optimize-network"),
            RecommendationAction::OptimizeStorage => write!(f, "optimize-storage"),
        }
    }
}

/// Recommendation urgency, ordered from most to least urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank; lower sorts first
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

/// A ranked scaling or optimization suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub resource: ResourceKind,
    pub action: RecommendationAction,
    pub priority: Priority,
    /// Ranking confidence in [0, 100]; never gates emission
    pub confidence: f64,
    pub rationale: String,
}

/// Planning horizon for capacity projections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "1year")]
    OneYear,
}

impl Timeframe {
    /// Number of monthly periods the projection spans
    pub fn periods(&self) -> u32 {
        match self {
            Timeframe::ThreeMonths => 3,
            Timeframe::SixMonths => 6,
            Timeframe::OneYear => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::ThreeMonths => "3months",
            Timeframe::SixMonths => "6months",
            Timeframe::OneYear => "1year",
        }
    }
}

impl std::str::FromStr for Timeframe {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3months" => Ok(Timeframe::ThreeMonths),
            "6months" => Ok(Timeframe::SixMonths),
            "1year" => Ok(Timeframe::OneYear),
            other => Err(MonitorError::InvalidTimeframe(other.to_string())),
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projected future requirement for one resource kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityPlan {
    pub resource: ResourceKind,
    pub timeframe: Timeframe,
    /// Latest observed utilization, in percent
    pub current_usage: f64,
    /// Projected utilization at the horizon; deliberately not clamped at 100
    pub projected_usage: f64,
    pub growth_rate_per_period: f64,
    /// Recommended physical capacity in the kind's native unit
    /// (cores for CPU, bytes for memory/storage, Mbps for network)
    pub recommended_capacity: f64,
    /// Estimated monthly cost delta, always nonnegative
    pub cost_impact: f64,
}
