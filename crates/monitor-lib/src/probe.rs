//! Probe seam for platform metric sources
//!
//! Platform-specific collectors live outside this crate; the monitor only
//! depends on this trait. Each dimension can fail independently, and the
//! controller substitutes a zeroed reading for a failed dimension.

use crate::models::{CpuMetrics, MemoryMetrics, MetricSample, NetworkMetrics, StorageMetrics};
use anyhow::Result;
use tracing::warn;

pub use async_trait::async_trait;

/// Source of instantaneous resource readings
#[async_trait]
pub trait MetricsProbe: Send + Sync {
    async fn sample_cpu(&self) -> Result<CpuMetrics>;
    async fn sample_memory(&self) -> Result<MemoryMetrics>;
    async fn sample_network(&self) -> Result<NetworkMetrics>;
    async fn sample_storage(&self) -> Result<StorageMetrics>;
}

/// Build a full sample from the probe, degrading failed dimensions to
/// their zeroed defaults. Never fails.
pub async fn build_sample(probe: &dyn MetricsProbe, timestamp: i64) -> MetricSample {
    let cpu = match probe.sample_cpu().await {
        Ok(cpu) => cpu,
        Err(e) => {
            warn!(dimension = "cpu", error = %e, "Probe failed, using zeroed reading");
            crate::observability::metrics().inc_probe_errors("cpu");
            CpuMetrics::default()
        }
    };

    let memory = match probe.sample_memory().await {
        Ok(memory) => memory,
        Err(e) => {
            warn!(dimension = "memory", error = %e, "Probe failed, using zeroed reading");
            crate::observability::metrics().inc_probe_errors("memory");
            MemoryMetrics::default()
        }
    };

    let network = match probe.sample_network().await {
        Ok(network) => network,
        Err(e) => {
            warn!(dimension = "network", error = %e, "Probe failed, using zeroed reading");
            crate::observability::metrics().inc_probe_errors("network");
            NetworkMetrics::default()
        }
    };

    let storage = match probe.sample_storage().await {
        Ok(storage) => storage,
        Err(e) => {
            warn!(dimension = "storage", error = %e, "Probe failed, using zeroed reading");
            crate::observability::metrics().inc_probe_errors("storage");
            StorageMetrics::default()
        }
    };

    MetricSample {
        cpu,
        memory,
        network,
        storage,
        timestamp,
    }
}
