//! Synthetic metrics probe
//!
//! Platform collectors are external collaborators; this probe stands in
//! for them so the monitor pipeline can run end to end. Readings drift
//! smoothly over time around fixed baselines.

use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use monitor_lib::{CpuMetrics, MemoryMetrics, MetricsProbe, NetworkMetrics, StorageMetrics};

const GIB: u64 = 1024 * 1024 * 1024;

pub struct SyntheticProbe {
    started: Instant,
    cores: u32,
    memory_total: u64,
    storage_total: u64,
}

impl SyntheticProbe {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            cores: 8,
            memory_total: 32 * GIB,
            storage_total: 500 * GIB,
        }
    }

    /// Smooth oscillation around `base` with the given amplitude and
    /// period, clamped to [0, 100]
    fn drift(&self, base: f64, amplitude: f64, period_secs: f64) -> f64 {
        let t = self.started.elapsed().as_secs_f64();
        (base + amplitude * (t * std::f64::consts::TAU / period_secs).sin()).clamp(0.0, 100.0)
    }
}

impl Default for SyntheticProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricsProbe for SyntheticProbe {
    async fn sample_cpu(&self) -> Result<CpuMetrics> {
        let usage = self.drift(45.0, 20.0, 300.0);
        Ok(CpuMetrics {
            usage_percent: usage,
            cores: self.cores,
            load_average: [
                usage / 100.0 * self.cores as f64,
                usage / 110.0 * self.cores as f64,
                usage / 120.0 * self.cores as f64,
            ],
            process_count: 180,
        })
    }

    async fn sample_memory(&self) -> Result<MemoryMetrics> {
        let percent = self.drift(55.0, 10.0, 600.0);
        let used = (self.memory_total as f64 * percent / 100.0) as u64;
        Ok(MemoryMetrics {
            used_bytes: used,
            total_bytes: self.memory_total,
            available_bytes: self.memory_total - used,
            percent,
            swap_used_bytes: 0,
            swap_total_bytes: 2 * GIB,
        })
    }

    async fn sample_network(&self) -> Result<NetworkMetrics> {
        let utilization = self.drift(25.0, 15.0, 120.0);
        Ok(NetworkMetrics {
            bytes_received: (utilization * 1e6) as u64,
            bytes_sent: (utilization * 4e5) as u64,
            bandwidth_mbps: utilization * 10.0,
            latency_ms: 15.0 + utilization / 2.0,
            connection_type: "ethernet".to_string(),
        })
    }

    async fn sample_storage(&self) -> Result<StorageMetrics> {
        let percent = self.drift(60.0, 2.0, 3600.0);
        let used = (self.storage_total as f64 * percent / 100.0) as u64;
        Ok(StorageMetrics {
            used_bytes: used,
            total_bytes: self.storage_total,
            available_bytes: self.storage_total - used,
            percent,
            read_mbps: 480.0,
            write_mbps: 410.0,
        })
    }
}
