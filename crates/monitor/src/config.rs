//! Monitor configuration

use anyhow::Result;
use serde::Deserialize;

/// Monitor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// API server port for health/metrics/query endpoints
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Sampling interval in seconds
    #[serde(default = "default_sample_interval")]
    pub sample_interval_secs: u64,

    /// Maximum retained samples
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,

    /// Maximum retained alerts
    #[serde(default = "default_max_alerts")]
    pub max_alerts: usize,

    /// Sample retention cutoff in seconds for periodic cleanup
    #[serde(default = "default_retention")]
    pub retention_secs: u64,
}

fn default_api_port() -> u16 {
    9600
}

fn default_sample_interval() -> u64 {
    5
}

fn default_max_samples() -> usize {
    500
}

fn default_max_alerts() -> usize {
    50
}

fn default_retention() -> u64 {
    60 * 60
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            sample_interval_secs: default_sample_interval(),
            max_samples: default_max_samples(),
            max_alerts: default_max_alerts(),
            retention_secs: default_retention(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from `MONITOR_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("MONITOR"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.api_port, 9600);
        assert_eq!(config.sample_interval_secs, 5);
        assert_eq!(config.max_samples, 500);
        assert_eq!(config.max_alerts, 50);
    }
}
