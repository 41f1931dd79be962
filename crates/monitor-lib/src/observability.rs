//! Observability infrastructure for the capacity monitor
//!
//! Prometheus instruments registered once per process behind a `OnceLock`,
//! exposed through a lightweight handle. The binary serves them at
//! `/metrics`.

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;

/// Histogram buckets for tick duration (in seconds)
const TICK_BUCKETS: &[f64] = &[0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5];

static GLOBAL_METRICS: OnceLock<MonitorMetrics> = OnceLock::new();

/// Handle to the process-wide monitor metrics
pub struct MonitorMetrics {
    samples_collected: IntCounter,
    probe_errors: IntCounterVec,
    alerts_emitted: IntCounterVec,
    active_alerts: IntGauge,
    history_samples: IntGauge,
    tick_duration_seconds: Histogram,
}

impl MonitorMetrics {
    fn new() -> Self {
        Self {
            samples_collected: register_int_counter!(
                "capacity_monitor_samples_collected_total",
                "Total number of metric samples appended to history"
            )
            .expect("Failed to register samples_collected_total"),

            probe_errors: register_int_counter_vec!(
                "capacity_monitor_probe_errors_total",
                "Probe failures degraded to zeroed readings, by dimension",
                &["dimension"]
            )
            .expect("Failed to register probe_errors_total"),

            alerts_emitted: register_int_counter_vec!(
                "capacity_monitor_alerts_emitted_total",
                "Threshold alerts created, by severity",
                &["severity"]
            )
            .expect("Failed to register alerts_emitted_total"),

            active_alerts: register_int_gauge!(
                "capacity_monitor_active_alerts",
                "Number of unresolved alerts"
            )
            .expect("Failed to register active_alerts"),

            history_samples: register_int_gauge!(
                "capacity_monitor_history_samples",
                "Number of samples in the bounded history window"
            )
            .expect("Failed to register history_samples"),

            tick_duration_seconds: register_histogram!(
                "capacity_monitor_tick_duration_seconds",
                "Time spent in one sampling tick",
                TICK_BUCKETS.to_vec()
            )
            .expect("Failed to register tick_duration_seconds"),
        }
    }

    pub fn inc_samples_collected(&self) {
        self.samples_collected.inc();
    }

    pub fn inc_probe_errors(&self, dimension: &str) {
        self.probe_errors.with_label_values(&[dimension]).inc();
    }

    pub fn inc_alerts_emitted(&self, severity: &str) {
        self.alerts_emitted.with_label_values(&[severity]).inc();
    }

    pub fn set_active_alerts(&self, count: usize) {
        self.active_alerts.set(count as i64);
    }

    pub fn set_history_samples(&self, count: usize) {
        self.history_samples.set(count as i64);
    }

    pub fn observe_tick_duration(&self, seconds: f64) {
        self.tick_duration_seconds.observe(seconds);
    }
}

/// Process-wide metrics handle; registers on first use
pub fn metrics() -> &'static MonitorMetrics {
    GLOBAL_METRICS.get_or_init(MonitorMetrics::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_once() {
        let first = metrics() as *const MonitorMetrics;
        let second = metrics() as *const MonitorMetrics;
        assert_eq!(first, second);
    }

    #[test]
    fn test_instrument_updates_do_not_panic() {
        let m = metrics();
        m.inc_samples_collected();
        m.inc_probe_errors("cpu");
        m.inc_alerts_emitted("warning");
        m.set_active_alerts(3);
        m.set_history_samples(120);
        m.observe_tick_duration(0.002);
    }
}
