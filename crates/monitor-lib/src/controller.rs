//! Monitoring controller
//!
//! Owns the bounded history, the active thresholds, the alert engine and
//! the cached recommendation list, and drives the periodic sampling loop.
//! Ticks are serialized through an async gate; read operations work on
//! owned snapshots and never block the loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::alerts::{AlertCallback, AlertEngine, Subscription, MAX_ALERTS};
use crate::history::{MetricHistory, MAX_SAMPLES};
use crate::models::{
    Alert, CapacityPlan, MetricSample, Recommendation, ThresholdOverrides, ThresholdSet,
    Timeframe,
};
use crate::observability;
use crate::planner::{CapacityPlanner, RecommendationEngine, ResourceTrends, TrendAnalyzer};
use crate::probe::{self, MetricsProbe};

/// Configuration for the sampling loop
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    /// Sampling interval (default: 5 seconds)
    pub interval: Duration,
    /// Maximum retained samples (default: 500)
    pub max_samples: usize,
    /// Maximum retained alerts (default: 50)
    pub max_alerts: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_samples: MAX_SAMPLES,
            max_alerts: MAX_ALERTS,
        }
    }
}

struct ControllerInner {
    probe: Arc<dyn MetricsProbe>,
    history: RwLock<MetricHistory>,
    thresholds: RwLock<ThresholdSet>,
    alerts: AlertEngine,
    recommendations: RwLock<Vec<Recommendation>>,
    trend: TrendAnalyzer,
    recommender: RecommendationEngine,
    planner: CapacityPlanner,
    /// Set by destroy(); every tick checks it under the gate, so no tick
    /// effect can land after destroy() returns
    destroyed: AtomicBool,
    /// Serializes tick mutation of history and alerts
    tick_gate: tokio::sync::Mutex<()>,
}

impl ControllerInner {
    async fn tick(inner: &Arc<ControllerInner>) {
        let _gate = inner.tick_gate.lock().await;
        if inner.destroyed.load(Ordering::Acquire) {
            return;
        }

        let start = Instant::now();
        // Keep timestamps strictly increasing even when two ticks land in
        // the same millisecond.
        let timestamp = {
            let history = inner.history.read().unwrap();
            let now = Utc::now().timestamp_millis();
            match history.latest() {
                Some(newest) => now.max(newest.timestamp + 1),
                None => now,
            }
        };
        let sample = probe::build_sample(inner.probe.as_ref(), timestamp).await;

        let snapshot = {
            let mut history = inner.history.write().unwrap();
            if history.push(sample.clone()) {
                observability::metrics().inc_samples_collected();
            }
            observability::metrics().set_history_samples(history.len());
            history.snapshot()
        };

        let thresholds = *inner.thresholds.read().unwrap();
        inner.alerts.check_thresholds(&sample, &thresholds);
        observability::metrics().set_active_alerts(inner.alerts.active_count());

        let trends = inner.trend.calculate(&snapshot);
        let recommendations = inner.recommender.generate(&snapshot, &thresholds, &trends);
        *inner.recommendations.write().unwrap() = recommendations;

        observability::metrics().observe_tick_duration(start.elapsed().as_secs_f64());
    }
}

struct MonitorTask {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

/// Orchestrates sampling, alerting, trends and planning for one monitor
/// instance. Construct explicitly and share via `Arc`; there is no
/// process-wide instance.
pub struct MonitoringController {
    inner: Arc<ControllerInner>,
    config: SamplingConfig,
    task: Mutex<Option<MonitorTask>>,
}

impl MonitoringController {
    pub fn new(probe: Arc<dyn MetricsProbe>, config: SamplingConfig) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                probe,
                history: RwLock::new(MetricHistory::new(config.max_samples)),
                thresholds: RwLock::new(ThresholdSet::default()),
                alerts: AlertEngine::new(config.max_alerts),
                recommendations: RwLock::new(Vec::new()),
                trend: TrendAnalyzer::default(),
                recommender: RecommendationEngine::default(),
                planner: CapacityPlanner::default(),
                destroyed: AtomicBool::new(false),
                tick_gate: tokio::sync::Mutex::new(()),
            }),
            config,
            task: Mutex::new(None),
        }
    }

    pub fn builder() -> MonitoringControllerBuilder {
        MonitoringControllerBuilder::new()
    }

    /// Begin periodic sampling at the configured interval.
    ///
    /// Idempotent: calling while already running is a logged no-op and
    /// never creates a second timer.
    pub fn start_monitoring(&self) {
        self.start_monitoring_with(self.config.interval);
    }

    /// Begin periodic sampling at an explicit interval
    pub fn start_monitoring_with(&self, period: Duration) {
        let mut slot = self.task.lock().unwrap();
        if let Some(task) = slot.as_ref() {
            if !task.handle.is_finished() {
                debug!("Monitoring already running, ignoring start");
                return;
            }
        }
        if self.inner.destroyed.load(Ordering::Acquire) {
            debug!("Monitor destroyed, ignoring start");
            return;
        }

        info!(interval_ms = period.as_millis() as u64, "Starting sampling loop");
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        ControllerInner::tick(&inner).await;
                    }
                    _ = shutdown_rx.changed() => {
                        info!("Shutting down sampling loop");
                        break;
                    }
                }
            }
        });

        *slot = Some(MonitorTask {
            handle,
            shutdown: shutdown_tx,
        });
    }

    /// Stop periodic sampling and wait for any in-flight tick to finish.
    /// Idempotent no-op when not running.
    pub async fn stop_monitoring(&self) {
        let task = self.task.lock().unwrap().take();
        if let Some(task) = task {
            let _ = task.shutdown.send(true);
            let _ = task.handle.await;
            info!("Monitoring stopped");
        }
    }

    /// Whether the sampling loop is currently running
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Run exactly one sampling tick. Used by the binary for warmup and by
    /// tests; subject to the same gate and destroy check as the loop.
    pub async fn sample_once(&self) {
        ControllerInner::tick(&self.inner).await;
    }

    /// Drop retained samples older than `max_age`
    pub fn cleanup(&self, max_age: Duration) {
        let now = Utc::now().timestamp_millis();
        self.inner.history.write().unwrap().cleanup(now, max_age);
    }

    /// Stop monitoring and clear history, alerts, cached recommendations
    /// and all subscriber registrations. After this returns, no pending
    /// timer can mutate state or fire a callback.
    pub async fn destroy(&self) {
        self.inner.destroyed.store(true, Ordering::Release);
        self.stop_monitoring().await;

        let _gate = self.inner.tick_gate.lock().await;
        self.inner.history.write().unwrap().clear();
        self.inner.alerts.clear();
        self.inner.recommendations.write().unwrap().clear();
        observability::metrics().set_history_samples(0);
        observability::metrics().set_active_alerts(0);
        info!("Monitor destroyed");
    }

    /// Most recent sample, if any
    pub fn current_metrics(&self) -> Option<MetricSample> {
        self.inner.history.read().unwrap().latest().cloned()
    }

    /// Snapshot of retained samples, oldest first; `limit` keeps only the
    /// most recent entries
    pub fn historical_metrics(&self, limit: Option<usize>) -> Vec<MetricSample> {
        let history = self.inner.history.read().unwrap();
        match limit {
            Some(limit) => history.snapshot_tail(limit),
            None => history.snapshot(),
        }
    }

    /// Number of retained samples
    pub fn history_len(&self) -> usize {
        self.inner.history.read().unwrap().len()
    }

    /// Snapshot of alerts, unresolved only unless requested
    pub fn alerts(&self, include_resolved: bool) -> Vec<Alert> {
        self.inner.alerts.alerts(include_resolved)
    }

    /// Mark an alert resolved; unknown ids are a no-op
    pub fn resolve_alert(&self, id: u64) {
        self.inner.alerts.resolve(id);
        observability::metrics().set_active_alerts(self.inner.alerts.active_count());
    }

    /// Register an alert subscriber; the handle unsubscribes exactly this
    /// registration
    pub fn on_alert(&self, callback: AlertCallback) -> Subscription {
        self.inner.alerts.subscribe(callback)
    }

    /// Merge partial threshold overrides into the active set
    pub fn update_thresholds(&self, overrides: ThresholdOverrides) {
        let mut thresholds = self.inner.thresholds.write().unwrap();
        thresholds.merge(overrides);
        info!(thresholds = ?*thresholds, "Thresholds updated");
    }

    /// Copy of the active threshold set
    pub fn thresholds(&self) -> ThresholdSet {
        *self.inner.thresholds.read().unwrap()
    }

    /// Current per-resource usage trends
    pub fn resource_trends(&self) -> ResourceTrends {
        let snapshot = self.inner.history.read().unwrap().snapshot();
        self.inner.trend.calculate(&snapshot)
    }

    /// The recommendation list computed by the most recent tick
    pub fn scaling_recommendations(&self) -> Vec<Recommendation> {
        self.inner.recommendations.read().unwrap().clone()
    }

    /// Capacity plans for the given horizon, derived from the current
    /// history snapshot
    pub fn generate_capacity_plan(&self, timeframe: Timeframe) -> Vec<CapacityPlan> {
        let snapshot = self.inner.history.read().unwrap().snapshot();
        let trends = self.inner.trend.calculate(&snapshot);
        self.inner.planner.plan(&snapshot, &trends, timeframe)
    }
}

/// Builder for a monitoring controller
pub struct MonitoringControllerBuilder {
    probe: Option<Arc<dyn MetricsProbe>>,
    config: SamplingConfig,
    thresholds: Option<ThresholdSet>,
    recommender: Option<RecommendationEngine>,
    planner: Option<CapacityPlanner>,
}

impl MonitoringControllerBuilder {
    pub fn new() -> Self {
        Self {
            probe: None,
            config: SamplingConfig::default(),
            thresholds: None,
            recommender: None,
            planner: None,
        }
    }

    pub fn probe(mut self, probe: Arc<dyn MetricsProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    pub fn max_samples(mut self, max_samples: usize) -> Self {
        self.config.max_samples = max_samples;
        self
    }

    pub fn max_alerts(mut self, max_alerts: usize) -> Self {
        self.config.max_alerts = max_alerts;
        self
    }

    pub fn thresholds(mut self, thresholds: ThresholdSet) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn recommender(mut self, recommender: RecommendationEngine) -> Self {
        self.recommender = Some(recommender);
        self
    }

    pub fn planner(mut self, planner: CapacityPlanner) -> Self {
        self.planner = Some(planner);
        self
    }

    pub fn build(self) -> Result<MonitoringController> {
        let probe = self
            .probe
            .ok_or_else(|| anyhow::anyhow!("Probe is required"))?;

        Ok(MonitoringController {
            inner: Arc::new(ControllerInner {
                probe,
                history: RwLock::new(MetricHistory::new(self.config.max_samples)),
                thresholds: RwLock::new(self.thresholds.unwrap_or_default()),
                alerts: AlertEngine::new(self.config.max_alerts),
                recommendations: RwLock::new(Vec::new()),
                trend: TrendAnalyzer::default(),
                recommender: self.recommender.unwrap_or_default(),
                planner: self.planner.unwrap_or_default(),
                destroyed: AtomicBool::new(false),
                tick_gate: tokio::sync::Mutex::new(()),
            }),
            config: self.config.clone(),
            task: Mutex::new(None),
        })
    }
}

impl Default for MonitoringControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CpuMetrics, MemoryMetrics, NetworkMetrics, StorageMetrics};
    use crate::probe::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Probe returning a fixed CPU reading, counting invocations
    struct FixedProbe {
        cpu_percent: f64,
        calls: AtomicUsize,
    }

    impl FixedProbe {
        fn new(cpu_percent: f64) -> Self {
            Self {
                cpu_percent,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MetricsProbe for FixedProbe {
        async fn sample_cpu(&self) -> Result<CpuMetrics> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CpuMetrics {
                usage_percent: self.cpu_percent,
                cores: 4,
                ..Default::default()
            })
        }

        async fn sample_memory(&self) -> Result<MemoryMetrics> {
            Ok(MemoryMetrics::default())
        }

        async fn sample_network(&self) -> Result<NetworkMetrics> {
            Ok(NetworkMetrics::default())
        }

        async fn sample_storage(&self) -> Result<StorageMetrics> {
            Ok(StorageMetrics::default())
        }
    }

    fn controller_with(cpu_percent: f64) -> MonitoringController {
        MonitoringController::builder()
            .probe(Arc::new(FixedProbe::new(cpu_percent)))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_sample_once_appends_history() {
        let controller = controller_with(40.0);

        controller.sample_once().await;
        controller.sample_once().await;

        assert_eq!(controller.history_len(), 2);
        let current = controller.current_metrics().unwrap();
        assert_eq!(current.cpu.usage_percent, 40.0);
    }

    #[tokio::test]
    async fn test_start_monitoring_idempotent() {
        let controller = controller_with(40.0);

        controller.start_monitoring_with(Duration::from_millis(10));
        controller.start_monitoring_with(Duration::from_millis(10));
        assert!(controller.is_running());

        tokio::time::sleep(Duration::from_millis(60)).await;
        controller.stop_monitoring().await;
        assert!(!controller.is_running());

        let len = controller.history_len();
        assert!(len >= 1);

        // No further ticks after stop returns
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(controller.history_len(), len);
    }

    #[tokio::test]
    async fn test_stop_monitoring_idempotent() {
        let controller = controller_with(40.0);
        controller.stop_monitoring().await;
        controller.stop_monitoring().await;
    }

    #[tokio::test]
    async fn test_tick_raises_alert_through_engine() {
        let controller = controller_with(95.0);

        controller.sample_once().await;

        let alerts = controller.alerts(false);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, crate::models::AlertSeverity::Critical);
    }

    #[tokio::test]
    async fn test_destroyed_timer_fire_is_inert() {
        let controller = controller_with(95.0);
        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        let _sub = controller.on_alert(Box::new(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        }));

        controller.sample_once().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        controller.destroy().await;

        // Simulate a pending timer firing after destroy
        controller.sample_once().await;

        assert_eq!(controller.history_len(), 0);
        assert!(controller.alerts(true).is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_start_after_destroy_ignored() {
        let controller = controller_with(40.0);
        controller.destroy().await;

        controller.start_monitoring_with(Duration::from_millis(10));
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn test_update_thresholds_merge() {
        let controller = controller_with(40.0);
        let before = controller.thresholds();

        controller.update_thresholds(ThresholdOverrides {
            cpu: Some(crate::models::ResourceThresholds {
                warning: 60.0,
                critical: 80.0,
                scale_up: 70.0,
                scale_down: 20.0,
            }),
            ..Default::default()
        });

        let after = controller.thresholds();
        assert_eq!(after.cpu.warning, 60.0);
        assert_eq!(after.memory, before.memory);
        assert_eq!(after.network, before.network);
        assert_eq!(after.storage, before.storage);
    }

    #[tokio::test]
    async fn test_historical_metrics_limit() {
        let controller = controller_with(40.0);
        for _ in 0..5 {
            controller.sample_once().await;
        }
        let full = controller.historical_metrics(None);
        let tail = controller.historical_metrics(Some(2));

        assert_eq!(full.len(), 5);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail.last().unwrap(), full.last().unwrap());
    }

    #[tokio::test]
    async fn test_capacity_plan_empty_until_enough_history() {
        let controller = controller_with(40.0);
        controller.sample_once().await;

        assert!(controller
            .generate_capacity_plan(Timeframe::ThreeMonths)
            .is_empty());
    }
}
