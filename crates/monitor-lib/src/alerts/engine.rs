//! Alert creation, deduplication and resolution

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tracing::{debug, info};

use crate::models::{Alert, AlertSeverity, MetricSample, ResourceKind, ThresholdSet};

use super::{AlertCallback, SubscriberRegistry, Subscription};

/// Default maximum number of retained alerts, resolved or not
pub const MAX_ALERTS: usize = 50;

/// Creates, dedupes and resolves threshold alerts
pub struct AlertEngine {
    /// Alerts in creation order, which is also timestamp order
    alerts: RwLock<VecDeque<Alert>>,
    max_alerts: usize,
    next_id: AtomicU64,
    subscribers: SubscriberRegistry,
}

impl AlertEngine {
    pub fn new(max_alerts: usize) -> Self {
        Self {
            alerts: RwLock::new(VecDeque::new()),
            max_alerts,
            next_id: AtomicU64::new(1),
            subscribers: SubscriberRegistry::new(),
        }
    }

    /// Evaluate a sample against the active thresholds.
    ///
    /// At most one unresolved alert may exist per (resource, severity); a
    /// repeated breach while one is outstanding is suppressed without
    /// notifying subscribers. Returns the alerts created by this call.
    pub fn check_thresholds(&self, sample: &MetricSample, thresholds: &ThresholdSet) -> Vec<Alert> {
        let mut created = Vec::new();

        for kind in ResourceKind::ALL {
            let usage = sample.usage(kind);
            let bounds = thresholds.get(kind);

            let breach = if usage >= bounds.critical {
                Some((AlertSeverity::Critical, bounds.critical))
            } else if usage >= bounds.warning {
                Some((AlertSeverity::Warning, bounds.warning))
            } else {
                None
            };

            let Some((severity, threshold)) = breach else {
                continue;
            };

            let mut alerts = self.alerts.write().unwrap();
            let duplicate = alerts
                .iter()
                .any(|a| !a.resolved && a.resource == kind && a.severity == severity);
            if duplicate {
                debug!(resource = %kind, severity = %severity, "Suppressing duplicate alert");
                continue;
            }

            let alert = Alert {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                resource: kind,
                severity,
                threshold,
                current_value: usage,
                message: format!(
                    "{} usage {:.1}% exceeded {} threshold {:.1}%",
                    kind, usage, severity, threshold
                ),
                timestamp: sample.timestamp,
                resolved: false,
            };

            while alerts.len() >= self.max_alerts {
                alerts.pop_front();
            }
            alerts.push_back(alert.clone());
            drop(alerts);

            info!(
                alert_id = alert.id,
                resource = %kind,
                severity = %severity,
                usage = usage,
                "Alert raised"
            );
            crate::observability::metrics().inc_alerts_emitted(&severity.to_string());
            self.subscribers.notify(&alert);
            created.push(alert);
        }

        created
    }

    /// Mark an alert resolved; unknown ids are a no-op
    pub fn resolve(&self, id: u64) {
        let mut alerts = self.alerts.write().unwrap();
        if let Some(alert) = alerts.iter_mut().find(|a| a.id == id) {
            if !alert.resolved {
                alert.resolved = true;
                info!(alert_id = id, resource = %alert.resource, "Alert resolved");
            }
        }
    }

    /// Snapshot of retained alerts, unresolved only unless requested
    pub fn alerts(&self, include_resolved: bool) -> Vec<Alert> {
        self.alerts
            .read()
            .unwrap()
            .iter()
            .filter(|a| include_resolved || !a.resolved)
            .cloned()
            .collect()
    }

    /// Number of unresolved alerts
    pub fn active_count(&self) -> usize {
        self.alerts
            .read()
            .unwrap()
            .iter()
            .filter(|a| !a.resolved)
            .count()
    }

    pub fn subscribe(&self, callback: AlertCallback) -> Subscription {
        self.subscribers.subscribe(callback)
    }

    /// Drop all alerts and subscriber registrations
    pub fn clear(&self) {
        self.alerts.write().unwrap().clear();
        self.subscribers.clear();
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new(MAX_ALERTS)
    }
}
