//! Subscriber registry for alert delivery
//!
//! Subscriptions are keyed by a monotonically increasing id rather than by
//! closure identity, so unsubscribing removes exactly one registration.
//! Delivery is synchronous within the tick that created the alert; a
//! panicking subscriber is isolated and never blocks the others.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::warn;

use crate::models::Alert;

/// Callback invoked with each newly created alert
pub type AlertCallback = Box<dyn Fn(&Alert) + Send + Sync>;

/// Registry of alert subscribers
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: Arc<DashMap<u64, AlertCallback>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; the returned handle removes exactly this entry
    pub fn subscribe(&self, callback: AlertCallback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(id, callback);
        Subscription {
            id,
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Deliver an alert to every subscriber, isolating panics per callback
    pub fn notify(&self, alert: &Alert) {
        for entry in self.subscribers.iter() {
            let result = catch_unwind(AssertUnwindSafe(|| (entry.value())(alert)));
            if result.is_err() {
                warn!(
                    subscription_id = *entry.key(),
                    alert_id = alert.id,
                    "Alert subscriber panicked, continuing with remaining subscribers"
                );
            }
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Remove every registration
    pub fn clear(&self) {
        self.subscribers.clear();
    }
}

/// Opaque handle for one subscription
pub struct Subscription {
    id: u64,
    subscribers: Arc<DashMap<u64, AlertCallback>>,
}

impl Subscription {
    /// Remove this subscription; idempotent
    pub fn unsubscribe(&self) {
        self.subscribers.remove(&self.id);
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertSeverity, ResourceKind};
    use std::sync::atomic::AtomicUsize;

    fn test_alert() -> Alert {
        Alert {
            id: 1,
            resource: ResourceKind::Cpu,
            severity: AlertSeverity::Warning,
            threshold: 70.0,
            current_value: 75.0,
            message: "cpu usage 75.0% exceeded warning threshold 70.0%".to_string(),
            timestamp: 0,
            resolved: false,
        }
    }

    #[test]
    fn test_unsubscribe_removes_exactly_one() {
        let registry = SubscriberRegistry::new();
        let count_a = Arc::new(AtomicUsize::new(0));
        let count_b = Arc::new(AtomicUsize::new(0));

        let a = count_a.clone();
        let sub_a = registry.subscribe(Box::new(move |_| {
            a.fetch_add(1, Ordering::SeqCst);
        }));
        let b = count_b.clone();
        let _sub_b = registry.subscribe(Box::new(move |_| {
            b.fetch_add(1, Ordering::SeqCst);
        }));

        registry.notify(&test_alert());
        sub_a.unsubscribe();
        registry.notify(&test_alert());

        assert_eq!(count_a.load(Ordering::SeqCst), 1);
        assert_eq!(count_b.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_idempotent() {
        let registry = SubscriberRegistry::new();
        let sub = registry.subscribe(Box::new(|_| {}));

        sub.unsubscribe();
        sub.unsubscribe();

        assert!(registry.is_empty());
    }

    #[test]
    fn test_subscription_ids_are_distinct() {
        let registry = SubscriberRegistry::new();
        let sub_a = registry.subscribe(Box::new(|_| {}));
        let sub_b = registry.subscribe(Box::new(|_| {}));

        assert_ne!(sub_a.id(), sub_b.id());
        assert!(sub_b.id() > sub_a.id());
    }

    #[test]
    fn test_panicking_subscriber_isolated() {
        let registry = SubscriberRegistry::new();
        let delivered = Arc::new(AtomicUsize::new(0));

        registry.subscribe(Box::new(|_| panic!("subscriber failure")));
        let d = delivered.clone();
        registry.subscribe(Box::new(move |_| {
            d.fetch_add(1, Ordering::SeqCst);
        }));

        registry.notify(&test_alert());

        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }
}
