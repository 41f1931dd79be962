//! Alert lifecycle management
//!
//! This module provides:
//! - Threshold evaluation against incoming samples
//! - Deduplication of unresolved alerts per (resource, severity)
//! - Bounded alert retention with oldest-first eviction
//! - Synchronous, panic-isolated subscriber delivery

mod engine;
mod subscribers;

pub use engine::{AlertEngine, MAX_ALERTS};
pub use subscribers::{AlertCallback, SubscriberRegistry, Subscription};
