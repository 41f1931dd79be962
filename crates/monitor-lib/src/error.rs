//! Library error types
//!
//! Most operations are total: probe failures degrade to zeroed readings
//! and insufficient history yields empty or zero results. The only
//! condition surfaced to callers is an unsupported planning timeframe.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// An unsupported capacity-planning timeframe key was requested
    #[error("invalid timeframe '{0}', expected one of: 3months, 6months, 1year")]
    InvalidTimeframe(String),
}
