//! Interface health analytics -- flapping detection, stability scoring,
//! dashboard aggregation.
//!
//! Everything in this module is synchronous and side-effect-free: each
//! function takes an in-memory batch of [`EventRecord`]s and returns a fresh
//! result. Records missing a field required by a given analysis are silently
//! excluded from that analysis; dirty log data never aborts a batch.
//! Grouping uses `BTreeMap` so output order is independent of input order.
//!
//! [`EventRecord`]: crate::event::EventRecord

pub mod flapping;
pub mod metrics;
pub mod stability;

pub use flapping::{detect_flapping, FlapParams, FlappingReport};
pub use metrics::{calculate_metrics, DashboardMetrics};
pub use stability::{analyze_stability, StabilityMetric, StabilityParams};

use thiserror::Error;

/// Rejected analysis parameters. Data-quality problems never raise; this
/// only fires for caller mistakes, which belong at the input boundary.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding() {
        assert_eq!(round1(74.96), 75.0);
        assert_eq!(round1(0.04), 0.0);
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(28.9999), 29.0);
    }
}
