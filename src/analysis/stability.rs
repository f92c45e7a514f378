//! Stability scoring -- composite 0-100 health metric per interface.

use crate::analysis::{round1, round2};
use crate::event::category::{is_config_event, is_down_event, is_up_event};
use crate::event::{EventRecord, InterfaceKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default analysis window in hours.
pub const DEFAULT_TIME_WINDOW_HOURS: u32 = 24;

/// Floor for a degenerate time span, in hours. Keeps the frequency division
/// finite when all events share one timestamp.
const MIN_TIME_SPAN_HOURS: f64 = 0.01;

/// Maximum penalty for a high down-event ratio.
const DOWN_RATIO_PENALTY: f64 = 50.0;
/// Maximum penalty for severe events (0 = critical on the 0-6 syslog scale).
const SEVERITY_PENALTY: f64 = 20.0;
/// Maximum penalty for a high event frequency.
const FREQUENCY_PENALTY: f64 = 20.0;
/// Events per hour above which the frequency penalty kicks in.
const FREQUENCY_PENALTY_THRESHOLD: f64 = 5.0;
/// Events per hour at which the frequency penalty saturates.
const FREQUENCY_PENALTY_CAP: f64 = 20.0;

/// Tuning knobs for [`analyze_stability`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityParams {
    /// Upper bound on the observed time span used for frequency
    /// calculations.
    pub time_window_hours: u32,
}

impl Default for StabilityParams {
    fn default() -> Self {
        Self {
            time_window_hours: DEFAULT_TIME_WINDOW_HOURS,
        }
    }
}

impl StabilityParams {
    /// Boundary validation for caller-supplied parameters.
    pub fn validate(&self) -> Result<(), crate::analysis::AnalysisError> {
        if self.time_window_hours == 0 {
            return Err(crate::analysis::AnalysisError::InvalidParameter {
                name: "time_window_hours",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Stability metrics for one interface, least stable sorted first.
#[derive(Debug, Clone, Serialize)]
pub struct StabilityMetric {
    pub device: String,
    pub location: String,
    pub interface: String,
    pub total_events: u32,
    pub up_events: u32,
    pub down_events: u32,
    pub config_events: u32,
    /// The global time span used for frequency calculations, in hours.
    pub time_span_hours: f64,
    pub event_frequency_per_hour: f64,
    pub down_ratio: f64,
    /// Mean of the parseable severity values, if any were present.
    pub average_severity: Option<f64>,
    /// 0-100, higher is more stable. Clamped.
    pub stability_score: f64,
}

#[derive(Debug, Default)]
struct GroupAccumulator {
    total_events: u32,
    up_events: u32,
    down_events: u32,
    config_events: u32,
    severities: Vec<i64>,
}

/// Score every interface with at least one event, least stable first.
///
/// The time span for frequency calculations is computed once over the whole
/// batch and shared by every group: an interface active only briefly inside
/// a long capture window is rated against the whole window. The span is
/// capped at `time_window_hours`.
pub fn analyze_stability(events: &[EventRecord], params: &StabilityParams) -> Vec<StabilityMetric> {
    let time_span_hours = global_time_span_hours(events, params.time_window_hours);

    let mut groups: BTreeMap<InterfaceKey, GroupAccumulator> = BTreeMap::new();

    for event in events {
        let (Some(key), Some(event_type)) = (event.interface_key(), event.event_type.as_deref())
        else {
            continue;
        };

        let group = groups.entry(key).or_default();
        group.total_events += 1;
        if is_up_event(event_type) {
            group.up_events += 1;
        }
        if is_down_event(event_type) {
            group.down_events += 1;
        }
        if is_config_event(event_type) {
            group.config_events += 1;
        }
        if let Some(level) = event.severity_level() {
            group.severities.push(level);
        }
    }

    let mut metrics: Vec<StabilityMetric> = groups
        .into_iter()
        .map(|(key, group)| score_group(key, group, time_span_hours))
        .collect();

    // Least stable first is the presentation contract; the key tie-break
    // keeps output deterministic across runs.
    metrics.sort_by(|a, b| {
        a.stability_score
            .total_cmp(&b.stability_score)
            .then_with(|| {
                (&a.device, &a.location, &a.interface).cmp(&(&b.device, &b.location, &b.interface))
            })
    });

    metrics
}

/// Overall time span of the batch in hours, floored and capped.
///
/// Defaults to 1.0 when fewer than two valid timestamps exist or all events
/// share one timestamp.
fn global_time_span_hours(events: &[EventRecord], time_window_hours: u32) -> f64 {
    let mut min_ts = f64::INFINITY;
    let mut max_ts = f64::NEG_INFINITY;
    let mut count = 0usize;

    for event in events {
        if let Some(ts) = event.epoch_seconds() {
            min_ts = min_ts.min(ts);
            max_ts = max_ts.max(ts);
            count += 1;
        }
    }

    let mut span_hours = 1.0;
    if count > 1 {
        let span_seconds = max_ts - min_ts;
        if span_seconds > 0.0 {
            span_hours = (span_seconds / 3600.0).max(MIN_TIME_SPAN_HOURS);
        }
    }

    span_hours.min(f64::from(time_window_hours.max(1)))
}

fn score_group(key: InterfaceKey, group: GroupAccumulator, time_span_hours: f64) -> StabilityMetric {
    let total = f64::from(group.total_events);
    let event_frequency_per_hour = round2(total / time_span_hours);
    let down_ratio = if group.total_events > 0 {
        f64::from(group.down_events) / total
    } else {
        0.0
    };

    let mut score = 100.0;
    score -= down_ratio * DOWN_RATIO_PENALTY;

    let average_severity = if group.severities.is_empty() {
        None
    } else {
        let avg = group.severities.iter().sum::<i64>() as f64 / group.severities.len() as f64;
        // 0 is critical, 6 is informational; normalize so lower averages
        // penalize harder.
        let severity_penalty_factor = ((6.0 - avg) / 6.0).max(0.0);
        score -= severity_penalty_factor * SEVERITY_PENALTY;
        Some(round2(avg))
    };

    if event_frequency_per_hour > FREQUENCY_PENALTY_THRESHOLD {
        let penalty = (event_frequency_per_hour / FREQUENCY_PENALTY_CAP).min(1.0);
        score -= penalty * FREQUENCY_PENALTY;
    }

    StabilityMetric {
        device: key.device,
        location: key.location,
        interface: key.interface,
        total_events: group.total_events,
        up_events: group.up_events,
        down_events: group.down_events,
        config_events: group.config_events,
        time_span_hours: round2(time_span_hours),
        event_frequency_per_hour,
        down_ratio,
        average_severity,
        stability_score: round1(score.clamp(0.0, 100.0)),
    }
}
