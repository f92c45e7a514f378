//! Flapping detection -- rapid up/down oscillation within a time window.

use crate::analysis::round2;
use crate::event::category::{is_down_event, is_up_event};
use crate::event::{EventRecord, InterfaceKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default maximum gap between state changes to count as rapid.
pub const DEFAULT_TIME_THRESHOLD_MINUTES: u32 = 30;
/// Default minimum rapid transitions before an interface is reported.
pub const DEFAULT_MIN_TRANSITIONS: u32 = 3;

/// Tuning knobs for [`detect_flapping`]. Unsigned on purpose: a negative
/// threshold or transition count is unrepresentable, so the detector itself
/// has no failure path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlapParams {
    /// A state change within this many minutes of the previous one counts as
    /// rapid.
    pub time_threshold_minutes: u32,
    /// Minimum rapid transitions required to report an interface.
    pub min_transitions: u32,
}

impl Default for FlapParams {
    fn default() -> Self {
        Self {
            time_threshold_minutes: DEFAULT_TIME_THRESHOLD_MINUTES,
            min_transitions: DEFAULT_MIN_TRANSITIONS,
        }
    }
}

impl FlapParams {
    /// Boundary validation for caller-supplied parameters.
    pub fn validate(&self) -> Result<(), crate::analysis::AnalysisError> {
        if self.min_transitions == 0 {
            return Err(crate::analysis::AnalysisError::InvalidParameter {
                name: "min_transitions",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Operational link state derived from an event type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkState {
    Up,
    Down,
}

/// One tracked up/down entry for an interface. Consecutive same-state
/// entries are retained; a transition only exists between an entry and its
/// predecessor.
#[derive(Debug, Clone, Copy)]
struct StateEntry {
    state: LinkState,
    timestamp: f64,
}

/// An interface exhibiting rapid up/down oscillation.
#[derive(Debug, Clone, Serialize)]
pub struct FlappingReport {
    pub device: String,
    pub location: String,
    pub interface: String,
    /// True state changes observed, plus one for the initial state.
    pub transitions_count: u32,
    /// State changes that happened within the rapid-transition threshold.
    pub rapid_transitions_detected: u32,
    /// Epoch seconds of the first tracked event.
    pub first_event_timestamp: f64,
    /// Epoch seconds of the last tracked event.
    pub last_event_timestamp: f64,
    /// Minutes between first and last tracked event, rounded to 2 decimals.
    pub observation_duration_minutes: f64,
}

/// Report interfaces that rapidly oscillated between up and down.
///
/// Only `IF_UP` / `IF_DOWN` events with an interface name and a numeric
/// timestamp are tracked; config and link-failure events are irrelevant
/// here. A gap counts as rapid when the state actually changed and the gap
/// is at most `time_threshold_minutes`; consecutive same-state events count
/// as zero transitions, so event volume alone never looks like flapping.
pub fn detect_flapping(events: &[EventRecord], params: &FlapParams) -> Vec<FlappingReport> {
    let mut groups: BTreeMap<InterfaceKey, Vec<StateEntry>> = BTreeMap::new();

    for event in events {
        let (Some(key), Some(event_type), Some(timestamp)) = (
            event.interface_key(),
            event.event_type.as_deref(),
            event.epoch_seconds(),
        ) else {
            continue;
        };

        if !is_up_event(event_type) && !is_down_event(event_type) {
            continue;
        }
        let state = if is_up_event(event_type) {
            LinkState::Up
        } else {
            LinkState::Down
        };

        groups
            .entry(key)
            .or_default()
            .push(StateEntry { state, timestamp });
    }

    let mut reports = Vec::new();

    for (key, mut entries) in groups {
        // A single entry can never flap.
        if entries.len() < 2 {
            continue;
        }

        entries.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        let first_timestamp = entries[0].timestamp;
        let last_timestamp = entries[entries.len() - 1].timestamp;

        let mut last_state = entries[0].state;
        let mut last_time = entries[0].timestamp;
        let mut true_transitions: u32 = 0;
        let mut rapid_transitions: u32 = 0;

        for entry in &entries[1..] {
            if entry.state != last_state {
                true_transitions += 1;
                let gap_minutes = (entry.timestamp - last_time) / 60.0;
                if gap_minutes <= f64::from(params.time_threshold_minutes) {
                    rapid_transitions += 1;
                }
            }
            last_state = entry.state;
            last_time = entry.timestamp;
        }

        if rapid_transitions >= params.min_transitions {
            reports.push(FlappingReport {
                device: key.device,
                location: key.location,
                interface: key.interface,
                // Counting the initial state as one entry.
                transitions_count: true_transitions + 1,
                rapid_transitions_detected: rapid_transitions,
                first_event_timestamp: first_timestamp,
                last_event_timestamp: last_timestamp,
                observation_duration_minutes: round2((last_timestamp - first_timestamp) / 60.0),
            });
        }
    }

    reports
}
