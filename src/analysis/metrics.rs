//! Dashboard-level aggregation across all interfaces in a batch.

use crate::analysis::flapping::{detect_flapping, FlapParams};
use crate::event::category::EventCategory;
use crate::event::{EventRecord, InterfaceKey};
use serde::Serialize;
use std::collections::BTreeSet;

/// Headline counts for the interface dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardMetrics {
    /// Distinct interfaces with at least one event.
    pub total_interfaces: u32,
    /// Interfaces with any activity in the batch. Equal to
    /// `total_interfaces`: an interface we heard from is an active one.
    pub active_interfaces: u32,
    /// Distinct interfaces with at least one status-down event.
    pub down_interfaces: u32,
    /// Interfaces flagged by the flapping detector at default thresholds.
    pub flapping_interfaces: u32,
    /// Events categorized as status up or status down.
    pub status_changes: u32,
    /// Events categorized as configuration changes.
    pub config_changes: u32,
}

/// Aggregate flapping and categorization output into dashboard counts.
/// Returns all-zero metrics for an empty batch.
pub fn calculate_metrics(events: &[EventRecord]) -> DashboardMetrics {
    let mut interfaces: BTreeSet<InterfaceKey> = BTreeSet::new();
    let mut down_interfaces: BTreeSet<InterfaceKey> = BTreeSet::new();
    let mut status_changes: u32 = 0;
    let mut config_changes: u32 = 0;

    for event in events {
        let category = event.category();

        match category {
            Some(EventCategory::StatusUp) | Some(EventCategory::StatusDown) => {
                status_changes += 1;
            }
            Some(EventCategory::ConfigChange) => config_changes += 1,
            _ => {}
        }

        if let Some(key) = event.interface_key() {
            if category == Some(EventCategory::StatusDown) {
                down_interfaces.insert(key.clone());
            }
            interfaces.insert(key);
        }
    }

    let flapping = detect_flapping(events, &FlapParams::default());

    let total = interfaces.len() as u32;
    DashboardMetrics {
        total_interfaces: total,
        active_interfaces: total,
        down_interfaces: down_interfaces.len() as u32,
        flapping_interfaces: flapping.len() as u32,
        status_changes,
        config_changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(device: &str, interface: &str, event_type: &str, minute: f64) -> EventRecord {
        EventRecord {
            device: Some(device.to_string()),
            location: Some("lab".to_string()),
            interface: Some(interface.to_string()),
            event_type: Some(event_type.to_string()),
            timestamp: Some(minute * 60.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let m = calculate_metrics(&[]);
        assert_eq!(m.total_interfaces, 0);
        assert_eq!(m.active_interfaces, 0);
        assert_eq!(m.down_interfaces, 0);
        assert_eq!(m.flapping_interfaces, 0);
        assert_eq!(m.status_changes, 0);
        assert_eq!(m.config_changes, 0);
    }

    #[test]
    fn test_mixed_batch_counts() {
        let events = vec![
            // eth0 on agw01 flaps: 3 rapid transitions within 30 min gaps
            event("agw01", "eth0", "IF_UP", 0.0),
            event("agw01", "eth0", "IF_DOWN", 5.0),
            event("agw01", "eth0", "IF_UP", 10.0),
            event("agw01", "eth0", "IF_DOWN", 15.0),
            // eth1 on agw01: one config change
            event("agw01", "eth1", "ETHPORT-5-SPEED", 20.0),
            // eth0 on agw02: stays up
            event("agw02", "eth0", "IF_UP", 25.0),
        ];

        let m = calculate_metrics(&events);
        assert_eq!(m.total_interfaces, 3);
        assert_eq!(m.active_interfaces, 3);
        assert_eq!(m.down_interfaces, 1); // only agw01/eth0 went down
        assert_eq!(m.flapping_interfaces, 1);
        assert_eq!(m.status_changes, 5);
        assert_eq!(m.config_changes, 1);
    }

    #[test]
    fn test_categorization_drives_the_counts() {
        // IF_DOWN_ADMIN_DOWN categorizes as AdminDown, so it is neither a
        // status change nor a down marker for the dashboard.
        let events = vec![event("agw01", "eth0", "IF_DOWN_ADMIN_DOWN", 0.0)];
        let m = calculate_metrics(&events);
        assert_eq!(m.total_interfaces, 1);
        assert_eq!(m.down_interfaces, 0);
        assert_eq!(m.status_changes, 0);
    }

    #[test]
    fn test_interfaces_with_same_name_are_distinct_per_device() {
        let events = vec![
            event("agw01", "eth0", "IF_DOWN", 0.0),
            event("agw02", "eth0", "IF_DOWN", 1.0),
        ];
        let m = calculate_metrics(&events);
        assert_eq!(m.total_interfaces, 2);
        assert_eq!(m.down_interfaces, 2);
    }

    #[test]
    fn test_records_without_interface_still_count_changes() {
        let mut orphan = event("agw01", "eth0", "IF_DOWN", 0.0);
        orphan.interface = None;
        let m = calculate_metrics(&[orphan]);
        assert_eq!(m.total_interfaces, 0);
        assert_eq!(m.status_changes, 1);
    }
}
