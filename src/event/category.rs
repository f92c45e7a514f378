//! Event type categorization.
//!
//! Event types are free text from device syslog (e.g.
//! `%ETHPORT-5-IF_DOWN_LINK_FAILURE`), so classification is substring based.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event type substrings that indicate a link configuration change.
pub const CONFIG_PATTERNS: [&str; 4] = ["DUPLEX", "SPEED", "FLOW_CONTROL", "BANDWIDTH"];

/// Semantic category of an interface event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    #[serde(rename = "Status Up")]
    StatusUp,
    #[serde(rename = "Status Down")]
    StatusDown,
    #[serde(rename = "Config Change")]
    ConfigChange,
    #[serde(rename = "Link Failure")]
    LinkFailure,
    #[serde(rename = "Admin Down")]
    AdminDown,
    #[serde(rename = "Other")]
    Other,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventCategory::StatusUp => "Status Up",
            EventCategory::StatusDown => "Status Down",
            EventCategory::ConfigChange => "Config Change",
            EventCategory::LinkFailure => "Link Failure",
            EventCategory::AdminDown => "Admin Down",
            EventCategory::Other => "Other",
        };
        f.write_str(s)
    }
}

/// Classify an event type string.
///
/// Every rule runs unconditionally and a later match overwrites an earlier
/// one, so an event type matching several patterns lands in the category of
/// the last matching rule: `IF_DOWN_ADMIN_DOWN` is `AdminDown`, not
/// `StatusDown`. Do not rewrite this as first-match-wins.
pub fn categorize(event_type: &str) -> EventCategory {
    let mut category = EventCategory::Other;

    if event_type.contains("IF_UP") {
        category = EventCategory::StatusUp;
    }
    if event_type.contains("IF_DOWN") {
        category = EventCategory::StatusDown;
    }
    for pattern in CONFIG_PATTERNS {
        if event_type.contains(pattern) {
            category = EventCategory::ConfigChange;
        }
    }
    if event_type.contains("LINK_FAILURE") {
        category = EventCategory::LinkFailure;
    }
    if event_type.contains("ADMIN_DOWN") {
        category = EventCategory::AdminDown;
    }

    category
}

/// Does this event type report the interface coming up?
pub fn is_up_event(event_type: &str) -> bool {
    event_type.contains("IF_UP")
}

/// Does this event type report the interface going down?
pub fn is_down_event(event_type: &str) -> bool {
    event_type.contains("IF_DOWN")
}

/// Does this event type report a configuration change?
pub fn is_config_event(event_type: &str) -> bool {
    CONFIG_PATTERNS.iter().any(|p| event_type.contains(p))
}
