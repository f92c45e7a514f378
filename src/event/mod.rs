//! Event record model -- tolerant deserialization and interface identity.

pub mod category;

use serde::{Deserialize, Deserializer, Serialize};

/// Fallback device name for records missing the `device` field.
pub const UNKNOWN_DEVICE: &str = "unknown_device";
/// Fallback location name for records missing the `location` field.
pub const UNKNOWN_LOCATION: &str = "unknown_location";

/// A single device syslog event, one per log line.
///
/// Every field is optional: syslog collectors routinely emit partial records,
/// and the best-effort policy is to exclude a record from an analysis that
/// needs a missing field rather than reject the batch. Deserialization is
/// tolerant of mistyped fields (a non-numeric `timestamp` becomes `None`,
/// never a parse error).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    /// Unix epoch seconds.
    #[serde(default, deserialize_with = "de_epoch_seconds")]
    pub timestamp: Option<f64>,
    /// Syslog severity on a 0 (most severe) - 6 (least severe) scale.
    /// Kept as the raw string; see [`EventRecord::severity_level`].
    #[serde(default, deserialize_with = "de_severity")]
    pub severity: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl EventRecord {
    /// Grouping identity for this record, or `None` if the record has no
    /// interface name. Device and location fall back to the `unknown_*`
    /// placeholders so two devices sharing an interface name are never
    /// conflated, but a record is never dropped for missing context.
    pub fn interface_key(&self) -> Option<InterfaceKey> {
        let interface = self.interface.as_deref()?;
        if interface.is_empty() {
            return None;
        }
        Some(InterfaceKey {
            device: self
                .device
                .clone()
                .unwrap_or_else(|| UNKNOWN_DEVICE.to_string()),
            location: self
                .location
                .clone()
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            interface: interface.to_string(),
        })
    }

    /// Parse the severity string as an integer level. Unparseable values
    /// yield `None` and are skipped by the scorer without excluding the
    /// record from event counts.
    pub fn severity_level(&self) -> Option<i64> {
        self.severity.as_deref()?.trim().parse().ok()
    }

    /// Epoch timestamp, filtered to finite values.
    pub fn epoch_seconds(&self) -> Option<f64> {
        self.timestamp.filter(|t| t.is_finite())
    }

    /// Semantic category of this record's event type, if it has one.
    pub fn category(&self) -> Option<category::EventCategory> {
        self.event_type.as_deref().map(category::categorize)
    }
}

/// Composite interface identity: `(device, location, interface)`.
///
/// All flapping and stability analysis groups by this tuple, not by the
/// interface name alone. `Ord` gives grouping maps a deterministic iteration
/// order regardless of input ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct InterfaceKey {
    pub device: String,
    pub location: String,
    pub interface: String,
}

fn de_epoch_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(numeric_value))
}

fn de_severity<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        // Collectors sometimes emit severity as a bare number
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accept epoch seconds as an integer, a float, or a numeric string.
fn numeric_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let json = r#"{
            "device": "agw01",
            "location": "fra1",
            "interface": "eth0",
            "event_type": "IF_DOWN",
            "timestamp": 1700000000,
            "severity": "2",
            "message": "Interface eth0 changed state to down"
        }"#;
        let rec: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.epoch_seconds(), Some(1_700_000_000.0));
        assert_eq!(rec.severity_level(), Some(2));

        let key = rec.interface_key().unwrap();
        assert_eq!(key.device, "agw01");
        assert_eq!(key.location, "fra1");
        assert_eq!(key.interface, "eth0");
    }

    #[test]
    fn test_missing_fields_become_none() {
        let rec: EventRecord = serde_json::from_str("{}").unwrap();
        assert!(rec.interface.is_none());
        assert!(rec.event_type.is_none());
        assert!(rec.epoch_seconds().is_none());
        assert!(rec.interface_key().is_none());
    }

    #[test]
    fn test_timestamp_variants() {
        let rec: EventRecord =
            serde_json::from_str(r#"{"timestamp": 1700000000.5}"#).unwrap();
        assert_eq!(rec.epoch_seconds(), Some(1_700_000_000.5));

        let rec: EventRecord =
            serde_json::from_str(r#"{"timestamp": "1700000000"}"#).unwrap();
        assert_eq!(rec.epoch_seconds(), Some(1_700_000_000.0));

        // Garbage timestamps degrade to None instead of failing the record
        let rec: EventRecord =
            serde_json::from_str(r#"{"timestamp": "yesterday"}"#).unwrap();
        assert!(rec.epoch_seconds().is_none());

        let rec: EventRecord =
            serde_json::from_str(r#"{"timestamp": null}"#).unwrap();
        assert!(rec.epoch_seconds().is_none());
    }

    #[test]
    fn test_severity_as_number_or_string() {
        let rec: EventRecord = serde_json::from_str(r#"{"severity": 3}"#).unwrap();
        assert_eq!(rec.severity_level(), Some(3));

        let rec: EventRecord = serde_json::from_str(r#"{"severity": "5"}"#).unwrap();
        assert_eq!(rec.severity_level(), Some(5));

        let rec: EventRecord =
            serde_json::from_str(r#"{"severity": "warning"}"#).unwrap();
        assert!(rec.severity.is_some());
        assert!(rec.severity_level().is_none());
    }

    #[test]
    fn test_interface_key_defaults() {
        let rec: EventRecord =
            serde_json::from_str(r#"{"interface": "xe-0/0/1"}"#).unwrap();
        let key = rec.interface_key().unwrap();
        assert_eq!(key.device, UNKNOWN_DEVICE);
        assert_eq!(key.location, UNKNOWN_LOCATION);
        assert_eq!(key.interface, "xe-0/0/1");
    }

    #[test]
    fn test_empty_interface_is_excluded() {
        let rec: EventRecord = serde_json::from_str(r#"{"interface": ""}"#).unwrap();
        assert!(rec.interface_key().is_none());
    }
}
