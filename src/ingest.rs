//! File ingest -- load raw syslog event batches into the store.
//!
//! Accepts either a JSON array of record objects or JSON Lines (one object
//! per line). Ingest is best-effort: a line that fails to parse is counted
//! and skipped, never fatal for the batch.

use crate::event::EventRecord;
use crate::store::{insert_events, Pool};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of one ingest run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Load an event file into the store.
pub fn ingest_file(pool: &Pool, path: &Path) -> Result<IngestSummary> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event file: {}", path.display()))?;

    let (events, skipped) = parse_events(&content);
    insert_events(pool, &events)?;

    info!(
        path = %path.display(),
        inserted = events.len(),
        skipped,
        "ingested event file"
    );

    Ok(IngestSummary {
        inserted: events.len(),
        skipped,
    })
}

/// Parse a JSON array or JSON Lines document into event records.
fn parse_events(content: &str) -> (Vec<EventRecord>, usize) {
    let trimmed = content.trim_start();

    // A top-level array is parsed as one document
    if trimmed.starts_with('[') {
        match serde_json::from_str::<Vec<serde_json::Value>>(trimmed) {
            Ok(values) => {
                let mut events = Vec::with_capacity(values.len());
                let mut skipped = 0;
                for value in values {
                    match serde_json::from_value::<EventRecord>(value) {
                        Ok(event) => events.push(event),
                        Err(e) => {
                            warn!(error = %e, "skipping malformed event record");
                            skipped += 1;
                        }
                    }
                }
                return (events, skipped);
            }
            Err(e) => {
                warn!(error = %e, "failed to parse event array");
                return (Vec::new(), 0);
            }
        }
    }

    // Otherwise treat the file as JSON Lines
    let mut events = Vec::new();
    let mut skipped = 0;
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<EventRecord>(line) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!(line = lineno + 1, error = %e, "skipping malformed event line");
                skipped += 1;
            }
        }
    }
    (events, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{count_events, open_pool};

    #[test]
    fn test_parse_json_lines() {
        let content = r#"
{"device": "agw01", "interface": "eth0", "event_type": "IF_UP", "timestamp": 100}
{"device": "agw01", "interface": "eth0", "event_type": "IF_DOWN", "timestamp": 200}
not json at all
{"device": "agw02", "interface": "eth1", "event_type": "SPEED", "timestamp": 300}
"#;
        let (events, skipped) = parse_events(content);
        assert_eq!(events.len(), 3);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_parse_json_array() {
        let content = r#"[
            {"device": "agw01", "interface": "eth0", "event_type": "IF_UP", "timestamp": 100},
            {"severity": "3"}
        ]"#;
        let (events, skipped) = parse_events(content);
        assert_eq!(events.len(), 2);
        assert_eq!(skipped, 0);
        assert_eq!(events[1].severity.as_deref(), Some("3"));
    }

    #[test]
    fn test_ingest_file_end_to_end() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("events.db");
        let pool = open_pool(db_path.to_str().unwrap()).unwrap();

        let file_path = dir.path().join("events.jsonl");
        std::fs::write(
            &file_path,
            r#"{"device": "agw01", "interface": "eth0", "event_type": "IF_UP", "timestamp": 100}
{"device": "agw01", "interface": "eth0", "event_type": "IF_DOWN", "timestamp": 200}
"#,
        )
        .unwrap();

        let summary = ingest_file(&pool, &file_path).unwrap();
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(count_events(&pool).unwrap(), 2);
    }

    #[test]
    fn test_ingest_missing_file_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("events.db");
        let pool = open_pool(db_path.to_str().unwrap()).unwrap();

        let result = ingest_file(&pool, Path::new("/nonexistent/events.jsonl"));
        assert!(result.is_err());
    }
}
