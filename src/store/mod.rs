//! SQLite event store -- schema, batch inserts, filtered queries.
//!
//! The analytics core only requires a finite, unordered batch of event
//! records; this store is the local collaborator that produces one.

pub mod schema;

use crate::event::EventRecord;
use anyhow::Result;
use r2d2::Pool as R2D2Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Value;

/// Connection Pool type
pub type Pool = R2D2Pool<SqliteConnectionManager>;

/// Default cap on records returned by a single query.
pub const DEFAULT_QUERY_LIMIT: usize = 10_000;

/// Open (or create) the SQLite database and return a connection pool.
pub fn open_pool(path: &str) -> Result<Pool> {
    let manager = SqliteConnectionManager::file(path).with_init(|c| {
        c.execute_batch(
            "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA temp_store = MEMORY;
                 PRAGMA busy_timeout = 5000;",
        )
    });

    let pool = R2D2Pool::new(manager)?;

    // Run migrations on a single connection
    let conn = pool.get()?;
    schema::migrate(&conn)?;

    Ok(pool)
}

/// Filters for [`query_events`]. All fields optional; unset fields match
/// everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Inclusive lower bound, epoch seconds.
    pub start: Option<f64>,
    /// Inclusive upper bound, epoch seconds.
    pub end: Option<f64>,
    pub device: Option<String>,
    pub location: Option<String>,
    pub interface: Option<String>,
    /// Row cap; defaults to [`DEFAULT_QUERY_LIMIT`] when `None`.
    pub limit: Option<usize>,
}

/// Insert a batch of event records in one transaction.
pub fn insert_events(pool: &Pool, events: &[EventRecord]) -> Result<usize> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO events (device, location, interface, event_type, severity, timestamp, message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for event in events {
            stmt.execute(rusqlite::params![
                event.device,
                event.location,
                event.interface,
                event.event_type,
                event.severity,
                event.timestamp,
                event.message,
            ])?;
        }
    }
    tx.commit()?;
    Ok(events.len())
}

/// Fetch a finite batch of event records matching the filter.
///
/// Time-range bounds apply only to records that have a timestamp; rows with
/// a NULL timestamp are excluded once either bound is set (they cannot be
/// placed in the range). Results are ordered by timestamp ascending for
/// stable output, though the analytics core does not rely on it.
pub fn query_events(pool: &Pool, filter: &EventFilter) -> Result<Vec<EventRecord>> {
    let conn = pool.get()?;

    let mut sql = String::from(
        "SELECT device, location, interface, event_type, severity, timestamp, message
         FROM events WHERE 1=1",
    );
    let mut params: Vec<Value> = Vec::new();

    if let Some(start) = filter.start {
        sql.push_str(&format!(" AND timestamp >= ?{}", params.len() + 1));
        params.push(Value::Real(start));
    }
    if let Some(end) = filter.end {
        sql.push_str(&format!(" AND timestamp <= ?{}", params.len() + 1));
        params.push(Value::Real(end));
    }
    if let Some(device) = &filter.device {
        sql.push_str(&format!(" AND device = ?{}", params.len() + 1));
        params.push(Value::Text(device.clone()));
    }
    if let Some(location) = &filter.location {
        sql.push_str(&format!(" AND location = ?{}", params.len() + 1));
        params.push(Value::Text(location.clone()));
    }
    if let Some(interface) = &filter.interface {
        sql.push_str(&format!(" AND interface = ?{}", params.len() + 1));
        params.push(Value::Text(interface.clone()));
    }

    let limit = filter.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
    sql.push_str(&format!(
        " ORDER BY timestamp ASC LIMIT ?{}",
        params.len() + 1
    ));
    params.push(Value::Integer(limit as i64));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| {
        Ok(EventRecord {
            device: row.get(0)?,
            location: row.get(1)?,
            interface: row.get(2)?,
            event_type: row.get(3)?,
            severity: row.get(4)?,
            timestamp: row.get(5)?,
            message: row.get(6)?,
        })
    })?;

    let mut events = Vec::new();
    for r in rows {
        events.push(r?);
    }
    Ok(events)
}

/// Total rows in the events table.
pub fn count_events(pool: &Pool) -> Result<i64> {
    let conn = pool.get()?;
    let count = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
    Ok(count)
}
