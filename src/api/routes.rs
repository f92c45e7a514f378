//! API route definitions.
//!
//! Every analysis endpoint follows the same shape: fetch a finite event
//! batch from the store (bounded by the configured query limit), run the
//! pure analytics core on it inside `spawn_blocking`, and wrap the result
//! in a `{ data, meta }` envelope.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::state::AppState;
use crate::analysis::flapping::{detect_flapping, FlapParams};
use crate::analysis::metrics::calculate_metrics;
use crate::analysis::stability::{analyze_stability, StabilityParams};
use crate::event::EventRecord;
use crate::store::{query_events, EventFilter, Pool};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/interfaces/events", get(list_events))
        .route("/interfaces/flapping", get(flapping))
        .route("/interfaces/stability", get(stability))
        .route("/interfaces/metrics", get(metrics))
        .route("/interfaces/categorized", get(categorized))
}

/// Internal failures surface as a 500 with a JSON error body. Unparseable
/// query parameters are rejected earlier by the Query extractor; out-of-range
/// ones fail parameter validation here with a 400.
struct ApiError {
    status: StatusCode,
    error: anyhow::Error,
}

impl ApiError {
    fn bad_request(err: impl Into<anyhow::Error>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: err.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self.error, "request failed");
        (
            self.status,
            Json(json!({ "error": self.error.to_string() })),
        )
            .into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: err.into(),
        }
    }
}

/// Store filters shared by every analysis endpoint.
///
/// Kept flat rather than `#[serde(flatten)]`-composed: the query-string
/// deserializer cannot flatten non-string fields.
#[derive(Debug, Default, Deserialize)]
struct RangeQuery {
    /// Inclusive lower bound, epoch seconds.
    start: Option<f64>,
    /// Inclusive upper bound, epoch seconds.
    end: Option<f64>,
    device: Option<String>,
    location: Option<String>,
    interface: Option<String>,
    limit: Option<usize>,
}

impl RangeQuery {
    fn into_filter(self, default_limit: usize) -> EventFilter {
        EventFilter {
            start: self.start,
            end: self.end,
            device: self.device,
            location: self.location,
            interface: self.interface,
            // The configured cap also bounds caller-supplied limits
            limit: Some(self.limit.unwrap_or(default_limit).min(default_limit)),
        }
    }
}

async fn fetch_events(state: &AppState, range: RangeQuery) -> Result<Vec<EventRecord>, ApiError> {
    let pool: Pool = state.pool.clone();
    let filter = range.into_filter(state.analysis.query_limit);
    let events = tokio::task::spawn_blocking(move || query_events(&pool, &filter)).await??;
    Ok(events)
}

fn envelope(data: Value, total: usize) -> Json<Value> {
    Json(json!({
        "data": data,
        "meta": {
            "total": total,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        },
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

async fn list_events(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let events = fetch_events(&state, range).await?;
    let total = events.len();
    Ok(envelope(serde_json::to_value(events)?, total))
}

#[derive(Debug, Deserialize)]
struct FlappingQuery {
    start: Option<f64>,
    end: Option<f64>,
    device: Option<String>,
    location: Option<String>,
    interface: Option<String>,
    limit: Option<usize>,
    threshold_minutes: Option<u32>,
    min_transitions: Option<u32>,
}

impl FlappingQuery {
    fn range(&self) -> RangeQuery {
        RangeQuery {
            start: self.start,
            end: self.end,
            device: self.device.clone(),
            location: self.location.clone(),
            interface: self.interface.clone(),
            limit: self.limit,
        }
    }
}

async fn flapping(
    State(state): State<AppState>,
    Query(query): Query<FlappingQuery>,
) -> Result<Json<Value>, ApiError> {
    let params = FlapParams {
        time_threshold_minutes: query
            .threshold_minutes
            .unwrap_or(state.analysis.time_threshold_minutes),
        min_transitions: query
            .min_transitions
            .unwrap_or(state.analysis.min_transitions),
    };
    params.validate().map_err(ApiError::bad_request)?;

    let events = fetch_events(&state, query.range()).await?;
    let reports = detect_flapping(&events, &params);
    let total = reports.len();
    Ok(envelope(serde_json::to_value(reports)?, total))
}

#[derive(Debug, Deserialize)]
struct StabilityQuery {
    start: Option<f64>,
    end: Option<f64>,
    device: Option<String>,
    location: Option<String>,
    interface: Option<String>,
    limit: Option<usize>,
    window_hours: Option<u32>,
}

async fn stability(
    State(state): State<AppState>,
    Query(query): Query<StabilityQuery>,
) -> Result<Json<Value>, ApiError> {
    let params = StabilityParams {
        time_window_hours: query
            .window_hours
            .unwrap_or(state.analysis.time_window_hours),
    };
    params.validate().map_err(ApiError::bad_request)?;

    let range = RangeQuery {
        start: query.start,
        end: query.end,
        device: query.device,
        location: query.location,
        interface: query.interface,
        limit: query.limit,
    };
    let events = fetch_events(&state, range).await?;
    let metrics = analyze_stability(&events, &params);
    let total = metrics.len();
    Ok(envelope(serde_json::to_value(metrics)?, total))
}

async fn metrics(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let events = fetch_events(&state, range).await?;
    let dashboard = calculate_metrics(&events);
    let total = dashboard.total_interfaces as usize;
    Ok(envelope(serde_json::to_value(dashboard)?, total))
}

async fn categorized(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let events = fetch_events(&state, range).await?;
    let total = events.len();

    let annotated: Vec<Value> = events
        .into_iter()
        .map(|event| {
            let category = event
                .category()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "Other".to_string());
            let mut value = serde_json::to_value(&event).unwrap_or_else(|_| json!({}));
            if let Some(obj) = value.as_object_mut() {
                obj.insert("event_category".to_string(), json!(category));
            }
            value
        })
        .collect();

    Ok(envelope(Value::Array(annotated), total))
}
