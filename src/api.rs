//! HTTP API handlers for alertdeck.
//!
//! Query strings are parsed by hand rather than through `Query<T>` so that
//! bad values fall back to defaults instead of rejecting the request, which
//! is how the dashboard treats its own URL.

use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};

use crate::dashboard::{AlertsDashboard, AlertsView};
use crate::error::ApiResult;
use crate::model::{Alert, AlertPatch};
use crate::query::{AlertsViewQuery, QueryParams};
use crate::session::AlertEditSession;
use crate::storage::AlertStore;
use crate::time_window::{TimeBucket, TimePreset, TimeWindow, TimeWindowProvider};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: AlertStore,
    pub dashboard: AlertsDashboard<AlertStore>,
}

impl AppState {
    pub fn new(store: AlertStore) -> Self {
        Self {
            dashboard: AlertsDashboard::new(store.clone()),
            store,
        }
    }
}

/// A selectable preset.
#[derive(Debug, Serialize)]
pub struct PresetOption {
    pub value: TimePreset,
    pub label: String,
}

/// Response for GET /time-window.
#[derive(Debug, Serialize)]
pub struct TimeWindowResponse {
    pub window: TimeWindow,
    pub label: &'static str,
    /// Canonical query with both time keys written.
    pub query: QueryParams,
    pub presets: Vec<PresetOption>,
    pub buckets: Vec<TimeBucket>,
}

fn parse_raw(raw: Option<String>) -> QueryParams {
    raw.as_deref().map(QueryParams::parse).unwrap_or_default()
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /time-window - Resolve `tcPreset`/`tcBucket` into a concrete window.
///
/// # Response
///
/// ```json
/// {
///     "window": { "preset": "1h", "bucket": "1m", "from": "...", "to": "..." },
///     "label": "Last Hour",
///     "query": "tcPreset=1h&tcBucket=1m",
///     "presets": [{ "value": "15m", "label": "Last 15m" }],
///     "buckets": ["2s", "10s", "1m", "5m", "1h"]
/// }
/// ```
#[instrument]
pub async fn get_time_window(RawQuery(raw): RawQuery) -> Json<TimeWindowResponse> {
    let time = TimeWindowProvider::from_query(parse_raw(raw), Utc::now());
    let window = time.window();

    Json(TimeWindowResponse {
        window,
        label: window.label(),
        query: time.canonical_query(),
        presets: TimePreset::ALL
            .into_iter()
            .map(|preset| PresetOption {
                value: preset,
                label: preset.short_label(),
            })
            .collect(),
        buckets: TimeBucket::ALL.to_vec(),
    })
}

/// GET /alerts - The alerts view.
///
/// # Query Parameters
///
/// - `tcPreset`, `tcBucket`: time window (default `1h`, `1m`)
/// - `category`: `environment` | `system`
/// - `status`: `open` | `acknowledged` | `resolved`
/// - `severity`: `info` | `warning` | `critical`
/// - `locationId`: exact location match
/// - `alertId`: alert shown in the detail drawer
///
/// Unrecognized values are ignored. A selected alert outside the result is
/// dropped and `selectionCleared` is set.
#[instrument(skip(state))]
pub async fn get_alerts(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Json<AlertsView> {
    let query = parse_raw(raw);
    let filters = AlertsViewQuery::from_query(&query);
    let time = TimeWindowProvider::from_query(query, Utc::now());

    let view = state.dashboard.load(&filters, &time).await;
    info!(
        count = view.count,
        preset = %view.window.preset,
        selection_cleared = view.selection_cleared,
        "Alerts queried"
    );

    Json(view)
}

/// GET /alerts/:id - A single alert.
#[instrument(skip(state))]
pub async fn get_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
) -> ApiResult<Json<Alert>> {
    let alert = state.store.get_alert(&alert_id).await?;
    Ok(Json(alert))
}

/// PATCH /alerts/:id - Edit an alert's title, description, severity, status
/// or threshold.
///
/// # Request Body
///
/// ```json
/// { "status": "acknowledged", "threshold": "" }
/// ```
///
/// Absent fields are kept; a blank threshold clears it. Returns the updated
/// alert.
#[instrument(skip(state, patch))]
pub async fn patch_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
    Json(patch): Json<AlertPatch>,
) -> ApiResult<Json<Alert>> {
    let mut session = AlertEditSession::open(&state.store, &alert_id).await?;
    session.edit()?;
    session.apply_patch(patch)?;
    let updated = session.save(&state.store).await?.clone();

    Ok(Json(updated))
}
