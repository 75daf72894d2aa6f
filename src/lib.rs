//! alertdeck - the alert monitoring core of an admin dashboard.
//!
//! # Overview
//!
//! Alerts are raised for locations (environmental threshold breaches) and
//! for the sensors watching them (system health). The dashboard lists them
//! inside a relative time window, filters them by category, status,
//! severity and location, and opens one at a time in a detail drawer where
//! it can be edited.
//!
//! All view state round-trips through URL query parameters, so a reload or
//! a shared link restores the same view.
//!
//! # Modules
//!
//! - [`model`]: Alert records and requests
//! - [`time_window`]: Presets, buckets and the windows they resolve to
//! - [`query`]: URL query codec and the alerts view state
//! - [`filter`]: Predicate, window and ordering logic
//! - [`storage`]: In-memory alert store
//! - [`dashboard`]: One render of the alerts view
//! - [`session`]: Drawer edit sessions
//! - [`api`]: HTTP API handlers

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod model;
pub mod query;
pub mod session;
pub mod storage;
pub mod time_window;

use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::api::{
    AppState, get_alert, get_alerts, get_time_window, health_check, patch_alert,
};

/// Build the HTTP router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/alerts", get(get_alerts))
        .route("/alerts/:id", get(get_alert).patch(patch_alert))
        .route("/time-window", get(get_time_window))
        .route("/health", get(health_check))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
