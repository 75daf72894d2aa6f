//! Integration tests for alertdeck API endpoints.
//!
//! These tests verify the full request/response cycle through the HTTP API.

use std::future::IntoFuture;
use std::time::Duration;

use axum_test::TestServer;
use chrono::Utc;
use serde_json::json;

use alertdeck::api::AppState;
use alertdeck::build_router;
use alertdeck::storage::AlertStore;

fn create_test_server() -> TestServer {
    let store = AlertStore::seeded(Utc::now(), Duration::ZERO);
    TestServer::new(build_router(AppState::new(store))).unwrap()
}

fn ids(body: &serde_json::Value) -> Vec<String> {
    body["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_alerts_default_window() {
    let server = create_test_server();

    let response = server.get("/alerts").await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["window"]["preset"], "1h");
    assert_eq!(body["window"]["bucket"], "1m");
    assert_eq!(body["windowLabel"], "Last Hour");
    assert_eq!(body["count"], 6);
    assert_eq!(body["counts"]["open"], 4);
    assert_eq!(body["query"], "tcPreset=1h&tcBucket=1m");
    assert!(!ids(&body).contains(&"alrt-005".to_string()));
}

#[tokio::test]
async fn test_alerts_invalid_params_fall_back() {
    let server = create_test_server();

    let response = server
        .get("/alerts?tcPreset=2y&tcBucket=3s&category=weather&status=closed")
        .await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["window"]["preset"], "1h");
    assert_eq!(body["window"]["bucket"], "1m");
    assert_eq!(body["filters"]["category"], "all");
    assert_eq!(body["filters"]["status"], "all");
    assert_eq!(body["count"], 6);
}

#[tokio::test]
async fn test_alerts_filtered_and_windowed() {
    let server = create_test_server();

    let response = server
        .get("/alerts?tcPreset=24h&category=system&status=resolved")
        .await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(ids(&body), ["alrt-006"]);
    assert_eq!(
        body["query"],
        "tcPreset=24h&category=system&status=resolved&tcBucket=1m"
    );
}

#[tokio::test]
async fn test_alerts_severity_and_location() {
    let server = create_test_server();

    let body: serde_json::Value = server
        .get("/alerts?tcPreset=7d&severity=critical")
        .await
        .json();
    assert_eq!(ids(&body), ["alrt-001", "alrt-003", "alrt-007"]);

    let body: serde_json::Value = server
        .get("/alerts?tcPreset=7d&locationId=loc-garage")
        .await
        .json();
    assert_eq!(ids(&body), ["alrt-006"]);
}

#[tokio::test]
async fn test_selection_kept_and_cleared() {
    let server = create_test_server();

    let body: serde_json::Value = server.get("/alerts?alertId=alrt-002").await.json();
    assert_eq!(body["selected"]["id"], "alrt-002");
    assert_eq!(body["selectionCleared"], false);

    // Five hours old, outside the default hour.
    let body: serde_json::Value = server.get("/alerts?alertId=alrt-005").await.json();
    assert!(body["selected"].is_null());
    assert_eq!(body["selectionCleared"], true);
    assert_eq!(body["query"], "tcPreset=1h&tcBucket=1m");
}

#[tokio::test]
async fn test_time_window_endpoint() {
    let server = create_test_server();

    let response = server.get("/time-window?tcPreset=6h&tcBucket=5m&page=2").await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["label"], "Last 6 Hours");
    assert_eq!(body["query"], "tcPreset=6h&tcBucket=5m&page=2");
    assert_eq!(body["presets"].as_array().unwrap().len(), 6);
    assert_eq!(body["presets"][0]["value"], "15m");
    assert_eq!(body["presets"][0]["label"], "Last 15m");
    assert_eq!(body["buckets"], json!(["2s", "10s", "1m", "5m", "1h"]));
}

#[tokio::test]
async fn test_get_alert() {
    let server = create_test_server();

    let response = server.get("/alerts/alrt-001").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["title"], "High temperature spike");
    assert_eq!(body["locationName"], "Warehouse A");
    assert_eq!(body["value"], 87.6);

    server
        .get("/alerts/alrt-404")
        .await
        .assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_alert_status() {
    let server = create_test_server();

    let response = server
        .patch("/alerts/alrt-001")
        .json(&json!({ "status": "acknowledged" }))
        .await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "acknowledged");
    assert_eq!(body["title"], "High temperature spike");
    assert_eq!(body["threshold"], "> 84.0 F");

    // The edit is visible in the view; other alerts are untouched.
    let view: serde_json::Value = server.get("/alerts?status=open").await.json();
    assert_eq!(ids(&view), ["alrt-008", "alrt-003", "alrt-002"]);
}

#[tokio::test]
async fn test_patch_alert_blank_threshold() {
    let server = create_test_server();

    let body: serde_json::Value = server
        .patch("/alerts/alrt-002")
        .json(&json!({ "threshold": "", "severity": "critical", "title": "Humidity floor" }))
        .await
        .json();

    assert!(body.get("threshold").is_none());
    assert_eq!(body["severity"], "critical");
    assert_eq!(body["title"], "Humidity floor");
}

#[tokio::test]
async fn test_partial_patches_keep_each_other() {
    let server = create_test_server();

    let first = server
        .patch("/alerts/alrt-001")
        .json(&json!({ "status": "acknowledged" }))
        .into_future();
    let second = server
        .patch("/alerts/alrt-001")
        .json(&json!({ "title": "Renamed" }))
        .into_future();
    let (first, second) = tokio::join!(first, second);
    first.assert_status_ok();
    second.assert_status_ok();

    let body: serde_json::Value = server.get("/alerts/alrt-001").await.json();
    assert_eq!(body["title"], "Renamed");
    assert_eq!(body["status"], "acknowledged");
}

#[tokio::test]
async fn test_patch_unknown_alert() {
    let server = create_test_server();

    let response = server
        .patch("/alerts/alrt-404")
        .json(&json!({ "status": "resolved" }))
        .await;

    response.assert_status(axum::http::StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_full_workflow() {
    let server = create_test_server();

    // 1. Open the alerts view on the system category.
    let view: serde_json::Value = server.get("/alerts?category=system").await.json();
    assert_eq!(ids(&view), ["alrt-008", "alrt-003", "alrt-004"]);

    // 2. Select an alert; the drawer stays open.
    let view: serde_json::Value = server
        .get("/alerts?category=system&alertId=alrt-003")
        .await
        .json();
    assert_eq!(view["selected"]["title"], "Sensor offline");

    // 3. Resolve it from the drawer.
    server
        .patch("/alerts/alrt-003")
        .json(&json!({ "status": "resolved" }))
        .await
        .assert_status_ok();

    // 4. Switching to open alerts drops the now-resolved selection.
    let view: serde_json::Value = server
        .get("/alerts?category=system&status=open&alertId=alrt-003")
        .await
        .json();
    assert_eq!(ids(&view), ["alrt-008"]);
    assert_eq!(view["selectionCleared"], true);
    assert_eq!(view["counts"]["systemOpen"], 1);
}
