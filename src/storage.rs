//! In-memory alert storage.
//!
//! The store is the single owner of alert records. Readers always get deep
//! copies; only [`AlertStore::update_alert`] writes, and it swaps exactly one
//! record so every other record keeps its identity.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::filter::{matches, sort_newest_first};
use crate::model::{
    Alert, AlertCategory, AlertSeverity, AlertStatus, AlertUpdate, AlertsPage, AlertsRequest,
};
use crate::session::merge_update;

/// Storage layer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("alert '{0}' not found")]
    NotFound(String),

    #[error("alert source unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can answer an alert listing.
///
/// The dashboard only depends on this, so a remote backend can replace the
/// in-memory store without touching the view logic.
pub trait AlertSource {
    fn get_alerts(
        &self,
        request: AlertsRequest,
    ) -> impl Future<Output = Result<AlertsPage, StorageError>> + Send;
}

/// Shared in-memory alert collection.
#[derive(Clone, Default)]
pub struct AlertStore {
    alerts: Arc<RwLock<Vec<Arc<Alert>>>>,
    latency: Duration,
}

impl AlertStore {
    /// Create a store holding `alerts`. Every read waits `latency` first.
    pub fn new(alerts: Vec<Alert>, latency: Duration) -> Self {
        Self {
            alerts: Arc::new(RwLock::new(alerts.into_iter().map(Arc::new).collect())),
            latency,
        }
    }

    /// Create a store with the demo alerts, timestamped relative to `now`.
    pub fn seeded(now: DateTime<Utc>, latency: Duration) -> Self {
        Self::new(demo_alerts(now), latency)
    }

    /// List alerts matching `request`, newest first.
    pub async fn list_alerts(&self, request: &AlertsRequest) -> AlertsPage {
        self.simulate_latency().await;

        let alerts = self.alerts.read().await;
        let mut data: Vec<Alert> = alerts
            .iter()
            .filter(|alert| matches(alert, request))
            .map(|alert| Alert::clone(alert))
            .collect();
        sort_newest_first(&mut data);

        debug!(count = data.len(), "Alerts listed");
        AlertsPage::new(data)
    }

    /// Fetch a copy of one alert.
    pub async fn get_alert(&self, id: &str) -> Result<Alert, StorageError> {
        self.simulate_latency().await;

        let alerts = self.alerts.read().await;
        alerts
            .iter()
            .find(|alert| alert.id == id)
            .map(|alert| Alert::clone(alert))
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    /// Merge `update` into the alert with `id` and return the new record.
    ///
    /// The merge runs against the stored record under the write lock, so
    /// concurrent updates of different fields are all kept.
    pub async fn update_alert(
        &self,
        id: &str,
        update: &AlertUpdate,
    ) -> Result<Alert, StorageError> {
        let mut alerts = self.alerts.write().await;
        let merged = merge_update(&alerts, id, update)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        let updated = merged
            .iter()
            .find(|alert| alert.id == id)
            .map(|alert| Alert::clone(alert))
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        *alerts = merged;

        info!(
            alert_id = %id,
            status = %updated.status,
            severity = %updated.severity,
            "Alert updated"
        );
        Ok(updated)
    }

    /// The current records, sharing storage with the store.
    pub async fn snapshot(&self) -> Vec<Arc<Alert>> {
        self.alerts.read().await.clone()
    }

    pub async fn alert_count(&self) -> usize {
        self.alerts.read().await.len()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl AlertSource for AlertStore {
    async fn get_alerts(&self, request: AlertsRequest) -> Result<AlertsPage, StorageError> {
        Ok(self.list_alerts(&request).await)
    }
}

struct Seed {
    id: &'static str,
    category: AlertCategory,
    severity: AlertSeverity,
    status: AlertStatus,
    title: &'static str,
    description: &'static str,
    location_id: &'static str,
    location_name: &'static str,
    sensor_id: &'static str,
    threshold: Option<&'static str>,
    reading: Option<(f64, &'static str)>,
    age: chrono::Duration,
    acknowledged_ago: Option<chrono::Duration>,
    resolved_ago: Option<chrono::Duration>,
}

impl Seed {
    fn into_alert(self, now: DateTime<Utc>) -> Alert {
        Alert {
            id: self.id.to_string(),
            category: self.category,
            severity: self.severity,
            status: self.status,
            title: self.title.to_string(),
            description: self.description.to_string(),
            location_id: self.location_id.to_string(),
            location_name: self.location_name.to_string(),
            sensor_id: Some(self.sensor_id.to_string()),
            threshold: self.threshold.map(str::to_string),
            value: self.reading.map(|(value, _)| value),
            unit: self.reading.map(|(_, unit)| unit.to_string()),
            created_at: now - self.age,
            acknowledged_at: self.acknowledged_ago.map(|ago| now - ago),
            resolved_at: self.resolved_ago.map(|ago| now - ago),
        }
    }
}

/// The demo alerts shown by a fresh dashboard.
pub fn demo_alerts(now: DateTime<Utc>) -> Vec<Alert> {
    use chrono::Duration as Ago;

    let seeds = vec![
        Seed {
            id: "alrt-001",
            category: AlertCategory::Environment,
            severity: AlertSeverity::Critical,
            status: AlertStatus::Open,
            title: "High temperature spike",
            description: "Temperature exceeded configured ceiling at Warehouse A.",
            location_id: "loc-warehouse-a",
            location_name: "Warehouse A",
            sensor_id: "esp32-01",
            threshold: Some("> 84.0 F"),
            reading: Some((87.6, "F")),
            age: Ago::minutes(8),
            acknowledged_ago: None,
            resolved_ago: None,
        },
        Seed {
            id: "alrt-002",
            category: AlertCategory::Environment,
            severity: AlertSeverity::Warning,
            status: AlertStatus::Open,
            title: "Low humidity window",
            description: "Humidity remained below threshold for 12 minutes.",
            location_id: "loc-greenhouse-2",
            location_name: "Greenhouse 2",
            sensor_id: "esp32-07",
            threshold: Some("< 25%"),
            reading: Some((22.4, "%")),
            age: Ago::minutes(17),
            acknowledged_ago: None,
            resolved_ago: None,
        },
        Seed {
            id: "alrt-003",
            category: AlertCategory::System,
            severity: AlertSeverity::Critical,
            status: AlertStatus::Open,
            title: "Sensor offline",
            description: "No readings received from sensor for 5+ minutes.",
            location_id: "loc-roof-west",
            location_name: "Roof West",
            sensor_id: "esp32-03",
            threshold: None,
            reading: None,
            age: Ago::minutes(11),
            acknowledged_ago: None,
            resolved_ago: None,
        },
        Seed {
            id: "alrt-004",
            category: AlertCategory::System,
            severity: AlertSeverity::Warning,
            status: AlertStatus::Acknowledged,
            title: "Delayed ingestion",
            description: "Data arrival cadence dropped below expected 2-second interval.",
            location_id: "loc-basement",
            location_name: "Basement",
            sensor_id: "esp32-12",
            threshold: None,
            reading: None,
            age: Ago::minutes(42),
            acknowledged_ago: Some(Ago::minutes(20)),
            resolved_ago: None,
        },
        Seed {
            id: "alrt-005",
            category: AlertCategory::Environment,
            severity: AlertSeverity::Info,
            status: AlertStatus::Resolved,
            title: "Threshold breach episode ended",
            description: "Temperature returned to normal band after 26 minutes.",
            location_id: "loc-office",
            location_name: "Office",
            sensor_id: "esp32-02",
            threshold: Some("> 80.0 F"),
            reading: Some((79.1, "F")),
            age: Ago::hours(5),
            acknowledged_ago: None,
            resolved_ago: Some(Ago::hours(4)),
        },
        Seed {
            id: "alrt-006",
            category: AlertCategory::System,
            severity: AlertSeverity::Warning,
            status: AlertStatus::Resolved,
            title: "Packet loss detected",
            description: "Short packet loss burst observed and auto-recovered.",
            location_id: "loc-garage",
            location_name: "Garage",
            sensor_id: "esp32-09",
            threshold: None,
            reading: None,
            age: Ago::hours(8),
            acknowledged_ago: None,
            resolved_ago: Some(Ago::hours(7)),
        },
        Seed {
            id: "alrt-007",
            category: AlertCategory::Environment,
            severity: AlertSeverity::Critical,
            status: AlertStatus::Acknowledged,
            title: "Rapid temperature change",
            description: "Temperature changed by 7.2 F within 4 minutes.",
            location_id: "loc-lab",
            location_name: "Lab",
            sensor_id: "esp32-04",
            threshold: None,
            reading: Some((7.2, "F/4m")),
            age: Ago::minutes(33),
            acknowledged_ago: Some(Ago::minutes(18)),
            resolved_ago: None,
        },
        Seed {
            id: "alrt-008",
            category: AlertCategory::System,
            severity: AlertSeverity::Info,
            status: AlertStatus::Open,
            title: "Sensor recovered",
            description: "Sensor stream resumed after transient disconnect.",
            location_id: "loc-roof-east",
            location_name: "Roof East",
            sensor_id: "esp32-08",
            threshold: None,
            reading: None,
            age: Ago::minutes(6),
            acknowledged_ago: None,
            resolved_ago: None,
        },
    ];

    seeds.into_iter().map(|seed| seed.into_alert(now)).collect()
}
