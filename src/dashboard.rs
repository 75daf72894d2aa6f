//! The alerts dashboard view.
//!
//! One [`AlertsDashboard::load`] call is one render of the alerts page: it
//! asks the alert source for the filtered list, narrows it to the time
//! window, computes the counters, and decides whether the detail drawer can
//! stay open on the selected alert.
//!
//! # Usage
//!
//! ```ignore
//! let dashboard = AlertsDashboard::new(store);
//! let view = dashboard.load(&view_query, &time_window).await;
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::filter::{AlertCounts, filter_alerts, reconcile_selection};
use crate::model::Alert;
use crate::query::{AlertsViewQuery, QueryParams};
use crate::storage::AlertSource;
use crate::time_window::{TimeWindow, TimeWindowProvider};

/// Everything the alerts page renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsView {
    /// When this view was computed.
    pub generated_at: DateTime<Utc>,

    pub window: TimeWindow,

    /// Human-readable window label, e.g. "Last Hour".
    pub window_label: &'static str,

    /// The filters in effect. The selection here is already reconciled.
    pub filters: AlertsViewQuery,

    /// Matching alerts inside the window, newest first.
    pub alerts: Vec<Alert>,

    pub count: usize,

    pub counts: AlertCounts,

    /// The alert open in the drawer, if it is part of `alerts`.
    pub selected: Option<Alert>,

    /// True when a requested selection was dropped because it fell outside
    /// the result.
    pub selection_cleared: bool,

    /// The canonical URL query for this view.
    pub query: QueryParams,
}

/// Builds [`AlertsView`]s from an alert source.
#[derive(Clone)]
pub struct AlertsDashboard<S> {
    source: S,
}

impl<S: AlertSource> AlertsDashboard<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Compute the alerts view for `filters` inside the provider's window.
    ///
    /// A failing source is logged and rendered as an empty list.
    pub async fn load(&self, filters: &AlertsViewQuery, time: &TimeWindowProvider) -> AlertsView {
        let window = time.window();

        let fetched = match self.source.get_alerts(filters.to_request()).await {
            Ok(page) => page.data,
            Err(e) => {
                warn!(error = %e, "Failed to fetch alerts");
                Vec::new()
            }
        };

        // Selection is reconciled only against the fresh result.
        let alerts = filter_alerts(&fetched, &filters.to_request(), &window);
        let alert_id = reconcile_selection(filters.alert_id.as_deref(), &alerts);
        let selection_cleared = filters.alert_id.is_some() && alert_id.is_none();
        if selection_cleared {
            debug!(
                alert_id = filters.alert_id.as_deref().unwrap_or_default(),
                "Selected alert outside result, closing drawer"
            );
        }

        let filters = AlertsViewQuery {
            alert_id,
            ..filters.clone()
        };
        let selected = filters
            .alert_id
            .as_deref()
            .and_then(|id| alerts.iter().find(|alert| alert.id == id))
            .cloned();

        let mut query = time.canonical_query();
        filters.write_query(&mut query);

        AlertsView {
            generated_at: Utc::now(),
            window,
            window_label: window.label(),
            counts: AlertCounts::from_alerts(&alerts),
            count: alerts.len(),
            alerts,
            filters,
            selected,
            selection_cleared,
            query,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlertStatus, AlertsPage, AlertsRequest};
    use crate::query::{CategoryFilter, StatusFilter};
    use crate::storage::{AlertStore, StorageError};
    use crate::time_window::TimePreset;
    use std::time::Duration;

    struct FailingSource;

    impl AlertSource for FailingSource {
        async fn get_alerts(&self, _request: AlertsRequest) -> Result<AlertsPage, StorageError> {
            Err(StorageError::Unavailable("backend offline".to_string()))
        }
    }

    fn dashboard() -> (AlertsDashboard<AlertStore>, DateTime<Utc>) {
        let now = Utc::now();
        (
            AlertsDashboard::new(AlertStore::seeded(now, Duration::ZERO)),
            now,
        )
    }

    fn ids(view: &AlertsView) -> Vec<&str> {
        view.alerts.iter().map(|a| a.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_last_hour_view() {
        let (dashboard, now) = dashboard();
        let time = TimeWindowProvider::new(now);

        let view = dashboard.load(&AlertsViewQuery::default(), &time).await;

        assert_eq!(
            ids(&view),
            ["alrt-008", "alrt-001", "alrt-003", "alrt-002", "alrt-007", "alrt-004"]
        );
        assert_eq!(view.count, 6);
        assert_eq!(view.counts.open, 4);
        assert_eq!(view.counts.environment_open, 2);
        assert_eq!(view.counts.system_open, 2);
        assert_eq!(view.window_label, "Last Hour");
    }

    #[tokio::test]
    async fn test_wider_window_and_filters() {
        let (dashboard, now) = dashboard();
        let mut time = TimeWindowProvider::new(now);
        time.set_preset(TimePreset::Last24Hours, now);

        let filters = AlertsViewQuery::default().with_status(StatusFilter::Resolved);
        let view = dashboard.load(&filters, &time).await;

        assert_eq!(ids(&view), ["alrt-005", "alrt-006"]);
        assert!(view.alerts.iter().all(|a| a.status == AlertStatus::Resolved));
        assert_eq!(view.counts.open, 0);
        assert_eq!(view.query.to_string(), "tcPreset=24h&tcBucket=1m&status=resolved");
    }

    #[tokio::test]
    async fn test_selection_inside_result_is_kept() {
        let (dashboard, now) = dashboard();
        let time = TimeWindowProvider::new(now);

        let filters = AlertsViewQuery::default()
            .with_category(CategoryFilter::System)
            .select("alrt-004");
        let view = dashboard.load(&filters, &time).await;

        assert!(!view.selection_cleared);
        assert_eq!(view.filters.alert_id.as_deref(), Some("alrt-004"));
        assert_eq!(
            view.selected.as_ref().map(|a| a.title.as_str()),
            Some("Delayed ingestion")
        );
        assert_eq!(view.query.get("alertId"), Some("alrt-004"));
    }

    #[tokio::test]
    async fn test_selection_outside_window_is_cleared() {
        let (dashboard, now) = dashboard();
        let time = TimeWindowProvider::new(now);

        // alrt-005 is five hours old.
        let filters = AlertsViewQuery::default().select("alrt-005");
        let view = dashboard.load(&filters, &time).await;

        assert!(view.selection_cleared);
        assert!(view.selected.is_none());
        assert_eq!(view.filters.alert_id, None);
        assert_eq!(view.query.get("alertId"), None);
    }

    #[tokio::test]
    async fn test_selection_outside_filter_is_cleared() {
        let (dashboard, now) = dashboard();
        let time = TimeWindowProvider::new(now);

        let filters = AlertsViewQuery {
            category: CategoryFilter::Environment,
            alert_id: Some("alrt-003".to_string()),
            ..Default::default()
        };
        let view = dashboard.load(&filters, &time).await;

        assert!(view.selection_cleared);
        assert_eq!(view.filters.category, CategoryFilter::Environment);
    }

    #[tokio::test]
    async fn test_failing_source_renders_empty() {
        let dashboard = AlertsDashboard::new(FailingSource);
        let time = TimeWindowProvider::new(Utc::now());

        let view = dashboard
            .load(&AlertsViewQuery::default().select("alrt-001"), &time)
            .await;

        assert!(view.alerts.is_empty());
        assert_eq!(view.count, 0);
        assert!(view.selection_cleared);
    }
}
