//! Alert filtering.
//!
//! All predicates combine conjunctively: an alert is kept only if it
//! satisfies every supplied filter. The time window is a closed interval
//! over `created_at`. Results are ordered newest first; alerts with equal
//! timestamps keep their input order.

use serde::Serialize;

use crate::model::{Alert, AlertCategory, AlertStatus, AlertsRequest};
use crate::time_window::TimeWindow;

/// Whether `alert` satisfies every predicate present in `request`.
pub fn matches(alert: &Alert, request: &AlertsRequest) -> bool {
    request.category.is_none_or(|category| alert.category == category)
        && request.status.is_none_or(|status| alert.status == status)
        && request.severity.is_none_or(|severity| alert.severity == severity)
        && request
            .location_id
            .as_deref()
            .is_none_or(|location_id| alert.location_id == location_id)
}

/// Whether `alert` was created inside `window` (bounds included).
pub fn in_window(alert: &Alert, window: &TimeWindow) -> bool {
    window.contains(alert.created_at)
}

/// Stable sort, newest `created_at` first.
pub fn sort_newest_first(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Copies of the alerts matching `request` inside `window`, newest first.
pub fn filter_alerts<'a, I>(alerts: I, request: &AlertsRequest, window: &TimeWindow) -> Vec<Alert>
where
    I: IntoIterator<Item = &'a Alert>,
{
    let mut matched: Vec<Alert> = alerts
        .into_iter()
        .filter(|alert| matches(alert, request) && in_window(alert, window))
        .cloned()
        .collect();
    sort_newest_first(&mut matched);
    matched
}

/// Keep `selected` only if it names an alert in `visible`.
///
/// Call this with the freshly computed result set, never with a stale one.
pub fn reconcile_selection(selected: Option<&str>, visible: &[Alert]) -> Option<String> {
    selected
        .filter(|id| visible.iter().any(|alert| alert.id == *id))
        .map(str::to_string)
}

/// Open-alert counters shown above the alerts table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCounts {
    pub open: usize,
    pub environment_open: usize,
    pub system_open: usize,
}

impl AlertCounts {
    /// Count open alerts in `alerts`, overall and per category.
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        let mut counts = Self::default();

        for alert in alerts.iter().filter(|a| a.status == AlertStatus::Open) {
            counts.open += 1;
            match alert.category {
                AlertCategory::Environment => counts.environment_open += 1,
                AlertCategory::System => counts.system_open += 1,
            }
        }

        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AlertSeverity;
    use crate::time_window::{TimeBucket, TimePreset};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    fn alert(
        id: &str,
        age: Duration,
        category: AlertCategory,
        severity: AlertSeverity,
        status: AlertStatus,
    ) -> Alert {
        Alert {
            id: id.to_string(),
            category,
            severity,
            status,
            title: format!("Alert {id}"),
            description: String::new(),
            location_id: format!("loc-{id}"),
            location_name: format!("Location {id}"),
            sensor_id: None,
            threshold: None,
            value: None,
            unit: None,
            created_at: now() - age,
            acknowledged_at: None,
            resolved_at: None,
        }
    }

    fn scenario() -> Vec<Alert> {
        vec![
            alert(
                "old",
                Duration::hours(5),
                AlertCategory::Environment,
                AlertSeverity::Info,
                AlertStatus::Resolved,
            ),
            alert(
                "mid",
                Duration::minutes(42),
                AlertCategory::System,
                AlertSeverity::Warning,
                AlertStatus::Acknowledged,
            ),
            alert(
                "new",
                Duration::minutes(8),
                AlertCategory::Environment,
                AlertSeverity::Critical,
                AlertStatus::Open,
            ),
        ]
    }

    fn last_hour() -> TimeWindow {
        TimeWindow::anchored(TimePreset::LastHour, TimeBucket::OneMinute, now())
    }

    fn ids(alerts: &[Alert]) -> Vec<&str> {
        alerts.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_last_hour_excludes_older_alerts() {
        let alerts = scenario();

        let visible = filter_alerts(&alerts, &AlertsRequest::default(), &last_hour());

        assert_eq!(ids(&visible), ["new", "mid"]);
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        let alerts = scenario();
        let window = TimeWindow::anchored(TimePreset::Last24Hours, TimeBucket::OneMinute, now());

        let request = AlertsRequest {
            category: Some(AlertCategory::Environment),
            status: Some(AlertStatus::Open),
            ..Default::default()
        };
        assert_eq!(ids(&filter_alerts(&alerts, &request, &window)), ["new"]);

        let request = AlertsRequest {
            category: Some(AlertCategory::Environment),
            severity: Some(AlertSeverity::Warning),
            ..Default::default()
        };
        assert!(filter_alerts(&alerts, &request, &window).is_empty());

        let request = AlertsRequest {
            location_id: Some("loc-old".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_alerts(&alerts, &request, &window)), ["old"]);
    }

    #[test]
    fn test_every_result_satisfies_every_predicate() {
        let alerts = scenario();
        let window = TimeWindow::anchored(TimePreset::Last30Days, TimeBucket::OneHour, now());

        for category in [None, Some(AlertCategory::Environment), Some(AlertCategory::System)] {
            for status in [None, Some(AlertStatus::Open), Some(AlertStatus::Resolved)] {
                let request = AlertsRequest {
                    category,
                    status,
                    ..Default::default()
                };
                let result = filter_alerts(&alerts, &request, &window);

                assert!(result.iter().all(|a| matches(a, &request)));
                assert!(result.windows(2).all(|w| w[0].created_at >= w[1].created_at));
                let expected = alerts.iter().filter(|a| matches(a, &request)).count();
                assert_eq!(result.len(), expected);
            }
        }
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = last_hour();
        let mut edge = alert(
            "edge",
            Duration::hours(1),
            AlertCategory::System,
            AlertSeverity::Info,
            AlertStatus::Open,
        );
        assert!(in_window(&edge, &window));

        edge.created_at = window.to;
        assert!(in_window(&edge, &window));

        edge.created_at = window.to + Duration::milliseconds(1);
        assert!(!in_window(&edge, &window));
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let mut alerts = vec![
            alert(
                "a",
                Duration::minutes(5),
                AlertCategory::System,
                AlertSeverity::Info,
                AlertStatus::Open,
            ),
            alert(
                "b",
                Duration::minutes(5),
                AlertCategory::System,
                AlertSeverity::Info,
                AlertStatus::Open,
            ),
            alert(
                "c",
                Duration::minutes(1),
                AlertCategory::System,
                AlertSeverity::Info,
                AlertStatus::Open,
            ),
        ];

        sort_newest_first(&mut alerts);

        assert_eq!(ids(&alerts), ["c", "a", "b"]);
    }

    #[test]
    fn test_reconcile_selection() {
        let visible = filter_alerts(&scenario(), &AlertsRequest::default(), &last_hour());

        assert_eq!(
            reconcile_selection(Some("mid"), &visible),
            Some("mid".to_string())
        );
        assert_eq!(reconcile_selection(Some("old"), &visible), None);
        assert_eq!(reconcile_selection(None, &visible), None);
    }

    #[test]
    fn test_open_counts() {
        let mut alerts = scenario();
        alerts.push(alert(
            "sys-open",
            Duration::minutes(1),
            AlertCategory::System,
            AlertSeverity::Critical,
            AlertStatus::Open,
        ));

        let counts = AlertCounts::from_alerts(&alerts);

        assert_eq!(
            counts,
            AlertCounts {
                open: 2,
                environment_open: 1,
                system_open: 1,
            }
        );
    }
}
