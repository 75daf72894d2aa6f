//! URL query state.
//!
//! The dashboard keeps its view state in the page URL so that a reload or a
//! shared link restores it. This module is the typed mapping between that
//! state and the string-keyed query: [`QueryParams`] is the raw side, and
//! [`AlertsViewQuery`] is the alerts view's typed side.
//!
//! Decoding never fails. Unknown, malformed, or ambiguous (repeated) values
//! are ignored and the corresponding default applies.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::model::{AlertCategory, AlertSeverity, AlertStatus, AlertsRequest};

/// Query parameter for the selected alert category.
pub const CATEGORY_PARAM: &str = "category";
/// Query parameter for the selected alert status.
pub const STATUS_PARAM: &str = "status";
/// Query parameter for the selected alert severity.
pub const SEVERITY_PARAM: &str = "severity";
/// Query parameter for the selected location.
pub const LOCATION_PARAM: &str = "locationId";
/// Query parameter for the alert shown in the detail drawer.
pub const ALERT_ID_PARAM: &str = "alertId";

/// An ordered multimap of URL query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw query string (without the leading `?`).
    ///
    /// `+` decodes to a space. Pairs without `=` get an empty value. An
    /// escape that does not decode to UTF-8 keeps its raw text.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = raw
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();

        Self { pairs }
    }

    /// The value of `key` if it occurs exactly once.
    ///
    /// A repeated key is ambiguous and treated as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        let mut values = self.get_all(key);
        let first = values.next()?;
        if values.next().is_some() {
            debug!(key, "Ignoring repeated query parameter");
            return None;
        }
        Some(first)
    }

    /// Every value of `key`, in order.
    pub fn get_all<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key` to a single value.
    ///
    /// The first occurrence keeps its position; later duplicates are dropped.
    /// A new key is appended.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.pairs[index].1 = value;
                let mut seen = 0usize;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// Remove every occurrence of `key`.
    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// Set `key` when `value` is present, remove it otherwise.
    pub fn set_or_remove(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(value) => self.set(key, value),
            None => self.remove(key),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.pairs.iter().enumerate() {
            if index > 0 {
                f.write_str("&")?;
            }
            write!(
                f,
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )?;
        }
        Ok(())
    }
}

impl Serialize for QueryParams {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Category selection on the alerts view. `All` leaves category unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Environment,
    System,
}

impl CategoryFilter {
    pub fn category(&self) -> Option<AlertCategory> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Environment => Some(AlertCategory::Environment),
            CategoryFilter::System => Some(AlertCategory::System),
        }
    }

    /// Parse a query value; anything unrecognized selects `All`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::parse::<AlertCategory>) {
            Some(Ok(category)) => category.into(),
            Some(Err(e)) => {
                debug!(error = %e, "Ignoring category filter");
                CategoryFilter::All
            }
            None => CategoryFilter::All,
        }
    }
}

impl From<AlertCategory> for CategoryFilter {
    fn from(category: AlertCategory) -> Self {
        match category {
            AlertCategory::Environment => CategoryFilter::Environment,
            AlertCategory::System => CategoryFilter::System,
        }
    }
}

/// Status selection on the alerts view. `All` leaves status unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Open,
    Acknowledged,
    Resolved,
}

impl StatusFilter {
    pub fn status(&self) -> Option<AlertStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Open => Some(AlertStatus::Open),
            StatusFilter::Acknowledged => Some(AlertStatus::Acknowledged),
            StatusFilter::Resolved => Some(AlertStatus::Resolved),
        }
    }

    /// Parse a query value; anything unrecognized selects `All`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::parse::<AlertStatus>) {
            Some(Ok(status)) => status.into(),
            Some(Err(e)) => {
                debug!(error = %e, "Ignoring status filter");
                StatusFilter::All
            }
            None => StatusFilter::All,
        }
    }
}

impl From<AlertStatus> for StatusFilter {
    fn from(status: AlertStatus) -> Self {
        match status {
            AlertStatus::Open => StatusFilter::Open,
            AlertStatus::Acknowledged => StatusFilter::Acknowledged,
            AlertStatus::Resolved => StatusFilter::Resolved,
        }
    }
}

/// The alerts view's URL state: filters plus the alert open in the drawer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsViewQuery {
    pub category: CategoryFilter,
    pub status: StatusFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<AlertSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<String>,
}

impl AlertsViewQuery {
    /// Read the view state from a URL query, defaulting anything invalid.
    pub fn from_query(query: &QueryParams) -> Self {
        let severity = match query.get(SEVERITY_PARAM).map(str::parse::<AlertSeverity>) {
            Some(Ok(severity)) => Some(severity),
            Some(Err(e)) => {
                debug!(error = %e, "Ignoring severity filter");
                None
            }
            None => None,
        };

        Self {
            category: CategoryFilter::from_param(query.get(CATEGORY_PARAM)),
            status: StatusFilter::from_param(query.get(STATUS_PARAM)),
            severity,
            location_id: non_empty(query.get(LOCATION_PARAM)),
            alert_id: non_empty(query.get(ALERT_ID_PARAM)),
        }
    }

    /// Write the view state into `query`. `All` filters and absent values
    /// are removed rather than written.
    pub fn write_query(&self, query: &mut QueryParams) {
        query.set_or_remove(
            CATEGORY_PARAM,
            self.category.category().as_ref().map(AlertCategory::as_str),
        );
        query.set_or_remove(
            STATUS_PARAM,
            self.status.status().as_ref().map(AlertStatus::as_str),
        );
        query.set_or_remove(
            SEVERITY_PARAM,
            self.severity.as_ref().map(AlertSeverity::as_str),
        );
        query.set_or_remove(LOCATION_PARAM, self.location_id.as_deref());
        query.set_or_remove(ALERT_ID_PARAM, self.alert_id.as_deref());
    }

    /// The predicates to request from the alert source.
    pub fn to_request(&self) -> AlertsRequest {
        AlertsRequest {
            category: self.category.category(),
            status: self.status.status(),
            severity: self.severity,
            location_id: self.location_id.clone(),
        }
    }

    /// Change the category filter. The drawer closes.
    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self.alert_id = None;
        self
    }

    /// Change the status filter. The drawer closes.
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self.alert_id = None;
        self
    }

    /// Open the drawer on `alert_id`, keeping the filters.
    pub fn select(mut self, alert_id: impl Into<String>) -> Self {
        self.alert_id = Some(alert_id.into());
        self
    }

    /// Close the drawer, keeping the filters.
    pub fn close(mut self) -> Self {
        self.alert_id = None;
        self
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
