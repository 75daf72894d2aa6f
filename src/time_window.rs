//! Relative time windows for the dashboard.
//!
//! A [`TimeWindowProvider`] turns a named preset ("last hour") into a
//! concrete `[from, to]` interval and keeps the preset and bucket mirrored
//! into the URL query (`tcPreset`, `tcBucket`).
//!
//! The window end is anchored when the preset or bucket changes and does not
//! advance on its own, so repeated reads return the same interval.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::ParseEnumError;
use crate::query::QueryParams;

/// Query parameter holding the time preset.
pub const PRESET_PARAM: &str = "tcPreset";

/// Query parameter holding the aggregation bucket.
pub const BUCKET_PARAM: &str = "tcBucket";

/// A named relative time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimePreset {
    #[serde(rename = "15m")]
    Last15Minutes,
    #[default]
    #[serde(rename = "1h")]
    LastHour,
    #[serde(rename = "6h")]
    Last6Hours,
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
}

impl TimePreset {
    pub const ALL: [TimePreset; 6] = [
        TimePreset::Last15Minutes,
        TimePreset::LastHour,
        TimePreset::Last6Hours,
        TimePreset::Last24Hours,
        TimePreset::Last7Days,
        TimePreset::Last30Days,
    ];

    /// The key used in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimePreset::Last15Minutes => "15m",
            TimePreset::LastHour => "1h",
            TimePreset::Last6Hours => "6h",
            TimePreset::Last24Hours => "24h",
            TimePreset::Last7Days => "7d",
            TimePreset::Last30Days => "30d",
        }
    }

    /// Fixed length of the window.
    pub fn duration(&self) -> Duration {
        match self {
            TimePreset::Last15Minutes => Duration::minutes(15),
            TimePreset::LastHour => Duration::hours(1),
            TimePreset::Last6Hours => Duration::hours(6),
            TimePreset::Last24Hours => Duration::hours(24),
            TimePreset::Last7Days => Duration::days(7),
            TimePreset::Last30Days => Duration::days(30),
        }
    }

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TimePreset::Last15Minutes => "Last 15 Minutes",
            TimePreset::LastHour => "Last Hour",
            TimePreset::Last6Hours => "Last 6 Hours",
            TimePreset::Last24Hours => "Last 24 Hours",
            TimePreset::Last7Days => "Last 7 Days",
            TimePreset::Last30Days => "Last 30 Days",
        }
    }

    /// Compact label for selectors, e.g. "Last 6h".
    pub fn short_label(&self) -> String {
        format!("Last {}", self.as_str())
    }
}

impl FromStr for TimePreset {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimePreset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("preset", s))
    }
}

impl fmt::Display for TimePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display granularity for charts. Carried alongside the window but never
/// used to compute it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeBucket {
    #[serde(rename = "2s")]
    TwoSeconds,
    #[serde(rename = "10s")]
    TenSeconds,
    #[default]
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "1h")]
    OneHour,
}

impl TimeBucket {
    pub const ALL: [TimeBucket; 5] = [
        TimeBucket::TwoSeconds,
        TimeBucket::TenSeconds,
        TimeBucket::OneMinute,
        TimeBucket::FiveMinutes,
        TimeBucket::OneHour,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::TwoSeconds => "2s",
            TimeBucket::TenSeconds => "10s",
            TimeBucket::OneMinute => "1m",
            TimeBucket::FiveMinutes => "5m",
            TimeBucket::OneHour => "1h",
        }
    }
}

impl FromStr for TimeBucket {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeBucket::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("bucket", s))
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved time window. Always `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub preset: TimePreset,
    pub bucket: TimeBucket,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    /// The window for `preset` ending at `anchor`.
    pub fn anchored(preset: TimePreset, bucket: TimeBucket, anchor: DateTime<Utc>) -> Self {
        Self {
            preset,
            bucket,
            from: anchor - preset.duration(),
            to: anchor,
        }
    }

    /// Closed-interval membership: `from <= ts <= to`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from <= ts && ts <= self.to
    }

    pub fn label(&self) -> &'static str {
        self.preset.label()
    }
}

/// Owns the current preset/bucket selection and its URL mirror.
#[derive(Debug, Clone)]
pub struct TimeWindowProvider {
    window: TimeWindow,
    query: QueryParams,
}

impl TimeWindowProvider {
    /// Start with the default preset and bucket, anchored at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::from_query(QueryParams::new(), now)
    }

    /// Restore the selection from a URL query.
    ///
    /// Missing, unknown or repeated values fall back to the defaults
    /// (`1h`, `1m`). The rest of the query is kept untouched.
    pub fn from_query(query: QueryParams, now: DateTime<Utc>) -> Self {
        let preset = match query.get(PRESET_PARAM).map(str::parse::<TimePreset>) {
            Some(Ok(preset)) => preset,
            Some(Err(e)) => {
                debug!(error = %e, "Falling back to default preset");
                TimePreset::default()
            }
            None => TimePreset::default(),
        };
        let bucket = match query.get(BUCKET_PARAM).map(str::parse::<TimeBucket>) {
            Some(Ok(bucket)) => bucket,
            Some(Err(e)) => {
                debug!(error = %e, "Falling back to default bucket");
                TimeBucket::default()
            }
            None => TimeBucket::default(),
        };

        Self {
            window: TimeWindow::anchored(preset, bucket, now),
            query,
        }
    }

    pub fn preset(&self) -> TimePreset {
        self.window.preset
    }

    pub fn bucket(&self) -> TimeBucket {
        self.window.bucket
    }

    /// The frozen window as of the last preset/bucket change.
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// The mirrored URL query.
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Select a preset, re-anchor the window at `now`, and sync the URL.
    pub fn set_preset(&mut self, preset: TimePreset, now: DateTime<Utc>) {
        self.window = TimeWindow::anchored(preset, self.window.bucket, now);
        self.sync_query();
    }

    /// Select a bucket, re-anchor the window at `now`, and sync the URL.
    ///
    /// The window length is unchanged.
    pub fn set_bucket(&mut self, bucket: TimeBucket, now: DateTime<Utc>) {
        self.window = TimeWindow::anchored(self.window.preset, bucket, now);
        self.sync_query();
    }

    /// Like [`set_preset`](Self::set_preset) for a raw key. A rejected key
    /// leaves the selection and the query untouched.
    pub fn set_preset_str(&mut self, raw: &str, now: DateTime<Utc>) -> Result<(), ParseEnumError> {
        let preset = raw.parse()?;
        self.set_preset(preset, now);
        Ok(())
    }

    /// Like [`set_bucket`](Self::set_bucket) for a raw key.
    pub fn set_bucket_str(&mut self, raw: &str, now: DateTime<Utc>) -> Result<(), ParseEnumError> {
        let bucket = raw.parse()?;
        self.set_bucket(bucket, now);
        Ok(())
    }

    /// The mirrored query with both time keys written, whether or not they
    /// were present when the provider was restored.
    pub fn canonical_query(&self) -> QueryParams {
        let mut query = self.query.clone();
        write_time_params(&mut query, &self.window);
        query
    }

    /// Shallow update: only the two time keys are written.
    fn sync_query(&mut self) {
        write_time_params(&mut self.query, &self.window);
        debug!(query = %self.query, "Time window synced to query");
    }
}

fn write_time_params(query: &mut QueryParams, window: &TimeWindow) {
    query.set(PRESET_PARAM, window.preset.as_str());
    query.set(BUCKET_PARAM, window.bucket.as_str());
}
