//! Shared domain types.
//!
//! These types are intentionally small and plain so they can be:
//!
//! - produced by ingest and held read-only for the process lifetime
//! - consumed by both the terminal dashboard and the text reports
//! - exported to CSV without extra conversion

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDateTime, Timelike};
use clap::ValueEnum;

/// One row of the historical traffic table.
///
/// Calendar fields are never stored: they are always recomputed from
/// `timestamp` via [`TrafficRecord::time_fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficRecord {
    pub timestamp: NaiveDateTime,
    pub junction: i64,
    pub vehicles: u64,
}

impl TrafficRecord {
    pub fn time_fields(&self) -> TimeFields {
        TimeFields::from_timestamp(self.timestamp)
    }
}

/// Calendar fields derived from a record timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFields {
    /// 0..=23
    pub hour: u32,
    /// 1..=31
    pub day: u32,
    /// 1..=12
    pub month: u32,
    pub year: i32,
}

impl TimeFields {
    pub fn from_timestamp(ts: NaiveDateTime) -> Self {
        Self {
            hour: ts.hour(),
            day: ts.day(),
            month: ts.month(),
            year: ts.year(),
        }
    }
}

/// Column used to group records in an [`AggregateView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum GroupKey {
    Junction,
    Month,
    Day,
    Year,
}

impl GroupKey {
    /// Dashboard order: junction, month, day, year.
    pub const ALL: [GroupKey; 4] = [GroupKey::Junction, GroupKey::Month, GroupKey::Day, GroupKey::Year];

    /// Key value of `record` for this grouping.
    pub fn key_of(self, record: &TrafficRecord) -> i64 {
        match self {
            GroupKey::Junction => record.junction,
            GroupKey::Month => i64::from(record.timestamp.month()),
            GroupKey::Day => i64::from(record.timestamp.day()),
            GroupKey::Year => i64::from(record.timestamp.year()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupKey::Junction => "junction",
            GroupKey::Month => "month",
            GroupKey::Day => "day",
            GroupKey::Year => "year",
        }
    }

    /// Chart title used by the dashboard and the text summary.
    pub fn title(self) -> &'static str {
        match self {
            GroupKey::Junction => "Vehicles by Junction",
            GroupKey::Month => "Monthly Traffic Analysis",
            GroupKey::Day => "Daily Traffic Analysis",
            GroupKey::Year => "Yearly Traffic Trend",
        }
    }

    /// How the view is drawn: junction and year as lines, month and day as bars.
    pub fn chart_style(self) -> ChartStyle {
        match self {
            GroupKey::Junction | GroupKey::Year => ChartStyle::Line,
            GroupKey::Month | GroupKey::Day => ChartStyle::Bar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    Line,
    Bar,
}

/// Summed vehicles per group key.
///
/// Keys with no records are absent, never present with a zero sum.
/// Iteration is in ascending key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateView {
    pub key: GroupKey,
    pub groups: BTreeMap<i64, u64>,
}

impl AggregateView {
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            groups: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: i64) -> Option<u64> {
        self.groups.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// `(key, sum)` pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.groups.iter().map(|(&k, &v)| (k, v))
    }

    /// Sum over all groups.
    pub fn total(&self) -> u64 {
        self.groups.values().sum()
    }

    pub fn max_value(&self) -> Option<u64> {
        self.groups.values().copied().max()
    }

    /// `(key, sum)` as floats, for chart series.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.iter().map(|(k, v)| (k as f64, v as f64)).collect()
    }
}

/// User-selected inputs for a single prediction.
///
/// No cross-field validation happens here: day 31 in a 30-day month is
/// forwarded to the model unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionRequest {
    pub hour: u32,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub junction: i64,
}

impl PredictionRequest {
    pub fn with_hour(self, hour: u32) -> Self {
        Self { hour, ..self }
    }
}

/// Model input in its fixed positional order:
///
/// `[hour, day, month, year, junction]`
///
/// The model was trained on exactly this column order. The only way to build
/// one is from a [`PredictionRequest`], so the order cannot drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FeatureVector::LEN]);

impl FeatureVector {
    pub const LEN: usize = 5;
    pub const NAMES: [&'static str; FeatureVector::LEN] = ["hour", "day", "month", "year", "junction"];

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl From<&PredictionRequest> for FeatureVector {
    fn from(req: &PredictionRequest) -> Self {
        Self([
            f64::from(req.hour),
            f64::from(req.day),
            f64::from(req.month),
            f64::from(req.year),
            req.junction as f64,
        ])
    }
}

/// Raw model output for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub value: f64,
}

impl PredictionResult {
    /// Value shown to the user: truncated toward zero.
    pub fn display_value(&self) -> i64 {
        self.value.trunc() as i64
    }
}

impl std::fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_value())
    }
}

/// Whole-dataset KPIs and time span.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub n_records: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
    pub total_vehicles: u64,
    /// `None` for an empty dataset.
    pub mean_vehicles: Option<f64>,
}

/// Startup configuration as understood by the pipeline.
///
/// This is derived from CLI flags, environment, and defaults.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub initial: PredictionRequest,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(y: i32, m: u32, d: u32, h: u32, junction: i64, vehicles: u64) -> TrafficRecord {
        TrafficRecord {
            timestamp: NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap(),
            junction,
            vehicles,
        }
    }

    #[test]
    fn time_fields_follow_timestamp() {
        let r = record(2017, 6, 30, 23, 4, 12);
        assert_eq!(
            r.time_fields(),
            TimeFields { hour: 23, day: 30, month: 6, year: 2017 }
        );
        assert_eq!(GroupKey::Day.key_of(&r), 30);
        assert_eq!(GroupKey::Junction.key_of(&r), 4);
    }

    #[test]
    fn feature_vector_keeps_fixed_order() {
        let req = PredictionRequest { hour: 10, day: 15, month: 6, year: 2023, junction: 1 };
        let fv = FeatureVector::from(&req);
        assert_eq!(fv.as_slice(), &[10.0, 15.0, 6.0, 2023.0, 1.0]);
    }

    #[test]
    fn display_value_truncates_toward_zero() {
        assert_eq!(PredictionResult { value: 42.9 }.display_value(), 42);
        assert_eq!(PredictionResult { value: -3.7 }.display_value(), -3);
        assert_eq!(PredictionResult { value: 42.0 }.to_string(), "42");
    }
}
