//! Report data model: time series, parameters, messages and the comparison report.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::LogSide;
use crate::record_type::RecordType;

/// One sample of a time series: a timestamp plus named numeric fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesRecord {
    pub timestamp_us: u64,
    pub fields: BTreeMap<String, f64>,
}

impl TimeSeriesRecord {
    pub fn new(timestamp_us: u64) -> Self {
        Self {
            timestamp_us,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }
}

/// Records ordered by non-decreasing timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimeSeries(Vec<TimeSeriesRecord>);

impl TimeSeries {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeSeriesRecord> {
        self.0.iter()
    }

    pub fn records(&self) -> &[TimeSeriesRecord] {
        &self.0
    }

    pub fn timestamps(&self) -> Vec<u64> {
        self.0.iter().map(|r| r.timestamp_us).collect()
    }

    /// True if any record carries `name`.
    pub fn has_field(&self, name: &str) -> bool {
        self.0.iter().any(|r| r.fields.contains_key(name))
    }

    /// Values of one field, aligned with the records.
    pub fn column(&self, name: &str) -> Vec<Option<f64>> {
        self.0.iter().map(|r| r.get(name)).collect()
    }

    pub fn is_time_ordered(&self) -> bool {
        self.0
            .windows(2)
            .all(|w| w[0].timestamp_us <= w[1].timestamp_us)
    }
}

impl From<Vec<TimeSeriesRecord>> for TimeSeries {
    fn from(records: Vec<TimeSeriesRecord>) -> Self {
        Self(records)
    }
}

impl FromIterator<TimeSeriesRecord> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = TimeSeriesRecord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a TimeSeriesRecord;
    type IntoIter = std::slice::Iter<'a, TimeSeriesRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parameter name to value, one per log.
pub type ParameterMap = BTreeMap<String, f64>;

/// A parameter that differs between the two logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterDiffEntry {
    Added {
        name: String,
        new_value: f64,
    },
    Removed {
        name: String,
        old_value: f64,
    },
    Changed {
        name: String,
        old_value: f64,
        new_value: f64,
    },
}

impl ParameterDiffEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Added { name, .. } | Self::Removed { name, .. } | Self::Changed { name, .. } => {
                name
            }
        }
    }
}

/// A timestamped text event from the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageEvent {
    pub timestamp_us: u64,
    pub text: String,
}

impl MessageEvent {
    pub fn new(timestamp_us: u64, text: impl Into<String>) -> Self {
        Self {
            timestamp_us,
            text: text.into(),
        }
    }
}

/// Non-fatal issue surfaced next to a best-effort report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportWarning {
    /// Rows dropped because they did not fit the expected schema.
    SkippedRows {
        log: LogSide,
        record_type: RecordType,
        count: usize,
    },
    /// Requested record type produced no rows.
    NoData {
        log: LogSide,
        record_type: RecordType,
    },
    /// Rows arrived out of timestamp order and were re-sorted.
    Reordered {
        log: LogSide,
        record_type: RecordType,
    },
}

impl std::fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SkippedRows {
                log,
                record_type,
                count,
            } => write!(f, "{log}: skipped {count} malformed {record_type} row(s)"),
            Self::NoData { log, record_type } => {
                write!(f, "{log}: no {record_type} data found")
            }
            Self::Reordered { log, record_type } => {
                write!(f, "{log}: {record_type} rows were out of order and have been sorted")
            }
        }
    }
}

/// Everything one comparison run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub param_diff: Vec<ParameterDiffEntry>,
    pub series1: TimeSeries,
    pub series2: TimeSeries,
    pub messages1: Vec<MessageEvent>,
    pub messages2: Vec<MessageEvent>,
    pub warnings: Vec<ReportWarning>,
}

impl ComparisonReport {
    pub fn has_parameter_changes(&self) -> bool {
        !self.param_diff.is_empty()
    }
}
