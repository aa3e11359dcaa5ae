//! Typed row extraction on top of a [`LogDecoder`].
//!
//! The decoder hands back text cells. Here they become typed values, rows
//! that do not fit the schema are dropped and counted, and every kept row
//! gets a derived `TimeS` column next to the raw `TimeUS` timestamp.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::decoder::{DecodedTable, LogDecoder, RawRecord};
use crate::error::{DecodeError, MalformedRecord};
use crate::model::{MessageEvent, ParameterMap, TimeSeries, TimeSeriesRecord};

pub const TIME_US: &str = "TimeUS";
pub const TIME_S: &str = "TimeS";
pub const PARAM_NAME: &str = "Name";
pub const PARAM_VALUE: &str = "Value";
pub const MESSAGE_TEXT: &str = "Message";

/// Columns kept verbatim even when the text looks numeric.
const TEXT_COLUMNS: [&str; 2] = [PARAM_NAME, MESSAGE_TEXT];

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// A decoded cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Integer first, then float, otherwise text. Numbers may be padded
    /// with whitespace; text is kept exactly as given.
    pub fn parse(cell: &str) -> Self {
        let trimmed = cell.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Integer(i);
        }
        match trimmed.parse::<f64>() {
            Ok(f) => Self::Float(f),
            Err(_) => Self::Text(cell.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Non-negative whole number, accepting integral floats.
    pub fn as_timestamp(&self) -> Option<u64> {
        match self {
            Self::Integer(i) => u64::try_from(*i).ok(),
            Self::Float(f) if f.is_finite() && *f >= 0.0 && f.fract() == 0.0 => Some(*f as u64),
            _ => None,
        }
    }

    /// Text rendering of the cell as the decoder printed it.
    pub fn to_text(&self) -> String {
        match self {
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Column name to value.
pub type Row = BTreeMap<String, Value>;

pub fn row_timestamp(row: &Row) -> Option<u64> {
    row.get(TIME_US).and_then(Value::as_timestamp)
}

/// Rows of one record type from one log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub rows: Vec<Row>,
    /// Malformed rows dropped during typing.
    pub skipped: usize,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Decode `path` for `tags` and type the result.
///
/// Fails only when the decoder fails. No rows of the requested type is an
/// empty extraction, not an error.
pub fn extract(
    decoder: &dyn LogDecoder,
    path: &Path,
    tags: &[&str],
    cancel: &CancellationToken,
) -> Result<Extraction, DecodeError> {
    let table = decoder.decode(path, tags, cancel)?;
    let extraction = type_table(&table);

    if extraction.skipped > 0 {
        tracing::warn!(
            log = %path.display(),
            types = %tags.join(","),
            skipped = extraction.skipped,
            "skipped malformed rows"
        );
    }
    tracing::info!(
        log = %path.display(),
        types = %tags.join(","),
        rows = extraction.rows.len(),
        "extracted rows"
    );

    Ok(extraction)
}

/// Type every record of a decoded table, dropping malformed ones.
pub fn type_table(table: &DecodedTable) -> Extraction {
    let mut extraction = Extraction::default();
    for record in &table.records {
        match type_record(&table.headers, record) {
            Ok(row) => extraction.rows.push(row),
            Err(malformed) => {
                tracing::debug!(%malformed, "dropping row");
                extraction.skipped += 1;
            }
        }
    }
    extraction
}

fn type_record(headers: &[String], record: &RawRecord) -> Result<Row, MalformedRecord> {
    let malformed = |reason: String| MalformedRecord {
        line: record.line,
        reason,
    };

    if record.cells.len() != headers.len() {
        return Err(malformed(format!(
            "expected {} cells, found {}",
            headers.len(),
            record.cells.len()
        )));
    }

    let mut row: Row = headers
        .iter()
        .zip(&record.cells)
        .map(|(name, cell)| {
            let value = if TEXT_COLUMNS.contains(&name.as_str()) {
                Value::Text(cell.clone())
            } else {
                Value::parse(cell)
            };
            (name.clone(), value)
        })
        .collect();

    let timestamp = match row.get(TIME_US) {
        None => return Err(malformed(format!("missing {TIME_US} column"))),
        Some(value) => value.as_timestamp().ok_or_else(|| {
            malformed(format!("{TIME_US} is not a timestamp: '{}'", value.to_text()))
        })?,
    };

    row.insert(
        TIME_S.to_string(),
        Value::Float(timestamp as f64 / MICROS_PER_SECOND),
    );
    Ok(row)
}

/// Numeric view of extracted rows.
///
/// Text columns are dropped. Returns `true` alongside the series when the
/// rows were out of timestamp order and had to be sorted.
pub fn time_series(rows: &[Row]) -> (TimeSeries, bool) {
    let mut records: Vec<TimeSeriesRecord> = rows
        .iter()
        .filter_map(|row| {
            let timestamp_us = row_timestamp(row)?;
            let fields = row
                .iter()
                .filter_map(|(name, value)| value.as_f64().map(|v| (name.clone(), v)))
                .collect();
            Some(TimeSeriesRecord {
                timestamp_us,
                fields,
            })
        })
        .collect();

    let reordered = sort_if_needed(&mut records, |r| r.timestamp_us);
    (TimeSeries::from(records), reordered)
}

/// `Name`/`Value` rows to a parameter map.
///
/// A parameter logged more than once keeps its last value. Returns the
/// map and the number of rows that lacked a usable name or value.
pub fn parameter_map(rows: &[Row]) -> (ParameterMap, usize) {
    let mut params = ParameterMap::new();
    let mut skipped = 0;
    for row in rows {
        let name = row.get(PARAM_NAME).and_then(Value::as_text);
        let value = row.get(PARAM_VALUE).and_then(Value::as_f64);
        match (name, value) {
            (Some(name), Some(value)) if !name.is_empty() => {
                params.insert(name.to_string(), value);
            }
            _ => skipped += 1,
        }
    }
    (params, skipped)
}

/// `Message` rows to events in timestamp order.
///
/// Returns the events, the number of rows without a message column and
/// whether the rows had to be sorted.
pub fn message_events(rows: &[Row]) -> (Vec<MessageEvent>, usize, bool) {
    let mut skipped = 0;
    let mut events: Vec<MessageEvent> = rows
        .iter()
        .filter_map(|row| {
            let event = row_timestamp(row)
                .zip(row.get(MESSAGE_TEXT))
                .map(|(ts, text)| MessageEvent::new(ts, text.to_text()));
            if event.is_none() {
                skipped += 1;
            }
            event
        })
        .collect();
    let reordered = sort_if_needed(&mut events, |e| e.timestamp_us);
    (events, skipped, reordered)
}

fn sort_if_needed<T>(items: &mut [T], key: impl Fn(&T) -> u64) -> bool {
    let ordered = items.windows(2).all(|w| key(&w[0]) <= key(&w[1]));
    if !ordered {
        // Stable: equal timestamps keep log order.
        items.sort_by_key(|item| key(item));
    }
    !ordered
}
