//! Nearest-timestamp (as-of) alignment of two time series from one log.

use serde::{Deserialize, Serialize};

use crate::model::{TimeSeries, TimeSeriesRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlignOptions {
    /// Farthest a secondary record may be from the primary timestamp and
    /// still be merged. No limit when `None`.
    pub tolerance_us: Option<u64>,
}

/// Merge `secondary` onto `primary` by nearest timestamp.
///
/// Each primary record takes the fields of the secondary record closest in
/// time; equidistant candidates resolve to the earlier one. Primary fields
/// win on name collisions. The result has exactly the primary's records,
/// in the primary's order. Both inputs must be sorted by timestamp.
pub fn align_as_of(primary: &TimeSeries, secondary: &TimeSeries) -> TimeSeries {
    align_as_of_with(primary, secondary, AlignOptions::default())
}

/// [`align_as_of`] with options.
///
/// Both inputs must be sorted by timestamp; this is checked in debug
/// builds only. Unsorted input never panics or wraps, but a record that
/// goes back in time is matched against the sweep's current position
/// rather than its true nearest neighbour.
pub fn align_as_of_with(
    primary: &TimeSeries,
    secondary: &TimeSeries,
    options: AlignOptions,
) -> TimeSeries {
    if secondary.is_empty() {
        return primary.clone();
    }
    debug_assert!(primary.is_time_ordered(), "primary series must be sorted");
    debug_assert!(secondary.is_time_ordered(), "secondary series must be sorted");

    let mut sweep = NearestSweep::new(secondary.records());
    let aligned: TimeSeries = primary
        .iter()
        .map(|record| {
            let mut merged = record.clone();
            if let Some(nearest) = sweep.nearest(record.timestamp_us) {
                let within = options
                    .tolerance_us
                    .map_or(true, |tol| nearest.timestamp_us.abs_diff(record.timestamp_us) <= tol);
                if within {
                    for (name, value) in &nearest.fields {
                        merged.fields.entry(name.clone()).or_insert(*value);
                    }
                }
            }
            merged
        })
        .collect();

    tracing::debug!(
        primary = primary.len(),
        secondary = secondary.len(),
        "aligned series"
    );
    aligned
}

/// Forward-only cursor over a sorted series.
///
/// Queries must come in non-decreasing timestamp order; the cursor never
/// moves backwards, so a full pass costs O(n + m).
struct NearestSweep<'a> {
    records: &'a [TimeSeriesRecord],
    /// First record of the latest timestamp group at or before the last query.
    before: Option<usize>,
    /// First record strictly after the last query.
    next: usize,
}

impl<'a> NearestSweep<'a> {
    fn new(records: &'a [TimeSeriesRecord]) -> Self {
        Self {
            records,
            before: None,
            next: 0,
        }
    }

    fn nearest(&mut self, timestamp_us: u64) -> Option<&'a TimeSeriesRecord> {
        let records = self.records;
        while let Some(candidate) = records.get(self.next) {
            if candidate.timestamp_us > timestamp_us {
                break;
            }
            let starts_group = self
                .before
                .map_or(true, |b| records[b].timestamp_us != candidate.timestamp_us);
            if starts_group {
                self.before = Some(self.next);
            }
            self.next += 1;
        }

        let before = self.before.map(|i| &records[i]);
        let after = records.get(self.next);
        match (before, after) {
            (Some(b), Some(a)) => {
                let to_before = timestamp_us.abs_diff(b.timestamp_us);
                let to_after = a.timestamp_us.abs_diff(timestamp_us);
                // Ties go to the earlier record.
                Some(if to_after < to_before { a } else { b })
            }
            (Some(b), None) => Some(b),
            (None, a) => a,
        }
    }
}
