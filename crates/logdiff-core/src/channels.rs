//! Actual-versus-desired channel pairs and their tracking error.

use serde::Serialize;

use crate::extract::TIME_S;
use crate::model::TimeSeries;

/// A measured channel and the setpoint it should follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelPair {
    pub title: &'static str,
    pub actual: &'static str,
    pub desired: &'static str,
    pub unit: &'static str,
}

pub const PITCH: ChannelPair = ChannelPair {
    title: "Pitch vs. Desired Pitch",
    actual: "Pitch",
    desired: "DesPitch",
    unit: "deg",
};

pub const ROLL: ChannelPair = ChannelPair {
    title: "Roll vs. Desired Roll",
    actual: "Roll",
    desired: "DesRoll",
    unit: "deg",
};

pub const YAW: ChannelPair = ChannelPair {
    title: "Yaw vs. Desired Yaw",
    actual: "Yaw",
    desired: "DesYaw",
    unit: "deg",
};

pub const ALTITUDE: ChannelPair = ChannelPair {
    title: "Altitude vs. Desired Altitude",
    actual: "Alt",
    desired: "DAlt",
    unit: "m",
};

pub const CHANNEL_PAIRS: [ChannelPair; 4] = [PITCH, ROLL, YAW, ALTITUDE];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelStats {
    Available {
        samples: usize,
        rms_error: f64,
        max_abs_error: f64,
        duration_s: f64,
    },
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub channel: ChannelPair,
    #[serde(flatten)]
    pub stats: ChannelStats,
}

/// Tracking error of every standard pair over `series`.
pub fn summarize_channels(series: &TimeSeries) -> Vec<ChannelSummary> {
    CHANNEL_PAIRS
        .iter()
        .map(|pair| summarize_pair(series, *pair))
        .collect()
}

/// Uses only records holding both fields; `NoData` when there are none.
pub fn summarize_pair(series: &TimeSeries, channel: ChannelPair) -> ChannelSummary {
    let mut samples = 0usize;
    let mut sum_sq = 0.0;
    let mut max_abs: f64 = 0.0;
    let mut first_ts = None;
    let mut last_ts = None;

    for record in series {
        let (Some(actual), Some(desired)) = (record.get(channel.actual), record.get(channel.desired))
        else {
            continue;
        };
        let err = actual - desired;
        if !err.is_finite() {
            continue;
        }
        samples += 1;
        sum_sq += err * err;
        max_abs = max_abs.max(err.abs());
        let t = record
            .get(TIME_S)
            .unwrap_or(record.timestamp_us as f64 / 1_000_000.0);
        first_ts.get_or_insert(t);
        last_ts = Some(t);
    }

    let stats = match (first_ts, last_ts) {
        (Some(first), Some(last)) if samples > 0 => ChannelStats::Available {
            samples,
            rms_error: (sum_sq / samples as f64).sqrt(),
            max_abs_error: max_abs,
            duration_s: last - first,
        },
        _ => ChannelStats::NoData,
    };
    ChannelSummary { channel, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeSeriesRecord;

    #[test]
    fn rms_and_max_over_paired_samples() {
        let series: TimeSeries = vec![
            TimeSeriesRecord::new(1_000_000)
                .with_field("Roll", 1.0)
                .with_field("DesRoll", 0.0),
            TimeSeriesRecord::new(2_000_000)
                .with_field("Roll", -3.0)
                .with_field("DesRoll", 0.0),
            TimeSeriesRecord::new(3_000_000).with_field("Roll", 100.0),
        ]
        .into();
        let summary = summarize_pair(&series, ROLL);
        match summary.stats {
            ChannelStats::Available {
                samples,
                rms_error,
                max_abs_error,
                duration_s,
            } => {
                assert_eq!(samples, 2);
                assert!((rms_error - 5.0_f64.sqrt()).abs() < 1e-12);
                assert_eq!(max_abs_error, 3.0);
                assert_eq!(duration_s, 1.0);
            }
            ChannelStats::NoData => panic!("expected data"),
        }
    }

    #[test]
    fn missing_columns_report_no_data() {
        let series: TimeSeries = vec![TimeSeriesRecord::new(0).with_field("Roll", 1.0)].into();
        let summaries = summarize_channels(&series);
        assert_eq!(summaries.len(), 4);
        assert!(summaries.iter().all(|s| s.stats == ChannelStats::NoData));
    }
}
