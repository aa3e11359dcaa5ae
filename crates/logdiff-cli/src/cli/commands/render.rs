//! Text and JSON rendering of comparison results.

use logdiff_core::{
    format_messages, format_parameter_diff, summarize_channels, ChannelStats, ChannelSummary,
    ComparisonReport, LogSide, ReportWarning,
};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

pub(crate) const DATA_NOT_FOUND: &str = "Data not found in log.";

#[derive(Serialize)]
struct LogReport<'a> {
    path: &'a Path,
    channels: Vec<ChannelSummary>,
}

#[derive(Serialize)]
struct CompareJson<'a> {
    log1: LogReport<'a>,
    log2: LogReport<'a>,
    #[serde(flatten)]
    report: &'a ComparisonReport,
}

pub(crate) fn compare_json(
    report: &ComparisonReport,
    log1: &Path,
    log2: &Path,
) -> serde_json::Result<String> {
    let doc = CompareJson {
        log1: LogReport {
            path: log1,
            channels: summarize_channels(&report.series1),
        },
        log2: LogReport {
            path: log2,
            channels: summarize_channels(&report.series2),
        },
        report,
    };
    let mut out = serde_json::to_string_pretty(&doc)?;
    out.push('\n');
    Ok(out)
}

pub(crate) fn compare_text(report: &ComparisonReport, log1: &Path, log2: &Path) -> String {
    let mut out = format_parameter_diff(&report.param_diff);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    let sides = [
        ("Log 1", LogSide::First, log1, &report.series1, &report.messages1),
        ("Log 2", LogSide::Second, log2, &report.series2, &report.messages2),
    ];
    for (title, side, path, series, messages) in sides {
        let _ = writeln!(out, "\n--- {title}: {} ---", path.display());
        out.push_str(&channels_text(&summarize_channels(series)));
        let _ = writeln!(out, "\n--- Messages ({side}) ---\n");
        out.push_str(&format_messages(messages));
        out.push('\n');
    }
    out.push_str(&warnings_text(&report.warnings));
    out
}

pub(crate) fn channels_text(summaries: &[ChannelSummary]) -> String {
    let mut out = String::new();
    for summary in summaries {
        let channel = &summary.channel;
        let _ = match &summary.stats {
            ChannelStats::Available {
                samples,
                rms_error,
                max_abs_error,
                duration_s,
            } => writeln!(
                out,
                "{}: rms error {rms_error:.3} {unit}, max {max_abs_error:.3} {unit} ({samples} samples over {duration_s:.1} s)",
                channel.title,
                unit = channel.unit,
            ),
            ChannelStats::NoData => writeln!(out, "{}: {DATA_NOT_FOUND}", channel.title),
        };
    }
    out
}

/// Empty when there is nothing to report.
pub(crate) fn warnings_text(warnings: &[ReportWarning]) -> String {
    if warnings.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n--- Warnings ---\n\n");
    for warning in warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    out
}
