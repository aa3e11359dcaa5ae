//! Text rendering of log messages.

use std::fmt::Write as _;

use crate::model::MessageEvent;

pub const NO_MESSAGES: &str = "No messages found in log.";

const MICROS_PER_SECOND: u64 = 1_000_000;

/// `H:MM:SS` from microseconds. Sub-second part is truncated; hours do not
/// wrap at a day.
pub fn format_timestamp(timestamp_us: u64) -> String {
    let total = timestamp_us / MICROS_PER_SECOND;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// One `[H:MM:SS] text` line per event, in the given order.
pub fn format_messages(events: &[MessageEvent]) -> String {
    if events.is_empty() {
        return NO_MESSAGES.to_string();
    }
    let mut out = String::new();
    for (i, event) in events.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "[{}] {}", format_timestamp(event.timestamp_us), event.text);
    }
    out
}
