//! Parameter set diff between two logs.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::btree_map;
use std::fmt::Write as _;
use std::iter::Peekable;

use crate::model::{ParameterDiffEntry, ParameterMap};

/// Where a parameter name was found.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Presence {
    OnlyFirst(f64),
    OnlySecond(f64),
    Both(f64, f64),
}

/// Classify every name in either map. Output is ordered by name.
///
/// Absent on one side is tracked explicitly, so any value, including
/// values a fill-based join would use as a placeholder, compares as
/// itself.
pub fn diff_parameters(first: &ParameterMap, second: &ParameterMap) -> Vec<ParameterDiffEntry> {
    PresenceWalk::new(first, second)
        .filter_map(|(name, presence)| {
            let name = name.to_string();
            match presence {
                Presence::OnlyFirst(old_value) => Some(ParameterDiffEntry::Removed { name, old_value }),
                Presence::OnlySecond(new_value) => Some(ParameterDiffEntry::Added { name, new_value }),
                Presence::Both(old_value, new_value) if same_value(old_value, new_value) => None,
                Presence::Both(old_value, new_value) => Some(ParameterDiffEntry::Changed {
                    name,
                    old_value,
                    new_value,
                }),
            }
        })
        .collect()
}

/// Exact comparison; two NaNs count as the same stored value.
fn same_value(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Merge walk over two name-ordered maps.
struct PresenceWalk<'a> {
    first: Peekable<btree_map::Iter<'a, String, f64>>,
    second: Peekable<btree_map::Iter<'a, String, f64>>,
}

impl<'a> PresenceWalk<'a> {
    fn new(first: &'a ParameterMap, second: &'a ParameterMap) -> Self {
        Self {
            first: first.iter().peekable(),
            second: second.iter().peekable(),
        }
    }
}

impl<'a> Iterator for PresenceWalk<'a> {
    type Item = (&'a str, Presence);

    fn next(&mut self) -> Option<Self::Item> {
        let order = match (self.first.peek(), self.second.peek()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((a, _)), Some((b, _))) => a.cmp(b),
        };
        match order {
            Ordering::Less => {
                let (name, v) = self.first.next()?;
                Some((name.as_str(), Presence::OnlyFirst(*v)))
            }
            Ordering::Greater => {
                let (name, v) = self.second.next()?;
                Some((name.as_str(), Presence::OnlySecond(*v)))
            }
            Ordering::Equal => {
                let (name, old) = self.first.next()?;
                let (_, new) = self.second.next()?;
                Some((name.as_str(), Presence::Both(*old, *new)))
            }
        }
    }
}

/// Per-kind counts of a parameter diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParameterDiffSummary {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
}

impl ParameterDiffSummary {
    pub fn of(entries: &[ParameterDiffEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut s, e| {
            match e {
                ParameterDiffEntry::Added { .. } => s.added += 1,
                ParameterDiffEntry::Removed { .. } => s.removed += 1,
                ParameterDiffEntry::Changed { .. } => s.changed += 1,
            }
            s
        })
    }

    pub fn total(&self) -> usize {
        self.added + self.removed + self.changed
    }
}

/// Render a parameter diff as the text panel shown to analysts.
pub fn format_parameter_diff(entries: &[ParameterDiffEntry]) -> String {
    let mut out = String::from("--- Changed Parameters ---\n\n");
    if entries.is_empty() {
        out.push_str("No differences found.");
        return out;
    }
    for entry in entries {
        let _ = match entry {
            ParameterDiffEntry::Added { name, new_value } => {
                writeln!(out, "ADDED:   {name} = {}", format_value(*new_value))
            }
            ParameterDiffEntry::Removed { name, old_value } => {
                writeln!(out, "REMOVED: {name} (was {})", format_value(*old_value))
            }
            ParameterDiffEntry::Changed {
                name,
                old_value,
                new_value,
            } => writeln!(
                out,
                "CHANGED: {name}: {} -> {}",
                format_value(*old_value),
                format_value(*new_value)
            ),
        };
    }
    out
}

/// Shortest round-trip form with a decimal point (`1.0`, `0.15`).
pub fn format_value(v: f64) -> String {
    format!("{v:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f64)]) -> ParameterMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn identical_maps_have_no_diff() {
        let m = map(&[("A", 1.0), ("B", 0.5)]);
        assert!(diff_parameters(&m, &m).is_empty());
    }

    #[test]
    fn added_removed_changed_are_classified_once() {
        let first = map(&[("KEEP", 3.0), ("GONE", 4.0), ("TUNE", 1.0)]);
        let second = map(&[("KEEP", 3.0), ("NEW", 7.0), ("TUNE", 2.0)]);
        let diff = diff_parameters(&first, &second);
        assert_eq!(
            diff,
            vec![
                ParameterDiffEntry::Removed {
                    name: "GONE".into(),
                    old_value: 4.0
                },
                ParameterDiffEntry::Added {
                    name: "NEW".into(),
                    new_value: 7.0
                },
                ParameterDiffEntry::Changed {
                    name: "TUNE".into(),
                    old_value: 1.0,
                    new_value: 2.0
                },
            ]
        );
    }

    #[test]
    fn placeholder_like_values_are_real_values() {
        let first = map(&[("OFFSET", -9999.0)]);
        let second = map(&[("OFFSET", -9999.0), ("OTHER", -9999.0)]);
        assert_eq!(
            diff_parameters(&first, &second),
            vec![ParameterDiffEntry::Added {
                name: "OTHER".into(),
                new_value: -9999.0
            }]
        );
        assert_eq!(
            diff_parameters(&second, &map(&[])),
            vec![
                ParameterDiffEntry::Removed {
                    name: "OFFSET".into(),
                    old_value: -9999.0
                },
                ParameterDiffEntry::Removed {
                    name: "OTHER".into(),
                    old_value: -9999.0
                },
            ]
        );
    }

    #[test]
    fn nan_on_both_sides_is_unchanged() {
        let m = map(&[("X", f64::NAN)]);
        assert!(diff_parameters(&m, &m.clone()).is_empty());
    }

    #[test]
    fn summary_counts_each_kind() {
        let diff = diff_parameters(&map(&[("A", 1.0), ("B", 1.0)]), &map(&[("B", 2.0), ("C", 1.0)]));
        let summary = ParameterDiffSummary::of(&diff);
        assert_eq!((summary.added, summary.removed, summary.changed), (1, 1, 1));
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn text_panel_lists_each_kind() {
        let diff = diff_parameters(&map(&[("A", 1.0), ("B", 1.0)]), &map(&[("B", 2.5), ("C", 0.0)]));
        assert_eq!(
            format_parameter_diff(&diff),
            "--- Changed Parameters ---\n\n\
             REMOVED: A (was 1.0)\n\
             CHANGED: B: 1.0 -> 2.5\n\
             ADDED:   C = 0.0\n"
        );
    }

    #[test]
    fn text_panel_for_no_changes() {
        assert_eq!(
            format_parameter_diff(&[]),
            "--- Changed Parameters ---\n\nNo differences found."
        );
    }
}
