use logdiff_core::{align_as_of, TimeSeries, TimeSeriesRecord};
use proptest::prelude::*;

fn sorted_series(field: &'static str) -> impl Strategy<Value = TimeSeries> {
    prop::collection::vec(0u64..10_000, 0..60).prop_map(move |mut ts| {
        ts.sort_unstable();
        ts.into_iter()
            .enumerate()
            .map(|(i, t)| TimeSeriesRecord::new(t).with_field(field, i as f64))
            .collect()
    })
}

/// Brute-force reference: nearest by distance, earlier timestamp on ties,
/// first in order among equal timestamps.
fn nearest_index(secondary: &TimeSeries, t: u64) -> Option<usize> {
    secondary
        .iter()
        .enumerate()
        .min_by_key(|(i, r)| (r.timestamp_us.abs_diff(t), r.timestamp_us, *i))
        .map(|(i, _)| i)
}

proptest! {
    #[test]
    fn aligned_series_keeps_primary_length_and_timestamps(
        primary in sorted_series("Roll"),
        secondary in sorted_series("Alt"),
    ) {
        let aligned = align_as_of(&primary, &secondary);
        prop_assert_eq!(aligned.len(), primary.len());
        prop_assert_eq!(aligned.timestamps(), primary.timestamps());
        prop_assert_eq!(aligned.column("Roll"), primary.column("Roll"));
    }

    #[test]
    fn sweep_matches_brute_force_nearest(
        primary in sorted_series("Roll"),
        secondary in sorted_series("Alt"),
    ) {
        let aligned = align_as_of(&primary, &secondary);
        for (record, out) in primary.iter().zip(aligned.iter()) {
            let expected = nearest_index(&secondary, record.timestamp_us)
                .map(|i| i as f64);
            prop_assert_eq!(out.get("Alt"), expected);
        }
    }
}
