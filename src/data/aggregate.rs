use std::collections::BTreeMap;

use super::model::{Dataset, ID};

/// One point of a per-year series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearValue<T> {
    pub year: i64,
    pub value: T,
}

/// Mean `duration_s` per year, ascending by year.
///
/// Tracks without a year or a numeric duration do not contribute.
pub fn mean_duration_by_year(dataset: &Dataset) -> Vec<YearValue<f64>> {
    let mut sums: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for track in &dataset.tracks {
        let (Some(year), Some(duration)) = (track.year(), track.duration_s()) else {
            continue;
        };
        let entry = sums.entry(year).or_default();
        entry.0 += duration;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(year, (sum, n))| YearValue {
            year,
            value: sum / n as f64,
        })
        .collect()
}

/// Number of tracks with a non-null `id` per year, ascending by year.
pub fn count_by_year(dataset: &Dataset) -> Vec<YearValue<usize>> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for track in &dataset.tracks {
        let Some(year) = track.year() else {
            continue;
        };
        let counted = track.get(ID).is_some_and(|id| !id.is_null());
        *counts.entry(year).or_default() += usize::from(counted);
    }
    counts
        .into_iter()
        .map(|(year, value)| YearValue { year, value })
        .collect()
}
