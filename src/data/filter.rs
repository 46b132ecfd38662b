use std::ops::RangeInclusive;

use super::error::{DataError, Result};
use super::model::{DURATION_S, Dataset, POPULARITY, Track, YEAR};

// ---------------------------------------------------------------------------
// Filter predicate: inclusive year/popularity ranges plus a duration cutoff
// ---------------------------------------------------------------------------

/// Range predicate over an enriched dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackFilter {
    /// Inclusive release year bounds.
    pub years: RangeInclusive<i64>,
    /// Inclusive popularity bounds.
    pub popularity: RangeInclusive<f64>,
    /// Inclusive upper bound on `duration_s`; unbounded by default.
    pub max_duration_s: f64,
}

impl TrackFilter {
    pub fn new(years: RangeInclusive<i64>, popularity: RangeInclusive<f64>) -> Self {
        TrackFilter {
            years,
            popularity,
            max_duration_s: f64::INFINITY,
        }
    }

    pub fn with_duration_cutoff(mut self, max_duration_s: f64) -> Self {
        self.max_duration_s = max_duration_s;
        self
    }

    /// Reject ranges whose lower bound exceeds the upper bound.
    pub fn validate(&self) -> Result<()> {
        if self.years.start() > self.years.end() {
            return Err(DataError::InvalidRange {
                name: YEAR,
                min: *self.years.start() as f64,
                max: *self.years.end() as f64,
            });
        }
        // Written as a negation so NaN bounds are rejected too.
        if !(self.popularity.start() <= self.popularity.end()) {
            return Err(DataError::InvalidRange {
                name: POPULARITY,
                min: *self.popularity.start(),
                max: *self.popularity.end(),
            });
        }
        Ok(())
    }

    /// Whether a single track passes all three bounds.
    ///
    /// Missing or non-numeric cells never match.
    pub fn matches(&self, track: &Track) -> bool {
        let Some(year) = track.year() else {
            return false;
        };
        let Some(popularity) = track.popularity() else {
            return false;
        };
        let Some(duration) = track.duration_s() else {
            return false;
        };
        self.years.contains(&year)
            && self.popularity.contains(&popularity)
            && duration <= self.max_duration_s
    }
}

fn check_schema(dataset: &Dataset) -> Result<()> {
    for column in [YEAR, POPULARITY, DURATION_S] {
        if !dataset.has_column(column) {
            return Err(DataError::MissingColumn(column.to_string()));
        }
    }
    Ok(())
}

/// Return indices of tracks that pass the filter, in source order.
pub fn filtered_indices(dataset: &Dataset, filter: &TrackFilter) -> Result<Vec<usize>> {
    filter.validate()?;
    check_schema(dataset)?;

    Ok(dataset
        .tracks
        .iter()
        .enumerate()
        .filter(|(_, track)| filter.matches(track))
        .map(|(i, _)| i)
        .collect())
}

/// Copy the tracks that pass the filter into a new dataset.
///
/// The source is only borrowed; the result owns its rows.
pub fn filter_dataset(dataset: &Dataset, filter: &TrackFilter) -> Result<Dataset> {
    let indices = filtered_indices(dataset, filter)?;
    Ok(dataset.select(&indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, ID};

    fn track(id: &str, year: i64, popularity: i64, duration_s: f64) -> Track {
        [
            (ID, CellValue::String(id.into())),
            (YEAR, CellValue::Integer(year)),
            (POPULARITY, CellValue::Integer(popularity)),
            (DURATION_S, CellValue::Float(duration_s)),
        ]
        .into_iter()
        .collect()
    }

    fn dataset(tracks: Vec<Track>) -> Dataset {
        Dataset::from_tracks(tracks)
    }

    fn ids(ds: &Dataset) -> Vec<String> {
        ds.tracks
            .iter()
            .map(|t| t.get(ID).map(|v| v.to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn bounds_are_inclusive() {
        let ds = dataset(vec![
            track("below", 1999, 50, 200.0),
            track("min", 2000, 50, 200.0),
            track("max", 2010, 50, 200.0),
            track("above", 2011, 50, 200.0),
            track("pop-min", 2005, 10, 200.0),
            track("pop-below", 2005, 9, 200.0),
        ]);
        let filter = TrackFilter::new(2000..=2010, 10.0..=90.0);
        let out = filter_dataset(&ds, &filter).unwrap();
        assert_eq!(ids(&out), vec!["min", "max", "pop-min"]);
    }

    #[test]
    fn default_cutoff_is_unbounded() {
        let ds = dataset(vec![track("long", 2000, 50, 1.0e12)]);
        let filter = TrackFilter::new(2000..=2000, 0.0..=100.0);
        assert_eq!(filter_dataset(&ds, &filter).unwrap().len(), 1);
    }

    #[test]
    fn cutoff_is_an_inclusive_upper_bound() {
        let ds = dataset(vec![
            track("short", 2000, 50, 30.0),
            track("edge", 2000, 50, 600.0),
            track("long", 2000, 50, 600.5),
        ]);
        let filter = TrackFilter::new(2000..=2000, 0.0..=100.0).with_duration_cutoff(600.0);
        assert_eq!(ids(&filter_dataset(&ds, &filter).unwrap()), vec!["short", "edge"]);
    }

    #[test]
    fn preserves_source_order() {
        let ds = dataset(vec![
            track("a", 2010, 50, 100.0),
            track("b", 2012, 50, 100.0),
            track("c", 2011, 50, 100.0),
        ]);
        let filter = TrackFilter::new(2010..=2012, 0.0..=100.0);
        let out = filter_dataset(&ds, &filter).unwrap();
        let years: Vec<_> = out.tracks.iter().map(|t| t.year().unwrap()).collect();
        assert_eq!(years, vec![2010, 2012, 2011]);
    }

    #[test]
    fn source_is_left_untouched() {
        let ds = dataset(vec![track("a", 2000, 50, 100.0), track("b", 1990, 50, 100.0)]);
        let before = ds.clone();
        let mut out = filter_dataset(&ds, &TrackFilter::new(2000..=2000, 0.0..=100.0)).unwrap();
        out.tracks[0]
            .fields
            .insert(POPULARITY.into(), CellValue::Integer(0));
        assert_eq!(ds, before);
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let ds = dataset(vec![track("a", 2015, 50, 100.0)]);
        let err = filter_dataset(&ds, &TrackFilter::new(2020..=2010, 0.0..=100.0)).unwrap_err();
        assert!(matches!(err, DataError::InvalidRange { name: "year", .. }));

        let err = filter_dataset(&ds, &TrackFilter::new(2010..=2020, 80.0..=20.0)).unwrap_err();
        assert!(matches!(err, DataError::InvalidRange { name: "popularity", .. }));
    }

    #[test]
    fn unenriched_dataset_is_rejected() {
        let raw: Track = [
            (ID, CellValue::String("a".into())),
            (POPULARITY, CellValue::Integer(1)),
        ]
        .into_iter()
        .collect();
        let ds = dataset(vec![raw]);
        let err = filtered_indices(&ds, &TrackFilter::new(2000..=2020, 0.0..=100.0)).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(ref c) if c == YEAR));
    }

    #[test]
    fn null_cells_never_match() {
        let mut t = track("a", 2000, 50, 100.0);
        t.fields.insert(POPULARITY.into(), CellValue::Null);
        let ds = dataset(vec![t]);
        let filter = TrackFilter::new(i64::MIN..=i64::MAX, f64::MIN..=f64::MAX);
        assert!(filtered_indices(&ds, &filter).unwrap().is_empty());
    }

    #[test]
    fn concurrent_filters_agree() {
        let ds = dataset((0..100).map(|i| track(&i.to_string(), 1950 + i, i, 100.0)).collect());
        let filter = TrackFilter::new(1960..=2000, 20.0..=80.0);
        let expected = filtered_indices(&ds, &filter).unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| filtered_indices(&ds, &filter).unwrap()))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }
}
