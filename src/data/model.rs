use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const ID: &str = "id";
pub const POPULARITY: &str = "popularity";
pub const DURATION_MS: &str = "duration_ms";
pub const RELEASE_DATE: &str = "release_date";

/// Derived: `duration_ms / 1000`.
pub const DURATION_S: &str = "duration_s";
/// Derived: calendar year of `release_date`.
pub const YEAR: &str = "year";

/// Columns every source table must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = [ID, POPULARITY, DURATION_MS, RELEASE_DATE];

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text; parsed on demand.
    Date(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for numeric comparisons.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integer view; floats are accepted only when they carry no fraction.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Track – one row of the table
// ---------------------------------------------------------------------------

/// A single track (one row of the source table).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    /// Column name → value. Absent keys read as null.
    pub fields: BTreeMap<String, CellValue>,
}

impl Track {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields.get(column)
    }

    /// Numeric view of a column; `None` for missing, null or non-numeric cells.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(CellValue::as_f64)
    }

    pub fn year(&self) -> Option<i64> {
        self.get(YEAR).and_then(CellValue::as_i64)
    }

    pub fn duration_s(&self) -> Option<f64> {
        self.number(DURATION_S)
    }

    pub fn popularity(&self) -> Option<f64> {
        self.number(POPULARITY)
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Track {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        Track {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An ordered table of tracks sharing one schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// All tracks (rows), in source order.
    pub tracks: Vec<Track>,
    /// Column names in source order; derived columns are appended.
    pub column_names: Vec<String>,
}

impl Dataset {
    /// Build a dataset with an explicit column order (e.g. a CSV header).
    pub fn with_columns(column_names: Vec<String>, tracks: Vec<Track>) -> Self {
        Dataset {
            tracks,
            column_names,
        }
    }

    /// Build a dataset whose columns are collected from the tracks in
    /// first-seen order.
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let mut column_names: Vec<String> = Vec::new();
        for track in &tracks {
            for col in track.fields.keys() {
                if !column_names.contains(col) {
                    column_names.push(col.clone());
                }
            }
        }
        Dataset {
            tracks,
            column_names,
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_names.iter().any(|c| c == name)
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// New dataset with the same schema holding clones of the given rows.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds for `tracks`.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            tracks: indices.iter().map(|&i| self.tracks[i].clone()).collect(),
            column_names: self.column_names.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_view_rejects_fractional_floats() {
        assert_eq!(CellValue::Float(2015.0).as_i64(), Some(2015));
        assert_eq!(CellValue::Float(2015.5).as_i64(), None);
        assert_eq!(CellValue::String("2015".into()).as_i64(), None);
    }

    #[test]
    fn from_tracks_keeps_first_seen_column_order() {
        let a: Track = [("id", CellValue::String("a".into()))].into_iter().collect();
        let b: Track = [
            ("id", CellValue::String("b".into())),
            ("popularity", CellValue::Integer(3)),
        ]
        .into_iter()
        .collect();
        let ds = Dataset::from_tracks(vec![a, b]);
        assert_eq!(ds.column_names, vec!["id", "popularity"]);
        assert!(ds.has_column(POPULARITY));
        assert!(!ds.has_column(YEAR));
    }

    #[test]
    fn select_clones_rows_in_given_order() {
        let tracks: Vec<Track> = (0..3)
            .map(|i| [(ID, CellValue::Integer(i))].into_iter().collect())
            .collect();
        let ds = Dataset::from_tracks(tracks);
        let picked = ds.select(&[2, 0]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.tracks[0].get(ID), Some(&CellValue::Integer(2)));
        assert_eq!(picked.column_names, ds.column_names);
        assert_eq!(ds.len(), 3);
    }

    #[test]
    #[should_panic]
    fn select_out_of_range_panics() {
        let ds = Dataset::from_tracks(vec![[(ID, CellValue::Integer(0))].into_iter().collect()]);
        let _ = ds.select(&[1]);
    }
}
