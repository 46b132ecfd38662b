use chrono::{Datelike, NaiveDate};
use log::info;

use super::error::{DataError, Result};
use super::model::{CellValue, DURATION_MS, DURATION_S, Dataset, RELEASE_DATE, Track, YEAR};

// ---------------------------------------------------------------------------
// Derived columns
// ---------------------------------------------------------------------------

/// A column the enricher can compute from source columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedColumn {
    DurationS,
    Year,
}

impl DerivedColumn {
    pub fn name(self) -> &'static str {
        match self {
            DerivedColumn::DurationS => DURATION_S,
            DerivedColumn::Year => YEAR,
        }
    }
}

/// Which derived columns a call to [`enrich`] actually added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub added: Vec<DerivedColumn>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }

    pub fn contains(&self, column: DerivedColumn) -> bool {
        self.added.contains(&column)
    }
}

/// Add `duration_s` and `year` if the schema lacks them.
///
/// Columns already present are left untouched, so enriching twice is a
/// no-op. Either every row gets the new column or the dataset is left as
/// it was and an error is returned.
pub fn enrich(dataset: &mut Dataset) -> Result<Enrichment> {
    let mut report = Enrichment::default();

    // Compute both columns before touching the dataset.
    let durations = if dataset.has_column(DURATION_S) {
        None
    } else {
        Some(derive_all(dataset, duration_seconds)?)
    };
    let years = if dataset.has_column(YEAR) {
        None
    } else {
        Some(derive_all(dataset, release_year)?)
    };

    if let Some(values) = durations {
        append_column(dataset, DURATION_S, values);
        info!("Added '{DURATION_S}' column");
        report.added.push(DerivedColumn::DurationS);
    }
    if let Some(values) = years {
        append_column(dataset, YEAR, values);
        info!("Added '{YEAR}' column");
        report.added.push(DerivedColumn::Year);
    }

    Ok(report)
}

fn derive_all(
    dataset: &Dataset,
    derive: impl Fn(&Track) -> Result<CellValue, String>,
) -> Result<Vec<CellValue>> {
    dataset
        .tracks
        .iter()
        .enumerate()
        .map(|(row, track)| derive(track).map_err(|reason| DataError::malformed(row, reason)))
        .collect()
}

fn append_column(dataset: &mut Dataset, name: &str, values: Vec<CellValue>) {
    for (track, value) in dataset.tracks.iter_mut().zip(values) {
        track.fields.insert(name.to_string(), value);
    }
    dataset.column_names.push(name.to_string());
}

fn duration_seconds(track: &Track) -> Result<CellValue, String> {
    match track.get(DURATION_MS) {
        None | Some(CellValue::Null) => Err(format!("'{DURATION_MS}' is empty")),
        Some(value) => value
            .as_f64()
            .map(|ms| CellValue::Float(ms / 1000.0))
            .ok_or_else(|| format!("'{DURATION_MS}' value '{value}' is not a number")),
    }
}

fn release_year(track: &Track) -> Result<CellValue, String> {
    let value = match track.get(RELEASE_DATE) {
        None | Some(CellValue::Null) => return Err(format!("'{RELEASE_DATE}' is empty")),
        Some(value) => value,
    };
    // A bare year arrives as an integer cell when guessed from CSV.
    let text = match value.as_i64() {
        Some(year) => format!("{year:04}"),
        None => value.to_string(),
    };
    parse_release_date(&text)
        .map(|d| CellValue::Integer(i64::from(d.year())))
        .ok_or_else(|| format!("'{RELEASE_DATE}' value '{value}' is not an ISO-8601 date"))
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Parse an ISO-8601 calendar date.
///
/// Accepted: `YYYY-MM-DD`, `YYYY-MM`, `YYYY`, and date-times whose first ten
/// characters are `YYYY-MM-DD` (`T` or space separated). Reduced-precision
/// dates resolve to the first day of the period.
pub fn parse_release_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    match text.len() {
        4 => NaiveDate::parse_from_str(&format!("{text}-01-01"), "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").ok(),
        10 => NaiveDate::parse_from_str(text, "%Y-%m-%d").ok(),
        n if n > 10 && text.is_char_boundary(10) => {
            let (date, rest) = text.split_at(10);
            if rest.starts_with('T') || rest.starts_with(' ') {
                NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
            } else {
                None
            }
        }
        _ => None,
    }
}
