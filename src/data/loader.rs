use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Float16Type, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type,
    Int64Type, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::enrich::{Enrichment, enrich};
use super::error::{DataError, Result};
use super::model::{CellValue, Dataset, REQUIRED_COLUMNS, Track};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// An enriched dataset together with the columns enrichment had to add.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub dataset: Dataset,
    pub enrichment: Enrichment,
}

/// Load a track table from a file and enrich it.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one track per line (recommended)
/// * `.json`    – `[{ "id": ..., "duration_ms": ..., ... }, ...]`
/// * `.parquet` – flat scalar columns
///
/// The source must provide `id`, `popularity`, `duration_ms` and
/// `release_date`; `duration_s` and `year` are derived when absent.
pub fn load_file(path: &Path) -> Result<Loaded> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataError::UnsupportedFormat(other.to_string())),
    };

    check_required_columns(&dataset)?;
    let enrichment = enrich(&mut dataset)?;

    log::info!(
        "Loaded {} tracks from {} with columns {:?}",
        dataset.len(),
        path.display(),
        dataset.column_names
    );
    Ok(Loaded {
        dataset,
        enrichment,
    })
}

fn check_required_columns(dataset: &Dataset) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !dataset.has_column(col))
        .map(|col| col.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataError::SchemaMissing(missing))
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| DataError::SourceNotFound {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one track per record.
/// Cell types are guessed per value.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(open(path)?);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| {
            csv_error(path, e, |reason| DataError::Decode {
                path: path.to_path_buf(),
                reason: format!("reading CSV header: {reason}"),
            })
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut tracks = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| csv_error(path, e, |reason| DataError::malformed(row_no, reason)))?;

        let fields: BTreeMap<String, CellValue> = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), guess_cell_type(value)))
            .collect();

        tracks.push(Track { fields });
    }

    Ok(Dataset::with_columns(headers, tracks))
}

/// I/O failures mean the source could not be read; anything else is about
/// the content.
fn csv_error(path: &Path, err: csv::Error, content: impl FnOnce(String) -> DataError) -> DataError {
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => DataError::SourceNotFound {
            path: path.to_path_buf(),
            source,
        },
        _ => content(reason),
    }
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "id": "4BJqT0PrAfrxzMOxytFOIz", "popularity": 4,
///     "duration_ms": 831667, "release_date": "1921" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).map_err(|source| DataError::SourceNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|e| DataError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let records = root.as_array().ok_or_else(|| DataError::Decode {
        path: path.to_path_buf(),
        reason: "expected top-level JSON array".to_string(),
    })?;

    let mut tracks = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataError::malformed(i, "not a JSON object"))?;

        let fields = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_cell(val)))
            .collect();

        tracks.push(Track { fields });
    }

    Ok(Dataset::from_tracks(tracks))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let decode_err = |reason: String| DataError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)
        .map_err(|e| decode_err(format!("reading parquet metadata: {e}")))?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder
        .build()
        .map_err(|e| decode_err(format!("building parquet reader: {e}")))?;

    let mut tracks = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(|e| decode_err(format!("reading record batch: {e}")))?;

        for row in 0..batch.num_rows() {
            let mut fields = BTreeMap::new();
            for (name, col) in column_names.iter().zip(batch.columns()) {
                let cell = extract_cell(col, row)
                    .map_err(|reason| DataError::malformed(tracks.len(), reason))?;
                fields.insert(name.clone(), cell);
            }
            tracks.push(Track { fields });
        }
    }

    Ok(Dataset::with_columns(column_names, tracks))
}

// -- Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue, String> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(i64::from(col.as_primitive::<Int8Type>().value(row))),
        DataType::Int16 => CellValue::Integer(i64::from(col.as_primitive::<Int16Type>().value(row))),
        DataType::Int32 => CellValue::Integer(i64::from(col.as_primitive::<Int32Type>().value(row))),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(i64::from(col.as_primitive::<UInt8Type>().value(row))),
        DataType::UInt16 => {
            CellValue::Integer(i64::from(col.as_primitive::<UInt16Type>().value(row)))
        }
        DataType::UInt32 => {
            CellValue::Integer(i64::from(col.as_primitive::<UInt32Type>().value(row)))
        }
        DataType::UInt64 => {
            let value = col.as_primitive::<UInt64Type>().value(row);
            match i64::try_from(value) {
                Ok(v) => CellValue::Integer(v),
                Err(_) => CellValue::Float(value as f64),
            }
        }
        DataType::Float16 => {
            CellValue::Float(col.as_primitive::<Float16Type>().value(row).to_f64())
        }
        DataType::Float32 => {
            CellValue::Float(f64::from(col.as_primitive::<Float32Type>().value(row)))
        }
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => match col.as_primitive::<Date32Type>().value_as_date(row) {
            Some(date) => CellValue::Date(date.format("%Y-%m-%d").to_string()),
            None => CellValue::Null,
        },
        _ => {
            let text = array_value_to_string(col.as_ref(), row).map_err(|e| e.to_string())?;
            CellValue::String(text)
        }
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::enrich::DerivedColumn;
    use crate::data::model::{DURATION_S, YEAR};
    use approx::assert_relative_eq;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn guesses_cell_types() {
        assert_eq!(guess_cell_type(""), CellValue::Null);
        assert_eq!(guess_cell_type("42"), CellValue::Integer(42));
        assert_eq!(guess_cell_type("4.5"), CellValue::Float(4.5));
        assert_eq!(guess_cell_type("true"), CellValue::Bool(true));
        assert_eq!(
            guess_cell_type("2015-06-01"),
            CellValue::String("2015-06-01".into())
        );
    }

    #[test]
    fn csv_without_derived_columns_is_enriched() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "tracks.csv",
            "id,name,popularity,duration_ms,release_date\n\
             a,Intro,40,180000,2015-06-01\n\
             b,Outro,55,240500,1998\n",
        );
        let loaded = load_file(&path).unwrap();

        assert_eq!(
            loaded.enrichment.added,
            vec![DerivedColumn::DurationS, DerivedColumn::Year]
        );
        let ds = loaded.dataset;
        assert_eq!(ds.len(), 2);
        assert_relative_eq!(ds.tracks[0].duration_s().unwrap(), 180.0);
        assert_eq!(ds.tracks[0].year(), Some(2015));
        assert_relative_eq!(ds.tracks[1].duration_s().unwrap(), 240.5);
        assert_eq!(ds.tracks[1].year(), Some(1998));
        assert_eq!(ds.tracks[1].get("name"), Some(&CellValue::String("Outro".into())));
    }

    #[test]
    fn csv_with_derived_columns_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "tracks.csv",
            "id,popularity,duration_ms,release_date,duration_s,year\n\
             a,40,180000,2015-06-01,999.0,1970\n",
        );
        let loaded = load_file(&path).unwrap();
        assert!(loaded.enrichment.is_empty());
        assert_relative_eq!(loaded.dataset.tracks[0].duration_s().unwrap(), 999.0);
        assert_eq!(loaded.dataset.tracks[0].year(), Some(1970));
        assert_eq!(
            loaded.dataset.column_names.iter().filter(|c| *c == YEAR || *c == DURATION_S).count(),
            2
        );
    }

    #[test]
    fn missing_required_columns_are_all_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "tracks.csv", "id,duration_ms\na,1000\n");
        match load_file(&path).unwrap_err() {
            DataError::SchemaMissing(cols) => {
                assert_eq!(cols, vec!["popularity".to_string(), "release_date".to_string()]);
            }
            other => panic!("expected SchemaMissing, got {other:?}"),
        }
    }

    #[test]
    fn ragged_csv_row_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "tracks.csv",
            "id,popularity,duration_ms,release_date\na,1,1000,2000\nb,2,1000\n",
        );
        assert!(matches!(
            load_file(&path).unwrap_err(),
            DataError::MalformedRecord { row: 1, .. }
        ));
    }

    #[test]
    fn bad_release_date_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "tracks.csv",
            "id,popularity,duration_ms,release_date\na,1,1000,yesterday\n",
        );
        assert!(matches!(
            load_file(&path).unwrap_err(),
            DataError::MalformedRecord { row: 0, .. }
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DataError::SourceNotFound { .. }));
    }

    #[test]
    fn unreadable_csv_is_reported_as_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.csv");
        std::fs::create_dir(&path).unwrap();
        assert!(matches!(
            load_file(&path).unwrap_err(),
            DataError::SourceNotFound { .. }
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "tracks.xlsx", "");
        assert!(matches!(
            load_file(&path).unwrap_err(),
            DataError::UnsupportedFormat(ext) if ext == "xlsx"
        ));
    }

    #[test]
    fn json_records_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "tracks.json",
            r#"[
                {"id": "a", "popularity": 12, "duration_ms": 90000, "release_date": "1921-03"},
                {"id": "b", "popularity": 80, "duration_ms": 200000.0, "release_date": "2020-01-31"}
            ]"#,
        );
        let ds = load_file(&path).unwrap().dataset;
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.tracks[0].year(), Some(1921));
        assert_relative_eq!(ds.tracks[1].duration_s().unwrap(), 200.0);
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "tracks.json", "{ not json");
        assert!(matches!(load_file(&path).unwrap_err(), DataError::Decode { .. }));
    }

    #[test]
    fn parquet_columns_are_loaded() {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("popularity", DataType::Int64, false),
            Field::new("duration_ms", DataType::Float64, true),
            Field::new("release_date", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["a", "b"])),
                Arc::new(Int64Array::from(vec![10, 20])),
                Arc::new(Float64Array::from(vec![Some(180000.0), Some(60000.0)])),
                Arc::new(StringArray::from(vec!["2015-06-01", "1960"])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.parquet");
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap().dataset;
        assert_eq!(
            ds.column_names,
            vec!["id", "popularity", "duration_ms", "release_date", "duration_s", "year"]
        );
        assert_eq!(ds.tracks[1].year(), Some(1960));
        assert_relative_eq!(ds.tracks[0].duration_s().unwrap(), 180.0);
    }

    #[test]
    fn narrow_and_unsigned_parquet_integers_are_numeric() {
        use arrow::array::{Int16Array, StringArray, UInt32Array, UInt64Array};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        use crate::data::filter::{TrackFilter, filtered_indices};

        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("popularity", DataType::Int16, false),
            Field::new("duration_ms", DataType::UInt32, false),
            Field::new("release_date", DataType::Utf8, false),
            Field::new("plays", DataType::UInt64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["a", "b"])),
                Arc::new(Int16Array::from(vec![50, 7])),
                Arc::new(UInt32Array::from(vec![180000, 95500])),
                Arc::new(StringArray::from(vec!["2015-06-01", "2008"])),
                Arc::new(UInt64Array::from(vec![3, u64::MAX])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.parquet");
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap().dataset;
        assert_eq!(ds.tracks[0].get("popularity"), Some(&CellValue::Integer(50)));
        assert_relative_eq!(ds.tracks[0].duration_s().unwrap(), 180.0);
        assert_relative_eq!(ds.tracks[1].duration_s().unwrap(), 95.5);
        assert_eq!(ds.tracks[0].get("plays"), Some(&CellValue::Integer(3)));
        assert_eq!(ds.tracks[1].get("plays"), Some(&CellValue::Float(u64::MAX as f64)));

        let filter = TrackFilter::new(2000..=2020, 0.0..=100.0);
        assert_eq!(filtered_indices(&ds, &filter).unwrap(), vec![0, 1]);
    }
}
