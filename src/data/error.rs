use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading, enriching or slicing a dataset.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot read {}: {source}", path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("cannot decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("missing required column(s): {}", .0.join(", "))]
    SchemaMissing(Vec<String>),

    #[error("row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error("invalid {name} range: min {min} is greater than max {max}")]
    InvalidRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("dataset has no '{0}' column")]
    MissingColumn(String),
}

impl DataError {
    pub(crate) fn malformed(row: usize, reason: impl Into<String>) -> Self {
        DataError::MalformedRecord {
            row,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = DataError> = std::result::Result<T, E>;
