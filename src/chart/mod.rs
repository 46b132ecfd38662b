//! Chart preparation: configuration, per-chart data and image export.
//!
//! Everything here is independent of the UI toolkit except [`export`],
//! which turns a captured `egui` image into a JPEG file.

pub mod config;
pub mod export;
pub mod histogram;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::DataError;
use crate::data::aggregate::{YearValue, count_by_year, mean_duration_by_year};
use crate::data::filter::{TrackFilter, filter_dataset};
use crate::data::model::Dataset;

use config::HistogramConfig;
use histogram::{Histogram, KDE_GRID_POINTS, kde_curve, peak_duration};

#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("unknown color '{0}'")]
    UnknownColor(String),

    #[error("a histogram needs at least one bin")]
    InvalidBins,

    #[error("cannot save chart to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

// ---------------------------------------------------------------------------
// Chart kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Distribution of `duration_s`.
    #[default]
    Histogram,
    /// Mean `duration_s` per year.
    TrendLine,
    /// Track count per year.
    BarChart,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Histogram, ChartKind::TrendLine, ChartKind::BarChart];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Histogram => "Histogram",
            ChartKind::TrendLine => "Trend line",
            ChartKind::BarChart => "Bar chart",
        }
    }

    pub fn default_save_name(self) -> &'static str {
        match self {
            ChartKind::Histogram => "histogram",
            ChartKind::TrendLine => "trend_line",
            ChartKind::BarChart => "bar_plot",
        }
    }

    pub fn x_label(self) -> &'static str {
        match self {
            ChartKind::Histogram => "Duration (seconds)",
            ChartKind::TrendLine | ChartKind::BarChart => "Year",
        }
    }

    pub fn y_label(self) -> &'static str {
        match self {
            ChartKind::Histogram | ChartKind::BarChart => "Count",
            ChartKind::TrendLine => "Duration (seconds)",
        }
    }

    /// Chart title describing the active year and popularity ranges.
    pub fn title(self, filter: &TrackFilter) -> String {
        let subject = match self {
            ChartKind::Histogram => "Tracks",
            ChartKind::TrendLine => "Average duration of tracks",
            ChartKind::BarChart => "Number of tracks",
        };
        format!(
            "{subject} from {}-{} with popularity {}-{}",
            filter.years.start(),
            filter.years.end(),
            filter.popularity.start(),
            filter.popularity.end()
        )
    }
}

// ---------------------------------------------------------------------------
// Prepared chart data
// ---------------------------------------------------------------------------

/// Everything the histogram view draws.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramData {
    pub histogram: Histogram,
    /// Density curve scaled to counts; `None` when disabled or undefined.
    pub kde: Option<Vec<[f64; 2]>>,
    pub track_count: usize,
    /// Duration at the density maximum.
    pub peak_duration: Option<f64>,
}

/// Prepared data for one chart kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Histogram(HistogramData),
    TrendLine(Vec<YearValue<f64>>),
    BarChart(Vec<YearValue<usize>>),
}

/// Filter, apply the histogram's duration cutoff and bin `duration_s`.
pub fn histogram_data(
    dataset: &Dataset,
    filter: &TrackFilter,
    config: &HistogramConfig,
) -> Result<HistogramData, ChartError> {
    let filter = match config.duration_cutoff {
        Some(cutoff) => filter.clone().with_duration_cutoff(cutoff),
        None => filter.clone(),
    };
    let subset = filter_dataset(dataset, &filter)?;
    let durations: Vec<f64> = subset.tracks.iter().filter_map(|t| t.duration_s()).collect();

    let histogram = Histogram::compute(&durations, config.bins)?;
    let kde = if config.kde {
        let scale = durations.len() as f64 * histogram.bin_width();
        kde_curve(&durations, KDE_GRID_POINTS, scale)
    } else {
        None
    };
    let peak_duration = kde.as_deref().and_then(peak_duration);

    log::info!(
        "{}-{} tracks: {}",
        filter.years.start(),
        filter.years.end(),
        subset.len()
    );

    Ok(HistogramData {
        histogram,
        kde,
        track_count: subset.len(),
        peak_duration,
    })
}

/// Mean duration per year of the filtered tracks.
pub fn trend_line_data(
    dataset: &Dataset,
    filter: &TrackFilter,
) -> Result<Vec<YearValue<f64>>, ChartError> {
    let subset = filter_dataset(dataset, filter)?;
    Ok(mean_duration_by_year(&subset))
}

/// Track count per year of the filtered tracks.
pub fn bar_chart_data(
    dataset: &Dataset,
    filter: &TrackFilter,
) -> Result<Vec<YearValue<usize>>, ChartError> {
    let subset = filter_dataset(dataset, filter)?;
    Ok(count_by_year(&subset))
}
