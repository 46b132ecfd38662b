use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ChartKind;

// ---------------------------------------------------------------------------
// Shared styling
// ---------------------------------------------------------------------------

/// Where a rendered chart is written: `{directory}/{name}.jpg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveTarget {
    pub directory: PathBuf,
    /// Base file name without extension.
    pub name: String,
}

impl SaveTarget {
    pub const EXTENSION: &'static str = "jpg";

    /// Default target for a chart kind: `./histogram.jpg` and friends.
    pub fn for_kind(kind: ChartKind) -> Self {
        SaveTarget {
            directory: PathBuf::from("."),
            name: kind.default_save_name().to_string(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.directory
            .join(format!("{}.{}", self.name, Self::EXTENSION))
    }
}

/// Styling shared by all chart kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    /// Series color, a CSS color name or `#rrggbb`. Default `blue`.
    pub color: String,
    /// Plot background color. Default `snow`.
    pub facecolor: String,
    /// Width and height; only the ratio is used on screen. Default `(15, 8)`.
    pub figure_size: (f32, f32),
    /// Save the chart every time it is rendered from new data. Default `false`.
    pub save: bool,
    /// Where to save; `None` uses [`SaveTarget::for_kind`].
    pub save_to: Option<SaveTarget>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            color: "blue".to_string(),
            facecolor: "snow".to_string(),
            figure_size: (15.0, 8.0),
            save: false,
            save_to: None,
        }
    }
}

impl ChartStyle {
    /// Resolved save target for a chart of the given kind.
    pub fn save_target(&self, kind: ChartKind) -> SaveTarget {
        self.save_to
            .clone()
            .unwrap_or_else(|| SaveTarget::for_kind(kind))
    }

    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.figure_size;
        if w > 0.0 && h > 0.0 { w / h } else { 15.0 / 8.0 }
    }
}

// ---------------------------------------------------------------------------
// Per-chart configuration
// ---------------------------------------------------------------------------

/// Duration histogram of the filtered tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    /// Number of equal-width bins. Default 50.
    pub bins: usize,
    /// Visible x range in seconds; `None` fits the data.
    pub x_limits: Option<(f64, f64)>,
    /// Overlay a kernel density estimate. Default `true`.
    pub kde: bool,
    /// Inclusive upper bound on `duration_s`; `None` keeps every track.
    pub duration_cutoff: Option<f64>,
    pub style: ChartStyle,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: 50,
            x_limits: None,
            kde: true,
            duration_cutoff: None,
            style: ChartStyle::default(),
        }
    }
}

/// Yearly mean duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendLineConfig {
    /// Line width in points. Default 5.
    pub line_width: f32,
    pub style: ChartStyle,
}

impl Default for TrendLineConfig {
    fn default() -> Self {
        Self {
            line_width: 5.0,
            style: ChartStyle::default(),
        }
    }
}

/// Yearly track count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarChartConfig {
    /// Label every year on the x axis instead of letting the axis thin
    /// them out. Default `false`.
    pub rotate_ticks: bool,
    pub style: ChartStyle,
}
