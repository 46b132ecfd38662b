use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chart::ChartKind;
use crate::chart::config::{BarChartConfig, HistogramConfig, TrendLineConfig};

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "track-trends.json";

/// Initial viewer state: chart options and filter bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub chart: ChartKind,
    /// Initial inclusive year range.
    pub years: (i64, i64),
    /// Initial inclusive popularity range.
    pub popularity: (f64, f64),
    pub histogram: HistogramConfig,
    pub trend_line: TrendLineConfig,
    pub bar_chart: BarChartConfig,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            chart: ChartKind::Histogram,
            years: (1920, 2020),
            popularity: (0.0, 100.0),
            histogram: HistogramConfig::default(),
            trend_line: TrendLineConfig::default(),
            bar_chart: BarChartConfig::default(),
        }
    }
}

impl ViewerSettings {
    /// Read settings from `path`.
    ///
    /// A missing file yields the defaults silently; an unreadable or invalid
    /// one is logged and also yields the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("Cannot read {}: {e}; using defaults", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(settings) => {
                log::info!("Loaded viewer settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings in {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }
}
