use std::path::{Path, PathBuf};

use eframe::egui::Rect;

use crate::chart::config::{BarChartConfig, ChartStyle, HistogramConfig, SaveTarget, TrendLineConfig};
use crate::chart::{ChartData, ChartError, ChartKind, bar_chart_data, histogram_data, trend_line_data};
use crate::data::enrich::Enrichment;
use crate::data::filter::{TrackFilter, filtered_indices};
use crate::data::loader::{Loaded, load_file};
use crate::data::model::Dataset;
use crate::settings::ViewerSettings;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    /// Derived columns added while loading.
    pub enrichment: Enrichment,

    /// Which chart the central panel shows.
    pub chart: ChartKind,

    /// Inclusive year bounds.
    pub years: (i64, i64),

    /// Inclusive popularity bounds.
    pub popularity: (f64, f64),

    pub histogram: HistogramConfig,
    pub trend_line: TrendLineConfig,
    pub bar_chart: BarChartConfig,

    /// Show the filtered rows as a table instead of the chart.
    pub show_table: bool,

    /// Indices of tracks passing the current filter (cached).
    pub visible_indices: Vec<usize>,

    /// Prepared data for the current chart (cached).
    pub chart_data: Option<ChartData>,

    /// Screen area of the last drawn chart, used to crop screenshots.
    pub plot_rect: Option<Rect>,

    /// A screenshot was requested and should be written here.
    pub pending_save: Option<SaveTarget>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_settings(ViewerSettings::default())
    }
}

impl AppState {
    pub fn from_settings(settings: ViewerSettings) -> Self {
        Self {
            dataset: None,
            source: None,
            enrichment: Enrichment::default(),
            chart: settings.chart,
            years: settings.years,
            popularity: settings.popularity,
            histogram: settings.histogram,
            trend_line: settings.trend_line,
            bar_chart: settings.bar_chart,
            show_table: false,
            visible_indices: Vec::new(),
            chart_data: None,
            plot_rect: None,
            pending_save: None,
            status_message: None,
        }
    }

    /// Load a file and make it the current dataset; errors end up in the
    /// status line.
    pub fn open(&mut self, path: &Path) {
        match load_file(path) {
            Ok(loaded) => {
                self.set_dataset(loaded, path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and recompute the chart.
    pub fn set_dataset(&mut self, loaded: Loaded, source: PathBuf) {
        self.dataset = Some(loaded.dataset);
        self.enrichment = loaded.enrichment;
        self.source = Some(source);
        self.status_message = None;
        self.refresh();
    }

    /// Year and popularity bounds, without a duration cutoff.
    pub fn filter(&self) -> TrackFilter {
        TrackFilter::new(
            self.years.0..=self.years.1,
            self.popularity.0..=self.popularity.1,
        )
    }

    /// The filter the current chart applies; only the histogram has a cutoff.
    pub fn chart_filter(&self) -> TrackFilter {
        match (self.chart, self.histogram.duration_cutoff) {
            (ChartKind::Histogram, Some(cutoff)) => self.filter().with_duration_cutoff(cutoff),
            _ => self.filter(),
        }
    }

    /// Recompute `visible_indices` and `chart_data` after a parameter change.
    pub fn refresh(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let result = filtered_indices(ds, &self.chart_filter())
            .map_err(ChartError::from)
            .and_then(|indices| {
                let data = prepare_chart(ds, self.chart, &self.filter(), &self.histogram)?;
                Ok((indices, data))
            });
        match result {
            Ok((indices, data)) => {
                self.visible_indices = indices;
                self.chart_data = Some(data);
                self.status_message = None;
                if self.style().save {
                    self.request_save();
                }
            }
            Err(e) => {
                self.visible_indices.clear();
                self.chart_data = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn style(&self) -> &ChartStyle {
        match self.chart {
            ChartKind::Histogram => &self.histogram.style,
            ChartKind::TrendLine => &self.trend_line.style,
            ChartKind::BarChart => &self.bar_chart.style,
        }
    }

    pub fn style_mut(&mut self) -> &mut ChartStyle {
        match self.chart {
            ChartKind::Histogram => &mut self.histogram.style,
            ChartKind::TrendLine => &mut self.trend_line.style,
            ChartKind::BarChart => &mut self.bar_chart.style,
        }
    }

    /// Configured save target of the current chart, or its default.
    pub fn save_target(&self) -> SaveTarget {
        self.style().save_target(self.chart)
    }

    /// Ask for the next frame's screenshot to be saved.
    pub fn request_save(&mut self) {
        if self.chart_data.is_some() && !self.show_table {
            self.pending_save = Some(self.save_target());
        }
    }
}

fn prepare_chart(
    dataset: &Dataset,
    kind: ChartKind,
    filter: &TrackFilter,
    histogram: &HistogramConfig,
) -> Result<ChartData, ChartError> {
    Ok(match kind {
        ChartKind::Histogram => ChartData::Histogram(histogram_data(dataset, filter, histogram)?),
        ChartKind::TrendLine => ChartData::TrendLine(trend_line_data(dataset, filter)?),
        ChartKind::BarChart => ChartData::BarChart(bar_chart_data(dataset, filter)?),
    })
}
