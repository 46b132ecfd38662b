use eframe::egui::{self, Align2, Color32, RichText, Ui};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotBounds, PlotPoint, PlotPoints, PlotUi, Text,
    uniform_grid_spacer,
};

use crate::chart::{ChartData, HistogramData};
use crate::color::parse_color;
use crate::data::aggregate::YearValue;
use crate::state::AppState;

const DEFAULT_SERIES: Color32 = Color32::from_rgb(0, 0, 255);
const DEFAULT_FACE: Color32 = Color32::from_rgb(255, 250, 250);

// ---------------------------------------------------------------------------
// Chart (central panel)
// ---------------------------------------------------------------------------

/// Render the selected chart in the central panel.
pub fn chart_plot(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view tracks  (File → Open…)");
        });
        return;
    }
    let Some(data) = &state.chart_data else {
        // The status line explains why there is nothing to draw.
        return;
    };

    let style = state.style();
    // Bad names are flagged next to the input field.
    let series_color = parse_color(&style.color).unwrap_or(DEFAULT_SERIES);
    let face_color = parse_color(&style.facecolor).unwrap_or(DEFAULT_FACE);
    let title = state.chart.title(&state.filter());

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new(title).strong());
    });

    let plot = Plot::new("track_chart")
        .legend(Legend::default())
        .x_axis_label(state.chart.x_label())
        .y_axis_label(state.chart.y_label())
        .view_aspect(style.aspect_ratio())
        .show_background(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    let response = egui::Frame::default()
        .fill(face_color)
        .show(ui, |ui: &mut Ui| match data {
            ChartData::Histogram(hist) => {
                let limits = state.histogram.x_limits;
                plot.show(ui, |plot_ui| {
                    if let Some(bounds) = limits.and_then(|xlim| limited_bounds(hist, xlim)) {
                        plot_ui.set_plot_bounds(bounds);
                    }
                    histogram(plot_ui, hist, series_color);
                })
                .response
            }
            ChartData::TrendLine(series) => {
                let width = state.trend_line.line_width;
                plot.x_axis_formatter(year_label)
                    .show(ui, |plot_ui| trend_line(plot_ui, series, series_color, width))
                    .response
            }
            ChartData::BarChart(series) => {
                let mut plot = plot.x_axis_formatter(year_label);
                if state.bar_chart.rotate_ticks {
                    plot = plot.x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]));
                }
                plot.show(ui, |plot_ui| bar_chart(plot_ui, series, series_color))
                    .response
            }
        });

    state.plot_rect = Some(response.inner.rect);
}

fn year_label(mark: GridMark, _range: &std::ops::RangeInclusive<f64>) -> String {
    if mark.value.fract() == 0.0 {
        format!("{:.0}", mark.value)
    } else {
        String::new()
    }
}

/// Bounds showing exactly `[lo, hi]` on the x axis with room for the
/// tallest bar or density point.
fn limited_bounds(data: &HistogramData, (lo, hi): (f64, f64)) -> Option<PlotBounds> {
    if !(lo < hi) {
        return None;
    }
    let tallest_bar = data.histogram.counts.iter().copied().max().unwrap_or(0) as f64;
    let tallest = data
        .kde
        .iter()
        .flatten()
        .map(|p| p[1])
        .fold(tallest_bar, f64::max);
    let top = if tallest > 0.0 { tallest * 1.05 } else { 1.0 };
    Some(PlotBounds::from_min_max([lo, 0.0], [hi, top]))
}

fn histogram(plot_ui: &mut PlotUi, data: &HistogramData, color: Color32) {
    let width = data.histogram.bin_width();
    let bars: Vec<Bar> = data
        .histogram
        .centers()
        .zip(&data.histogram.counts)
        .map(|(x, &count)| Bar::new(x, count as f64).width(width))
        .collect();
    plot_ui.bar_chart(BarChart::new(bars).color(color.gamma_multiply(0.6)).name("tracks"));

    if let Some(curve) = &data.kde {
        plot_ui.line(
            Line::new(PlotPoints::from(curve.clone()))
                .color(color)
                .width(2.5)
                .name("density"),
        );
    }

    // Summary labels sit in the upper right area of the visible plot.
    let bounds = plot_ui.plot_bounds();
    let x = bounds.min()[0] + bounds.width() * 0.65;
    let y_top = bounds.min()[1] + bounds.height() * 0.85;
    let y_second = bounds.min()[1] + bounds.height() * 0.75;

    plot_ui.text(
        Text::new(
            PlotPoint::new(x, y_top),
            RichText::new(format!("Number of tracks: {}", data.track_count))
                .strong()
                .size(18.0),
        )
        .anchor(Align2::LEFT_CENTER),
    );
    if let Some(peak) = data.peak_duration {
        plot_ui.text(
            Text::new(
                PlotPoint::new(x, y_second),
                RichText::new(format!("Peak duration (seconds): {peak:.0}"))
                    .strong()
                    .size(18.0),
            )
            .anchor(Align2::LEFT_CENTER),
        );
    }
}

fn trend_line(plot_ui: &mut PlotUi, series: &[YearValue<f64>], color: Color32, width: f32) {
    let points: PlotPoints = series
        .iter()
        .map(|p| [p.year as f64, p.value])
        .collect();
    plot_ui.line(Line::new(points).color(color).width(width).name("mean duration"));
}

fn bar_chart(plot_ui: &mut PlotUi, series: &[YearValue<usize>], color: Color32) {
    let bars: Vec<Bar> = series
        .iter()
        .map(|p| Bar::new(p.year as f64, p.value as f64).width(0.8))
        .collect();
    plot_ui.bar_chart(BarChart::new(bars).color(color).name("tracks"));
}
