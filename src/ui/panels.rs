use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};

use crate::chart::ChartKind;
use crate::color::parse_color;
use crate::data::enrich::DerivedColumn;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter and chart widgets
// ---------------------------------------------------------------------------

/// Render the left panel. Recomputes the chart when anything changed.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Ranges ----
            ui.strong("Year");
            ui.horizontal(|ui: &mut Ui| {
                changed |= ui.add(DragValue::new(&mut state.years.0).speed(1)).changed();
                ui.label("to");
                changed |= ui.add(DragValue::new(&mut state.years.1).speed(1)).changed();
            });

            ui.strong("Popularity");
            ui.horizontal(|ui: &mut Ui| {
                changed |= ui
                    .add(DragValue::new(&mut state.popularity.0).speed(1).range(0.0..=100.0))
                    .changed();
                ui.label("to");
                changed |= ui
                    .add(DragValue::new(&mut state.popularity.1).speed(1).range(0.0..=100.0))
                    .changed();
            });
            ui.separator();

            // ---- Chart selector ----
            ui.strong("Chart");
            let before = state.chart;
            egui::ComboBox::from_id_salt("chart_kind")
                .selected_text(state.chart.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for kind in ChartKind::ALL {
                        ui.selectable_value(&mut state.chart, kind, kind.label());
                    }
                });
            changed |= before != state.chart;
            ui.checkbox(&mut state.show_table, "Show filtered rows");
            ui.separator();

            // ---- Per-chart options ----
            changed |= chart_options(ui, state);
            ui.separator();

            style_options(ui, state);
            ui.separator();

            if ui.button("Save JPEG").clicked() {
                state.request_save();
            }
        });

    if changed {
        state.refresh();
    }
}

fn chart_options(ui: &mut Ui, state: &mut AppState) -> bool {
    let mut changed = false;
    match state.chart {
        ChartKind::Histogram => {
            let cfg = &mut state.histogram;
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Bins");
                changed |= ui.add(DragValue::new(&mut cfg.bins).range(1..=500)).changed();
            });
            changed |= ui.checkbox(&mut cfg.kde, "Density curve").changed();

            let mut has_cutoff = cfg.duration_cutoff.is_some();
            ui.horizontal(|ui: &mut Ui| {
                if ui.checkbox(&mut has_cutoff, "Max duration (s)").changed() {
                    cfg.duration_cutoff = has_cutoff.then_some(600.0);
                    changed = true;
                }
                if let Some(cutoff) = cfg.duration_cutoff.as_mut() {
                    changed |= ui.add(DragValue::new(cutoff).speed(5.0).range(0.0..=f64::MAX)).changed();
                }
            });

            // Axis limits only affect drawing.
            let mut has_limits = cfg.x_limits.is_some();
            ui.horizontal(|ui: &mut Ui| {
                if ui.checkbox(&mut has_limits, "X limits").changed() {
                    cfg.x_limits = has_limits.then_some((0.0, 600.0));
                }
                if let Some((lo, hi)) = cfg.x_limits.as_mut() {
                    ui.add(DragValue::new(lo).speed(5.0));
                    ui.add(DragValue::new(hi).speed(5.0));
                }
            });
        }
        ChartKind::TrendLine => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Line width");
                ui.add(DragValue::new(&mut state.trend_line.line_width).range(0.5..=20.0).speed(0.1));
            });
        }
        ChartKind::BarChart => {
            ui.checkbox(&mut state.bar_chart.rotate_ticks, "Label every year");
        }
    }
    changed
}

fn style_options(ui: &mut Ui, state: &mut AppState) {
    let kind = state.chart;
    let style = state.style_mut();

    egui::Grid::new("style_grid").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("Color");
        color_field(ui, &mut style.color);
        ui.end_row();

        ui.label("Background");
        color_field(ui, &mut style.facecolor);
        ui.end_row();

        ui.label("Aspect");
        ui.horizontal(|ui: &mut Ui| {
            ui.add(DragValue::new(&mut style.figure_size.0).range(1.0..=50.0));
            ui.label("×");
            ui.add(DragValue::new(&mut style.figure_size.1).range(1.0..=50.0));
        });
        ui.end_row();
    });

    ui.checkbox(&mut style.save, "Save on every redraw");

    let mut target = style.save_target(kind);
    let mut directory = target.directory.display().to_string();
    let mut edited = false;
    egui::Grid::new("save_grid").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("Save in");
        if ui.text_edit_singleline(&mut directory).changed() {
            target.directory = directory.clone().into();
            edited = true;
        }
        ui.end_row();

        ui.label("Name");
        edited |= ui.text_edit_singleline(&mut target.name).changed();
        ui.end_row();
    });
    if edited {
        style.save_to = Some(target);
    }
}

fn color_field(ui: &mut Ui, name: &mut String) {
    ui.horizontal(|ui: &mut Ui| {
        ui.add(egui::TextEdit::singleline(name).desired_width(90.0));
        match parse_color(name) {
            Ok(c) => {
                ui.label(RichText::new("■").color(c));
            }
            Err(_) => {
                ui.label(RichText::new("unknown").color(Color32::RED));
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} tracks loaded, {} matching",
                ds.len(),
                state.visible_indices.len()
            ));
            if !state.enrichment.is_empty() {
                let added: Vec<&str> = state
                    .enrichment
                    .added
                    .iter()
                    .map(|c: &DerivedColumn| c.name())
                    .collect();
                ui.label(RichText::new(format!("derived: {}", added.join(", "))).weak());
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open track data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
