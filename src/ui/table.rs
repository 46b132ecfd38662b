use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Render the tracks passing the current filter as a table.
pub fn filtered_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let columns = &dataset.column_names;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(60.0), columns.len())
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for name in columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(name.as_str());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, state.visible_indices.len(), |mut row| {
                let track = &dataset.tracks[state.visible_indices[row.index()]];
                for name in columns {
                    row.col(|ui: &mut Ui| {
                        match track.get(name) {
                            Some(value) if !value.is_null() => ui.label(value.to_string()),
                            _ => ui.weak("–"),
                        };
                    });
                }
            });
        });
}
