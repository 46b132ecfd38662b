use eframe::egui::{self, Pos2, Rect, vec2};

use crate::chart::export::save_jpeg;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TrackTrendsApp {
    pub state: AppState,
    /// A screenshot command was sent and its event has not arrived yet.
    capture_in_flight: bool,
}

impl TrackTrendsApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            capture_in_flight: false,
        }
    }

    /// Write the chart area of a finished screenshot to the pending target.
    fn handle_screenshots(&mut self, ctx: &egui::Context) {
        let screenshots: Vec<_> = ctx.input(|i| {
            i.raw
                .events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Screenshot { image, .. } => Some(image.clone()),
                    _ => None,
                })
                .collect()
        });

        for image in screenshots {
            self.capture_in_flight = false;
            let Some(target) = self.state.pending_save.take() else {
                continue;
            };
            let ppp = ctx.pixels_per_point();
            let picture = match self.state.plot_rect {
                Some(rect) => match capture_region(rect, image.size, ppp) {
                    Some(visible) => image.region(&visible, Some(ppp)),
                    None => {
                        log::error!("Chart is not visible, nothing saved");
                        self.state.status_message =
                            Some("Error: chart is not visible, nothing saved".to_string());
                        continue;
                    }
                },
                None => (*image).clone(),
            };
            match save_jpeg(&picture, &target) {
                Ok(path) => {
                    self.state.status_message = Some(format!("Saved {}", path.display()));
                }
                Err(e) => {
                    log::error!("{e}");
                    self.state.status_message = Some(format!("Error: {e}"));
                }
            }
        }
    }
}

/// The part of `plot` (in points) covered by a screenshot of `size` pixels,
/// or `None` if less than a pixel of it is on screen.
fn capture_region(plot: Rect, size: [usize; 2], pixels_per_point: f32) -> Option<Rect> {
    let screen = Rect::from_min_size(
        Pos2::ZERO,
        vec2(
            size[0] as f32 / pixels_per_point,
            size[1] as f32 / pixels_per_point,
        ),
    );
    let visible = plot.intersect(screen);
    let wide_enough = visible.width() * pixels_per_point >= 1.0;
    let tall_enough = visible.height() * pixels_per_point >= 1.0;
    (wide_enough && tall_enough).then_some(visible)
}

impl eframe::App for TrackTrendsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_screenshots(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters and chart options ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart or table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.show_table {
                table::filtered_table(ui, &self.state);
            } else {
                plot::chart_plot(ui, &mut self.state);
            }
        });

        // The capture arrives as an event on a later frame.
        if self.state.pending_save.is_some() && !self.capture_in_flight {
            self.capture_in_flight = true;
            ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{ColorImage, pos2};

    #[test]
    fn plot_below_the_window_is_clipped() {
        let plot = Rect::from_min_size(pos2(250.0, 40.0), vec2(940.0, 501.0));
        let visible = capture_region(plot, [1200, 400], 1.0).unwrap();
        assert_eq!(visible, Rect::from_min_max(pos2(250.0, 40.0), pos2(1190.0, 400.0)));

        let cropped = ColorImage::new([1200, 400], egui::Color32::WHITE).region(&visible, Some(1.0));
        assert_eq!(cropped.size, [940, 360]);
    }

    #[test]
    fn clipping_respects_pixels_per_point() {
        let plot = Rect::from_min_size(pos2(100.0, 100.0), vec2(600.0, 600.0));
        let visible = capture_region(plot, [1200, 800], 2.0).unwrap();
        assert_eq!(visible, Rect::from_min_max(pos2(100.0, 100.0), pos2(600.0, 400.0)));
    }

    #[test]
    fn plot_fully_inside_is_unchanged() {
        let plot = Rect::from_min_size(pos2(10.0, 10.0), vec2(100.0, 50.0));
        assert_eq!(capture_region(plot, [1200, 800], 1.0), Some(plot));
    }

    #[test]
    fn offscreen_plot_has_no_region() {
        let plot = Rect::from_min_size(pos2(10.0, 900.0), vec2(100.0, 50.0));
        assert_eq!(capture_region(plot, [1200, 800], 1.0), None);
    }
}
