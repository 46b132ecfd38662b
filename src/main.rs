use std::path::{Path, PathBuf};

use eframe::egui;
use track_trends::app::TrackTrendsApp;
use track_trends::settings::{SETTINGS_FILE, ViewerSettings};
use track_trends::state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = ViewerSettings::load_or_default(Path::new(SETTINGS_FILE));
    let mut state = AppState::from_settings(settings);

    // Optional data file on the command line; otherwise use File → Open.
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        state.open(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Track Trends",
        options,
        Box::new(|_cc| Ok(Box::new(TrackTrendsApp::new(state)))),
    )
}
