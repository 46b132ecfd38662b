use eframe::egui::Color32;
use palette::Srgb;

use crate::chart::ChartError;

// ---------------------------------------------------------------------------
// Color names → Color32
// ---------------------------------------------------------------------------

/// Parse a CSS/SVG color name (`blue`, `snow`, …) or a hex code (`#1f77b4`).
pub fn parse_color(name: &str) -> Result<Color32, ChartError> {
    let trimmed = name.trim();
    let rgb: Option<Srgb<u8>> = if trimmed.starts_with('#') {
        trimmed.parse::<Srgb<u8>>().ok()
    } else {
        palette::named::from_str(&trimmed.to_ascii_lowercase())
    };
    rgb.map(|c| Color32::from_rgb(c.red, c.green, c.blue))
        .ok_or_else(|| ChartError::UnknownColor(name.to_string()))
}
