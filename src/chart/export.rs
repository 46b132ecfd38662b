use std::path::{Path, PathBuf};

use eframe::egui::ColorImage;
use image::{ImageFormat, Rgb, RgbImage};

use super::ChartError;
use super::config::SaveTarget;

/// Write a captured chart image to `target` as JPEG and return the path.
///
/// The parent directory must exist; alpha is dropped.
pub fn save_jpeg(picture: &ColorImage, target: &SaveTarget) -> Result<PathBuf, ChartError> {
    let path = target.path();
    write_jpeg(picture, &path)?;
    log::info!("Visualisation saved in {}", path.display());
    Ok(path)
}

fn write_jpeg(picture: &ColorImage, path: &Path) -> Result<(), ChartError> {
    let [width, height] = picture.size;
    let rgb = RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let c = picture.pixels[y as usize * width + x as usize];
        Rgb([c.r(), c.g(), c.b()])
    });
    rgb.save_with_format(path, ImageFormat::Jpeg)
        .map_err(|source| ChartError::Save {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::Color32;

    #[test]
    fn writes_a_jpeg_with_the_captured_size() {
        let dir = tempfile::tempdir().unwrap();
        let target = SaveTarget {
            directory: dir.path().to_path_buf(),
            name: "histogram".to_string(),
        };
        let picture = ColorImage::new([40, 20], Color32::from_rgb(200, 30, 30));

        let path = save_jpeg(&picture, &target).unwrap();
        assert_eq!(path, dir.path().join("histogram.jpg"));

        let reloaded = image::open(&path).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (40, 20));
    }

    #[test]
    fn missing_directory_is_a_save_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = SaveTarget {
            directory: dir.path().join("does/not/exist"),
            name: "bar_plot".to_string(),
        };
        let picture = ColorImage::new([4, 4], Color32::WHITE);
        assert!(matches!(
            save_jpeg(&picture, &target),
            Err(ChartError::Save { .. })
        ));
    }
}
