//! Image Preprocessor
//!
//! Decode → resize to the model's square input → reorder channels →
//! scale to [0, 1] → add the batch dimension.

use std::path::Path;

use image::{imageops::FilterType, DynamicImage, ImageReader};
use ndarray::{Array3, Array4, Axis};

use crate::error::DecodeError;

/// Channel order the classifier was trained with.
///
/// The decoder always yields RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

impl ChannelOrder {
    fn arrange(&self, [r, g, b]: [u8; 3]) -> [u8; 3] {
        match self {
            ChannelOrder::Rgb => [r, g, b],
            ChannelOrder::Bgr => [b, g, r],
        }
    }
}

impl std::str::FromStr for ChannelOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(ChannelOrder::Rgb),
            "bgr" => Ok(ChannelOrder::Bgr),
            other => Err(format!("unsupported channel order '{}'", other)),
        }
    }
}

/// Output of one preprocessing pass
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// (H, W, C), for display
    pub display: Array3<f32>,
    /// (1, H, W, C), what the classifier consumes
    pub batch: Array4<f32>,
}

#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    size: u32,
    channel_order: ChannelOrder,
}

impl Preprocessor {
    pub fn new(size: u32, channel_order: ChannelOrder) -> Self {
        Self { size, channel_order }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    /// Decode an image persisted at `path` and turn it into tensors
    pub fn preprocess(&self, path: &Path) -> Result<Preprocessed, DecodeError> {
        let open_err = |source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        };

        let img = ImageReader::open(path)
            .map_err(open_err)?
            .with_guessed_format()
            .map_err(open_err)?
            .decode()
            .map_err(|source| DecodeError::Image {
                path: path.to_path_buf(),
                source,
            })?;

        self.tensors_from_image(&img)
    }

    pub fn tensors_from_image(&self, img: &DynamicImage) -> Result<Preprocessed, DecodeError> {
        let side = self.size as usize;
        let rgb = img
            .resize_exact(self.size, self.size, FilterType::Triangle)
            .to_rgb8();

        let mut data = Vec::with_capacity(side * side * 3);
        for pixel in rgb.pixels() {
            let ordered = self.channel_order.arrange(pixel.0);
            data.extend(ordered.iter().map(|&v| v as f32 / 255.0));
        }

        let display = Array3::from_shape_vec((side, side, 3), data)
            .map_err(|e| DecodeError::Shape(e.to_string()))?;
        let batch = display.clone().insert_axis(Axis(0));

        Ok(Preprocessed { display, batch })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str, w: u32, h: u32, color: [u8; 3]) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(w, h, Rgb(color)).save(&path).unwrap();
        path
    }

    #[test]
    fn test_shape_matches_configured_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", 300, 90, [12, 200, 99]);

        let out = Preprocessor::new(128, ChannelOrder::Rgb).preprocess(&path).unwrap();

        assert_eq!(out.display.shape(), &[128, 128, 3]);
        assert_eq!(out.batch.shape(), &[1, 128, 128, 3]);
        assert!(out.batch.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_values_scaled_to_unit_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "white.png", 64, 64, [255, 255, 255]);

        let out = Preprocessor::new(32, ChannelOrder::Rgb).preprocess(&path).unwrap();

        assert!(out.display.iter().all(|v| (*v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_channel_order_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "red.png", 16, 16, [255, 0, 0]);

        let rgb = Preprocessor::new(8, ChannelOrder::Rgb).preprocess(&path).unwrap();
        let bgr = Preprocessor::new(8, ChannelOrder::Bgr).preprocess(&path).unwrap();

        assert_eq!(rgb.display[[0, 0, 0]], 1.0);
        assert_eq!(rgb.display[[0, 0, 2]], 0.0);
        assert_eq!(bgr.display[[0, 0, 0]], 0.0);
        assert_eq!(bgr.display[[0, 0, 2]], 1.0);
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Preprocessor::new(128, ChannelOrder::Rgb).preprocess(&dir.path().join("nope.png"));
        assert!(matches!(result, Err(DecodeError::Open { .. })));
    }

    #[test]
    fn test_garbage_bytes_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let result = Preprocessor::new(128, ChannelOrder::Rgb).preprocess(&path);
        assert!(matches!(result, Err(DecodeError::Image { .. })));
    }

    #[test]
    fn test_parse_channel_order() {
        assert_eq!("RGB".parse::<ChannelOrder>(), Ok(ChannelOrder::Rgb));
        assert_eq!("bgr".parse::<ChannelOrder>(), Ok(ChannelOrder::Bgr));
        assert!("hsv".parse::<ChannelOrder>().is_err());
    }
}
