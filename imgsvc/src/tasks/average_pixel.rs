//! Mean value over every channel sample of an image.

use super::{AnalysisTask, TaskInput};
use anyhow::{Context, anyhow};
use image::DynamicImage;
use serde_json::Value;

pub const NAME: &str = "Average Pixel Value";

/// Arithmetic mean of all channel samples of all pixels, in the image's native sample range
#[derive(Debug, Clone, Copy, Default)]
pub struct AveragePixel;

impl AnalysisTask for AveragePixel {
    fn name(&self) -> &str {
        NAME
    }

    fn execute(&self, input: &TaskInput) -> anyhow::Result<Option<Value>> {
        let image = image::load_from_memory(input.bytes()).context("cannot identify image file")?;

        let mean = average_sample(&image).ok_or_else(|| anyhow!("image has no pixels"))?;
        Ok(Some(Value::from(mean)))
    }
}

fn average_sample(image: &DynamicImage) -> Option<f64> {
    match image {
        DynamicImage::ImageLuma8(buf) => mean(buf.as_raw()),
        DynamicImage::ImageLumaA8(buf) => mean(buf.as_raw()),
        DynamicImage::ImageRgb8(buf) => mean(buf.as_raw()),
        DynamicImage::ImageRgba8(buf) => mean(buf.as_raw()),
        DynamicImage::ImageLuma16(buf) => mean(buf.as_raw()),
        DynamicImage::ImageLumaA16(buf) => mean(buf.as_raw()),
        DynamicImage::ImageRgb16(buf) => mean(buf.as_raw()),
        DynamicImage::ImageRgba16(buf) => mean(buf.as_raw()),
        DynamicImage::ImageRgb32F(buf) => mean(buf.as_raw()),
        DynamicImage::ImageRgba32F(buf) => mean(buf.as_raw()),
        other => mean(other.to_rgba8().as_raw()),
    }
}

fn mean<T: Copy + Into<f64>>(samples: &[T]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples.iter().map(|&s| s.into()).sum();
    Some(sum / samples.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskRegistry;
    use crate::upload::UploadedFile;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Arc;

    /// 20x20 black PNG whose first three pixels are pure red, green and blue
    fn fixture_png() -> Vec<u8> {
        let mut img = RgbImage::new(20, 20);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));
        img.put_pixel(2, 0, Rgb([0, 0, 255]));

        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn run(bytes: Vec<u8>) -> anyhow::Result<Option<Value>> {
        let registry = TaskRegistry::new(vec![Arc::new(AveragePixel)]);
        let file = UploadedFile::new(bytes, "image.png", Some("image/png".to_string()));
        let result = registry.process(&file);
        match (result.results.get(NAME), result.errors.get(NAME)) {
            (Some(value), None) => Ok(Some(value.clone())),
            (None, Some(err)) => Err(anyhow!("{}", err)),
            _ => Ok(None),
        }
    }

    #[test]
    fn test_average_pixel_value() {
        let value = run(fixture_png()).unwrap().unwrap();

        // 3 * 255 over 20 * 20 * 3 samples
        let mean = value.as_f64().unwrap();
        assert!((mean - 0.6375).abs() < 1e-9, "got {mean}");
    }

    #[test]
    fn test_uniform_grayscale_image() {
        let img = image::GrayImage::from_pixel(4, 4, image::Luma([100]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();

        let value = run(buf).unwrap().unwrap();
        assert_eq!(value.as_f64(), Some(100.0));
    }

    #[test]
    fn test_undecodable_bytes_fail_the_task() {
        let err = run(b"definitely not an image".to_vec()).unwrap_err();
        assert!(err.to_string().contains("cannot identify image file"));
    }

    #[test]
    fn test_mean_of_no_samples() {
        assert_eq!(mean::<u8>(&[]), None);
        assert_eq!(mean(&[1u16, 2, 3]), Some(2.0));
    }
}
