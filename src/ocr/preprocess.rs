use std::io::Write;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage};
use tempfile::NamedTempFile;

use crate::error::{ExtractError, Result};

use super::{Preprocess, Recipe, TransformOp};

const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// Production preprocessor backed by the `image` crate. Each `apply` call
/// decodes the source independently so recipes never see each other's output.
pub struct ImagePreprocessor;

impl Preprocess for ImagePreprocessor {
    fn apply(&self, recipe: &Recipe, source: &Path) -> Result<NamedTempFile> {
        let image = image::open(source)?;
        let image = apply_ops(image, &recipe.ops)?;
        let mut tmp = tempfile::Builder::new()
            .prefix("signtext-")
            .suffix(".png")
            .tempfile()?;
        image.write_to(&mut tmp, image::ImageFormat::Png)?;
        tmp.flush().ok();
        Ok(tmp)
    }
}

fn apply_ops(mut image: DynamicImage, ops: &[TransformOp]) -> Result<DynamicImage> {
    for op in ops {
        image = match op {
            TransformOp::Resize { target_width } => resize_to_width(image, *target_width)?,
            TransformOp::Grayscale => DynamicImage::ImageLuma8(image.to_luma8()),
            TransformOp::Normalize => {
                DynamicImage::ImageLuma8(contrast_stretch(&image.to_luma8()))
            }
            TransformOp::LocalContrast { sigma } => image.unsharpen(*sigma, 0),
            TransformOp::Sharpen => image.filter3x3(&SHARPEN_KERNEL),
            TransformOp::Threshold { level } => {
                DynamicImage::ImageLuma8(binarize(&image.to_luma8(), *level))
            }
        };
    }
    Ok(image)
}

fn resize_to_width(image: DynamicImage, target_width: u32) -> Result<DynamicImage> {
    if target_width == 0 {
        return Err(ExtractError::Preprocess(
            "resize target width must be positive".to_string(),
        ));
    }
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ExtractError::Preprocess(format!(
            "image has no pixels ({}x{})",
            width, height
        )));
    }
    let target_height = ((height as f64) * (target_width as f64) / (width as f64))
        .round()
        .max(1.0) as u32;
    Ok(image.resize_exact(target_width, target_height, FilterType::Lanczos3))
}

fn contrast_stretch(image: &GrayImage) -> GrayImage {
    let mut min = 255u8;
    let mut max = 0u8;
    for pixel in image.pixels() {
        let value = pixel[0];
        min = min.min(value);
        max = max.max(value);
    }

    if max <= min {
        return image.clone();
    }

    let scale = 255.0 / (max as f32 - min as f32);
    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        let stretched = ((pixel[0].saturating_sub(min)) as f32 * scale).round() as u8;
        pixel[0] = stretched;
    }
    output
}

fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        pixel[0] = if pixel[0] > threshold { 255 } else { 0 };
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, _| {
            image::Luma([(60 + (x % 100)) as u8])
        }))
    }

    #[test]
    fn resize_preserves_aspect_ratio() {
        let image = gradient_image(100, 50);
        let resized = resize_to_width(image, 200).unwrap();
        assert_eq!(resized.dimensions(), (200, 100));
    }

    #[test]
    fn resize_rejects_zero_width() {
        let image = gradient_image(100, 50);
        let result = resize_to_width(image, 0);
        assert!(matches!(result, Err(ExtractError::Preprocess(_))));
    }

    #[test]
    fn threshold_produces_pure_black_and_white() {
        let image = gradient_image(64, 16);
        let out = apply_ops(image, &[TransformOp::Threshold { level: 100 }]).unwrap();
        for pixel in out.to_luma8().pixels() {
            assert!(pixel[0] == 0 || pixel[0] == 255);
        }
    }

    #[test]
    fn contrast_stretch_expands_range() {
        let stretched = contrast_stretch(&gradient_image(100, 10).to_luma8());
        let mut min = 255u8;
        let mut max = 0u8;
        for pixel in stretched.pixels() {
            min = min.min(pixel[0]);
            max = max.max(pixel[0]);
        }
        assert_eq!(min, 0);
        assert_eq!(max, 255);
    }

    #[test]
    fn contrast_stretch_leaves_flat_image_alone() {
        let flat = GrayImage::from_pixel(10, 10, image::Luma([128]));
        let out = contrast_stretch(&flat);
        for pixel in out.pixels() {
            assert_eq!(pixel[0], 128);
        }
    }

    #[test]
    fn apply_writes_a_decodable_png() {
        let mut source = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        gradient_image(80, 40)
            .write_to(&mut source, image::ImageFormat::Png)
            .unwrap();
        source.flush().unwrap();

        let recipe = Recipe::new(
            "test",
            vec![
                TransformOp::Resize { target_width: 160 },
                TransformOp::Grayscale,
                TransformOp::Normalize,
            ],
        );
        let derived = ImagePreprocessor.apply(&recipe, source.path()).unwrap();
        let reloaded = image::open(derived.path()).unwrap();
        assert_eq!(reloaded.dimensions(), (160, 80));
    }
}
