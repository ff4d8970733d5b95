use image::imageops::{self, FilterType};
use ndarray::{Array4, ShapeError};
use thiserror::Error;

/// Input size the plant disease classifier was built for (height, width, channels).
pub const IMAGE_DIMENSIONS: (u32, u32, u32) = (128, 128, 3);

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to build input tensor: {0}")]
    Shape(#[from] ShapeError),
}

/// Batch of one RGB image in NHWC layout with raw 0-255 channel values.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    data: Array4<f32>,
}

impl NormalizedTensor {
    /// `[batch, height, width, channels]`
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    /// Row-major values, `None` only if the array is not contiguous.
    pub fn as_slice(&self) -> Option<&[f32]> {
        self.data.as_slice()
    }
}

/// Decode `image_data` and shape it for the classifier's input size.
pub fn normalize(image_data: &[u8]) -> Result<NormalizedTensor, PreprocessError> {
    normalize_to(image_data, IMAGE_DIMENSIONS.1, IMAGE_DIMENSIONS.0)
}

/// Decode `image_data`, force three channels and resize to exactly `width` x `height`.
///
/// Pixel values are kept in their native 0-255 range; the classifier was
/// trained on unscaled input.
pub fn normalize_to(
    image_data: &[u8],
    width: u32,
    height: u32,
) -> Result<NormalizedTensor, PreprocessError> {
    let img = image::load_from_memory(image_data)?;

    // Drops alpha and promotes grayscale / palette images.
    let rgb = img.to_rgb8();
    let resized = imageops::resize(&rgb, width, height, FilterType::CatmullRom);

    let mut flat_img = Vec::with_capacity((width * height * 3) as usize);
    for pixel in resized.pixels() {
        flat_img.push(pixel[0] as f32);
        flat_img.push(pixel[1] as f32);
        flat_img.push(pixel[2] as f32);
    }

    let data = Array4::from_shape_vec((1, height as usize, width as usize, 3), flat_img)?;

    Ok(NormalizedTensor { data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    fn png(image: DynamicImage) -> Vec<u8> {
        encode(image, ImageOutputFormat::Png)
    }

    #[test]
    fn test_output_shape_matches_classifier_input() {
        let bytes = png(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            300,
            200,
            Rgb([10, 20, 30]),
        )));

        let tensor = normalize(&bytes).unwrap();
        assert_eq!(tensor.shape(), &[1, 128, 128, 3]);
    }

    #[test]
    fn test_values_are_not_rescaled() {
        let bytes = png(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            64,
            64,
            Rgb([200, 100, 50]),
        )));

        let tensor = normalize(&bytes).unwrap();
        let slice = tensor.as_slice().unwrap();
        assert_eq!(&slice[..3], &[200.0, 100.0, 50.0]);
        assert!(slice.iter().all(|v| (0.0..=255.0).contains(v)));
    }

    #[test]
    fn test_channel_last_layout() {
        let bytes = png(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            16,
            16,
            Rgb([255, 0, 0]),
        )));

        let tensor = normalize_to(&bytes, 4, 4).unwrap();
        let array = tensor.as_array();
        assert_eq!(array[[0, 2, 3, 0]], 255.0);
        assert_eq!(array[[0, 2, 3, 1]], 0.0);
        assert_eq!(array[[0, 2, 3, 2]], 0.0);
    }

    #[test]
    fn test_grayscale_is_promoted_to_rgb() {
        let bytes = png(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            32,
            32,
            Luma([90]),
        )));

        let tensor = normalize(&bytes).unwrap();
        assert_eq!(tensor.shape()[3], 3);
        assert_eq!(&tensor.as_slice().unwrap()[..3], &[90.0, 90.0, 90.0]);
    }

    #[test]
    fn test_alpha_is_discarded() {
        let bytes = png(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            32,
            32,
            Rgba([12, 34, 56, 0]),
        )));

        let tensor = normalize(&bytes).unwrap();
        assert_eq!(tensor.shape(), &[1, 128, 128, 3]);
        assert_eq!(&tensor.as_slice().unwrap()[..3], &[12.0, 34.0, 56.0]);
    }

    #[test]
    fn test_jpeg_input() {
        let bytes = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([0, 128, 0]))),
            ImageOutputFormat::Jpeg(90),
        );

        assert!(normalize(&bytes).is_ok());
    }

    #[test]
    fn test_rejects_non_image_bytes() {
        let result = normalize(b"this is a plain text file, not a leaf");
        assert!(matches!(result, Err(PreprocessError::Decode(_))));
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(normalize(&[]).is_err());
    }

    #[test]
    fn test_rejects_truncated_png() {
        let bytes = png(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            64,
            64,
            Rgb([1, 2, 3]),
        )));

        assert!(normalize(&bytes[..bytes.len() / 2]).is_err());
    }
}
