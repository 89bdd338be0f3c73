//! Image primitives over the `image` crate: decode, grayscale, crop, resize.

use crate::Result;
use anyhow::Context;
use image::{imageops, DynamicImage, GrayImage};
use lookout_core::geometry::Rect;

/// Pixel-grid helpers shared by training ingestion and the detector
pub struct ImageOps;

impl ImageOps {
    /// Decode encoded image bytes into a pixel grid
    pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).context("Failed to decode image bytes")
    }

    /// Encode a grayscale pixel grid back into PNG bytes
    pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>> {
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(image.clone())
            .write_to(&mut bytes, image::ImageFormat::Png)
            .context("Failed to encode image as PNG")?;
        Ok(bytes.into_inner())
    }

    /// Convert to single-channel grayscale.
    ///
    /// An image that is already single-channel passes through unchanged,
    /// no re-conversion.
    pub fn to_grayscale(image: DynamicImage) -> GrayImage {
        match image {
            DynamicImage::ImageLuma8(gray) => gray,
            other => other.to_luma8(),
        }
    }

    /// Crop a grayscale image to a rect.
    ///
    /// The rect must be non-empty and inside the image; callers clamp first.
    pub fn crop(image: &GrayImage, rect: &Rect) -> GrayImage {
        imageops::crop_imm(
            image,
            rect.x as u32,
            rect.y as u32,
            rect.width as u32,
            rect.height as u32,
        )
        .to_image()
    }

    /// Resize a grayscale image to exact dimensions
    pub fn resize(image: &GrayImage, width: u32, height: u32) -> GrayImage {
        imageops::resize(image, width, height, imageops::FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            image::Luma([((x * 31 + y * 17) % 251) as u8])
        })
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let gray = textured(16, 12);
        let bytes = ImageOps::encode_png(&gray).unwrap();

        let decoded = ImageOps::decode(&bytes).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 12);
        assert_eq!(ImageOps::to_grayscale(decoded), gray);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(ImageOps::decode(&[0u8, 1, 2, 3]).is_err());
    }

    #[test]
    fn test_grayscale_passthrough() {
        let gray = textured(8, 8);
        let converted = ImageOps::to_grayscale(DynamicImage::ImageLuma8(gray.clone()));
        assert_eq!(converted, gray);
    }

    #[test]
    fn test_crop_extracts_region() {
        let gray = textured(20, 20);
        let patch = ImageOps::crop(&gray, &Rect::new(3, 5, 7, 6));

        assert_eq!(patch.dimensions(), (7, 6));
        assert_eq!(patch.get_pixel(0, 0), gray.get_pixel(3, 5));
        assert_eq!(patch.get_pixel(6, 5), gray.get_pixel(9, 10));
    }

    #[test]
    fn test_resize_dimensions() {
        let gray = textured(20, 10);
        let resized = ImageOps::resize(&gray, 10, 5);
        assert_eq!(resized.dimensions(), (10, 5));
    }
}
