//! Loader for standard image formats (PNG, JPEG, BMP, TIFF, WebP).
//!
//! Color images are converted to 8-bit luma; the result keeps the
//! `0.0..=255.0` range rather than normalising.

use ndarray::Array2;

use crate::data::loader::{GrayscaleLoader, LoaderError};

/// Loader for standard image formats.
pub struct ImageLoader;

impl ImageLoader {
    const ID: &'static str = "image";
}

impl GrayscaleLoader for ImageLoader {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn display_name(&self) -> &'static str {
        "Standard Image (grayscale)"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"]
    }

    fn can_load(&self, data: &[u8]) -> bool {
        if data.len() < 8 {
            return false;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return true;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return true;
        }

        // BMP: 42 4D (BM)
        if data.starts_with(&[0x42, 0x4D]) {
            return true;
        }

        // TIFF: 49 49 2A 00 (little endian) or 4D 4D 00 2A (big endian)
        if data.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return true;
        }

        // WebP: RIFF....WEBP
        data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP"
    }

    fn load(&self, data: &[u8]) -> Result<Array2<f64>, LoaderError> {
        let img = image::load_from_memory(data)
            .map_err(|e| LoaderError::decode(Self::ID, format!("Failed to decode image: {}", e)))?
            .to_luma8();

        let (width, height) = img.dimensions();
        let pixels: Vec<f64> = img.into_raw().into_iter().map(f64::from).collect();
        let matrix = Array2::from_shape_vec((height as usize, width as usize), pixels)
            .map_err(|e| LoaderError::decode(Self::ID, e.to_string()))?;

        log::trace!("ImageLoader: loaded {}x{} image as luma", width, height);
        Ok(matrix)
    }
}
