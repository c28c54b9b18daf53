//! Mapping real-valued matrices to 8-bit grayscale for viewing and export.
//!
//! Reconstructions are not clamped by the core, so values can fall outside
//! `0..=255` after an edit. Callers choose how to bring them back into range.

use std::path::Path;

use image::{GrayImage, Luma};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// How a real-valued image is mapped to `u8` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMapping {
    /// Stretch `[min, max]` to `[0, 255]`
    #[default]
    Normalize,
    /// Clamp to `[0, 255]` and round
    Clip,
}

impl DisplayMapping {
    /// Get the display name for this mapping.
    pub fn name(&self) -> &'static str {
        match self {
            DisplayMapping::Normalize => "Normalize",
            DisplayMapping::Clip => "Clip",
        }
    }

    /// Get all available mappings.
    pub fn all() -> &'static [DisplayMapping] {
        &[DisplayMapping::Normalize, DisplayMapping::Clip]
    }

    pub fn apply(&self, image: ArrayView2<'_, f64>) -> Array2<u8> {
        match self {
            DisplayMapping::Normalize => normalize_for_display(image),
            DisplayMapping::Clip => clip_to_u8(image),
        }
    }
}

/// Min-max normalise to `0..=255`, truncating toward zero.
///
/// A constant (or empty) input maps to all zeros. Non-finite values are
/// ignored when finding the range and map to 0.
pub fn normalize_for_display(image: ArrayView2<'_, f64>) -> Array2<u8> {
    let (min, max) = image
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let span = max - min;
    if !span.is_finite() || span <= 0.0 {
        return Array2::zeros(image.dim());
    }

    image.mapv(|v| {
        if v.is_finite() {
            ((v - min) * 255.0 / span) as u8
        } else {
            0
        }
    })
}

/// Clamp to `0..=255` and round. NaN maps to 0.
pub fn clip_to_u8(image: ArrayView2<'_, f64>) -> Array2<u8> {
    // `as u8` saturates and sends NaN to 0
    image.mapv(|v| v.round().clamp(0.0, 255.0) as u8)
}

/// Wrap a `(rows, cols)` matrix as a grayscale image buffer.
pub fn to_gray_image(pixels: ArrayView2<'_, u8>) -> GrayImage {
    let (rows, cols) = pixels.dim();
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        Luma([pixels[(y as usize, x as usize)]])
    })
}

/// Encode and write a grayscale matrix; the format follows the file extension.
pub fn save_gray(pixels: ArrayView2<'_, u8>, path: &Path) -> Result<(), image::ImageError> {
    to_gray_image(pixels).save(path)?;
    log::info!(
        "Saved {}x{} grayscale image to {:?}",
        pixels.nrows(),
        pixels.ncols(),
        path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_normalize_stretches_range() {
        let image = array![[-10.0, 0.0], [5.0, 40.0]];
        let out = normalize_for_display(image.view());
        assert_eq!(out[(0, 0)], 0);
        assert_eq!(out[(1, 1)], 255);
        assert_eq!(out[(0, 1)], 51);
    }

    #[test]
    fn test_normalize_truncates() {
        let image = array![[0.0, 1.0, 2.0]];
        let out = normalize_for_display(image.view());
        assert_eq!(out, array![[0u8, 127, 255]]);
    }

    #[test]
    fn test_normalize_constant_is_zero() {
        let image = Array2::from_elem((3, 3), 42.0);
        let out = normalize_for_display(image.view());
        assert!(out.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_normalize_ignores_nan() {
        let image = array![[f64::NAN, 1.0], [2.0, 3.0]];
        let out = normalize_for_display(image.view());
        assert_eq!(out[(0, 0)], 0);
        assert_eq!(out[(1, 1)], 255);
    }

    #[test]
    fn test_clip() {
        let image = array![[-3.0, 12.4], [12.6, 300.0]];
        let out = clip_to_u8(image.view());
        assert_eq!(out, array![[0u8, 12], [13, 255]]);
    }

    #[test]
    fn test_mapping_apply() {
        let image = array![[100.0, 200.0]];
        assert_eq!(DisplayMapping::Clip.apply(image.view()), array![[100u8, 200]]);
        assert_eq!(
            DisplayMapping::Normalize.apply(image.view()),
            array![[0u8, 255]]
        );
    }

    #[test]
    fn test_gray_image_orientation() {
        let pixels = array![[1u8, 2, 3], [4, 5, 6]];
        let img = to_gray_image(pixels.view());
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1)[0], 6);
        assert_eq!(img.get_pixel(0, 1)[0], 4);
    }

    #[test]
    fn test_mapping_serde_lowercase() {
        let json = serde_json::to_string(&DisplayMapping::Clip).unwrap();
        assert_eq!(json, "\"clip\"");
    }
}
