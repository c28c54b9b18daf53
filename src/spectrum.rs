//! Forward/inverse 2D Fourier transform and amplitude/phase decomposition.
//!
//! The spectrum is always stored centred: after the forward transform the
//! zero-frequency bin is moved to `(H/2, W/2)`, which is the coordinate space
//! every mask is drawn in. Only the amplitude is editable; the phase of the
//! last `compute` is reused verbatim for reconstruction.

use std::f64::consts::PI;
use std::sync::Arc;

use ndarray::{Array2, ArrayView2, Zip};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::error::EditError;

/// The decomposed spectrum of one image.
///
/// Amplitude and phase are produced together by a single [`SpectrumTransform::compute`]
/// call and are never modified afterwards; a new image replaces the whole state.
#[derive(Debug, Clone)]
pub struct SpectrumState {
    original: Array2<f64>,
    amplitude: Array2<f64>,
    phase: Array2<f64>,
}

impl SpectrumState {
    /// The spatial-domain image the spectrum was computed from.
    pub fn original(&self) -> &Array2<f64> {
        &self.original
    }

    /// Centred amplitude spectrum `|F|`, non-negative.
    pub fn amplitude(&self) -> &Array2<f64> {
        &self.amplitude
    }

    /// Centred phase spectrum `arg(F)` in `(-π, π]`.
    pub fn phase(&self) -> &Array2<f64> {
        &self.phase
    }

    /// Spectrum dimensions as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.amplitude.dim()
    }

    /// Index of the zero-frequency bin as `(row, col)`.
    pub fn center(&self) -> (usize, usize) {
        let (h, w) = self.shape();
        (h / 2, w / 2)
    }

    /// Log-scaled amplitude for display. Never used for reconstruction.
    pub fn log_magnitude(&self) -> Array2<f64> {
        log_magnitude(&self.amplitude)
    }
}

/// Wrapper around cached `rustfft` plans for 2D transforms.
pub struct SpectrumTransform {
    planner: FftPlanner<f64>,
}

impl SpectrumTransform {
    /// Create a transform with an empty plan cache.
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Transform `image` and decompose the centred spectrum.
    ///
    /// Fails when the image has a zero dimension or contains NaN/infinite pixels.
    pub fn compute(&mut self, image: ArrayView2<'_, f64>) -> Result<SpectrumState, EditError> {
        let (h, w) = image.dim();
        if h == 0 || w == 0 {
            return Err(EditError::invalid_input(format!(
                "image must not be empty (got {}x{})",
                h, w
            )));
        }
        if let Some(((row, col), value)) = image.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(EditError::invalid_input(format!(
                "pixel ({}, {}) is not finite: {}",
                row, col, value
            )));
        }

        let mut data = image.mapv(|v| Complex64::new(v, 0.0));
        self.process_2d(&mut data, Direction::Forward);
        let shifted = fft_shift(&data);

        let amplitude = shifted.mapv(|c| c.norm());
        let phase = shifted.mapv(|c| {
            let p = c.arg();
            // atan2 yields -π for (negative, -0.0); fold it onto +π.
            if p <= -PI { PI } else { p }
        });

        log::debug!("Computed {}x{} spectrum", h, w);

        Ok(SpectrumState {
            original: image.to_owned(),
            amplitude,
            phase,
        })
    }

    /// Recombine `modified_amplitude` with the stored phase and invert.
    ///
    /// Returns the real part of the inverse transform without any rescaling.
    pub fn reconstruct(
        &mut self,
        state: &SpectrumState,
        modified_amplitude: ArrayView2<'_, f64>,
    ) -> Result<Array2<f64>, EditError> {
        if modified_amplitude.dim() != state.shape() {
            return Err(EditError::shape_mismatch(
                state.shape(),
                modified_amplitude.dim(),
            ));
        }

        let mut spectrum = Array2::from_elem(state.shape(), Complex64::ZERO);
        Zip::from(&mut spectrum)
            .and(modified_amplitude)
            .and(&state.phase)
            .for_each(|out, &amp, &phase| *out = Complex64::from_polar(amp, phase));

        let mut data = ifft_shift(&spectrum);
        self.process_2d(&mut data, Direction::Inverse);

        Ok(data.mapv(|c| c.re))
    }

    /// Row pass then column pass, with `1/(H·W)` scaling on the inverse.
    fn process_2d(&mut self, data: &mut Array2<Complex64>, direction: Direction) {
        let (h, w) = data.dim();
        let row_fft = self.plan(w, direction);
        let col_fft = self.plan(h, direction);

        let mut row_buf = vec![Complex64::ZERO; w];
        for mut row in data.rows_mut() {
            for (dst, src) in row_buf.iter_mut().zip(row.iter()) {
                *dst = *src;
            }
            row_fft.process(&mut row_buf);
            for (dst, src) in row.iter_mut().zip(row_buf.iter()) {
                *dst = *src;
            }
        }

        let scale = match direction {
            Direction::Forward => 1.0,
            Direction::Inverse => 1.0 / (h * w) as f64,
        };

        // Columns are strided, gather them into a contiguous buffer
        let mut col_buf = vec![Complex64::ZERO; h];
        for mut col in data.columns_mut() {
            for (dst, src) in col_buf.iter_mut().zip(col.iter()) {
                *dst = *src;
            }
            col_fft.process(&mut col_buf);
            for (dst, src) in col.iter_mut().zip(col_buf.iter()) {
                *dst = *src * scale;
            }
        }
    }

    fn plan(&mut self, len: usize, direction: Direction) -> Arc<dyn Fft<f64>> {
        match direction {
            Direction::Forward => self.planner.plan_fft_forward(len),
            Direction::Inverse => self.planner.plan_fft_inverse(len),
        }
    }
}

impl Default for SpectrumTransform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Inverse,
}

/// `ln(1 + amplitude)` element-wise, for display only.
pub fn log_magnitude(amplitude: &Array2<f64>) -> Array2<f64> {
    amplitude.mapv(f64::ln_1p)
}

/// Move the zero-frequency bin from `(0, 0)` to `(H/2, W/2)`.
pub fn fft_shift<T: Copy>(data: &Array2<T>) -> Array2<T> {
    let (h, w) = data.dim();
    roll(data, h / 2, w / 2)
}

/// Inverse of [`fft_shift`], also for odd dimensions.
pub fn ifft_shift<T: Copy>(data: &Array2<T>) -> Array2<T> {
    let (h, w) = data.dim();
    roll(data, h - h / 2, w - w / 2)
}

/// Circularly shift so that `out[(r + dr) % h, (c + dc) % w] = data[r, c]`.
fn roll<T: Copy>(data: &Array2<T>, dr: usize, dc: usize) -> Array2<T> {
    let (h, w) = data.dim();
    Array2::from_shape_fn((h, w), |(r, c)| data[((r + h - dr) % h, (c + w - dc) % w)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_image::{self, Pattern};

    fn max_abs_diff(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
        Zip::from(a)
            .and(b)
            .fold(0.0f64, |acc, x, y| acc.max((x - y).abs()))
    }

    #[test]
    fn test_round_trip_even() {
        let image = test_image::generate(Pattern::Rings, 16, 24);
        let mut transform = SpectrumTransform::new();
        let state = transform.compute(image.view()).unwrap();
        let out = transform.reconstruct(&state, state.amplitude().view()).unwrap();

        let peak = image.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(max_abs_diff(&image, &out) <= 1e-9 * peak);
    }

    #[test]
    fn test_round_trip_odd() {
        let image = test_image::generate(Pattern::Gradient, 7, 9);
        let mut transform = SpectrumTransform::new();
        let state = transform.compute(image.view()).unwrap();
        let out = transform.reconstruct(&state, state.amplitude().view()).unwrap();
        assert!(max_abs_diff(&image, &out) < 1e-9);
    }

    #[test]
    fn test_dc_is_centered() {
        let image = Array2::from_elem((8, 6), 2.0);
        let mut transform = SpectrumTransform::new();
        let state = transform.compute(image.view()).unwrap();

        assert_eq!(state.center(), (4, 3));
        // Constant image: all energy in DC = sum of pixels
        assert!((state.amplitude()[(4, 3)] - 96.0).abs() < 1e-9);
        let rest: f64 = state.amplitude().iter().sum::<f64>() - state.amplitude()[(4, 3)];
        assert!(rest.abs() < 1e-9);
    }

    #[test]
    fn test_amplitude_and_phase_ranges() {
        let image = test_image::generate(Pattern::Checkerboard, 8, 8);
        let mut transform = SpectrumTransform::new();
        let state = transform.compute(image.view()).unwrap();

        assert!(state.amplitude().iter().all(|&a| a >= 0.0));
        assert!(state.phase().iter().all(|&p| p > -PI && p <= PI));
        assert_eq!(state.original(), &image);
    }

    #[test]
    fn test_empty_image_rejected() {
        let mut transform = SpectrumTransform::new();
        let err = transform.compute(Array2::<f64>::zeros((0, 4)).view()).unwrap_err();
        assert!(matches!(err, EditError::InvalidInput { .. }));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut image = Array2::<f64>::zeros((4, 4));
        image[(1, 2)] = f64::NAN;
        let mut transform = SpectrumTransform::new();
        assert!(transform.compute(image.view()).is_err());

        image[(1, 2)] = f64::INFINITY;
        assert!(transform.compute(image.view()).is_err());
    }

    #[test]
    fn test_reconstruct_shape_mismatch() {
        let image = Array2::<f64>::ones((4, 4));
        let mut transform = SpectrumTransform::new();
        let state = transform.compute(image.view()).unwrap();
        let err = transform
            .reconstruct(&state, Array2::<f64>::ones((4, 5)).view())
            .unwrap_err();
        assert_eq!(err, EditError::shape_mismatch((4, 4), (4, 5)));
    }

    #[test]
    fn test_reconstruct_is_deterministic() {
        let image = test_image::generate(Pattern::Grating, 12, 12);
        let mut transform = SpectrumTransform::new();
        let state = transform.compute(image.view()).unwrap();
        let halved = state.amplitude().mapv(|a| a * 0.5);

        let a = transform.reconstruct(&state, halved.view()).unwrap();
        let b = transform.reconstruct(&state, halved.view()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_shift_inverse_odd() {
        let data = Array2::from_shape_fn((3, 5), |(r, c)| r * 5 + c);
        let shifted = fft_shift(&data);
        assert_eq!(shifted[(1, 2)], 0);
        assert_eq!(ifft_shift(&shifted), data);
    }

    #[test]
    fn test_log_magnitude() {
        let amplitude = Array2::from_shape_vec((1, 3), vec![0.0, 1.0, std::f64::consts::E - 1.0])
            .unwrap();
        let log = log_magnitude(&amplitude);
        assert_eq!(log[(0, 0)], 0.0);
        assert!((log[(0, 1)] - 2.0f64.ln()).abs() < 1e-12);
        assert!((log[(0, 2)] - 1.0).abs() < 1e-12);
    }
}
