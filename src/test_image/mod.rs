//! Synthetic grayscale test images.
//!
//! Each pattern has a recognisable spectrum, which makes them useful both
//! for demonstrating mask edits and for tests:
//! - impulse: flat amplitude
//! - gradient: energy along both frequency axes
//! - checkerboard: energy at the Nyquist corners
//! - grating: two symmetric peaks beside DC
//! - rings: a ring of energy around DC

use ndarray::Array2;

/// Available test patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Single bright pixel in the centre
    Impulse,
    /// Diagonal ramp
    Gradient,
    /// 4x4 pixel checker squares
    Checkerboard,
    /// Vertical sinusoidal stripes
    Grating,
    /// Concentric rings
    Rings,
}

impl Pattern {
    /// Get the display name for this pattern.
    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Impulse => "Impulse",
            Pattern::Gradient => "Gradient",
            Pattern::Checkerboard => "Checkerboard",
            Pattern::Grating => "Grating",
            Pattern::Rings => "Rings",
        }
    }

    /// Get all available patterns.
    pub fn all() -> &'static [Pattern] {
        &[
            Pattern::Impulse,
            Pattern::Gradient,
            Pattern::Checkerboard,
            Pattern::Grating,
            Pattern::Rings,
        ]
    }
}

/// Checker square edge length in pixels.
const CHECKER_SIZE: usize = 4;

/// Stripe period of the grating in pixels.
const GRATING_PERIOD: f64 = 4.0;

/// Generate a `rows x cols` test image with values in `0.0..=255.0`.
pub fn generate(pattern: Pattern, rows: usize, cols: usize) -> Array2<f64> {
    let (cy, cx) = (rows / 2, cols / 2);
    let max_dim = rows.max(cols).max(1) as f64;

    Array2::from_shape_fn((rows, cols), |(r, c)| match pattern {
        Pattern::Impulse => {
            if (r, c) == (cy, cx) {
                255.0
            } else {
                0.0
            }
        }
        Pattern::Gradient => {
            let span = (rows + cols).saturating_sub(2).max(1) as f64;
            255.0 * (r + c) as f64 / span
        }
        Pattern::Checkerboard => {
            if ((r / CHECKER_SIZE) + (c / CHECKER_SIZE)) % 2 == 0 {
                204.0
            } else {
                51.0
            }
        }
        Pattern::Grating => {
            let phase = 2.0 * std::f64::consts::PI * c as f64 / GRATING_PERIOD;
            127.5 + 127.5 * phase.cos()
        }
        Pattern::Rings => {
            let dy = r as f64 - cy as f64;
            let dx = c as f64 - cx as f64;
            let dist = (dx * dx + dy * dy).sqrt() / max_dim;
            127.5 + 127.5 * (dist * 40.0).sin()
        }
    })
}
