//! A single spectrum mask and its weight matrix.

use std::borrow::Cow;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::geometry::{Geometry, rasterize};
use crate::constants::{DEFAULT_INTENSITY, MAX_INTENSITY, MIN_INTENSITY};

/// Unique identifier for a mask.
pub type MaskId = u32;

/// How a mask acts on the amplitude it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaskMode {
    /// Scale the covered amplitude by the mask intensity
    #[default]
    Attenuate,
    /// Keep only the covered amplitude, zero everything else
    Isolate,
}

impl MaskMode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            MaskMode::Attenuate => "Remove",
            MaskMode::Isolate => "Highlight",
        }
    }

    /// Get all modes.
    pub fn all() -> &'static [MaskMode] {
        &[MaskMode::Attenuate, MaskMode::Isolate]
    }

    /// Weight of cells outside the mask shape.
    pub fn background_value(&self) -> f64 {
        match self {
            MaskMode::Attenuate => 1.0,
            MaskMode::Isolate => 0.0,
        }
    }
}

/// A mask over the spectrum.
///
/// The weight matrix is derived state: it is regenerated by every setter that
/// changes geometry, mode or intensity and cannot be written directly.
#[derive(Debug, Clone)]
pub struct Mask {
    id: MaskId,
    geometry: Option<Geometry>,
    mode: MaskMode,
    intensity: f64,
    enabled: bool,
    weight_matrix: Array2<f64>,
}

impl Mask {
    /// Create an unconfigured mask for a spectrum of the given shape.
    pub fn new(id: MaskId, shape: (usize, usize), mode: MaskMode) -> Self {
        Self {
            id,
            geometry: None,
            mode,
            intensity: DEFAULT_INTENSITY,
            enabled: true,
            weight_matrix: Array2::from_elem(shape, mode.background_value()),
        }
    }

    pub fn id(&self) -> MaskId {
        self.id
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn mode(&self) -> MaskMode {
        self.mode
    }

    /// Intensity used in attenuate mode, within `[0, 2]`.
    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a geometry has been assigned yet.
    pub fn is_configured(&self) -> bool {
        self.geometry.is_some()
    }

    /// Shape of the weight matrix as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.weight_matrix.dim()
    }

    /// Assign a new shape and regenerate the weights.
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = Some(geometry.normalized());
        self.regenerate();
    }

    /// Set the attenuation intensity, clamped to `[0, 2]`.
    ///
    /// The value is kept in isolate mode too and takes effect once the mask is
    /// switched back to attenuate.
    pub fn set_intensity(&mut self, intensity: f64) {
        let clamped = clamp_intensity(intensity);
        if clamped != intensity {
            log::warn!(
                "Mask {}: intensity {} outside [{}, {}], using {}",
                self.id,
                intensity,
                MIN_INTENSITY,
                MAX_INTENSITY,
                clamped
            );
        }
        self.intensity = clamped;
        self.regenerate();
    }

    /// Reclassify this mask.
    pub fn set_mode(&mut self, mode: MaskMode) {
        self.mode = mode;
        self.regenerate();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// The weights this mask contributes.
    ///
    /// A disabled mask contributes the mode's background everywhere, i.e. no effect.
    pub fn weight_matrix(&self) -> Cow<'_, Array2<f64>> {
        if self.enabled {
            Cow::Borrowed(&self.weight_matrix)
        } else {
            Cow::Owned(Array2::from_elem(
                self.weight_matrix.dim(),
                self.mode.background_value(),
            ))
        }
    }

    /// Label for mask lists, e.g. "Remove Rectangle".
    pub fn label(&self) -> String {
        match &self.geometry {
            Some(geometry) => format!("{} {}", self.mode.name(), geometry.kind().name()),
            None => format!("{} (empty)", self.mode.name()),
        }
    }

    /// `(fill, background)` passed to the rasterizer for the current mode.
    fn fill_and_background(&self) -> (f64, f64) {
        match self.mode {
            MaskMode::Attenuate => (self.intensity, 1.0),
            MaskMode::Isolate => (1.0, 0.0),
        }
    }

    fn regenerate(&mut self) {
        let shape = self.weight_matrix.dim();
        let (fill, background) = self.fill_and_background();
        self.weight_matrix = match &self.geometry {
            Some(geometry) => rasterize(geometry, shape, fill, background),
            None => Array2::from_elem(shape, background),
        };
        log::debug!("Mask {}: regenerated {:?} weights", self.id, self.mode);
    }
}

/// Clamp an intensity into the editable domain. NaN maps to no change.
pub fn clamp_intensity(intensity: f64) -> f64 {
    if intensity.is_nan() {
        DEFAULT_INTENSITY
    } else {
        intensity.clamp(MIN_INTENSITY, MAX_INTENSITY)
    }
}
