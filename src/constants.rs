//! Global constants for the FDIE editor

/// Lowest attenuation intensity (total removal)
pub const MIN_INTENSITY: f64 = 0.0;

/// Highest attenuation intensity (doubles the covered amplitude)
pub const MAX_INTENSITY: f64 = 2.0;

/// Intensity of a freshly created mask (no change)
pub const DEFAULT_INTENSITY: f64 = 1.0;

/// Intensity used for new masks when the configuration does not say otherwise
pub const DEFAULT_EDIT_INTENSITY: f64 = 0.0;

/// Default test image size
pub const DEFAULT_TEST_SIZE: usize = 256;
