//! Editing session: one loaded image, its spectrum and the masks drawn over it.
//!
//! This is the only type a front end needs. Every mask mutation goes through
//! the session (or through [`EditSession::masks_mut`]), and the reconstruction
//! is recomputed lazily the next time it is requested.

use ndarray::{Array2, ArrayView2};

use crate::constants::DEFAULT_EDIT_INTENSITY;
use crate::error::EditError;
use crate::model::{Geometry, Mask, MaskId, MaskMode, MaskSet, clamp_intensity};
use crate::spectrum::{SpectrumState, SpectrumTransform, log_magnitude};

/// Orchestrates the transform and the mask set for a single image.
pub struct EditSession {
    transform: SpectrumTransform,
    spectrum: Option<SpectrumState>,
    masks: MaskSet,
    /// Intensity given to masks created through [`EditSession::add_mask`].
    default_intensity: f64,
    /// Last reconstruction, valid while the mask set is clean.
    reconstruction: Option<Array2<f64>>,
}

impl EditSession {
    pub fn new() -> Self {
        Self {
            transform: SpectrumTransform::new(),
            spectrum: None,
            masks: MaskSet::new((0, 0)),
            default_intensity: DEFAULT_EDIT_INTENSITY,
            reconstruction: None,
        }
    }

    /// Set the intensity used for new masks (clamped to `[0, 2]`).
    pub fn with_default_intensity(mut self, intensity: f64) -> Self {
        self.default_intensity = clamp_intensity(intensity);
        self
    }

    /// Transform a new image and drop all masks.
    ///
    /// On failure the previously loaded image and its masks are kept.
    /// The active mode survives a reload.
    pub fn load(&mut self, image: ArrayView2<'_, f64>) -> Result<(), EditError> {
        let state = self.transform.compute(image)?;
        let active_mode = self.masks.active_mode();

        self.masks = MaskSet::new(state.shape());
        self.masks.set_active_mode(active_mode);
        self.spectrum = Some(state);
        self.reconstruction = None;

        log::info!("Loaded {}x{} image", image.nrows(), image.ncols());
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.spectrum.is_some()
    }

    /// Spectrum of the loaded image.
    pub fn spectrum(&self) -> Result<&SpectrumState, EditError> {
        self.spectrum.as_ref().ok_or(EditError::NotLoaded)
    }

    /// The loaded image, unmodified.
    pub fn original(&self) -> Result<&Array2<f64>, EditError> {
        Ok(self.spectrum()?.original())
    }

    pub fn masks(&self) -> &MaskSet {
        &self.masks
    }

    /// Direct access to the mask set; any mutable borrow of a mask marks it dirty.
    pub fn masks_mut(&mut self) -> &mut MaskSet {
        &mut self.masks
    }

    pub fn mask(&self, id: MaskId) -> Option<&Mask> {
        self.masks.get(id)
    }

    pub fn active_mode(&self) -> MaskMode {
        self.masks.active_mode()
    }

    pub fn set_active_mode(&mut self, mode: MaskMode) {
        self.masks.set_active_mode(mode);
    }

    /// Create a mask in the active mode with the default intensity.
    pub fn add_mask(&mut self, geometry: Geometry) -> Result<MaskId, EditError> {
        self.spectrum()?;
        let id = self.masks.add_shape(geometry, self.default_intensity);
        log::debug!("Added mask {}: {}", id, self.describe(id));
        Ok(id)
    }

    pub fn remove_mask(&mut self, id: MaskId) -> Result<Mask, EditError> {
        let removed = self
            .masks
            .remove(id)
            .ok_or(EditError::UnknownMask { id })?;
        log::debug!("Removed mask {}", id);
        Ok(removed)
    }

    pub fn set_mask_geometry(&mut self, id: MaskId, geometry: Geometry) -> Result<(), EditError> {
        self.mask_mut(id)?.set_geometry(geometry);
        Ok(())
    }

    pub fn set_mask_intensity(&mut self, id: MaskId, intensity: f64) -> Result<(), EditError> {
        self.mask_mut(id)?.set_intensity(intensity);
        Ok(())
    }

    /// Reclassify a single mask; the active mode is not changed.
    pub fn set_mask_mode(&mut self, id: MaskId, mode: MaskMode) -> Result<(), EditError> {
        self.mask_mut(id)?.set_mode(mode);
        Ok(())
    }

    pub fn set_mask_enabled(&mut self, id: MaskId, enabled: bool) -> Result<(), EditError> {
        self.mask_mut(id)?.set_enabled(enabled);
        Ok(())
    }

    /// The image after applying the current masks.
    ///
    /// Returns the original image when no mask participates. The inverse
    /// transform only runs when the mask set changed since the last call.
    pub fn current_reconstruction(&mut self) -> Result<&Array2<f64>, EditError> {
        if self.masks.is_dirty() || self.reconstruction.is_none() {
            let image = self.reconstruct_now()?;
            self.reconstruction = Some(image);
            self.masks.clear_dirty();
        }
        self.reconstruction.as_ref().ok_or(EditError::NotLoaded)
    }

    /// Log-magnitude of the unmasked spectrum.
    pub fn spectrum_display(&self) -> Result<Array2<f64>, EditError> {
        Ok(self.spectrum()?.log_magnitude())
    }

    /// Log-magnitude of the spectrum with the combined mask applied.
    pub fn masked_spectrum_display(&self) -> Result<Array2<f64>, EditError> {
        let state = self.spectrum()?;
        Ok(match self.masks.combined_weight() {
            Some(weight) => log_magnitude(&(state.amplitude() * &weight)),
            None => state.log_magnitude(),
        })
    }

    /// Drop every mask and return a copy of the original image.
    pub fn reset(&mut self) -> Result<Array2<f64>, EditError> {
        let original = self.original()?.clone();
        self.masks.clear();
        log::info!("Reset: all masks cleared");
        Ok(original)
    }

    fn mask_mut(&mut self, id: MaskId) -> Result<&mut Mask, EditError> {
        self.masks.get_mut(id).ok_or(EditError::UnknownMask { id })
    }

    fn describe(&self, id: MaskId) -> String {
        self.masks
            .get(id)
            .map(Mask::label)
            .unwrap_or_default()
    }

    fn reconstruct_now(&mut self) -> Result<Array2<f64>, EditError> {
        let state = self.spectrum.as_ref().ok_or(EditError::NotLoaded)?;
        match self.masks.combined_weight() {
            None => Ok(state.original().clone()),
            Some(weight) => {
                let modified = state.amplitude() * &weight;
                log::debug!(
                    "Reconstructing with {} participating mask(s)",
                    self.masks.participating().count()
                );
                self.transform.reconstruct(state, modified.view())
            }
        }
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}
