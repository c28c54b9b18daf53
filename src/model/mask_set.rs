//! Ordered mask storage and the multi-mask combination policy.

use ndarray::{Array2, Zip};

use super::geometry::Geometry;
use super::mask::{Mask, MaskId, MaskMode};

/// The masks drawn over one spectrum.
///
/// Insertion order is preserved and doubles as z-order. `active_mode` is the
/// globally selected mode: new masks take it as their own mode, and only
/// masks whose mode matches it take part in [`MaskSet::combined_weight`].
#[derive(Debug, Clone)]
pub struct MaskSet {
    /// All masks, in insertion order.
    masks: Vec<Mask>,
    /// Spectrum shape every mask is created against.
    shape: (usize, usize),
    /// Globally selected mode.
    active_mode: MaskMode,
    /// Counter for generating unique mask IDs.
    next_id: MaskId,
    /// Currently selected mask ID.
    selected_id: Option<MaskId>,
    /// Dirty flag - set whenever the combined weight may have changed.
    dirty: bool,
}

impl MaskSet {
    /// Create an empty set for a spectrum of the given shape.
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            masks: Vec::new(),
            shape,
            active_mode: MaskMode::default(),
            next_id: 1,
            selected_id: None,
            dirty: true,
        }
    }

    /// Check if the set has been modified since last clear_dirty().
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag. Call after recomputing the reconstruction.
    #[inline]
    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Mark the set as dirty.
    #[inline]
    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn active_mode(&self) -> MaskMode {
        self.active_mode
    }

    /// Switch the global mode. Per-mask modes are left untouched.
    pub fn set_active_mode(&mut self, mode: MaskMode) {
        if self.active_mode != mode {
            log::debug!("Active mask mode: {:?} -> {:?}", self.active_mode, mode);
            self.active_mode = mode;
            self.mark_dirty();
        }
    }

    /// Add an unconfigured mask in the active mode, select it and return its ID.
    pub fn add(&mut self) -> MaskId {
        self.add_with_mode(self.active_mode)
    }

    /// Add an unconfigured mask with an explicit mode.
    pub fn add_with_mode(&mut self, mode: MaskMode) -> MaskId {
        let id = self.next_id;
        self.next_id += 1;
        self.masks.push(Mask::new(id, self.shape, mode));
        self.selected_id = Some(id);
        self.mark_dirty();
        id
    }

    /// Add a mask in the active mode with its geometry and intensity set.
    pub fn add_shape(&mut self, geometry: Geometry, intensity: f64) -> MaskId {
        let id = self.add();
        if let Some(mask) = self.get_mut(id) {
            mask.set_intensity(intensity);
            mask.set_geometry(geometry);
        }
        id
    }

    /// Remove a mask by ID.
    pub fn remove(&mut self, id: MaskId) -> Option<Mask> {
        let index = self.masks.iter().position(|m| m.id() == id)?;
        let removed = self.masks.remove(index);
        if self.selected_id == Some(id) {
            self.selected_id = None;
        }
        self.mark_dirty();
        Some(removed)
    }

    /// Get a mask by ID.
    pub fn get(&self, id: MaskId) -> Option<&Mask> {
        self.masks.iter().find(|m| m.id() == id)
    }

    /// Get a mutable reference to a mask by ID.
    ///
    /// Marks the set dirty, since any setter changes the combined weight.
    pub fn get_mut(&mut self, id: MaskId) -> Option<&mut Mask> {
        let mask = self.masks.iter_mut().find(|m| m.id() == id)?;
        self.dirty = true;
        Some(mask)
    }

    /// Iterate masks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Mask> {
        self.masks.iter()
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Remove every mask.
    pub fn clear(&mut self) {
        if !self.masks.is_empty() {
            self.mark_dirty();
        }
        self.masks.clear();
        self.selected_id = None;
    }

    /// Select a mask, or clear the selection with `None`.
    ///
    /// Selecting an unknown ID clears the selection.
    pub fn select(&mut self, id: Option<MaskId>) {
        self.selected_id = id.filter(|&id| self.get(id).is_some());
    }

    /// Get the selected mask ID.
    pub fn selected_id(&self) -> Option<MaskId> {
        self.selected_id
    }

    /// Get the selected mask.
    pub fn selected(&self) -> Option<&Mask> {
        self.selected_id.and_then(|id| self.get(id))
    }

    /// Masks that currently shape the combined weight.
    ///
    /// A mask without geometry still participates with its all-background weights.
    pub fn participating(&self) -> impl Iterator<Item = &Mask> {
        let mode = self.active_mode;
        self.masks
            .iter()
            .filter(move |m| m.is_enabled() && m.mode() == mode)
    }

    /// Combine the participating masks into one weight matrix.
    ///
    /// Attenuate masks multiply, starting from ones; isolate masks take the
    /// element-wise maximum, starting from zeros. Returns `None` if no mask
    /// participates.
    pub fn combined_weight(&self) -> Option<Array2<f64>> {
        let mut participating = self.participating().peekable();
        participating.peek()?;

        let combined = match self.active_mode {
            MaskMode::Attenuate => {
                participating.fold(Array2::<f64>::ones(self.shape), |mut acc, mask| {
                    acc *= &*mask.weight_matrix();
                    acc
                })
            }
            MaskMode::Isolate => {
                participating.fold(Array2::<f64>::zeros(self.shape), |mut acc, mask| {
                    Zip::from(&mut acc)
                        .and(&*mask.weight_matrix())
                        .for_each(|a, &w| *a = a.max(w));
                    acc
                })
            }
        };
        Some(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: (usize, usize) = (8, 8);

    fn attenuate_cell(set: &mut MaskSet, row: i64, col: i64, intensity: f64) -> MaskId {
        set.set_active_mode(MaskMode::Attenuate);
        set.add_shape(Geometry::freeform(vec![(row, col)]), intensity)
    }

    fn isolate_cell(set: &mut MaskSet, row: i64, col: i64) -> MaskId {
        set.set_active_mode(MaskMode::Isolate);
        set.add_shape(Geometry::freeform(vec![(row, col)]), 1.0)
    }

    #[test]
    fn test_empty_set_has_no_weight() {
        let set = MaskSet::new(SHAPE);
        assert!(set.is_empty());
        assert!(set.combined_weight().is_none());
    }

    #[test]
    fn test_add_remove_and_selection() {
        let mut set = MaskSet::new(SHAPE);
        let a = set.add();
        let b = set.add();
        assert_ne!(a, b);
        assert_eq!(set.len(), 2);
        assert_eq!(set.selected_id(), Some(b));

        set.select(Some(a));
        assert_eq!(set.selected().map(Mask::id), Some(a));
        set.select(Some(999));
        assert_eq!(set.selected_id(), None);

        set.select(Some(b));
        assert!(set.remove(b).is_some());
        assert_eq!(set.selected_id(), None);
        assert!(set.remove(b).is_none());
        assert_eq!(set.iter().map(Mask::id).collect::<Vec<_>>(), vec![a]);

        // IDs are never reused
        let c = set.add();
        assert!(c > b);
    }

    #[test]
    fn test_attenuate_overlap_multiplies() {
        let mut set = MaskSet::new(SHAPE);
        attenuate_cell(&mut set, 2, 3, 0.5);
        attenuate_cell(&mut set, 2, 3, 0.5);

        let combined = set.combined_weight().unwrap();
        assert!((combined[(2, 3)] - 0.25).abs() < 1e-12);
        assert!((combined[(6, 5)] - 0.25).abs() < 1e-12);
        assert_eq!(combined[(0, 0)], 1.0);
    }

    #[test]
    fn test_isolate_overlap_unions() {
        let mut set = MaskSet::new(SHAPE);
        isolate_cell(&mut set, 1, 2);
        isolate_cell(&mut set, 3, 3);

        let combined = set.combined_weight().unwrap();
        assert_eq!(combined[(1, 2)], 1.0);
        assert_eq!(combined[(3, 3)], 1.0);
        // Mirrors of both cells
        assert_eq!(combined[(7, 6)], 1.0);
        assert_eq!(combined[(5, 5)], 1.0);
        assert_eq!(combined.iter().filter(|&&v| v == 1.0).count(), 4);
        assert_eq!(combined.iter().filter(|&&v| v == 0.0).count(), 60);
    }

    #[test]
    fn test_disabled_mask_is_noop() {
        for mode in MaskMode::all() {
            let mut with = MaskSet::new(SHAPE);
            let mut without = MaskSet::new(SHAPE);
            with.set_active_mode(*mode);
            without.set_active_mode(*mode);

            let keep = Geometry::rectangle(1, 1, 3, 3);
            with.add_shape(keep.clone(), 0.5);
            without.add_shape(keep, 0.5);

            let off = with.add_shape(Geometry::circle(4, 4, 1), 0.0);
            with.get_mut(off).unwrap().set_enabled(false);

            assert_eq!(with.combined_weight(), without.combined_weight());
        }
    }

    #[test]
    fn test_only_disabled_masks_gives_none() {
        let mut set = MaskSet::new(SHAPE);
        let id = attenuate_cell(&mut set, 1, 1, 0.0);
        set.get_mut(id).unwrap().set_enabled(false);
        assert!(set.combined_weight().is_none());
    }

    #[test]
    fn test_unconfigured_isolate_mask_blocks_everything() {
        let mut set = MaskSet::new(SHAPE);
        set.set_active_mode(MaskMode::Isolate);
        set.add();
        let combined = set.combined_weight().unwrap();
        assert_eq!(combined.dim(), SHAPE);
        assert!(combined.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_unconfigured_attenuate_mask_is_identity() {
        let mut set = MaskSet::new(SHAPE);
        set.add();
        let combined = set.combined_weight().unwrap();
        assert!(combined.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_mode_partition_independence() {
        let mut set = MaskSet::new(SHAPE);
        attenuate_cell(&mut set, 2, 2, 0.5);
        isolate_cell(&mut set, 1, 3);

        let isolate = set.combined_weight().unwrap();
        assert_eq!(isolate[(1, 3)], 1.0);
        assert_eq!(isolate[(2, 2)], 0.0);
        assert!(isolate.iter().all(|&v| v == 0.0 || v == 1.0));

        set.set_active_mode(MaskMode::Attenuate);
        let attenuate = set.combined_weight().unwrap();
        assert_eq!(attenuate[(2, 2)], 0.5);
        assert_eq!(attenuate[(1, 3)], 1.0);
        assert_eq!(attenuate.iter().filter(|&&v| v != 1.0).count(), 2);

        // Stored per-mask modes are untouched by the global switch
        let modes: Vec<_> = set.iter().map(Mask::mode).collect();
        assert_eq!(modes, vec![MaskMode::Attenuate, MaskMode::Isolate]);
    }

    #[test]
    fn test_reclassified_mask_joins_other_partition() {
        let mut set = MaskSet::new(SHAPE);
        let id = attenuate_cell(&mut set, 2, 2, 0.5);
        set.set_active_mode(MaskMode::Isolate);
        assert!(set.combined_weight().is_none());

        set.get_mut(id).unwrap().set_mode(MaskMode::Isolate);
        assert_eq!(set.combined_weight().unwrap()[(2, 2)], 1.0);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut set = MaskSet::new(SHAPE);
        assert!(set.is_dirty());
        set.clear_dirty();

        set.set_active_mode(MaskMode::Attenuate);
        assert!(!set.is_dirty());

        let id = set.add();
        assert!(set.is_dirty());
        set.clear_dirty();

        set.get_mut(id).unwrap().set_intensity(0.1);
        assert!(set.is_dirty());
        set.clear_dirty();

        set.clear();
        assert!(set.is_dirty());
        assert!(set.is_empty());
    }
}
