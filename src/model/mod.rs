//! Mask data models: shapes, individual masks and the ordered mask set.

mod geometry;
mod mask;
mod mask_set;

pub use geometry::{Geometry, MaskKind, enforce_symmetry, mirror_of, rasterize};
pub use mask::{Mask, MaskId, MaskMode, clamp_intensity};
pub use mask_set::MaskSet;
