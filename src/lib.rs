//! FDIE - Fourier Domain Image Editor
//!
//! Edits a grayscale image through its 2D Fourier spectrum: masks drawn over
//! the centred amplitude spectrum attenuate or isolate frequency regions, and
//! the image is rebuilt from the edited amplitude and the original phase.
//!
//! ```rust,ignore
//! use fdie::{EditSession, Geometry};
//!
//! let mut session = EditSession::new();
//! session.load(image.view())?;
//! let id = session.add_mask(Geometry::circle(64, 64, 10))?;
//! session.set_mask_intensity(id, 0.0)?;
//! let edited = session.current_reconstruction()?;
//! ```

pub mod config;
pub mod constants;
pub mod data;
pub mod display;
pub mod error;
pub mod model;
pub mod session;
pub mod spectrum;
pub mod test_image;

pub use error::EditError;
pub use model::{Geometry, Mask, MaskId, MaskKind, MaskMode, MaskSet};
pub use session::EditSession;
pub use spectrum::{SpectrumState, SpectrumTransform};
