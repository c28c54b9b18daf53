//! Grayscale image ingestion.
//!
//! This module provides:
//! - `GrayscaleLoader`: trait implemented by every input format
//! - `LoaderRegistry`: format detection and a unified loading interface
//! - Built-in loaders for images (PNG, JPEG, etc.) and NumPy (.npy) files
//!
//! Every loader produces a single-channel `Array2<f64>` indexed `(row, col)`,
//! ready for [`crate::EditSession::load`].
//!
//! ## Adding New Formats
//!
//! 1. Create a new loader in `loaders/` implementing `GrayscaleLoader`
//! 2. Register it in `LoaderRegistry::new()`
//!
//! ```rust,ignore
//! use fdie::data::{GrayscaleLoader, LoaderError};
//! use ndarray::Array2;
//!
//! pub struct MyFormatLoader;
//!
//! impl GrayscaleLoader for MyFormatLoader {
//!     fn id(&self) -> &'static str { "myformat" }
//!     fn display_name(&self) -> &'static str { "My Format" }
//!     fn extensions(&self) -> &'static [&'static str] { &["myf"] }
//!     fn can_load(&self, data: &[u8]) -> bool { /* check magic bytes */ }
//!     fn load(&self, data: &[u8]) -> Result<Array2<f64>, LoaderError> { /* ... */ }
//! }
//! ```

mod loader;
pub mod loaders;

pub use loader::{GrayscaleLoader, LoaderError, LoaderRegistry};
