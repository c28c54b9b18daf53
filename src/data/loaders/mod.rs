//! Built-in grayscale loaders.
//!
//! This module contains implementations of the `GrayscaleLoader` trait
//! for various file formats.

mod image_loader;
mod npy_loader;

pub use image_loader::ImageLoader;
pub use npy_loader::NpyLoader;
