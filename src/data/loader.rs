//! Trait-based grayscale loading system.
//!
//! ## Supported Formats
//!
//! - **Standard Images**: PNG, JPEG, BMP, TIFF, WebP (converted to 8-bit luma)
//! - **NumPy Arrays**: `.npy` files holding a 2D `(rows, cols)` array
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fdie::data::LoaderRegistry;
//!
//! let registry = LoaderRegistry::new();
//! let image = registry.load(bytes, Some("image.npy"))?;
//! ```

use std::path::Path;

use ndarray::Array2;
use thiserror::Error;

/// Errors that can occur while loading an image.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// The loader recognised the data but could not decode it
    #[error("[{loader}] {message}")]
    Decode {
        /// The loader that produced this error
        loader: &'static str,
        /// Human-readable error message
        message: String,
    },

    /// The data decoded but does not describe a 2D single-channel image
    #[error("[{loader}] unsupported array layout: {shape:?}")]
    UnsupportedLayout {
        /// The loader that produced this error
        loader: &'static str,
        /// Shape of the decoded array
        shape: Vec<usize>,
    },

    /// No registered loader accepted the data
    #[error("No loader could handle the data{}", file_suffix(.filename))]
    NoLoader {
        /// File name the data came from, if known
        filename: Option<String>,
    },

    /// I/O error reading the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn file_suffix(filename: &Option<String>) -> String {
    filename
        .as_deref()
        .map(|f| format!(" (file: {})", f))
        .unwrap_or_default()
}

impl LoaderError {
    /// Create a decode error for a loader.
    pub fn decode(loader: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            loader,
            message: message.into(),
        }
    }
}

/// Trait for grayscale format loaders.
///
/// Each format implements this trait to turn raw file bytes into a
/// single-channel `f64` matrix.
pub trait GrayscaleLoader: Send + Sync {
    /// Unique identifier for this loader (e.g., "image", "npy").
    fn id(&self) -> &'static str;

    /// Human-readable name for UI display.
    fn display_name(&self) -> &'static str;

    /// File extensions this loader handles (lowercase, without dots).
    fn extensions(&self) -> &'static [&'static str];

    /// Check if this loader can handle the given data.
    ///
    /// Used for format auto-detection when the file extension is unknown
    /// or ambiguous. Implementations should check magic bytes or headers.
    fn can_load(&self, data: &[u8]) -> bool;

    /// Load a grayscale matrix from raw bytes.
    fn load(&self, data: &[u8]) -> Result<Array2<f64>, LoaderError>;

    /// Priority for format detection (higher = checked first).
    fn priority(&self) -> i32 {
        0
    }
}

/// Registry of available grayscale loaders.
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn GrayscaleLoader>>,
}

impl LoaderRegistry {
    /// Create a new registry with all built-in loaders.
    pub fn new() -> Self {
        let mut registry = Self {
            loaders: Vec::new(),
        };

        // Register built-in loaders (order matters for priority ties)
        registry.register(Box::new(super::loaders::ImageLoader));
        registry.register(Box::new(super::loaders::NpyLoader));

        registry
    }

    /// Register a new loader.
    pub fn register(&mut self, loader: Box<dyn GrayscaleLoader>) {
        self.loaders.push(loader);
        // Stable sort keeps registration order among equal priorities
        self.loaders.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Get all supported file extensions (for file filtering).
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = self
            .loaders
            .iter()
            .flat_map(|l| l.extensions().iter().copied())
            .collect();
        extensions.sort();
        extensions.dedup();
        extensions
    }

    /// Find loaders that handle a given extension.
    fn loaders_for_extension(&self, ext: &str) -> impl Iterator<Item = &dyn GrayscaleLoader> {
        let ext_lower = ext.to_lowercase();
        self.loaders
            .iter()
            .filter(move |l| l.extensions().iter().any(|e| *e == ext_lower))
            .map(|l| l.as_ref())
    }

    /// Find a loader by trying magic byte detection.
    fn detect_loader(&self, data: &[u8]) -> Option<&dyn GrayscaleLoader> {
        self.loaders
            .iter()
            .find(|l| l.can_load(data))
            .map(|l| l.as_ref())
    }

    /// Load data, auto-detecting the format.
    ///
    /// Tries loaders in this order:
    /// 1. By file extension (if filename provided)
    /// 2. By magic byte detection
    /// 3. All loaders as fallback
    pub fn load(&self, data: &[u8], filename: Option<&str>) -> Result<Array2<f64>, LoaderError> {
        let extension = filename.and_then(|f| f.rsplit_once('.').map(|(_, e)| e));

        if let Some(ext) = extension {
            for loader in self.loaders_for_extension(ext) {
                match loader.load(data) {
                    Ok(result) => {
                        log::debug!("Loaded with {} loader (by extension)", loader.id());
                        return Ok(result);
                    }
                    Err(e) => log::trace!("Loader {} failed: {}", loader.id(), e),
                }
            }
        }

        if let Some(loader) = self.detect_loader(data) {
            match loader.load(data) {
                Ok(result) => {
                    log::debug!("Loaded with {} loader (by detection)", loader.id());
                    return Ok(result);
                }
                Err(e) => log::trace!("Detected loader {} failed: {}", loader.id(), e),
            }
        }

        for loader in &self.loaders {
            if let Ok(result) = loader.load(data) {
                log::debug!("Loaded with {} loader (fallback)", loader.id());
                return Ok(result);
            }
        }

        Err(LoaderError::NoLoader {
            filename: filename.map(str::to_string),
        })
    }

    /// Read a file from disk and load it.
    pub fn load_path(&self, path: &Path) -> Result<Array2<f64>, LoaderError> {
        let data = std::fs::read(path)?;
        let filename = path.file_name().and_then(|n| n.to_str());
        let image = self.load(&data, filename)?;
        log::info!(
            "Loaded {:?} as {}x{} grayscale",
            path,
            image.nrows(),
            image.ncols()
        );
        Ok(image)
    }

    /// Check if a filename has a supported extension.
    pub fn is_supported_file(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.supported_extensions()
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext)))
    }

    /// Get all registered loaders.
    pub fn loaders(&self) -> &[Box<dyn GrayscaleLoader>] {
        &self.loaders
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_loaders() {
        let registry = LoaderRegistry::new();
        assert_eq!(registry.loaders().len(), 2);
        // NumPy outranks generic images
        assert_eq!(registry.loaders()[0].id(), "npy");
    }

    #[test]
    fn test_supported_extensions() {
        let registry = LoaderRegistry::new();
        let extensions = registry.supported_extensions();

        assert!(extensions.contains(&"png"));
        assert!(extensions.contains(&"jpg"));
        assert!(extensions.contains(&"npy"));
    }

    #[test]
    fn test_is_supported_file() {
        let registry = LoaderRegistry::new();

        assert!(registry.is_supported_file("image.png"));
        assert!(registry.is_supported_file("data.npy"));
        assert!(registry.is_supported_file("IMAGE.PNG")); // case insensitive
        assert!(!registry.is_supported_file("document.pdf"));
    }

    #[test]
    fn test_garbage_rejected() {
        let registry = LoaderRegistry::new();
        let err = registry.load(&[0u8, 1, 2, 3], Some("noise.bin")).unwrap_err();
        assert!(matches!(err, LoaderError::NoLoader { .. }));
        assert_eq!(
            err.to_string(),
            "No loader could handle the data (file: noise.bin)"
        );
    }

    #[test]
    fn test_missing_file() {
        let registry = LoaderRegistry::new();
        let err = registry
            .load_path(Path::new("/definitely/not/here.png"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::Io(_)));
    }
}
