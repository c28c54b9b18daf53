//! Error types for spectrum editing operations.

use thiserror::Error;

use crate::model::MaskId;

/// Errors that can occur while transforming, masking or reconstructing an image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// The supplied image or matrix cannot be processed
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what was wrong with the input
        message: String,
    },

    /// A matrix does not have the dimensions of the loaded spectrum
    #[error("Invalid input: expected a {}x{} matrix, found {}x{}", .expected.0, .expected.1, .found.0, .found.1)]
    ShapeMismatch {
        /// Spectrum shape as (rows, cols)
        expected: (usize, usize),
        /// Shape that was supplied
        found: (usize, usize),
    },

    /// No image has been transformed yet
    #[error("Invalid input: no image has been loaded")]
    NotLoaded,

    /// A mask id that is not part of the mask set
    #[error("Mask not found: {id}")]
    UnknownMask {
        /// The missing mask id
        id: MaskId,
    },
}

impl EditError {
    /// Create an invalid input error with a message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a shape mismatch error.
    pub fn shape_mismatch(expected: (usize, usize), found: (usize, usize)) -> Self {
        Self::ShapeMismatch { expected, found }
    }

    /// Whether this error belongs to the invalid input family.
    ///
    /// Shape mismatches and missing spectra are reported as invalid input to
    /// callers that only care about the broad category.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::ShapeMismatch { .. } | Self::NotLoaded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EditError::shape_mismatch((8, 8), (4, 8));
        assert_eq!(
            err.to_string(),
            "Invalid input: expected a 8x8 matrix, found 4x8"
        );
        assert_eq!(
            EditError::NotLoaded.to_string(),
            "Invalid input: no image has been loaded"
        );
        assert_eq!(EditError::UnknownMask { id: 7 }.to_string(), "Mask not found: 7");
    }

    #[test]
    fn test_invalid_input_family() {
        assert!(EditError::invalid_input("empty").is_invalid_input());
        assert!(EditError::NotLoaded.is_invalid_input());
        assert!(EditError::shape_mismatch((1, 1), (2, 2)).is_invalid_input());
        assert!(!EditError::UnknownMask { id: 1 }.is_invalid_input());
    }
}
