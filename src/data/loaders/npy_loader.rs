//! Loader for NumPy `.npy` files.
//!
//! Accepts 2D arrays shaped `(rows, cols)`. A 3D array with a single band
//! on either end (`(1, rows, cols)` or `(rows, cols, 1)`) is squeezed.
//! Values are converted to `f64` without rescaling.

use std::io::Cursor;

use ndarray::{Array2, ArrayD, Axis, Ix2};
use ndarray_npy::ReadNpyExt;

use crate::data::loader::{GrayscaleLoader, LoaderError};

/// Loader for NumPy `.npy` files.
///
/// Supported data types: `f64`, `f32`, `u8`, `u16`, `i16`, `i32`.
pub struct NpyLoader;

impl NpyLoader {
    const ID: &'static str = "npy";

    /// NumPy magic bytes: \x93NUMPY
    const MAGIC: &'static [u8] = &[0x93, b'N', b'U', b'M', b'P', b'Y'];

    /// Convert a decoded array into a `(rows, cols)` matrix.
    fn to_matrix<T>(array: ArrayD<T>) -> Result<Array2<f64>, LoaderError>
    where
        T: Copy + Into<f64>,
    {
        let shape = array.shape().to_vec();
        log::debug!("NpyLoader: array shape = {:?}", shape);

        let squeezed = match shape.as_slice() {
            [_, _] => array,
            [1, _, _] => array.index_axis_move(Axis(0), 0),
            [_, _, 1] => array.index_axis_move(Axis(2), 0),
            _ => {
                return Err(LoaderError::UnsupportedLayout {
                    loader: Self::ID,
                    shape,
                });
            }
        };

        let matrix = squeezed
            .into_dimensionality::<Ix2>()
            .map_err(|e| LoaderError::decode(Self::ID, e.to_string()))?
            .mapv(Into::into);

        log::info!(
            "NpyLoader: loaded {}x{} single-band array",
            matrix.nrows(),
            matrix.ncols()
        );
        Ok(matrix)
    }
}

impl GrayscaleLoader for NpyLoader {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn display_name(&self) -> &'static str {
        "NumPy Array (.npy)"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["npy"]
    }

    fn can_load(&self, data: &[u8]) -> bool {
        data.starts_with(Self::MAGIC)
    }

    fn load(&self, data: &[u8]) -> Result<Array2<f64>, LoaderError> {
        let mut cursor = Cursor::new(data);

        // f64 first: reconstructions exported from the editor are f64
        if let Ok(array) = ArrayD::<f64>::read_npy(&mut cursor) {
            return Self::to_matrix(array);
        }

        cursor.set_position(0);
        if let Ok(array) = ArrayD::<f32>::read_npy(&mut cursor) {
            return Self::to_matrix(array);
        }

        cursor.set_position(0);
        if let Ok(array) = ArrayD::<u8>::read_npy(&mut cursor) {
            return Self::to_matrix(array);
        }

        cursor.set_position(0);
        if let Ok(array) = ArrayD::<u16>::read_npy(&mut cursor) {
            return Self::to_matrix(array);
        }

        cursor.set_position(0);
        if let Ok(array) = ArrayD::<i16>::read_npy(&mut cursor) {
            return Self::to_matrix(array);
        }

        cursor.set_position(0);
        if let Ok(array) = ArrayD::<i32>::read_npy(&mut cursor) {
            return Self::to_matrix(array);
        }

        Err(LoaderError::decode(
            Self::ID,
            "Failed to read NumPy array: unsupported dtype or invalid format",
        ))
    }

    fn priority(&self) -> i32 {
        // Specialised scientific format wins over generic images
        10
    }
}
