//! Error types for raster surfaces.

use thiserror::Error;

/// Errors that can occur when creating or exporting a raster surface.
#[derive(Error, Debug)]
pub enum RasterError {
    /// The pixel buffer could not be allocated (zero or oversized dimensions)
    #[error("Cannot allocate a {width}x{height} surface")]
    Allocation {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// An exported buffer did not match the surface dimensions
    #[error("Buffer size mismatch: expected {expected} bytes, got {found}")]
    SizeMismatch {
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        found: usize,
    },

    /// Font file could not be read or parsed
    #[error("Font error: {0}")]
    Font(String),

    /// I/O error while reading a font
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
