//! Error types for impex-core operations.
//!
//! Only the in-memory side fails here: building an image from a buffer,
//! taking a region view, pairing two grids, parsing a pixel type name.
//! Codec and file errors live in `impex-io`, which wraps this type.
//!
//! ```rust
//! use impex_core::{Error, Image, Rect};
//!
//! let img: Image<u8> = Image::new(4, 4);
//! let err = img.view(Rect::new(2, 2, 4, 4)).unwrap_err();
//! assert!(matches!(err, Error::InvalidRegion { .. }));
//! ```

use crate::rect::Rect;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by image grid and pixel type operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A region view does not fit inside its image.
    #[error("region {region} exceeds image bounds {}x{}", .size.0, .size.1)]
    InvalidRegion {
        /// Requested region.
        region: Rect,
        /// Image `(width, height)`.
        size: (u32, u32),
    },

    /// Two grids that must agree in size do not.
    #[error("dimension mismatch: {}x{} vs {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        /// Size of the first grid.
        expected: (u32, u32),
        /// Size of the second grid.
        actual: (u32, u32),
    },

    /// A pixel buffer does not match the stated size.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Stated width.
        width: u32,
        /// Stated height.
        height: u32,
        /// What did not match.
        reason: String,
    },

    /// Name does not denote one of the canonical pixel types.
    #[error("unknown pixel type: {0:?}")]
    UnknownPixelType(String),
}

impl Error {
    /// Creates an [`Error::InvalidRegion`] error.
    pub fn invalid_region(region: Rect, width: u32, height: u32) -> Self {
        Self::InvalidRegion {
            region,
            size: (width, height),
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    pub fn dimension_mismatch(expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::DimensionMismatch { expected, actual }
    }
}
