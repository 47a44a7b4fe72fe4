//! Error types for import/export operations.
//!
//! Provides unified error handling for codec sessions, the registry and the
//! import/export engine.

use impex_core::{Domain, PixelType};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Import/export error.
#[derive(Debug, Error)]
pub enum IoError {
    /// No registered codec matches the file type, extension or content.
    #[error("unknown image format: {0}")]
    UnknownFormat(String),

    /// The source file could not be opened.
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// The destination file could not be created.
    #[error("cannot write {}: {source}", .path.display())]
    Unwritable {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// The decoder reported a pixel type with no canonical representation.
    #[error("{format}: invalid pixel type ({detail})")]
    InvalidPixelType {
        /// Codec name.
        format: String,
        /// What the file declared.
        detail: String,
    },

    /// The source sample width has no canonical representation.
    #[error("no pixel type for {bytes}-byte {domain} samples")]
    UnsupportedPixelWidth {
        /// Sample domain.
        domain: Domain,
        /// Sample width in bytes.
        bytes: usize,
    },

    /// The destination format cannot store the pixel type, and no fallback applies.
    #[error("{format} cannot store {pixel_type} samples")]
    UnsupportedIntegralRepresentation {
        /// Codec name.
        format: String,
        /// Requested representation.
        pixel_type: PixelType,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid or corrupted file.
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Image and file geometry disagree.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected size.
        expected: String,
        /// Actual size.
        actual: String,
    },

    /// The pixel has fewer components than the file has bands.
    #[error("file has {bands} bands but pixel has {components} components")]
    BandMismatch {
        /// Bands in the file.
        bands: usize,
        /// Components per pixel.
        components: usize,
    },

    /// Session call out of order.
    #[error("session state: {0}")]
    SessionState(String),

    /// Session used after close.
    #[error("session already closed")]
    SessionClosed,

    /// Image grid error.
    #[error(transparent)]
    Core(#[from] impex_core::Error),
}

impl IoError {
    /// Creates an [`IoError::SessionState`] error.
    #[inline]
    pub fn state(msg: impl Into<String>) -> Self {
        Self::SessionState(msg.into())
    }

    /// Creates an [`IoError::DimensionMismatch`] from two `(width, height)` pairs.
    pub fn dimensions(expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            expected: format!("{}x{}", expected.0, expected.1),
            actual: format!("{}x{}", actual.0, actual.1),
        }
    }
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
