//! # impex-core
//!
//! In-memory types for image import and export.
//!
//! This crate provides the foundation the `impex-io` engine is generic over:
//!
//! - [`Sample`], [`Pixel`] - numeric sample and pixel shape traits
//! - [`PixelType`] - the five canonical codec-side representations
//! - [`Domain`], [`Shape`] - classification axes used to select a representation
//! - [`Image`], [`ImageView`], [`ImageViewMut`] - 2-D pixel grids and region views
//! - [`Rect`] - region addressing
//! - [`stats`] - min/max inspection used by the export rescale
//!
//! ## Representation selection
//!
//! A pixel type is classified purely from its static type: shape from
//! [`Pixel::SHAPE`], domain from [`Sample::DOMAIN`], storage width from
//! `size_of::<Sample>()`:
//!
//! ```
//! use impex_core::prelude::*;
//!
//! assert_eq!(PixelType::of::<<[f32; 3] as Pixel>::Sample>(), Some(PixelType::Float));
//! assert_eq!(<[f32; 3] as Pixel>::SHAPE, Shape::Vector);
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! impex-core (this crate)
//!    ^
//!    |
//!    +-- impex-io (sessions, registry, band transfer, import/export, codecs)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod format;
pub mod image;
pub mod pixel;
pub mod rect;
pub mod stats;

// Re-exports for convenience
pub use error::*;
pub use format::*;
pub use image::{transform_image, Image, ImageView, ImageViewMut, SubImage, SubImageMut};
pub use pixel::{Pixel, Sample};
pub use rect::*;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use impex_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::format::{Domain, PixelType, Shape};
    pub use crate::image::{Image, ImageView, ImageViewMut, SubImage, SubImageMut};
    pub use crate::pixel::{Pixel, Sample};
    pub use crate::rect::Rect;
}
