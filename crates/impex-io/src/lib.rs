//! # impex-io
//!
//! Typed image import and export over pluggable codecs.
//!
//! The engine moves pixels between an in-memory image
//! ([`impex_core::ImageView`]) and a codec session. The static pixel type
//! picks everything at compile time:
//!
//! - **shape**: scalar pixels travel as one band, vector pixels as one band
//!   per component ([`bands`])
//! - **representation**: sample domain and width select one of the five
//!   canonical [`PixelType`](impex_core::PixelType)s ([`select`])
//!
//! On export, a floating-point image headed for a format without float
//! storage is linearly rescaled to 8 bits ([`rescale`]).
//!
//! # Quick Start
//!
//! ```no_run
//! use impex_io::{export_image, import_image, ImageExportInfo, ImageImportInfo};
//! use impex_core::Image;
//!
//! let info = ImageImportInfo::new("input.xv")?;
//! let mut img: Image<[f32; 3]> = Image::new(info.width(), info.height());
//! import_image(&info, &mut img)?;
//!
//! // Stored as FLOAT where possible, rescaled to UINT8 otherwise.
//! export_image(&img, &ImageExportInfo::new("output.ppm"))?;
//! # Ok::<(), impex_io::IoError>(())
//! ```
//!
//! # Architecture
//!
//! - [`codec`] - [`Decoder`] / [`Encoder`] session traits and scanline views
//! - [`session`] - scoped sessions, closed on every exit path
//! - [`registry`] - codec lookup by name, extension or magic bytes
//! - [`raster`] - in-memory raster sessions the built-in codecs share
//!
//! # Supported Formats
//!
//! | Format | Read | Write | Pixel Types | Bands |
//! |--------|------|-------|-------------|-------|
//! | PNM | Yes | Yes | UINT8 | 1, 3 |
//! | PFM | Yes | Yes | FLOAT | 1, 3 |
//! | VIFF | Yes | Yes | all five | any |
//! | BMP | Yes | Yes | UINT8 | 1, 3 |
//!
//! # Feature Flags
//!
//! - `pnm` - PGM/PPM support (default)
//! - `pfm` - Portable Float Map support (default)
//! - `viff` - Khoros VIFF support (default)
//! - `bmp` - Windows bitmap support (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod impex;

pub mod bands;
pub mod codec;
pub mod detect;
pub mod info;
pub mod raster;
pub mod registry;
pub mod rescale;
pub mod select;
pub mod session;

#[cfg(feature = "pnm")]
pub mod pnm;

#[cfg(feature = "pfm")]
pub mod pfm;

#[cfg(feature = "viff")]
pub mod viff;

#[cfg(feature = "bmp")]
pub mod bmp;

pub use codec::{Decoder, Encoder};
pub use detect::Format;
pub use error::{IoError, IoResult};
pub use impex::{export_image, export_image_with, import_image, import_image_with};
pub use info::{ImageExportInfo, ImageImportInfo};
pub use registry::CodecRegistry;
pub use rescale::RescaleParams;
pub use session::{DecoderSession, EncoderSession};
