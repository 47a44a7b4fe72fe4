//! Static classification of pixel types.
//!
//! The engine needs to know, from the pixel type alone, whether pixels are
//! read band-by-band into a scalar or component-by-component into a vector,
//! and which canonical [`PixelType`] matches the sample storage. Nothing here
//! inspects pixel values.

use crate::{IoError, IoResult};
use impex_core::{Domain, Pixel, PixelType, Sample, Shape};
use std::fmt;

/// Shape, domain and storage width of a pixel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelClass {
    /// Scalar or vector.
    pub shape: Shape,
    /// Integral or floating-point samples.
    pub domain: Domain,
    /// Bytes per sample.
    pub sample_bytes: usize,
    /// Components per pixel.
    pub components: usize,
}

impl PixelClass {
    /// The canonical representation of the sample storage.
    ///
    /// # Errors
    ///
    /// [`IoError::UnsupportedPixelWidth`] when no canonical type has this
    /// domain and width (e.g. 8-byte integers, 2-byte floats).
    pub fn pixel_type(&self) -> IoResult<PixelType> {
        PixelType::from_storage(self.domain, self.sample_bytes).ok_or(IoError::UnsupportedPixelWidth {
            domain: self.domain,
            bytes: self.sample_bytes,
        })
    }
}

impl fmt::Display for PixelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self.shape {
            Shape::Scalar => "scalar",
            Shape::Vector => "vector",
        };
        write!(
            f,
            "{shape} x{} of {}-byte {}",
            self.components, self.sample_bytes, self.domain
        )
    }
}

/// Classifies `P` from its static type.
///
/// ```
/// use impex_io::select::classify;
/// use impex_core::{Domain, PixelType, Shape};
///
/// let class = classify::<[i16; 3]>();
/// assert_eq!(class.shape, Shape::Vector);
/// assert_eq!(class.domain, Domain::Integral);
/// assert_eq!(class.pixel_type().unwrap(), PixelType::Int16);
///
/// assert!(classify::<u64>().pixel_type().is_err());
/// ```
pub fn classify<P: Pixel>() -> PixelClass {
    PixelClass {
        shape: P::SHAPE,
        domain: <P::Sample as Sample>::DOMAIN,
        sample_bytes: std::mem::size_of::<P::Sample>(),
        components: P::COMPONENTS,
    }
}

/// Runs `$body` with `$s` bound to the storage type of a [`PixelType`].
///
/// ```ignore
/// dispatch_pixel_type!(tag, S => read_band::<S, _, _>(&mut *dec, dest))?;
/// ```
macro_rules! dispatch_pixel_type {
    ($tag:expr, $s:ident => $body:expr) => {
        match $tag {
            ::impex_core::PixelType::Uint8 => {
                type $s = u8;
                $body
            }
            ::impex_core::PixelType::Int16 => {
                type $s = i16;
                $body
            }
            ::impex_core::PixelType::Int32 => {
                type $s = i32;
                $body
            }
            ::impex_core::PixelType::Float => {
                type $s = f32;
                $body
            }
            ::impex_core::PixelType::Double => {
                type $s = f64;
                $body
            }
        }
    };
}

pub(crate) use dispatch_pixel_type;
