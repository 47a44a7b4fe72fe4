//! Sample and pixel traits.
//!
//! An image is a grid of pixels; a pixel is one or more samples. Both levels
//! are described by traits so that the import/export engine can pick a
//! storage representation from the static type alone.
//!
//! # Traits
//!
//! - [`Sample`] - a numeric channel value (`u8`, `i16`, `f32`, `f16`, ...)
//! - [`Pixel`] - a scalar sample or a fixed-size `[T; N]` tuple of samples
//!
//! # Conversions
//!
//! Samples convert through `f64`. [`Sample::from_f64`] follows Rust `as`
//! semantics: values saturate at the target range and NaN becomes zero.
//!
//! ```
//! use impex_core::Sample;
//!
//! assert_eq!(u8::from_f64(300.0), 255);
//! assert_eq!(i16::from_f64(-1.0e9), i16::MIN);
//! assert_eq!(u8::from_f64(f64::NAN), 0);
//! assert_eq!(200u8.cast::<f32>(), 200.0);
//! ```
//!
//! # Pixels
//!
//! ```
//! use impex_core::{Pixel, Shape};
//!
//! let mut rgb = [10u8, 20, 30];
//! assert_eq!(<[u8; 3]>::SHAPE, Shape::Vector);
//! assert_eq!(rgb.num_components(), 3);
//! rgb.set_component(1, 99);
//! assert_eq!(rgb.component(1), 99);
//!
//! assert_eq!(<f32 as Pixel>::SHAPE, Shape::Scalar);
//! ```

use crate::format::{Domain, Shape};
use half::f16;
use std::fmt;

/// A numeric sample type.
///
/// The storage width used for representation selection is
/// `size_of::<Self>()`, so implementing this for a custom type is enough to
/// let it classify. Only widths that map onto a [`PixelType`](crate::PixelType)
/// can actually be exported.
pub trait Sample: Copy + Default + PartialOrd + fmt::Debug + Send + Sync + 'static {
    /// Numeric domain of the type.
    const DOMAIN: Domain;

    /// Widens to `f64`.
    fn to_f64(self) -> f64;

    /// Narrows from `f64` with `as` semantics.
    fn from_f64(v: f64) -> Self;

    /// Converts to another sample type.
    #[inline]
    fn cast<T: Sample>(self) -> T {
        T::from_f64(self.to_f64())
    }
}

macro_rules! impl_sample {
    ($($t:ty => $domain:ident),* $(,)?) => {
        $(
            impl Sample for $t {
                const DOMAIN: Domain = Domain::$domain;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(v: f64) -> Self {
                    v as $t
                }
            }
        )*
    };
}

impl_sample! {
    u8 => Integral,
    i8 => Integral,
    u16 => Integral,
    i16 => Integral,
    u32 => Integral,
    i32 => Integral,
    u64 => Integral,
    i64 => Integral,
    f32 => Floating,
    f64 => Floating,
}

impl Sample for f16 {
    const DOMAIN: Domain = Domain::Floating;

    #[inline]
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        f16::from_f64(v)
    }
}

/// A pixel value: one sample or a fixed tuple of samples.
///
/// `Fallback` is the 8-bit pixel with the same component count. The export
/// path materializes it when a floating-point image has to be degraded to a
/// format that only stores bytes.
pub trait Pixel: Copy + Send + Sync + 'static {
    /// Type of every component.
    type Sample: Sample;

    /// Same shape, 8-bit unsigned components.
    type Fallback: Pixel<Sample = u8>;

    /// Scalar or vector.
    const SHAPE: Shape;

    /// Number of components.
    const COMPONENTS: usize;

    /// Number of components of this value.
    #[inline]
    fn num_components(&self) -> usize {
        Self::COMPONENTS
    }

    /// Component `i`. Scalars ignore the index.
    fn component(&self, i: usize) -> Self::Sample;

    /// Sets component `i`. Scalars ignore the index.
    fn set_component(&mut self, i: usize, value: Self::Sample);

    /// A pixel with every component set to `value`.
    fn splat(value: Self::Sample) -> Self;
}

macro_rules! impl_scalar_pixel {
    ($($t:ty),* $(,)?) => {
        $(
            impl Pixel for $t {
                type Sample = $t;
                type Fallback = u8;
                const SHAPE: Shape = Shape::Scalar;
                const COMPONENTS: usize = 1;

                #[inline]
                fn component(&self, _i: usize) -> $t {
                    *self
                }

                #[inline]
                fn set_component(&mut self, _i: usize, value: $t) {
                    *self = value;
                }

                #[inline]
                fn splat(value: $t) -> Self {
                    value
                }
            }
        )*
    };
}

impl_scalar_pixel!(u8, i8, u16, i16, u32, i32, u64, i64, f16, f32, f64);

impl<T: Sample, const N: usize> Pixel for [T; N] {
    type Sample = T;
    type Fallback = [u8; N];
    const SHAPE: Shape = Shape::Vector;
    const COMPONENTS: usize = N;

    #[inline]
    fn component(&self, i: usize) -> T {
        self[i]
    }

    #[inline]
    fn set_component(&mut self, i: usize, value: T) {
        self[i] = value;
    }

    #[inline]
    fn splat(value: T) -> Self {
        [value; N]
    }
}
