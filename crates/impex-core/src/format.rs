//! Canonical pixel representations.
//!
//! Every codec speaks one of a small closed set of sample types. This module
//! defines that set and the two classification axes used to map a static
//! pixel type onto it.
//!
//! # Types
//!
//! - [`PixelType`] - the five canonical storage tags (`UINT8` ... `DOUBLE`)
//! - [`Domain`] - integral vs floating-point samples
//! - [`Shape`] - scalar pixels vs fixed-size component tuples
//!
//! # Usage
//!
//! ```rust
//! use impex_core::format::{Domain, PixelType};
//!
//! assert_eq!(PixelType::from_storage(Domain::Integral, 2), Some(PixelType::Int16));
//! assert_eq!(PixelType::from_storage(Domain::Floating, 2), None);
//! assert_eq!("FLOAT".parse::<PixelType>().unwrap(), PixelType::Float);
//! ```

use crate::error::Error;
use crate::pixel::Sample;
use std::fmt;
use std::str::FromStr;

/// Numeric domain of a sample type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Integer samples (signed or unsigned).
    Integral,
    /// IEEE 754 floating-point samples.
    Floating,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integral => write!(f, "integral"),
            Self::Floating => write!(f, "floating-point"),
        }
    }
}

/// Shape of a pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A single sample per pixel (grayscale, single band).
    Scalar,
    /// A fixed-length tuple of samples per pixel (RGB, multi-band).
    Vector,
}

/// Canonical pixel representation tag.
///
/// A decoder reports exactly one of these for all bands of a file; an
/// encoder is asked to store one of these.
///
/// | Tag | Storage | Bytes |
/// |-----|---------|-------|
/// | `UINT8` | `u8` | 1 |
/// | `INT16` | `i16` | 2 |
/// | `INT32` | `i32` | 4 |
/// | `FLOAT` | `f32` | 4 |
/// | `DOUBLE` | `f64` | 8 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    /// 8-bit unsigned integer.
    Uint8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 32-bit IEEE float.
    Float,
    /// 64-bit IEEE float.
    Double,
}

impl PixelType {
    /// All canonical pixel types, narrowest first.
    pub const ALL: [PixelType; 5] = [
        Self::Uint8,
        Self::Int16,
        Self::Int32,
        Self::Float,
        Self::Double,
    ];

    /// Canonical upper-case name ("UINT8", "INT16", ...).
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Uint8 => "UINT8",
            Self::Int16 => "INT16",
            Self::Int32 => "INT32",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
        }
    }

    /// Bytes per stored sample.
    #[inline]
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Uint8 => 1,
            Self::Int16 => 2,
            Self::Int32 | Self::Float => 4,
            Self::Double => 8,
        }
    }

    /// Numeric domain of the stored samples.
    #[inline]
    pub const fn domain(&self) -> Domain {
        match self {
            Self::Uint8 | Self::Int16 | Self::Int32 => Domain::Integral,
            Self::Float | Self::Double => Domain::Floating,
        }
    }

    /// Whether this is a floating-point representation.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self.domain(), Domain::Floating)
    }

    /// Selects the tag for a sample of the given domain and storage width.
    ///
    /// Integral widths 1/2/4 map to `UINT8`/`INT16`/`INT32`, floating widths
    /// 4/8 map to `FLOAT`/`DOUBLE`. Any other width has no canonical
    /// representation and yields `None`.
    pub const fn from_storage(domain: Domain, bytes: usize) -> Option<Self> {
        match (domain, bytes) {
            (Domain::Integral, 1) => Some(Self::Uint8),
            (Domain::Integral, 2) => Some(Self::Int16),
            (Domain::Integral, 4) => Some(Self::Int32),
            (Domain::Floating, 4) => Some(Self::Float),
            (Domain::Floating, 8) => Some(Self::Double),
            _ => None,
        }
    }

    /// Selects the tag for a static sample type.
    ///
    /// ```rust
    /// use impex_core::PixelType;
    ///
    /// assert_eq!(PixelType::of::<u8>(), Some(PixelType::Uint8));
    /// assert_eq!(PixelType::of::<u16>(), Some(PixelType::Int16));
    /// assert_eq!(PixelType::of::<f64>(), Some(PixelType::Double));
    /// assert_eq!(PixelType::of::<half::f16>(), None);
    /// ```
    #[inline]
    pub fn of<S: Sample>() -> Option<Self> {
        Self::from_storage(S::DOMAIN, std::mem::size_of::<S>())
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownPixelType(s.to_string()))
    }
}
