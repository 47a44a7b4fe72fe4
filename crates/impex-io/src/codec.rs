//! Codec session traits.
//!
//! A codec session is an open, single-use handle bound to one file and one
//! direction. Backends implement [`Decoder`] and [`Encoder`]; the engine
//! only ever talks to them through these traits.
//!
//! # Scanline model
//!
//! Samples are exchanged one scanline at a time, top to bottom. Within the
//! current scanline, [`current_scanline_of_band`](Decoder::current_scanline_of_band)
//! returns a view positioned at the first sample of band `b`; consecutive
//! samples of that band are [`offset`](Decoder::offset) elements apart
//! (band count for interleaved layouts, 1 for planar ones).
//!
//! ```text
//! interleaved, 3 bands, offset = 3       planar, offset = 1
//! [R G B R G B R G B]                    [R R R] [G G G] [B B B]
//!  ^ band 0 start                         ^ band 0  ^ band 1  ^ band 2
//! ```
//!
//! # Lifecycle
//!
//! Decoder: open -> (`next_scanline`, read bands) x height -> close.
//!
//! Encoder: open -> setters -> `finalize_settings` -> (write bands,
//! `next_scanline`) x height -> close.
//!
//! Streaming calls after `close` fail with [`IoError::SessionClosed`].

use crate::{IoError, IoResult};
use impex_core::{PixelType, Sample};

// ============================================================================
// Scanline storage
// ============================================================================

/// Typed raw sample storage backing a session's scanlines.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanlineBuffer {
    /// `UINT8` samples.
    U8(Vec<u8>),
    /// `INT16` samples.
    I16(Vec<i16>),
    /// `INT32` samples.
    I32(Vec<i32>),
    /// `FLOAT` samples.
    F32(Vec<f32>),
    /// `DOUBLE` samples.
    F64(Vec<f64>),
}

impl ScanlineBuffer {
    /// Zeroed storage for `len` samples of `pixel_type`.
    pub fn new(pixel_type: PixelType, len: usize) -> Self {
        match pixel_type {
            PixelType::Uint8 => Self::U8(vec![0; len]),
            PixelType::Int16 => Self::I16(vec![0; len]),
            PixelType::Int32 => Self::I32(vec![0; len]),
            PixelType::Float => Self::F32(vec![0.0; len]),
            PixelType::Double => Self::F64(vec![0.0; len]),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    /// Returns `true` if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Representation of the stored samples.
    pub fn pixel_type(&self) -> PixelType {
        match self {
            Self::U8(_) => PixelType::Uint8,
            Self::I16(_) => PixelType::Int16,
            Self::I32(_) => PixelType::Int32,
            Self::F32(_) => PixelType::Float,
            Self::F64(_) => PixelType::Double,
        }
    }

    /// Sample `i` widened to `f64`.
    pub fn get_f64(&self, i: usize) -> f64 {
        match self {
            Self::U8(v) => v[i].to_f64(),
            Self::I16(v) => v[i].to_f64(),
            Self::I32(v) => v[i].to_f64(),
            Self::F32(v) => v[i].to_f64(),
            Self::F64(v) => v[i],
        }
    }
}

/// Storage type of one of the five canonical pixel types.
///
/// This is the typed view of a raw band: band transfer is instantiated once
/// per implementor, and a scanline is read or written as `&[Self]`.
pub trait RawSample: Sample {
    /// Canonical tag of this storage type.
    const PIXEL_TYPE: PixelType;

    /// Typed samples, `None` if the buffer holds another type.
    fn slice(buffer: &ScanlineBuffer) -> Option<&[Self]>;

    /// Mutable typed samples, `None` if the buffer holds another type.
    fn slice_mut(buffer: &mut ScanlineBuffer) -> Option<&mut [Self]>;
}

macro_rules! impl_raw_sample {
    ($($t:ty => $variant:ident, $tag:ident);* $(;)?) => {
        $(
            impl RawSample for $t {
                const PIXEL_TYPE: PixelType = PixelType::$tag;

                #[inline]
                fn slice(buffer: &ScanlineBuffer) -> Option<&[Self]> {
                    match buffer {
                        ScanlineBuffer::$variant(v) => Some(v.as_slice()),
                        _ => None,
                    }
                }

                #[inline]
                fn slice_mut(buffer: &mut ScanlineBuffer) -> Option<&mut [Self]> {
                    match buffer {
                        ScanlineBuffer::$variant(v) => Some(v.as_mut_slice()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_raw_sample! {
    u8 => U8, Uint8;
    i16 => I16, Int16;
    i32 => I32, Int32;
    f32 => F32, Float;
    f64 => F64, Double;
}

fn type_mismatch(held: PixelType, wanted: PixelType) -> IoError {
    IoError::state(format!("scanline holds {held} samples, requested {wanted}"))
}

/// Read-only view of one band of the current scanline.
#[derive(Debug, Clone, Copy)]
pub struct BandRef<'a> {
    buffer: &'a ScanlineBuffer,
    start: usize,
}

impl<'a> BandRef<'a> {
    /// View starting at sample index `start` of `buffer`.
    pub fn new(buffer: &'a ScanlineBuffer, start: usize) -> Self {
        Self { buffer, start }
    }

    /// Samples from the band start to the end of the buffer.
    ///
    /// # Errors
    ///
    /// [`IoError::SessionState`] if `S` is not the buffer's storage type.
    pub fn as_slice<S: RawSample>(self) -> IoResult<&'a [S]> {
        let all = S::slice(self.buffer)
            .ok_or_else(|| type_mismatch(self.buffer.pixel_type(), S::PIXEL_TYPE))?;
        all.get(self.start..)
            .ok_or_else(|| IoError::state(format!("band start {} past buffer end {}", self.start, all.len())))
    }
}

/// Writable view of one band of the current scanline.
#[derive(Debug)]
pub struct BandMut<'a> {
    buffer: &'a mut ScanlineBuffer,
    start: usize,
}

impl<'a> BandMut<'a> {
    /// View starting at sample index `start` of `buffer`.
    pub fn new(buffer: &'a mut ScanlineBuffer, start: usize) -> Self {
        Self { buffer, start }
    }

    /// Samples from the band start to the end of the buffer.
    ///
    /// # Errors
    ///
    /// [`IoError::SessionState`] if `S` is not the buffer's storage type.
    pub fn into_slice<S: RawSample>(self) -> IoResult<&'a mut [S]> {
        let held = self.buffer.pixel_type();
        let all = S::slice_mut(self.buffer).ok_or_else(|| type_mismatch(held, S::PIXEL_TYPE))?;
        let len = all.len();
        all.get_mut(self.start..)
            .ok_or_else(|| IoError::state(format!("band start {} past buffer end {}", self.start, len)))
    }
}

// ============================================================================
// Session traits
// ============================================================================

/// Read session for one file.
pub trait Decoder {
    /// Codec name, as registered.
    fn format_name(&self) -> &str;

    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Number of bands.
    fn num_bands(&self) -> usize;

    /// Representation of every band, `None` if the file has none of the
    /// canonical ones.
    fn pixel_type(&self) -> Option<PixelType>;

    /// Distance in samples between consecutive samples of one band.
    fn offset(&self) -> usize;

    /// Advances to the next scanline. Must be called before reading each row,
    /// including the first.
    fn next_scanline(&mut self) -> IoResult<()>;

    /// Band `band` of the current scanline.
    fn current_scanline_of_band(&self, band: usize) -> IoResult<BandRef<'_>>;

    /// Releases the session. Terminal.
    fn close(&mut self) -> IoResult<()>;
}

/// Write session for one file.
pub trait Encoder {
    /// Codec name, as registered.
    fn format_name(&self) -> &str;

    /// Sets the width in pixels.
    fn set_width(&mut self, width: u32) -> IoResult<()>;

    /// Sets the height in pixels.
    fn set_height(&mut self, height: u32) -> IoResult<()>;

    /// Sets the number of bands.
    fn set_num_bands(&mut self, bands: usize) -> IoResult<()>;

    /// Sets the stored representation.
    fn set_pixel_type(&mut self, pixel_type: PixelType) -> IoResult<()>;

    /// Passes a codec-specific compression hint. Ignored by default.
    fn set_compression(&mut self, _compression: &str) -> IoResult<()> {
        Ok(())
    }

    /// Freezes the settings. Must be called exactly once, before any scanline.
    fn finalize_settings(&mut self) -> IoResult<()>;

    /// Distance in samples between consecutive samples of one band.
    fn offset(&self) -> usize;

    /// Band `band` of the current scanline.
    fn current_scanline_of_band(&mut self, band: usize) -> IoResult<BandMut<'_>>;

    /// Commits the current scanline and moves to the next one.
    fn next_scanline(&mut self) -> IoResult<()>;

    /// Flushes and releases the session. Terminal.
    fn close(&mut self) -> IoResult<()>;
}
