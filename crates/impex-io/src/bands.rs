//! Band transfer primitives.
//!
//! These move samples between an image and an open codec session, one
//! scanline at a time, for a fixed raw storage type `S`:
//!
//! - [`read_band`] / [`write_band`] - single band, whole scalar pixels
//! - [`read_bands`] / [`write_bands`] - every band, one component per band
//!
//! Within a scanline, sample `x` of a band sits at `x * offset` from the band
//! start, where `offset` comes from the session. Values are converted with
//! [`Sample::cast`](impex_core::Sample::cast), i.e. `as` semantics.
//!
//! The caller sets the session's pixel type to `S::PIXEL_TYPE` before a
//! write; the primitives configure geometry and finalize the settings.

use crate::codec::{Decoder, Encoder, RawSample};
use crate::{IoError, IoResult};
use impex_core::{ImageView, ImageViewMut, Pixel, Sample};
use tracing::trace;

/// Fails unless a band view of `len` samples reaches sample `width - 1`.
fn check_span(len: usize, width: u32, offset: usize, band: usize) -> IoResult<()> {
    if width == 0 {
        return Ok(());
    }
    let needed = (width as usize - 1) * offset + 1;
    if len < needed {
        return Err(IoError::state(format!(
            "band {band} scanline holds {len} samples, {needed} needed"
        )));
    }
    Ok(())
}

fn check_destination<V>(dest: &V, width: u32, height: u32) -> IoResult<()>
where
    V: ImageView + ?Sized,
{
    if dest.width() < width || dest.height() < height {
        return Err(IoError::dimensions((width, height), dest.dimensions()));
    }
    Ok(())
}

/// Reads band 0 of every scanline into scalar pixels of `dest`.
///
/// `dest` must be at least as large as the file; extra pixels are left
/// untouched.
///
/// # Errors
///
/// - [`IoError::DimensionMismatch`] if `dest` is smaller than the file
/// - any session error
pub fn read_band<S, D, V>(dec: &mut D, dest: &mut V) -> IoResult<()>
where
    S: RawSample,
    D: Decoder + ?Sized,
    V: ImageViewMut + ?Sized,
{
    let (width, height) = (dec.width(), dec.height());
    check_destination(dest, width, height)?;
    let offset = dec.offset();
    trace!(width, height, offset, pixel_type = %S::PIXEL_TYPE, "read_band");

    for y in 0..height {
        dec.next_scanline()?;
        let raw = dec.current_scanline_of_band(0)?.as_slice::<S>()?;
        check_span(raw.len(), width, offset, 0)?;
        let row = &mut dest.row_mut(y)[..width as usize];
        for (x, px) in row.iter_mut().enumerate() {
            px.set_component(0, raw[x * offset].cast());
        }
    }
    Ok(())
}

/// Reads every band of every scanline; band `b` goes to component `b`.
///
/// # Errors
///
/// - [`IoError::DimensionMismatch`] if `dest` is smaller than the file
/// - [`IoError::BandMismatch`] if the pixel has fewer components than the
///   file has bands
/// - any session error
pub fn read_bands<S, D, V>(dec: &mut D, dest: &mut V) -> IoResult<()>
where
    S: RawSample,
    D: Decoder + ?Sized,
    V: ImageViewMut + ?Sized,
{
    let (width, height) = (dec.width(), dec.height());
    check_destination(dest, width, height)?;
    let bands = dec.num_bands();
    let components = <V::Pixel as Pixel>::COMPONENTS;
    if components < bands {
        return Err(IoError::BandMismatch { bands, components });
    }
    let offset = dec.offset();
    trace!(width, height, bands, offset, pixel_type = %S::PIXEL_TYPE, "read_bands");

    for y in 0..height {
        dec.next_scanline()?;
        for b in 0..bands {
            let raw = dec.current_scanline_of_band(b)?.as_slice::<S>()?;
            check_span(raw.len(), width, offset, b)?;
            let row = &mut dest.row_mut(y)[..width as usize];
            for (x, px) in row.iter_mut().enumerate() {
                px.set_component(b, raw[x * offset].cast());
            }
        }
    }
    Ok(())
}

/// Writes scalar pixels of `src` as a single band.
///
/// Sets width, height and band count, then finalizes the session settings.
pub fn write_band<S, E, V>(enc: &mut E, src: &V) -> IoResult<()>
where
    S: RawSample,
    E: Encoder + ?Sized,
    V: ImageView + ?Sized,
{
    let (width, height) = src.dimensions();
    enc.set_width(width)?;
    enc.set_height(height)?;
    enc.set_num_bands(1)?;
    enc.finalize_settings()?;
    let offset = enc.offset();
    trace!(width, height, offset, pixel_type = %S::PIXEL_TYPE, "write_band");

    for y in 0..height {
        let raw = enc.current_scanline_of_band(0)?.into_slice::<S>()?;
        check_span(raw.len(), width, offset, 0)?;
        for (x, px) in src.row(y).iter().enumerate() {
            raw[x * offset] = px.component(0).cast();
        }
        enc.next_scanline()?;
    }
    Ok(())
}

/// Writes every component of `src` as its own band.
///
/// The band count is taken from the first pixel.
pub fn write_bands<S, E, V>(enc: &mut E, src: &V) -> IoResult<()>
where
    S: RawSample,
    E: Encoder + ?Sized,
    V: ImageView + ?Sized,
{
    let (width, height) = src.dimensions();
    let bands = if width > 0 && height > 0 {
        src.pixel(0, 0).num_components()
    } else {
        <V::Pixel as Pixel>::COMPONENTS
    };
    enc.set_width(width)?;
    enc.set_height(height)?;
    enc.set_num_bands(bands)?;
    enc.finalize_settings()?;
    let offset = enc.offset();
    trace!(width, height, bands, offset, pixel_type = %S::PIXEL_TYPE, "write_bands");

    for y in 0..height {
        let row = src.row(y);
        for b in 0..bands {
            let raw = enc.current_scanline_of_band(b)?.into_slice::<S>()?;
            check_span(raw.len(), width, offset, b)?;
            for (x, px) in row.iter().enumerate() {
                raw[x * offset] = px.component(b).cast();
            }
        }
        enc.next_scanline()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ScanlineBuffer;
    use crate::raster::{Layout, Raster, RasterDecoder};
    use impex_core::{Image, PixelType, Rect};

    fn rgb_raster() -> RasterDecoder {
        // 2x2, 3 bands, planar
        let data = ScanlineBuffer::I16(vec![
            1, 2, 3, 4, //
            10, 20, 30, 40, //
            -1, -2, -3, -4,
        ]);
        RasterDecoder::new(
            "TEST",
            Raster {
                width: 2,
                height: 2,
                bands: 3,
                layout: Layout::Planar,
                data,
            },
        )
    }

    #[test]
    fn test_read_bands_planar() {
        let mut dec = rgb_raster();
        let mut img: Image<[f32; 3]> = Image::new(2, 2);
        read_bands::<i16, _, _>(&mut dec, &mut img).unwrap();
        assert_eq!(img.pixel(0, 0), [1.0, 10.0, -1.0]);
        assert_eq!(img.pixel(1, 1), [4.0, 40.0, -4.0]);
    }

    #[test]
    fn test_read_band_scalar_takes_band_zero() {
        let mut dec = rgb_raster();
        let mut img: Image<u8> = Image::new(2, 2);
        read_band::<i16, _, _>(&mut dec, &mut img).unwrap();
        assert_eq!(img.data(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_read_into_larger_region() {
        let mut dec = rgb_raster();
        let mut img: Image<[i32; 3]> = Image::filled(4, 4, [9; 3]);
        {
            let mut view = img.view_mut(Rect::new(1, 1, 3, 3)).unwrap();
            read_bands::<i16, _, _>(&mut dec, &mut view).unwrap();
        }
        assert_eq!(img.pixel(0, 0), [9; 3]);
        assert_eq!(img.pixel(1, 1), [1, 10, -1]);
        assert_eq!(img.pixel(3, 3), [9; 3]);
    }

    #[test]
    fn test_read_errors() {
        let mut dec = rgb_raster();
        let mut small: Image<[i16; 3]> = Image::new(1, 2);
        assert!(matches!(
            read_bands::<i16, _, _>(&mut dec, &mut small),
            Err(IoError::DimensionMismatch { .. })
        ));

        let mut two: Image<[i16; 2]> = Image::new(2, 2);
        assert!(matches!(
            read_bands::<i16, _, _>(&mut dec, &mut two),
            Err(IoError::BandMismatch { bands: 3, components: 2 })
        ));

        let mut img: Image<[i16; 3]> = Image::new(2, 2);
        assert!(matches!(
            read_bands::<u8, _, _>(&mut dec, &mut img),
            Err(IoError::SessionState(_))
        ));
        assert_eq!(PixelType::of::<i16>(), Some(PixelType::Int16));
    }
}
