//! Typed import and export.
//!
//! The pixel type of the in-memory image decides, at compile time, how
//! samples are moved (scalar pixels use one band, vector pixels one band per
//! component) and which representation is requested from the codec. The
//! file decides the representation on import.
//!
//! # Export fallback
//!
//! When the target format cannot store the source's representation and the
//! source is floating-point, the image is linearly rescaled to `[0, 255]`
//! (see [`RescaleParams`]) and written as `UINT8`. Integral sources never
//! fall back.

use crate::bands::{read_band, read_bands, write_band, write_bands};
use crate::codec::{Decoder, Encoder, RawSample};
use crate::info::{ImageExportInfo, ImageImportInfo};
use crate::registry::CodecRegistry;
use crate::rescale::RescaleParams;
use crate::select::{classify, dispatch_pixel_type};
use crate::{IoError, IoResult};
use impex_core::image::map_components;
use impex_core::{transform_image, Domain, Image, ImageView, ImageViewMut, Pixel, PixelType, Sample, Shape};
use tracing::{debug, warn};

/// Reads the file described by `info` into `dest`, using the global registry.
///
/// `dest` may be larger than the file; only the top-left `width x height`
/// pixels are written. A scalar destination receives band 0 of a
/// multi-band file.
///
/// # Example
///
/// ```no_run
/// use impex_io::{import_image, ImageImportInfo};
/// use impex_core::Image;
///
/// let info = ImageImportInfo::new("photo.ppm")?;
/// let mut img: Image<[u8; 3]> = Image::new(info.width(), info.height());
/// import_image(&info, &mut img)?;
/// # Ok::<(), impex_io::IoError>(())
/// ```
///
/// # Errors
///
/// - [`IoError::Unreadable`] / [`IoError::UnknownFormat`] when opening fails
/// - [`IoError::InvalidPixelType`] when the file has no canonical pixel type
/// - [`IoError::DimensionMismatch`] / [`IoError::BandMismatch`] when `dest`
///   cannot hold the file
pub fn import_image<V>(info: &ImageImportInfo, dest: &mut V) -> IoResult<()>
where
    V: ImageViewMut + ?Sized,
{
    import_image_with(CodecRegistry::global(), info, dest)
}

/// [`import_image`] with an explicit registry.
pub fn import_image_with<V>(registry: &CodecRegistry, info: &ImageImportInfo, dest: &mut V) -> IoResult<()>
where
    V: ImageViewMut + ?Sized,
{
    let mut session = registry.open_decoder(info.path(), Some(info.file_type()))?;
    let pixel_type = session.pixel_type().ok_or_else(|| IoError::InvalidPixelType {
        format: session.format_name().to_string(),
        detail: format!("{} band(s) with no canonical sample type", session.num_bands()),
    })?;
    let class = classify::<V::Pixel>();
    debug!(
        path = %info.path().display(),
        format = session.format_name(),
        %pixel_type,
        pixel = %class,
        "importing image"
    );

    dispatch_pixel_type!(pixel_type, S => read_pixels::<S, V>(&mut *session, dest, class.shape))?;
    session.close()
}

fn read_pixels<S, V>(dec: &mut dyn Decoder, dest: &mut V, shape: Shape) -> IoResult<()>
where
    S: RawSample,
    V: ImageViewMut + ?Sized,
{
    match shape {
        Shape::Scalar => read_band::<S, _, _>(dec, dest),
        Shape::Vector => read_bands::<S, _, _>(dec, dest),
    }
}

/// Writes `src` to the file described by `info`, using the global registry.
///
/// # Example
///
/// ```no_run
/// use impex_io::{export_image, ImageExportInfo};
/// use impex_core::Image;
///
/// // Float data into an 8-bit format: rescaled to 0..=255.
/// let img: Image<f32> = Image::from_fn(64, 64, |x, y| (x * y) as f32 / 4096.0);
/// export_image(&img, &ImageExportInfo::new("ramp.pgm"))?;
/// # Ok::<(), impex_io::IoError>(())
/// ```
///
/// # Errors
///
/// - [`IoError::UnsupportedPixelWidth`] if the sample type has no canonical
///   representation; no file is created
/// - [`IoError::UnknownFormat`] if no codec matches
/// - [`IoError::UnsupportedIntegralRepresentation`] if the format can store
///   neither the source representation nor, for floating-point sources,
///   `UINT8`; no file is created
/// - [`IoError::Unwritable`] if the file cannot be created
pub fn export_image<V>(src: &V, info: &ImageExportInfo) -> IoResult<()>
where
    V: ImageView + ?Sized,
{
    export_image_with(CodecRegistry::global(), src, info)
}

/// [`export_image`] with an explicit registry.
pub fn export_image_with<V>(registry: &CodecRegistry, src: &V, info: &ImageExportInfo) -> IoResult<()>
where
    V: ImageView + ?Sized,
{
    let class = classify::<V::Pixel>();
    let pixel_type = class.pixel_type()?;
    let format = registry.resolve_for_write(info.path(), info.file_type())?.name;

    if registry.is_pixel_type_supported(format, pixel_type) {
        debug!(path = %info.path().display(), format, %pixel_type, pixel = %class, "exporting image");
        return write_file(registry, info, format, pixel_type, |enc| {
            dispatch_pixel_type!(pixel_type, S => write_pixels::<S, V>(enc, src, class.shape))
        });
    }

    if class.domain == Domain::Integral || !registry.is_pixel_type_supported(format, PixelType::Uint8) {
        return Err(IoError::UnsupportedIntegralRepresentation {
            format: format.to_string(),
            pixel_type,
        });
    }

    let params = RescaleParams::from_image(src);
    warn!(
        path = %info.path().display(),
        format,
        %pixel_type,
        scale = params.scale,
        offset = params.offset,
        "format cannot store pixel type, rescaling to UINT8"
    );
    let mut work: Image<<V::Pixel as Pixel>::Fallback> = Image::new(src.width(), src.height());
    transform_image(src, &mut work, |px| map_components(px, |v: <V::Pixel as Pixel>::Sample| params.apply(v.to_f64())))?;
    write_file(registry, info, format, PixelType::Uint8, |enc| {
        write_pixels::<u8, _>(enc, &work, class.shape)
    })
}

/// Opens the encoder, applies the settings, streams through `body`, closes.
fn write_file<F>(
    registry: &CodecRegistry,
    info: &ImageExportInfo,
    format: &str,
    pixel_type: PixelType,
    body: F,
) -> IoResult<()>
where
    F: FnOnce(&mut dyn Encoder) -> IoResult<()>,
{
    let mut session = registry.open_encoder(info.path(), Some(format))?;
    if let Some(compression) = info.compression() {
        session.set_compression(compression)?;
    }
    session.set_pixel_type(pixel_type)?;
    body(&mut *session)?;
    session.close()
}

fn write_pixels<S, V>(enc: &mut dyn Encoder, src: &V, shape: Shape) -> IoResult<()>
where
    S: RawSample,
    V: ImageView + ?Sized,
{
    match shape {
        Shape::Scalar => write_band::<S, _, _>(enc, src),
        Shape::Vector => write_bands::<S, _, _>(enc, src),
    }
}
