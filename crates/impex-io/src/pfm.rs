//! PFM (Portable Float Map) format support.
//!
//! Header is ASCII (`PF` color / `Pf` grayscale, width, height, scale),
//! followed by raw 32-bit floats. Rows are stored bottom to top. The sign of
//! the scale gives the byte order: negative means little-endian.

use crate::codec::{Decoder, Encoder, ScanlineBuffer};
use crate::detect::Format;
use crate::raster::{checked_size, open_reader, HeaderCursor, Layout, Raster, RasterDecoder, RasterEncoder, RasterSink, RasterSettings};
use crate::{IoError, IoResult};
use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use impex_core::PixelType;
use std::io::{Read, Write};
use std::path::Path;

const NAME: &str = "PFM";

/// Pixel types the PFM encoder stores.
pub const PIXEL_TYPES: &[PixelType] = &[PixelType::Float];

/// Checks for a PFM magic.
pub fn can_read(header: &[u8]) -> bool {
    Format::from_bytes(header) == Format::Pfm
}

/// Opens a PFM read session.
pub fn decoder(path: &Path) -> IoResult<Box<dyn Decoder>> {
    let mut bytes = Vec::new();
    open_reader(path)?.read_to_end(&mut bytes)?;
    Ok(Box::new(RasterDecoder::new(NAME, decode(&bytes)?)))
}

/// Creates a PFM file and opens a write session.
pub fn encoder(path: &Path) -> IoResult<Box<dyn Encoder>> {
    Ok(Box::new(RasterEncoder::create(path, PfmSink)?))
}

pub(crate) fn decode(bytes: &[u8]) -> IoResult<Raster> {
    let mut cur = HeaderCursor::new(bytes);
    let bands = match cur.token() {
        Some("PF") => 3,
        Some("Pf") => 1,
        other => {
            return Err(IoError::DecodeError(format!("bad PFM magic {other:?}")));
        }
    };
    let width: u32 = cur.parse("width")?;
    let height: u32 = cur.parse("height")?;
    let scale: f32 = cur.parse("scale")?;
    if scale == 0.0 || !scale.is_finite() {
        return Err(IoError::InvalidFile(format!("PFM scale {scale} invalid")));
    }
    let payload = cur.binary_payload()?;

    let row_len = checked_size(NAME, &[width as usize, bands])?;
    let count = checked_size(NAME, &[row_len, height as usize])?;
    let needed = checked_size(NAME, &[count, 4])?;
    if payload.len() < needed {
        return Err(IoError::InvalidFile(format!(
            "PFM data truncated: {} of {needed} bytes",
            payload.len()
        )));
    }

    let mut samples = vec![0.0f32; count];
    if scale < 0.0 {
        LittleEndian::read_f32_into(&payload[..needed], &mut samples);
    } else {
        BigEndian::read_f32_into(&payload[..needed], &mut samples);
    }

    // Flip to top-to-bottom.
    let mut data = Vec::with_capacity(count);
    for row in samples.chunks(row_len.max(1)).rev() {
        data.extend_from_slice(row);
    }

    Ok(Raster {
        width,
        height,
        bands,
        layout: Layout::Interleaved,
        data: ScanlineBuffer::F32(data),
    })
}

/// PFM writer half of a [`RasterEncoder`]. Always writes little-endian.
#[derive(Debug, Default)]
pub struct PfmSink;

impl RasterSink for PfmSink {
    fn name(&self) -> &'static str {
        NAME
    }

    fn layout(&self) -> Layout {
        Layout::Interleaved
    }

    fn check(&self, settings: &RasterSettings) -> IoResult<()> {
        if settings.pixel_type != PixelType::Float {
            return Err(IoError::UnsupportedIntegralRepresentation {
                format: NAME.into(),
                pixel_type: settings.pixel_type,
            });
        }
        if settings.bands != 1 && settings.bands != 3 {
            return Err(IoError::EncodeError(format!(
                "PFM stores 1 or 3 bands, got {}",
                settings.bands
            )));
        }
        Ok(())
    }

    fn write(&self, out: &mut dyn Write, raster: &Raster) -> IoResult<()> {
        let ScanlineBuffer::F32(data) = &raster.data else {
            return Err(IoError::EncodeError("PFM raster must hold FLOAT".into()));
        };
        let magic = if raster.bands == 1 { "Pf" } else { "PF" };
        write!(out, "{magic}\n{} {}\n-1.0\n", raster.width, raster.height)?;

        let row_len = raster.width as usize * raster.bands;
        for row in data.chunks(row_len.max(1)).rev() {
            for &v in row {
                out.write_f32::<LittleEndian>(v)?;
            }
        }
        Ok(())
    }
}
