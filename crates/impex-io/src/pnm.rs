//! PNM (Portable Anymap) format support.
//!
//! Grayscale (PGM) and color (PPM) images in both encodings:
//!
//! | Magic | Bands | Encoding |
//! |-------|-------|----------|
//! | `P2` | 1 | ASCII |
//! | `P3` | 3 | ASCII |
//! | `P5` | 1 | binary |
//! | `P6` | 3 | binary |
//!
//! Samples are interleaved. Only `UINT8` is stored; files with a maxval
//! above 255 decode (16-bit big-endian samples) but report no canonical
//! pixel type, so importing them fails with
//! [`IoError::InvalidPixelType`](crate::IoError::InvalidPixelType).
//!
//! Writing defaults to binary. The compression hint `"ASCII"` selects the
//! plain encoding, `"RAW"` the binary one.

use crate::codec::{Decoder, Encoder, ScanlineBuffer};
use crate::detect::Format;
use crate::raster::{checked_size, open_reader, HeaderCursor, Layout, Raster, RasterDecoder, RasterEncoder, RasterSink, RasterSettings};
use crate::{IoError, IoResult};
use impex_core::PixelType;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

const NAME: &str = "PNM";

/// Pixel types the PNM encoder stores.
pub const PIXEL_TYPES: &[PixelType] = &[PixelType::Uint8];

/// Checks for a supported PNM magic.
pub fn can_read(header: &[u8]) -> bool {
    Format::from_bytes(header) == Format::Pnm
}

/// Opens a PNM read session.
pub fn decoder(path: &Path) -> IoResult<Box<dyn Decoder>> {
    let mut bytes = Vec::new();
    open_reader(path)?.read_to_end(&mut bytes)?;
    let (raster, declared) = decode(&bytes)?;
    Ok(Box::new(RasterDecoder::with_declared(NAME, raster, declared)))
}

/// Creates a PNM file and opens a write session.
pub fn encoder(path: &Path) -> IoResult<Box<dyn Encoder>> {
    Ok(Box::new(RasterEncoder::create(path, PnmSink::default())?))
}

/// Parses a complete PNM file.
pub(crate) fn decode(bytes: &[u8]) -> IoResult<(Raster, Option<PixelType>)> {
    let mut cur = HeaderCursor::new(bytes);
    let magic = cur
        .token()
        .ok_or_else(|| IoError::InvalidFile("empty PNM file".into()))?;
    let (bands, ascii) = match magic {
        "P2" => (1, true),
        "P3" => (3, true),
        "P5" => (1, false),
        "P6" => (3, false),
        other => {
            return Err(IoError::DecodeError(format!("unsupported PNM magic {other:?}")));
        }
    };
    let width: u32 = cur.parse("width")?;
    let height: u32 = cur.parse("height")?;
    let maxval: u32 = cur.parse("maxval")?;
    if maxval == 0 || maxval > 65535 {
        return Err(IoError::InvalidFile(format!("PNM maxval {maxval} out of range")));
    }

    let count = checked_size(NAME, &[width as usize, height as usize, bands])?;
    let wide = maxval > 255;
    let pixel_type = if wide { PixelType::Int32 } else { PixelType::Uint8 };
    let declared = (!wide).then_some(PixelType::Uint8);

    // Size the data before allocating for it.
    if ascii {
        // every sample takes a digit, all but the last a separator too
        let room = (bytes.len() - cur.position()).div_ceil(2);
        if count > room {
            return Err(IoError::InvalidFile(format!(
                "PNM data truncated: {count} samples declared, room for at most {room}"
            )));
        }
        let mut raster = Raster::new(width, height, bands, Layout::Interleaved, pixel_type);
        for i in 0..count {
            let v: u32 = cur.parse("sample")?;
            store(&mut raster.data, i, v);
        }
        return Ok((raster, declared));
    }

    let payload = cur.binary_payload()?;
    let sample_bytes = if wide { 2 } else { 1 };
    let needed = checked_size(NAME, &[count, sample_bytes])?;
    if payload.len() < needed {
        return Err(IoError::InvalidFile(format!(
            "PNM data truncated: {} of {needed} bytes",
            payload.len()
        )));
    }
    let mut raster = Raster::new(width, height, bands, Layout::Interleaved, pixel_type);
    for i in 0..count {
        let v = if wide {
            u16::from_be_bytes([payload[2 * i], payload[2 * i + 1]]) as u32
        } else {
            payload[i] as u32
        };
        store(&mut raster.data, i, v);
    }
    Ok((raster, declared))
}

fn store(data: &mut ScanlineBuffer, i: usize, v: u32) {
    match data {
        ScanlineBuffer::U8(d) => d[i] = v.min(255) as u8,
        ScanlineBuffer::I32(d) => d[i] = v as i32,
        _ => {}
    }
}

/// PNM writer half of a [`RasterEncoder`].
#[derive(Debug, Default)]
pub struct PnmSink {
    ascii: bool,
}

impl RasterSink for PnmSink {
    fn name(&self) -> &'static str {
        NAME
    }

    fn layout(&self) -> Layout {
        Layout::Interleaved
    }

    fn check(&self, settings: &RasterSettings) -> IoResult<()> {
        if !PIXEL_TYPES.contains(&settings.pixel_type) {
            return Err(IoError::UnsupportedIntegralRepresentation {
                format: NAME.into(),
                pixel_type: settings.pixel_type,
            });
        }
        if settings.bands != 1 && settings.bands != 3 {
            return Err(IoError::EncodeError(format!(
                "PNM stores 1 or 3 bands, got {}",
                settings.bands
            )));
        }
        Ok(())
    }

    fn set_compression(&mut self, compression: &str) -> IoResult<()> {
        match compression.to_ascii_uppercase().as_str() {
            "ASCII" => self.ascii = true,
            "RAW" | "" => self.ascii = false,
            other => debug!(compression = other, "PNM ignores compression"),
        }
        Ok(())
    }

    fn write(&self, out: &mut dyn Write, raster: &Raster) -> IoResult<()> {
        let ScanlineBuffer::U8(data) = &raster.data else {
            return Err(IoError::EncodeError("PNM raster must hold UINT8".into()));
        };
        let magic = match (raster.bands, self.ascii) {
            (1, true) => "P2",
            (_, true) => "P3",
            (1, false) => "P5",
            (_, false) => "P6",
        };
        write!(out, "{magic}\n{} {}\n255\n", raster.width, raster.height)?;

        if !self.ascii {
            out.write_all(data)?;
            return Ok(());
        }
        let row_len = raster.width as usize * raster.bands;
        for row in data.chunks(row_len.max(1)) {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(out, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
