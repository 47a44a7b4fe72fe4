//! Windows BMP format support.
//!
//! Uncompressed bitmaps only (`BI_RGB`):
//! - 8-bit paletted: decodes to 1 band when the palette is gray, 3 otherwise
//! - 24-bit BGR: decodes to 3 bands
//!
//! The encoder writes 1-band images as 8-bit with a 256-entry gray palette
//! and 3-band images as 24-bit BGR. Rows are stored bottom-up and padded to
//! 4 bytes.

use crate::codec::{Decoder, Encoder, ScanlineBuffer};
use crate::detect::Format;
use crate::raster::{checked_size, open_reader, Layout, Raster, RasterDecoder, RasterEncoder, RasterSink, RasterSettings};
use crate::{IoError, IoResult};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use impex_core::PixelType;
use std::io::{Read, Write};
use std::path::Path;

const NAME: &str = "BMP";

/// Pixel types the BMP encoder stores.
pub const PIXEL_TYPES: &[PixelType] = &[PixelType::Uint8];

const FILE_HEADER_SIZE: usize = 14;
const INFO_HEADER_SIZE: usize = 40;
const BI_RGB: u32 = 0;

/// Checks for the `BM` signature.
pub fn can_read(header: &[u8]) -> bool {
    Format::from_bytes(header) == Format::Bmp
}

/// Opens a BMP read session.
pub fn decoder(path: &Path) -> IoResult<Box<dyn Decoder>> {
    let mut bytes = Vec::new();
    open_reader(path)?.read_to_end(&mut bytes)?;
    Ok(Box::new(RasterDecoder::new(NAME, decode(&bytes)?)))
}

/// Creates a BMP file and opens a write session.
pub fn encoder(path: &Path) -> IoResult<Box<dyn Encoder>> {
    Ok(Box::new(RasterEncoder::create(path, BmpSink)?))
}

#[inline]
fn row_stride(width: usize, bits: usize) -> usize {
    (width * bits).div_ceil(32) * 4
}

pub(crate) fn decode(bytes: &[u8]) -> IoResult<Raster> {
    if bytes.len() < FILE_HEADER_SIZE + INFO_HEADER_SIZE || !can_read(bytes) {
        return Err(IoError::InvalidFile("not a BMP file".into()));
    }
    let data_offset = LittleEndian::read_u32(&bytes[10..14]) as usize;
    let info_size = LittleEndian::read_u32(&bytes[14..18]) as usize;
    if info_size < INFO_HEADER_SIZE {
        return Err(IoError::DecodeError(format!("BMP info header size {info_size} not supported")));
    }
    let raw_width = LittleEndian::read_i32(&bytes[18..22]);
    let raw_height = LittleEndian::read_i32(&bytes[22..26]);
    let bits = LittleEndian::read_u16(&bytes[28..30]) as usize;
    let compression = LittleEndian::read_u32(&bytes[30..34]);
    let colors_used = LittleEndian::read_u32(&bytes[46..50]) as usize;

    if compression != BI_RGB {
        return Err(IoError::DecodeError(format!("BMP compression {compression} not supported")));
    }
    if raw_width <= 0 || raw_height == 0 {
        return Err(IoError::InvalidFile(format!("BMP size {raw_width}x{raw_height}")));
    }
    let width = raw_width as u32;
    let height = raw_height.unsigned_abs();
    let top_down = raw_height < 0;

    let palette = match bits {
        8 => {
            let entries = if colors_used == 0 { 256 } else { colors_used.min(256) };
            let start = FILE_HEADER_SIZE + info_size;
            let table = bytes
                .get(start..start + entries * 4)
                .ok_or_else(|| IoError::InvalidFile("BMP palette truncated".into()))?;
            // BGRx -> RGB
            Some(table.chunks_exact(4).map(|e| [e[2], e[1], e[0]]).collect::<Vec<_>>())
        }
        24 => None,
        other => {
            return Err(IoError::DecodeError(format!("BMP bit depth {other} not supported")));
        }
    };
    let gray = palette
        .as_ref()
        .is_some_and(|p| p.iter().all(|c| c[0] == c[1] && c[1] == c[2]));
    let bands = if gray { 1 } else { 3 };

    let stride = row_stride(width as usize, bits);
    let pixels = checked_size(NAME, &[stride, height as usize])?;
    let pixels = data_offset
        .checked_add(pixels)
        .and_then(|end| bytes.get(data_offset..end))
        .ok_or_else(|| IoError::InvalidFile("BMP pixel data truncated".into()))?;

    let row_len = width as usize * bands;
    let mut out = vec![0u8; row_len * height as usize];
    for y in 0..height as usize {
        let src_row = if top_down { y } else { height as usize - 1 - y };
        let src = &pixels[src_row * stride..src_row * stride + stride];
        let dst = &mut out[y * row_len..(y + 1) * row_len];
        match &palette {
            Some(pal) => {
                for x in 0..width as usize {
                    let color = pal.get(src[x] as usize).copied().unwrap_or([0, 0, 0]);
                    if gray {
                        dst[x] = color[0];
                    } else {
                        dst[3 * x..3 * x + 3].copy_from_slice(&color);
                    }
                }
            }
            None => {
                for x in 0..width as usize {
                    dst[3 * x] = src[3 * x + 2];
                    dst[3 * x + 1] = src[3 * x + 1];
                    dst[3 * x + 2] = src[3 * x];
                }
            }
        }
    }

    Ok(Raster {
        width,
        height,
        bands,
        layout: Layout::Interleaved,
        data: ScanlineBuffer::U8(out),
    })
}

/// BMP writer half of a [`RasterEncoder`].
#[derive(Debug, Default)]
pub struct BmpSink;

impl RasterSink for BmpSink {
    fn name(&self) -> &'static str {
        NAME
    }

    fn layout(&self) -> Layout {
        Layout::Interleaved
    }

    fn check(&self, settings: &RasterSettings) -> IoResult<()> {
        if settings.pixel_type != PixelType::Uint8 {
            return Err(IoError::UnsupportedIntegralRepresentation {
                format: NAME.into(),
                pixel_type: settings.pixel_type,
            });
        }
        if settings.bands != 1 && settings.bands != 3 {
            return Err(IoError::EncodeError(format!(
                "BMP stores 1 or 3 bands, got {}",
                settings.bands
            )));
        }
        if settings.width > i32::MAX as u32 || settings.height > i32::MAX as u32 {
            return Err(IoError::EncodeError("BMP dimensions exceed i32".into()));
        }
        Ok(())
    }

    fn write(&self, out: &mut dyn Write, raster: &Raster) -> IoResult<()> {
        let ScanlineBuffer::U8(data) = &raster.data else {
            return Err(IoError::EncodeError("BMP raster must hold UINT8".into()));
        };
        let width = raster.width as usize;
        let height = raster.height as usize;
        let bits = if raster.bands == 1 { 8 } else { 24 };
        let palette_size = if bits == 8 { 256 * 4 } else { 0 };
        let stride = row_stride(width, bits);
        let data_offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE + palette_size;
        let image_size = stride * height;

        out.write_all(b"BM")?;
        out.write_u32::<LittleEndian>((data_offset + image_size) as u32)?;
        out.write_u32::<LittleEndian>(0)?;
        out.write_u32::<LittleEndian>(data_offset as u32)?;

        out.write_u32::<LittleEndian>(INFO_HEADER_SIZE as u32)?;
        out.write_i32::<LittleEndian>(raster.width as i32)?;
        out.write_i32::<LittleEndian>(raster.height as i32)?;
        out.write_u16::<LittleEndian>(1)?;
        out.write_u16::<LittleEndian>(bits as u16)?;
        out.write_u32::<LittleEndian>(BI_RGB)?;
        out.write_u32::<LittleEndian>(image_size as u32)?;
        out.write_i32::<LittleEndian>(2835)?;
        out.write_i32::<LittleEndian>(2835)?;
        out.write_u32::<LittleEndian>(if bits == 8 { 256 } else { 0 })?;
        out.write_u32::<LittleEndian>(0)?;

        if bits == 8 {
            for i in 0..=255u8 {
                out.write_all(&[i, i, i, 0])?;
            }
        }

        let row_len = width * raster.bands;
        let mut line = vec![0u8; stride];
        for y in (0..height).rev() {
            let src = &data[y * row_len..(y + 1) * row_len];
            if bits == 8 {
                line[..width].copy_from_slice(src);
            } else {
                for x in 0..width {
                    line[3 * x] = src[3 * x + 2];
                    line[3 * x + 1] = src[3 * x + 1];
                    line[3 * x + 2] = src[3 * x];
                }
            }
            out.write_all(&line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(raster: &Raster) -> Vec<u8> {
        let mut out = Vec::new();
        BmpSink.write(&mut out, raster).unwrap();
        out
    }

    #[test]
    fn test_stride() {
        assert_eq!(row_stride(1, 24), 4);
        assert_eq!(row_stride(3, 24), 12);
        assert_eq!(row_stride(5, 8), 8);
        assert_eq!(row_stride(4, 8), 4);
    }

    #[test]
    fn test_gray_roundtrip() {
        let raster = Raster {
            width: 3,
            height: 2,
            bands: 1,
            layout: Layout::Interleaved,
            data: ScanlineBuffer::U8(vec![0, 50, 100, 150, 200, 250]),
        };
        let bytes = encode(&raster);
        assert_eq!(bytes.len(), 14 + 40 + 1024 + 4 * 2);
        let back = decode(&bytes).unwrap();
        assert_eq!(back.bands, 1);
        assert_eq!(back.data, raster.data);
    }

    #[test]
    fn test_color_roundtrip_keeps_channel_order() {
        let raster = Raster {
            width: 2,
            height: 2,
            bands: 3,
            layout: Layout::Interleaved,
            data: ScanlineBuffer::U8(vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 1, 2, 3]),
        };
        let bytes = encode(&raster);
        // bottom row first, stored as BGR
        assert_eq!(&bytes[54..57], &[255, 0, 0]);
        let back = decode(&bytes).unwrap();
        assert_eq!(back.data, raster.data);
    }

    #[test]
    fn test_color_palette_expands_to_rgb() {
        let raster = Raster {
            width: 1,
            height: 1,
            bands: 1,
            layout: Layout::Interleaved,
            data: ScanlineBuffer::U8(vec![7]),
        };
        let mut bytes = encode(&raster);
        // palette entry 7 becomes pure blue (stored B, G, R, 0)
        let entry = 54 + 7 * 4;
        bytes[entry..entry + 4].copy_from_slice(&[200, 0, 0, 0]);
        let back = decode(&bytes).unwrap();
        assert_eq!(back.bands, 3);
        assert_eq!(back.data, ScanlineBuffer::U8(vec![0, 0, 200]));
    }

    #[test]
    fn test_rejects() {
        assert!(matches!(decode(b"BM"), Err(IoError::InvalidFile(_))));
        let raster = Raster::new(1, 1, 3, Layout::Interleaved, PixelType::Uint8);
        let mut bytes = encode(&raster);
        LittleEndian::write_u32(&mut bytes[30..34], 1);
        assert!(matches!(decode(&bytes), Err(IoError::DecodeError(_))));
    }

    #[test]
    fn test_huge_header_is_invalid() {
        let raster = Raster::new(1, 1, 3, Layout::Interleaved, PixelType::Uint8);
        let mut bytes = encode(&raster);
        LittleEndian::write_i32(&mut bytes[18..22], i32::MAX);
        LittleEndian::write_i32(&mut bytes[22..26], i32::MIN + 1);
        assert!(matches!(decode(&bytes), Err(IoError::InvalidFile(_))));

        let mut bytes = encode(&raster);
        LittleEndian::write_u32(&mut bytes[10..14], u32::MAX);
        assert!(matches!(decode(&bytes), Err(IoError::InvalidFile(_))));
    }
}
