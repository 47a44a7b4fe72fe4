//! Khoros VIFF format support.
//!
//! A VIFF file is a fixed 1024-byte header followed by band-sequential
//! planes (all of band 0, then all of band 1, ...). It stores any band count
//! in every canonical pixel type, which makes it the lossless target for
//! integer and floating-point images alike.
//!
//! # Header
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0 | identifier `0xAB` |
//! | 1 | file type `1` |
//! | 2 | release `1` |
//! | 3 | version `3` |
//! | 4 | machine dependency (`0x2` big-endian, `0x4`/`0x8` little-endian) |
//! | 8..520 | comment |
//! | 520 | row size (width) |
//! | 524 | column size (height) |
//! | 556 | number of images |
//! | 560 | number of data bands |
//! | 564 | data storage type |
//! | 568 | data encoding scheme |
//! | 572 | map scheme |
//!
//! Only uncompressed, unmapped single-image files are read. Files are
//! written big-endian.

use crate::codec::{Decoder, Encoder, ScanlineBuffer};
use crate::detect::Format;
use crate::raster::{checked_size, open_reader, Layout, Raster, RasterDecoder, RasterEncoder, RasterSink, RasterSettings};
use crate::{IoError, IoResult};
use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use impex_core::PixelType;
use std::io::{Read, Write};
use std::path::Path;

const NAME: &str = "VIFF";

/// Pixel types the VIFF encoder stores.
pub const PIXEL_TYPES: &[PixelType] = &PixelType::ALL;

const HEADER_SIZE: usize = 1024;
const IDENTIFIER: u8 = 0xAB;
const FILE_TYPE: u8 = 1;
const RELEASE: u8 = 1;
const VERSION: u8 = 3;

const DEP_IEEE_ORDER: u8 = 0x2;
const DEP_DEC_ORDER: u8 = 0x4;
const DEP_NS_ORDER: u8 = 0x8;

const TYP_1_BYTE: u32 = 1;
const TYP_2_BYTE: u32 = 2;
const TYP_4_BYTE: u32 = 4;
const TYP_FLOAT: u32 = 5;
const TYP_DOUBLE: u32 = 9;

const LOC_IMPLICIT: u32 = 1;
const DES_RAW: u32 = 0;
const MS_NONE: u32 = 0;

mod field {
    pub const ROW_SIZE: usize = 520;
    pub const COL_SIZE: usize = 524;
    pub const PIXSIZ_X: usize = 540;
    pub const PIXSIZ_Y: usize = 544;
    pub const LOCATION_TYPE: usize = 548;
    pub const NUM_IMAGES: usize = 556;
    pub const NUM_BANDS: usize = 560;
    pub const STORAGE_TYPE: usize = 564;
    pub const ENCODE_SCHEME: usize = 568;
    pub const MAP_SCHEME: usize = 572;
}

/// Checks for the VIFF identifier.
pub fn can_read(header: &[u8]) -> bool {
    Format::from_bytes(header) == Format::Viff
}

/// Opens a VIFF read session.
pub fn decoder(path: &Path) -> IoResult<Box<dyn Decoder>> {
    let mut bytes = Vec::new();
    open_reader(path)?.read_to_end(&mut bytes)?;
    Ok(Box::new(RasterDecoder::new(NAME, decode(&bytes)?)))
}

/// Creates a VIFF file and opens a write session.
pub fn encoder(path: &Path) -> IoResult<Box<dyn Encoder>> {
    Ok(Box::new(RasterEncoder::create(path, ViffSink)?))
}

fn storage_type(code: u32) -> IoResult<PixelType> {
    match code {
        TYP_1_BYTE => Ok(PixelType::Uint8),
        TYP_2_BYTE => Ok(PixelType::Int16),
        TYP_4_BYTE => Ok(PixelType::Int32),
        TYP_FLOAT => Ok(PixelType::Float),
        TYP_DOUBLE => Ok(PixelType::Double),
        other => Err(IoError::DecodeError(format!("VIFF storage type {other} not supported"))),
    }
}

fn storage_code(pixel_type: PixelType) -> u32 {
    match pixel_type {
        PixelType::Uint8 => TYP_1_BYTE,
        PixelType::Int16 => TYP_2_BYTE,
        PixelType::Int32 => TYP_4_BYTE,
        PixelType::Float => TYP_FLOAT,
        PixelType::Double => TYP_DOUBLE,
    }
}

pub(crate) fn decode(bytes: &[u8]) -> IoResult<Raster> {
    if bytes.len() < HEADER_SIZE {
        return Err(IoError::InvalidFile(format!(
            "VIFF header truncated: {} bytes",
            bytes.len()
        )));
    }
    if !can_read(bytes) {
        return Err(IoError::InvalidFile("missing VIFF identifier".into()));
    }
    match bytes[4] {
        DEP_IEEE_ORDER => decode_with::<BigEndian>(bytes),
        DEP_DEC_ORDER | DEP_NS_ORDER => decode_with::<LittleEndian>(bytes),
        other => Err(IoError::DecodeError(format!("VIFF machine dependency {other:#x} not supported"))),
    }
}

fn decode_with<B: ByteOrder>(bytes: &[u8]) -> IoResult<Raster> {
    let word = |at: usize| B::read_u32(&bytes[at..at + 4]);

    let width = word(field::ROW_SIZE);
    let height = word(field::COL_SIZE);
    let bands = word(field::NUM_BANDS) as usize;
    if word(field::NUM_IMAGES) != 1 {
        return Err(IoError::DecodeError("VIFF files with several images not supported".into()));
    }
    if word(field::LOCATION_TYPE) != LOC_IMPLICIT {
        return Err(IoError::DecodeError("VIFF explicit locations not supported".into()));
    }
    if word(field::ENCODE_SCHEME) != DES_RAW {
        return Err(IoError::DecodeError("compressed VIFF data not supported".into()));
    }
    if word(field::MAP_SCHEME) != MS_NONE {
        return Err(IoError::DecodeError("mapped VIFF data not supported".into()));
    }
    let pixel_type = storage_type(word(field::STORAGE_TYPE))?;

    let needed = checked_size(NAME, &[width as usize, height as usize, bands, pixel_type.bytes()])?;
    let payload = &bytes[HEADER_SIZE..];
    if payload.len() < needed {
        return Err(IoError::InvalidFile(format!(
            "VIFF data truncated: {} of {needed} bytes",
            payload.len()
        )));
    }
    let payload = &payload[..needed];

    let mut raster = Raster::new(width, height, bands, Layout::Planar, pixel_type);
    match &mut raster.data {
        ScanlineBuffer::U8(d) => d.copy_from_slice(payload),
        ScanlineBuffer::I16(d) => B::read_i16_into(payload, d),
        ScanlineBuffer::I32(d) => B::read_i32_into(payload, d),
        ScanlineBuffer::F32(d) => B::read_f32_into(payload, d),
        ScanlineBuffer::F64(d) => B::read_f64_into(payload, d),
    }
    Ok(raster)
}

/// VIFF writer half of a [`RasterEncoder`].
#[derive(Debug, Default)]
pub struct ViffSink;

impl RasterSink for ViffSink {
    fn name(&self) -> &'static str {
        NAME
    }

    fn layout(&self) -> Layout {
        Layout::Planar
    }

    fn check(&self, _settings: &RasterSettings) -> IoResult<()> {
        Ok(())
    }

    fn write(&self, out: &mut dyn Write, raster: &Raster) -> IoResult<()> {
        let mut header = [0u8; HEADER_SIZE];
        header[0] = IDENTIFIER;
        header[1] = FILE_TYPE;
        header[2] = RELEASE;
        header[3] = VERSION;
        header[4] = DEP_IEEE_ORDER;
        let mut put = |at: usize, v: u32| BigEndian::write_u32(&mut header[at..at + 4], v);
        put(field::ROW_SIZE, raster.width);
        put(field::COL_SIZE, raster.height);
        put(field::PIXSIZ_X, 1.0f32.to_bits());
        put(field::PIXSIZ_Y, 1.0f32.to_bits());
        put(field::LOCATION_TYPE, LOC_IMPLICIT);
        put(field::NUM_IMAGES, 1);
        put(field::NUM_BANDS, raster.bands as u32);
        put(field::STORAGE_TYPE, storage_code(raster.pixel_type()));
        put(field::ENCODE_SCHEME, DES_RAW);
        put(field::MAP_SCHEME, MS_NONE);
        out.write_all(&header)?;

        match &raster.data {
            ScanlineBuffer::U8(d) => out.write_all(d)?,
            ScanlineBuffer::I16(d) => {
                for &v in d {
                    out.write_i16::<BigEndian>(v)?;
                }
            }
            ScanlineBuffer::I32(d) => {
                for &v in d {
                    out.write_i32::<BigEndian>(v)?;
                }
            }
            ScanlineBuffer::F32(d) => {
                for &v in d {
                    out.write_f32::<BigEndian>(v)?;
                }
            }
            ScanlineBuffer::F64(d) => {
                for &v in d {
                    out.write_f64::<BigEndian>(v)?;
                }
            }
        }
        Ok(())
    }
}
