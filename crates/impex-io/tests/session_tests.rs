//! Session lifecycle and engine error paths.

use impex_core::{Domain, Image, PixelType, Sample};
use impex_io::codec::{BandMut, BandRef, ScanlineBuffer};
use impex_io::registry::{CodecInfo, CodecRegistry};
use impex_io::{
    export_image, export_image_with, import_image, import_image_with, Decoder, Encoder, ImageExportInfo,
    ImageImportInfo, IoError, IoResult,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Mock codec
// ============================================================================

static DECODER_CLOSES: AtomicUsize = AtomicUsize::new(0);
static ENCODER_CLOSES: AtomicUsize = AtomicUsize::new(0);

/// 2x2 single-band INT16 reader whose second scanline fails.
struct FlakyDecoder {
    row: u32,
    line: ScanlineBuffer,
}

impl Decoder for FlakyDecoder {
    fn format_name(&self) -> &str {
        "MOCK"
    }

    fn width(&self) -> u32 {
        2
    }

    fn height(&self) -> u32 {
        2
    }

    fn num_bands(&self) -> usize {
        1
    }

    fn pixel_type(&self) -> Option<PixelType> {
        Some(PixelType::Int16)
    }

    fn offset(&self) -> usize {
        1
    }

    fn next_scanline(&mut self) -> IoResult<()> {
        if self.row == 1 {
            return Err(IoError::DecodeError("truncated".into()));
        }
        self.row += 1;
        Ok(())
    }

    fn current_scanline_of_band(&self, band: usize) -> IoResult<BandRef<'_>> {
        Ok(BandRef::new(&self.line, band))
    }

    fn close(&mut self) -> IoResult<()> {
        DECODER_CLOSES.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// INT16 writer that fails to commit its first scanline.
struct FlakyEncoder {
    line: ScanlineBuffer,
}

impl Encoder for FlakyEncoder {
    fn format_name(&self) -> &str {
        "MOCK"
    }

    fn set_width(&mut self, width: u32) -> IoResult<()> {
        self.line = ScanlineBuffer::new(PixelType::Int16, width as usize);
        Ok(())
    }

    fn set_height(&mut self, _height: u32) -> IoResult<()> {
        Ok(())
    }

    fn set_num_bands(&mut self, _bands: usize) -> IoResult<()> {
        Ok(())
    }

    fn set_pixel_type(&mut self, _pixel_type: PixelType) -> IoResult<()> {
        Ok(())
    }

    fn finalize_settings(&mut self) -> IoResult<()> {
        Ok(())
    }

    fn offset(&self) -> usize {
        1
    }

    fn current_scanline_of_band(&mut self, band: usize) -> IoResult<BandMut<'_>> {
        Ok(BandMut::new(&mut self.line, band))
    }

    fn next_scanline(&mut self) -> IoResult<()> {
        Err(IoError::EncodeError("disk full".into()))
    }

    fn close(&mut self) -> IoResult<()> {
        ENCODER_CLOSES.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn mock_decoder(_path: &Path) -> IoResult<Box<dyn Decoder>> {
    Ok(Box::new(FlakyDecoder {
        row: 0,
        line: ScanlineBuffer::I16(vec![3, 4]),
    }))
}

fn mock_encoder(_path: &Path) -> IoResult<Box<dyn Encoder>> {
    Ok(Box::new(FlakyEncoder {
        line: ScanlineBuffer::I16(Vec::new()),
    }))
}

fn mock_registry() -> CodecRegistry {
    let mut registry = CodecRegistry::new();
    registry.register(CodecInfo {
        name: "MOCK",
        extensions: &["mock"],
        can_read: |_| false,
        pixel_types: &[PixelType::Int16],
        decoder: Some(mock_decoder),
        encoder: Some(mock_encoder),
    });
    registry
}

#[test]
fn decoder_closed_once_when_import_fails() {
    let registry = mock_registry();
    let info = ImageImportInfo::with_registry(&registry, "ignored.mock", Some("MOCK")).unwrap();
    assert_eq!(info.pixel_type(), Some(PixelType::Int16));
    let before = DECODER_CLOSES.load(Ordering::SeqCst);

    let mut img: Image<i16> = Image::new(2, 2);
    let err = import_image_with(&registry, &info, &mut img).unwrap_err();
    assert!(matches!(err, IoError::DecodeError(_)));
    assert_eq!(DECODER_CLOSES.load(Ordering::SeqCst), before + 1);
    // the first row made it through
    assert_eq!(img.data(), &[3, 4, 0, 0]);
}

#[test]
fn encoder_closed_once_when_export_fails() {
    let registry = mock_registry();
    let before = ENCODER_CLOSES.load(Ordering::SeqCst);

    let img: Image<i16> = Image::filled(2, 2, 5);
    let err = export_image_with(&registry, &img, &ImageExportInfo::new("ignored.mock")).unwrap_err();
    assert!(matches!(err, IoError::EncodeError(_)));
    assert_eq!(ENCODER_CLOSES.load(Ordering::SeqCst), before + 1);
}

// ============================================================================
// Representation selection failures
// ============================================================================

/// Three-byte unsigned integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
struct U24([u8; 3]);

impl Sample for U24 {
    const DOMAIN: Domain = Domain::Integral;

    fn to_f64(self) -> f64 {
        let [a, b, c] = self.0;
        f64::from(u32::from_le_bytes([a, b, c, 0]))
    }

    fn from_f64(v: f64) -> Self {
        let [a, b, c, _] = (v.clamp(0.0, 16_777_215.0) as u32).to_le_bytes();
        Self([a, b, c])
    }
}

#[cfg(feature = "viff")]
#[test]
fn three_byte_samples_are_rejected_before_any_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("u24.xv");
    let img: Image<[U24; 3]> = Image::filled(2, 2, [U24::from_f64(70_000.0); 3]);

    let err = export_image(&img, &ImageExportInfo::new(&path)).unwrap_err();
    assert!(matches!(
        err,
        IoError::UnsupportedPixelWidth {
            domain: Domain::Integral,
            bytes: 3
        }
    ));
    assert!(!path.exists());
}

#[cfg(feature = "viff")]
#[test]
fn half_floats_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("half.xv");
    let img: Image<half::f16> = Image::filled(1, 1, half::f16::from_f32(0.5));

    let err = export_image(&img, &ImageExportInfo::new(&path)).unwrap_err();
    assert!(matches!(
        err,
        IoError::UnsupportedPixelWidth {
            domain: Domain::Floating,
            bytes: 2
        }
    ));
    assert!(!path.exists());
}

#[cfg(feature = "pnm")]
#[test]
fn sixteen_bit_pnm_has_no_pixel_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.pgm");
    std::fs::write(&path, b"P5\n2 1\n65535\n\x01\x00\xff\xff").unwrap();

    let info = ImageImportInfo::new(&path).unwrap();
    assert_eq!(info.pixel_type(), None);
    let mut img: Image<i32> = Image::new(2, 1);
    let err = import_image(&info, &mut img).unwrap_err();
    assert!(matches!(err, IoError::InvalidPixelType { .. }));
}

// ============================================================================
// Geometry and file errors
// ============================================================================

#[cfg(feature = "pnm")]
#[test]
fn destination_too_small() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.ppm");
    let src: Image<[u8; 3]> = Image::new(4, 4);
    export_image(&src, &ImageExportInfo::new(&path)).unwrap();
    let info = ImageImportInfo::new(&path).unwrap();

    let mut small: Image<[u8; 3]> = Image::new(4, 3);
    assert!(matches!(
        import_image(&info, &mut small),
        Err(IoError::DimensionMismatch { .. })
    ));

    let mut two_band: Image<[u8; 2]> = Image::new(4, 4);
    assert!(matches!(
        import_image(&info, &mut two_band),
        Err(IoError::BandMismatch {
            bands: 3,
            components: 2
        })
    ));
}

#[cfg(feature = "pnm")]
#[test]
fn oversized_header_is_invalid_file() {
    let dir = tempfile::tempdir().unwrap();

    let path = dir.path().join("overflow.ppm");
    std::fs::write(&path, b"P6\n4294967295 4294967295\n255\n\0").unwrap();
    let err = ImageImportInfo::new(&path).unwrap_err();
    assert!(matches!(err, IoError::InvalidFile(_)));

    // a tiny ASCII file must not reserve room for the declared size
    let path = dir.path().join("huge.pgm");
    std::fs::write(&path, b"P2 100000 100000 255").unwrap();
    let err = ImageImportInfo::new(&path).unwrap_err();
    assert!(matches!(err, IoError::InvalidFile(_)));
}

#[cfg(feature = "pnm")]
#[test]
fn missing_file_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let err = ImageImportInfo::new(dir.path().join("absent.pgm")).unwrap_err();
    assert!(matches!(err, IoError::Unreadable { .. }));
}

#[cfg(feature = "pnm")]
#[test]
fn missing_directory_is_unwritable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("out.pgm");
    let img: Image<u8> = Image::new(1, 1);
    let err = export_image(&img, &ImageExportInfo::new(&path)).unwrap_err();
    assert!(matches!(err, IoError::Unwritable { .. }));
}

#[cfg(feature = "pnm")]
#[test]
fn unsupported_band_count_fails_at_finalize() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two.pgm");
    let img: Image<[u8; 2]> = Image::new(2, 2);
    let err = export_image(&img, &ImageExportInfo::new(&path)).unwrap_err();
    assert!(matches!(err, IoError::EncodeError(_)));
}

#[test]
fn unknown_forced_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.pgm");
    std::fs::write(&path, b"P5\n1 1\n255\n\x00").unwrap();
    let err = ImageImportInfo::with_file_type(&path, "GIF").unwrap_err();
    assert!(matches!(err, IoError::UnknownFormat(_)));
}
