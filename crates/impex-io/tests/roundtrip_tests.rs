//! Export/import round trips through the built-in codecs.

use approx::assert_relative_eq;
use impex_core::{Image, ImageView, Pixel, PixelType, Rect};
use impex_io::{export_image, import_image, ImageExportInfo, ImageImportInfo};
use std::path::Path;

fn roundtrip<P>(path: &Path, src: &Image<P>) -> Image<P>
where
    P: Pixel + PartialEq + std::fmt::Debug,
{
    export_image(src, &ImageExportInfo::new(path)).expect("export");
    let info = ImageImportInfo::new(path).expect("import info");
    assert_eq!(info.size(), src.dimensions());
    let mut back: Image<P> = Image::new(info.width(), info.height());
    import_image(&info, &mut back).expect("import");
    back
}

#[cfg(feature = "viff")]
mod viff {
    use super::*;

    #[test]
    fn uint8_scalar() {
        let dir = tempfile::tempdir().unwrap();
        let src: Image<u8> = Image::from_fn(5, 3, |x, y| (x * 40 + y) as u8);
        let back = roundtrip(&dir.path().join("u8.xv"), &src);
        assert_eq!(back.data(), src.data());
    }

    #[test]
    fn int16_vector() {
        let dir = tempfile::tempdir().unwrap();
        let src: Image<[i16; 3]> =
            Image::from_fn(4, 4, |x, y| [x as i16 * -1000, y as i16 * 1000, (x + y) as i16 - 3]);
        let path = dir.path().join("i16.xv");
        let back = roundtrip(&path, &src);
        assert_eq!(back.data(), src.data());

        let info = ImageImportInfo::new(&path).unwrap();
        assert_eq!(info.pixel_type(), Some(PixelType::Int16));
        assert_eq!(info.num_bands(), 3);
    }

    #[test]
    fn int32_scalar() {
        let dir = tempfile::tempdir().unwrap();
        let src: Image<i32> = Image::from_fn(3, 2, |x, y| i32::MIN / 2 + (x * 7 + y) as i32 * 100_000);
        let back = roundtrip(&dir.path().join("i32.xv"), &src);
        assert_eq!(back.data(), src.data());
    }

    #[test]
    fn float_vector() {
        let dir = tempfile::tempdir().unwrap();
        let src: Image<[f32; 2]> = Image::from_fn(3, 3, |x, y| [x as f32 * 0.125 - 1.0, y as f32 * 1e-3]);
        let back = roundtrip(&dir.path().join("f32.xv"), &src);
        assert_eq!(back.data(), src.data());
    }

    #[test]
    fn double_scalar() {
        let dir = tempfile::tempdir().unwrap();
        let src: Image<f64> = Image::from_fn(2, 5, |x, y| std::f64::consts::PI * (x as f64 - y as f64));
        let back = roundtrip(&dir.path().join("f64.xv"), &src);
        assert_eq!(back.data(), src.data());
    }

    #[test]
    fn many_bands_keep_order() {
        let dir = tempfile::tempdir().unwrap();
        let src: Image<[i32; 5]> = Image::from_fn(3, 2, |x, y| {
            let base = (y * 3 + x) as i32 * 10;
            [base, base + 1, base + 2, base + 3, base + 4]
        });
        let back = roundtrip(&dir.path().join("bands.xv"), &src);
        assert_eq!(back.pixel(2, 1), [50, 51, 52, 53, 54]);
        assert_eq!(back.data(), src.data());
    }

    #[test]
    fn import_converts_to_destination_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("convert.xv");
        let src: Image<f64> = Image::from_data(3, 1, vec![-1.5, 2.25, 300.75]).unwrap();
        export_image(&src, &ImageExportInfo::new(&path)).unwrap();

        let info = ImageImportInfo::new(&path).unwrap();
        let mut as_f32: Image<f32> = Image::new(3, 1);
        import_image(&info, &mut as_f32).unwrap();
        assert_relative_eq!(as_f32.pixel(2, 0), 300.75);

        // float -> int is a saturating cast
        let mut as_u8: Image<u8> = Image::new(3, 1);
        import_image(&info, &mut as_u8).unwrap();
        assert_eq!(as_u8.data(), &[0, 2, 255]);
    }
}

#[cfg(feature = "pnm")]
mod pnm {
    use super::*;

    #[test]
    fn gray() {
        let dir = tempfile::tempdir().unwrap();
        let src: Image<u8> = Image::from_fn(7, 3, |x, y| (x * 30 + y * 5) as u8);
        let back = roundtrip(&dir.path().join("gray.pgm"), &src);
        assert_eq!(back.data(), src.data());
    }

    #[test]
    fn color_keeps_channel_order() {
        let dir = tempfile::tempdir().unwrap();
        let src: Image<[u8; 3]> = Image::from_fn(3, 2, |x, y| [x as u8, y as u8, 200]);
        let path = dir.path().join("color.ppm");
        let back = roundtrip(&path, &src);
        assert_eq!(back.data(), src.data());

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P6\n3 2\n255\n"));
        // second pixel of the first row
        assert_eq!(&bytes[11 + 3..11 + 6], &[1, 0, 200]);
    }

    #[test]
    fn ascii_compression() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.pgm");
        let src: Image<u8> = Image::from_data(3, 1, vec![1, 22, 255]).unwrap();
        export_image(&src, &ImageExportInfo::new(&path).with_compression("ASCII")).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"P2\n3 1\n255\n1 22 255\n");

        let info = ImageImportInfo::new(&path).unwrap();
        let mut back: Image<i32> = Image::new(3, 1);
        import_image(&info, &mut back).unwrap();
        assert_eq!(back.data(), &[1, 22, 255]);
    }

    #[test]
    fn signed_byte_source_uses_uint8() {
        // storage is selected from the sample width, so i8 goes to UINT8
        let dir = tempfile::tempdir().unwrap();
        let src: Image<i8> = Image::from_data(2, 1, vec![5, 100]).unwrap();
        let back = roundtrip(&dir.path().join("i8.pgm"), &src);
        assert_eq!(back.data(), &[5, 100]);
    }
}

#[cfg(feature = "pfm")]
#[test]
fn pfm_float_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let src: Image<[f32; 3]> = Image::from_fn(4, 3, |x, y| [x as f32 / 3.0, -(y as f32), 1e6]);
    let back = roundtrip(&dir.path().join("float.pfm"), &src);
    assert_eq!(back.data(), src.data());

    let gray: Image<f32> = Image::from_fn(2, 3, |x, y| (x as f32 - 0.5) * y as f32);
    let back = roundtrip(&dir.path().join("gray.pfm"), &gray);
    assert_eq!(back.data(), gray.data());
}

#[cfg(feature = "bmp")]
mod bmp {
    use super::*;

    #[test]
    fn gray() {
        let dir = tempfile::tempdir().unwrap();
        let src: Image<u8> = Image::from_fn(5, 3, |x, y| (x * 50 + y) as u8);
        let back = roundtrip(&dir.path().join("gray.bmp"), &src);
        assert_eq!(back.data(), src.data());
    }

    #[test]
    fn color_keeps_channel_order() {
        let dir = tempfile::tempdir().unwrap();
        let src: Image<[u8; 3]> = Image::from_fn(3, 3, |x, y| [255 - x as u8, y as u8 * 20, 7]);
        let back = roundtrip(&dir.path().join("color.bmp"), &src);
        assert_eq!(back.data(), src.data());
    }
}

#[cfg(feature = "viff")]
#[test]
fn sub_region_export_and_import() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("region.xv");
    let big: Image<i16> = Image::from_fn(6, 6, |x, y| (y * 6 + x) as i16);

    let view = big.view(Rect::new(2, 1, 3, 2)).unwrap();
    export_image(&view, &ImageExportInfo::new(&path)).unwrap();

    let info = ImageImportInfo::new(&path).unwrap();
    assert_eq!(info.size(), (3, 2));

    let mut target: Image<i16> = Image::filled(5, 5, -1);
    {
        let mut region = target.view_mut(Rect::new(1, 2, 3, 2)).unwrap();
        import_image(&info, &mut region).unwrap();
    }
    assert_eq!(target.pixel(1, 2), 8);
    assert_eq!(target.pixel(3, 3), 16);
    // everything outside the region is untouched
    let touched: usize = target.data().iter().filter(|&&v| v != -1).count();
    assert_eq!(touched, 6);
    assert_eq!(target.pixel(0, 0), -1);
    assert_eq!(target.pixel(4, 4), -1);
}
