//! Floating-point export to 8-bit formats.

use impex_core::{Image, ImageView, PixelType};
use impex_io::{export_image, import_image, ImageExportInfo, ImageImportInfo, IoError};

#[cfg(feature = "pnm")]
#[test]
fn float_to_pnm_is_in_range_and_monotonic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ramp.pgm");
    // a strictly increasing ramp with a wide range
    let src: Image<f32> = Image::from_fn(16, 4, |x, y| (y * 16 + x) as f32 * 37.5 - 900.0);
    export_image(&src, &ImageExportInfo::new(&path)).unwrap();

    let info = ImageImportInfo::new(&path).unwrap();
    assert_eq!(info.pixel_type(), Some(PixelType::Uint8));
    let mut back: Image<u8> = Image::new(16, 4);
    import_image(&info, &mut back).unwrap();

    let data = back.data();
    assert_eq!(data.first(), Some(&0));
    assert_eq!(data.last(), Some(&255));
    assert!(data.windows(2).all(|w| w[0] <= w[1]));
}

#[cfg(feature = "pnm")]
#[test]
fn flat_float_image_becomes_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flat.pgm");
    let src: Image<f64> = Image::filled(3, 2, 0.75);
    export_image(&src, &ImageExportInfo::new(&path)).unwrap();

    let info = ImageImportInfo::new(&path).unwrap();
    let mut back: Image<u8> = Image::filled(3, 2, 99);
    import_image(&info, &mut back).unwrap();
    assert!(back.data().iter().all(|&v| v == 0));
}

#[cfg(feature = "pnm")]
#[test]
fn uniform_color_stays_uniform() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uniform.ppm");
    let src: Image<[f32; 3]> = Image::filled(2, 2, [10.0, 20.0, 30.0]);
    export_image(&src, &ImageExportInfo::new(&path)).unwrap();

    let info = ImageImportInfo::new(&path).unwrap();
    assert_eq!(info.num_bands(), 3);
    let mut back: Image<[u8; 3]> = Image::new(2, 2);
    import_image(&info, &mut back).unwrap();

    // one global range: 10 -> 0, 20 -> 127.5 rounded, 30 -> 255
    let first = back.pixel(0, 0);
    assert_eq!(first, [0, 128, 255]);
    assert!(back.data().iter().all(|&px| px == first));
}

#[cfg(feature = "pnm")]
#[test]
fn non_finite_samples_do_not_break_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nan.pgm");
    let src = Image::from_data(4, 1, vec![f32::NAN, 0.0, 1.0, f32::INFINITY]).unwrap();
    export_image(&src, &ImageExportInfo::new(&path)).unwrap();

    let info = ImageImportInfo::new(&path).unwrap();
    let mut back: Image<u8> = Image::new(4, 1);
    import_image(&info, &mut back).unwrap();
    assert_eq!(back.data(), &[0, 0, 255, 255]);
}

#[cfg(feature = "bmp")]
#[test]
fn double_to_bmp() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("double.bmp");
    let src: Image<[f64; 3]> = Image::from_fn(3, 1, |x, _| {
        let v = x as f64 * 0.5;
        [v, v, v]
    });
    export_image(&src, &ImageExportInfo::new(&path)).unwrap();

    let info = ImageImportInfo::new(&path).unwrap();
    assert_eq!(info.file_type(), "BMP");
    let mut back: Image<[u8; 3]> = Image::new(3, 1);
    import_image(&info, &mut back).unwrap();
    assert_eq!(back.data(), &[[0; 3], [128; 3], [255; 3]]);
}

#[cfg(feature = "pfm")]
#[test]
fn double_to_pfm_has_no_fallback() {
    // PFM stores FLOAT only and has no UINT8 to fall back to
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("double.pfm");
    let src: Image<f64> = Image::filled(2, 2, 1.0);

    let err = export_image(&src, &ImageExportInfo::new(&path)).unwrap_err();
    assert!(matches!(
        err,
        IoError::UnsupportedIntegralRepresentation {
            pixel_type: PixelType::Double,
            ..
        }
    ));
    assert!(!path.exists());
}

#[cfg(feature = "viff")]
#[test]
fn native_float_format_skips_rescale() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("float.xv");
    let src: Image<f32> = Image::from_data(2, 1, vec![-40.5, 1e9]).unwrap();
    export_image(&src, &ImageExportInfo::new(&path)).unwrap();

    let info = ImageImportInfo::new(&path).unwrap();
    assert_eq!(info.pixel_type(), Some(PixelType::Float));
    let mut back: Image<f32> = Image::new(2, 1);
    import_image(&info, &mut back).unwrap();
    assert_eq!(back.data(), src.data());
}

#[cfg(feature = "pnm")]
#[test]
fn explicit_file_type_overrides_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forced.img");
    let src: Image<f32> = Image::from_data(2, 1, vec![0.0, 1.0]).unwrap();
    export_image(&src, &ImageExportInfo::new(&path).with_file_type("PNM")).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes, b"P5\n2 1\n255\n\x00\xff");
}
