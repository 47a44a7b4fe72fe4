//! Linear rescale to the 8-bit range.
//!
//! Used when a floating-point image is exported to a format that only stores
//! `UINT8`: the observed `[min, max]` of all finite samples maps onto
//! `[0, 255]`, then values are rounded and clamped.

use impex_core::stats::{find_min_max, MinMax};
use impex_core::ImageView;

const TARGET_MAX: f64 = u8::MAX as f64;

/// `out = round((v + offset) * scale)`, clamped to `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RescaleParams {
    /// Multiplier applied after the offset.
    pub scale: f64,
    /// Added to each value first.
    pub offset: f64,
}

impl RescaleParams {
    /// Maps `[min, max]` onto `[0, 255]`.
    ///
    /// A flat range (`max <= min`) gives `scale = 0`, so every value
    /// becomes 0.
    pub fn from_min_max(min: f64, max: f64) -> Self {
        let range = max - min;
        let scale = if range > 0.0 { TARGET_MAX / range } else { 0.0 };
        Self { scale, offset: -min }
    }

    /// Parameters for the sample range in `stats`.
    pub fn from_stats(stats: &MinMax) -> Self {
        if stats.is_empty() {
            return Self { scale: 0.0, offset: 0.0 };
        }
        Self::from_min_max(stats.min, stats.max)
    }

    /// Parameters for the finite sample range of every component of `src`.
    pub fn from_image<V: ImageView + ?Sized>(src: &V) -> Self {
        Self::from_stats(&find_min_max(src))
    }

    /// Maps one value. NaN becomes 0.
    #[inline]
    pub fn apply(&self, v: f64) -> u8 {
        let out = ((v + self.offset) * self.scale).round();
        // `as` saturates and sends NaN to 0
        out.clamp(0.0, TARGET_MAX) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use impex_core::Image;

    #[test]
    fn test_endpoints_and_midpoint() {
        let p = RescaleParams::from_min_max(10.0, 30.0);
        assert_relative_eq!(p.scale, 12.75);
        assert_relative_eq!(p.offset, -10.0);
        assert_eq!(p.apply(10.0), 0);
        assert_eq!(p.apply(20.0), 128);
        assert_eq!(p.apply(30.0), 255);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let p = RescaleParams::from_min_max(0.0, 1.0);
        assert_eq!(p.apply(-5.0), 0);
        assert_eq!(p.apply(7.0), 255);
        assert_eq!(p.apply(f64::INFINITY), 255);
        assert_eq!(p.apply(f64::NAN), 0);
    }

    #[test]
    fn test_flat_image_maps_to_zero() {
        let img: Image<f32> = Image::filled(3, 3, 42.0);
        let p = RescaleParams::from_image(&img);
        assert_eq!(p.scale, 0.0);
        assert_eq!(p.apply(42.0), 0);
    }

    #[test]
    fn test_ignores_non_finite_samples() {
        let img = Image::from_data(3, 1, vec![f32::NAN, -1.0, 1.0]).unwrap();
        let p = RescaleParams::from_image(&img);
        assert_relative_eq!(p.scale, 127.5);
        assert_eq!(p.apply(-1.0), 0);

        let empty = Image::from_data(1, 1, vec![f64::NAN]).unwrap();
        assert_eq!(RescaleParams::from_image(&empty), RescaleParams { scale: 0.0, offset: 0.0 });
    }

    #[test]
    fn test_monotonic() {
        let p = RescaleParams::from_min_max(-3.0, 1e6);
        let mut last = 0u8;
        for i in 0..1000 {
            let v = -3.0 + i as f64 * 1000.0;
            let out = p.apply(v);
            assert!(out >= last);
            last = out;
        }
    }
}
