//! Sample range inspection.
//!
//! [`find_min_max`] scans every component of a view. Non-finite values (NaN, infinities) are counted but never become an
//! extremum, so a single stray NaN cannot poison a rescale range.

use crate::{ImageView, Pixel, Sample};

// ============================================================================
// Accumulator
// ============================================================================

/// Running minimum and maximum of a sample stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    /// Smallest finite value seen.
    pub min: f64,
    /// Largest finite value seen.
    pub max: f64,
    /// Number of finite values seen.
    pub count: u64,
    /// Number of NaN or infinite values skipped.
    pub non_finite: u64,
}

impl Default for MinMax {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
            non_finite: 0,
        }
    }
}

impl MinMax {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one value.
    #[inline]
    pub fn update(&mut self, v: f64) {
        if v.is_finite() {
            self.min = self.min.min(v);
            self.max = self.max.max(v);
            self.count += 1;
        } else {
            self.non_finite += 1;
        }
    }

    /// Returns `true` if no finite value was seen.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

// ============================================================================
// Inspection passes
// ============================================================================

/// Global min/max over every component of every pixel.
///
/// # Example
///
/// ```
/// use impex_core::{Image, stats::find_min_max};
///
/// let img: Image<[f32; 2]> = Image::from_fn(2, 2, |x, y| [x as f32, -(y as f32)]);
/// let mm = find_min_max(&img);
/// assert_eq!((mm.min, mm.max), (-1.0, 1.0));
/// assert_eq!(mm.count, 8);
/// ```
pub fn find_min_max<V>(src: &V) -> MinMax
where
    V: ImageView + ?Sized,
{
    let mut acc = MinMax::new();
    for row in src.rows() {
        for px in row {
            for c in 0..<V::Pixel as Pixel>::COMPONENTS {
                acc.update(px.component(c).to_f64());
            }
        }
    }
    acc
}
