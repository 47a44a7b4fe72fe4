//! Rectangular pixel regions.
//!
//! [`Rect`] addresses the sub-range of an image that an import or export
//! touches. Coordinates follow the usual image convention: origin at the
//! top-left, X to the right, Y downward.
//!
//! ```rust
//! use impex_core::Rect;
//!
//! let rect = Rect::new(10, 20, 100, 50);
//! assert!(rect.contains(15, 25));
//! assert!(!rect.contains(110, 25));
//!
//! let other = Rect::new(50, 40, 100, 50);
//! let overlap = rect.intersect(&other).unwrap();
//! assert_eq!((overlap.width, overlap.height), (60, 30));
//! ```

use std::fmt;

/// An axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Creates a rectangle from origin and size.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at the origin.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge.
    #[inline]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Number of pixels covered.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the point lies inside.
    #[inline]
    pub const fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    #[inline]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Overlap of two rectangles, `None` if they are disjoint.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Clips to `[0, max_width) x [0, max_height)`.
    pub fn clamp_to(&self, max_width: u32, max_height: u32) -> Option<Rect> {
        self.intersect(&Rect::from_size(max_width, max_height))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}
