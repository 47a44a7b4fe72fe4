//! Image grids and views.
//!
//! This module provides the in-memory side of import and export:
//! - [`ImageView`] - read access to a 2-D grid of pixels, row by row
//! - [`ImageViewMut`] - write access to the same
//! - [`Image`] - owned grid
//! - [`SubImage`] / [`SubImageMut`] - borrowed rectangular regions of an [`Image`]
//!
//! # Memory Layout
//!
//! Pixels are stored row-major, top to bottom. A row is a contiguous slice of
//! pixels; for vector pixels each element is a `[T; N]` tuple:
//!
//! ```text
//! Row 0: [ [R G B] [R G B] [R G B] ... ]
//! Row 1: [ [R G B] [R G B] [R G B] ... ]
//! ```
//!
//! # Usage
//!
//! ```rust
//! use impex_core::{Image, ImageView, ImageViewMut, Rect};
//!
//! let mut img: Image<[u8; 3]> = Image::new(64, 32);
//! img.set_pixel(10, 5, [255, 128, 0]);
//! assert_eq!(img.pixel(10, 5), [255, 128, 0]);
//!
//! // Only the addressed region is visible through a view
//! let mut view = img.view_mut(Rect::new(8, 4, 16, 8)).unwrap();
//! assert_eq!(view.pixel(2, 1), [255, 128, 0]);
//! view.row_mut(0).fill([1, 2, 3]);
//! assert_eq!(img.pixel(8, 4), [1, 2, 3]);
//! assert_eq!(img.pixel(7, 4), [0, 0, 0]);
//! ```

use crate::{Error, Pixel, Rect, Result};
use std::fmt;

/// Read access to a 2-D pixel grid.
pub trait ImageView {
    /// Pixel type stored in the grid.
    type Pixel: Pixel;

    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Row `y`, left to right. Panics if `y >= height`.
    fn row(&self, y: u32) -> &[Self::Pixel];

    /// `(width, height)`.
    #[inline]
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Pixel at `(x, y)`. Panics if outside the grid.
    #[inline]
    fn pixel(&self, x: u32, y: u32) -> Self::Pixel {
        self.row(y)[x as usize]
    }

    /// Rows top to bottom.
    fn rows(&self) -> impl Iterator<Item = &[Self::Pixel]> + '_ {
        (0..self.height()).map(move |y| self.row(y))
    }
}

/// Write access to a 2-D pixel grid.
pub trait ImageViewMut: ImageView {
    /// Mutable row `y`. Panics if `y >= height`.
    fn row_mut(&mut self, y: u32) -> &mut [Self::Pixel];

    /// Sets the pixel at `(x, y)`. Panics if outside the grid.
    #[inline]
    fn set_pixel(&mut self, x: u32, y: u32, pixel: Self::Pixel) {
        self.row_mut(y)[x as usize] = pixel;
    }
}

/// Owned image grid.
///
/// # Example
///
/// ```rust
/// use impex_core::{Image, ImageView};
///
/// let ramp: Image<f32> = Image::from_fn(4, 2, |x, y| (x + 4 * y) as f32);
/// assert_eq!(ramp.pixel(3, 1), 7.0);
/// assert_eq!(ramp.row(0), &[0.0, 1.0, 2.0, 3.0]);
/// ```
#[derive(Clone)]
pub struct Image<P: Pixel> {
    data: Vec<P>,
    width: u32,
    height: u32,
}

impl<P: Pixel> Image<P> {
    /// Creates an image with every component zero.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, P::splat(P::Sample::default()))
    }

    /// Creates an image with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, pixel: P) -> Self {
        Self {
            data: vec![pixel; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Wraps existing row-major pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `data.len() != width * height`.
    pub fn from_data(width: u32, height: u32, data: Vec<P>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} pixels, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> P,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }

    /// Rectangle covering the whole image.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Returns `true` if the image has no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major pixel data.
    #[inline]
    pub fn data(&self) -> &[P] {
        &self.data
    }

    /// Mutable row-major pixel data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [P] {
        &mut self.data
    }

    /// Consumes the image and returns its pixel data.
    #[inline]
    pub fn into_data(self) -> Vec<P> {
        self.data
    }

    /// Pixel at `(x, y)`, `None` if outside the image.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<P> {
        if x < self.width && y < self.height {
            Some(self.data[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Sets every pixel to `pixel`.
    pub fn fill(&mut self, pixel: P) {
        self.data.fill(pixel);
    }

    /// Read view of a region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if `region` extends past the image.
    pub fn view(&self, region: Rect) -> Result<SubImage<'_, P>> {
        self.check_region(region)?;
        Ok(SubImage {
            data: &self.data,
            stride: self.width as usize,
            region,
        })
    }

    /// Write view of a region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if `region` extends past the image.
    pub fn view_mut(&mut self, region: Rect) -> Result<SubImageMut<'_, P>> {
        self.check_region(region)?;
        Ok(SubImageMut {
            data: &mut self.data,
            stride: self.width as usize,
            region,
        })
    }

    fn check_region(&self, region: Rect) -> Result<()> {
        if self.bounds().contains_rect(&region) {
            Ok(())
        } else {
            Err(Error::invalid_region(region, self.width, self.height))
        }
    }
}

impl<P: Pixel> ImageView for Image<P> {
    type Pixel = P;

    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn row(&self, y: u32) -> &[P] {
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }
}

impl<P: Pixel> ImageViewMut for Image<P> {
    #[inline]
    fn row_mut(&mut self, y: u32) -> &mut [P] {
        let start = y as usize * self.width as usize;
        &mut self.data[start..start + self.width as usize]
    }
}

impl<P: Pixel> fmt::Debug for Image<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("components", &P::COMPONENTS)
            .finish()
    }
}

/// Borrowed read-only region of an [`Image`].
///
/// Coordinates passed to [`ImageView`] methods are relative to the region
/// origin.
#[derive(Clone, Copy)]
pub struct SubImage<'a, P: Pixel> {
    data: &'a [P],
    stride: usize,
    region: Rect,
}

impl<P: Pixel> SubImage<'_, P> {
    /// Region of the parent image this view covers.
    #[inline]
    pub fn region(&self) -> Rect {
        self.region
    }
}

impl<P: Pixel> ImageView for SubImage<'_, P> {
    type Pixel = P;

    #[inline]
    fn width(&self) -> u32 {
        self.region.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.region.height
    }

    #[inline]
    fn row(&self, y: u32) -> &[P] {
        assert!(y < self.region.height, "row {y} outside region {}", self.region);
        let start = (self.region.y + y) as usize * self.stride + self.region.x as usize;
        &self.data[start..start + self.region.width as usize]
    }
}

impl<P: Pixel> fmt::Debug for SubImage<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubImage")
            .field("region", &self.region)
            .finish()
    }
}

/// Borrowed mutable region of an [`Image`].
pub struct SubImageMut<'a, P: Pixel> {
    data: &'a mut [P],
    stride: usize,
    region: Rect,
}

impl<P: Pixel> SubImageMut<'_, P> {
    /// Region of the parent image this view covers.
    #[inline]
    pub fn region(&self) -> Rect {
        self.region
    }

    #[inline]
    fn row_start(&self, y: u32) -> usize {
        assert!(y < self.region.height, "row {y} outside region {}", self.region);
        (self.region.y + y) as usize * self.stride + self.region.x as usize
    }
}

impl<P: Pixel> ImageView for SubImageMut<'_, P> {
    type Pixel = P;

    #[inline]
    fn width(&self) -> u32 {
        self.region.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.region.height
    }

    #[inline]
    fn row(&self, y: u32) -> &[P] {
        let start = self.row_start(y);
        &self.data[start..start + self.region.width as usize]
    }
}

impl<P: Pixel> ImageViewMut for SubImageMut<'_, P> {
    #[inline]
    fn row_mut(&mut self, y: u32) -> &mut [P] {
        let start = self.row_start(y);
        &mut self.data[start..start + self.region.width as usize]
    }
}

impl<P: Pixel> fmt::Debug for SubImageMut<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubImageMut")
            .field("region", &self.region)
            .finish()
    }
}

/// Writes `f(src)` into `dst` pixel by pixel.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] if the grids differ in size.
pub fn transform_image<S, D, F>(src: &S, dst: &mut D, mut f: F) -> Result<()>
where
    S: ImageView + ?Sized,
    D: ImageViewMut + ?Sized,
    F: FnMut(S::Pixel) -> D::Pixel,
{
    if src.dimensions() != dst.dimensions() {
        return Err(Error::dimension_mismatch(src.dimensions(), dst.dimensions()));
    }
    for y in 0..src.height() {
        let from = src.row(y);
        for (out, &px) in dst.row_mut(y).iter_mut().zip(from) {
            *out = f(px);
        }
    }
    Ok(())
}

/// Maps every component of `px` through `f`, keeping the component count.
///
/// ```rust
/// use impex_core::image::map_components;
///
/// let out: [u8; 3] = map_components([0.2f32, 0.4, 0.6], |v| (v * 10.0) as u8);
/// assert_eq!(out, [2, 4, 6]);
/// ```
#[inline]
pub fn map_components<P, Q, F>(px: P, mut f: F) -> Q
where
    P: Pixel,
    Q: Pixel,
    F: FnMut(P::Sample) -> Q::Sample,
{
    let mut out = Q::splat(Q::Sample::default());
    for i in 0..P::COMPONENTS.min(Q::COMPONENTS) {
        out.set_component(i, f(px.component(i)));
    }
    out
}
