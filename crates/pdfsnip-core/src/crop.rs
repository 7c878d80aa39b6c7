//! Cropping a rendered page bitmap to a raster-space selection.
//!
//! Raster rectangles are fractional; pixels are not. Each component
//! (`x`, `y`, `width`, `height`) is rounded independently with
//! round-half-up (`floor(v + 0.5)`), then the pixel rectangle is clipped
//! to the bitmap.

use image::RgbaImage;
use image::imageops;

use crate::error::SnipError;
use crate::geometry::{Raster, Rect};

/// Round half up: `2.5 -> 3`, `-2.5 -> -2`, `53.33 -> 53`.
pub fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

/// An integer pixel rectangle, possibly extending outside a bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// A pixel rectangle clipped to a bitmap; always non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClippedRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Round a raster rectangle to pixels.
    pub fn from_raster(rect: &Rect<Raster>) -> Self {
        Self {
            x: round_half_up(rect.x()),
            y: round_half_up(rect.y()),
            width: round_half_up(rect.width()),
            height: round_half_up(rect.height()),
        }
    }

    /// Intersect with `[0, width) x [0, height)`.
    ///
    /// Returns `None` if the intersection has zero area.
    pub fn clip(&self, width: u32, height: u32) -> Option<ClippedRect> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.x.saturating_add(self.width).min(i64::from(width));
        let y1 = self.y.saturating_add(self.height).min(i64::from(height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        // All four values are within 0..=u32::MAX after clamping.
        Some(ClippedRect {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// Copy the selected region of `bitmap` into a new bitmap of exactly the
/// clipped size.
///
/// # Errors
///
/// Returns [`SnipError::EmptyRegion`] if the region has zero area after
/// rounding and clipping, including regions entirely outside the bitmap.
pub fn crop_bitmap(bitmap: &RgbaImage, rect: &Rect<Raster>) -> Result<RgbaImage, SnipError> {
    let clipped = PixelRect::from_raster(rect)
        .clip(bitmap.width(), bitmap.height())
        .ok_or(SnipError::EmptyRegion)?;
    Ok(imageops::crop_imm(bitmap, clipped.x, clipped.y, clipped.width, clipped.height).to_image())
}
