//! Coordinate transforms between display, document and raster space.
//!
//! All functions are pure. Output rectangles are never clamped to page
//! bounds; consumers clip.
//!
//! Conventions:
//! - display and raster space are top-left origin, y down;
//! - document space uses intrinsic page units; the vertical origin of a text
//!   layer is declared by its [`TextOrigin`].

use crate::error::SnipError;
use crate::geometry::{Display, Document, Raster, Rect, Size};

/// Vertical origin of a document's text-layer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextOrigin {
    /// y grows downward from the top edge of the page.
    TopLeft,
    /// y grows upward from the bottom edge of the page (PDF user space).
    #[default]
    BottomLeft,
}

/// The two independent scale factors relating page units to the screen and
/// to the off-screen raster.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaleContext {
    display_scale: f64,
    raster_scale: f64,
}

impl ScaleContext {
    /// Create a scale context.
    ///
    /// # Errors
    ///
    /// Returns [`SnipError::InvalidScale`] if either factor is not finite
    /// and strictly positive.
    pub fn new(display_scale: f64, raster_scale: f64) -> Result<Self, SnipError> {
        check_scale("display_scale", display_scale)?;
        check_scale("raster_scale", raster_scale)?;
        Ok(Self {
            display_scale,
            raster_scale,
        })
    }

    pub fn display_scale(&self) -> f64 {
        self.display_scale
    }

    pub fn raster_scale(&self) -> f64 {
        self.raster_scale
    }

    /// `raster_scale / display_scale`: multiply display coordinates by this
    /// to get raster coordinates.
    pub fn ratio(&self) -> f64 {
        self.raster_scale / self.display_scale
    }

    pub fn display_to_raster(&self, rect: Rect<Display>) -> Rect<Raster> {
        let r = self.ratio();
        rect.scaled(r, r).cast()
    }

    pub fn raster_to_display(&self, rect: Rect<Raster>) -> Rect<Display> {
        let r = self.ratio();
        rect.scaled(1.0 / r, 1.0 / r).cast()
    }

    /// Divide display coordinates by the display scale.
    pub fn display_to_document(&self, rect: Rect<Display>) -> Rect<Document> {
        let s = 1.0 / self.display_scale;
        rect.scaled(s, s).cast()
    }

    /// Divide raster coordinates by the raster scale.
    pub fn raster_to_document(&self, rect: Rect<Raster>) -> Rect<Document> {
        let s = 1.0 / self.raster_scale;
        rect.scaled(s, s).cast()
    }

    /// Multiply document coordinates by the raster scale.
    pub fn document_to_raster(&self, rect: Rect<Document>) -> Rect<Raster> {
        rect.scaled(self.raster_scale, self.raster_scale).cast()
    }
}

fn check_scale(name: &'static str, value: f64) -> Result<(), SnipError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SnipError::InvalidScale { name, value })
    }
}

fn check_size(what: &str, size: Size) -> Result<(), SnipError> {
    if size.is_positive() {
        Ok(())
    } else {
        Err(SnipError::InvalidDimensions(format!(
            "{what} must be positive (got {}x{})",
            size.width, size.height
        )))
    }
}

/// Per-axis factors from container pixels to viewport units.
fn container_factors(container: Size, viewport: Size) -> Result<(f64, f64), SnipError> {
    check_size("container", container)?;
    check_size("viewport", viewport)?;
    Ok((
        viewport.width / container.width,
        viewport.height / container.height,
    ))
}

/// Map a display rectangle into document space.
///
/// Scales by `viewport / container` on each axis: the container may be
/// shown at a different pixel size than the renderer's viewport units.
/// The vertical origin is unchanged (top-left).
///
/// # Errors
///
/// Returns [`SnipError::InvalidDimensions`] if either size is not positive.
pub fn to_document_space(
    rect: Rect<Display>,
    container: Size,
    viewport: Size,
) -> Result<Rect<Document>, SnipError> {
    let (sx, sy) = container_factors(container, viewport)?;
    Ok(rect.scaled(sx, sy).cast())
}

/// Map a display rectangle into a text-layer query rectangle.
///
/// Same scaling as [`to_document_space`]. When the text layer has a
/// bottom-left origin the rectangle is flipped: its display bottom edge
/// (`y + height`) becomes the query's `y`, measured up from the page
/// bottom as `viewport.height - (y + height) * sy`.
///
/// # Errors
///
/// Returns [`SnipError::InvalidDimensions`] if either size is not positive.
pub fn to_text_query(
    rect: Rect<Display>,
    container: Size,
    viewport: Size,
    origin: TextOrigin,
) -> Result<Rect<Document>, SnipError> {
    let doc = to_document_space(rect, container, viewport)?;
    match origin {
        TextOrigin::TopLeft => Ok(doc),
        TextOrigin::BottomLeft => Ok(Rect::new(
            doc.x(),
            viewport.height - doc.bottom(),
            doc.width(),
            doc.height(),
        )),
    }
}

/// Map a display rectangle into raster space with `ratio = raster / display`.
///
/// # Errors
///
/// Returns [`SnipError::InvalidScale`] unless `ratio` is finite and > 0.
pub fn to_raster_space(rect: Rect<Display>, ratio: f64) -> Result<Rect<Raster>, SnipError> {
    check_scale("ratio", ratio)?;
    Ok(rect.scaled(ratio, ratio).cast())
}

/// Inverse of [`to_raster_space`].
///
/// # Errors
///
/// Returns [`SnipError::InvalidScale`] unless `ratio` is finite and > 0.
pub fn to_display_space(rect: Rect<Raster>, ratio: f64) -> Result<Rect<Display>, SnipError> {
    check_scale("ratio", ratio)?;
    Ok(rect.scaled(1.0 / ratio, 1.0 / ratio).cast())
}
