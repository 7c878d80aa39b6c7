//! Document source trait.
//!
//! Defines the [`DocumentSource`] trait: everything the selection pipeline
//! needs from a parsed document. Page indices are 0-based.

use pdfsnip_core::{RgbaImage, Size, TextOrigin, TextRecord};

use crate::error::BackendError;

/// A parsed document that can report page geometry, text and pixels.
///
/// # Usage
///
/// ```ignore
/// let source = LopdfSource::open(bytes)?;
/// let viewport = source.page_viewport(0, 1.5)?;
/// let records = source.text_records(0)?;
/// let bitmap = source.render_page(0, 4.0)?;
/// ```
pub trait DocumentSource {
    fn page_count(&self) -> usize;

    /// Page size in document units (scale 1).
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the page has no
    /// usable media box.
    fn page_size(&self, index: usize) -> Result<Size, BackendError>;

    /// Page size at `scale`: the dimensions a renderer produces for it.
    ///
    /// # Errors
    ///
    /// Same as [`page_size`](DocumentSource::page_size).
    fn page_viewport(&self, index: usize, scale: f64) -> Result<Size, BackendError> {
        let size = self.page_size(index)?;
        Ok(Size::new(size.width * scale, size.height * scale))
    }

    /// Text records of a page in parser order, anchors in document space.
    ///
    /// # Errors
    ///
    /// Returns an error if the page content cannot be read.
    fn text_records(&self, index: usize) -> Result<Vec<TextRecord>, BackendError>;

    /// Vertical origin of the anchors returned by
    /// [`text_records`](DocumentSource::text_records).
    fn text_origin(&self) -> TextOrigin;

    /// Rasterize a page at `scale`: the bitmap is `ceil(width * scale)` by
    /// `ceil(height * scale)` pixels with a top-left origin.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Render`] if the page cannot be drawn.
    fn render_page(&self, index: usize, scale: f64) -> Result<RgbaImage, BackendError>;
}
