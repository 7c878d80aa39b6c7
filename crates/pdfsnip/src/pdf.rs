//! Top-level PDF document type.

use std::path::Path;

use pdfsnip_core::{
    CroppedImage, Document, ExtractionResult, Raster, Rect, RgbaImage, Size, SnipError,
    TextOrigin, TextRecord, crop_bitmap, filter_text,
};
use pdfsnip_parse::{BackendError, DocumentSource, LopdfSource};

/// A PDF document opened for region extraction.
///
/// # Example
///
/// ```ignore
/// let pdf = Pdf::open(&bytes)?;
/// let query = Rect::new(50.0, 50.0, 200.0, 100.0);
/// let result = pdf.extract_text(0, &query)?;
/// ```
#[derive(Debug)]
pub struct Pdf {
    source: LopdfSource,
}

impl Pdf {
    /// Parse PDF bytes.
    ///
    /// # Errors
    ///
    /// [`SnipError::InputRejected`] if the bytes lack a PDF header,
    /// [`SnipError::ParseError`] if the document cannot be parsed.
    pub fn open(bytes: &[u8]) -> Result<Self, SnipError> {
        Ok(Self {
            source: LopdfSource::open(bytes)?,
        })
    }

    /// Read and parse a PDF file.
    ///
    /// # Errors
    ///
    /// [`SnipError::IoError`] if the file cannot be read, otherwise as
    /// [`open`](Pdf::open).
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, SnipError> {
        Ok(Self {
            source: LopdfSource::open_file(path)?,
        })
    }

    pub fn page_count(&self) -> usize {
        self.source.page_count()
    }

    /// Access the lopdf-backed source.
    pub fn source(&self) -> &LopdfSource {
        &self.source
    }

    /// Text of the records whose anchors fall in `rect` (document space,
    /// bottom-left origin).
    ///
    /// # Errors
    ///
    /// [`SnipError::EmptyRegion`] if `rect` has no area; otherwise an
    /// error if the page is out of range or its content cannot be read.
    pub fn extract_text(
        &self,
        page: usize,
        rect: &Rect<Document>,
    ) -> Result<ExtractionResult, SnipError> {
        if rect.is_empty() {
            return Err(SnipError::EmptyRegion);
        }
        let records = self.source.text_records(page)?;
        Ok(filter_text(&records, rect))
    }

    /// Render `page` at `raster_scale` and crop `rect` out of it.
    ///
    /// # Errors
    ///
    /// [`SnipError::RenderError`] if rendering fails,
    /// [`SnipError::EmptyRegion`] if the rectangle misses the page.
    pub fn crop(
        &self,
        page: usize,
        rect: &Rect<Raster>,
        raster_scale: f64,
    ) -> Result<CroppedImage, SnipError> {
        let bitmap = self.source.render_page(page, raster_scale)?;
        CroppedImage::encode(crop_bitmap(&bitmap, rect)?)
    }
}

impl DocumentSource for Pdf {
    fn page_count(&self) -> usize {
        self.source.page_count()
    }

    fn page_size(&self, index: usize) -> Result<Size, BackendError> {
        self.source.page_size(index)
    }

    fn text_records(&self, index: usize) -> Result<Vec<TextRecord>, BackendError> {
        self.source.text_records(index)
    }

    fn text_origin(&self) -> TextOrigin {
        self.source.text_origin()
    }

    fn render_page(&self, index: usize, scale: f64) -> Result<RgbaImage, BackendError> {
        self.source.render_page(index, scale)
    }
}
