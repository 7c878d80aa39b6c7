//! Selection session: one loaded document, one page, one selection.
//!
//! [`Session`] wires the pipeline together. Pointer events drive the
//! [`SelectionTracker`]; a committed rectangle goes either through the text
//! path (text query, record filter) or the image path (render, crop,
//! single-page PDF, sink). Every operation takes `&mut self`, so exports
//! cannot overlap.

use std::path::Path;

use pdfsnip_core::{
    CroppedImage, Display, ExtractionResult, Point, Rect, ScaleContext, SelectionTracker, Size,
    SnipError, SnipOptions, Stage, StageError, crop_bitmap, filter_text, to_document_space,
    to_text_query,
};
use pdfsnip_parse::DocumentSource;
use tracing::{debug, warn};

use crate::export::{
    ExportError, ExportOptions, cropped_pdf_artifact, png_artifact, text_artifact,
};
#[cfg(feature = "ocr-service")]
use crate::ocr::ServiceError;
use crate::pdf::Pdf;
use crate::sink::{ArtifactSink, SavedArtifact};

/// Pipeline state for one viewer.
#[derive(Debug)]
pub struct Session<S = Pdf> {
    options: SnipOptions,
    export_options: ExportOptions,
    tracker: SelectionTracker,
    source: Option<S>,
    page: usize,
    container: Option<Size>,
    last_result: Option<ExtractionResult>,
    fetched_text: Option<String>,
    status: Option<&'static str>,
}

impl<S> Default for Session<S> {
    fn default() -> Self {
        Self::new(SnipOptions::default())
    }
}

impl Session<Pdf> {
    /// Load PDF bytes, replacing any current document.
    ///
    /// # Errors
    ///
    /// A [`Stage::Load`] error if the bytes are not a PDF or fail to parse.
    /// The previous document stays loaded in that case.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), StageError> {
        let pdf = Pdf::open(bytes).map_err(|e| self.fail(Stage::Load, e))?;
        self.load(pdf);
        Ok(())
    }

    /// Load a PDF file, replacing any current document.
    ///
    /// # Errors
    ///
    /// As [`load_bytes`](Session::load_bytes), plus I/O failures.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), StageError> {
        let pdf = Pdf::open_file(path).map_err(|e| self.fail(Stage::Load, e))?;
        self.load(pdf);
        Ok(())
    }
}

impl<S> Session<S> {
    pub fn new(options: SnipOptions) -> Self {
        Self {
            tracker: SelectionTracker::new(options.min_selection),
            options,
            export_options: ExportOptions::default(),
            source: None,
            page: 0,
            container: None,
            last_result: None,
            fetched_text: None,
            status: None,
        }
    }

    pub fn with_export_options(mut self, export_options: ExportOptions) -> Self {
        self.export_options = export_options;
        self
    }

    /// Install a document. Resets the page, the selection and the last
    /// result.
    pub fn load(&mut self, source: S) {
        self.source = Some(source);
        self.page = 0;
        self.tracker.reset();
        self.last_result = None;
        self.fetched_text = None;
        self.status = None;
    }

    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    pub fn options(&self) -> &SnipOptions {
        &self.options
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Set the on-screen size of the page container.
    pub fn set_container(&mut self, size: Size) {
        self.container = Some(size);
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    pub fn pointer_down(&mut self, p: Point) {
        self.tracker.on_pointer_down(p);
    }

    pub fn pointer_move(&mut self, p: Point) {
        self.tracker.on_pointer_move(p);
    }

    /// End the drag. Returns the committed rectangle if it is large enough.
    pub fn pointer_up(&mut self) -> Option<Rect<Display>> {
        let committed = self.tracker.on_pointer_up();
        if let Some(rect) = committed {
            debug!(%rect, "selection committed");
        }
        committed
    }

    /// Latest extraction result. A new result replaces the previous one.
    pub fn last_result(&self) -> Option<&ExtractionResult> {
        self.last_result.as_ref()
    }

    /// Text returned by the recognition service for the last crop.
    pub fn fetched_text(&self) -> Option<&str> {
        self.fetched_text.as_deref()
    }

    /// User-facing status line: the last failure message, else fetched
    /// text, else the last text result (or the no-text sentinel).
    pub fn status(&self) -> Option<&str> {
        if let Some(msg) = self.status {
            return Some(msg);
        }
        if let Some(text) = self.fetched_text.as_deref() {
            return Some(text);
        }
        self.last_result
            .as_ref()
            .and_then(ExtractionResult::display_text)
    }

    /// Record the outcome of a recognition request for the last crop.
    ///
    /// # Errors
    ///
    /// A failed request is returned as a [`Stage::FetchText`] error and
    /// its message becomes the status line.
    #[cfg(feature = "ocr-service")]
    pub fn apply_fetched(
        &mut self,
        result: Result<String, ServiceError>,
    ) -> Result<&str, StageError<ServiceError>> {
        let text = result.map_err(|e| self.fail(Stage::FetchText, e))?;
        self.status = None;
        Ok(self.fetched_text.insert(text).as_str())
    }

    fn fail<E: std::fmt::Display>(&mut self, stage: Stage, err: E) -> StageError<E> {
        warn!(%stage, "{err}");
        self.status = Some(stage.user_message());
        StageError::new(stage, err)
    }
}

impl<S: DocumentSource> Session<S> {
    pub fn page_count(&self) -> usize {
        self.source.as_ref().map_or(0, |s| s.page_count())
    }

    /// Select a page, clamped to the document. Abandons any selection.
    pub fn set_page(&mut self, index: usize) {
        let last = self.page_count().saturating_sub(1);
        self.page = index.min(last);
        self.tracker.reset();
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    fn source_or_err(&self) -> Result<&S, SnipError> {
        self.source.as_ref().ok_or(SnipError::NoDocument)
    }

    /// Container size in display pixels; defaults to the page drawn at the
    /// display scale.
    fn container_size(&self) -> Result<Size, SnipError> {
        match self.container {
            Some(size) => Ok(size),
            None => Ok(self
                .source_or_err()?
                .page_viewport(self.page, self.options.display_scale)?),
        }
    }

    /// Text of the current page under a display-space selection.
    ///
    /// # Errors
    ///
    /// A [`Stage::ExtractText`] error if no document is loaded, the page
    /// cannot be read, or the container is degenerate. A selection without
    /// area fails with [`SnipError::EmptyRegion`].
    pub fn extract_text(&mut self, rect: Rect<Display>) -> Result<ExtractionResult, StageError> {
        let result = self
            .run_extract_text(rect)
            .map_err(|e| self.fail(Stage::ExtractText, e))?;
        self.status = None;
        self.fetched_text = None;
        self.last_result = Some(result.clone());
        Ok(result)
    }

    fn run_extract_text(&self, rect: Rect<Display>) -> Result<ExtractionResult, SnipError> {
        if rect.is_empty() {
            return Err(SnipError::EmptyRegion);
        }
        let source = self.source_or_err()?;
        let container = self.container_size()?;
        // Text anchors are in document units, so the query viewport is the
        // page at scale 1.
        let viewport = source.page_size(self.page)?;
        let query = to_text_query(rect, container, viewport, source.text_origin())?;
        debug!(page = self.page, %query, "text query");

        let records = source.text_records(self.page)?;
        Ok(filter_text(&records, &query))
    }

    /// Crop the current page under a display-space selection and save it
    /// as a single-page PDF.
    ///
    /// # Errors
    ///
    /// A [`Stage::Crop`] error if rendering, cropping, assembly or saving
    /// fails. A selection that misses the page fails with
    /// [`SnipError::EmptyRegion`] before anything is assembled.
    ///
    /// The selection is mapped through the same container as
    /// [`extract_text`](Session::extract_text), so both cover one page
    /// region.
    pub fn export_crop(
        &mut self,
        rect: Rect<Display>,
        sink: &mut dyn ArtifactSink,
    ) -> Result<SavedArtifact, StageError<ExportError>> {
        let image = self
            .run_crop(rect)
            .map_err(|e| self.fail(Stage::Crop, ExportError::from(e)))?;
        let saved = cropped_pdf_artifact(&image, &self.export_options)
            .and_then(|artifact| sink.save(&artifact))
            .map_err(|e| self.fail(Stage::Crop, e))?;

        self.status = None;
        self.fetched_text = None;
        self.last_result = Some(ExtractionResult::Image(image));
        Ok(saved)
    }

    fn run_crop(&self, rect: Rect<Display>) -> Result<CroppedImage, SnipError> {
        if rect.is_empty() {
            return Err(SnipError::EmptyRegion);
        }
        let source = self.source_or_err()?;
        let scales = ScaleContext::new(self.options.display_scale, self.options.raster_scale)?;
        let container = self.container_size()?;
        let page = source.page_size(self.page)?;
        let raster_rect = scales.document_to_raster(to_document_space(rect, container, page)?);
        debug!(page = self.page, %raster_rect, "crop region");

        let bitmap = source.render_page(self.page, scales.raster_scale())?;
        let cropped = crop_bitmap(&bitmap, &raster_rect)?;
        CroppedImage::encode(cropped)
    }

    /// Save the last text result, or text fetched for the last crop, as
    /// the word-processor artifact.
    ///
    /// # Errors
    ///
    /// A [`Stage::ExtractText`] error: [`ExportError::NothingToExport`]
    /// when there is no text, [`ExportError::Save`] if the sink fails.
    pub fn export_text(
        &mut self,
        sink: &mut dyn ArtifactSink,
    ) -> Result<SavedArtifact, StageError<ExportError>> {
        let text = self
            .last_result
            .as_ref()
            .and_then(ExtractionResult::text)
            .or(self.fetched_text.as_deref());
        let saved = match text {
            Some(text) => sink.save(&text_artifact(text, &self.export_options)),
            None => Err(ExportError::NothingToExport),
        };
        saved.map_err(|e| self.fail(Stage::ExtractText, e))
    }

    /// Save the last crop as PNG.
    ///
    /// # Errors
    ///
    /// A [`Stage::Crop`] error: [`ExportError::NothingToExport`] unless
    /// the last result is an image, [`ExportError::Save`] if the sink fails.
    pub fn export_png(
        &mut self,
        sink: &mut dyn ArtifactSink,
    ) -> Result<SavedArtifact, StageError<ExportError>> {
        let saved = match self.last_result.as_ref().and_then(ExtractionResult::image) {
            Some(image) => sink.save(&png_artifact(image, &self.export_options)),
            None => Err(ExportError::NothingToExport),
        };
        saved.map_err(|e| self.fail(Stage::Crop, e))
    }
}
