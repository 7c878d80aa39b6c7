//! pdfsnip: select a region of a PDF page and export what is inside it.
//!
//! This is the public API facade crate. It re-exports types from
//! pdfsnip-core and uses pdfsnip-parse for PDF reading and rendering.
//!
//! # Architecture
//!
//! - **pdfsnip-core**: selection tracking, coordinate transforms, text
//!   filtering and bitmap cropping
//! - **pdfsnip-parse**: PDF parsing, content stream interpretation and page
//!   rasterization
//! - **pdfsnip** (this crate): the [`Pdf`] handle, the [`Session`]
//!   orchestrator, artifact assembly and sinks, and the optional
//!   text-recognition client (`ocr-service` feature)
//!
//! # Example
//!
//! ```ignore
//! let mut session: Session = Session::default();
//! session.load_file("invoice.pdf")?;
//! session.pointer_down(Point::new(100.0, 100.0));
//! session.pointer_move(Point::new(150.0, 150.0));
//! if let Some(rect) = session.pointer_up() {
//!     let mut sink = DirectorySink::new("out");
//!     session.export_crop(rect, &mut sink)?;
//! }
//! ```

pub mod export;
#[cfg(feature = "ocr-service")]
pub mod ocr;
mod pdf;
pub mod session;
pub mod sink;

pub use export::{
    Artifact, ExportError, ExportOptions, cropped_pdf_artifact, png_artifact, text_artifact,
};
#[cfg(feature = "ocr-service")]
pub use ocr::{OcrClient, ServiceConfig, ServiceError};
pub use pdf::Pdf;
pub use pdfsnip_core::{
    CroppedImage, Display, Document, ExtractionResult, NO_TEXT_FOUND, Point, Raster, Rect,
    RgbaImage, ScaleContext, SelectionState, SelectionTracker, Size, SnipError, SnipOptions,
    Stage, StageError, TextOrigin, TextRecord, crop_bitmap, filter_text, to_document_space,
    to_raster_space, to_text_query,
};
pub use pdfsnip_parse::DocumentSource;
pub use session::Session;
pub use sink::{ArtifactSink, DirectorySink, MemorySink, SavedArtifact};

pub use pdfsnip_core;
pub use pdfsnip_parse;
