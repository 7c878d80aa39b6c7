//! pdfsnip-core: Backend-independent types and algorithms.
//!
//! This crate provides the selection-to-content pipeline pieces used by
//! pdfsnip: space-tagged rectangles, the pointer-drag [`SelectionTracker`],
//! coordinate transforms between display, document and raster space, text
//! record filtering, and bitmap cropping. It knows nothing about how a
//! document is parsed or rendered.

pub mod crop;
pub mod error;
pub mod geometry;
pub mod options;
pub mod result;
pub mod selection;
pub mod text;
pub mod transform;

pub use crop::{ClippedRect, PixelRect, crop_bitmap, round_half_up};
pub use error::{SnipError, Stage, StageError};
pub use geometry::{Display, Document, Point, Raster, Rect, Size, Space};
pub use options::SnipOptions;
pub use result::{CroppedImage, ExtractionResult, NO_TEXT_FOUND};
pub use selection::{SelectionState, SelectionTracker};
pub use text::{TextRecord, filter_text, records_in_rect};
pub use transform::{
    ScaleContext, TextOrigin, to_display_space, to_document_space, to_raster_space, to_text_query,
};

/// Re-exported so callers can name bitmap types without a direct dependency.
pub use image::RgbaImage;
