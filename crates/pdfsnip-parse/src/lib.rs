//! pdfsnip-parse: document source for the pdfsnip selection pipeline.
//!
//! Parses PDFs with lopdf, interprets page content streams to produce text
//! records and painted paths, and rasterizes pages with tiny-skia. It
//! depends on pdfsnip-core for shared data types.

pub mod cmap;
pub mod error;
pub mod handler;
pub mod interpreter;
pub mod interpreter_state;
pub mod lopdf_source;
pub mod raster;
pub mod source;
pub mod tokenizer;

pub use error::BackendError;
pub use handler::{ContentHandler, PathEvent, TextEvent};
pub use interpreter::interpret_content_stream;
pub use lopdf_source::{LopdfSource, has_pdf_header};
pub use pdfsnip_core;
pub use source::DocumentSource;
