//! Error types for the document source layer.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`BackendError`]
//! that wraps backend-specific errors and converts them to [`SnipError`].

use pdfsnip_core::SnipError;
use thiserror::Error;

/// Error type for document source operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The bytes are not a PDF document.
    #[error("not a PDF document: {0}")]
    NotPdf(String),

    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error during content stream interpretation.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// Error while rasterizing a page.
    #[error("render error: {0}")]
    Render(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] SnipError),
}

impl From<BackendError> for SnipError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotPdf(msg) => SnipError::InputRejected(msg),
            BackendError::Parse(msg) => SnipError::ParseError(msg),
            BackendError::Io(e) => SnipError::IoError(e.to_string()),
            BackendError::Interpreter(msg) => SnipError::ParseError(msg),
            BackendError::Render(msg) => SnipError::RenderError(msg),
            BackendError::Core(e) => e,
        }
    }
}
