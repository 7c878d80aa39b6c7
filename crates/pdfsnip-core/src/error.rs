//! Error types for pdfsnip.
//!
//! Provides [`SnipError`] for failures that stop a pipeline stage, and
//! [`Stage`] / [`StageError`] for attributing a failure to the user-facing
//! operation that raised it.

use std::fmt;

/// Fatal error types for the selection-to-content pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum SnipError {
    /// The supplied input is not a document this crate can open.
    InputRejected(String),
    /// A scale factor or ratio was zero, negative, or not finite.
    InvalidScale {
        /// Which factor was rejected (e.g., "raster_scale").
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A container or viewport had a non-positive dimension.
    InvalidDimensions(String),
    /// A crop region had no area after clipping to the bitmap.
    EmptyRegion,
    /// Requested page index is out of range.
    PageOutOfRange {
        /// The requested 0-based index.
        index: usize,
        /// Number of pages in the document.
        count: usize,
    },
    /// Error parsing document structure or content.
    ParseError(String),
    /// Error rendering a page to a bitmap.
    RenderError(String),
    /// Error encoding a bitmap.
    EncodeError(String),
    /// I/O error reading or writing bytes.
    IoError(String),
    /// An operation needed a loaded document.
    NoDocument,
}

impl fmt::Display for SnipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnipError::InputRejected(msg) => write!(f, "input rejected: {msg}"),
            SnipError::InvalidScale { name, value } => {
                write!(f, "invalid scale: {name} must be finite and > 0 (got {value})")
            }
            SnipError::InvalidDimensions(msg) => write!(f, "invalid dimensions: {msg}"),
            SnipError::EmptyRegion => write!(f, "selected region has zero area"),
            SnipError::PageOutOfRange { index, count } => {
                write!(f, "page index {index} out of range (0..{count})")
            }
            SnipError::ParseError(msg) => write!(f, "parse error: {msg}"),
            SnipError::RenderError(msg) => write!(f, "render error: {msg}"),
            SnipError::EncodeError(msg) => write!(f, "encode error: {msg}"),
            SnipError::IoError(msg) => write!(f, "I/O error: {msg}"),
            SnipError::NoDocument => write!(f, "no document loaded"),
        }
    }
}

impl std::error::Error for SnipError {}

impl From<std::io::Error> for SnipError {
    fn from(err: std::io::Error) -> Self {
        SnipError::IoError(err.to_string())
    }
}

impl From<image::ImageError> for SnipError {
    fn from(err: image::ImageError) -> Self {
        SnipError::EncodeError(err.to_string())
    }
}

/// The user-facing operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    /// Opening the supplied document.
    Load,
    /// Filtering the text layer by the selection.
    ExtractText,
    /// Rendering, cropping and assembling the output document.
    Crop,
    /// Calling the external text-recognition service.
    FetchText,
}

impl Stage {
    /// Status line shown to the user when this stage fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            Stage::Load => "Please upload a valid PDF file.",
            Stage::ExtractText => "Error extracting text from the selected area.",
            Stage::Crop => "Error cropping PDF.",
            Stage::FetchText => "Error fetching extracted text.",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Load => "load",
            Stage::ExtractText => "extract-text",
            Stage::Crop => "crop",
            Stage::FetchText => "fetch-text",
        })
    }
}

/// A failure tagged with the stage that raised it.
#[derive(Debug, Clone, PartialEq)]
pub struct StageError<E = SnipError> {
    pub stage: Stage,
    pub source: E,
}

impl<E> StageError<E> {
    pub fn new(stage: Stage, source: E) -> Self {
        Self { stage, source }
    }

    /// The per-stage message for display, without internal detail.
    pub fn user_message(&self) -> &'static str {
        self.stage.user_message()
    }
}

impl<E: fmt::Display> fmt::Display for StageError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.source)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for StageError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
