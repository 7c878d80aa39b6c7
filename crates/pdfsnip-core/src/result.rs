//! Extraction results produced once per committed selection.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::error::SnipError;

/// Text shown when a selection contains no text records.
pub const NO_TEXT_FOUND: &str = "No text found in the selected area";

/// A cropped bitmap together with its PNG encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct CroppedImage {
    bitmap: RgbaImage,
    png: Vec<u8>,
}

impl CroppedImage {
    /// Encode `bitmap` as PNG and wrap both.
    ///
    /// # Errors
    ///
    /// Returns [`SnipError::EncodeError`] if PNG encoding fails.
    pub fn encode(bitmap: RgbaImage) -> Result<Self, SnipError> {
        let mut png = Vec::new();
        bitmap.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(Self { bitmap, png })
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }

    /// PNG-encoded bytes.
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }
}

/// Outcome of one extraction. A later result replaces an earlier one.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    /// Text of the matched records.
    Text(String),
    /// The selection contained no text records.
    NoTextFound,
    /// A cropped raster of the selection.
    Image(CroppedImage),
}

impl ExtractionResult {
    /// Text for display: matched text, or the [`NO_TEXT_FOUND`] sentinel.
    ///
    /// Returns `None` for image results.
    pub fn display_text(&self) -> Option<&str> {
        match self {
            ExtractionResult::Text(text) => Some(text),
            ExtractionResult::NoTextFound => Some(NO_TEXT_FOUND),
            ExtractionResult::Image(_) => None,
        }
    }

    /// Matched text only; `None` for the sentinel and for images.
    pub fn text(&self) -> Option<&str> {
        match self {
            ExtractionResult::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&CroppedImage> {
        match self {
            ExtractionResult::Image(img) => Some(img),
            _ => None,
        }
    }
}
