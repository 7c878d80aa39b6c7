//! Export assembly: turns extraction results into downloadable artifacts.
//!
//! The text path wraps extracted text as a word-processor document. The
//! image path re-encodes a cropped bitmap as JPEG and places it on the only
//! page of a new PDF whose page size equals the bitmap's pixel dimensions.

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use pdfsnip_core::{CroppedImage, SnipError};
use thiserror::Error;
use tracing::debug;

/// MIME type of the extracted-text artifact.
pub const TEXT_MIME: &str = "application/msword";
/// MIME type of the cropped single-page PDF.
pub const PDF_MIME: &str = "application/pdf";
/// MIME type of the PNG crop.
pub const PNG_MIME: &str = "image/png";

/// Artifact names and encoder settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportOptions {
    /// Filename of the extracted-text artifact. Default: `extracted_text.doc`.
    pub text_filename: String,
    /// Filename of the cropped PDF. Default: `cropped_hd.pdf`.
    pub pdf_filename: String,
    /// Filename of the PNG crop. Default: `cropped-image.png`.
    pub png_filename: String,
    /// JPEG quality (1-100) for the image embedded in the PDF. Default: 100.
    pub jpeg_quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            text_filename: "extracted_text.doc".to_string(),
            pdf_filename: "cropped_hd.pdf".to_string(),
            png_filename: "cropped-image.png".to_string(),
            jpeg_quality: 100,
        }
    }
}

/// A named, typed byte blob ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Errors raised while assembling or saving artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A pipeline stage before assembly failed.
    #[error(transparent)]
    Snip(#[from] SnipError),

    /// JPEG encoding of the cropped bitmap failed.
    #[error("JPEG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// Serializing the output PDF failed.
    #[error("PDF write failed: {0}")]
    Write(String),

    /// The sink could not store the artifact.
    #[error("saving {filename} failed: {source}")]
    Save {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    /// There is no text result to export.
    #[error("no extracted text to export")]
    NothingToExport,
}

/// Wrap extracted text as the word-processor artifact.
pub fn text_artifact(text: &str, options: &ExportOptions) -> Artifact {
    Artifact {
        filename: options.text_filename.clone(),
        mime_type: TEXT_MIME,
        bytes: text.as_bytes().to_vec(),
    }
}

/// The PNG encoding of a crop as an artifact.
pub fn png_artifact(image: &CroppedImage, options: &ExportOptions) -> Artifact {
    Artifact {
        filename: options.png_filename.clone(),
        mime_type: PNG_MIME,
        bytes: image.png_bytes().to_vec(),
    }
}

/// Encode the crop as RGB JPEG.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the encoder fails.
pub fn encode_jpeg(image: &CroppedImage, quality: u8) -> Result<Vec<u8>, ExportError> {
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgba8(image.bitmap().clone()).to_rgb8();
    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)?;
    Ok(jpeg)
}

/// Build a one-page PDF showing the crop at its pixel size.
///
/// The page's MediaBox is `[0 0 width height]` and the JPEG is drawn to
/// fill it exactly, so one pixel maps to one PDF unit.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if JPEG encoding fails and
/// [`ExportError::Write`] if the PDF cannot be serialized.
pub fn cropped_pdf_artifact(
    image: &CroppedImage,
    options: &ExportOptions,
) -> Result<Artifact, ExportError> {
    let jpeg = encode_jpeg(image, options.jpeg_quality)?;
    let (width, height) = (i64::from(image.width()), i64::from(image.height()));

    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
            "Filter" => "DCTDecode",
        },
        jpeg,
    ));

    let content = format!("q {width} 0 0 {height} 0 0 cm /Im0 Do Q");
    let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), content.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Write(e.to_string()))?;
    debug!(width, height, bytes = bytes.len(), "assembled cropped PDF");

    Ok(Artifact {
        filename: options.pdf_filename.clone(),
        mime_type: PDF_MIME,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn crop(width: u32, height: u32) -> CroppedImage {
        CroppedImage::encode(RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255])))
            .unwrap()
    }

    #[test]
    fn default_options() {
        let o = ExportOptions::default();
        assert_eq!(o.text_filename, "extracted_text.doc");
        assert_eq!(o.pdf_filename, "cropped_hd.pdf");
        assert_eq!(o.png_filename, "cropped-image.png");
        assert_eq!(o.jpeg_quality, 100);
    }

    #[test]
    fn text_artifact_is_utf8_msword() {
        let a = text_artifact("Total: 42.00 €", &ExportOptions::default());
        assert_eq!(a.filename, "extracted_text.doc");
        assert_eq!(a.mime_type, "application/msword");
        assert_eq!(a.bytes, "Total: 42.00 €".as_bytes());
    }

    #[test]
    fn png_artifact_carries_png_bytes() {
        let img = crop(3, 2);
        let a = png_artifact(&img, &ExportOptions::default());
        assert_eq!(a.mime_type, "image/png");
        assert!(a.bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn jpeg_has_soi_marker_and_size() {
        let jpeg = encode_jpeg(&crop(8, 4), 100).unwrap();
        assert!(jpeg.starts_with(&[0xFF, 0xD8]));
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
    }

    #[test]
    fn pdf_page_matches_pixel_size() {
        let artifact = cropped_pdf_artifact(&crop(53, 53), &ExportOptions::default()).unwrap();
        assert_eq!(artifact.filename, "cropped_hd.pdf");
        assert_eq!(artifact.mime_type, "application/pdf");

        let doc = Document::load_mem(&artifact.bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page = doc
            .get_object(*pages.values().next().unwrap())
            .unwrap()
            .as_dict()
            .unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let dims: Vec<i64> = media_box.iter().map(|o| o.as_i64().unwrap()).collect();
        assert_eq!(dims, vec![0, 0, 53, 53]);
    }

    #[test]
    fn pdf_embeds_dct_image_at_full_page() {
        let artifact = cropped_pdf_artifact(&crop(40, 10), &ExportOptions::default()).unwrap();
        let doc = Document::load_mem(&artifact.bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();

        let content = doc.get_page_content(page_id).unwrap();
        assert_eq!(content, b"q 40 0 0 10 0 0 cm /Im0 Do Q");

        let image = doc
            .objects
            .values()
            .filter_map(|o| o.as_stream().ok())
            .find(|s| {
                s.dict.get(b"Subtype").and_then(|v| v.as_name()).ok() == Some(b"Image".as_slice())
            })
            .expect("image XObject");
        assert_eq!(image.dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 40);
        assert_eq!(image.dict.get(b"Height").unwrap().as_i64().unwrap(), 10);
        assert!(image.content.starts_with(&[0xFF, 0xD8]));
    }

    #[test]
    fn custom_filenames_are_used() {
        let options = ExportOptions {
            pdf_filename: "snip.pdf".into(),
            ..ExportOptions::default()
        };
        let artifact = cropped_pdf_artifact(&crop(2, 2), &options).unwrap();
        assert_eq!(artifact.filename, "snip.pdf");
    }
}
