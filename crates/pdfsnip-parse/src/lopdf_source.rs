//! lopdf-based document source.
//!
//! Implements [`DocumentSource`] using the [lopdf](https://crates.io/crates/lopdf)
//! crate. Page space has its origin at the lower-left corner of the page box
//! (CropBox, falling back to MediaBox), so text anchors and raster pixels
//! share one frame.

use std::collections::HashMap;
use std::path::Path;

use pdfsnip_core::{RgbaImage, Size, TextOrigin, TextRecord};
use tracing::{debug, warn};

use crate::cmap::{ToUnicode, decode_simple};
use crate::error::BackendError;
use crate::handler::{ContentHandler, TextEvent};
use crate::interpreter::interpret_content_stream;
use crate::interpreter_state::Matrix;
use crate::raster::{PathCollector, render_paths};
use crate::source::DocumentSource;

/// PDF readers accept the header anywhere in the first kilobyte.
const HEADER_WINDOW: usize = 1024;

/// A parsed PDF document backed by lopdf.
pub struct LopdfSource {
    inner: lopdf::Document,
    /// Ordered page ObjectIds (indexed by 0-based page number).
    page_ids: Vec<lopdf::ObjectId>,
}

impl std::fmt::Debug for LopdfSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfSource")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// Whether `bytes` carry a `%PDF-` header.
pub fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

impl LopdfSource {
    /// Parse PDF bytes.
    ///
    /// # Errors
    ///
    /// [`BackendError::NotPdf`] when the header is missing,
    /// [`BackendError::Parse`] when lopdf rejects the document or it is
    /// encrypted.
    pub fn open(bytes: &[u8]) -> Result<Self, BackendError> {
        if !has_pdf_header(bytes) {
            return Err(BackendError::NotPdf("missing %PDF- header".to_string()));
        }

        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;
        if inner.is_encrypted() {
            return Err(BackendError::Parse(
                "encrypted documents are not supported".to_string(),
            ));
        }

        // get_pages returns BTreeMap<u32, ObjectId> with 1-based keys.
        let page_ids: Vec<lopdf::ObjectId> = inner.get_pages().values().copied().collect();
        debug!(pages = page_ids.len(), "opened PDF");

        Ok(Self { inner, page_ids })
    }

    /// Read and parse a PDF file.
    ///
    /// # Errors
    ///
    /// [`BackendError::Io`] if the file cannot be read, otherwise as
    /// [`open`](LopdfSource::open).
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let bytes = std::fs::read(path)?;
        Self::open(&bytes)
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    fn page_id(&self, index: usize) -> Result<lopdf::ObjectId, BackendError> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            BackendError::Core(pdfsnip_core::SnipError::PageOutOfRange {
                index,
                count: self.page_ids.len(),
            })
        })
    }

    /// Page box as `[x0, y0, x1, y1]`, normalized so `x0 <= x1`, `y0 <= y1`.
    fn page_box(&self, page_id: lopdf::ObjectId) -> Result<[f64; 4], BackendError> {
        let obj = match resolve_inherited(&self.inner, page_id, b"CropBox")? {
            Some(obj) => obj,
            None => resolve_inherited(&self.inner, page_id, b"MediaBox")?.ok_or_else(|| {
                BackendError::Parse("MediaBox not found on page or ancestors".into())
            })?,
        };
        let array = resolve_ref(&self.inner, obj)
            .as_array()
            .map_err(|e| BackendError::Parse(format!("page box is not an array: {e}")))?;
        if array.len() != 4 {
            return Err(BackendError::Parse(format!(
                "expected 4-element array for box, got {}",
                array.len()
            )));
        }
        let mut v = [0.0; 4];
        for (slot, item) in v.iter_mut().zip(array) {
            *slot = object_to_f64(resolve_ref(&self.inner, item))?;
        }
        Ok([v[0].min(v[2]), v[1].min(v[3]), v[0].max(v[2]), v[1].max(v[3])])
    }

    /// Decoded content, its resources, and the CTM moving the page box
    /// origin to `(0, 0)`.
    fn page_content(
        &self,
        index: usize,
    ) -> Result<(Vec<u8>, Option<&lopdf::Dictionary>, Matrix, Size), BackendError> {
        let page_id = self.page_id(index)?;
        let [x0, y0, x1, y1] = self.page_box(page_id)?;
        let page_dict = self
            .inner
            .get_object(page_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        let content = page_content_bytes(&self.inner, page_dict)?;
        let resources = resolve_inherited(&self.inner, page_id, b"Resources")?
            .and_then(|obj| resolve_ref(&self.inner, obj).as_dict().ok());

        Ok((
            content,
            resources,
            Matrix::translate(-x0, -y0),
            Size::new(x1 - x0, y1 - y0),
        ))
    }

    /// Load the ToUnicode map of a font resource, if it has a usable one.
    fn to_unicode(&self, resources: Option<&lopdf::Dictionary>, font: &str) -> Option<ToUnicode> {
        let fonts = resources?.get(b"Font").ok()?;
        let fonts = resolve_ref(&self.inner, fonts).as_dict().ok()?;
        let font_dict = resolve_ref(&self.inner, fonts.get(font.as_bytes()).ok()?)
            .as_dict()
            .ok()?;
        let stream = resolve_ref(&self.inner, font_dict.get(b"ToUnicode").ok()?)
            .as_stream()
            .ok()?;
        let data = decode_stream(stream)
            .map_err(|e| warn!(font, "unreadable ToUnicode stream: {e}"))
            .ok()?;
        match ToUnicode::parse(&data) {
            Ok(cmap) if !cmap.is_empty() => Some(cmap),
            Ok(_) => None,
            Err(e) => {
                warn!(font, "malformed ToUnicode CMap: {e}");
                None
            }
        }
    }
}

/// Collects shown text for a page.
#[derive(Default)]
struct TextCollector {
    events: Vec<TextEvent>,
}

impl ContentHandler for TextCollector {
    fn on_text(&mut self, event: TextEvent) {
        self.events.push(event);
    }
}

impl DocumentSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_size(&self, index: usize) -> Result<Size, BackendError> {
        let [x0, y0, x1, y1] = self.page_box(self.page_id(index)?)?;
        Ok(Size::new(x1 - x0, y1 - y0))
    }

    fn text_records(&self, index: usize) -> Result<Vec<TextRecord>, BackendError> {
        let (content, resources, ctm, _) = self.page_content(index)?;
        let mut collector = TextCollector::default();
        interpret_content_stream(&content, ctm, &mut collector)?;

        let mut cmaps: HashMap<String, Option<ToUnicode>> = HashMap::new();
        let mut records = Vec::with_capacity(collector.events.len());
        for event in collector.events {
            let cmap = match &event.font {
                Some(font) => cmaps
                    .entry(font.clone())
                    .or_insert_with(|| self.to_unicode(resources, font))
                    .as_ref(),
                None => None,
            };
            let text = match cmap {
                Some(cmap) => cmap.decode(&event.bytes),
                None => decode_simple(&event.bytes),
            };
            if text.trim().is_empty() {
                continue;
            }
            records.push(TextRecord {
                text,
                anchor: event.origin,
            });
        }

        debug!(page = index, records = records.len(), "text records");
        Ok(records)
    }

    fn text_origin(&self) -> TextOrigin {
        TextOrigin::BottomLeft
    }

    fn render_page(&self, index: usize, scale: f64) -> Result<RgbaImage, BackendError> {
        let (content, _, ctm, size) = self.page_content(index)?;
        let mut collector = PathCollector::default();
        interpret_content_stream(&content, ctm, &mut collector)?;
        debug!(page = index, scale, paths = collector.paths.len(), "rendering page");
        render_paths(size, scale, &collector.paths)
    }
}

/// Convert a lopdf numeric object (Integer or Real) to f64.
fn object_to_f64(obj: &lopdf::Object) -> Result<f64, BackendError> {
    match obj {
        lopdf::Object::Integer(i) => Ok(*i as f64),
        lopdf::Object::Real(f) => Ok(f64::from(*f)),
        _ => Err(BackendError::Parse(format!("expected number, got {obj:?}"))),
    }
}

fn resolve_ref<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: lopdf::ObjectId,
    key: &[u8],
) -> Result<Option<&'a lopdf::Object>, BackendError> {
    let mut current_id = page_id;
    // Bounded walk: a malformed tree may loop.
    for _ in 0..64 {
        let dict = doc
            .get_object(current_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent_obj) => {
                current_id = parent_obj
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
    Err(BackendError::Parse("page tree too deep or cyclic".to_string()))
}

/// Get the content stream bytes from a page dictionary.
///
/// Handles both single stream references and arrays of stream references.
fn page_content_bytes(
    doc: &lopdf::Document,
    page_dict: &lopdf::Dictionary,
) -> Result<Vec<u8>, BackendError> {
    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(Vec::new());
    };

    match resolve_ref(doc, contents) {
        lopdf::Object::Stream(stream) => decode_stream(stream),
        lopdf::Object::Array(items) => {
            let mut content = Vec::new();
            for item in items {
                let stream = resolve_ref(doc, item).as_stream().map_err(|e| {
                    BackendError::Parse(format!("/Contents array item is not a stream: {e}"))
                })?;
                let bytes = decode_stream(stream)?;
                if !content.is_empty() {
                    content.push(b' ');
                }
                content.extend_from_slice(&bytes);
            }
            Ok(content)
        }
        _ => Err(BackendError::Parse(
            "/Contents is not a stream or array".to_string(),
        )),
    }
}

/// Decode a stream, decompressing if needed.
fn decode_stream(stream: &lopdf::Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}
