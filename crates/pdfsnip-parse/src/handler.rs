//! Content handler callback trait for content stream interpretation.
//!
//! The interpreter reports shown text and painted paths through
//! [`ContentHandler`]. Coordinates in events are PDF user space after the
//! current transformation matrix: bottom-left origin, y up.

use pdfsnip_core::Point;

/// One segment of a painted path, in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    /// Cubic Bézier: two control points, then the end point.
    CurveTo(Point, Point, Point),
    ClosePath,
}

/// The type of paint operation applied to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOp {
    Stroke,
    Fill,
    FillAndStroke,
}

/// Fill rule for filled paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZeroWinding,
    EvenOdd,
}

/// An sRGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);

    pub fn gray(g: f32) -> Self {
        Rgb(g, g, g)
    }

    /// Naive CMYK conversion, no color management.
    pub fn from_cmyk(c: f32, m: f32, y: f32, k: f32) -> Self {
        Rgb((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k))
    }

    /// Interpret 1, 3 or 4 components as gray, RGB or CMYK.
    pub fn from_components(components: &[f64]) -> Option<Self> {
        let c: Vec<f32> = components.iter().map(|&v| v.clamp(0.0, 1.0) as f32).collect();
        match c.as_slice() {
            [g] => Some(Rgb::gray(*g)),
            [r, g, b] => Some(Rgb(*r, *g, *b)),
            [c, m, y, k] => Some(Rgb::from_cmyk(*c, *m, *y, *k)),
            _ => None,
        }
    }
}

/// A text-showing operation (`Tj`, `TJ`, `'`, `"`).
#[derive(Debug, Clone)]
pub struct TextEvent {
    /// Font resource name selected by `Tf` (e.g., `"F1"`), if any.
    pub font: Option<String>,
    pub font_size: f64,
    /// Raw shown bytes; for `TJ` the string pieces are concatenated.
    pub bytes: Vec<u8>,
    /// Text rendering origin in page space.
    pub origin: Point,
}

/// A painted path.
#[derive(Debug, Clone)]
pub struct PathEvent {
    pub segments: Vec<PathSegment>,
    pub paint_op: PaintOp,
    pub fill_rule: FillRule,
    /// Line width in page units, after the CTM.
    pub line_width: f64,
    pub stroke_color: Rgb,
    pub fill_color: Rgb,
}

/// Callback handler for content stream interpretation.
///
/// Both methods default to no-ops so handlers subscribe only to what they
/// need: the text collector ignores paths, the rasterizer ignores text.
pub trait ContentHandler {
    fn on_text(&mut self, _event: TextEvent) {}

    fn on_path(&mut self, _event: PathEvent) {}
}
