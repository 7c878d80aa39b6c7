//! Page rasterization with tiny-skia.
//!
//! Painted paths are drawn onto a white pixmap. Glyphs are not rendered.

use pdfsnip_core::{RgbaImage, Size};
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::error::BackendError;
use crate::handler::{ContentHandler, FillRule, PaintOp, PathEvent, PathSegment, Rgb};

/// Collects painted paths for rasterization.
#[derive(Debug, Default)]
pub struct PathCollector {
    pub paths: Vec<PathEvent>,
}

impl ContentHandler for PathCollector {
    fn on_path(&mut self, event: PathEvent) {
        self.paths.push(event);
    }
}

/// Pixel dimensions of a page rendered at `scale`.
///
/// # Errors
///
/// Returns [`BackendError::Render`] if the scale is not finite and positive
/// or the result has no pixels.
pub fn raster_dimensions(page: Size, scale: f64) -> Result<(u32, u32), BackendError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(BackendError::Render(format!("invalid render scale {scale}")));
    }
    let w = (page.width * scale).ceil();
    let h = (page.height * scale).ceil();
    if !(w >= 1.0 && h >= 1.0 && w <= f64::from(u32::MAX) && h <= f64::from(u32::MAX)) {
        return Err(BackendError::Render(format!(
            "page of {}x{} at scale {scale} has no pixels",
            page.width, page.height
        )));
    }
    Ok((w as u32, h as u32))
}

/// Draw `paths` (page space, bottom-left origin) into a bitmap of
/// [`raster_dimensions`].
///
/// # Errors
///
/// Returns [`BackendError::Render`] if the pixmap cannot be allocated.
pub fn render_paths(page: Size, scale: f64, paths: &[PathEvent]) -> Result<RgbaImage, BackendError> {
    let (width, height) = raster_dimensions(page, scale)?;
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        BackendError::Render(format!("cannot allocate {width}x{height} pixmap"))
    })?;
    pixmap.fill(Color::WHITE);

    // Flip y and scale: page (x, y) -> pixel (x·s, (h - y)·s).
    let s = scale as f32;
    let transform = Transform::from_row(s, 0.0, 0.0, -s, 0.0, (page.height * scale) as f32);

    for event in paths {
        let Some(path) = build_path(&event.segments) else {
            continue;
        };
        if matches!(event.paint_op, PaintOp::Fill | PaintOp::FillAndStroke) {
            let rule = match event.fill_rule {
                FillRule::NonZeroWinding => tiny_skia::FillRule::Winding,
                FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
            };
            pixmap.fill_path(&path, &paint(event.fill_color), rule, transform, None);
        }
        if matches!(event.paint_op, PaintOp::Stroke | PaintOp::FillAndStroke) {
            let stroke = Stroke {
                // Zero width means the thinnest visible line.
                width: (event.line_width as f32).max(1.0 / s),
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint(event.stroke_color), &stroke, transform, None);
        }
    }

    RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or_else(|| BackendError::Render("pixmap buffer size mismatch".to_string()))
}

fn build_path(segments: &[PathSegment]) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for segment in segments {
        match *segment {
            PathSegment::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathSegment::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathSegment::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathSegment::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn paint(color: Rgb) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(channel(color.0), channel(color.1), channel(color.2), 255);
    paint.anti_alias = true;
    paint
}

fn channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfsnip_core::Point;

    fn filled_rect(x: f64, y: f64, w: f64, h: f64, color: Rgb) -> PathEvent {
        PathEvent {
            segments: vec![
                PathSegment::MoveTo(Point::new(x, y)),
                PathSegment::LineTo(Point::new(x + w, y)),
                PathSegment::LineTo(Point::new(x + w, y + h)),
                PathSegment::LineTo(Point::new(x, y + h)),
                PathSegment::ClosePath,
            ],
            paint_op: PaintOp::Fill,
            fill_rule: FillRule::NonZeroWinding,
            line_width: 1.0,
            stroke_color: Rgb::BLACK,
            fill_color: color,
        }
    }

    #[test]
    fn dimensions_round_up() {
        assert_eq!(
            raster_dimensions(Size::new(612.0, 792.0), 4.0).unwrap(),
            (2448, 3168)
        );
        assert_eq!(
            raster_dimensions(Size::new(100.5, 10.1), 1.0).unwrap(),
            (101, 11)
        );
    }

    #[test]
    fn invalid_scale_is_render_error() {
        assert!(matches!(
            raster_dimensions(Size::new(10.0, 10.0), 0.0),
            Err(BackendError::Render(_))
        ));
        assert!(raster_dimensions(Size::new(10.0, 10.0), f64::NAN).is_err());
        assert!(raster_dimensions(Size::new(0.0, 10.0), 2.0).is_err());
    }

    #[test]
    fn blank_page_is_white() {
        let img = render_paths(Size::new(20.0, 10.0), 2.0, &[]).unwrap();
        assert_eq!(img.dimensions(), (40, 20));
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn bottom_left_rect_lands_at_bottom_of_bitmap() {
        // 10x10 black square in the bottom-left corner of a 100x100 page.
        let paths = [filled_rect(0.0, 0.0, 10.0, 10.0, Rgb::BLACK)];
        let img = render_paths(Size::new(100.0, 100.0), 1.0, &paths).unwrap();
        assert_eq!(img.get_pixel(5, 95).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(5, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn fill_color_is_used() {
        let paths = [filled_rect(0.0, 0.0, 10.0, 10.0, Rgb(1.0, 0.0, 0.0))];
        let img = render_paths(Size::new(10.0, 10.0), 3.0, &paths).unwrap();
        assert_eq!(img.get_pixel(15, 15).0, [255, 0, 0, 255]);
    }
}
