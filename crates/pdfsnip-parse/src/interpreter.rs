//! Content stream interpreter.
//!
//! Walks the tokenized operators of a page, tracking graphics and text
//! state, and reports shown text and painted paths to a [`ContentHandler`].
//! Glyph widths are not computed: the text matrix is positioned by the
//! text-positioning operators only, and each show operator yields one event
//! anchored at its rendering origin.

use tracing::trace;

use pdfsnip_core::Point;

use crate::error::BackendError;
use crate::handler::{ContentHandler, FillRule, PaintOp, PathEvent, PathSegment, Rgb, TextEvent};
use crate::interpreter_state::{InterpreterState, Matrix, TextState};
use crate::tokenizer::{Operand, Operator, tokenize};

/// Path under construction, already transformed to page space.
#[derive(Debug, Default)]
struct PathBuilder {
    segments: Vec<PathSegment>,
    current: Option<Point>,
    subpath_start: Option<Point>,
}

impl PathBuilder {
    fn move_to(&mut self, p: Point) {
        self.segments.push(PathSegment::MoveTo(p));
        self.current = Some(p);
        self.subpath_start = Some(p);
    }

    fn line_to(&mut self, p: Point) {
        if self.current.is_none() {
            self.move_to(p);
            return;
        }
        self.segments.push(PathSegment::LineTo(p));
        self.current = Some(p);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, end: Point) {
        if self.current.is_none() {
            self.move_to(c1);
        }
        self.segments.push(PathSegment::CurveTo(c1, c2, end));
        self.current = Some(end);
    }

    fn close(&mut self) {
        if self.current.is_some() {
            self.segments.push(PathSegment::ClosePath);
            self.current = self.subpath_start;
        }
    }

    fn take(&mut self) -> Vec<PathSegment> {
        self.current = None;
        self.subpath_start = None;
        std::mem::take(&mut self.segments)
    }
}

/// Interpret a decoded content stream.
///
/// `initial_ctm` maps user space to the caller's page space (usually the
/// identity, or a translation that moves the media box origin to `(0, 0)`).
///
/// # Errors
///
/// Returns [`BackendError::Interpreter`] if the stream cannot be tokenized.
/// Operators with missing or mistyped operands are skipped.
pub fn interpret_content_stream(
    content: &[u8],
    initial_ctm: Matrix,
    handler: &mut dyn ContentHandler,
) -> Result<(), BackendError> {
    let operators = tokenize(content)?;
    let mut state = InterpreterState::new(initial_ctm);
    let mut text = TextState::default();
    let mut path = PathBuilder::default();

    for op in &operators {
        match op.name.as_str() {
            // --- Graphics state ---
            "q" => state.save(),
            "Q" => {
                if !state.restore() {
                    trace!("unbalanced Q ignored");
                }
            }
            "cm" => {
                if let Some(m) = matrix_operand(op) {
                    state.concat(m);
                }
            }
            "w" => {
                if let Some(w) = number(op, 0) {
                    state.gs_mut().line_width = w;
                }
            }

            // --- Color ---
            "G" | "RG" | "K" | "SC" | "SCN" => {
                if let Some(c) = color_operand(op) {
                    state.gs_mut().stroke_color = c;
                }
            }
            "g" | "rg" | "k" | "sc" | "scn" => {
                if let Some(c) = color_operand(op) {
                    state.gs_mut().fill_color = c;
                }
            }

            // --- Path construction ---
            "m" => {
                if let Some([x, y]) = numbers::<2>(op) {
                    path.move_to(state.ctm().apply(Point::new(x, y)));
                }
            }
            "l" => {
                if let Some([x, y]) = numbers::<2>(op) {
                    path.line_to(state.ctm().apply(Point::new(x, y)));
                }
            }
            "c" => {
                if let Some([x1, y1, x2, y2, x3, y3]) = numbers::<6>(op) {
                    let ctm = state.ctm();
                    path.curve_to(
                        ctm.apply(Point::new(x1, y1)),
                        ctm.apply(Point::new(x2, y2)),
                        ctm.apply(Point::new(x3, y3)),
                    );
                }
            }
            "v" => {
                if let (Some([x2, y2, x3, y3]), Some(current)) =
                    (numbers::<4>(op), path.current)
                {
                    let ctm = state.ctm();
                    path.curve_to(
                        current,
                        ctm.apply(Point::new(x2, y2)),
                        ctm.apply(Point::new(x3, y3)),
                    );
                }
            }
            "y" => {
                if let Some([x1, y1, x3, y3]) = numbers::<4>(op) {
                    let ctm = state.ctm();
                    let end = ctm.apply(Point::new(x3, y3));
                    path.curve_to(ctm.apply(Point::new(x1, y1)), end, end);
                }
            }
            "h" => path.close(),
            "re" => {
                if let Some([x, y, w, h]) = numbers::<4>(op) {
                    let ctm = state.ctm();
                    path.move_to(ctm.apply(Point::new(x, y)));
                    path.line_to(ctm.apply(Point::new(x + w, y)));
                    path.line_to(ctm.apply(Point::new(x + w, y + h)));
                    path.line_to(ctm.apply(Point::new(x, y + h)));
                    path.close();
                }
            }

            // --- Path painting ---
            "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                let (paint_op, fill_rule, close_first) = match op.name.as_str() {
                    "S" => (PaintOp::Stroke, FillRule::NonZeroWinding, false),
                    "s" => (PaintOp::Stroke, FillRule::NonZeroWinding, true),
                    "f*" => (PaintOp::Fill, FillRule::EvenOdd, false),
                    "B" => (PaintOp::FillAndStroke, FillRule::NonZeroWinding, false),
                    "B*" => (PaintOp::FillAndStroke, FillRule::EvenOdd, false),
                    "b" => (PaintOp::FillAndStroke, FillRule::NonZeroWinding, true),
                    "b*" => (PaintOp::FillAndStroke, FillRule::EvenOdd, true),
                    _ => (PaintOp::Fill, FillRule::NonZeroWinding, false),
                };
                if close_first {
                    path.close();
                }
                paint(path.take(), &state, paint_op, fill_rule, handler);
            }
            "n" => {
                path.take();
            }

            // --- Text objects and state ---
            "BT" => text.begin(),
            "ET" => text.end(),
            "Tf" => {
                if let (Some(Operand::Name(font)), Some(size)) =
                    (op.operands.first(), number(op, 1))
                {
                    state.gs_mut().font = Some(font.clone());
                    state.gs_mut().font_size = size;
                }
            }
            "TL" => {
                if let Some(l) = number(op, 0) {
                    text.leading = l;
                }
            }
            "Ts" => {
                if let Some(r) = number(op, 0) {
                    text.rise = r;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = numbers::<2>(op) {
                    text.move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = numbers::<2>(op) {
                    text.leading = -ty;
                    text.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = matrix_operand(op) {
                    text.set_matrix(m);
                }
            }
            "T*" => text.next_line(),

            // --- Text showing ---
            "Tj" => {
                if let Some(Operand::Str(bytes)) = op.operands.first() {
                    show(bytes.clone(), &state, &text, handler);
                }
            }
            "TJ" => {
                if let Some(Operand::Array(items)) = op.operands.first() {
                    let bytes: Vec<u8> = items
                        .iter()
                        .filter_map(|item| match item {
                            Operand::Str(s) => Some(s.as_slice()),
                            _ => None,
                        })
                        .flatten()
                        .copied()
                        .collect();
                    show(bytes, &state, &text, handler);
                }
            }
            "'" => {
                text.next_line();
                if let Some(Operand::Str(bytes)) = op.operands.first() {
                    show(bytes.clone(), &state, &text, handler);
                }
            }
            "\"" => {
                text.next_line();
                if let Some(Operand::Str(bytes)) = op.operands.get(2) {
                    show(bytes.clone(), &state, &text, handler);
                }
            }

            _ => {}
        }
    }

    Ok(())
}

fn paint(
    segments: Vec<PathSegment>,
    state: &InterpreterState,
    paint_op: PaintOp,
    fill_rule: FillRule,
    handler: &mut dyn ContentHandler,
) {
    if segments.is_empty() {
        return;
    }
    let gs = state.gs();
    handler.on_path(PathEvent {
        segments,
        paint_op,
        fill_rule,
        line_width: gs.line_width * gs.ctm.mean_scale(),
        stroke_color: gs.stroke_color,
        fill_color: gs.fill_color,
    });
}

fn show(
    bytes: Vec<u8>,
    state: &InterpreterState,
    text: &TextState,
    handler: &mut dyn ContentHandler,
) {
    if bytes.is_empty() {
        return;
    }
    if !text.in_text_object {
        trace!("text shown outside BT/ET");
    }
    let gs = state.gs();
    handler.on_text(TextEvent {
        font: gs.font.clone(),
        font_size: gs.font_size,
        bytes,
        origin: text.origin(&gs.ctm),
    });
}

fn number(op: &Operator, index: usize) -> Option<f64> {
    op.operands.get(index).and_then(Operand::as_number)
}

/// The last `N` operands as numbers; `None` if there are fewer than `N` or
/// any of them is not a number.
fn numbers<const N: usize>(op: &Operator) -> Option<[f64; N]> {
    let start = op.operands.len().checked_sub(N)?;
    let mut out = [0.0; N];
    for (slot, operand) in out.iter_mut().zip(&op.operands[start..]) {
        *slot = operand.as_number()?;
    }
    Some(out)
}

fn matrix_operand(op: &Operator) -> Option<Matrix> {
    numbers::<6>(op).map(Matrix)
}

/// Color components of a color-setting operator. Pattern names (`scn`
/// with a trailing name) and unsupported component counts yield `None`.
fn color_operand(op: &Operator) -> Option<Rgb> {
    let components = op.numbers()?;
    Rgb::from_components(&components)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect {
        texts: Vec<TextEvent>,
        paths: Vec<PathEvent>,
    }

    impl ContentHandler for Collect {
        fn on_text(&mut self, event: TextEvent) {
            self.texts.push(event);
        }

        fn on_path(&mut self, event: PathEvent) {
            self.paths.push(event);
        }
    }

    fn run(content: &[u8]) -> Collect {
        let mut c = Collect::default();
        interpret_content_stream(content, Matrix::IDENTITY, &mut c).unwrap();
        c
    }

    #[test]
    fn simple_text_origin() {
        let c = run(b"BT /F1 12 Tf 72 720 Td (Hello) Tj ET");
        assert_eq!(c.texts.len(), 1);
        let t = &c.texts[0];
        assert_eq!(t.font.as_deref(), Some("F1"));
        assert_eq!(t.font_size, 12.0);
        assert_eq!(t.bytes, b"Hello");
        assert_eq!(t.origin, Point::new(72.0, 720.0));
    }

    #[test]
    fn tj_array_is_one_event() {
        let c = run(b"BT /F1 10 Tf 10 20 Td [(Hel) -120 (lo)] TJ ET");
        assert_eq!(c.texts.len(), 1);
        assert_eq!(c.texts[0].bytes, b"Hello");
    }

    #[test]
    fn quote_moves_to_next_line() {
        let c = run(b"BT 14 TL 100 500 Td (a) Tj (b) ' 1 2 (c) \" ET");
        let origins: Vec<Point> = c.texts.iter().map(|t| t.origin).collect();
        assert_eq!(
            origins,
            vec![
                Point::new(100.0, 500.0),
                Point::new(100.0, 486.0),
                Point::new(100.0, 472.0),
            ]
        );
    }

    #[test]
    fn td_uppercase_sets_leading() {
        let c = run(b"BT 0 0 Td 50 400 TD (a) Tj T* (b) Tj ET");
        assert_eq!(c.texts[1].origin, Point::new(50.0, 800.0));
    }

    #[test]
    fn text_matrix_and_ctm_combine() {
        let c = run(b"q 2 0 0 2 10 10 cm BT 1 0 0 1 5 5 Tm (x) Tj ET Q");
        assert_eq!(c.texts[0].origin, Point::new(20.0, 20.0));
    }

    #[test]
    fn state_restored_after_q() {
        let c = run(b"q 1 0 0 1 100 0 cm Q BT 10 10 Td (x) Tj ET");
        assert_eq!(c.texts[0].origin, Point::new(10.0, 10.0));
    }

    #[test]
    fn initial_ctm_is_applied() {
        let mut c = Collect::default();
        interpret_content_stream(
            b"BT 10 10 Td (x) Tj ET",
            Matrix::translate(-5.0, -5.0),
            &mut c,
        )
        .unwrap();
        assert_eq!(c.texts[0].origin, Point::new(5.0, 5.0));
    }

    #[test]
    fn empty_show_is_dropped() {
        let c = run(b"BT () Tj [] TJ ET");
        assert!(c.texts.is_empty());
    }

    #[test]
    fn rectangle_fill_with_color() {
        let c = run(b"1 0 0 rg 10 20 30 40 re f");
        assert_eq!(c.paths.len(), 1);
        let p = &c.paths[0];
        assert_eq!(p.paint_op, PaintOp::Fill);
        assert_eq!(p.fill_color, Rgb(1.0, 0.0, 0.0));
        assert_eq!(p.segments.len(), 5);
        assert_eq!(p.segments[0], PathSegment::MoveTo(Point::new(10.0, 20.0)));
        assert_eq!(p.segments[2], PathSegment::LineTo(Point::new(40.0, 60.0)));
        assert_eq!(p.segments[4], PathSegment::ClosePath);
    }

    #[test]
    fn stroke_width_scaled_by_ctm() {
        let c = run(b"3 0 0 3 0 0 cm 2 w 0 0 m 10 0 l S");
        assert_eq!(c.paths[0].paint_op, PaintOp::Stroke);
        assert!((c.paths[0].line_width - 6.0).abs() < 1e-9);
        assert_eq!(c.paths[0].segments[1], PathSegment::LineTo(Point::new(30.0, 0.0)));
    }

    #[test]
    fn close_and_stroke_appends_close() {
        let c = run(b"0 0 m 10 0 l 10 10 l s");
        assert_eq!(c.paths[0].segments.last(), Some(&PathSegment::ClosePath));
    }

    #[test]
    fn n_discards_path() {
        let c = run(b"0 0 10 10 re W n 0 0 m 5 5 l S");
        assert_eq!(c.paths.len(), 1);
        assert_eq!(c.paths[0].segments.len(), 2);
    }

    #[test]
    fn even_odd_fill_rule() {
        let c = run(b"0 0 10 10 re f* 0 0 10 10 re b*");
        assert_eq!(c.paths[0].fill_rule, FillRule::EvenOdd);
        assert_eq!(c.paths[1].paint_op, PaintOp::FillAndStroke);
    }

    #[test]
    fn v_and_y_curves() {
        let c = run(b"0 0 m 1 1 2 2 v 3 3 4 4 y S");
        let segs = &c.paths[0].segments;
        assert_eq!(
            segs[1],
            PathSegment::CurveTo(Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 2.0))
        );
        assert_eq!(
            segs[2],
            PathSegment::CurveTo(Point::new(3.0, 3.0), Point::new(4.0, 4.0), Point::new(4.0, 4.0))
        );
    }

    #[test]
    fn gray_and_cmyk_colors() {
        let c = run(b"0.5 g 0 0 1 1 re f 0 0 0 1 K 0 0 m 1 1 l S");
        assert_eq!(c.paths[0].fill_color, Rgb::gray(0.5));
        assert_eq!(c.paths[1].stroke_color, Rgb::BLACK);
    }

    #[test]
    fn pattern_color_is_ignored() {
        let c = run(b"0.2 g /P0 scn 0 0 1 1 re f");
        assert_eq!(c.paths[0].fill_color, Rgb::gray(0.2));
    }

    #[test]
    fn malformed_operands_are_skipped() {
        let c = run(b"(oops) 10 Td BT (x) Tj ET");
        assert_eq!(c.texts[0].origin, Point::new(0.0, 0.0));
    }

    #[test]
    fn tokenizer_error_propagates() {
        let mut c = Collect::default();
        let err = interpret_content_stream(b"BT (unterminated", Matrix::IDENTITY, &mut c);
        assert!(matches!(err, Err(BackendError::Interpreter(_))));
    }
}
