//! Graphics and text state for the content stream interpreter.
//!
//! `q`/`Q` push and pop the graphics state (CTM, colors, line width). Text
//! state (`BT`..`ET` matrices, leading, font) follows the PDF model but is
//! not part of the saved graphics state, except for the font selection.

use pdfsnip_core::Point;

use crate::handler::Rgb;

/// A 2D affine transformation `[a b c d e f]` using PDF's row-vector
/// convention: `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix(pub [f64; 6]);

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    pub fn translate(tx: f64, ty: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [oa, ob, oc, od, oe, of] = other.0;
        Matrix([
            a * oa + b * oc,
            a * ob + b * od,
            c * oa + d * oc,
            c * ob + d * od,
            e * oa + f * oc + oe,
            e * ob + f * od + of,
        ])
    }

    pub fn apply(&self, p: Point) -> Point {
        let [a, b, c, d, e, f] = self.0;
        Point::new(a * p.x + c * p.y + e, b * p.x + d * p.y + f)
    }

    /// Geometric mean of the axis scale factors, for line widths.
    pub fn mean_scale(&self) -> f64 {
        let [a, b, c, d, _, _] = self.0;
        (a * d - b * c).abs().sqrt()
    }
}

/// Parameters saved and restored by `q`/`Q`.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    pub ctm: Matrix,
    pub line_width: f64,
    pub stroke_color: Rgb,
    pub fill_color: Rgb,
    pub font: Option<String>,
    pub font_size: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            line_width: 1.0,
            stroke_color: Rgb::BLACK,
            fill_color: Rgb::BLACK,
            font: None,
            font_size: 0.0,
        }
    }
}

/// Current graphics state plus the `q` stack.
#[derive(Debug, Clone, Default)]
pub struct InterpreterState {
    current: GraphicsState,
    stack: Vec<GraphicsState>,
}

impl InterpreterState {
    pub fn new(ctm: Matrix) -> Self {
        Self {
            current: GraphicsState {
                ctm,
                ..GraphicsState::default()
            },
            stack: Vec::new(),
        }
    }

    pub fn gs(&self) -> &GraphicsState {
        &self.current
    }

    pub fn gs_mut(&mut self) -> &mut GraphicsState {
        &mut self.current
    }

    pub fn ctm(&self) -> Matrix {
        self.current.ctm
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn save(&mut self) {
        self.stack.push(self.current.clone());
    }

    /// Pop the saved state. Returns `false` on an unbalanced `Q`, leaving
    /// the state unchanged.
    pub fn restore(&mut self) -> bool {
        match self.stack.pop() {
            Some(saved) => {
                self.current = saved;
                true
            }
            None => false,
        }
    }

    /// `cm`: pre-multiply the CTM.
    pub fn concat(&mut self, m: Matrix) {
        self.current.ctm = m.multiply(&self.current.ctm);
    }
}

/// Text object state between `BT` and `ET`.
#[derive(Debug, Clone, Default)]
pub struct TextState {
    /// Text matrix `Tm`.
    pub matrix: Matrix,
    /// Text line matrix `Tlm`.
    pub line_matrix: Matrix,
    pub leading: f64,
    pub rise: f64,
    pub in_text_object: bool,
}

impl TextState {
    pub fn begin(&mut self) {
        self.matrix = Matrix::IDENTITY;
        self.line_matrix = Matrix::IDENTITY;
        self.in_text_object = true;
    }

    pub fn end(&mut self) {
        self.in_text_object = false;
    }

    /// `Td`: move to the start of the next line, offset from the current
    /// line start.
    pub fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translate(tx, ty).multiply(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    /// `T*`
    pub fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// `Tm`
    pub fn set_matrix(&mut self, m: Matrix) {
        self.matrix = m;
        self.line_matrix = m;
    }

    /// Text rendering origin in page space under `ctm`.
    pub fn origin(&self, ctm: &Matrix) -> Point {
        self.matrix.multiply(ctm).apply(Point::new(0.0, self.rise))
    }
}
