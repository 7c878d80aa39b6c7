//! Points, sizes and space-tagged rectangles.
//!
//! Every [`Rect`] carries its coordinate space in the type, so a display
//! rectangle cannot be handed to code that expects document or raster
//! coordinates without going through [`crate::transform`].

use std::fmt;
use std::marker::PhantomData;

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a container, viewport or bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns `true` if both dimensions are finite and strictly positive.
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A named coordinate space.
pub trait Space: Copy + Default + fmt::Debug + PartialEq {
    /// Human-readable space name, used in `Debug`/`Display` output and logs.
    const NAME: &'static str;
}

/// Pixel coordinates of the on-screen container, top-left origin, y down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Display;

/// Intrinsic page units (scale 1).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document;

/// Pixel coordinates of an off-screen render, top-left origin, y down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Raster;

impl Space for Display {
    const NAME: &'static str = "display";
}

impl Space for Document {
    const NAME: &'static str = "document";
}

impl Space for Raster {
    const NAME: &'static str = "raster";
}

/// An axis-aligned rectangle in coordinate space `S`.
///
/// `width` and `height` are never negative: [`Rect::new`] moves the origin
/// when given a negative extent. Rectangles are immutable values; every
/// transform produces a new one.
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect<S: Space> {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    #[cfg_attr(feature = "serde", serde(skip))]
    space: PhantomData<S>,
}

impl<S: Space> Rect<S> {
    /// Create a rectangle, normalizing negative extents.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        let (x, width) = if width < 0.0 { (x + width, -width) } else { (x, width) };
        let (y, height) = if height < 0.0 {
            (y + height, -height)
        } else {
            (y, height)
        };
        Self {
            x,
            y,
            width,
            height,
            space: PhantomData,
        }
    }

    /// The normalized rectangle spanned by two corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (b.x - a.x).abs(),
            (b.y - a.y).abs(),
        )
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns `true` if the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Inclusive point containment: edges count as inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Scale every component independently.
    ///
    /// Stays in the same space; cross-space conversions live in
    /// [`crate::transform`].
    pub(crate) fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }

    /// Reinterpret the components in another space.
    pub(crate) fn cast<T: Space>(self) -> Rect<T> {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Approximate equality, for comparing the output of float transforms.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

impl<S: Space> fmt::Debug for Rect<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rect")
            .field("space", &S::NAME)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl<S: Space> fmt::Display for Rect<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[x={:.2} y={:.2} w={:.2} h={:.2}]",
            S::NAME,
            self.x,
            self.y,
            self.width,
            self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_new_keeps_positive_extent() {
        let r: Rect<Display> = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.x(), 10.0);
        assert_eq!(r.y(), 20.0);
        assert_eq!(r.width(), 30.0);
        assert_eq!(r.height(), 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
    }

    #[test]
    fn rect_new_normalizes_negative_extent() {
        let r: Rect<Document> = Rect::new(50.0, 50.0, -20.0, -10.0);
        assert_eq!(r.origin(), Point::new(30.0, 40.0));
        assert_eq!(r.size(), Size::new(20.0, 10.0));
    }

    #[test]
    fn from_corners_any_drag_direction() {
        let a = Point::new(120.0, 80.0);
        let b = Point::new(100.0, 140.0);
        let r: Rect<Display> = Rect::from_corners(a, b);
        assert_eq!(r, Rect::new(100.0, 80.0, 20.0, 60.0));
        assert_eq!(r, Rect::from_corners(b, a));
    }

    #[test]
    fn zero_width_or_height_is_empty() {
        assert!(Rect::<Raster>::new(5.0, 5.0, 0.0, 10.0).is_empty());
        assert!(Rect::<Raster>::new(5.0, 5.0, 10.0, 0.0).is_empty());
        assert!(!Rect::<Raster>::new(5.0, 5.0, 0.5, 0.5).is_empty());
    }

    #[test]
    fn contains_is_edge_inclusive() {
        let r: Rect<Document> = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(!r.contains(Point::new(10.01, 5.0)));
    }

    #[test]
    fn display_includes_space_name() {
        let r: Rect<Raster> = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.to_string(), "raster[x=1.00 y=2.00 w=3.00 h=4.00]");
    }

    #[test]
    fn size_is_positive() {
        assert!(Size::new(1.0, 1.0).is_positive());
        assert!(!Size::new(0.0, 1.0).is_positive());
        assert!(!Size::new(f64::NAN, 1.0).is_positive());
    }
}
