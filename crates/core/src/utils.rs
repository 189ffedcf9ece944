//! Geometry routines shared by the scanner, the graphics state and the wrappers.
//!
//! Provides:
//! - Geometric types (Point, Rect, Size, Matrix, Quad)
//! - Matrix composition, inversion and application
//! - Bounding-box helpers and debug formatting

/// Floating-point infinity for bounding box calculations.
pub const INF_F64: f64 = f64::MAX;

/// Small epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1e-9;

/// A 2D point (x, y).
pub type Point = (f64, f64);

/// A rectangle defined by (x0, y0, x1, y1) where (x0, y0) is the minimum corner
/// and (x1, y1) the maximum corner.
pub type Rect = (f64, f64, f64, f64);

/// A (width, height) pair.
pub type Size = (f64, f64);

/// A 6-element affine transformation matrix (a, b, c, d, e, f).
/// Transforms point (x, y) to (ax + cy + e, bx + dy + f).
pub type Matrix = (f64, f64, f64, f64, f64, f64);

/// Identity transformation matrix.
pub const MATRIX_IDENTITY: Matrix = (1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

/// Compares two floats for approximate equality.
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Multiplies two matrices: result = m1 * m0 (row-vector convention).
/// The result applies m1 first, then m0.
pub fn mult_matrix(m1: Matrix, m0: Matrix) -> Matrix {
    let (a1, b1, c1, d1, e1, f1) = m1;
    let (a0, b0, c0, d0, e0, f0) = m0;
    (
        a0 * a1 + c0 * b1,
        b0 * a1 + d0 * b1,
        a0 * c1 + c0 * d1,
        b0 * c1 + d0 * d1,
        a0 * e1 + c0 * f1 + e0,
        b0 * e1 + d0 * f1 + f0,
    )
}

/// A pure translation.
#[inline]
pub const fn translation_matrix(tx: f64, ty: f64) -> Matrix {
    (1.0, 0.0, 0.0, 1.0, tx, ty)
}

/// A pure scale.
#[inline]
pub const fn scale_matrix(sx: f64, sy: f64) -> Matrix {
    (sx, 0.0, 0.0, sy, 0.0, 0.0)
}

/// Inverts an affine matrix.
///
/// Returns `None` when the matrix is singular or contains non-finite values.
pub fn invert_matrix(m: Matrix) -> Option<Matrix> {
    let (a, b, c, d, e, f) = m;
    let det = a * d - b * c;
    if !det.is_finite() || det.abs() < EPSILON {
        return None;
    }
    let ia = d / det;
    let ib = -b / det;
    let ic = -c / det;
    let id = a / det;
    Some((ia, ib, ic, id, -(e * ia + f * ic), -(e * ib + f * id)))
}

/// Applies a matrix to a point.
pub fn apply_matrix_pt(m: Matrix, v: Point) -> Point {
    let (a, b, c, d, e, f) = m;
    let (x, y) = v;
    (a * x + c * y + e, b * x + d * y + f)
}

/// Applies a matrix to a rectangle.
///
/// Note that the result is not a rotated rectangle, but a rectangle with the same
/// orientation that tightly fits the outside of the rotated content.
pub fn apply_matrix_rect(m: Matrix, rect: Rect) -> Rect {
    Quad::from_rect(rect).transform(m).bounds()
}

/// Horizontal scale factor of a matrix (length of the transformed x unit vector).
pub fn matrix_scale_x(m: Matrix) -> f64 {
    m.0.hypot(m.1)
}

/// Vertical scale factor of a matrix (length of the transformed y unit vector).
pub fn matrix_scale_y(m: Matrix) -> f64 {
    m.2.hypot(m.3)
}

/// Computes a minimal rectangle that covers all the points.
pub fn get_bound<I: IntoIterator<Item = Point>>(pts: I) -> Rect {
    let mut x0 = INF_F64;
    let mut y0 = INF_F64;
    let mut x1 = -INF_F64;
    let mut y1 = -INF_F64;

    for (x, y) in pts {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }

    (x0, y0, x1, y1)
}

/// Smallest rectangle covering both inputs.
pub fn rect_union(r0: Rect, r1: Rect) -> Rect {
    (r0.0.min(r1.0), r0.1.min(r1.1), r0.2.max(r1.2), r0.3.max(r1.3))
}

/// Normalizes a rectangle so that x0 <= x1 and y0 <= y1.
pub fn normalize_rect(r: Rect) -> Rect {
    (r.0.min(r.2), r.1.min(r.3), r.0.max(r.2), r.1.max(r.3))
}

/// Width and height of a rectangle.
#[inline]
pub fn rect_size(r: Rect) -> Size {
    ((r.2 - r.0).abs(), (r.3 - r.1).abs())
}

/// A rectangle with zero area (or an inverted one) carries no extent.
#[inline]
pub fn rect_is_empty(r: Rect) -> bool {
    !(r.2 > r.0 && r.3 > r.1)
}

/// Four-cornered polygon, typically a transformed glyph or image box.
///
/// Corners are stored in order: (x0,y0), (x1,y0), (x1,y1), (x0,y1) of the source rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub points: [Point; 4],
}

impl Quad {
    pub fn from_rect(r: Rect) -> Self {
        let (x0, y0, x1, y1) = r;
        Self {
            points: [(x0, y0), (x1, y0), (x1, y1), (x0, y1)],
        }
    }

    pub fn transform(&self, m: Matrix) -> Self {
        Self {
            points: self.points.map(|p| apply_matrix_pt(m, p)),
        }
    }

    pub fn bounds(&self) -> Rect {
        get_bound(self.points)
    }

    /// Bounding quad of both inputs.
    pub fn union(&self, other: &Quad) -> Self {
        Self::from_rect(rect_union(self.bounds(), other.bounds()))
    }
}

/// Formats a bounding box as a comma-separated string.
pub fn bbox2str(bbox: Rect) -> String {
    let (x0, y0, x1, y1) = bbox;
    format!("{:.3},{:.3},{:.3},{:.3}", x0, y0, x1, y1)
}

/// Formats a matrix as a string.
pub fn matrix2str(m: Matrix) -> String {
    let (a, b, c, d, e, f) = m;
    format!("[{:.2},{:.2},{:.2},{:.2}, ({:.2},{:.2})]", a, b, c, d, e, f)
}
