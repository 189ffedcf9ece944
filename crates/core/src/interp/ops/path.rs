//! Path construction and painting operators.
//!
//! Handles: m, l, c, v, y, h, re, S, s, f, F, f*, B, B*, b, b*, n, W, W*
//!
//! Path construction:
//! - m: Move to
//! - l: Line to
//! - c, v, y: Bezier curves (cubic variants)
//! - h: Close subpath
//! - re: Rectangle shorthand
//!
//! Path painting:
//! - S/s: Stroke (s closes first)
//! - f/F/f*: Fill (f* uses even-odd rule)
//! - B/B*/b/b*: Fill then stroke
//! - n: End path (often with clipping)
//!
//! Clipping:
//! - W/W*: Mark the path as a clip, applied by the next painting operator

use crate::interp::device::{Paint, PathSegment};
use crate::interp::executor::Executor;
use crate::model::objects::{FillRule, PaintPath};
use crate::model::state::GraphicsState;
use crate::utils::Point;

#[allow(non_snake_case)]
impl Executor<'_, '_, '_> {
    // ========================================================================
    // Path Construction Operators
    // ========================================================================

    /// Begins a new subpath at the given point.
    ///
    /// PDF operator: `m`
    pub fn do_m(&mut self, x: f64, y: f64) {
        self.path.push(PathSegment::MoveTo(x, y));
        self.path.current_point = Some((x, y));
    }

    /// Appends a straight line segment from the current point.
    ///
    /// PDF operator: `l`
    pub fn do_l(&mut self, x: f64, y: f64) {
        self.path.push(PathSegment::LineTo(x, y));
        self.path.current_point = Some((x, y));
    }

    /// Appends a cubic Bezier curve.
    ///
    /// A missing first control point is the current point (`v`); a missing
    /// second control point is the end point (`y`).
    ///
    /// PDF operators: `c`, `v`, `y`
    pub fn do_c(&mut self, c1: Option<Point>, c2: Option<Point>, end: Point) {
        let (x1, y1) = c1.or(self.path.current_point).unwrap_or((0.0, 0.0));
        let (x2, y2) = c2.unwrap_or(end);
        self.path
            .push(PathSegment::CurveTo(x1, y1, x2, y2, end.0, end.1));
        self.path.current_point = Some(end);
    }

    /// PDF operator: `h`
    pub fn do_h(&mut self) {
        self.path.push(PathSegment::ClosePath);
    }

    /// Appends a rectangle to the current path as a complete subpath.
    ///
    /// Equivalent to: m x y; l x+w y; l x+w y+h; l x y+h; h
    ///
    /// PDF operator: `re`
    pub fn do_re(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.path.push(PathSegment::MoveTo(x, y));
        self.path.push(PathSegment::LineTo(x + w, y));
        self.path.push(PathSegment::LineTo(x + w, y + h));
        self.path.push(PathSegment::LineTo(x, y + h));
        self.path.push(PathSegment::ClosePath);
        self.path.current_point = Some((x, y));
    }

    // ========================================================================
    // Path Painting Operators
    // ========================================================================

    /// Fills and/or strokes the current path, then ends it.
    ///
    /// PDF operators: `S s f F f* B B* b b*`
    pub fn paint_path(&mut self, state: &GraphicsState, paint: PaintPath) {
        if paint.close {
            self.do_h();
        }
        if let Some(session) = self.session.as_deref_mut()
            && !self.path.is_empty()
        {
            if let Some(rule) = paint.fill {
                session
                    .surface
                    .fill_path(&self.path.segments, rule, &Paint::fill(state));
            }
            if paint.stroke {
                session
                    .surface
                    .stroke_path(&self.path.segments, &Paint::stroke(state));
            }
        }
        self.end_path();
    }

    /// Ends the path without filling or stroking it.
    ///
    /// PDF operator: `n`
    pub fn do_n(&mut self) {
        self.end_path();
    }

    // ========================================================================
    // Clipping Path Operators
    // ========================================================================

    /// Marks the current path as a clip. The clip takes effect when the path
    /// is ended by a painting operator or `n`.
    ///
    /// PDF operators: `W`, `W*`
    pub fn do_W(&mut self, rule: FillRule) {
        self.path.pending_clip = Some(rule);
    }

    fn end_path(&mut self) {
        if let Some(rule) = self.path.pending_clip
            && let Some(session) = self.session.as_deref_mut()
        {
            session.surface.clip_path(&self.path.segments, rule);
        }
        self.path.clear();
    }
}
