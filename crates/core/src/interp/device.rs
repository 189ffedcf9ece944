//! Drawing surfaces - output interface for wet scans.
//!
//! The executor issues drawing calls to a `Surface` while a render session is
//! active. Path coordinates are in user space and apply the matrix most
//! recently passed to `set_matrix`; glyphs carry their own device matrix.
//! `RecordingSurface` keeps the calls as a display list.

use crate::model::color::Color;
use crate::model::objects::FillRule;
use crate::model::state::{BlendMode, GraphicsState, LineCap, LineDash, LineJoin};
use crate::utils::{Matrix, Point, Rect};

/// Path segment for graphics operations.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Move to point (x, y)
    MoveTo(f64, f64),
    /// Line to point (x, y)
    LineTo(f64, f64),
    /// Cubic bezier curve (x1, y1, x2, y2, x3, y3)
    CurveTo(f64, f64, f64, f64, f64, f64),
    /// Close path
    ClosePath,
}

/// Stroke parameters taken from the graphics state.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
    pub dash: LineDash,
}

/// Paint for fills and strokes.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: Color,
    /// Color space name the color is expressed in
    pub color_space: String,
    pub alpha: f64,
    pub blend_mode: BlendMode,
    /// Present for stroke paints
    pub stroke: Option<StrokeStyle>,
}

impl Paint {
    /// Non-stroking paint of the state.
    pub fn fill(state: &GraphicsState) -> Self {
        Self {
            color: state.fill_color.clone(),
            color_space: state.fill_color_space.name.to_string(),
            alpha: state.fill_alpha,
            blend_mode: state.effective_blend_mode(),
            stroke: None,
        }
    }

    /// Stroking paint of the state.
    pub fn stroke(state: &GraphicsState) -> Self {
        Self {
            color: state.stroke_color.clone(),
            color_space: state.stroke_color_space.name.to_string(),
            alpha: state.stroke_alpha,
            blend_mode: state.effective_blend_mode(),
            stroke: Some(StrokeStyle {
                width: state.line_width,
                cap: state.line_cap,
                join: state.line_join,
                miter_limit: state.miter_limit,
                dash: state.line_dash.clone(),
            }),
        }
    }
}

/// One positioned glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub code: u32,
    pub text: String,
    /// Text rendering matrix: glyph space (1/1000 em scaled) to device space
    pub matrix: Matrix,
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
}

/// Image handed to a surface. Placement is the unit square under the current matrix.
#[derive(Debug, Clone, Copy)]
pub struct ImageRef<'a> {
    /// Resource name; None for inline images
    pub name: Option<&'a str>,
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u32,
    pub color_space: Option<&'a str>,
    pub data: &'a [u8],
}

/// Drawing surface trait - interface for rendering content.
///
/// All methods except `set_matrix` default to no-ops.
pub trait Surface {
    /// Set the current transformation matrix.
    fn set_matrix(&mut self, matrix: Matrix);

    /// Clear the device area before drawing.
    fn clear(&mut self, _area: Rect) {}

    /// Intersect the clip with a device-space rectangle.
    fn clip_rect(&mut self, _rect: Rect) {}

    /// Push matrix and clip.
    fn save(&mut self) {}

    /// Pop matrix and clip.
    fn restore(&mut self) {}

    /// Begin a Form XObject (figure).
    fn begin_figure(&mut self, _name: &str, _bbox: Rect, _matrix: Matrix) {}

    /// End a Form XObject (figure).
    fn end_figure(&mut self, _name: &str) {}

    /// Begin a marked content sequence.
    fn begin_marked_content(&mut self, _tag: &str) {}

    /// End a marked content sequence.
    fn end_marked_content(&mut self) {}

    /// Marked content point.
    fn marked_content_point(&mut self, _tag: &str) {}

    fn fill_path(&mut self, _path: &[PathSegment], _rule: FillRule, _paint: &Paint) {}

    fn stroke_path(&mut self, _path: &[PathSegment], _paint: &Paint) {}

    /// Intersect the clip with a user-space path.
    fn clip_path(&mut self, _path: &[PathSegment], _rule: FillRule) {}

    /// Render an inline or XObject image.
    fn draw_image(&mut self, _image: &ImageRef<'_>) {}

    fn draw_glyph(&mut self, _glyph: &Glyph) {}

    fn paint_shading(&mut self, _name: &str) {}
}

/// Recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetMatrix(Matrix),
    Clear(Rect),
    ClipRect(Rect),
    Save,
    Restore,
    BeginFigure {
        name: String,
        bbox: Rect,
        matrix: Matrix,
    },
    EndFigure(String),
    BeginMarkedContent(String),
    EndMarkedContent,
    MarkedContentPoint(String),
    FillPath {
        path: Vec<PathSegment>,
        rule: FillRule,
        paint: Paint,
    },
    StrokePath {
        path: Vec<PathSegment>,
        paint: Paint,
    },
    ClipPath {
        path: Vec<PathSegment>,
        rule: FillRule,
    },
    Image {
        name: Option<String>,
        width: u32,
        height: u32,
    },
    Glyph(Glyph),
    Shading(String),
}

/// Surface that records every call it receives.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
    matrix_stack: Vec<Matrix>,
    matrix: Option<Matrix>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matrix most recently set, if any.
    pub fn matrix(&self) -> Option<Matrix> {
        self.matrix
    }

    /// Unicode text of the recorded glyphs, in drawing order.
    pub fn text(&self) -> String {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Glyph(g) => Some(g.text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Origin of every recorded glyph in device space.
    pub fn glyph_origins(&self) -> Vec<Point> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Glyph(g) => Some((g.matrix.4, g.matrix.5)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn set_matrix(&mut self, matrix: Matrix) {
        self.matrix = Some(matrix);
        self.commands.push(DrawCommand::SetMatrix(matrix));
    }

    fn clear(&mut self, area: Rect) {
        self.commands.push(DrawCommand::Clear(area));
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::ClipRect(rect));
    }

    fn save(&mut self) {
        if let Some(m) = self.matrix {
            self.matrix_stack.push(m);
        }
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(m) = self.matrix_stack.pop() {
            self.matrix = Some(m);
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn begin_figure(&mut self, name: &str, bbox: Rect, matrix: Matrix) {
        self.commands.push(DrawCommand::BeginFigure {
            name: name.to_string(),
            bbox,
            matrix,
        });
    }

    fn end_figure(&mut self, name: &str) {
        self.commands.push(DrawCommand::EndFigure(name.to_string()));
    }

    fn begin_marked_content(&mut self, tag: &str) {
        self.commands
            .push(DrawCommand::BeginMarkedContent(tag.to_string()));
    }

    fn end_marked_content(&mut self) {
        self.commands.push(DrawCommand::EndMarkedContent);
    }

    fn marked_content_point(&mut self, tag: &str) {
        self.commands
            .push(DrawCommand::MarkedContentPoint(tag.to_string()));
    }

    fn fill_path(&mut self, path: &[PathSegment], rule: FillRule, paint: &Paint) {
        self.commands.push(DrawCommand::FillPath {
            path: path.to_vec(),
            rule,
            paint: paint.clone(),
        });
    }

    fn stroke_path(&mut self, path: &[PathSegment], paint: &Paint) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.to_vec(),
            paint: paint.clone(),
        });
    }

    fn clip_path(&mut self, path: &[PathSegment], rule: FillRule) {
        self.commands.push(DrawCommand::ClipPath {
            path: path.to_vec(),
            rule,
        });
    }

    fn draw_image(&mut self, image: &ImageRef<'_>) {
        self.commands.push(DrawCommand::Image {
            name: image.name.map(str::to_string),
            width: image.width,
            height: image.height,
        });
    }

    fn draw_glyph(&mut self, glyph: &Glyph) {
        self.commands.push(DrawCommand::Glyph(glyph.clone()));
    }

    fn paint_shading(&mut self, name: &str) {
        self.commands.push(DrawCommand::Shading(name.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::color::Color;
    use crate::utils::MATRIX_IDENTITY;

    #[test]
    fn test_stroke_paint_carries_line_style() {
        let mut state = GraphicsState::default();
        state.line_width = 3.0;
        state.stroke_color = Color::Rgb(1.0, 0.0, 0.0);
        let paint = Paint::stroke(&state);
        assert_eq!(paint.color, Color::Rgb(1.0, 0.0, 0.0));
        assert_eq!(paint.stroke.as_ref().map(|s| s.width), Some(3.0));
        assert!(Paint::fill(&state).stroke.is_none());
    }

    #[test]
    fn test_recording_surface_save_restore_matrix() {
        let mut surface = RecordingSurface::new();
        surface.set_matrix(MATRIX_IDENTITY);
        surface.save();
        surface.set_matrix((2.0, 0.0, 0.0, 2.0, 0.0, 0.0));
        surface.restore();
        assert_eq!(surface.matrix(), Some(MATRIX_IDENTITY));
        assert_eq!(surface.commands.len(), 4);
    }
}
