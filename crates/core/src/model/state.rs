//! Graphics and text state carried by each scan level.

use std::sync::Arc;

use smallvec::{SmallVec, smallvec};
use smol_str::SmolStr;

use super::color::{Color, ColorSpace};
use super::context::Rotation;
use crate::font::Font;
use crate::utils::{
    MATRIX_IDENTITY, Matrix, Rect, Size, invert_matrix, mult_matrix, normalize_rect,
    scale_matrix, translation_matrix,
};

/// Line cap style (`J`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Butt),
            1 => Some(Self::Round),
            2 => Some(Self::Square),
            _ => None,
        }
    }
}

/// Line join style (`j`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Miter),
            1 => Some(Self::Round),
            2 => Some(Self::Bevel),
            _ => None,
        }
    }
}

/// Dash pattern (`d`). An empty array is a solid line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineDash {
    pub array: SmallVec<[f64; 4]>,
    pub phase: f64,
}

impl LineDash {
    pub fn new(array: &[f64], phase: f64) -> Self {
        Self {
            array: SmallVec::from_slice(array),
            phase,
        }
    }

    pub fn is_solid(&self) -> bool {
        self.array.is_empty()
    }
}

/// Text rendering mode (`Tr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextRenderMode {
    #[default]
    Fill,
    Stroke,
    FillStroke,
    Invisible,
    FillClip,
    StrokeClip,
    FillStrokeClip,
    Clip,
}

impl TextRenderMode {
    pub fn from_i64(value: i64) -> Option<Self> {
        Some(match value {
            0 => Self::Fill,
            1 => Self::Stroke,
            2 => Self::FillStroke,
            3 => Self::Invisible,
            4 => Self::FillClip,
            5 => Self::StrokeClip,
            6 => Self::FillStrokeClip,
            7 => Self::Clip,
            _ => return None,
        })
    }

    pub fn is_fill(self) -> bool {
        matches!(
            self,
            Self::Fill | Self::FillStroke | Self::FillClip | Self::FillStrokeClip
        )
    }

    pub fn is_stroke(self) -> bool {
        matches!(
            self,
            Self::Stroke | Self::FillStroke | Self::StrokeClip | Self::FillStrokeClip
        )
    }

    pub fn is_clip(self) -> bool {
        matches!(
            self,
            Self::FillClip | Self::StrokeClip | Self::FillStrokeClip | Self::Clip
        )
    }
}

/// Separable and non-separable blend modes (`BM` in ExtGState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            // Compatible is a deprecated alias
            "Normal" | "Compatible" => Self::Normal,
            "Multiply" => Self::Multiply,
            "Screen" => Self::Screen,
            "Overlay" => Self::Overlay,
            "Darken" => Self::Darken,
            "Lighten" => Self::Lighten,
            "ColorDodge" => Self::ColorDodge,
            "ColorBurn" => Self::ColorBurn,
            "HardLight" => Self::HardLight,
            "SoftLight" => Self::SoftLight,
            "Difference" => Self::Difference,
            "Exclusion" => Self::Exclusion,
            "Hue" => Self::Hue,
            "Saturation" => Self::Saturation,
            "Color" => Self::Color,
            "Luminosity" => Self::Luminosity,
            _ => return None,
        })
    }
}

/// Text object matrices. Reset at the start of each text object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextState {
    /// Text matrix (Tm)
    pub tm: Matrix,
    /// Text line matrix (Tlm)
    pub tlm: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            tm: MATRIX_IDENTITY,
            tlm: MATRIX_IDENTITY,
        }
    }
}

/// Computes the device transform for a content box rendered onto a canvas.
///
/// The box origin is moved to zero, scaled to the canvas (whose sides are
/// swapped for quarter turns) and rotated so that device space grows
/// downward from the canvas top-left corner.
pub fn compute_initial_ctm(rotation: Rotation, content_box: Rect, canvas_size: Size) -> Matrix {
    let (x0, y0, x1, y1) = normalize_rect(content_box);
    let (w, h) = canvas_size;
    let rotated = rotation.transform_size(canvas_size);

    let base = match rotation {
        Rotation::Downward => (1.0, 0.0, 0.0, -1.0, 0.0, h),
        Rotation::Leftward => (0.0, 1.0, 1.0, 0.0, 0.0, 0.0),
        Rotation::Upward => (-1.0, 0.0, 0.0, 1.0, w, 0.0),
        Rotation::Rightward => (0.0, -1.0, -1.0, 0.0, w, h),
    };
    let scale = scale_matrix(rotated.0 / (x1 - x0), rotated.1 / (y1 - y0));
    let shift = translation_matrix(-x0, -y0);

    mult_matrix(mult_matrix(shift, scale), base)
}

/// Graphics state of one scan level.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    /// Current transformation matrix (user space to device space)
    pub ctm: Matrix,
    /// CTM the level (re)starts from
    pub initial_ctm: Matrix,
    pub text: TextState,

    pub fill_color: Color,
    pub fill_color_space: ColorSpace,
    pub stroke_color: Color,
    pub stroke_color_space: ColorSpace,

    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub line_dash: LineDash,
    pub miter_limit: f64,

    /// Current font (None if not set or unresolved)
    pub font: Option<Arc<dyn Font>>,
    /// Current font resource name (e.g., "F1")
    pub font_name: Option<SmolStr>,
    pub font_size: f64,
    pub char_space: f64,
    pub word_space: f64,
    /// Text leading (TL)
    pub lead: f64,
    /// Horizontal scaling, normalized (1.0 = 100%)
    pub scale: f64,
    pub rise: f64,
    pub render_mode: TextRenderMode,

    pub blend_mode: SmallVec<[BlendMode; 1]>,
    pub fill_alpha: f64,
    pub stroke_alpha: f64,

    /// Device canvas size used for top-down flips
    pub canvas_size: Size,
    /// Depth of the owning scan level (0 = root)
    pub level: usize,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new(MATRIX_IDENTITY, (0.0, 0.0))
    }
}

impl GraphicsState {
    /// Create a root-level state starting from `initial_ctm`.
    pub fn new(initial_ctm: Matrix, canvas_size: Size) -> Self {
        Self {
            ctm: initial_ctm,
            initial_ctm,
            text: TextState::default(),
            fill_color: Color::default(),
            fill_color_space: ColorSpace::device_gray(),
            stroke_color: Color::default(),
            stroke_color_space: ColorSpace::device_gray(),
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            line_dash: LineDash::default(),
            miter_limit: 10.0,
            font: None,
            font_name: None,
            font_size: 0.0,
            char_space: 0.0,
            word_space: 0.0,
            lead: 0.0,
            scale: 1.0,
            rise: 0.0,
            render_mode: TextRenderMode::Fill,
            blend_mode: smallvec![BlendMode::Normal],
            fill_alpha: 1.0,
            stroke_alpha: 1.0,
            canvas_size,
            level: 0,
        }
    }

    /// Restores every parameter to its default, keeping the initial CTM,
    /// canvas size and level.
    pub fn reset(&mut self) {
        let level = self.level;
        *self = Self::new(self.initial_ctm, self.canvas_size);
        self.level = level;
    }

    /// Restarts from a new device mapping.
    pub fn reset_with(&mut self, initial_ctm: Matrix, canvas_size: Size) {
        self.initial_ctm = initial_ctm;
        self.canvas_size = canvas_size;
        self.reset();
    }

    /// Value copy tagged to a new owning scan level.
    pub fn clone_independent(&self, level: usize) -> Self {
        let mut state = self.clone();
        state.level = level;
        state
    }

    /// Copies every parameter into `target`, keeping its level.
    ///
    /// The text matrices survive only when `preserve_text_state` is set (the
    /// target scans the inside of a text object); otherwise they start from
    /// identity.
    pub fn copy_into(&self, target: &mut GraphicsState, preserve_text_state: bool) {
        let level = target.level;
        target.clone_from(self);
        target.level = level;
        if !preserve_text_state {
            target.text = TextState::default();
        }
    }

    /// Maps user space to device space. With `top_down` the result is
    /// additionally flipped within the canvas height.
    pub fn user_to_device_matrix(&self, top_down: bool) -> Matrix {
        if top_down {
            mult_matrix(self.ctm, (1.0, 0.0, 0.0, -1.0, 0.0, self.canvas_size.1))
        } else {
            self.ctm
        }
    }

    /// Maps text space to device space.
    pub fn text_to_device_matrix(&self, top_down: bool) -> Matrix {
        mult_matrix(self.text.tm, self.user_to_device_matrix(top_down))
    }

    /// Maps device space back to user space; None for degenerate CTMs.
    pub fn device_to_user_matrix(&self, top_down: bool) -> Option<Matrix> {
        invert_matrix(self.user_to_device_matrix(top_down))
    }

    pub fn render_mode_fill(&self) -> bool {
        self.render_mode.is_fill()
    }

    pub fn render_mode_stroke(&self) -> bool {
        self.render_mode.is_stroke()
    }

    pub fn render_mode_clip(&self) -> bool {
        self.render_mode.is_clip()
    }

    /// Blend mode in effect (the first entry of the `BM` list).
    pub fn effective_blend_mode(&self) -> BlendMode {
        self.blend_mode.first().copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::apply_matrix_pt;

    #[test]
    fn test_reset_keeps_initial_ctm_and_level() {
        let mut state = GraphicsState::new((2.0, 0.0, 0.0, -2.0, 0.0, 100.0), (50.0, 50.0));
        state.level = 3;
        state.ctm = MATRIX_IDENTITY;
        state.line_width = 4.0;
        state.text.tm = (1.0, 0.0, 0.0, 1.0, 9.0, 9.0);
        state.reset();
        assert_eq!(state.ctm, (2.0, 0.0, 0.0, -2.0, 0.0, 100.0));
        assert_eq!(state.level, 3);
        assert_eq!(state.line_width, 1.0);
        assert_eq!(state.text, TextState::default());
    }

    #[test]
    fn test_top_down_flip() {
        let state = GraphicsState::new(MATRIX_IDENTITY, (100.0, 80.0));
        let m = state.user_to_device_matrix(true);
        assert_eq!(apply_matrix_pt(m, (10.0, 0.0)), (10.0, 80.0));
        assert_eq!(state.user_to_device_matrix(false), MATRIX_IDENTITY);
    }

    #[test]
    fn test_render_mode_flags() {
        assert!(TextRenderMode::FillStrokeClip.is_fill());
        assert!(TextRenderMode::FillStrokeClip.is_stroke());
        assert!(TextRenderMode::FillStrokeClip.is_clip());
        assert!(!TextRenderMode::Invisible.is_fill());
        assert_eq!(TextRenderMode::from_i64(8), None);
    }

    #[test]
    fn test_blend_mode_names() {
        assert_eq!(BlendMode::from_name("Compatible"), Some(BlendMode::Normal));
        assert_eq!(BlendMode::from_name("HardLight"), Some(BlendMode::HardLight));
        assert_eq!(BlendMode::from_name("Bogus"), None);
    }
}
