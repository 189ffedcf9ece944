//! Text wrappers: one text-showing operation, and one whole text object.

use std::cell::OnceCell;

use smol_str::SmolStr;

use crate::interp::scanner::ContentScanner;
use crate::interp::text::show_text;
use crate::model::color::Color;
use crate::model::objects::{ContentObject, Operation, ShowText};
use crate::model::state::{GraphicsState, TextRenderMode};
use crate::utils::{Quad, Rect, matrix_scale_x, matrix_scale_y, rect_union};

/// Empty box reported by wrappers without content.
const EMPTY_BOX: Rect = (0.0, 0.0, 0.0, 0.0);

/// One shown character and its device-space quad.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChar {
    pub code: u32,
    pub text: String,
    pub quad: Quad,
}

/// Appearance of a text string, with sizes measured in text space after the
/// text matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_name: Option<SmolStr>,
    pub font_size: f64,
    pub render_mode: TextRenderMode,
    pub fill_color: Color,
    pub stroke_color: Color,
    /// Horizontal scale including the text matrix stretch
    pub scale_x: f64,
}

/// View over one text-showing operation.
///
/// Characters are produced by replaying the operation on a copy of the state
/// in effect, the first time they are asked for.
#[derive(Debug, Clone)]
pub struct TextStringWrapper {
    show: ShowText,
    state: GraphicsState,
    chars: OnceCell<Vec<TextChar>>,
    bbox: OnceCell<Rect>,
}

impl TextStringWrapper {
    pub fn new(show: &ShowText, state: &GraphicsState) -> Self {
        Self {
            show: show.clone(),
            state: state.clone(),
            chars: OnceCell::new(),
            bbox: OnceCell::new(),
        }
    }

    pub fn show(&self) -> &ShowText {
        &self.show
    }

    /// State in effect before the operation.
    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    pub fn chars(&self) -> &[TextChar] {
        self.chars.get_or_init(|| {
            let mut state = self.state.clone();
            let mut chars = Vec::new();
            show_text(&mut state, &self.show, |_, placed| {
                chars.push(TextChar {
                    code: placed.code,
                    text: placed.text.clone(),
                    quad: placed.quad,
                });
            });
            chars
        })
    }

    pub fn text(&self) -> String {
        self.chars().iter().map(|c| c.text.as_str()).collect()
    }

    /// Union of the character quads; a zero box when nothing was shown.
    pub fn bbox(&self) -> Rect {
        *self.bbox.get_or_init(|| {
            self.chars()
                .iter()
                .map(|c| c.quad.bounds())
                .reduce(rect_union)
                .unwrap_or(EMPTY_BOX)
        })
    }

    pub fn style(&self) -> TextStyle {
        let tm = self.state.text.tm;
        TextStyle {
            font_name: self.state.font_name.clone(),
            font_size: self.state.font_size * matrix_scale_y(tm),
            render_mode: self.state.render_mode,
            fill_color: self.state.fill_color.clone(),
            stroke_color: self.state.stroke_color.clone(),
            scale_x: self.state.scale * matrix_scale_x(tm),
        }
    }
}

/// View over a text object (`BT ... ET`), collecting its text strings.
#[derive(Debug, Clone)]
pub struct TextWrapper {
    strings: Vec<TextStringWrapper>,
    bbox: OnceCell<Rect>,
}

impl TextWrapper {
    /// Dry-scans the text object at the scanner cursor. The scanner itself
    /// is not moved.
    pub fn new(scanner: &ContentScanner<'_, '_>) -> Self {
        let mut strings = Vec::new();
        if let Some(mut level) = scanner.child_level() {
            extract(&mut level, &mut strings);
        }
        Self {
            strings,
            bbox: OnceCell::new(),
        }
    }

    pub fn text_strings(&self) -> &[TextStringWrapper] {
        &self.strings
    }

    pub fn text(&self) -> String {
        self.strings.iter().map(TextStringWrapper::text).collect()
    }

    pub fn bbox(&self) -> Rect {
        *self.bbox.get_or_init(|| {
            self.strings
                .iter()
                .filter(|s| !s.chars().is_empty())
                .map(TextStringWrapper::bbox)
                .reduce(rect_union)
                .unwrap_or(EMPTY_BOX)
        })
    }
}

/// Collects text strings from `level` and every composite below it.
fn extract(level: &mut ContentScanner<'_, '_>, strings: &mut Vec<TextStringWrapper>) {
    level.move_start();
    while level.move_next() {
        let Some(object) = level.current() else {
            break;
        };
        match &*object {
            ContentObject::Leaf(Operation::ShowText(show)) => {
                strings.push(TextStringWrapper::new(show, level.state()));
            }
            ContentObject::Composite(_) => {
                if let Some(mut child) = level.child_level() {
                    extract(&mut child, strings);
                }
            }
            ContentObject::Leaf(_) => {}
        }
    }
}
