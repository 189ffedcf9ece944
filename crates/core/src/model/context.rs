//! Content contexts (pages and form XObjects) and the resources they name.

use std::cell::RefCell;
use std::sync::Arc;

use bytes::Bytes;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::warn;

use super::color::ColorSpace;
use super::objects::ContentObject;
use super::state::{BlendMode, LineCap, LineDash, LineJoin};
use crate::error::Result;
use crate::font::Font;
use crate::parser::parse_content;
use crate::utils::{MATRIX_IDENTITY, Matrix, Rect, Size, normalize_rect, rect_size};

/// Page rotation, named after the direction the page top ends up facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    /// 0 degrees
    #[default]
    Downward,
    /// 90 degrees clockwise
    Leftward,
    /// 180 degrees
    Upward,
    /// 270 degrees clockwise
    Rightward,
}

impl Rotation {
    /// Normalizes a `/Rotate` value. Values that are not multiples of 90 fall
    /// back to no rotation.
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            0 => Self::Downward,
            90 => Self::Leftward,
            180 => Self::Upward,
            270 => Self::Rightward,
            other => {
                warn!(rotate = other, "rotation is not a multiple of 90; ignoring");
                Self::Downward
            }
        }
    }

    pub fn degrees(self) -> i64 {
        match self {
            Self::Downward => 0,
            Self::Leftward => 90,
            Self::Upward => 180,
            Self::Rightward => 270,
        }
    }

    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Self::Leftward | Self::Rightward)
    }

    /// Swaps width and height for quarter turns.
    pub fn transform_size(self, size: Size) -> Size {
        if self.is_quarter_turn() {
            (size.1, size.0)
        } else {
            size
        }
    }
}

/// Graphics state parameter dictionary (`gs`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtGState {
    pub line_width: Option<f64>,
    pub line_cap: Option<LineCap>,
    pub line_join: Option<LineJoin>,
    pub miter_limit: Option<f64>,
    pub line_dash: Option<LineDash>,
    /// `Font` entry: resource-independent font and size
    pub font: Option<(SmolStr, f64)>,
    pub blend_mode: Option<Vec<BlendMode>>,
    /// `ca`
    pub fill_alpha: Option<f64>,
    /// `CA`
    pub stroke_alpha: Option<f64>,
}

/// Sampled image XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u32,
    pub color_space: Option<SmolStr>,
    pub data: Bytes,
}

/// Form XObject: a self-contained content stream with its own box and matrix.
#[derive(Debug, Clone)]
pub struct FormXObject {
    pub bbox: Rect,
    pub matrix: Matrix,
    /// None inherits the resources of the invoking context
    pub resources: Option<Arc<Resources>>,
    pub contents: Vec<ContentObject>,
}

impl FormXObject {
    pub fn new(bbox: Rect, contents: Vec<ContentObject>) -> Self {
        Self {
            bbox,
            matrix: MATRIX_IDENTITY,
            resources: None,
            contents,
        }
    }

    /// Parses decoded content bytes into a form.
    pub fn parse(bbox: Rect, content: &[u8]) -> Result<Self> {
        Ok(Self::new(bbox, parse_content(content)?))
    }

    pub fn with_matrix(mut self, matrix: Matrix) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = Some(Arc::new(resources));
        self
    }
}

/// External object resource.
#[derive(Debug, Clone)]
pub enum XObject {
    Image(ImageXObject),
    Form(FormXObject),
}

impl XObject {
    pub fn as_form(&self) -> Option<&FormXObject> {
        match self {
            Self::Form(form) => Some(form),
            Self::Image(_) => None,
        }
    }
}

/// Named resources of a content context.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    pub fonts: FxHashMap<SmolStr, Arc<dyn Font>>,
    pub xobjects: FxHashMap<SmolStr, XObject>,
    pub ext_gstates: FxHashMap<SmolStr, ExtGState>,
    pub color_spaces: FxHashMap<SmolStr, ColorSpace>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, name: &str, font: Arc<dyn Font>) -> Self {
        self.fonts.insert(SmolStr::new(name), font);
        self
    }

    pub fn with_xobject(mut self, name: &str, xobject: XObject) -> Self {
        self.xobjects.insert(SmolStr::new(name), xobject);
        self
    }

    pub fn with_ext_gstate(mut self, name: &str, gstate: ExtGState) -> Self {
        self.ext_gstates.insert(SmolStr::new(name), gstate);
        self
    }

    pub fn with_color_space(mut self, name: &str, space: ColorSpace) -> Self {
        self.color_spaces.insert(SmolStr::new(name), space);
        self
    }

    pub fn font(&self, name: &str) -> Option<&Arc<dyn Font>> {
        self.fonts.get(name)
    }

    pub fn xobject(&self, name: &str) -> Option<&XObject> {
        self.xobjects.get(name)
    }

    pub fn ext_gstate(&self, name: &str) -> Option<&ExtGState> {
        self.ext_gstates.get(name)
    }

    /// Resolves a color space name: predefined spaces first, then resources.
    pub fn color_space(&self, name: &str) -> Option<ColorSpace> {
        ColorSpace::predefined(name).or_else(|| self.color_spaces.get(name).cloned())
    }

    /// Looks a font up by the resource-independent name used in ExtGState.
    pub fn font_by_fontname(&self, fontname: &str) -> Option<&Arc<dyn Font>> {
        self.fonts.values().find(|f| f.fontname() == fontname)
    }
}

/// Anything whose content stream a scanner can walk.
pub trait ContentContext {
    /// Box in user space that maps onto the device canvas.
    fn content_box(&self) -> Rect;

    fn rotation(&self) -> Rotation {
        Rotation::Downward
    }

    fn resources(&self) -> Option<&Resources>;

    /// Forms, patterns and glyph procedures start from an identity CTM.
    fn is_form(&self) -> bool {
        false
    }

    /// Size of the content box (the canvas of device-independent scans).
    fn size(&self) -> Size {
        rect_size(self.content_box())
    }
}

impl ContentContext for FormXObject {
    fn content_box(&self) -> Rect {
        normalize_rect(self.bbox)
    }

    fn resources(&self) -> Option<&Resources> {
        self.resources.as_deref()
    }

    fn is_form(&self) -> bool {
        true
    }
}

/// A page: its boxes, rotation, resources and editable content sequence.
#[derive(Debug)]
pub struct Page {
    pub media_box: Rect,
    pub crop_box: Option<Rect>,
    pub rotation: Rotation,
    pub resources: Resources,
    pub contents: RefCell<Vec<ContentObject>>,
}

impl Page {
    pub fn new(media_box: Rect, resources: Resources, contents: Vec<ContentObject>) -> Self {
        Self {
            media_box,
            crop_box: None,
            rotation: Rotation::Downward,
            resources,
            contents: RefCell::new(contents),
        }
    }

    /// Parses decoded content bytes into a page.
    pub fn parse(media_box: Rect, resources: Resources, content: &[u8]) -> Result<Self> {
        Ok(Self::new(media_box, resources, parse_content(content)?))
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_crop_box(mut self, crop_box: Rect) -> Self {
        self.crop_box = Some(crop_box);
        self
    }

    /// Snapshot of the current content sequence.
    pub fn objects(&self) -> Vec<ContentObject> {
        self.contents.borrow().clone()
    }
}

impl ContentContext for Page {
    fn content_box(&self) -> Rect {
        normalize_rect(self.crop_box.unwrap_or(self.media_box))
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn resources(&self) -> Option<&Resources> {
        Some(&self.resources)
    }
}
