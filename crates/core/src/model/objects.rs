//! Content objects: the instruction tree a scanner walks.
//!
//! A content stream is a sequence of `ContentObject`s. Leaves are single
//! operations; composites group the objects between `BT/ET`, `q/Q` and
//! `BMC|BDC/EMC`.

use bytes::Bytes;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use smol_str::SmolStr;

use super::color::Color;
use super::state::{LineCap, LineDash, LineJoin, TextRenderMode};
use crate::error::{Result, ScanError};
use crate::utils::{Matrix, Point};

/// Operand value appearing in a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    /// Null object
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Real (floating point) value
    Real(f64),
    /// Name object (e.g., /F1)
    Name(SmolStr),
    /// String (byte array)
    String(Vec<u8>),
    /// Array of objects
    Array(Vec<Self>),
    /// Dictionary (name -> object mapping)
    Dict(FxHashMap<SmolStr, Self>),
}

impl PdfObject {
    /// Type name for error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Name(_) => "name",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
        }
    }

    /// Get numeric value (int or real coerced to f64)
    pub const fn as_num(&self) -> Result<f64> {
        match self {
            Self::Int(n) => Ok(*n as f64),
            Self::Real(n) => Ok(*n),
            _ => Err(ScanError::TypeError {
                expected: "number",
                got: self.type_name(),
            }),
        }
    }

    /// Get as integer; reals with no fractional part are accepted.
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Real(n) if n.fract() == 0.0 => Ok(*n as i64),
            _ => Err(ScanError::TypeError {
                expected: "int",
                got: self.type_name(),
            }),
        }
    }

    /// Get as name string
    pub fn as_name(&self) -> Result<&str> {
        match self {
            Self::Name(s) => Ok(s),
            _ => Err(ScanError::TypeError {
                expected: "name",
                got: self.type_name(),
            }),
        }
    }

    /// Get as byte string
    pub fn as_string(&self) -> Result<&[u8]> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(ScanError::TypeError {
                expected: "string",
                got: self.type_name(),
            }),
        }
    }

    /// Get as array
    pub fn as_array(&self) -> Result<&[Self]> {
        match self {
            Self::Array(arr) => Ok(arr),
            _ => Err(ScanError::TypeError {
                expected: "array",
                got: self.type_name(),
            }),
        }
    }

    /// Get as dictionary
    pub const fn as_dict(&self) -> Result<&FxHashMap<SmolStr, Self>> {
        match self {
            Self::Dict(d) => Ok(d),
            _ => Err(ScanError::TypeError {
                expected: "dict",
                got: self.type_name(),
            }),
        }
    }
}

/// Element of a `TJ` array.
#[derive(Debug, Clone, PartialEq)]
pub enum TextElement {
    /// Encoded string to show
    Text(Vec<u8>),
    /// Position adjustment in thousandths of text space (subtracted from the advance)
    Adjust(f64),
}

/// Text-showing operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ShowText {
    /// `Tj`
    Simple(Vec<u8>),
    /// `TJ`
    Adjusted(Vec<TextElement>),
    /// `'`
    NextLine(Vec<u8>),
    /// `"`
    NextLineSpaced {
        word_space: f64,
        char_space: f64,
        text: Vec<u8>,
    },
}

impl ShowText {
    pub fn operator(&self) -> &'static str {
        match self {
            Self::Simple(_) => "Tj",
            Self::Adjusted(_) => "TJ",
            Self::NextLine(_) => "'",
            Self::NextLineSpaced { .. } => "\"",
        }
    }

    /// Whether the operation moves to the next line before showing.
    pub fn starts_new_line(&self) -> bool {
        matches!(self, Self::NextLine(_) | Self::NextLineSpaced { .. })
    }

    /// Strings and adjustments in showing order.
    pub fn elements(&self) -> Vec<TextElement> {
        match self {
            Self::Simple(text) | Self::NextLine(text) | Self::NextLineSpaced { text, .. } => {
                vec![TextElement::Text(text.clone())]
            }
            Self::Adjusted(elements) => elements.clone(),
        }
    }
}

/// Fill rule applied when painting or clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// Path-painting operators (`S s f F f* B B* b b*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintPath {
    pub close: bool,
    pub fill: Option<FillRule>,
    pub stroke: bool,
}

/// Inline image (`BI ... ID ... EI`).
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub header: FxHashMap<SmolStr, PdfObject>,
    pub data: Bytes,
}

impl InlineImage {
    /// Header lookup accepting both the abbreviated and the full key.
    pub fn get(&self, abbrev: &str, full: &str) -> Option<&PdfObject> {
        self.header.get(abbrev).or_else(|| self.header.get(full))
    }

    pub fn width(&self) -> u32 {
        self.get("W", "Width")
            .and_then(|v| v.as_int().ok())
            .map_or(0, |w| w.max(0) as u32)
    }

    pub fn height(&self) -> u32 {
        self.get("H", "Height")
            .and_then(|v| v.as_int().ok())
            .map_or(0, |h| h.max(0) as u32)
    }

    pub fn bits_per_component(&self) -> u32 {
        self.get("BPC", "BitsPerComponent")
            .and_then(|v| v.as_int().ok())
            .map_or(8, |b| b.max(0) as u32)
    }

    /// Color space name, with the inline abbreviations expanded.
    pub fn color_space(&self) -> Option<&str> {
        let name = self.get("CS", "ColorSpace")?.as_name().ok()?;
        Some(match name {
            "G" => "DeviceGray",
            "RGB" => "DeviceRGB",
            "CMYK" => "DeviceCMYK",
            "I" => "Indexed",
            other => other,
        })
    }
}

/// Leaf instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    // General graphics state
    SetLineWidth(f64),
    SetLineCap(LineCap),
    SetLineJoin(LineJoin),
    SetMiterLimit(f64),
    SetLineDash(LineDash),
    SetRenderingIntent(SmolStr),
    SetFlatness(f64),
    /// `gs`: apply a named ExtGState resource
    ApplyExtGState(SmolStr),
    /// `cm`
    ModifyCtm(Matrix),

    // Color
    SetColorSpace {
        stroke: bool,
        name: SmolStr,
    },
    /// `SC SCN sc scn`
    SetColor {
        stroke: bool,
        components: SmallVec<[f64; 4]>,
        pattern: Option<SmolStr>,
    },
    /// `G g RG rg K k`
    SetDeviceColor {
        stroke: bool,
        color: Color,
    },

    // Path construction
    BeginSubpath(Point),
    LineTo(Point),
    /// `c`, `v` (c1 is the current point) and `y` (c2 is the end point)
    CurveTo {
        c1: Option<Point>,
        c2: Option<Point>,
        end: Point,
    },
    /// `re` as (x, y, width, height)
    Rectangle(f64, f64, f64, f64),
    CloseSubpath,

    // Path painting
    PaintPath(PaintPath),
    /// `n`
    EndPath,
    /// `W W*`
    ClipPath(FillRule),

    // Text state
    SetCharSpace(f64),
    SetWordSpace(f64),
    /// `Tz` in percent
    SetHorizontalScale(f64),
    SetTextLead(f64),
    SetFont {
        name: SmolStr,
        size: f64,
    },
    SetTextRenderMode(TextRenderMode),
    SetTextRise(f64),

    // Text positioning
    /// `Td`, and `TD` when `set_lead` is true
    TranslateTextRelative {
        dx: f64,
        dy: f64,
        set_lead: bool,
    },
    SetTextMatrix(Matrix),
    /// `T*`
    TranslateTextToNextLine,

    // Text showing
    ShowText(ShowText),

    // External objects
    /// `Do`
    PaintXObject(SmolStr),
    /// `sh`
    PaintShading(SmolStr),
    InlineImage(InlineImage),

    /// `MP DP`
    MarkedContentPoint {
        tag: SmolStr,
        properties: Option<PdfObject>,
    },

    /// Operator this crate does not interpret (or whose operands were malformed).
    Unknown {
        operator: SmolStr,
        operands: Vec<PdfObject>,
    },
}

impl Operation {
    /// Content-stream operator of this instruction.
    pub fn operator(&self) -> &str {
        match self {
            Self::SetLineWidth(_) => "w",
            Self::SetLineCap(_) => "J",
            Self::SetLineJoin(_) => "j",
            Self::SetMiterLimit(_) => "M",
            Self::SetLineDash(_) => "d",
            Self::SetRenderingIntent(_) => "ri",
            Self::SetFlatness(_) => "i",
            Self::ApplyExtGState(_) => "gs",
            Self::ModifyCtm(_) => "cm",
            Self::SetColorSpace { stroke: true, .. } => "CS",
            Self::SetColorSpace { stroke: false, .. } => "cs",
            Self::SetColor { stroke: true, .. } => "SCN",
            Self::SetColor { stroke: false, .. } => "scn",
            Self::SetDeviceColor { stroke, color } => match (stroke, color) {
                (true, Color::Rgb(..)) => "RG",
                (false, Color::Rgb(..)) => "rg",
                (true, Color::Cmyk(..)) => "K",
                (false, Color::Cmyk(..)) => "k",
                (true, _) => "G",
                (false, _) => "g",
            },
            Self::BeginSubpath(_) => "m",
            Self::LineTo(_) => "l",
            Self::CurveTo { c1: None, .. } => "v",
            Self::CurveTo { c2: None, .. } => "y",
            Self::CurveTo { .. } => "c",
            Self::Rectangle(..) => "re",
            Self::CloseSubpath => "h",
            Self::PaintPath(p) => match (p.close, p.fill, p.stroke) {
                (false, None, true) => "S",
                (true, None, _) => "s",
                (false, Some(FillRule::NonZero), false) => "f",
                (false, Some(FillRule::EvenOdd), false) => "f*",
                (false, Some(FillRule::NonZero), true) => "B",
                (false, Some(FillRule::EvenOdd), true) => "B*",
                (true, Some(FillRule::NonZero), _) => "b",
                (true, Some(FillRule::EvenOdd), _) => "b*",
                (false, None, false) => "n",
            },
            Self::EndPath => "n",
            Self::ClipPath(FillRule::NonZero) => "W",
            Self::ClipPath(FillRule::EvenOdd) => "W*",
            Self::SetCharSpace(_) => "Tc",
            Self::SetWordSpace(_) => "Tw",
            Self::SetHorizontalScale(_) => "Tz",
            Self::SetTextLead(_) => "TL",
            Self::SetFont { .. } => "Tf",
            Self::SetTextRenderMode(_) => "Tr",
            Self::SetTextRise(_) => "Ts",
            Self::TranslateTextRelative { set_lead: true, .. } => "TD",
            Self::TranslateTextRelative { set_lead: false, .. } => "Td",
            Self::SetTextMatrix(_) => "Tm",
            Self::TranslateTextToNextLine => "T*",
            Self::ShowText(show) => show.operator(),
            Self::PaintXObject(_) => "Do",
            Self::PaintShading(_) => "sh",
            Self::InlineImage(_) => "BI",
            Self::MarkedContentPoint {
                properties: None, ..
            } => "MP",
            Self::MarkedContentPoint { .. } => "DP",
            Self::Unknown { operator, .. } => operator.as_str(),
        }
    }
}

/// Kind of composite instruction group.
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeKind {
    /// `BT ... ET`
    Text,
    /// `q ... Q`
    LocalGraphicsState,
    /// `BMC|BDC ... EMC`
    MarkedContent {
        tag: SmolStr,
        properties: Option<PdfObject>,
    },
}

impl CompositeKind {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }
}

/// Group of nested content objects.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeObject {
    pub kind: CompositeKind,
    pub objects: Vec<ContentObject>,
}

impl CompositeObject {
    pub fn new(kind: CompositeKind, objects: Vec<ContentObject>) -> Self {
        Self { kind, objects }
    }
}

/// Node of the instruction tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentObject {
    Leaf(Operation),
    Composite(CompositeObject),
}

impl ContentObject {
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    pub fn as_leaf(&self) -> Option<&Operation> {
        match self {
            Self::Leaf(op) => Some(op),
            Self::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeObject> {
        match self {
            Self::Composite(c) => Some(c),
            Self::Leaf(_) => None,
        }
    }

    /// Total number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Composite(c) => c.objects.iter().map(Self::leaf_count).sum(),
        }
    }
}

impl From<Operation> for ContentObject {
    fn from(op: Operation) -> Self {
        Self::Leaf(op)
    }
}

impl From<CompositeObject> for ContentObject {
    fn from(c: CompositeObject) -> Self {
        Self::Composite(c)
    }
}
