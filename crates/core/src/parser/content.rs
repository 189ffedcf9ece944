//! Content-stream parser: operands and operators into the instruction tree.
//!
//! Operands precede their operator. Arrays and dictionaries nest; inline
//! images (BI/ID/EI) carry raw data. The tree builder groups `BT/ET`, `q/Q`
//! and `BMC|BDC/EMC` into composites.

use bytes::Bytes;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::lexer::{ContentLexer, Token};
use crate::error::{Result, ScanError};
use crate::model::color::Color;
use crate::model::objects::{
    CompositeKind, CompositeObject, ContentObject, FillRule, InlineImage, Operation, PaintPath,
    PdfObject, ShowText, TextElement,
};
use crate::model::state::{LineCap, LineDash, LineJoin, TextRenderMode};

/// Groups nested deeper than this are flattened into their parent.
pub const MAX_NESTING: usize = 256;

/// Raw instruction produced by [`ContentParser`].
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Operator {
        operator: SmolStr,
        operands: Vec<PdfObject>,
    },
    InlineImage(InlineImage),
}

enum Context {
    Array(Vec<PdfObject>),
    Dict(Vec<PdfObject>),
}

/// Parser for decoded content streams.
pub struct ContentParser<'a> {
    lexer: ContentLexer<'a>,
    operands: Vec<PdfObject>,
    context_stack: Vec<Context>,
    in_inline_dict: bool,
}

impl<'a> ContentParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            lexer: ContentLexer::new(data),
            operands: Vec::new(),
            context_stack: Vec::new(),
            in_inline_dict: false,
        }
    }

    /// Get the next instruction.
    ///
    /// Malformed tokens are skipped; an unterminated string at the end of the
    /// data is an error.
    pub fn next_instruction(&mut self) -> Option<Result<Instruction>> {
        loop {
            let (pos, token) = match self.lexer.next_token()? {
                Ok(t) => t,
                Err(ScanError::TokenError { pos, msg }) => {
                    trace!(pos, %msg, "skipping bad token");
                    continue;
                }
                Err(e) => return Some(Err(e)),
            };

            let keyword = match token {
                Token::Keyword(kw) => kw,
                other => {
                    self.push_operand(token_to_object(other));
                    continue;
                }
            };

            match keyword.as_str() {
                "[" => self.context_stack.push(Context::Array(Vec::new())),
                "<<" => self.context_stack.push(Context::Dict(Vec::new())),
                "]" => {
                    if let Some(Context::Array(items)) = self.context_stack.pop() {
                        self.push_operand(PdfObject::Array(items));
                    }
                }
                ">>" => {
                    if let Some(Context::Dict(items)) = self.context_stack.pop() {
                        self.push_operand(PdfObject::Dict(build_dict(items)));
                    }
                }
                // procedures only occur in PostScript calculator functions
                "{" | "}" => {}
                "BI" => {
                    self.in_inline_dict = true;
                    self.operands.clear();
                }
                "ID" if self.in_inline_dict => {
                    self.in_inline_dict = false;
                    let header = build_dict(std::mem::take(&mut self.operands));
                    let eos = inline_eos(&header);
                    let data = self.lexer.read_inline_data(eos);
                    return Some(Ok(Instruction::InlineImage(InlineImage {
                        header,
                        data: Bytes::from(data),
                    })));
                }
                _ if !self.context_stack.is_empty() => {
                    // bare keywords inside arrays (e.g. null) become operands
                    self.push_operand(keyword_operand(keyword));
                }
                _ if self.in_inline_dict => self.operands.push(keyword_operand(keyword)),
                "null" => self.operands.push(PdfObject::Null),
                _ => {
                    trace!(pos, operator = %keyword, "operator");
                    return Some(Ok(Instruction::Operator {
                        operator: keyword,
                        operands: std::mem::take(&mut self.operands),
                    }));
                }
            }
        }
    }

    fn push_operand(&mut self, obj: PdfObject) {
        match self.context_stack.last_mut() {
            Some(Context::Array(items)) | Some(Context::Dict(items)) => items.push(obj),
            None => self.operands.push(obj),
        }
    }
}

impl Iterator for ContentParser<'_> {
    type Item = Result<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_instruction()
    }
}

fn token_to_object(token: Token) -> PdfObject {
    match token {
        Token::Int(n) => PdfObject::Int(n),
        Token::Real(n) => PdfObject::Real(n),
        Token::Bool(b) => PdfObject::Bool(b),
        Token::Name(n) => PdfObject::Name(n),
        Token::String(s) => PdfObject::String(s),
        Token::Keyword(k) => keyword_operand(k),
    }
}

fn keyword_operand(keyword: SmolStr) -> PdfObject {
    if keyword == "null" {
        PdfObject::Null
    } else {
        // inline image values such as /CS RGB written without a slash
        PdfObject::Name(keyword)
    }
}

fn build_dict(items: Vec<PdfObject>) -> FxHashMap<SmolStr, PdfObject> {
    let mut dict = FxHashMap::default();
    let mut iter = items.into_iter();
    while let Some(key) = iter.next() {
        if let PdfObject::Name(name) = key
            && let Some(value) = iter.next()
        {
            dict.insert(name, value);
        }
    }
    dict
}

/// End-of-data marker for inline images: ASCII85 data ends with `~>`.
fn inline_eos(header: &FxHashMap<SmolStr, PdfObject>) -> &'static [u8] {
    let is_a85 = |obj: &PdfObject| matches!(obj.as_name(), Ok("A85" | "ASCII85Decode"));
    let filter = header.get("F").or_else(|| header.get("Filter"));
    let first = match filter {
        Some(PdfObject::Array(filters)) => filters.first(),
        other => other,
    };
    if first.is_some_and(is_a85) {
        b"~>"
    } else {
        b"EI"
    }
}

// Operand helpers: operands are consumed from the end, like a stack.

fn pop_number(args: &mut Vec<PdfObject>) -> Option<f64> {
    args.pop().and_then(|t| t.as_num().ok())
}

fn pop_int(args: &mut Vec<PdfObject>) -> Option<i64> {
    args.pop().and_then(|t| t.as_int().ok())
}

fn pop_string(args: &mut Vec<PdfObject>) -> Option<Vec<u8>> {
    args.pop().and_then(|t| match t {
        PdfObject::String(s) => Some(s),
        _ => None,
    })
}

fn pop_name(args: &mut Vec<PdfObject>) -> Option<SmolStr> {
    args.pop().and_then(|t| match t {
        PdfObject::Name(s) => Some(s),
        _ => None,
    })
}

fn pop_point(args: &mut Vec<PdfObject>) -> Option<(f64, f64)> {
    let y = pop_number(args)?;
    let x = pop_number(args)?;
    Some((x, y))
}

fn pop_matrix(args: &mut Vec<PdfObject>) -> Option<(f64, f64, f64, f64, f64, f64)> {
    let f = pop_number(args)?;
    let e = pop_number(args)?;
    let d = pop_number(args)?;
    let c = pop_number(args)?;
    let b = pop_number(args)?;
    let a = pop_number(args)?;
    Some((a, b, c, d, e, f))
}

fn pop_text_seq(args: &mut Vec<PdfObject>) -> Option<Vec<TextElement>> {
    args.pop().and_then(|t| match t {
        PdfObject::Array(arr) => Some(
            arr.into_iter()
                .filter_map(|item| match item {
                    PdfObject::Int(n) => Some(TextElement::Adjust(n as f64)),
                    PdfObject::Real(n) => Some(TextElement::Adjust(n)),
                    PdfObject::String(s) => Some(TextElement::Text(s)),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Maps an operator and its operands onto a typed operation.
///
/// Operands that are missing or of the wrong type yield `Operation::Unknown`
/// carrying the original operands.
pub fn build_operation(operator: &str, operands: Vec<PdfObject>) -> Operation {
    let mut args = operands.clone();
    typed_operation(operator, &mut args).unwrap_or_else(|| {
        if !matches!(operator, "BX" | "EX" | "d0" | "d1") {
            debug!(operator, operands = operands.len(), "unrecognized operation");
        }
        Operation::Unknown {
            operator: SmolStr::new(operator),
            operands,
        }
    })
}

fn typed_operation(operator: &str, args: &mut Vec<PdfObject>) -> Option<Operation> {
    use Operation as Op;

    let paint = |close, fill, stroke| Some(Op::PaintPath(PaintPath { close, fill, stroke }));

    match operator {
        // general graphics state
        "w" => pop_number(args).map(Op::SetLineWidth),
        "J" => pop_int(args).and_then(LineCap::from_i64).map(Op::SetLineCap),
        "j" => pop_int(args).and_then(LineJoin::from_i64).map(Op::SetLineJoin),
        "M" => pop_number(args).map(Op::SetMiterLimit),
        "d" => {
            let phase = pop_number(args)?;
            let array = args.pop()?;
            let values: Vec<f64> = array
                .as_array()
                .ok()?
                .iter()
                .filter_map(|v| v.as_num().ok())
                .collect();
            Some(Op::SetLineDash(LineDash::new(&values, phase)))
        }
        "ri" => pop_name(args).map(Op::SetRenderingIntent),
        "i" => pop_number(args).map(Op::SetFlatness),
        "gs" => pop_name(args).map(Op::ApplyExtGState),
        "cm" => pop_matrix(args).map(Op::ModifyCtm),

        // color
        "CS" | "cs" => pop_name(args).map(|name| Op::SetColorSpace {
            stroke: operator == "CS",
            name,
        }),
        "SC" | "SCN" | "sc" | "scn" => {
            let pattern = match args.last() {
                Some(PdfObject::Name(_)) => pop_name(args),
                _ => None,
            };
            let components: SmallVec<[f64; 4]> =
                args.iter().filter_map(|v| v.as_num().ok()).collect();
            Some(Op::SetColor {
                stroke: operator.starts_with('S'),
                components,
                pattern,
            })
        }
        "G" | "g" => pop_number(args).map(|g| Op::SetDeviceColor {
            stroke: operator == "G",
            color: Color::Gray(g),
        }),
        "RG" | "rg" => {
            let b = pop_number(args)?;
            let g = pop_number(args)?;
            let r = pop_number(args)?;
            Some(Op::SetDeviceColor {
                stroke: operator == "RG",
                color: Color::Rgb(r, g, b),
            })
        }
        "K" | "k" => {
            let k = pop_number(args)?;
            let y = pop_number(args)?;
            let m = pop_number(args)?;
            let c = pop_number(args)?;
            Some(Op::SetDeviceColor {
                stroke: operator == "K",
                color: Color::Cmyk(c, m, y, k),
            })
        }

        // path construction
        "m" => pop_point(args).map(Op::BeginSubpath),
        "l" => pop_point(args).map(Op::LineTo),
        "c" => {
            let end = pop_point(args)?;
            let c2 = pop_point(args)?;
            let c1 = pop_point(args)?;
            Some(Op::CurveTo {
                c1: Some(c1),
                c2: Some(c2),
                end,
            })
        }
        "v" => {
            let end = pop_point(args)?;
            let c2 = pop_point(args)?;
            Some(Op::CurveTo {
                c1: None,
                c2: Some(c2),
                end,
            })
        }
        "y" => {
            let end = pop_point(args)?;
            let c1 = pop_point(args)?;
            Some(Op::CurveTo {
                c1: Some(c1),
                c2: None,
                end,
            })
        }
        "re" => {
            let (w, h) = pop_point(args)?;
            let (x, y) = pop_point(args)?;
            Some(Op::Rectangle(x, y, w, h))
        }
        "h" => Some(Op::CloseSubpath),

        // path painting
        "S" => paint(false, None, true),
        "s" => paint(true, None, true),
        "f" | "F" => paint(false, Some(FillRule::NonZero), false),
        "f*" => paint(false, Some(FillRule::EvenOdd), false),
        "B" => paint(false, Some(FillRule::NonZero), true),
        "B*" => paint(false, Some(FillRule::EvenOdd), true),
        "b" => paint(true, Some(FillRule::NonZero), true),
        "b*" => paint(true, Some(FillRule::EvenOdd), true),
        "n" => Some(Op::EndPath),
        "W" => Some(Op::ClipPath(FillRule::NonZero)),
        "W*" => Some(Op::ClipPath(FillRule::EvenOdd)),

        // text state
        "Tc" => pop_number(args).map(Op::SetCharSpace),
        "Tw" => pop_number(args).map(Op::SetWordSpace),
        "Tz" => pop_number(args).map(Op::SetHorizontalScale),
        "TL" => pop_number(args).map(Op::SetTextLead),
        "Tf" => {
            let size = pop_number(args)?;
            let name = pop_name(args)?;
            Some(Op::SetFont { name, size })
        }
        "Tr" => pop_int(args)
            .and_then(TextRenderMode::from_i64)
            .map(Op::SetTextRenderMode),
        "Ts" => pop_number(args).map(Op::SetTextRise),

        // text positioning
        "Td" | "TD" => pop_point(args).map(|(dx, dy)| Op::TranslateTextRelative {
            dx,
            dy,
            set_lead: operator == "TD",
        }),
        "Tm" => pop_matrix(args).map(Op::SetTextMatrix),
        "T*" => Some(Op::TranslateTextToNextLine),

        // text showing
        "Tj" => pop_string(args).map(|s| Op::ShowText(ShowText::Simple(s))),
        "TJ" => pop_text_seq(args).map(|seq| Op::ShowText(ShowText::Adjusted(seq))),
        "'" => pop_string(args).map(|s| Op::ShowText(ShowText::NextLine(s))),
        "\"" => {
            let text = pop_string(args)?;
            let char_space = pop_number(args)?;
            let word_space = pop_number(args)?;
            Some(Op::ShowText(ShowText::NextLineSpaced {
                word_space,
                char_space,
                text,
            }))
        }

        // external objects
        "Do" => pop_name(args).map(Op::PaintXObject),
        "sh" => pop_name(args).map(Op::PaintShading),

        // marked content points
        "MP" => pop_name(args).map(|tag| Op::MarkedContentPoint {
            tag,
            properties: None,
        }),
        "DP" => {
            let properties = args.pop()?;
            let tag = pop_name(args)?;
            Some(Op::MarkedContentPoint {
                tag,
                properties: Some(properties),
            })
        }

        _ => None,
    }
}

/// Open group while building the tree.
struct Frame {
    kind: CompositeKind,
    objects: Vec<ContentObject>,
}

/// Builds the instruction tree from a flat instruction stream.
#[derive(Default)]
pub struct TreeBuilder {
    root: Vec<ContentObject>,
    stack: Vec<Frame>,
    /// Openers ignored because the nesting limit was reached
    flattened: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&mut self) -> &mut Vec<ContentObject> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.objects,
            None => &mut self.root,
        }
    }

    fn open(&mut self, kind: CompositeKind) {
        if self.stack.len() >= MAX_NESTING {
            debug!(depth = self.stack.len(), "nesting limit reached; flattening group");
            self.flattened += 1;
            return;
        }
        self.stack.push(Frame {
            kind,
            objects: Vec::new(),
        });
    }

    fn close_top(&mut self) {
        if let Some(frame) = self.stack.pop() {
            let composite = ContentObject::Composite(CompositeObject::new(frame.kind, frame.objects));
            self.current().push(composite);
        }
    }

    /// Closes the innermost group matching `pred`, closing any groups opened
    /// inside it first. Unmatched closers are ignored.
    fn close(&mut self, operator: &str, pred: impl Fn(&CompositeKind) -> bool) {
        if self.flattened > 0 {
            self.flattened -= 1;
            return;
        }
        match self.stack.iter().rposition(|f| pred(&f.kind)) {
            Some(idx) => {
                if idx + 1 < self.stack.len() {
                    debug!(operator, "closing mismatched nested groups");
                }
                while self.stack.len() > idx {
                    self.close_top();
                }
            }
            None => debug!(operator, "ignoring unbalanced closing operator"),
        }
    }

    pub fn push(&mut self, instruction: Instruction) {
        let (operator, operands) = match instruction {
            Instruction::InlineImage(image) => {
                self.current().push(Operation::InlineImage(image).into());
                return;
            }
            Instruction::Operator { operator, operands } => (operator, operands),
        };

        match operator.as_str() {
            "BT" => self.open(CompositeKind::Text),
            "q" => self.open(CompositeKind::LocalGraphicsState),
            "BMC" | "BDC" => {
                let mut args = operands;
                let properties = if operator == "BDC" { args.pop() } else { None };
                let tag = pop_name(&mut args).unwrap_or_default();
                self.open(CompositeKind::MarkedContent { tag, properties });
            }
            "ET" => self.close("ET", CompositeKind::is_text),
            "Q" => self.close("Q", |k| matches!(k, CompositeKind::LocalGraphicsState)),
            "EMC" => self.close("EMC", |k| matches!(k, CompositeKind::MarkedContent { .. })),
            _ => {
                let op = build_operation(&operator, operands);
                self.current().push(op.into());
            }
        }
    }

    /// Closes any groups left open and returns the tree.
    pub fn finish(mut self) -> Vec<ContentObject> {
        if !self.stack.is_empty() {
            debug!(open = self.stack.len(), "closing unterminated groups at end of stream");
        }
        while !self.stack.is_empty() {
            self.close_top();
        }
        self.root
    }
}

/// Parses decoded content-stream bytes into the instruction tree.
pub fn parse_content(data: &[u8]) -> Result<Vec<ContentObject>> {
    let mut builder = TreeBuilder::new();
    for instruction in ContentParser::new(data) {
        builder.push(instruction?);
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_with_operands() {
        let mut parser = ContentParser::new(b"1 0 0 1 10 20 cm");
        let instr = parser.next_instruction().unwrap().unwrap();
        assert_eq!(
            build_operation("cm", match instr {
                Instruction::Operator { operands, .. } => operands,
                Instruction::InlineImage(_) => panic!("unexpected inline image"),
            }),
            Operation::ModifyCtm((1.0, 0.0, 0.0, 1.0, 10.0, 20.0))
        );
        assert!(parser.next_instruction().is_none());
    }

    #[test]
    fn test_missing_operands_degrade_to_unknown() {
        let op = build_operation("Tf", vec![PdfObject::Int(12)]);
        assert_eq!(
            op,
            Operation::Unknown {
                operator: "Tf".into(),
                operands: vec![PdfObject::Int(12)],
            }
        );
    }

    #[test]
    fn test_scn_with_pattern() {
        let op = build_operation(
            "scn",
            vec![PdfObject::Real(0.5), PdfObject::Name("P1".into())],
        );
        assert_eq!(
            op,
            Operation::SetColor {
                stroke: false,
                components: SmallVec::from_slice(&[0.5]),
                pattern: Some("P1".into()),
            }
        );
    }

    #[test]
    fn test_ascii85_inline_image_end_marker() {
        let tree = parse_content(b"BI /W 1 /H 1 /F /A85 ID abc~> EI Q").unwrap();
        match &tree[0] {
            ContentObject::Leaf(Operation::InlineImage(image)) => {
                assert_eq!(&image.data[..], b"abc");
            }
            other => panic!("expected inline image, got {other:?}"),
        }
        assert_eq!(tree.len(), 1);
    }
}
