//! Font capabilities consumed by text showing.
//!
//! The scanner never resolves outlines. It needs to decode character codes,
//! map them to Unicode, and know advance widths and a glyph box in text space.
//! - `simple` - single-byte fonts with a width table
//! - `cid` - two-byte CID-keyed fonts, horizontal or vertical

pub mod cid;
pub mod simple;

use std::fmt;

pub use cid::CidFont;
pub use simple::SimpleFont;

/// Character displacement in text space (already divided by 1000).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CharDisp {
    /// Horizontal advance.
    Horizontal(f64),
    /// Vertical advance, measured downward.
    Vertical(f64),
}

/// Font trait - base interface for all font types.
///
/// Fonts are immutable and shared between graphics states through `Arc`.
pub trait Font: fmt::Debug + Send + Sync {
    /// Resource-independent font name (BaseFont).
    fn fontname(&self) -> &str;

    /// Splits a string operand into character codes.
    fn decode(&self, data: &[u8]) -> Vec<u32>;

    /// Convert a character code to Unicode character(s).
    fn to_unichr(&self, cid: u32) -> Option<String>;

    /// Get the width of a character in text space units (glyph width / 1000).
    fn char_width(&self, cid: u32) -> f64;

    /// Check if this is a vertical writing font.
    fn is_vertical(&self) -> bool {
        false
    }

    /// Codes wider than one byte never receive word spacing.
    fn is_multibyte(&self) -> bool {
        false
    }

    /// Get character displacement.
    fn char_disp(&self, cid: u32) -> CharDisp {
        CharDisp::Horizontal(self.char_width(cid))
    }

    /// Font descent (negative value below baseline) in text space.
    fn get_descent(&self) -> f64 {
        -0.25
    }

    /// Font ascent above baseline in text space.
    fn get_ascent(&self) -> f64 {
        0.75
    }
}
