//! Two-byte CID-keyed fonts with Identity-H / Identity-V encodings.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::{CharDisp, Font};

/// A composite font whose codes are big-endian 16-bit CIDs.
#[derive(Debug, Clone)]
pub struct CidFont {
    name: SmolStr,
    vertical: bool,
    widths: FxHashMap<u32, f64>,
    default_width: f64,
    vertical_advance: f64,
    to_unicode: FxHashMap<u32, String>,
}

impl CidFont {
    pub fn new(name: &str, vertical: bool) -> Self {
        Self {
            name: SmolStr::new(name),
            vertical,
            widths: FxHashMap::default(),
            default_width: 1000.0,
            vertical_advance: 1000.0,
            to_unicode: FxHashMap::default(),
        }
    }

    pub fn with_width(mut self, cid: u32, width: f64) -> Self {
        self.widths.insert(cid, width);
        self
    }

    pub fn with_to_unicode(mut self, cid: u32, text: &str) -> Self {
        self.to_unicode.insert(cid, text.to_string());
        self
    }
}

impl Font for CidFont {
    fn fontname(&self) -> &str {
        &self.name
    }

    fn decode(&self, data: &[u8]) -> Vec<u32> {
        // trailing odd byte is dropped
        data.chunks_exact(2)
            .map(|pair| (u32::from(pair[0]) << 8) | u32::from(pair[1]))
            .collect()
    }

    fn to_unichr(&self, cid: u32) -> Option<String> {
        self.to_unicode
            .get(&cid)
            .cloned()
            .or_else(|| char::from_u32(cid).map(String::from))
    }

    fn char_width(&self, cid: u32) -> f64 {
        self.widths.get(&cid).copied().unwrap_or(self.default_width) / 1000.0
    }

    fn is_vertical(&self) -> bool {
        self.vertical
    }

    fn is_multibyte(&self) -> bool {
        true
    }

    fn char_disp(&self, cid: u32) -> CharDisp {
        if self.vertical {
            CharDisp::Vertical(self.vertical_advance / 1000.0)
        } else {
            CharDisp::Horizontal(self.char_width(cid))
        }
    }

    fn get_descent(&self) -> f64 {
        -0.12
    }

    fn get_ascent(&self) -> f64 {
        0.88
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_two_byte_codes() {
        let font = CidFont::new("MS-Mincho", false);
        assert_eq!(font.decode(&[0x30, 0x42, 0x00, 0x41, 0x7f]), vec![0x3042, 0x41]);
        assert_eq!(font.to_unichr(0x3042).as_deref(), Some("\u{3042}"));
    }

    #[test]
    fn test_vertical_displacement() {
        let font = CidFont::new("MS-Mincho", true).with_width(5, 500.0);
        assert_eq!(font.char_disp(5), CharDisp::Vertical(1.0));
        assert!(font.is_multibyte());
        let horizontal = CidFont::new("MS-Mincho", false).with_width(5, 500.0);
        assert_eq!(horizontal.char_disp(5), CharDisp::Horizontal(0.5));
    }
}
