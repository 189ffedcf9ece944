//! Single-byte fonts (Type1, TrueType, Type3 style).

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::Font;

/// A single-byte font described by a width table.
///
/// Codes without a ToUnicode entry map through Latin-1.
#[derive(Debug, Clone)]
pub struct SimpleFont {
    name: SmolStr,
    widths: FxHashMap<u32, f64>,
    default_width: f64,
    to_unicode: FxHashMap<u32, String>,
    descent: f64,
    ascent: f64,
}

impl SimpleFont {
    /// Create a font whose glyphs all share `default_width` (in 1/1000 em).
    pub fn new(name: &str, default_width: f64) -> Self {
        Self {
            name: SmolStr::new(name),
            widths: FxHashMap::default(),
            default_width,
            to_unicode: FxHashMap::default(),
            descent: -250.0,
            ascent: 750.0,
        }
    }

    /// Assigns widths to consecutive codes starting at `first_char` (the
    /// `FirstChar`/`Widths` layout).
    pub fn with_widths(mut self, first_char: u32, widths: &[f64]) -> Self {
        for (i, w) in widths.iter().enumerate() {
            self.widths.insert(first_char + i as u32, *w);
        }
        self
    }

    pub fn with_to_unicode(mut self, code: u32, text: &str) -> Self {
        self.to_unicode.insert(code, text.to_string());
        self
    }

    /// Sets descent and ascent in 1/1000 em.
    pub fn with_metrics(mut self, descent: f64, ascent: f64) -> Self {
        self.descent = descent;
        self.ascent = ascent;
        self
    }
}

impl Font for SimpleFont {
    fn fontname(&self) -> &str {
        &self.name
    }

    fn decode(&self, data: &[u8]) -> Vec<u32> {
        data.iter().map(|&b| u32::from(b)).collect()
    }

    fn to_unichr(&self, cid: u32) -> Option<String> {
        if let Some(text) = self.to_unicode.get(&cid) {
            return Some(text.clone());
        }
        u8::try_from(cid).ok().map(|b| char::from(b).to_string())
    }

    fn char_width(&self, cid: u32) -> f64 {
        self.widths.get(&cid).copied().unwrap_or(self.default_width) / 1000.0
    }

    fn get_descent(&self) -> f64 {
        self.descent / 1000.0
    }

    fn get_ascent(&self) -> f64 {
        self.ascent / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_fall_back_to_default() {
        let font = SimpleFont::new("Helvetica", 500.0).with_widths(65, &[722.0, 667.0]);
        assert_eq!(font.char_width(65), 0.722);
        assert_eq!(font.char_width(66), 0.667);
        assert_eq!(font.char_width(67), 0.5);
    }

    #[test]
    fn test_decode_and_unicode() {
        let font = SimpleFont::new("F", 600.0).with_to_unicode(0x01, "fi");
        assert_eq!(font.decode(b"A\x01"), vec![65, 1]);
        assert_eq!(font.to_unichr(65).as_deref(), Some("A"));
        assert_eq!(font.to_unichr(1).as_deref(), Some("fi"));
        assert_eq!(font.to_unichr(0xe9).as_deref(), Some("\u{e9}"));
    }
}
