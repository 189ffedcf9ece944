//! Glyph positioning for the text-showing operators.
//!
//! Dry scans (text extraction, wrapper boxes) and wet scans (glyph drawing)
//! both go through `show_text`, so extracted positions and rendered positions
//! always agree.

use tracing::warn;

use crate::font::{CharDisp, Font};
use crate::model::objects::{ShowText, TextElement};
use crate::model::state::GraphicsState;
use crate::utils::{Matrix, Quad, mult_matrix, translation_matrix};

/// Stand-in for codes the font cannot map to Unicode.
pub const UNMAPPED_TEXT: &str = "?";

/// One character placed by a text-showing operator.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedChar {
    pub code: u32,
    /// Unicode text; `UNMAPPED_TEXT` when the font has no mapping
    pub text: String,
    /// Text rendering matrix (text space to device space)
    pub matrix: Matrix,
    /// Glyph box in device space
    pub quad: Quad,
}

impl PlacedChar {
    pub fn is_space(&self) -> bool {
        self.text == " "
    }
}

/// Moves to the start of the next line (`T*`).
pub fn next_line(state: &mut GraphicsState) {
    let tlm = mult_matrix(translation_matrix(0.0, -state.lead), state.text.tlm);
    state.text.tlm = tlm;
    state.text.tm = tlm;
}

/// Runs a text-showing operator against `state`, advancing the text matrix.
///
/// `on_char` sees every character with the state as it was before the
/// character's advance. Without a current font nothing is shown and the
/// text matrix does not move.
pub fn show_text<F>(state: &mut GraphicsState, show: &ShowText, mut on_char: F)
where
    F: FnMut(&GraphicsState, &PlacedChar),
{
    if let ShowText::NextLineSpaced {
        word_space,
        char_space,
        ..
    } = show
    {
        state.word_space = *word_space;
        state.char_space = *char_space;
    }
    if show.starts_new_line() {
        next_line(state);
    }

    let Some(font) = state.font.clone() else {
        warn!(operator = show.operator(), "no current font; text not shown");
        return;
    };

    match show {
        ShowText::Adjusted(elements) => {
            for element in elements {
                match element {
                    TextElement::Text(data) => show_string(state, font.as_ref(), data, &mut on_char),
                    TextElement::Adjust(n) => adjust(state, font.as_ref(), *n),
                }
            }
        }
        ShowText::Simple(data)
        | ShowText::NextLine(data)
        | ShowText::NextLineSpaced { text: data, .. } => {
            show_string(state, font.as_ref(), data, &mut on_char)
        }
    }
}

fn show_string<F>(state: &mut GraphicsState, font: &dyn Font, data: &[u8], on_char: &mut F)
where
    F: FnMut(&GraphicsState, &PlacedChar),
{
    let fs = state.font_size;
    let hs = state.scale;
    let params = (fs * hs, 0.0, 0.0, fs, 0.0, state.rise);

    for code in font.decode(data) {
        let trm = mult_matrix(mult_matrix(params, state.text.tm), state.ctm);
        let word_space = if code == 32 && !font.is_multibyte() {
            state.word_space
        } else {
            0.0
        };

        let (glyph_box, tx, ty) = match font.char_disp(code) {
            CharDisp::Horizontal(w) => (
                (0.0, font.get_descent(), w, font.get_ascent()),
                (w * fs + state.char_space + word_space) * hs,
                0.0,
            ),
            CharDisp::Vertical(adv) => {
                let half = font.char_width(code) / 2.0;
                (
                    (-half, -adv, half, 0.0),
                    0.0,
                    -adv * fs + state.char_space + word_space,
                )
            }
        };

        let placed = PlacedChar {
            code,
            text: font.to_unichr(code).unwrap_or_else(|| UNMAPPED_TEXT.to_string()),
            matrix: trm,
            quad: Quad::from_rect(glyph_box).transform(trm),
        };
        on_char(state, &placed);

        state.text.tm = mult_matrix(translation_matrix(tx, ty), state.text.tm);
    }
}

fn adjust(state: &mut GraphicsState, font: &dyn Font, n: f64) {
    let offset = -n / 1000.0 * state.font_size;
    let (tx, ty) = if font.is_vertical() {
        (0.0, offset)
    } else {
        (offset * state.scale, 0.0)
    };
    state.text.tm = mult_matrix(translation_matrix(tx, ty), state.text.tm);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{CidFont, SimpleFont};
    use std::sync::Arc;

    fn state_with(font: Arc<dyn Font>, size: f64) -> GraphicsState {
        let mut state = GraphicsState::default();
        state.font = Some(font);
        state.font_size = size;
        state
    }

    #[test]
    fn test_horizontal_advance() {
        let mut state = state_with(Arc::new(SimpleFont::new("Test", 500.0)), 10.0);
        let mut origins = Vec::new();
        show_text(&mut state, &ShowText::Simple(b"ab".to_vec()), |_, c| {
            origins.push((c.matrix.4, c.matrix.5));
        });
        assert_eq!(origins, vec![(0.0, 0.0), (5.0, 0.0)]);
        assert_eq!(state.text.tm.4, 10.0);
    }

    #[test]
    fn test_word_space_only_for_single_byte_space() {
        let mut state = state_with(Arc::new(SimpleFont::new("Test", 500.0)), 10.0);
        state.word_space = 2.0;
        show_text(&mut state, &ShowText::Simple(b" ".to_vec()), |_, _| {});
        assert_eq!(state.text.tm.4, 7.0);

        let mut state = state_with(Arc::new(CidFont::new("Cid", false)), 10.0);
        state.word_space = 2.0;
        show_text(&mut state, &ShowText::Simple(vec![0, 32]), |_, _| {});
        assert_eq!(state.text.tm.4, 10.0);
    }

    #[test]
    fn test_adjustment_moves_against_writing_direction() {
        let mut state = state_with(Arc::new(SimpleFont::new("Test", 500.0)), 10.0);
        let show = ShowText::Adjusted(vec![TextElement::Adjust(-1000.0)]);
        show_text(&mut state, &show, |_, _| {});
        assert_eq!(state.text.tm.4, 10.0);
    }

    #[test]
    fn test_vertical_font_moves_down() {
        let mut state = state_with(Arc::new(CidFont::new("Cid", true)), 10.0);
        show_text(&mut state, &ShowText::Simple(vec![0, 1, 0, 2]), |_, _| {});
        assert_eq!(state.text.tm.4, 0.0);
        assert_eq!(state.text.tm.5, -20.0);
    }

    #[test]
    fn test_vertical_char_space_reduces_advance() {
        // Tc is added to the negative vertical displacement
        let mut state = state_with(Arc::new(CidFont::new("Cid", true)), 10.0);
        state.char_space = 2.0;
        let mut origins = Vec::new();
        show_text(&mut state, &ShowText::Simple(vec![0, 1, 0, 2]), |_, c| {
            origins.push(c.matrix.5);
        });
        assert_eq!(origins, vec![0.0, -8.0]);
        assert_eq!(state.text.tm.5, -16.0);
    }

    #[test]
    fn test_unmapped_code_keeps_a_placeholder() {
        let mut state = state_with(Arc::new(CidFont::new("Cid", false)), 10.0);
        let mut texts = Vec::new();
        show_text(&mut state, &ShowText::Simple(vec![0xd8, 0x00, 0, 0x41]), |_, c| {
            texts.push(c.text.clone());
        });
        assert_eq!(texts, vec![UNMAPPED_TEXT.to_string(), "A".to_string()]);
    }

    #[test]
    fn test_next_line_uses_leading() {
        let mut state = state_with(Arc::new(SimpleFont::new("Test", 500.0)), 10.0);
        state.lead = 12.0;
        let show = ShowText::NextLineSpaced {
            word_space: 1.0,
            char_space: 0.5,
            text: b"a".to_vec(),
        };
        show_text(&mut state, &show, |_, _| {});
        assert_eq!(state.text.tlm.5, -12.0);
        assert_eq!(state.text.tm.5, -12.0);
        assert_eq!(state.char_space, 0.5);
        assert_eq!(state.word_space, 1.0);
    }

    #[test]
    fn test_missing_font_shows_nothing() {
        let mut state = GraphicsState::default();
        let mut count = 0;
        show_text(&mut state, &ShowText::Simple(b"abc".to_vec()), |_, _| count += 1);
        assert_eq!(count, 0);
        assert_eq!(state.text.tm.4, 0.0);
    }
}
