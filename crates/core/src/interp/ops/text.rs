//! Text positioning and showing operators.
//!
//! Handles: Tf, Td, TD, Tm, T*, Tj, TJ, ', "
//! (BT/ET are composites; Tc Tw Tz TL Tr Ts are plain field stores)

use tracing::warn;

use crate::interp::device::{Glyph, Paint};
use crate::interp::executor::Executor;
use crate::interp::text::{next_line, show_text};
use crate::model::objects::ShowText;
use crate::model::state::GraphicsState;
use crate::utils::{Matrix, mult_matrix, translation_matrix};

#[allow(non_snake_case)]
impl Executor<'_, '_, '_> {
    /// Sets the text font and size.
    ///
    /// Unknown names fall back to `ScanParams::fallback_font`, or leave no
    /// current font when none is configured.
    ///
    /// PDF operator: `Tf`
    pub fn do_Tf(&mut self, state: &mut GraphicsState, name: &str, size: f64) {
        state.font = match self.resources.font(name) {
            Some(font) => Some(font.clone()),
            None => {
                warn!(name, "font not found in resources");
                self.params.fallback_font.clone()
            }
        };
        state.font_name = Some(name.into());
        state.font_size = size;
    }

    /// Moves to the start of the next line, offset by (dx, dy). With
    /// `set_lead` the leading becomes -dy.
    ///
    /// PDF operators: `Td`, `TD`
    pub fn do_Td(&mut self, state: &mut GraphicsState, dx: f64, dy: f64, set_lead: bool) {
        if set_lead {
            state.lead = -dy;
        }
        let tlm = mult_matrix(translation_matrix(dx, dy), state.text.tlm);
        state.text.tlm = tlm;
        state.text.tm = tlm;
    }

    /// PDF operator: `Tm`
    pub fn do_Tm(&mut self, state: &mut GraphicsState, matrix: Matrix) {
        state.text.tm = matrix;
        state.text.tlm = matrix;
    }

    /// PDF operator: `T*`
    pub fn do_T_star(&mut self, state: &mut GraphicsState) {
        next_line(state);
    }

    /// Shows text, drawing one glyph per visible character when rendering.
    ///
    /// PDF operators: `Tj`, `TJ`, `'`, `"`
    pub fn do_show_text(&mut self, state: &mut GraphicsState, show: &ShowText) {
        let Some(session) = self.session.as_deref_mut() else {
            show_text(state, show, |_, _| {});
            return;
        };
        let surface = &mut *session.surface;
        show_text(state, show, |state, placed| {
            if placed.is_space() {
                return;
            }
            let fill = state.render_mode_fill().then(|| Paint::fill(state));
            let stroke = state.render_mode_stroke().then(|| Paint::stroke(state));
            if fill.is_none() && stroke.is_none() {
                return;
            }
            surface.draw_glyph(&Glyph {
                code: placed.code,
                text: placed.text.clone(),
                matrix: placed.matrix,
                fill,
                stroke,
            });
        });
    }
}
