//! Graphics state operators.
//!
//! Handles: cm, w, J, j, M, d, gs (q/Q are composites, see the executor)
//!
//! - cm: Concatenate transformation matrix
//! - w, J, j, M, d: Line styling (width, cap, join, miter limit, dash)
//! - gs: Set parameters from a named ExtGState resource

use tracing::warn;

use crate::interp::executor::Executor;
use crate::model::state::{GraphicsState, LineCap, LineDash, LineJoin};
use crate::utils::{Matrix, mult_matrix};

#[allow(non_snake_case)]
impl Executor<'_, '_, '_> {
    /// Concatenates a matrix to the current transformation matrix.
    ///
    /// PDF operator: `cm`
    pub fn do_cm(&mut self, state: &mut GraphicsState, matrix: Matrix) {
        state.ctm = mult_matrix(matrix, state.ctm);
        if let Some(surface) = self.surface() {
            surface.set_matrix(state.ctm);
        }
    }

    /// PDF operator: `w`
    pub fn do_w(&mut self, state: &mut GraphicsState, width: f64) {
        state.line_width = width;
    }

    /// PDF operator: `J`
    pub fn do_J(&mut self, state: &mut GraphicsState, cap: LineCap) {
        state.line_cap = cap;
    }

    /// PDF operator: `j`
    pub fn do_j(&mut self, state: &mut GraphicsState, join: LineJoin) {
        state.line_join = join;
    }

    /// PDF operator: `M`
    pub fn do_M(&mut self, state: &mut GraphicsState, limit: f64) {
        state.miter_limit = limit;
    }

    /// PDF operator: `d`
    pub fn do_d(&mut self, state: &mut GraphicsState, dash: &LineDash) {
        state.line_dash = dash.clone();
    }

    /// Sets parameters from a graphics state parameter dictionary.
    ///
    /// A missing dictionary leaves the state untouched.
    ///
    /// PDF operator: `gs`
    pub fn do_gs(&mut self, state: &mut GraphicsState, name: &str) {
        let Some(gstate) = self.resources.ext_gstate(name) else {
            warn!(name, "ExtGState not found; gs skipped");
            return;
        };

        if let Some(w) = gstate.line_width {
            state.line_width = w;
        }
        if let Some(cap) = gstate.line_cap {
            state.line_cap = cap;
        }
        if let Some(join) = gstate.line_join {
            state.line_join = join;
        }
        if let Some(limit) = gstate.miter_limit {
            state.miter_limit = limit;
        }
        if let Some(dash) = &gstate.line_dash {
            state.line_dash = dash.clone();
        }
        if let Some(modes) = &gstate.blend_mode
            && !modes.is_empty()
        {
            state.blend_mode = modes.iter().copied().collect();
        }
        if let Some(alpha) = gstate.fill_alpha {
            state.fill_alpha = alpha;
        }
        if let Some(alpha) = gstate.stroke_alpha {
            state.stroke_alpha = alpha;
        }
        if let Some((fontname, size)) = &gstate.font {
            match self.resources.font_by_fontname(fontname) {
                Some(font) => state.font = Some(font.clone()),
                None => {
                    warn!(fontname = %fontname, "ExtGState font not among resources");
                    state.font = self.params.fallback_font.clone();
                }
            }
            state.font_size = *size;
        }
    }
}
