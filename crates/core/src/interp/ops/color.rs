//! Color operators.
//!
//! Handles: CS, cs, SC, SCN, sc, scn, G, g, RG, rg, K, k
//!
//! Color values are kept as numbers in the named space; conversion is up to
//! the drawing surface.

use tracing::warn;

use crate::interp::executor::Executor;
use crate::model::color::{Color, ColorSpace};
use crate::model::state::GraphicsState;

#[allow(non_snake_case)]
impl Executor<'_, '_, '_> {
    /// Selects a color space and its initial color.
    ///
    /// PDF operators: `CS` (stroke), `cs` (fill)
    pub fn do_CS(&mut self, state: &mut GraphicsState, stroke: bool, name: &str) {
        let Some(space) = self.resources.color_space(name) else {
            warn!(name, "color space not found; keeping current space");
            return;
        };
        let color = space.initial_color();
        if stroke {
            state.stroke_color_space = space;
            state.stroke_color = color;
        } else {
            state.fill_color_space = space;
            state.fill_color = color;
        }
    }

    /// Sets a color in the current color space.
    ///
    /// PDF operators: `SC`, `SCN` (stroke), `sc`, `scn` (fill)
    pub fn do_SCN(
        &mut self,
        state: &mut GraphicsState,
        stroke: bool,
        components: &[f64],
        pattern: Option<&str>,
    ) {
        if stroke {
            state.stroke_color = state.stroke_color_space.color_from(components, pattern);
        } else {
            state.fill_color = state.fill_color_space.color_from(components, pattern);
        }
    }

    /// Sets a device color together with its device color space.
    ///
    /// PDF operators: `G g RG rg K k`
    pub fn do_device_color(&mut self, state: &mut GraphicsState, stroke: bool, color: &Color) {
        let space = match color {
            Color::Rgb(..) => ColorSpace::device_rgb(),
            Color::Cmyk(..) => ColorSpace::device_cmyk(),
            _ => ColorSpace::device_gray(),
        };
        if stroke {
            state.stroke_color_space = space;
            state.stroke_color = color.clone();
        } else {
            state.fill_color_space = space;
            state.fill_color = color.clone();
        }
    }
}
