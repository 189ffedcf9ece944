//! XObject, shading, inline image and marked-content point operators.
//!
//! Handles: Do, sh, BI/ID/EI, MP, DP (BMC/BDC/EMC are composites)
//!
//! Form XObjects run nested with a copy of the invoking state. An invocation
//! is refused when the form is already being executed further up, or when the
//! nesting reaches `ScanParams::max_form_depth`.

use tracing::{debug, warn};

use crate::interp::device::{ImageRef, PathSegment};
use crate::interp::executor::{Executor, PathBuilder, may_enter_form};
use crate::model::context::{FormXObject, XObject};
use crate::model::objects::{FillRule, InlineImage};
use crate::model::state::GraphicsState;
use crate::utils::{mult_matrix, normalize_rect};

#[allow(non_snake_case)]
impl Executor<'_, '_, '_> {
    /// Invokes a named XObject (image or form).
    ///
    /// PDF operator: `Do`
    pub fn do_Do(&mut self, state: &GraphicsState, name: &str) {
        let resources = self.resources;
        match resources.xobject(name) {
            Some(XObject::Image(image)) => {
                if let Some(surface) = self.surface() {
                    surface.draw_image(&ImageRef {
                        name: Some(name),
                        width: image.width,
                        height: image.height,
                        bits_per_component: image.bits_per_component,
                        color_space: image.color_space.as_deref(),
                        data: &image.data,
                    });
                }
            }
            Some(XObject::Form(form)) => self.execute_form(state, name, form),
            None => warn!(name, "XObject not found; Do skipped"),
        }
    }

    fn execute_form(&mut self, state: &GraphicsState, name: &str, form: &FormXObject) {
        if !may_enter_form(self.forms, name, self.params.max_form_depth) {
            return;
        }
        debug!(name, depth = self.forms.len() + 1, "enter form");

        let mut form_state = state.clone();
        form_state.ctm = mult_matrix(form.matrix, state.ctm);

        if let Some(surface) = self.surface() {
            let (x0, y0, x1, y1) = normalize_rect(form.bbox);
            surface.save();
            surface.begin_figure(name, form.bbox, form.matrix);
            surface.set_matrix(form_state.ctm);
            surface.clip_path(
                &[
                    PathSegment::MoveTo(x0, y0),
                    PathSegment::LineTo(x1, y0),
                    PathSegment::LineTo(x1, y1),
                    PathSegment::LineTo(x0, y1),
                    PathSegment::ClosePath,
                ],
                FillRule::NonZero,
            );
        }

        let resources = form.resources.as_deref().unwrap_or(self.resources);
        let mut path = PathBuilder::default();
        self.forms.push(name.into());
        {
            let mut nested = Executor::new(
                resources,
                self.params,
                &mut *self.forms,
                &mut path,
                self.session.as_deref_mut(),
            );
            nested.execute_all(&mut form_state, &form.contents);
        }
        self.forms.pop();

        if let Some(surface) = self.surface() {
            surface.end_figure(name);
            surface.restore();
            surface.set_matrix(state.ctm);
        }
    }

    /// Paints a shading over the current clip.
    ///
    /// PDF operator: `sh`
    pub fn do_sh(&mut self, name: &str) {
        if let Some(surface) = self.surface() {
            surface.paint_shading(name);
        }
    }

    /// Draws an inline image into the unit square of user space.
    ///
    /// PDF operators: `BI`, `ID`, `EI`
    pub fn do_EI(&mut self, image: &InlineImage) {
        if let Some(surface) = self.surface() {
            surface.draw_image(&ImageRef {
                name: None,
                width: image.width(),
                height: image.height(),
                bits_per_component: image.bits_per_component(),
                color_space: image.color_space(),
                data: &image.data,
            });
        }
    }

    /// PDF operators: `MP`, `DP`
    pub fn do_MP(&mut self, tag: &str) {
        if let Some(surface) = self.surface() {
            surface.marked_content_point(tag);
        }
    }
}
