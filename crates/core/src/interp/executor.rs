//! Instruction executor.
//!
//! `Executor` applies content objects to a `GraphicsState`. Leaf semantics
//! live in the `ops` modules, grouped by operator category; composite
//! semantics (q/Q, BT/ET, marked content) and dispatch live here. When a
//! `RenderSession` is attached every instruction also issues its drawing
//! calls to the session surface.

use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use crate::interp::device::{PathSegment, Surface};
use crate::model::context::Resources;
use crate::model::objects::{CompositeKind, CompositeObject, ContentObject, FillRule, Operation};
use crate::model::state::{GraphicsState, TextState};
use crate::params::ScanParams;
use crate::utils::{Point, Size};

/// Render-only data, alive for the duration of one `render` call.
pub struct RenderSession<'r> {
    pub surface: &'r mut dyn Surface,
    pub canvas_size: Size,
}

impl<'r> RenderSession<'r> {
    pub fn new(surface: &'r mut dyn Surface, canvas_size: Size) -> Self {
        Self {
            surface,
            canvas_size,
        }
    }
}

/// Path under construction, plus a clip waiting for the painting operator.
#[derive(Debug, Default, Clone)]
pub struct PathBuilder {
    pub segments: Vec<PathSegment>,
    pub current_point: Option<Point>,
    pub pending_clip: Option<FillRule>,
}

impl PathBuilder {
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.current_point = None;
        self.pending_clip = None;
    }
}

/// Whether a form named `name` may run given the forms already running.
///
/// Refuses (with a warning) a form that is already on the stack and any
/// invocation at `max_depth`.
pub(crate) fn may_enter_form(forms: &[SmolStr], name: &str, max_depth: usize) -> bool {
    if forms.iter().any(|f| f == name) {
        warn!(name, "recursive form invocation; skipped");
        return false;
    }
    if forms.len() >= max_depth {
        warn!(name, depth = forms.len(), "form nesting limit reached; skipped");
        return false;
    }
    true
}

/// Applies content objects to a graphics state.
///
/// `'a` is the lifetime of the resources, `'x` of the borrowed scan buffers
/// and `'r` of the render session surface.
pub struct Executor<'a, 'x, 'r> {
    pub(crate) resources: &'a Resources,
    pub(crate) params: &'a ScanParams,
    /// Names of the forms being executed, outermost first
    pub(crate) forms: &'x mut Vec<SmolStr>,
    pub(crate) path: &'x mut PathBuilder,
    pub(crate) session: Option<&'x mut RenderSession<'r>>,
}

impl<'a, 'x, 'r> Executor<'a, 'x, 'r> {
    pub fn new(
        resources: &'a Resources,
        params: &'a ScanParams,
        forms: &'x mut Vec<SmolStr>,
        path: &'x mut PathBuilder,
        session: Option<&'x mut RenderSession<'r>>,
    ) -> Self {
        Self {
            resources,
            params,
            forms,
            path,
            session,
        }
    }

    /// Surface of the active render session.
    pub(crate) fn surface(&mut self) -> Option<&mut (dyn Surface + 'r)> {
        self.session.as_deref_mut().map(|s| &mut *s.surface)
    }

    /// Applies one content object. Composites run their whole subtree.
    pub fn execute(&mut self, state: &mut GraphicsState, object: &ContentObject) {
        match object {
            ContentObject::Leaf(op) => self.execute_operation(state, op),
            ContentObject::Composite(composite) => self.execute_composite(state, composite),
        }
    }

    pub fn execute_all(&mut self, state: &mut GraphicsState, objects: &[ContentObject]) {
        for object in objects {
            self.execute(state, object);
        }
    }

    fn execute_composite(&mut self, state: &mut GraphicsState, composite: &CompositeObject) {
        match &composite.kind {
            CompositeKind::LocalGraphicsState => {
                let saved = state.clone();
                if let Some(surface) = self.surface() {
                    surface.save();
                }
                self.execute_all(state, &composite.objects);
                *state = saved;
                if let Some(surface) = self.surface() {
                    surface.restore();
                    surface.set_matrix(state.ctm);
                }
            }
            CompositeKind::Text => {
                let saved = state.text;
                state.text = TextState::default();
                self.execute_all(state, &composite.objects);
                state.text = saved;
            }
            CompositeKind::MarkedContent { tag, .. } => {
                if let Some(surface) = self.surface() {
                    surface.begin_marked_content(tag);
                }
                self.execute_all(state, &composite.objects);
                if let Some(surface) = self.surface() {
                    surface.end_marked_content();
                }
            }
        }
    }

    /// Applies one leaf operation.
    pub fn execute_operation(&mut self, state: &mut GraphicsState, op: &Operation) {
        trace!(operator = op.operator(), "execute");
        match op {
            Operation::SetLineWidth(w) => self.do_w(state, *w),
            Operation::SetLineCap(cap) => self.do_J(state, *cap),
            Operation::SetLineJoin(join) => self.do_j(state, *join),
            Operation::SetMiterLimit(limit) => self.do_M(state, *limit),
            Operation::SetLineDash(dash) => self.do_d(state, dash),
            Operation::SetRenderingIntent(_) | Operation::SetFlatness(_) => {}
            Operation::ApplyExtGState(name) => self.do_gs(state, name),
            Operation::ModifyCtm(m) => self.do_cm(state, *m),

            Operation::SetColorSpace { stroke, name } => self.do_CS(state, *stroke, name),
            Operation::SetColor {
                stroke,
                components,
                pattern,
            } => self.do_SCN(state, *stroke, components, pattern.as_deref()),
            Operation::SetDeviceColor { stroke, color } => {
                self.do_device_color(state, *stroke, color)
            }

            Operation::BeginSubpath((x, y)) => self.do_m(*x, *y),
            Operation::LineTo((x, y)) => self.do_l(*x, *y),
            Operation::CurveTo { c1, c2, end } => self.do_c(*c1, *c2, *end),
            Operation::Rectangle(x, y, w, h) => self.do_re(*x, *y, *w, *h),
            Operation::CloseSubpath => self.do_h(),
            Operation::PaintPath(paint) => self.paint_path(state, *paint),
            Operation::EndPath => self.do_n(),
            Operation::ClipPath(rule) => self.do_W(*rule),

            Operation::SetCharSpace(v) => state.char_space = *v,
            Operation::SetWordSpace(v) => state.word_space = *v,
            Operation::SetHorizontalScale(pct) => state.scale = *pct / 100.0,
            Operation::SetTextLead(v) => state.lead = *v,
            Operation::SetFont { name, size } => self.do_Tf(state, name, *size),
            Operation::SetTextRenderMode(mode) => state.render_mode = *mode,
            Operation::SetTextRise(v) => state.rise = *v,
            Operation::TranslateTextRelative { dx, dy, set_lead } => {
                self.do_Td(state, *dx, *dy, *set_lead)
            }
            Operation::SetTextMatrix(m) => self.do_Tm(state, *m),
            Operation::TranslateTextToNextLine => self.do_T_star(state),
            Operation::ShowText(show) => self.do_show_text(state, show),

            Operation::PaintXObject(name) => self.do_Do(state, name),
            Operation::PaintShading(name) => self.do_sh(name),
            Operation::InlineImage(image) => self.do_EI(image),
            Operation::MarkedContentPoint { tag, .. } => self.do_MP(tag),

            Operation::Unknown { operator, operands } => {
                debug!(operator = %operator, operands = operands.len(), "skipping unknown operator");
            }
        }
    }
}
