//! Tests for rendering onto a recording surface.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use pdfscan_core::font::SimpleFont;
use pdfscan_core::interp::{DrawCommand, Paint, PathSegment, RecordingSurface, START_INDEX, Surface};
use pdfscan_core::model::{Color, FillRule, FormXObject, Page, Resources, XObject};
use pdfscan_core::params::ScanParams;
use pdfscan_core::utils::{MATRIX_IDENTITY, Matrix};
use pdfscan_core::ContentScanner;

const SMALL_BOX: (f64, f64, f64, f64) = (0.0, 0.0, 200.0, 100.0);
const CANVAS: (f64, f64) = (200.0, 100.0);
const DEVICE_CTM: (f64, f64, f64, f64, f64, f64) = (1.0, 0.0, 0.0, -1.0, 0.0, 100.0);

fn font_resources() -> Resources {
    Resources::new().with_font("F1", Arc::new(SimpleFont::new("Helvetica", 500.0)))
}

fn render(page: &Page, params: ScanParams) -> RecordingSurface {
    let mut surface = RecordingSurface::new();
    let mut scanner = ContentScanner::for_page(page, params);
    scanner.render(&mut surface, CANVAS, None);
    surface
}

fn count(surface: &RecordingSurface, pred: impl Fn(&DrawCommand) -> bool) -> usize {
    surface.commands.iter().filter(|c| pred(c)).count()
}

#[test]
fn test_render_prepares_surface() {
    let page = Page::parse(SMALL_BOX, Resources::new(), b"").unwrap();
    let surface = render(&page, ScanParams::default());
    assert_eq!(
        surface.commands,
        vec![
            DrawCommand::Clear((0.0, 0.0, 200.0, 100.0)),
            DrawCommand::ClipRect((0.0, 0.0, 200.0, 100.0)),
            DrawCommand::SetMatrix(DEVICE_CTM),
        ]
    );
}

#[test]
fn test_render_without_clear_uses_given_clip() {
    let page = Page::parse(SMALL_BOX, Resources::new(), b"").unwrap();
    let mut surface = RecordingSurface::new();
    let mut scanner =
        ContentScanner::for_page(&page, ScanParams::default().with_clear_surface(false));
    scanner.render(&mut surface, CANVAS, Some((10.0, 10.0, 50.0, 50.0)));
    assert_eq!(surface.commands[0], DrawCommand::ClipRect((10.0, 10.0, 50.0, 50.0)));
}

#[test]
fn test_render_draws_glyphs_in_device_space() {
    let page = Page::parse(SMALL_BOX, font_resources(), b"BT /F1 10 Tf 10 20 Td (A B) Tj ET")
        .unwrap();
    let surface = render(&page, ScanParams::default());
    // The space is advanced over but not drawn
    assert_eq!(surface.text(), "AB");
    let origins = surface.glyph_origins();
    assert_eq!(origins[0], (10.0, 80.0));
    assert_eq!(origins[1], (20.0, 80.0));
}

#[test]
fn test_invisible_text_is_not_drawn() {
    let page = Page::parse(SMALL_BOX, font_resources(), b"BT /F1 10 Tf 3 Tr (A) Tj ET").unwrap();
    let surface = render(&page, ScanParams::default());
    assert_eq!(surface.text(), "");
}

#[test]
fn test_render_restores_dry_device_mapping() {
    let page = Page::parse(SMALL_BOX, font_resources(), b"BT /F1 10 Tf (A) Tj ET").unwrap();
    let mut surface = RecordingSurface::new();
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.render(&mut surface, (400.0, 200.0), None);
    assert_eq!(scanner.state().initial_ctm, MATRIX_IDENTITY);
    assert_eq!(scanner.canvas_size(), (200.0, 100.0));
    // Back at the start, out of render space
    assert_eq!(scanner.index(), START_INDEX);
    assert_eq!(scanner.state().ctm, MATRIX_IDENTITY);
    assert!(scanner.state().font.is_none());
}

struct FailingSurface;

impl Surface for FailingSurface {
    fn set_matrix(&mut self, _matrix: Matrix) {}

    fn fill_path(&mut self, _path: &[PathSegment], _rule: FillRule, _paint: &Paint) {
        panic!("fill failed");
    }
}

#[test]
fn test_render_restores_mapping_after_surface_panic() {
    let page = Page::parse(SMALL_BOX, Resources::new(), b"5 w 0 0 10 10 re f 7 w").unwrap();
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        scanner.render(&mut FailingSurface, (400.0, 200.0), None);
    }));
    assert!(result.is_err());

    assert_eq!(scanner.state().initial_ctm, MATRIX_IDENTITY);
    assert_eq!(scanner.canvas_size(), (200.0, 100.0));
    assert_eq!(scanner.index(), START_INDEX);
    assert_eq!(scanner.state().ctm, MATRIX_IDENTITY);
    assert_eq!(scanner.state().line_width, 1.0);

    // Dry scanning still works
    scanner.move_end();
    assert_eq!(scanner.state().line_width, 7.0);
}

#[test]
fn test_saved_state_brackets_surface_calls() {
    let page = Page::parse(
        SMALL_BOX,
        Resources::new(),
        b"q 1 0 0 1 5 5 cm 1 0 0 rg 0 0 10 10 re f Q",
    )
    .unwrap();
    let surface = render(&page, ScanParams::default());
    let commands = &surface.commands[3..];
    assert_eq!(commands[0], DrawCommand::Save);
    assert_eq!(commands[1], DrawCommand::SetMatrix((1.0, 0.0, 0.0, -1.0, 5.0, 95.0)));
    match &commands[2] {
        DrawCommand::FillPath { path, rule, paint } => {
            assert_eq!(path.len(), 5);
            assert_eq!(path[0], PathSegment::MoveTo(0.0, 0.0));
            assert_eq!(*rule, FillRule::NonZero);
            assert_eq!(paint.color, Color::Rgb(1.0, 0.0, 0.0));
        }
        other => panic!("expected a fill, got {other:?}"),
    }
    assert_eq!(commands[3], DrawCommand::Restore);
    assert_eq!(commands[4], DrawCommand::SetMatrix(DEVICE_CTM));
    assert_eq!(surface.matrix(), Some(DEVICE_CTM));
}

#[test]
fn test_stroke_carries_line_width() {
    let page = Page::parse(SMALL_BOX, Resources::new(), b"4 w 0 0 m 10 0 l S").unwrap();
    let surface = render(&page, ScanParams::default());
    let stroke = surface
        .commands
        .iter()
        .find_map(|c| match c {
            DrawCommand::StrokePath { paint, .. } => paint.stroke.clone(),
            _ => None,
        })
        .expect("stroke command");
    assert_eq!(stroke.width, 4.0);
}

#[test]
fn test_clip_applies_when_path_ends() {
    let page = Page::parse(SMALL_BOX, Resources::new(), b"0 0 50 50 re W n").unwrap();
    let surface = render(&page, ScanParams::default());
    assert_eq!(
        count(&surface, |c| matches!(c, DrawCommand::ClipPath { .. })),
        1
    );
    assert_eq!(
        count(&surface, |c| matches!(c, DrawCommand::FillPath { .. })),
        0
    );
}

#[test]
fn test_marked_content_is_bracketed() {
    let page = Page::parse(SMALL_BOX, Resources::new(), b"/Artifact BMC /Tag MP EMC").unwrap();
    let surface = render(&page, ScanParams::default());
    assert_eq!(
        &surface.commands[3..],
        &[
            DrawCommand::BeginMarkedContent("Artifact".into()),
            DrawCommand::MarkedContentPoint("Tag".into()),
            DrawCommand::EndMarkedContent,
        ]
    );
}

#[test]
fn test_form_is_drawn_as_figure() {
    let form = FormXObject::parse((0.0, 0.0, 10.0, 10.0), b"0 0 m 10 10 l S")
        .unwrap()
        .with_matrix((1.0, 0.0, 0.0, 1.0, 20.0, 0.0));
    let resources = Resources::new().with_xobject("Fm0", XObject::Form(form));
    let page = Page::parse(SMALL_BOX, resources, b"/Fm0 Do").unwrap();
    let surface = render(&page, ScanParams::default());

    let commands = &surface.commands[3..];
    assert_eq!(commands[0], DrawCommand::Save);
    assert!(matches!(&commands[1], DrawCommand::BeginFigure { name, .. } if name == "Fm0"));
    assert_eq!(commands[2], DrawCommand::SetMatrix((1.0, 0.0, 0.0, -1.0, 20.0, 100.0)));
    assert!(matches!(commands[3], DrawCommand::ClipPath { .. }));
    assert!(matches!(commands[4], DrawCommand::StrokePath { .. }));
    assert_eq!(commands[5], DrawCommand::EndFigure("Fm0".into()));
    assert_eq!(commands[6], DrawCommand::Restore);
    assert_eq!(commands[7], DrawCommand::SetMatrix(DEVICE_CTM));
}

#[test]
fn test_self_referencing_form_runs_once() {
    let form = FormXObject::parse((0.0, 0.0, 10.0, 10.0), b"0 0 m 10 10 l S /Fm0 Do").unwrap();
    let resources = Resources::new().with_xobject("Fm0", XObject::Form(form));
    let page = Page::parse(SMALL_BOX, resources, b"/Fm0 Do").unwrap();
    let surface = render(&page, ScanParams::default());
    assert_eq!(
        count(&surface, |c| matches!(c, DrawCommand::BeginFigure { .. })),
        1
    );
    assert_eq!(
        count(&surface, |c| matches!(c, DrawCommand::StrokePath { .. })),
        1
    );
}

#[test]
fn test_form_nesting_is_bounded() {
    let chain = |next: &str| {
        let content = format!("0 0 m 1 1 l S /{next} Do");
        XObject::Form(FormXObject::parse((0.0, 0.0, 10.0, 10.0), content.as_bytes()).unwrap())
    };
    let resources = Resources::new()
        .with_xobject("Fm1", chain("Fm2"))
        .with_xobject("Fm2", chain("Fm3"))
        .with_xobject("Fm3", chain("Fm4"));
    let page = Page::parse(SMALL_BOX, resources, b"/Fm1 Do").unwrap();

    let surface = render(&page, ScanParams::default().with_max_form_depth(2));
    assert_eq!(
        count(&surface, |c| matches!(c, DrawCommand::BeginFigure { .. })),
        2
    );

    let surface = render(&page, ScanParams::default());
    // Fm4 is missing, so the chain stops after three forms
    assert_eq!(
        count(&surface, |c| matches!(c, DrawCommand::BeginFigure { .. })),
        3
    );
}

#[test]
fn test_image_is_drawn() {
    let page = Page::parse(
        SMALL_BOX,
        Resources::new(),
        b"q 10 0 0 10 0 0 cm BI /W 1 /H 1 /CS /G ID x\nEI Q",
    )
    .unwrap();
    let surface = render(&page, ScanParams::default());
    assert!(surface.commands.contains(&DrawCommand::Image {
        name: None,
        width: 1,
        height: 1,
    }));
}
