//! Tests for ContentScanner navigation, child levels and editing.

use std::sync::Arc;

use pdfscan_core::ContentScanner;
use pdfscan_core::font::SimpleFont;
use pdfscan_core::interp::{Container, START_INDEX};
use pdfscan_core::model::{
    BlendMode, CompositeKind, ContentObject, ExtGState, FormXObject, GraphicsState, Operation,
    Page, Resources, XObject,
};
use pdfscan_core::params::ScanParams;
use pdfscan_core::utils::MATRIX_IDENTITY;

const MEDIA_BOX: (f64, f64, f64, f64) = (0.0, 0.0, 612.0, 792.0);

fn page(content: &[u8]) -> Page {
    let resources =
        Resources::new().with_font("F1", Arc::new(SimpleFont::new("Helvetica", 500.0)));
    Page::parse(MEDIA_BOX, resources, content).expect("content parses")
}

fn line_width(object: &ContentObject) -> Option<f64> {
    match object {
        ContentObject::Leaf(Operation::SetLineWidth(w)) => Some(*w),
        _ => None,
    }
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_flat_scan_visits_every_object_in_order() {
    let page = page(b"1 w 2 w 3 w 4 w");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());

    let mut seen = Vec::new();
    while scanner.move_next() {
        seen.push(line_width(&scanner.current().unwrap()).unwrap());
    }
    assert_eq!(seen, vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(scanner.index(), 4);
    assert!(scanner.current().is_none());
    assert_eq!(scanner.state().line_width, 4.0);

    // Moving past the end is stable
    assert!(!scanner.move_next());
    assert_eq!(scanner.index(), 4);
}

#[test]
fn test_state_is_before_current_object() {
    let page = page(b"5 w 1 0 0 1 10 20 cm 7 w");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    assert!(scanner.move_first());
    assert_eq!(scanner.state().line_width, 1.0);
    assert!(scanner.move_next());
    assert_eq!(scanner.state().line_width, 5.0);
    assert_eq!(scanner.state().ctm, MATRIX_IDENTITY);
    assert!(scanner.move_next());
    assert_eq!(scanner.state().ctm, (1.0, 0.0, 0.0, 1.0, 10.0, 20.0));
}

#[test]
fn test_move_start_resets_state() {
    let page = page(b"5 w 2 0 0 2 0 0 cm");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.move_end();
    assert_eq!(scanner.state().line_width, 5.0);
    scanner.move_start();
    assert_eq!(scanner.index(), START_INDEX);
    assert_eq!(scanner.state().line_width, 1.0);
    assert_eq!(scanner.state().ctm, MATRIX_IDENTITY);
}

#[test]
fn test_rescan_is_idempotent() {
    let page = page(b"q 2 0 0 2 5 5 cm 3 w Q 4 w BT /F1 10 Tf 1 0 0 1 50 50 Tm ET");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.move_end();
    let first = scanner.state().clone();
    scanner.move_start();
    scanner.move_end();
    let second = scanner.state();
    assert_eq!(first.ctm, second.ctm);
    assert_eq!(first.line_width, second.line_width);
    assert_eq!(first.font_size, second.font_size);
    assert_eq!(first.text, second.text);
}

#[test]
fn test_canvas_param_sets_dry_device_mapping() {
    let page = page(b"");
    let params = ScanParams::default()
        .with_canvas_size((306.0, 396.0))
        .unwrap();
    let scanner = ContentScanner::for_page(&page, params);
    assert_eq!(scanner.canvas_size(), (306.0, 396.0));
    assert_eq!(scanner.state().ctm, (0.5, 0.0, 0.0, -0.5, 0.0, 396.0));
}

// ============================================================================
// Child levels
// ============================================================================

#[test]
fn test_child_level_visits_children() {
    let page = page(b"2 w q 1 w 3 w 5 w Q 9 w");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.move_next();
    scanner.move_next();

    let mut child = scanner.child_level().expect("q at cursor");
    assert_eq!(child.len(), 3);
    assert_eq!(child.depth(), 1);
    assert!(matches!(
        child.container(),
        Some(Container::Composite(CompositeKind::LocalGraphicsState))
    ));
    assert_eq!(child.state().line_width, 2.0);

    let mut count = 0;
    while child.move_next() {
        count += 1;
    }
    assert_eq!(count, 3);
    assert_eq!(child.state().line_width, 5.0);

    // Restarting a child goes back to the parent's state
    child.move_start();
    assert_eq!(child.state().line_width, 2.0);
    drop(child);

    // The parent restores the state after the q group
    scanner.move_next();
    assert_eq!(scanner.state().line_width, 2.0);
}

#[test]
fn test_text_matrix_inherited_inside_text_object() {
    let page = page(b"BT 1 0 0 1 50 50 Tm q 2 w Q /Span BMC (x) Tj EMC ET");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.move_next();
    let mut text = scanner.child_level().expect("text object");
    text.move_next();
    text.move_next();

    let q = text.child_level().expect("q inside BT");
    assert_eq!(q.state().text.tm, (1.0, 0.0, 0.0, 1.0, 50.0, 50.0));
    drop(q);

    text.move_next();
    let marked = text.child_level().expect("marked content inside BT");
    assert_eq!(marked.state().text.tm.4, 50.0);
}

#[test]
fn test_sibling_group_starts_from_identity_text_matrix() {
    let tm = Operation::SetTextMatrix((1.0, 0.0, 0.0, 1.0, 50.0, 50.0));
    let group = pdfscan_core::model::CompositeObject::new(
        CompositeKind::LocalGraphicsState,
        vec![Operation::SetLineWidth(2.0).into()],
    );
    let form = FormXObject::new((0.0, 0.0, 100.0, 100.0), vec![tm.into(), group.into()]);
    let mut scanner = ContentScanner::for_form(&form, ScanParams::default());
    scanner.move_next();
    scanner.move_next();
    assert_eq!(scanner.state().text.tm.4, 50.0);

    let child = scanner.child_level().unwrap();
    assert_eq!(child.state().text.tm, MATRIX_IDENTITY);
}

#[test]
fn test_for_xobject_concatenates_form_matrix() {
    let form = FormXObject::parse((0.0, 0.0, 10.0, 10.0), b"3 w 0 0 m 10 10 l S")
        .unwrap()
        .with_matrix((1.0, 0.0, 0.0, 1.0, 10.0, 10.0));
    let resources = Resources::new().with_xobject("Fm0", XObject::Form(form));
    let page = Page::parse(MEDIA_BOX, resources, b"q 2 0 0 2 0 0 cm /Fm0 Do Q").unwrap();

    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.move_next();
    assert!(scanner.for_xobject().is_none());
    let mut group = scanner.child_level().unwrap();
    group.move_next();
    group.move_next();

    let mut inner = group.for_xobject().expect("form invocation");
    assert_eq!(inner.depth(), 2);
    assert_eq!(inner.state().ctm, (2.0, 0.0, 0.0, 2.0, 20.0, 20.0));
    match inner.container() {
        Some(Container::Form { name, .. }) => assert_eq!(name, "Fm0"),
        other => panic!("expected form container, got {other:?}"),
    }
    inner.move_end();
    assert_eq!(inner.state().line_width, 3.0);

    // The matrix is applied again on every restart
    inner.move_start();
    assert_eq!(inner.state().ctm, (2.0, 0.0, 0.0, 2.0, 20.0, 20.0));
}

#[test]
fn test_form_level_uses_own_resources() {
    let inner = Resources::new().with_font("F2", Arc::new(SimpleFont::new("Times", 400.0)));
    let form = FormXObject::parse((0.0, 0.0, 10.0, 10.0), b"BT /F2 8 Tf ET")
        .unwrap()
        .with_resources(inner);
    let resources = Resources::new().with_xobject("Fm0", XObject::Form(form));
    let page = Page::parse(MEDIA_BOX, resources, b"/Fm0 Do").unwrap();

    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.move_next();
    let form = scanner.resources().xobject("Fm0").and_then(XObject::as_form);
    assert!(form.is_some_and(|f| f.resources.is_some()));

    let inner = scanner.for_xobject().expect("form invocation");
    assert!(inner.resources().font("F2").is_some());
    assert!(scanner.resources().font("F2").is_none());
}

#[test]
fn test_ext_gstate_applies_parameters() {
    let gstate = ExtGState {
        line_width: Some(6.0),
        blend_mode: Some(vec![BlendMode::Multiply]),
        fill_alpha: Some(0.5),
        ..ExtGState::default()
    };
    let resources = Resources::new().with_ext_gstate("GS0", gstate);
    let page = Page::parse(MEDIA_BOX, resources, b"/GS0 gs /Missing gs 1 w").unwrap();

    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.move_to(1);
    assert_eq!(scanner.state().line_width, 6.0);
    assert_eq!(scanner.state().fill_alpha, 0.5);
    assert_eq!(scanner.state().stroke_alpha, 1.0);
    assert_eq!(scanner.state().effective_blend_mode(), BlendMode::Multiply);

    // An unknown name leaves the state alone
    scanner.move_next();
    assert_eq!(scanner.state().line_width, 6.0);
}

#[test]
fn test_set_on_start_hook_runs_on_restart() {
    let page = page(b"1 w");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.set_on_start(Box::new(|state: &mut GraphicsState| state.line_width = 8.0));
    assert_eq!(scanner.state().line_width, 8.0);
    scanner.move_end();
    assert_eq!(scanner.state().line_width, 1.0);
    scanner.move_start();
    assert_eq!(scanner.state().line_width, 8.0);
}

// ============================================================================
// Editing
// ============================================================================

#[test]
fn test_insert_leaves_cursor_on_inserted_object() {
    let page = page(b"1 w 2 w");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.move_next();
    scanner.insert(Operation::SetLineWidth(5.0).into());
    assert_eq!(scanner.index(), 0);
    assert_eq!(line_width(&scanner.current().unwrap()), Some(5.0));
    assert_eq!(scanner.len(), 3);

    scanner.move_next();
    assert_eq!(scanner.state().line_width, 5.0);
    assert_eq!(line_width(&scanner.current().unwrap()), Some(1.0));
}

#[test]
fn test_insert_before_start_goes_first() {
    let page = page(b"1 w");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.insert(Operation::SetLineWidth(9.0).into());
    assert_eq!(scanner.index(), 0);
    drop(scanner);
    assert_eq!(line_width(&page.objects()[0]), Some(9.0));
}

#[test]
fn test_insert_all_keeps_order() {
    let page = page(b"1 w 2 w");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.move_next();
    scanner.move_next();
    scanner.insert_all([
        Operation::SetLineWidth(10.0).into(),
        Operation::SetLineWidth(11.0).into(),
        Operation::SetLineWidth(12.0).into(),
    ]);
    assert_eq!(scanner.index(), 3);
    assert_eq!(line_width(&scanner.current().unwrap()), Some(12.0));
    // Inserted objects before the cursor have been applied
    assert_eq!(scanner.state().line_width, 11.0);
    drop(scanner);

    let widths: Vec<f64> = page.objects().iter().filter_map(line_width).collect();
    assert_eq!(widths, vec![1.0, 10.0, 11.0, 12.0, 2.0]);
}

#[test]
fn test_remove_keeps_index() {
    let page = page(b"1 w 2 w 3 w");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.move_to(1);
    let removed = scanner.remove();
    assert_eq!(line_width(&removed), Some(2.0));
    assert_eq!(scanner.index(), 1);
    assert_eq!(line_width(&scanner.current().unwrap()), Some(3.0));
    assert_eq!(scanner.len(), 2);
}

#[test]
fn test_replace_current() {
    let page = page(b"1 w 2 w");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.move_first();
    let old = scanner.replace_current(Operation::SetLineWidth(7.0).into());
    assert_eq!(line_width(&old), Some(1.0));
    scanner.move_next();
    assert_eq!(scanner.state().line_width, 7.0);
}

#[test]
fn test_edit_inside_child_level() {
    let page = page(b"q 1 w Q");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.move_next();
    {
        let mut child = scanner.child_level().unwrap();
        child.move_end();
        child.insert(Operation::SetLineWidth(4.0).into());
        assert_eq!(child.len(), 2);
    }
    drop(scanner);

    let objects = page.objects();
    let group = objects[0].as_composite().unwrap();
    let widths: Vec<f64> = group.objects.iter().filter_map(line_width).collect();
    assert_eq!(widths, vec![1.0, 4.0]);
}

#[test]
#[should_panic(expected = "without a current object")]
fn test_remove_without_current_panics() {
    let page = page(b"1 w");
    let mut scanner = ContentScanner::for_page(&page, ScanParams::default());
    scanner.remove();
}
