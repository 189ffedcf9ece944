//! Tests for building the instruction tree from content-stream bytes.

use pdfscan_core::model::{
    CompositeKind, ContentObject, Operation, PdfObject, ShowText, TextElement,
};
use pdfscan_core::parser::parse_content;

fn kind(object: &ContentObject) -> &CompositeKind {
    &object.as_composite().expect("composite").kind
}

// ============================================================================
// Nesting
// ============================================================================

#[test]
fn test_groups_nest() {
    let tree = parse_content(b"q BT /F1 12 Tf (x) Tj ET Q 1 w").unwrap();
    assert_eq!(tree.len(), 2);
    assert_eq!(kind(&tree[0]), &CompositeKind::LocalGraphicsState);

    let group = tree[0].as_composite().unwrap();
    assert_eq!(group.objects.len(), 1);
    assert_eq!(kind(&group.objects[0]), &CompositeKind::Text);
    assert_eq!(tree[0].leaf_count(), 2);
    assert_eq!(tree[1].as_leaf(), Some(&Operation::SetLineWidth(1.0)));
}

#[test]
fn test_marked_content_keeps_tag_and_properties() {
    let tree = parse_content(b"/Span <</MCID 3>> BDC /Artifact BMC EMC EMC").unwrap();
    assert_eq!(tree.len(), 1);
    match kind(&tree[0]) {
        CompositeKind::MarkedContent {
            tag,
            properties: Some(PdfObject::Dict(dict)),
        } => {
            assert_eq!(tag, "Span");
            assert_eq!(dict.get("MCID"), Some(&PdfObject::Int(3)));
        }
        other => panic!("expected marked content with properties, got {other:?}"),
    }
    let inner = &tree[0].as_composite().unwrap().objects[0];
    assert!(matches!(
        kind(inner),
        CompositeKind::MarkedContent { tag, properties: None } if tag == "Artifact"
    ));
}

#[test]
fn test_unterminated_groups_are_closed() {
    let tree = parse_content(b"q BT (x) Tj").unwrap();
    assert_eq!(tree.len(), 1);
    let group = tree[0].as_composite().unwrap();
    assert_eq!(kind(&group.objects[0]), &CompositeKind::Text);
}

#[test]
fn test_unbalanced_closers_are_ignored() {
    let tree = parse_content(b"Q 1 w ET EMC 2 w").unwrap();
    assert_eq!(tree.len(), 2);
    assert!(tree.iter().all(|o| !o.is_composite()));
}

#[test]
fn test_closer_closes_inner_groups() {
    // Q closes the text object left open inside it
    let tree = parse_content(b"q BT (x) Tj Q 3 w").unwrap();
    assert_eq!(tree.len(), 2);
    let group = tree[0].as_composite().unwrap();
    assert_eq!(group.objects.len(), 1);
    assert_eq!(kind(&group.objects[0]), &CompositeKind::Text);
}

// ============================================================================
// Operations
// ============================================================================

#[test]
fn test_text_showing_operators() {
    let tree = parse_content(b"[(A) -250 (B) 10.5] TJ (C) ' 1 2 (D) \"").unwrap();
    assert_eq!(
        tree[0].as_leaf(),
        Some(&Operation::ShowText(ShowText::Adjusted(vec![
            TextElement::Text(b"A".to_vec()),
            TextElement::Adjust(-250.0),
            TextElement::Text(b"B".to_vec()),
            TextElement::Adjust(10.5),
        ])))
    );
    assert_eq!(
        tree[1].as_leaf(),
        Some(&Operation::ShowText(ShowText::NextLine(b"C".to_vec())))
    );
    assert_eq!(
        tree[2].as_leaf(),
        Some(&Operation::ShowText(ShowText::NextLineSpaced {
            word_space: 1.0,
            char_space: 2.0,
            text: b"D".to_vec(),
        }))
    );
}

#[test]
fn test_curve_shorthands() {
    let tree = parse_content(b"1 2 3 4 v 5 6 7 8 y").unwrap();
    assert_eq!(
        tree[0].as_leaf(),
        Some(&Operation::CurveTo {
            c1: None,
            c2: Some((1.0, 2.0)),
            end: (3.0, 4.0),
        })
    );
    assert_eq!(
        tree[1].as_leaf(),
        Some(&Operation::CurveTo {
            c1: Some((5.0, 6.0)),
            c2: None,
            end: (7.0, 8.0),
        })
    );
}

#[test]
fn test_unknown_operator_keeps_operands() {
    let tree = parse_content(b"1 /X foo").unwrap();
    assert_eq!(
        tree[0].as_leaf(),
        Some(&Operation::Unknown {
            operator: "foo".into(),
            operands: vec![PdfObject::Int(1), PdfObject::Name("X".into())],
        })
    );
}

#[test]
fn test_inline_image_between_operators() {
    let content = b"q BI /W 2 /H 1 /BPC 8 /CS /RGB ID \x01\x02\x03\x04\x05\x06\nEI Q 1 w";
    let tree = parse_content(content).unwrap();
    assert_eq!(tree.len(), 2);
    let group = tree[0].as_composite().unwrap();
    match group.objects[0].as_leaf() {
        Some(Operation::InlineImage(image)) => {
            assert_eq!(image.width(), 2);
            assert_eq!(image.height(), 1);
            assert_eq!(image.color_space(), Some("DeviceRGB"));
            assert_eq!(image.data.len(), 6);
        }
        other => panic!("expected an inline image, got {other:?}"),
    }
}
