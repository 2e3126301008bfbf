//! Integration tests: decode → re-encode of scenes and outbound messages.
//!
//! Verifies that every record the server sends survives the client intact,
//! including fields and tags the client does not itself understand.

use ld_core::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixture() -> &'static str {
    include_str!("fixtures/scene.json")
}

fn fixture_objs() -> Value {
    let value: Value = serde_json::from_str(fixture()).unwrap();
    value["objs"].clone()
}

// ─── Decoding ───────────────────────────────────────────────────────────

#[test]
fn fixture_decodes_every_tag() {
    init_logs();
    let frame = decode_frame(fixture()).expect("fixture should decode");
    assert!(frame.is_final());
    let scene = frame.scene();
    assert_eq!(scene.len(), 8);

    let tags: Vec<&str> = scene.iter().map(|(_, record)| record.tag()).collect();
    assert_eq!(tags, vec!["CB", "L", "P", "C", "E", "S", "A", "Z"]);

    let known = scene.iter().filter(|(_, r)| r.shape().is_some()).count();
    assert_eq!(known, 7);
}

#[test]
fn identity_names_come_from_records() {
    let frame = decode_frame(fixture()).unwrap();
    let names: Vec<String> = frame.scene().names().map(|id| id.to_string()).collect();
    assert_eq!(names, vec!["AB", "A_label", "p1", "A", "B", "C", "f"]);
}

#[test]
fn curve_points_keep_order() {
    let frame = decode_frame(fixture()).unwrap();
    let Some(ShapeRecord::Known(Shape::CubicBezier(curve))) = frame.scene().get("AB") else {
        panic!("AB should be a curve");
    };
    assert_eq!(curve.path.len(), 4);
    assert_eq!(curve.path[1], ModelPoint(-40.0, 90.0));
    assert_eq!(curve.style, StrokeStyle::Dashed);
}

#[test]
fn same_scene_as_intermediate_frame() {
    let objs = fixture_objs();
    let frame = decode_frame(&objs.to_string()).unwrap();
    assert!(!frame.is_final());
    assert_eq!(frame.scene().len(), 8);
}

#[test]
fn one_bad_record_fails_the_frame() {
    let mut objs = fixture_objs();
    objs["A"]["contents"]
        .as_object_mut()
        .unwrap()
        .remove("r");
    let err = decode_frame(&objs.to_string()).unwrap_err();
    match err {
        CodecError::InvalidShape { name, tag, source } => {
            assert_eq!(name, "A");
            assert_eq!(tag, "C");
            assert!(source.to_string().contains("missing field `r`"), "{source}");
        }
        other => panic!("expected InvalidShape, got {other:?}"),
    }
}

#[test]
fn mistyped_field_is_rejected() {
    let mut objs = fixture_objs();
    objs["f"]["contents"]["thickness"] = json!("thick");
    let err = decode_frame(&objs.to_string()).unwrap_err();
    assert!(err.to_string().contains("object `f` (A)"), "{err}");
}

#[test]
fn non_object_record_is_rejected() {
    let err = decode_frame(r#"{"x": 42}"#).unwrap_err();
    assert_eq!(err.to_string(), "object `x`: expected a shape record, found a number");
}

// ─── Re-encoding ────────────────────────────────────────────────────────

#[test]
fn update_echo_preserves_every_field() {
    let scene = decode_frame(fixture()).unwrap().into_scene();
    let text = encode_message(&OutboundMessage::Update { objs: scene }).unwrap();
    let echoed: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(echoed["tag"], "Update");
    // Integers stay integers; key order is kept.
    assert_eq!(echoed["contents"]["objs"], fixture_objs());
    assert!(text.contains(r#""r":60,"#), "{text}");
}

#[test]
fn update_with_measured_label_adds_extent() {
    let mut scene = decode_frame(fixture()).unwrap().into_scene();
    assert!(scene.record_label_extent("A_label", 9.5, 18.0));

    let text = encode_message(&OutboundMessage::Update { objs: scene }).unwrap();
    let back = decode_message(&text).unwrap();
    let OutboundMessage::Update { objs } = back else {
        panic!("expected Update");
    };
    let Some(ShapeRecord::Known(Shape::Label(label))) = objs.get("A_label") else {
        panic!("A_label should be a label");
    };
    assert_eq!(label.text, "A");
    assert_eq!((label.x, label.y), (-120.0, 40.0));
    assert_eq!((label.width, label.height), (Some(9.5), Some(18.0)));
}
