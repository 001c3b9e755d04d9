use serde_json::json;

use super::*;

fn placed(draft: ElementDraft) -> Element {
    draft.into_element(ElementId::from("element-1-a"), 0)
}

#[test]
fn drafts_carry_studio_defaults() {
    let img = ElementDraft::image("photo.png");
    assert_eq!((img.x, img.y, img.width, img.height), (50.0, 50.0, 200.0, 200.0));

    let txt = ElementDraft::text("Edit me");
    assert_eq!((txt.width, txt.height), (200.0, 50.0));
    let ElementBody::Text(body) = &txt.body else {
        panic!("expected text");
    };
    assert_eq!(body.font_size, 24);
    assert_eq!(body.font_family, "Arial");
    assert_eq!(body.font_color, "#000000");
    assert_eq!(body.font_weight, FontWeight::Normal);
    assert_eq!(body.text_align, TextAlign::Left);
}

#[test]
fn empty_patch_changes_nothing() {
    let el = placed(ElementDraft::image("a.png"));
    let patch = ElementPatch::default();
    assert!(patch.is_empty());
    assert_eq!(patch.apply_to(&el).unwrap(), el);
}

#[test]
fn patch_merges_only_supplied_fields() {
    let el = placed(ElementDraft::text("hello").at(10.0, 20.0));
    let patch = ElementPatch {
        x: Some(99.0),
        font_weight: Some(FontWeight::Bold),
        ..ElementPatch::default()
    };
    let out = patch.apply_to(&el).unwrap();
    assert_eq!(out.x, 99.0);
    assert_eq!(out.y, 20.0);
    let t = out.as_text().unwrap();
    assert_eq!(t.font_weight, FontWeight::Bold);
    assert_eq!(t.text, "hello");
}

#[test]
fn variant_mismatch_is_a_validation_error() {
    let el = placed(ElementDraft::image("a.png"));
    let patch = ElementPatch {
        font_size: Some(12),
        ..ElementPatch::default()
    };
    let err = patch.apply_to(&el).unwrap_err();
    assert!(err.to_string().contains("fontSize"));

    let el = placed(ElementDraft::text("t"));
    let patch = ElementPatch {
        sepia: Some(10.0),
        ..ElementPatch::default()
    };
    assert!(patch.apply_to(&el).is_err());
}

#[test]
fn invalid_result_is_rejected() {
    let el = placed(ElementDraft::image("a.png"));
    let patch = ElementPatch {
        width: Some(-1.0),
        ..ElementPatch::default()
    };
    assert!(matches!(
        patch.apply_to(&el).unwrap_err(),
        StudioError::Validation(_)
    ));
}

#[test]
fn id_and_type_cannot_be_patched() {
    assert!(serde_json::from_value::<ElementPatch>(json!({"id": "x"})).is_err());
    assert!(serde_json::from_value::<ElementPatch>(json!({"type": "text"})).is_err());
    let p: ElementPatch = serde_json::from_value(json!({"zIndex": 4, "fontSize": 30})).unwrap();
    assert_eq!(p.z_index, Some(4));
    assert_eq!(p.font_size, Some(30));
}

#[test]
fn filters_patch_sets_all_seven() {
    let p = ElementPatch::filters(FilterAdjustments::default());
    let el = placed(ElementDraft::image("a.png"));
    let out = p.apply_to(&el).unwrap();
    assert!(out.as_image().unwrap().filters.is_neutral());
    assert!(p.sepia.is_some() && p.brightness.is_some());
}
