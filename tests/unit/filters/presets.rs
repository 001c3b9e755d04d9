use super::*;
use crate::filters::pipeline::filter_string;
use crate::foundation::ids::ElementId;
use crate::model::patch::ElementDraft;

fn apply(preset: FilterPreset) -> FilterAdjustments {
    let el = ElementDraft::image("a.png").into_element(ElementId::from("e"), 0);
    preset.patch().apply_to(&el).unwrap().as_image().unwrap().filters
}

#[test]
fn preset_values_match_the_studio_menu() {
    let g = apply(FilterPreset::Grayscale);
    assert_eq!((g.grayscale, g.saturation), (100.0, -100.0));

    let v = apply(FilterPreset::Vintage);
    assert_eq!(
        (v.brightness, v.contrast, v.saturation, v.sepia),
        (-10.0, 20.0, -30.0, 30.0)
    );

    let c = apply(FilterPreset::Cool);
    assert_eq!((c.hue, c.saturation), (200.0, 20.0));

    assert_eq!(
        filter_string(&apply(FilterPreset::Warm)),
        "saturate(120%) hue-rotate(30deg)"
    );
}

#[test]
fn presets_leave_unlisted_adjustments_alone() {
    let el = ElementDraft::image("a.png").into_element(ElementId::from("e"), 0);
    let blurred = ElementPatch {
        blur: Some(4.0),
        ..ElementPatch::default()
    }
    .apply_to(&el)
    .unwrap();
    let out = FilterPreset::Sepia.patch().apply_to(&blurred).unwrap();
    let f = out.as_image().unwrap().filters;
    assert_eq!((f.blur, f.sepia), (4.0, 100.0));
}

#[test]
fn reset_zeroes_everything() {
    let el = ElementDraft::image("a.png").into_element(ElementId::from("e"), 0);
    let styled = FilterPreset::Vintage.patch().apply_to(&el).unwrap();
    let reset = reset_filters_patch().apply_to(&styled).unwrap();
    assert_eq!(filter_string(&reset.as_image().unwrap().filters), "none");
}

#[test]
fn names_parse_case_insensitively() {
    assert_eq!("Vibrant".parse::<FilterPreset>().unwrap(), FilterPreset::Vibrant);
    assert!("noir".parse::<FilterPreset>().is_err());
    for p in FilterPreset::ALL {
        assert_eq!(p.to_string().parse::<FilterPreset>().unwrap(), p);
    }
}
