use super::*;

#[test]
fn neutral_adjustments_render_none() {
    assert_eq!(filter_string(&FilterAdjustments::default()), "none");
    assert!(FilterPipeline::from_adjustments(&FilterAdjustments::default()).is_identity());
}

#[test]
fn single_brightness_step() {
    let f = FilterAdjustments {
        brightness: 10.0,
        ..FilterAdjustments::default()
    };
    assert_eq!(filter_string(&f), "brightness(110%)");
}

#[test]
fn order_is_fixed_and_neutral_entries_are_skipped() {
    let f = FilterAdjustments {
        sepia: 30.0,
        hue: 200.0,
        brightness: -10.0,
        saturation: -30.0,
        blur: 2.5,
        ..FilterAdjustments::default()
    };
    assert_eq!(
        filter_string(&f),
        "brightness(90%) saturate(70%) hue-rotate(200deg) blur(2.5px) sepia(30%)"
    );
}

#[test]
fn all_seven_render_in_order() {
    let f = FilterAdjustments {
        brightness: 1.0,
        contrast: 2.0,
        saturation: 3.0,
        hue: 4.0,
        blur: 5.0,
        grayscale: 6.0,
        sepia: 7.0,
    };
    assert_eq!(
        filter_string(&f),
        "brightness(101%) contrast(102%) saturate(103%) hue-rotate(4deg) blur(5px) grayscale(6%) sepia(7%)"
    );
}

#[test]
fn parse_reads_back_rendered_pipelines() {
    let f = FilterAdjustments {
        contrast: 20.0,
        grayscale: 100.0,
        blur: 3.0,
        ..FilterAdjustments::default()
    };
    let pipeline = FilterPipeline::from_adjustments(&f);
    let parsed = FilterPipeline::parse(&pipeline.to_string()).unwrap();
    assert_eq!(parsed, pipeline);
    assert!(parsed.has_blur());
    assert_eq!(FilterPipeline::parse("none").unwrap(), FilterPipeline::default());
}

#[test]
fn parse_rejects_wrong_units_and_names() {
    assert!(FilterPipeline::parse("brightness(110px)").is_err());
    assert!(FilterPipeline::parse("hue-rotate(10%)").is_err());
    assert!(FilterPipeline::parse("saturation(100%)").is_err());
    assert!(FilterPipeline::parse("blur(2px").is_err());
    assert!(FilterPipeline::parse("").is_err());
}
