use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StudioError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        StudioError::surface_unavailable("x")
            .to_string()
            .contains("surface unavailable:")
    );
    assert!(
        StudioError::asset_load("x")
            .to_string()
            .contains("asset load error:")
    );
    assert!(
        StudioError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        StudioError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn io_names_the_failed_operation() {
    let err = StudioError::io("save_project", "connection reset");
    assert_eq!(
        err.to_string(),
        "io error during save_project: connection reset"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StudioError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn serde_json_errors_map_to_serde() {
    let err: StudioError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, StudioError::Serde(_)));
}
