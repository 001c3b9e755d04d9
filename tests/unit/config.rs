use super::*;

#[test]
fn defaults_match_studio_constants() {
    let cfg = StudioConfig::default();
    assert_eq!(cfg.drag_margin_px, 50.0);
    assert_eq!(cfg.baseline_dpi, 96.0);
    assert_eq!(cfg.selection.outline_px, 2.0);
    assert_eq!(cfg.selection.handle_px, 8.0);
    assert_eq!(cfg.selection.color, Rgba8::opaque(0x25, 0x63, 0xeb));
    assert_eq!(cfg.dpi_scale(300.0), 300.0 / 96.0);
}

#[test]
fn overrides_apply_and_ignore_garbage() {
    let cfg = StudioConfig::default().with_overrides(|key| match key {
        "STUDIO_DRAG_MARGIN_PX" => Some("32".to_string()),
        "STUDIO_SYSTEM_FONTS" => Some("0".to_string()),
        "STUDIO_ASSET_ROOT" => Some("/srv/assets".to_string()),
        _ => None,
    });
    assert_eq!(cfg.drag_margin_px, 32.0);
    assert!(!cfg.load_system_fonts);
    assert_eq!(cfg.asset_root, Some(PathBuf::from("/srv/assets")));

    let cfg = StudioConfig::default().with_overrides(|key| match key {
        "STUDIO_DRAG_MARGIN_PX" => Some("-4".to_string()),
        "STUDIO_ASSET_ROOT" => Some("  ".to_string()),
        _ => None,
    });
    assert_eq!(cfg.drag_margin_px, 50.0);
    assert_eq!(cfg.asset_root, None);
}
