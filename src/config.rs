use std::path::PathBuf;

use crate::foundation::core::Rgba8;

/// Visual style of the selection overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionStyle {
    /// Outline and handle color.
    pub color: Rgba8,
    /// Outline width in canvas pixels.
    pub outline_px: f64,
    /// Side length of the square corner handles in canvas pixels.
    pub handle_px: f64,
}

impl Default for SelectionStyle {
    fn default() -> Self {
        Self {
            color: Rgba8::opaque(0x25, 0x63, 0xeb),
            outline_px: 2.0,
            handle_px: 8.0,
        }
    }
}

/// Engine-wide settings.
///
/// `Default` gives the studio's stock behavior; [`StudioConfig::from_env`] layers environment
/// overrides on top:
///
/// - `STUDIO_FONT_DIR`: extra font directories (platform path-list syntax)
/// - `STUDIO_SYSTEM_FONTS`: `0` disables loading system fonts
/// - `STUDIO_ASSET_ROOT`: root directory for relative image sources
/// - `STUDIO_DRAG_MARGIN_PX`: margin kept inside the canvas while dragging
#[derive(Clone, Debug, PartialEq)]
pub struct StudioConfig {
    /// Dragged elements keep their top-left at most this far from the right/bottom edge.
    pub drag_margin_px: f64,
    /// Resolution that maps 1 canvas pixel to 1 surface pixel.
    pub baseline_dpi: f64,
    /// Selection overlay style.
    pub selection: SelectionStyle,
    /// Fill used for images whose source has not finished loading.
    pub placeholder_color: Rgba8,
    /// Extra font directories searched in addition to system fonts.
    pub font_dirs: Vec<PathBuf>,
    /// Whether the system font database is loaded.
    pub load_system_fonts: bool,
    /// Root for relative image sources resolved by the filesystem loader.
    pub asset_root: Option<PathBuf>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            drag_margin_px: 50.0,
            baseline_dpi: 96.0,
            selection: SelectionStyle::default(),
            placeholder_color: Rgba8::opaque(0xe5, 0xe7, 0xeb),
            font_dirs: Vec::new(),
            load_system_fonts: true,
            asset_root: None,
        }
    }
}

impl StudioConfig {
    /// Defaults with process environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Unparsable values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dirs) = lookup("STUDIO_FONT_DIR") {
            self.font_dirs
                .extend(std::env::split_paths(&dirs).filter(|p| !p.as_os_str().is_empty()));
        }
        if let Some(v) = lookup("STUDIO_SYSTEM_FONTS") {
            self.load_system_fonts = !matches!(v.trim(), "0" | "false" | "off");
        }
        if let Some(root) = lookup("STUDIO_ASSET_ROOT").filter(|v| !v.trim().is_empty()) {
            self.asset_root = Some(PathBuf::from(root));
        }
        if let Some(margin) = lookup("STUDIO_DRAG_MARGIN_PX")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|m| m.is_finite() && *m >= 0.0)
        {
            self.drag_margin_px = margin;
        }
        self
    }

    /// Surface scale factor for a target resolution.
    pub fn dpi_scale(&self, dpi: f64) -> f64 {
        dpi / self.baseline_dpi
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
