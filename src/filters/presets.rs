use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::StudioError;
use crate::model::element::FilterAdjustments;
use crate::model::patch::ElementPatch;

/// Named one-click looks. Each preset is a partial patch over the seven adjustments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterPreset {
    /// Full desaturation.
    Grayscale,
    /// Full sepia tone.
    Sepia,
    /// Darker, contrasty, faded warm tone.
    Vintage,
    /// Punchier colors.
    Vibrant,
    /// Blue-shifted hue.
    Cool,
    /// Orange-shifted hue.
    Warm,
}

impl FilterPreset {
    /// Every preset, in menu order.
    pub const ALL: [FilterPreset; 6] = [
        FilterPreset::Grayscale,
        FilterPreset::Sepia,
        FilterPreset::Vintage,
        FilterPreset::Vibrant,
        FilterPreset::Cool,
        FilterPreset::Warm,
    ];

    /// Patch applied through `update_element`. Unlisted adjustments keep their values.
    pub fn patch(self) -> ElementPatch {
        let base = ElementPatch::default();
        match self {
            FilterPreset::Grayscale => ElementPatch {
                grayscale: Some(100.0),
                saturation: Some(-100.0),
                ..base
            },
            FilterPreset::Sepia => ElementPatch {
                sepia: Some(100.0),
                ..base
            },
            FilterPreset::Vintage => ElementPatch {
                brightness: Some(-10.0),
                contrast: Some(20.0),
                saturation: Some(-30.0),
                sepia: Some(30.0),
                ..base
            },
            FilterPreset::Vibrant => ElementPatch {
                saturation: Some(50.0),
                contrast: Some(20.0),
                ..base
            },
            FilterPreset::Cool => ElementPatch {
                hue: Some(200.0),
                saturation: Some(20.0),
                ..base
            },
            FilterPreset::Warm => ElementPatch {
                hue: Some(30.0),
                saturation: Some(20.0),
                ..base
            },
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            FilterPreset::Grayscale => "grayscale",
            FilterPreset::Sepia => "sepia",
            FilterPreset::Vintage => "vintage",
            FilterPreset::Vibrant => "vibrant",
            FilterPreset::Cool => "cool",
            FilterPreset::Warm => "warm",
        }
    }
}

impl fmt::Display for FilterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterPreset {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| StudioError::validation(format!("unknown filter preset \"{s}\"")))
    }
}

/// Patch that returns all seven adjustments to neutral.
pub fn reset_filters_patch() -> ElementPatch {
    ElementPatch::filters(FilterAdjustments::default())
}

#[cfg(test)]
#[path = "../../tests/unit/filters/presets.rs"]
mod tests;
