use serde::{Deserialize, Serialize};

use crate::foundation::error::{StudioError, StudioResult};
use crate::model::element::{ElementBody, FilterAdjustments};
use crate::model::patch::ElementDraft;

const COMMON_KEYS: &[&str] = &["type", "x", "y", "width", "height", "rotation", "opacity"];
const IMAGE_KEYS: &[&str] = &[
    "src",
    "brightness",
    "contrast",
    "saturation",
    "hue",
    "blur",
    "grayscale",
    "sepia",
    "filters",
];
const TEXT_KEYS: &[&str] = &[
    "text",
    "fontSize",
    "fontFamily",
    "fontColor",
    "fontWeight",
    "textAlign",
];
// Identity and ordering are assigned on insertion; accepted and discarded.
const IGNORED_KEYS: &[&str] = &["id", "zIndex"];

/// A named template from the catalog collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePreset {
    /// Display name.
    pub name: String,
    /// Product category (`photo`, `book`, `calendar`, `gift`, ...).
    #[serde(default)]
    pub category: String,
    /// Raw template JSON, `{"elements": [...]}` plus optional document-level keys.
    pub template_data: String,
}

impl TemplatePreset {
    /// Parse this preset's element drafts.
    pub fn drafts(&self) -> StudioResult<Vec<ElementDraft>> {
        parse_template(&self.template_data)
    }
}

/// Parse template JSON into element drafts.
///
/// Document-level keys other than `elements` (`width`, `height`, `pages`, `layout`, ...) are
/// tolerated. A missing `elements` key yields no drafts. Each element entry is strict: unknown
/// keys, wrong types, variant mismatches and range violations are errors.
///
/// Legacy entries may carry a `filters` object of CSS-style multipliers
/// (`{"brightness": 1.1, "sepia": 0.8}`); these are converted to adjustment values.
#[tracing::instrument(skip(raw), fields(len = raw.len()))]
pub fn parse_template(raw: &str) -> StudioResult<Vec<ElementDraft>> {
    let root: serde_json::Value = serde_json::from_str(raw)?;
    let obj = root
        .as_object()
        .ok_or_else(|| StudioError::validation("template must be a JSON object"))?;

    let Some(elements) = obj.get("elements") else {
        return Ok(Vec::new());
    };
    let entries = elements
        .as_array()
        .ok_or_else(|| StudioError::validation("template 'elements' must be an array"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            parse_entry(entry)
                .map_err(|e| StudioError::validation(format!("template element {i}: {e}")))
        })
        .collect()
}

fn parse_entry(entry: &serde_json::Value) -> StudioResult<ElementDraft> {
    let mut obj = entry
        .as_object()
        .cloned()
        .ok_or_else(|| StudioError::validation("entry must be an object"))?;

    let kind = obj
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| StudioError::validation("entry requires a string 'type'"))?
        .to_owned();
    let variant_keys = match kind.as_str() {
        "image" => IMAGE_KEYS,
        "text" => TEXT_KEYS,
        other => {
            return Err(StudioError::validation(format!(
                "unknown element type \"{other}\""
            )));
        }
    };
    if let Some(key) = obj.keys().find(|k| {
        let k = k.as_str();
        !COMMON_KEYS.contains(&k) && !variant_keys.contains(&k) && !IGNORED_KEYS.contains(&k)
    }) {
        return Err(StudioError::validation(format!(
            "unexpected key '{key}' for {kind} element"
        )));
    }
    for key in IGNORED_KEYS {
        obj.remove(*key);
    }

    let legacy = obj.remove("filters");
    let mut draft: ElementDraft = serde_json::from_value(serde_json::Value::Object(obj))?;

    if let Some(legacy) = legacy {
        let ElementBody::Image(img) = &mut draft.body else {
            return Err(StudioError::validation("'filters' only applies to images"));
        };
        let legacy: LegacyFilters = serde_json::from_value(legacy)?;
        legacy.merge_into(&mut img.filters);
    }

    draft.validate()?;
    Ok(draft)
}

/// CSS-style multipliers used by older templates: `1.0` is neutral for brightness, contrast and
/// saturate; `0..=1` fractions for grayscale and sepia; degrees and pixels for hue and blur.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LegacyFilters {
    brightness: Option<f64>,
    contrast: Option<f64>,
    #[serde(alias = "saturate")]
    saturation: Option<f64>,
    #[serde(alias = "hueRotate")]
    hue: Option<f64>,
    blur: Option<f64>,
    grayscale: Option<f64>,
    sepia: Option<f64>,
}

impl LegacyFilters {
    fn merge_into(self, f: &mut FilterAdjustments) {
        fn pct_delta(m: f64) -> f64 {
            ((m - 1.0) * 100.0).round()
        }
        fn pct(m: f64) -> f64 {
            (m * 100.0).round()
        }

        if let Some(m) = self.brightness {
            f.brightness = pct_delta(m);
        }
        if let Some(m) = self.contrast {
            f.contrast = pct_delta(m);
        }
        if let Some(m) = self.saturation {
            f.saturation = pct_delta(m);
        }
        if let Some(deg) = self.hue {
            f.hue = deg;
        }
        if let Some(px) = self.blur {
            f.blur = px;
        }
        if let Some(m) = self.grayscale {
            f.grayscale = pct(m);
        }
        if let Some(m) = self.sepia {
            f.sepia = pct(m);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/template.rs"]
mod tests;
