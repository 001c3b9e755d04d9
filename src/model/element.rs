use serde::{Deserialize, Serialize};

use crate::foundation::color::parse_css_color;
use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::ids::ElementId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A positioned, styled scene element.
///
/// Serialized with the `type` tag and camelCase keys:
/// `{"id":"..","type":"image","x":..,"y":..,"width":..,"height":..,"zIndex":..,"src":..}`.
pub struct Element {
    /// Opaque id, unique within a document.
    pub id: ElementId,
    /// Left edge in canvas pixels.
    pub x: f64,
    /// Top edge in canvas pixels.
    pub y: f64,
    /// Width in canvas pixels, `> 0`.
    pub width: f64,
    /// Height in canvas pixels, `> 0`.
    pub height: f64,
    /// Rotation in degrees about the element's own center, in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    /// Opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Paint order key; ties keep insertion order.
    #[serde(default)]
    pub z_index: i64,
    /// Variant payload.
    #[serde(flatten)]
    pub body: ElementBody,
}

pub(crate) fn default_opacity() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// Element variants.
pub enum ElementBody {
    /// Raster or SVG image.
    Image(ImageBody),
    /// Single-line text block.
    Text(TextBody),
}

/// Discriminant of [`ElementBody`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `type: "image"`.
    Image,
    /// `type: "text"`.
    Text,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Image payload: source plus color adjustments.
pub struct ImageBody {
    /// URI or data URI. Empty means "no image yet".
    #[serde(default)]
    pub src: String,
    /// Adjustments applied by the render backend.
    #[serde(flatten)]
    pub filters: FilterAdjustments,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Per-image adjustments. `0` is neutral for every field.
pub struct FilterAdjustments {
    /// `-100..=100`.
    pub brightness: f64,
    /// `-100..=100`.
    pub contrast: f64,
    /// `-100..=100`.
    pub saturation: f64,
    /// Degrees, `0..=360`.
    pub hue: f64,
    /// Pixels, `0..=20`.
    pub blur: f64,
    /// Percent, `0..=100`.
    pub grayscale: f64,
    /// Percent, `0..=100`.
    pub sepia: f64,
}

impl FilterAdjustments {
    /// Inclusive ranges, in pipeline order.
    pub const RANGES: [(&'static str, f64, f64); 7] = [
        ("brightness", -100.0, 100.0),
        ("contrast", -100.0, 100.0),
        ("saturation", -100.0, 100.0),
        ("hue", 0.0, 360.0),
        ("blur", 0.0, 20.0),
        ("grayscale", 0.0, 100.0),
        ("sepia", 0.0, 100.0),
    ];

    /// Values in pipeline order.
    pub fn values(&self) -> [f64; 7] {
        [
            self.brightness,
            self.contrast,
            self.saturation,
            self.hue,
            self.blur,
            self.grayscale,
            self.sepia,
        ]
    }

    /// `true` when every adjustment is neutral.
    pub fn is_neutral(&self) -> bool {
        self.values().iter().all(|v| *v == 0.0)
    }

    /// Check every value against its range.
    pub fn validate(&self) -> StudioResult<()> {
        for ((name, lo, hi), v) in Self::RANGES.iter().zip(self.values()) {
            if !v.is_finite() || v < *lo || v > *hi {
                return Err(StudioError::validation(format!(
                    "{name} must be within {lo}..={hi} (got {v})"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Text payload.
pub struct TextBody {
    /// Content; may be empty, in which case nothing is painted.
    #[serde(default)]
    pub text: String,
    /// Font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Family name resolved against the font database.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// CSS color string.
    #[serde(default = "default_font_color")]
    pub font_color: String,
    /// Weight.
    #[serde(default)]
    pub font_weight: FontWeight,
    /// Horizontal alignment relative to `x`.
    #[serde(default)]
    pub text_align: TextAlign,
}

fn default_font_size() -> u32 {
    16
}

fn default_font_family() -> String {
    "Arial".to_owned()
}

fn default_font_color() -> String {
    "#000000".to_owned()
}

impl Default for TextBody {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: default_font_size(),
            font_family: default_font_family(),
            font_color: default_font_color(),
            font_weight: FontWeight::default(),
            text_align: TextAlign::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Text weight.
pub enum FontWeight {
    /// Regular.
    #[default]
    Normal,
    /// Bold.
    Bold,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Horizontal text alignment. `x` is the anchor: left edge, center, or right edge of the run.
pub enum TextAlign {
    /// Anchor at the start of the run.
    #[default]
    Left,
    /// Anchor at the middle of the run.
    Center,
    /// Anchor at the end of the run.
    Right,
}

impl Element {
    /// Variant discriminant.
    pub fn kind(&self) -> ElementKind {
        match self.body {
            ElementBody::Image(_) => ElementKind::Image,
            ElementBody::Text(_) => ElementKind::Text,
        }
    }

    /// Image payload, if this is an image.
    pub fn as_image(&self) -> Option<&ImageBody> {
        match &self.body {
            ElementBody::Image(img) => Some(img),
            ElementBody::Text(_) => None,
        }
    }

    /// Text payload, if this is text.
    pub fn as_text(&self) -> Option<&TextBody> {
        match &self.body {
            ElementBody::Text(t) => Some(t),
            ElementBody::Image(_) => None,
        }
    }

    /// Unrotated bounds in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Center of the unrotated bounds.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test on the unrotated bounds.
    ///
    /// Rotation is ignored: a rotated element is hit inside its original axis-aligned box.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// `T(center) * R(rotation) * T(-center)`.
    pub fn rotation_transform(&self) -> Affine {
        if self.rotation == 0.0 {
            return Affine::IDENTITY;
        }
        let c = self.center().to_vec2();
        Affine::translate(c) * Affine::rotate(self.rotation.to_radians()) * Affine::translate(-c)
    }

    /// Same element moved by `delta` under a new id.
    pub fn duplicated(&self, id: ElementId, delta: Vec2, z_index: i64) -> Self {
        Self {
            id,
            x: self.x + delta.x,
            y: self.y + delta.y,
            z_index,
            ..self.clone()
        }
    }

    /// Check every element invariant.
    pub fn validate(&self) -> StudioResult<()> {
        if self.id.as_str().is_empty() {
            return Err(StudioError::validation("element id must be non-empty"));
        }
        validate_geometry(
            self.x,
            self.y,
            self.width,
            self.height,
            self.rotation,
            self.opacity,
        )?;
        self.body.validate()
    }
}

/// `true` when [`Element::validate`] passes.
pub fn is_valid_element(element: &Element) -> bool {
    element.validate().is_ok()
}

pub(crate) fn validate_geometry(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation: f64,
    opacity: f64,
) -> StudioResult<()> {
    if !x.is_finite() || !y.is_finite() {
        return Err(StudioError::validation("element position must be finite"));
    }
    if !width.is_finite() || width <= 0.0 || !height.is_finite() || height <= 0.0 {
        return Err(StudioError::validation(format!(
            "element size must be > 0 (got {width}x{height})"
        )));
    }
    if !rotation.is_finite() || !(0.0..360.0).contains(&rotation) {
        return Err(StudioError::validation(format!(
            "rotation must be within [0, 360) (got {rotation})"
        )));
    }
    if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
        return Err(StudioError::validation(format!(
            "opacity must be within [0, 1] (got {opacity})"
        )));
    }
    Ok(())
}

impl ElementBody {
    /// Variant-specific invariants.
    pub fn validate(&self) -> StudioResult<()> {
        match self {
            ElementBody::Image(img) => img.filters.validate(),
            ElementBody::Text(t) => {
                if t.font_size == 0 {
                    return Err(StudioError::validation("fontSize must be > 0"));
                }
                if t.font_family.trim().is_empty() {
                    return Err(StudioError::validation("fontFamily must be non-empty"));
                }
                parse_css_color(&t.font_color)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/element.rs"]
mod tests;
