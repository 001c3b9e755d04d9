use serde::{Deserialize, Serialize};

use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::ids::ElementId;
use crate::model::element::{
    Element, ElementBody, FilterAdjustments, FontWeight, ImageBody, TextAlign, TextBody,
    default_opacity, validate_geometry,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// An element without identity: what callers hand to `add_element`.
///
/// The store assigns the id and the z-index.
pub struct ElementDraft {
    /// Left edge in canvas pixels.
    pub x: f64,
    /// Top edge in canvas pixels.
    pub y: f64,
    /// Width in canvas pixels.
    pub width: f64,
    /// Height in canvas pixels.
    pub height: f64,
    /// Degrees in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    /// `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Variant payload.
    #[serde(flatten)]
    pub body: ElementBody,
}

impl ElementDraft {
    /// Image with the studio's default placement: 200x200 at (50, 50).
    pub fn image(src: impl Into<String>) -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            width: 200.0,
            height: 200.0,
            rotation: 0.0,
            opacity: 1.0,
            body: ElementBody::Image(ImageBody {
                src: src.into(),
                filters: FilterAdjustments::default(),
            }),
        }
    }

    /// Text with the studio's default placement: 200x50 at (50, 50), 24px Arial black.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            width: 200.0,
            height: 50.0,
            rotation: 0.0,
            opacity: 1.0,
            body: ElementBody::Text(TextBody {
                text: text.into(),
                font_size: 24,
                ..TextBody::default()
            }),
        }
    }

    /// Move the top-left corner.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Resize.
    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Same checks as [`Element::validate`], minus identity.
    pub fn validate(&self) -> StudioResult<()> {
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

    /// Attach identity and paint order.
    pub fn into_element(self, id: ElementId, z_index: i64) -> Element {
        Element {
            id,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            rotation: self.rotation,
            opacity: self.opacity,
            z_index,
            body: self.body,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
/// Shallow partial update. Only supplied fields change; `id` and `type` are not patchable.
pub struct ElementPatch {
    /// New left edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New top edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// New width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// New height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// New opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// New paint order key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,

    /// New image source (image only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Image only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    /// Image only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
    /// Image only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f64>,
    /// Image only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<f64>,
    /// Image only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    /// Image only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grayscale: Option<f64>,
    /// Image only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sepia: Option<f64>,

    /// New content (text only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Text only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    /// Text only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Text only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    /// Text only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    /// Text only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
}

impl ElementPatch {
    /// Patch that only moves the element.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that only changes paint order.
    pub fn z_order(z: i64) -> Self {
        Self {
            z_index: Some(z),
            ..Self::default()
        }
    }

    /// Patch that sets all seven adjustments.
    pub fn filters(f: FilterAdjustments) -> Self {
        Self {
            brightness: Some(f.brightness),
            contrast: Some(f.contrast),
            saturation: Some(f.saturation),
            hue: Some(f.hue),
            blur: Some(f.blur),
            grayscale: Some(f.grayscale),
            sepia: Some(f.sepia),
            ..Self::default()
        }
    }

    /// `true` when no field is supplied.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn image_fields(&self) -> [(&'static str, bool); 8] {
        [
            ("src", self.src.is_some()),
            ("brightness", self.brightness.is_some()),
            ("contrast", self.contrast.is_some()),
            ("saturation", self.saturation.is_some()),
            ("hue", self.hue.is_some()),
            ("blur", self.blur.is_some()),
            ("grayscale", self.grayscale.is_some()),
            ("sepia", self.sepia.is_some()),
        ]
    }

    fn text_fields(&self) -> [(&'static str, bool); 6] {
        [
            ("text", self.text.is_some()),
            ("fontSize", self.font_size.is_some()),
            ("fontFamily", self.font_family.is_some()),
            ("fontColor", self.font_color.is_some()),
            ("fontWeight", self.font_weight.is_some()),
            ("textAlign", self.text_align.is_some()),
        ]
    }

    /// Merge into a copy of `element` and validate the result.
    ///
    /// The original is never touched, so a rejected patch leaves no partial state behind.
    pub fn apply_to(&self, element: &Element) -> StudioResult<Element> {
        let mut out = element.clone();

        fn set<T: Clone>(dst: &mut T, src: &Option<T>) {
            if let Some(v) = src {
                *dst = v.clone();
            }
        }

        set(&mut out.x, &self.x);
        set(&mut out.y, &self.y);
        set(&mut out.width, &self.width);
        set(&mut out.height, &self.height);
        set(&mut out.rotation, &self.rotation);
        set(&mut out.opacity, &self.opacity);
        set(&mut out.z_index, &self.z_index);

        match &mut out.body {
            ElementBody::Image(img) => {
                reject_foreign("image", &self.text_fields())?;
                set(&mut img.src, &self.src);
                set(&mut img.filters.brightness, &self.brightness);
                set(&mut img.filters.contrast, &self.contrast);
                set(&mut img.filters.saturation, &self.saturation);
                set(&mut img.filters.hue, &self.hue);
                set(&mut img.filters.blur, &self.blur);
                set(&mut img.filters.grayscale, &self.grayscale);
                set(&mut img.filters.sepia, &self.sepia);
            }
            ElementBody::Text(t) => {
                reject_foreign("text", &self.image_fields())?;
                set(&mut t.text, &self.text);
                set(&mut t.font_size, &self.font_size);
                set(&mut t.font_family, &self.font_family);
                set(&mut t.font_color, &self.font_color);
                set(&mut t.font_weight, &self.font_weight);
                set(&mut t.text_align, &self.text_align);
            }
        }

        out.validate()?;
        Ok(out)
    }
}

fn reject_foreign(kind: &str, fields: &[(&'static str, bool)]) -> StudioResult<()> {
    match fields.iter().find(|(_, present)| *present) {
        Some((name, _)) => Err(StudioError::validation(format!(
            "field '{name}' does not apply to {kind} elements"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/patch.rs"]
mod tests;
