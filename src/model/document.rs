use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::foundation::color::parse_css_color;
use crate::foundation::core::CanvasSize;
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::ids::ElementId;
use crate::model::element::Element;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// The studio canvas: fixed pixel size, background, and elements in insertion order.
pub struct CanvasDocument {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// CSS color string.
    pub background_color: String,
    /// Elements in insertion order. Paint order comes from [`CanvasDocument::paint_order`].
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background_color: "#ffffff".to_owned(),
            elements: Vec::new(),
        }
    }
}

impl CanvasDocument {
    /// Canvas dimensions.
    pub fn size(&self) -> CanvasSize {
        CanvasSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Check document and element invariants.
    pub fn validate(&self) -> StudioResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StudioError::validation(format!(
                "canvas size must be > 0 (got {}x{})",
                self.width, self.height
            )));
        }
        parse_css_color(&self.background_color)?;

        let mut seen = HashSet::with_capacity(self.elements.len());
        for el in &self.elements {
            el.validate()
                .map_err(|e| StudioError::validation(format!("element '{}': {e}", el.id)))?;
            if !seen.insert(&el.id) {
                return Err(StudioError::validation(format!(
                    "duplicate element id '{}'",
                    el.id
                )));
            }
        }
        Ok(())
    }

    /// Elements sorted by `z_index`, ties in insertion order.
    ///
    /// Painting walks this front to back; hit-testing walks it in reverse.
    pub fn paint_order(&self) -> Vec<&Element> {
        let mut out: Vec<&Element> = self.elements.iter().collect();
        out.sort_by_key(|el| el.z_index);
        out
    }

    /// Position of an element in insertion order.
    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|el| &el.id == id)
    }

    /// Look up an element.
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|el| &el.id == id)
    }

    /// Whether an id is taken.
    pub fn contains(&self, id: &ElementId) -> bool {
        self.index_of(id).is_some()
    }

    /// Highest z-index, if any element exists.
    pub fn max_z_index(&self) -> Option<i64> {
        self.elements.iter().map(|el| el.z_index).max()
    }

    /// Lowest z-index, if any element exists.
    pub fn min_z_index(&self) -> Option<i64> {
        self.elements.iter().map(|el| el.z_index).min()
    }

    /// Parse and validate the serialized form.
    pub fn from_json(s: &str) -> StudioResult<Self> {
        let doc: Self = serde_json::from_str(s)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Serialize to the wire form.
    pub fn to_json(&self) -> StudioResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Serialized document as exchanged with persistence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializedDocument(pub String);

impl SerializedDocument {
    /// Snapshot a document.
    pub fn from_document(doc: &CanvasDocument) -> StudioResult<Self> {
        Ok(Self(doc.to_json()?))
    }

    /// Parse and validate.
    pub fn to_document(&self) -> StudioResult<CanvasDocument> {
        CanvasDocument::from_json(&self.0)
    }

    /// Raw JSON text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/document.rs"]
mod tests;
