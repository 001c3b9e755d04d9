use std::fmt;

use crate::filters::presets::{FilterPreset, reset_filters_patch};
use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::StudioResult;
use crate::foundation::ids::{ElementId, SubscriptionId};
use crate::model::document::{CanvasDocument, SerializedDocument};
use crate::model::element::Element;
use crate::model::patch::{ElementDraft, ElementPatch};
use crate::scene::events::{SceneEvent, SceneObserver};

/// Offset applied to duplicated elements.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

/// Single-writer owner of the canvas document and selection.
///
/// Every mutation validates before committing, bumps [`SceneStore::revision`], and then notifies
/// observers. Nothing here touches persistence.
pub struct SceneStore {
    document: CanvasDocument,
    selection: Option<ElementId>,
    revision: u64,
    observers: Vec<(SubscriptionId, SceneObserver)>,
    next_subscription: u64,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::from_valid(CanvasDocument::default())
    }
}

impl fmt::Debug for SceneStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneStore")
            .field("document", &self.document)
            .field("selection", &self.selection)
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SceneStore {
    /// Store over a validated document.
    pub fn new(document: CanvasDocument) -> StudioResult<Self> {
        document.validate()?;
        Ok(Self::from_valid(document))
    }

    fn from_valid(document: CanvasDocument) -> Self {
        Self {
            document,
            selection: None,
            revision: 0,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current document.
    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    /// Elements in insertion order.
    pub fn elements(&self) -> &[Element] {
        &self.document.elements
    }

    /// Look up an element by id.
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.document.element(id)
    }

    /// Monotonic counter of committed content mutations.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Selected id, if any.
    pub fn selection(&self) -> Option<&ElementId> {
        self.selection.as_ref()
    }

    /// Register an observer. Observers run synchronously after each committed change.
    pub fn subscribe(&mut self, observer: impl FnMut(&SceneEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Drop an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn emit(&mut self, event: SceneEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
    }

    fn commit(&mut self, event: SceneEvent) {
        self.revision += 1;
        self.emit(event);
    }

    fn fresh_id(&self) -> ElementId {
        loop {
            let id = ElementId::generate();
            if !self.document.contains(&id) {
                return id;
            }
        }
    }

    /// Insert a new element on top of the current element count.
    ///
    /// The draft is validated first; on error the store is unchanged.
    #[tracing::instrument(skip(self, draft))]
    pub fn add_element(&mut self, draft: ElementDraft) -> StudioResult<ElementId> {
        draft.validate()?;
        let id = self.fresh_id();
        let z_index = self.document.elements.len() as i64;
        self.document
            .elements
            .push(draft.into_element(id.clone(), z_index));
        self.commit(SceneEvent::ElementAdded(id.clone()));
        Ok(id)
    }

    /// Insert several elements atomically: all drafts are validated before any is added.
    pub fn add_elements(&mut self, drafts: Vec<ElementDraft>) -> StudioResult<Vec<ElementId>> {
        for draft in &drafts {
            draft.validate()?;
        }
        drafts
            .into_iter()
            .map(|draft| self.add_element(draft))
            .collect()
    }

    /// Shallow-merge `patch` into the element.
    ///
    /// An unknown id is a silent no-op returning `Ok(())`. A patch that would break an invariant
    /// is rejected whole. A patch that changes nothing emits no event.
    pub fn update_element(&mut self, id: &ElementId, patch: &ElementPatch) -> StudioResult<()> {
        let Some(idx) = self.document.index_of(id) else {
            tracing::debug!(%id, "update_element: unknown id ignored");
            return Ok(());
        };

        let current = &self.document.elements[idx];
        let next = patch.apply_to(current)?;
        if &next == current {
            return Ok(());
        }

        let z_changed = next.z_index != current.z_index;
        self.document.elements[idx] = next;
        self.commit(if z_changed && is_z_only(patch) {
            SceneEvent::ZOrderChanged(id.clone())
        } else {
            SceneEvent::ElementUpdated(id.clone())
        });
        Ok(())
    }

    /// Remove an element. Clears the selection if it pointed at it. Unknown ids are ignored.
    pub fn delete_element(&mut self, id: &ElementId) {
        let Some(idx) = self.document.index_of(id) else {
            tracing::debug!(%id, "delete_element: unknown id ignored");
            return;
        };

        self.document.elements.remove(idx);
        let was_selected = self.selection.as_ref() == Some(id);
        if was_selected {
            self.selection = None;
        }
        self.commit(SceneEvent::ElementDeleted(id.clone()));
        if was_selected {
            self.emit(SceneEvent::SelectionChanged(None));
        }
    }

    /// Set the element's z-index to one above the current maximum.
    pub fn bring_to_front(&mut self, id: &ElementId) -> StudioResult<()> {
        if !self.document.contains(id) {
            return Ok(());
        }
        let z = self.top_z_index();
        self.update_element(id, &ElementPatch::z_order(z))
    }

    /// Set the element's z-index to one below the current minimum.
    pub fn send_to_back(&mut self, id: &ElementId) -> StudioResult<()> {
        if !self.document.contains(id) {
            return Ok(());
        }
        let min = self.document.min_z_index().unwrap_or(0);
        let z = match min.checked_sub(1) {
            Some(z) => z,
            None => {
                self.renumber_z_indices();
                -1
            }
        };
        self.update_element(id, &ElementPatch::z_order(z))
    }

    /// One above the current maximum z-index, renumbering first if that would overflow.
    fn top_z_index(&mut self) -> i64 {
        let max = self.document.max_z_index().unwrap_or(-1);
        match max.checked_add(1) {
            Some(z) => z,
            None => {
                self.renumber_z_indices();
                self.document.elements.len() as i64
            }
        }
    }

    /// Reassign z-indices `0..n` in paint order. Relative order is unchanged.
    fn renumber_z_indices(&mut self) {
        let order: Vec<ElementId> = self
            .document
            .paint_order()
            .into_iter()
            .map(|el| el.id.clone())
            .collect();
        for (z, id) in order.iter().enumerate() {
            if let Some(idx) = self.document.index_of(id) {
                self.document.elements[idx].z_index = z as i64;
            }
        }
        tracing::debug!(elements = order.len(), "z-indices renumbered");
    }

    /// Copy an element under a fresh id, offset by (+20, +20) and placed on top.
    ///
    /// Returns `None` for an unknown id.
    pub fn duplicate_element(&mut self, id: &ElementId) -> StudioResult<Option<ElementId>> {
        let Some(source) = self.document.element(id) else {
            tracing::debug!(%id, "duplicate_element: unknown id ignored");
            return Ok(None);
        };

        let source = source.clone();
        let new_id = self.fresh_id();
        let z_index = self.top_z_index();
        let copy = source.duplicated(new_id.clone(), DUPLICATE_OFFSET, z_index);
        copy.validate()?;
        self.document.elements.push(copy);
        self.commit(SceneEvent::ElementAdded(new_id.clone()));
        Ok(Some(new_id))
    }

    /// Topmost element whose unrotated bounds contain `p` (edges inclusive).
    pub fn get_element_at_point(&self, p: Point) -> Option<&Element> {
        self.document
            .paint_order()
            .into_iter()
            .rev()
            .find(|el| el.contains_point(p))
    }

    /// The selected element, if the selection is set and still exists.
    pub fn get_selected_element(&self) -> Option<&Element> {
        self.selection.as_ref().and_then(|id| self.document.element(id))
    }

    /// Select an element. Unknown ids clear the selection.
    pub fn select(&mut self, id: Option<&ElementId>) {
        let next = id.filter(|id| self.document.contains(id)).cloned();
        if next != self.selection {
            self.selection = next.clone();
            self.emit(SceneEvent::SelectionChanged(next));
        }
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.select(None);
    }

    /// Apply a named filter preset to an image element.
    pub fn apply_preset(&mut self, id: &ElementId, preset: FilterPreset) -> StudioResult<()> {
        self.update_element(id, &preset.patch())
    }

    /// Return all seven adjustments of an image element to neutral.
    pub fn reset_filters(&mut self, id: &ElementId) -> StudioResult<()> {
        self.update_element(id, &reset_filters_patch())
    }

    /// Replace the whole document (project load). Clears the selection.
    pub fn load_document(&mut self, document: CanvasDocument) -> StudioResult<()> {
        document.validate()?;
        self.document = document;
        let had_selection = self.selection.take().is_some();
        self.commit(SceneEvent::DocumentReplaced);
        if had_selection {
            self.emit(SceneEvent::SelectionChanged(None));
        }
        Ok(())
    }

    /// Serialize the current state for persistence.
    pub fn snapshot(&self) -> StudioResult<SerializedDocument> {
        SerializedDocument::from_document(&self.document)
    }
}

fn is_z_only(patch: &ElementPatch) -> bool {
    ElementPatch {
        z_index: None,
        ..patch.clone()
    }
    .is_empty()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/store.rs"]
mod tests;
