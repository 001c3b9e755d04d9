use crate::foundation::ids::ElementId;

/// Change notification emitted by the scene store after a committed mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    /// A new element was inserted.
    ElementAdded(ElementId),
    /// An element's fields changed (position, style, filters).
    ElementUpdated(ElementId),
    /// An element was removed.
    ElementDeleted(ElementId),
    /// An element's paint order changed.
    ZOrderChanged(ElementId),
    /// The selection moved; `None` means nothing is selected.
    SelectionChanged(Option<ElementId>),
    /// The whole document was swapped (project load).
    DocumentReplaced,
}

/// Callback registered with `SceneStore::subscribe`.
pub type SceneObserver = Box<dyn FnMut(&SceneEvent)>;
