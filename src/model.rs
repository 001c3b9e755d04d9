/// Serialized canvas document.
pub mod document;
/// Element shapes and invariants.
pub mod element;
/// Drafts for insertion and partial updates.
pub mod patch;
