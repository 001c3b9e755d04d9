/// Persistence, upload and template seams.
pub mod collaborators;
/// Open-project state and host operations.
pub mod editor;
