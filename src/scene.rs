/// Change notifications.
pub mod events;
/// Mutable canvas state.
pub mod store;
/// Template parsing.
pub mod template;
