/// `vello_cpu` scene painter.
pub mod cpu;
/// Scoped paint state.
pub mod paint;
/// Painted pixel buffers.
pub mod surface;
/// Font lookup and shaping.
pub mod text;
