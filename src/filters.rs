/// CPU application of filter pipelines.
pub mod apply;
/// Adjustment values to pipeline description.
pub mod pipeline;
/// Named presets and reset.
pub mod presets;
