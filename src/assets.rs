/// Per-source decoded image memo.
pub mod cache;
/// Raster and SVG decoding.
pub mod decode;
/// Byte fetching for image sources.
pub mod loader;
/// SVG rasterization at the drawn size.
pub mod svg_raster;
