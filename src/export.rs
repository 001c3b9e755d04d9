/// Page splitting and the page cache.
pub mod pages;
/// Page descriptors and PDF assembly seam.
pub mod pdf;
/// Whole-canvas PNG export and quality presets.
pub mod raster;
