use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assets::cache::ImageCache;
use crate::assets::loader::ImageLoader;
use crate::foundation::error::{StudioError, StudioResult};
use crate::model::document::CanvasDocument;
use crate::render::cpu::{CpuRenderer, RenderOptions};
use crate::render::surface::RasterSurface;

/// Named export resolutions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportQuality {
    /// 96 DPI, screen resolution.
    #[default]
    Standard,
    /// 150 DPI.
    High,
    /// 300 DPI, print.
    Professional,
}

impl ExportQuality {
    /// Every preset, lowest first.
    pub const ALL: [ExportQuality; 3] = [
        ExportQuality::Standard,
        ExportQuality::High,
        ExportQuality::Professional,
    ];

    /// Resolution of the preset.
    pub fn dpi(self) -> f64 {
        match self {
            ExportQuality::Standard => 96.0,
            ExportQuality::High => 150.0,
            ExportQuality::Professional => 300.0,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ExportQuality::Standard => "standard",
            ExportQuality::High => "high",
            ExportQuality::Professional => "professional",
        }
    }
}

impl fmt::Display for ExportQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportQuality {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|q| q.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StudioError::validation(format!("unknown export quality '{s}'")))
    }
}

/// PNG export of a whole canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterExport {
    /// Encoded PNG.
    pub png: Vec<u8>,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Resolution the surface was painted at.
    pub dpi: f64,
}

/// Fail with `SurfaceUnavailable` unless a paint has happened.
pub fn require_painted(surface: Option<&RasterSurface>) -> StudioResult<&RasterSurface> {
    surface.ok_or_else(|| {
        StudioError::surface_unavailable("export requested before the canvas was painted")
    })
}

/// Wait for every image source `document` references.
///
/// This is the export barrier: all sources are fetched concurrently and the call returns only
/// after each one is ready or failed.
pub async fn resolve_document_images<L: ImageLoader>(
    document: &CanvasDocument,
    images: &mut ImageCache,
    loader: &L,
) -> usize {
    images.register_sources(
        document
            .elements
            .iter()
            .filter_map(|el| el.as_image().map(|img| img.src.as_str())),
    );
    images.resolve_pending(loader).await
}

/// Paint a surface for export at `dpi` once every image has settled.
pub async fn render_for_export<L: ImageLoader>(
    renderer: &mut CpuRenderer,
    document: &CanvasDocument,
    images: &mut ImageCache,
    loader: &L,
    dpi: f64,
) -> StudioResult<RasterSurface> {
    resolve_document_images(document, images, loader).await;
    let out = renderer.render(document, None, images, &RenderOptions::export(dpi))?;
    Ok(out.surface)
}

/// Lossless PNG of `document` at `dpi`.
#[tracing::instrument(skip_all, fields(dpi = dpi))]
pub async fn export_raster<L: ImageLoader>(
    renderer: &mut CpuRenderer,
    document: &CanvasDocument,
    images: &mut ImageCache,
    loader: &L,
    dpi: f64,
) -> StudioResult<RasterExport> {
    let surface = render_for_export(renderer, document, images, loader, dpi).await?;
    Ok(RasterExport {
        png: surface.to_png()?,
        width: surface.width,
        height: surface.height,
        dpi,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/export/raster.rs"]
mod tests;
