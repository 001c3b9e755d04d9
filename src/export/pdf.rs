use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::cache::ImageCache;
use crate::assets::loader::ImageLoader;
use crate::export::pages::{PagedDocument, RenderedPage};
use crate::export::raster::resolve_document_images;
use crate::foundation::error::StudioResult;
use crate::model::document::CanvasDocument;
use crate::render::cpu::{CpuRenderer, RenderOptions};

/// Millimetres per CSS pixel at 96 DPI.
pub const PX_TO_MM: f64 = 0.264583;

/// Page orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Height >= width.
    Portrait,
    /// Width > height.
    Landscape,
}

impl Orientation {
    /// Landscape only when strictly wider than tall.
    pub fn for_size(width: f64, height: f64) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// One page handed to the PDF assembler. The raster is placed full-bleed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    /// 1-based page number.
    pub page_number: u32,
    /// PNG bytes of the page raster.
    #[serde(skip)]
    pub png: Arc<Vec<u8>>,
    /// Physical width.
    pub width_mm: f64,
    /// Physical height.
    pub height_mm: f64,
    /// Orientation derived from the physical size.
    pub orientation: Orientation,
}

impl PageDescriptor {
    /// Descriptor for a surface of `width_px x height_px` painted at `scale`.
    ///
    /// Physical size follows the logical canvas size, so higher DPI only adds detail.
    pub fn from_raster(
        page_number: u32,
        png: Arc<Vec<u8>>,
        width_px: u32,
        height_px: u32,
        scale: f64,
    ) -> Self {
        let width_mm = f64::from(width_px) / scale * PX_TO_MM;
        let height_mm = f64::from(height_px) / scale * PX_TO_MM;
        Self {
            page_number,
            png,
            width_mm,
            height_mm,
            orientation: Orientation::for_size(width_mm, height_mm),
        }
    }
}

/// Turns page descriptors into a PDF document.
pub trait PdfAssembler {
    /// Assemble `pages` in order and return the PDF bytes.
    fn assemble(&self, pages: &[PageDescriptor]) -> impl Future<Output = StudioResult<Vec<u8>>>;
}

/// Render every page of `paged` at `dpi`, store the rasters on the pages, and describe them.
///
/// Images referenced by the document or by any page are awaited once before the first page is
/// painted.
#[tracing::instrument(skip_all, fields(pages = paged.pages.len(), dpi = dpi))]
pub async fn export_pages<L: ImageLoader>(
    renderer: &mut CpuRenderer,
    document: &CanvasDocument,
    paged: &mut PagedDocument,
    images: &mut ImageCache,
    loader: &L,
    dpi: f64,
) -> StudioResult<Vec<PageDescriptor>> {
    images.register_sources(
        paged
            .pages
            .iter()
            .flat_map(|page| &page.elements)
            .filter_map(|el| el.as_image().map(|img| img.src.as_str())),
    );
    resolve_document_images(document, images, loader).await;

    let mut out = Vec::with_capacity(paged.pages.len());
    for page in &mut paged.pages {
        let page_doc = PagedDocument::page_document(document, page);
        let painted = renderer.render(&page_doc, None, images, &RenderOptions::export(dpi))?;
        let png = Arc::new(painted.surface.to_png()?);

        out.push(PageDescriptor::from_raster(
            page.page_number,
            Arc::clone(&png),
            painted.surface.width,
            painted.surface.height,
            painted.scale,
        ));
        page.content = Some(RenderedPage {
            png,
            width_px: painted.surface.width,
            height_px: painted.surface.height,
        });
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/export/pdf.rs"]
mod tests;
