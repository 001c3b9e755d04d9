use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::ids::ProjectId;
use crate::model::document::CanvasDocument;
use crate::model::element::Element;

/// Product a design is paginated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    /// Four elements per page.
    Book,
    /// Twelve elements per page.
    Calendar,
    /// Everything on one page.
    Poster,
}

impl ProductType {
    /// Every product, in menu order.
    pub const ALL: [ProductType; 3] = [
        ProductType::Book,
        ProductType::Calendar,
        ProductType::Poster,
    ];

    /// Page capacity; `None` means unbounded.
    pub fn elements_per_page(self) -> Option<usize> {
        match self {
            ProductType::Book => Some(4),
            ProductType::Calendar => Some(12),
            ProductType::Poster => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ProductType::Book => "book",
            ProductType::Calendar => "calendar",
            ProductType::Poster => "poster",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StudioError::validation(format!("unknown product type '{s}'")))
    }
}

/// Rendered raster of one page.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedPage {
    /// PNG bytes.
    pub png: Arc<Vec<u8>>,
    /// Surface width in pixels.
    pub width_px: u32,
    /// Surface height in pixels.
    pub height_px: u32,
}

/// One page of a [`PagedDocument`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// `page-{projectId}-{pageNumber}`.
    pub id: String,
    /// 1-based.
    pub page_number: u32,
    /// Raster content once the page was exported.
    #[serde(skip)]
    pub content: Option<RenderedPage>,
    /// Elements assigned to this page.
    pub elements: Vec<Element>,
}

/// Pages derived from one canvas document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedDocument {
    /// Owning project.
    pub project_id: ProjectId,
    /// Product the pages were cut for.
    pub product: ProductType,
    /// Pages in order.
    pub pages: Vec<Page>,
}

impl PagedDocument {
    /// Number of pages; never zero.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page by 1-based number.
    pub fn page(&self, page_number: u32) -> Option<&Page> {
        page_index(page_number).and_then(|i| self.pages.get(i))
    }

    /// Canvas document holding only `page`'s elements on `base`'s canvas.
    pub fn page_document(base: &CanvasDocument, page: &Page) -> CanvasDocument {
        CanvasDocument {
            width: base.width,
            height: base.height,
            background_color: base.background_color.clone(),
            elements: page.elements.clone(),
        }
    }
}

/// `page-{projectId}-{pageNumber}`.
pub fn page_id(project_id: ProjectId, page_number: u32) -> String {
    format!("page-{project_id}-{page_number}")
}

/// Split `elements` (document order, no re-sort) into pages for `product`.
///
/// Page count is `max(1, ceil(n / k))`; page `i` holds `[i*k, min(i*k + k, n))`.
#[tracing::instrument(skip(elements), fields(elements = elements.len()))]
pub fn generate_pages(
    project_id: ProjectId,
    product: ProductType,
    elements: &[Element],
) -> PagedDocument {
    let chunks: Vec<&[Element]> = match product.elements_per_page() {
        Some(k) if !elements.is_empty() => elements.chunks(k).collect(),
        _ => vec![elements],
    };

    let pages = chunks
        .into_iter()
        .zip(1u32..)
        .map(|(chunk, page_number)| Page {
            id: page_id(project_id, page_number),
            page_number,
            content: None,
            elements: chunk.to_vec(),
        })
        .collect();

    PagedDocument {
        project_id,
        product,
        pages,
    }
}

fn page_index(page_number: u32) -> Option<usize> {
    page_number.checked_sub(1).map(|i| i as usize)
}

/// Paged documents per project; regeneration replaces the cached entry.
#[derive(Clone, Debug, Default)]
pub struct PageCache {
    docs: HashMap<ProjectId, PagedDocument>,
}

impl PageCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Regenerate and cache pages for `project_id`.
    pub fn regenerate(
        &mut self,
        project_id: ProjectId,
        product: ProductType,
        elements: &[Element],
    ) -> &PagedDocument {
        let paged = generate_pages(project_id, product, elements);
        self.docs.insert(project_id, paged);
        &self.docs[&project_id]
    }

    /// Cached pages for `project_id`.
    pub fn get(&self, project_id: ProjectId) -> Option<&PagedDocument> {
        self.docs.get(&project_id)
    }

    /// Mutable cached pages for `project_id`.
    pub fn get_mut(&mut self, project_id: ProjectId) -> Option<&mut PagedDocument> {
        self.docs.get_mut(&project_id)
    }

    /// Page by 1-based number.
    pub fn page_by_number(&self, project_id: ProjectId, page_number: u32) -> Option<&Page> {
        self.get(project_id).and_then(|d| d.page(page_number))
    }

    /// Attach rendered content (and optionally a new element slice) to a page.
    pub fn update_page_content(
        &mut self,
        project_id: ProjectId,
        page_number: u32,
        content: RenderedPage,
        elements: Option<Vec<Element>>,
    ) -> StudioResult<()> {
        let doc = self.docs.get_mut(&project_id).ok_or_else(|| {
            StudioError::validation(format!("no pages generated for project {project_id}"))
        })?;
        let count = doc.pages.len();
        let page = page_index(page_number)
            .and_then(|i| doc.pages.get_mut(i))
            .ok_or_else(|| {
                StudioError::validation(format!(
                    "page {page_number} is out of range (1..={count})"
                ))
            })?;
        page.content = Some(content);
        if let Some(elements) = elements {
            page.elements = elements;
        }
        Ok(())
    }

    /// Pages that carry rendered content, in page order.
    pub fn export_page_images(&self, project_id: ProjectId) -> Vec<&Page> {
        self.get(project_id)
            .map(|d| d.pages.iter().filter(|p| p.content.is_some()).collect())
            .unwrap_or_default()
    }

    /// Drop the cached pages for `project_id`.
    pub fn invalidate(&mut self, project_id: ProjectId) -> bool {
        self.docs.remove(&project_id).is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pages.rs"]
mod tests;
