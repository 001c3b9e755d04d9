//! studio-canvas is the canvas compositing and layout engine behind the photo-product studio.
//!
//! A design is a [`CanvasDocument`] of positioned image and text elements. The engine is
//! organized around one open project at a time:
//!
//! - Mutate the scene through a [`SceneStore`] (directly or via an [`EditorSession`])
//! - Drive selection and dragging from pointer events with the [`InteractionController`]
//! - Paint deterministically with the [`CpuRenderer`], the same code path for preview and export
//! - Paginate for books, calendars and posters, and export PNG rasters or PDF page descriptors
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Image source decoding, loading and caching.
pub mod assets;
/// Engine settings and environment overrides.
pub mod config;
/// Pagination and raster/PDF export.
pub mod export;
/// Filter parameter model and its CPU interpretation.
pub mod filters;
/// Pointer-driven selection and drag.
pub mod interaction;
/// Document and element data model.
pub mod model;
/// Raster rendering.
pub mod render;
/// Mutable scene state and templates.
pub mod scene;
/// Editor session and collaborator seams.
pub mod session;

pub use crate::foundation::color::parse_css_color;
pub use crate::foundation::core::{Affine, CanvasSize, Point, Rect, Rgba8, Rgba8Premul, Vec2};
pub use crate::foundation::error::{StudioError, StudioResult};
pub use crate::foundation::ids::{ElementId, ProjectId, SubscriptionId};

pub use crate::assets::cache::{ImageCache, ImageStatus};
pub use crate::assets::loader::{FsImageLoader, ImageLoader, MemoryImageLoader};
pub use crate::config::{SelectionStyle, StudioConfig};
pub use crate::export::pages::{
    Page, PageCache, PagedDocument, ProductType, RenderedPage, generate_pages,
};
pub use crate::export::pdf::{Orientation, PX_TO_MM, PageDescriptor, PdfAssembler};
pub use crate::export::raster::{ExportQuality, RasterExport};
pub use crate::filters::pipeline::{FilterOp, FilterPipeline, filter_string};
pub use crate::filters::presets::FilterPreset;
pub use crate::interaction::controller::{CursorHint, InteractionController, InteractionState};
pub use crate::model::document::{CanvasDocument, SerializedDocument};
pub use crate::model::element::{
    Element, ElementBody, ElementKind, FilterAdjustments, FontWeight, ImageBody, TextAlign,
    TextBody, is_valid_element,
};
pub use crate::model::patch::{ElementDraft, ElementPatch};
pub use crate::render::cpu::{CpuRenderer, RenderOptions, RenderOutcome};
pub use crate::render::surface::RasterSurface;
pub use crate::scene::events::SceneEvent;
pub use crate::scene::store::SceneStore;
pub use crate::scene::template::{TemplatePreset, parse_template};
pub use crate::session::collaborators::{
    ImageStorage, ProjectStore, TemplateCatalog, UploadedImage,
};
pub use crate::session::editor::{EditorSession, SaveOutcome, SaveTicket};
