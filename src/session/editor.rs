use std::cell::Cell;
use std::rc::Rc;

use crate::assets::cache::ImageCache;
use crate::assets::loader::ImageLoader;
use crate::config::StudioConfig;
use crate::export::pages::{PageCache, PagedDocument, ProductType};
use crate::export::pdf::{PageDescriptor, PdfAssembler, export_pages};
use crate::export::raster::{RasterExport, export_raster, require_painted};
use crate::filters::presets::FilterPreset;
use crate::foundation::core::Point;
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::ids::{ElementId, ProjectId};
use crate::interaction::controller::{CursorHint, InteractionController, InteractionState};
use crate::model::document::{CanvasDocument, SerializedDocument};
use crate::model::element::Element;
use crate::model::patch::{ElementDraft, ElementPatch};
use crate::render::cpu::{CpuRenderer, RenderOptions, RenderOutcome};
use crate::render::surface::RasterSurface;
use crate::scene::store::SceneStore;
use crate::scene::template::TemplatePreset;
use crate::session::collaborators::{ImageStorage, ProjectStore, TemplateCatalog, UploadedImage};

/// Upload context tag sent to image storage.
const UPLOAD_CONTEXT: &str = "studio";

/// Snapshot taken when a save starts.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveTicket {
    /// Project being saved.
    pub project_id: ProjectId,
    /// Serialized state at the time of the call.
    pub document: SerializedDocument,
    revision: u64,
    epoch: u64,
}

impl SaveTicket {
    /// Store revision the snapshot was taken at.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// What happened to a finished save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The snapshot is now the persisted state.
    Saved {
        /// Revision that was persisted.
        revision: u64,
    },
    /// The session was closed before the save returned; the result was ignored.
    Stale,
}

/// One open project in the studio editor.
///
/// Binds the scene store, pointer controller, image cache, renderer and page cache, and tracks
/// what has been painted and saved. Local edits never wait on persistence: a save works from a
/// [`SaveTicket`] snapshot and its result is applied with [`EditorSession::finish_save`].
pub struct EditorSession {
    project_id: ProjectId,
    store: SceneStore,
    controller: InteractionController,
    images: ImageCache,
    renderer: CpuRenderer,
    pages: PageCache,
    last_paint: Option<RenderOutcome>,
    needs_repaint: Rc<Cell<bool>>,
    saved_revision: u64,
    epoch: u64,
    closed: bool,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("project_id", &self.project_id)
            .field("store", &self.store)
            .field("controller", &self.controller)
            .field("painted", &self.last_paint.is_some())
            .field("saved_revision", &self.saved_revision)
            .field("epoch", &self.epoch)
            .field("closed", &self.closed)
            .finish()
    }
}

impl EditorSession {
    /// Session over `document`, considered saved as-is.
    pub fn new(
        project_id: ProjectId,
        document: CanvasDocument,
        config: &StudioConfig,
    ) -> StudioResult<Self> {
        let mut store = SceneStore::new(document)?;
        let needs_repaint = Rc::new(Cell::new(true));
        let flag = Rc::clone(&needs_repaint);
        store.subscribe(move |_| flag.set(true));

        Ok(Self {
            project_id,
            saved_revision: store.revision(),
            store,
            controller: InteractionController::new(config),
            images: ImageCache::new(),
            renderer: CpuRenderer::new(config),
            pages: PageCache::new(),
            last_paint: None,
            needs_repaint,
            epoch: 0,
            closed: false,
        })
    }

    /// Load `project_id` from persistence and open it.
    #[tracing::instrument(skip(projects, config))]
    pub async fn open<P: ProjectStore>(
        project_id: ProjectId,
        projects: &P,
        config: &StudioConfig,
    ) -> StudioResult<Self> {
        let serialized = projects.load_project(project_id).await?;
        let document = serialized.to_document()?;
        Self::new(project_id, document, config)
    }

    /// Open project.
    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Scene state.
    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    /// Scene state, for hosts that drive the store directly.
    pub fn store_mut(&mut self) -> &mut SceneStore {
        &mut self.store
    }

    /// Decoded image memo.
    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    /// Renderer, for font registration.
    pub fn renderer_mut(&mut self) -> &mut CpuRenderer {
        &mut self.renderer
    }

    /// Pointer state.
    pub fn interaction_state(&self) -> &InteractionState {
        self.controller.state()
    }

    /// Client position of the canvas surface.
    pub fn set_surface_origin(&mut self, origin: Point) {
        self.controller.set_surface_origin(origin);
    }

    // Host operation surface.

    /// See [`SceneStore::add_element`].
    pub fn add_element(&mut self, draft: ElementDraft) -> StudioResult<ElementId> {
        self.store.add_element(draft)
    }

    /// See [`SceneStore::update_element`].
    pub fn update_element(&mut self, id: &ElementId, patch: &ElementPatch) -> StudioResult<()> {
        self.store.update_element(id, patch)
    }

    /// See [`SceneStore::delete_element`].
    pub fn delete_element(&mut self, id: &ElementId) {
        self.store.delete_element(id);
    }

    /// See [`SceneStore::bring_to_front`].
    pub fn bring_to_front(&mut self, id: &ElementId) -> StudioResult<()> {
        self.store.bring_to_front(id)
    }

    /// See [`SceneStore::send_to_back`].
    pub fn send_to_back(&mut self, id: &ElementId) -> StudioResult<()> {
        self.store.send_to_back(id)
    }

    /// Duplicate the selected element. Returns the copy's id.
    pub fn duplicate_selected(&mut self) -> StudioResult<Option<ElementId>> {
        let Some(id) = self.store.selection().cloned() else {
            return Ok(None);
        };
        let copy = self.store.duplicate_element(&id)?;
        if let Some(copy) = &copy {
            self.store.select(Some(copy));
        }
        Ok(copy)
    }

    /// See [`SceneStore::apply_preset`].
    pub fn apply_preset(&mut self, id: &ElementId, preset: FilterPreset) -> StudioResult<()> {
        self.store.apply_preset(id, preset)
    }

    /// See [`SceneStore::reset_filters`].
    pub fn reset_filters(&mut self, id: &ElementId) -> StudioResult<()> {
        self.store.reset_filters(id)
    }

    /// See [`SceneStore::get_element_at_point`].
    pub fn get_element_at_point(&self, p: Point) -> Option<&Element> {
        self.store.get_element_at_point(p)
    }

    /// See [`SceneStore::get_selected_element`].
    pub fn get_selected_element(&self) -> Option<&Element> {
        self.store.get_selected_element()
    }

    /// Selection hook.
    pub fn on_select(&mut self, id: Option<&ElementId>) {
        self.controller.on_select(&mut self.store, id);
    }

    /// Drag-start hook, `p` in canvas coordinates.
    pub fn on_drag_start(&mut self, id: &ElementId, p: Point) {
        self.controller.on_drag_start(&self.store, id, p);
    }

    /// Drag-move hook, `p` in canvas coordinates.
    pub fn on_drag_move(&mut self, p: Point) -> StudioResult<()> {
        self.controller.on_drag_move(&mut self.store, p)
    }

    /// Drag-end hook.
    pub fn on_drag_end(&mut self) {
        self.controller.on_drag_end();
    }

    /// Raw pointer press in client coordinates.
    pub fn pointer_down(&mut self, client: Point) -> Option<ElementId> {
        self.controller.pointer_down(&mut self.store, client)
    }

    /// Raw pointer move in client coordinates.
    pub fn pointer_move(&mut self, client: Point) -> StudioResult<CursorHint> {
        self.controller.pointer_move(&mut self.store, client)
    }

    /// Raw pointer release.
    pub fn pointer_up(&mut self) {
        self.controller.pointer_up();
    }

    /// Pointer left the surface.
    pub fn pointer_leave(&mut self) {
        self.controller.pointer_leave();
    }

    /// Insert every element of a template preset, atomically.
    pub fn apply_template(&mut self, preset: &TemplatePreset) -> StudioResult<Vec<ElementId>> {
        let drafts = preset.drafts()?;
        self.store.add_elements(drafts)
    }

    /// Look up a preset by name in `catalog` and apply it.
    pub async fn apply_catalog_template<C: TemplateCatalog>(
        &mut self,
        catalog: &C,
        name: &str,
    ) -> StudioResult<Vec<ElementId>> {
        let presets = catalog.templates().await?;
        let preset = presets
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| StudioError::validation(format!("unknown template '{name}'")))?;
        self.apply_template(preset)
    }

    /// Add an image element for an already uploaded image, with the default placement.
    pub fn add_uploaded_image(&mut self, uploaded: UploadedImage) -> StudioResult<ElementId> {
        self.store.add_element(ElementDraft::image(uploaded.url))
    }

    /// Decode, upload and place an image. The decoded pixels seed the image cache.
    ///
    /// Bytes that do not decode are rejected before anything is uploaded.
    #[tracing::instrument(skip(self, storage, bytes), fields(len = bytes.len()))]
    pub async fn upload_image<S: ImageStorage>(
        &mut self,
        storage: &S,
        bytes: Vec<u8>,
        file_name: &str,
    ) -> StudioResult<ElementId> {
        let mut probe = ImageCache::new();
        probe
            .insert_bytes(file_name, &bytes)
            .map_err(|e| {
                StudioError::asset_load(format!("upload '{file_name}' is not an image: {e}"))
            })?;

        let uploaded = storage
            .upload_image(bytes.clone(), file_name, UPLOAD_CONTEXT)
            .await?;
        self.images.insert_bytes(&uploaded.url, &bytes)?;
        self.add_uploaded_image(uploaded)
    }

    /// Add the default text block ("Edit me", 24px Arial, 200x50 at (50, 50)).
    pub fn add_default_text(&mut self) -> StudioResult<ElementId> {
        self.store.add_element(ElementDraft::text("Edit me"))
    }

    // Painting.

    /// Whether a store change happened since the last paint.
    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint.get()
    }

    /// Paint the preview, selection overlay included, and remember it.
    ///
    /// Pending image sources are listed in the outcome; resolve them with
    /// [`EditorSession::resolve_images`] and paint again.
    pub fn paint(&mut self) -> StudioResult<&RenderOutcome> {
        let outcome = self.renderer.render(
            self.store.document(),
            self.store.selection(),
            &mut self.images,
            &RenderOptions::preview(),
        )?;
        self.needs_repaint.set(false);
        Ok(self.last_paint.insert(outcome))
    }

    /// Surface of the last successful paint.
    pub fn last_surface(&self) -> Option<&RasterSurface> {
        self.last_paint.as_ref().map(|o| &o.surface)
    }

    /// Fetch every pending image source. Marks the canvas for repaint when something arrived.
    pub async fn resolve_images<L: ImageLoader>(&mut self, loader: &L) -> usize {
        let ready = self.images.resolve_pending(loader).await;
        if ready > 0 {
            self.needs_repaint.set(true);
        }
        ready
    }

    // Export.

    /// PNG of the whole canvas at `dpi`, without the selection overlay.
    ///
    /// Fails with `SurfaceUnavailable` before the first paint.
    pub async fn export_raster<L: ImageLoader>(
        &mut self,
        loader: &L,
        dpi: f64,
    ) -> StudioResult<RasterExport> {
        require_painted(self.last_surface())?;
        export_raster(
            &mut self.renderer,
            self.store.document(),
            &mut self.images,
            loader,
            dpi,
        )
        .await
    }

    /// Paginate the current elements for `product`, replacing cached pages.
    pub fn generate_pages(&mut self, product: ProductType) -> &PagedDocument {
        self.pages
            .regenerate(self.project_id, product, &self.store.document().elements)
    }

    /// Cached pages.
    pub fn pages(&self) -> &PageCache {
        &self.pages
    }

    /// Render every cached page at `dpi` and describe it for PDF assembly.
    ///
    /// Fails with `SurfaceUnavailable` before the first paint and with a validation error when
    /// no pages were generated.
    pub async fn export_pages<L: ImageLoader>(
        &mut self,
        loader: &L,
        dpi: f64,
    ) -> StudioResult<Vec<PageDescriptor>> {
        require_painted(self.last_surface())?;
        let paged = self.pages.get_mut(self.project_id).ok_or_else(|| {
            StudioError::validation("generate pages before exporting them")
        })?;
        export_pages(
            &mut self.renderer,
            self.store.document(),
            paged,
            &mut self.images,
            loader,
            dpi,
        )
        .await
    }

    /// Export pages and hand them to `assembler`.
    pub async fn export_pdf<L: ImageLoader, A: PdfAssembler>(
        &mut self,
        loader: &L,
        assembler: &A,
        dpi: f64,
    ) -> StudioResult<Vec<u8>> {
        let descriptors = self.export_pages(loader, dpi).await?;
        assembler.assemble(&descriptors).await
    }

    // Persistence.

    /// Whether the store changed since the last recorded save.
    pub fn is_dirty(&self) -> bool {
        self.store.revision() != self.saved_revision
    }

    /// Snapshot the current state for a save.
    pub fn begin_save(&self) -> StudioResult<SaveTicket> {
        Ok(SaveTicket {
            project_id: self.project_id,
            document: self.store.snapshot()?,
            revision: self.store.revision(),
            epoch: self.epoch,
        })
    }

    /// Apply the result of a save started with [`EditorSession::begin_save`].
    ///
    /// Results for a closed session are ignored. Failures are returned unchanged and leave the
    /// session dirty. The saved revision never moves backwards, so a slow older save cannot
    /// mark newer edits as saved.
    pub fn finish_save(
        &mut self,
        ticket: &SaveTicket,
        result: StudioResult<()>,
    ) -> StudioResult<SaveOutcome> {
        if self.closed || ticket.epoch != self.epoch || ticket.project_id != self.project_id {
            tracing::debug!(revision = ticket.revision, "stale save result ignored");
            return Ok(SaveOutcome::Stale);
        }
        result?;
        self.saved_revision = self.saved_revision.max(ticket.revision);
        Ok(SaveOutcome::Saved {
            revision: ticket.revision,
        })
    }

    /// Snapshot, persist and record in one call.
    pub async fn save<P: ProjectStore>(&mut self, projects: &P) -> StudioResult<SaveOutcome> {
        let ticket = self.begin_save()?;
        let result = projects
            .save_project(ticket.project_id, ticket.document.clone())
            .await;
        self.finish_save(&ticket, result)
    }

    /// Close the session; results of work started before this are ignored.
    ///
    /// Memoized image paints are released.
    pub fn close(&mut self) {
        self.closed = true;
        self.epoch += 1;
        self.renderer.clear_paint_cache();
    }

    /// Whether [`EditorSession::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
