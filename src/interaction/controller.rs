use crate::config::StudioConfig;
use crate::foundation::core::{CanvasSize, Point, Vec2};
use crate::foundation::error::StudioResult;
use crate::foundation::ids::ElementId;
use crate::model::patch::ElementPatch;
use crate::scene::store::SceneStore;

/// Pointer interaction state.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
    /// No button held.
    #[default]
    Idle,
    /// An element was just selected; the drag offset is not captured yet.
    Selecting {
        /// Selected element.
        element: ElementId,
    },
    /// The selected element follows the pointer.
    Dragging {
        /// Dragged element.
        element: ElementId,
        /// Pointer position minus element top-left, captured at drag start.
        offset: Vec2,
    },
}

/// Cursor affordance for the host surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorHint {
    /// Nothing under the pointer.
    #[default]
    Default,
    /// An element is under the pointer or being dragged.
    Move,
}

/// Translates pointer events into selection and drag mutations on a [`SceneStore`].
///
/// Pointer positions arrive in client coordinates; the controller subtracts the surface origin
/// set by the host before hit-testing.
#[derive(Clone, Debug)]
pub struct InteractionController {
    state: InteractionState,
    surface_origin: Point,
    drag_margin_px: f64,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(&StudioConfig::default())
    }
}

impl InteractionController {
    /// Controller using the configured drag margin.
    pub fn new(config: &StudioConfig) -> Self {
        Self {
            state: InteractionState::Idle,
            surface_origin: Point::ZERO,
            drag_margin_px: config.drag_margin_px,
        }
    }

    /// Current state.
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Where the canvas surface starts in client coordinates.
    pub fn set_surface_origin(&mut self, origin: Point) {
        self.surface_origin = origin;
    }

    /// Client point to canvas-local point.
    pub fn to_canvas(&self, client: Point) -> Point {
        client - self.surface_origin.to_vec2()
    }

    /// Pointer pressed. Selects and starts dragging the topmost hit element, or clears the
    /// selection on empty space. Returns the hit element.
    #[tracing::instrument(skip(self, store))]
    pub fn pointer_down(&mut self, store: &mut SceneStore, client: Point) -> Option<ElementId> {
        let p = self.to_canvas(client);
        let hit = store.get_element_at_point(p).map(|el| el.id.clone());
        match &hit {
            Some(id) => {
                self.on_select(store, Some(id));
                self.on_drag_start(store, id, p);
            }
            None => self.on_select(store, None),
        }
        hit
    }

    /// Pointer moved. Drags when a drag is active, otherwise hover-tests without mutating.
    pub fn pointer_move(
        &mut self,
        store: &mut SceneStore,
        client: Point,
    ) -> StudioResult<CursorHint> {
        let p = self.to_canvas(client);
        if matches!(self.state, InteractionState::Dragging { .. }) {
            self.on_drag_move(store, p)?;
            return Ok(CursorHint::Move);
        }
        Ok(match store.get_element_at_point(p) {
            Some(_) => CursorHint::Move,
            None => CursorHint::Default,
        })
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) {
        self.on_drag_end();
    }

    /// Pointer left the surface; treated exactly like a release.
    pub fn pointer_leave(&mut self) {
        self.on_drag_end();
    }

    /// Selection hook: select `id` (or clear) and enter `Selecting`/`Idle`.
    pub fn on_select(&mut self, store: &mut SceneStore, id: Option<&ElementId>) {
        store.select(id);
        self.state = match store.selection() {
            Some(id) => InteractionState::Selecting {
                element: id.clone(),
            },
            None => InteractionState::Idle,
        };
    }

    /// Drag-start hook: capture the pointer offset from the element's top-left.
    ///
    /// Ignored when the element does not exist.
    pub fn on_drag_start(&mut self, store: &SceneStore, id: &ElementId, canvas_point: Point) {
        let Some(el) = store.element(id) else {
            return;
        };
        self.state = InteractionState::Dragging {
            element: id.clone(),
            offset: canvas_point - Point::new(el.x, el.y),
        };
    }

    /// Drag-move hook: move the dragged element so the captured offset is preserved, clamped
    /// to the canvas minus the drag margin. No-op unless dragging.
    pub fn on_drag_move(
        &mut self,
        store: &mut SceneStore,
        canvas_point: Point,
    ) -> StudioResult<()> {
        let InteractionState::Dragging { element, offset } = &self.state else {
            return Ok(());
        };
        let target = self.clamp_position(store.document().size(), canvas_point - *offset);
        store.update_element(element, &ElementPatch::position(target.x, target.y))
    }

    /// Drag-end hook: back to `Idle`, unconditionally.
    pub fn on_drag_end(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Clamp a top-left position to `[0, W - margin] x [0, H - margin]`.
    ///
    /// When the canvas is narrower than the margin the position pins to 0.
    pub fn clamp_position(&self, canvas: CanvasSize, p: Point) -> Point {
        let max_x = (f64::from(canvas.width) - self.drag_margin_px).max(0.0);
        let max_y = (f64::from(canvas.height) - self.drag_margin_px).max(0.0);
        Point::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/controller.rs"]
mod tests;
