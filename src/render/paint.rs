use std::ops::{Deref, DerefMut};

use crate::foundation::core::Affine;
use crate::model::element::Element;

/// Transform and alpha in effect while painting one level of the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintContext {
    /// Canvas-to-surface transform, including the DPI scale.
    pub transform: Affine,
    /// Accumulated opacity.
    pub alpha: f32,
    /// Surface pixels per canvas pixel.
    pub scale: f64,
}

impl PaintContext {
    /// Root context for a surface painted at `scale`.
    pub fn root(scale: f64) -> Self {
        Self {
            transform: Affine::scale(scale),
            alpha: 1.0,
            scale,
        }
    }

    /// Context for painting `element`'s body: rotation about its center, alpha times opacity.
    pub fn for_element(&self, element: &Element) -> Self {
        Self {
            transform: self.transform * element.rotation_transform(),
            alpha: self.alpha * element.opacity as f32,
            scale: self.scale,
        }
    }
}

/// Scoped element paint state on a `vello_cpu` context.
///
/// Entering sets the element transform and pushes an opacity layer when needed. Dropping the
/// scope pops the layer and restores the parent transform, so every exit path leaves the
/// context as it was found.
pub(crate) struct ElementScope<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
    parent: PaintContext,
    paint: PaintContext,
    layered: bool,
}

impl<'a> ElementScope<'a> {
    pub(crate) fn enter(
        ctx: &'a mut vello_cpu::RenderContext,
        parent: PaintContext,
        element: &Element,
    ) -> Self {
        let paint = parent.for_element(element);
        ctx.set_transform(affine_to_cpu(paint.transform));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let layered = element.opacity < 1.0;
        if layered {
            ctx.push_opacity_layer(element.opacity as f32);
        }
        Self {
            ctx,
            parent,
            paint,
            layered,
        }
    }

    /// Paint state inside the scope.
    pub(crate) fn paint(&self) -> PaintContext {
        self.paint
    }

    /// Set a transform relative to the element scope.
    pub(crate) fn set_local_transform(&mut self, local: Affine) {
        let t = self.paint.transform * local;
        self.ctx.set_transform(affine_to_cpu(t));
    }
}

impl Deref for ElementScope<'_> {
    type Target = vello_cpu::RenderContext;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for ElementScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for ElementScope<'_> {
    fn drop(&mut self) {
        if self.layered {
            self.ctx.pop_layer();
        }
        self.ctx.set_transform(affine_to_cpu(self.parent.transform));
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/paint.rs"]
mod tests;
