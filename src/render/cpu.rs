use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::cache::{ImageCache, ImageStatus};
use crate::assets::decode::ImageData;
use crate::assets::svg_raster::{rasterize_svg_to_premul_rgba8, svg_raster_size};
use crate::config::{SelectionStyle, StudioConfig};
use crate::filters::apply::apply_pipeline_rgba8_premul;
use crate::filters::pipeline::FilterPipeline;
use crate::foundation::color::parse_css_color;
use crate::foundation::core::{Affine, Rect, Rgba8};
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::ids::ElementId;
use crate::model::document::CanvasDocument;
use crate::model::element::{Element, ElementBody, ImageBody, TextBody};
use crate::render::paint::{ElementScope, PaintContext, affine_to_cpu};
use crate::render::surface::RasterSurface;
use crate::render::text::{FontBook, TextBrush, TextRequest};

/// How a paint is produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    /// Target resolution; the baseline DPI paints 1:1.
    pub dpi: f64,
    /// Draw the selection outline and handles.
    pub show_selection: bool,
}

impl RenderOptions {
    /// Interactive preview at baseline resolution.
    pub fn preview() -> Self {
        Self {
            dpi: 96.0,
            show_selection: true,
        }
    }

    /// Export at `dpi`, without editor chrome.
    pub fn export(dpi: f64) -> Self {
        Self {
            dpi,
            show_selection: false,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::preview()
    }
}

/// Result of one paint.
#[derive(Clone, Debug)]
pub struct RenderOutcome {
    /// Painted pixels.
    pub surface: RasterSurface,
    /// Surface pixels per canvas pixel.
    pub scale: f64,
    /// Image sources that painted a placeholder because they are still loading, sorted.
    pub pending: Vec<String>,
}

impl RenderOutcome {
    /// True when every image painted its real pixels (or failed for good).
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct PaintKey {
    src: String,
    filter: String,
    width: u32,
    height: u32,
    /// Bits of the blur pixel scale; 0 when the pipeline has no blur.
    blur_scale: u64,
}

/// Paints a [`CanvasDocument`] onto a premultiplied RGBA8 surface with `vello_cpu`.
///
/// Paint order is the document's stable z-order. Each element is painted inside an
/// [`ElementScope`] carrying its rotation and opacity; the selection overlay is drawn afterwards in
/// canvas coordinates.
#[derive(Debug)]
pub struct CpuRenderer {
    fonts: FontBook,
    image_paints: HashMap<PaintKey, vello_cpu::Image>,
    selection_style: SelectionStyle,
    placeholder: Rgba8,
    baseline_dpi: f64,
}

impl CpuRenderer {
    /// Renderer with fonts and styles from `config`.
    pub fn new(config: &StudioConfig) -> Self {
        Self::with_fonts(config, FontBook::new(config.load_system_fonts, &config.font_dirs))
    }

    /// Renderer using an already populated font book.
    pub fn with_fonts(config: &StudioConfig, fonts: FontBook) -> Self {
        Self {
            fonts,
            image_paints: HashMap::new(),
            selection_style: config.selection,
            placeholder: config.placeholder_color,
            baseline_dpi: config.baseline_dpi,
        }
    }

    /// Font book used for text elements.
    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Drop memoized image paints (decoded + filtered pixmaps).
    pub fn clear_paint_cache(&mut self) {
        self.image_paints.clear();
    }

    /// Paint `document`.
    ///
    /// Images that are not decoded yet are registered with `images`, painted as placeholders and
    /// listed in [`RenderOutcome::pending`].
    #[tracing::instrument(skip_all, fields(elements = document.elements.len(), dpi = opts.dpi))]
    pub fn render(
        &mut self,
        document: &CanvasDocument,
        selection: Option<&ElementId>,
        images: &mut ImageCache,
        opts: &RenderOptions,
    ) -> StudioResult<RenderOutcome> {
        if !opts.dpi.is_finite() || opts.dpi <= 0.0 {
            return Err(StudioError::validation("dpi must be finite and > 0"));
        }
        let scale = opts.dpi / self.baseline_dpi;
        let width = surface_dim(document.width, scale, "width")?;
        let height = surface_dim(document.height, scale, "height")?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        let root = PaintContext::root(scale);

        let background = parse_css_color(&document.background_color)?;
        ctx.set_transform(affine_to_cpu(root.transform));
        fill_canvas_rect(
            &mut ctx,
            Rect::new(0.0, 0.0, f64::from(document.width), f64::from(document.height)),
            background,
        );

        let mut pending = Vec::new();
        for element in document.paint_order() {
            if element.opacity <= 0.0 {
                continue;
            }
            let mut scope = ElementScope::enter(&mut ctx, root, element);
            match &element.body {
                ElementBody::Image(img) => {
                    if let Some(src) = self.paint_image(&mut scope, element, img, images)? {
                        pending.push(src);
                    }
                }
                ElementBody::Text(text) => self.paint_text(&mut scope, element, text)?,
            }
        }

        if opts.show_selection
            && let Some(selected) = selection.and_then(|id| document.element(id))
        {
            ctx.set_transform(affine_to_cpu(root.transform));
            paint_selection(&mut ctx, selected, &self.selection_style);
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        pending.sort();
        pending.dedup();
        if !pending.is_empty() {
            tracing::debug!(pending = pending.len(), "painted image placeholders");
        }

        Ok(RenderOutcome {
            surface: RasterSurface::from_premul(
                u32::from(width),
                u32::from(height),
                pixmap.data_as_u8_slice().to_vec(),
            )?,
            scale,
            pending,
        })
    }

    /// Returns the source when a placeholder was painted for a pending load.
    fn paint_image(
        &mut self,
        scope: &mut ElementScope<'_>,
        element: &Element,
        img: &ImageBody,
        images: &mut ImageCache,
    ) -> StudioResult<Option<String>> {
        if img.src.is_empty() {
            return Ok(None);
        }
        let data = match images.ensure_loaded(&img.src) {
            ImageStatus::Ready(data) => data,
            ImageStatus::Pending => {
                fill_canvas_rect(scope, element.bounds(), self.placeholder);
                return Ok(Some(img.src.clone()));
            }
            ImageStatus::Failed => {
                fill_canvas_rect(scope, element.bounds(), self.placeholder);
                return Ok(None);
            }
        };

        let pipeline = FilterPipeline::from_adjustments(&img.filters);
        let paint = self.image_paint_for(&img.src, &data, &pipeline, element, scope.paint().scale)?;
        let (iw, ih) = image_paint_size(&paint)?;

        let local = Affine::translate((element.x, element.y))
            * Affine::scale_non_uniform(element.width / iw, element.height / ih);
        scope.set_local_transform(local);
        scope.set_paint(paint);
        scope.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
        Ok(None)
    }

    fn image_paint_for(
        &mut self,
        src: &str,
        data: &Arc<ImageData>,
        pipeline: &FilterPipeline,
        element: &Element,
        scale: f64,
    ) -> StudioResult<vello_cpu::Image> {
        let (width, height) = match data.as_ref() {
            ImageData::Raster(img) => (img.width, img.height),
            ImageData::Svg(_) => svg_raster_size(element.width, element.height, scale)?,
        };
        let px_scale =
            (f64::from(width) / element.width + f64::from(height) / element.height) / 2.0;
        let key = PaintKey {
            src: src.to_owned(),
            filter: pipeline.to_string(),
            width,
            height,
            blur_scale: if pipeline.has_blur() {
                px_scale.to_bits()
            } else {
                0
            },
        };
        if let Some(paint) = self.image_paints.get(&key) {
            return Ok(paint.clone());
        }

        let base = match data.as_ref() {
            ImageData::Raster(img) => img.rgba8_premul.as_ref().clone(),
            ImageData::Svg(svg) => rasterize_svg_to_premul_rgba8(&svg.tree, width, height)?,
        };
        let pixels = if pipeline.is_identity() {
            base
        } else {
            apply_pipeline_rgba8_premul(&base, width, height, pipeline, px_scale)?
        };

        let pixmap = image_premul_bytes_to_pixmap(&pixels, width, height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_paints.insert(key, paint.clone());
        Ok(paint)
    }

    fn paint_text(
        &mut self,
        scope: &mut ElementScope<'_>,
        element: &Element,
        text: &TextBody,
    ) -> StudioResult<()> {
        let color = parse_css_color(&text.font_color)?;
        let req = TextRequest {
            text: &text.text,
            family: &text.font_family,
            weight: text.font_weight,
            size_px: text.font_size as f32,
            align: text.text_align,
            brush: TextBrush {
                r: color.r,
                g: color.g,
                b: color.b,
                a: color.a,
            },
            x: element.x,
            baseline_y: element.y + f64::from(text.font_size),
        };
        let Some(placed) = self.fonts.layout(&req)? else {
            return Ok(());
        };

        scope.set_local_transform(Affine::IDENTITY);
        for run in &placed.runs {
            let brush = run.brush;
            scope.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.glyphs.iter().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            scope
                .glyph_run(&placed.font)
                .font_size(run.font_size)
                .fill_glyphs(glyphs);
        }
        Ok(())
    }
}

fn surface_dim(canvas_px: u32, scale: f64, what: &str) -> StudioResult<u16> {
    let px = (f64::from(canvas_px) * scale).round();
    if !(1.0..=f64::from(u16::MAX)).contains(&px) {
        return Err(StudioError::render(format!(
            "surface {what} {px} is outside 1..={}",
            u16::MAX
        )));
    }
    Ok(px as u16)
}

fn fill_canvas_rect(ctx: &mut vello_cpu::RenderContext, r: Rect, color: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1));
}

/// Outline straddling the element edge plus square handles centered on the corners.
fn paint_selection(ctx: &mut vello_cpu::RenderContext, el: &Element, style: &SelectionStyle) {
    let b = el.bounds();
    let half = style.outline_px / 2.0;
    let outer = b.inflate(half, half);
    let inner = b.inflate(-half, -half);

    let edges = [
        Rect::new(outer.x0, outer.y0, outer.x1, inner.y0),
        Rect::new(outer.x0, inner.y1, outer.x1, outer.y1),
        Rect::new(outer.x0, inner.y0, inner.x0, inner.y1),
        Rect::new(inner.x1, inner.y0, outer.x1, inner.y1),
    ];
    for edge in edges {
        fill_canvas_rect(ctx, edge, style.color);
    }

    let h = style.handle_px / 2.0;
    for (cx, cy) in [(b.x0, b.y0), (b.x1, b.y0), (b.x0, b.y1), (b.x1, b.y1)] {
        fill_canvas_rect(ctx, Rect::new(cx - h, cy - h, cx + h, cy + h), style.color);
    }
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StudioResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StudioError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StudioError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StudioError::render("decoded image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels: Vec<_> = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn image_paint_size(image: &vello_cpu::Image) -> StudioResult<(f64, f64)> {
    match &image.image {
        vello_cpu::ImageSource::Pixmap(p) => Ok((f64::from(p.width()), f64::from(p.height()))),
        vello_cpu::ImageSource::OpaqueId(_) => Err(StudioError::render(
            "cpu renderer does not support opaque image ids",
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
