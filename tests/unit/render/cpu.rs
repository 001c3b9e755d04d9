use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};

use super::*;
use crate::model::patch::ElementDraft;

fn solid_png_uri(rgba: [u8; 4]) -> String {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(buf)
    )
}

fn renderer() -> CpuRenderer {
    let config = StudioConfig {
        load_system_fonts: false,
        ..StudioConfig::default()
    };
    CpuRenderer::new(&config)
}

fn doc(width: u32, height: u32, bg: &str, drafts: Vec<ElementDraft>) -> CanvasDocument {
    let elements = drafts
        .into_iter()
        .enumerate()
        .map(|(i, d)| d.into_element(ElementId::from(format!("e{i}").as_str()), i as i64))
        .collect();
    CanvasDocument {
        width,
        height,
        background_color: bg.to_owned(),
        elements,
    }
}

#[test]
fn background_fills_surface() {
    let out = renderer()
        .render(
            &doc(10, 8, "#ff0000", vec![]),
            None,
            &mut ImageCache::new(),
            &RenderOptions::preview(),
        )
        .unwrap();
    assert_eq!((out.surface.width, out.surface.height), (10, 8));
    assert_eq!(out.surface.pixel(5, 5), Some([255, 0, 0, 255]));
    assert!(out.is_complete());
}

#[test]
fn higher_z_paints_on_top() {
    let red = solid_png_uri([255, 0, 0, 255]);
    let blue = solid_png_uri([0, 0, 255, 255]);
    let mut d = doc(
        40,
        40,
        "#ffffff",
        vec![
            ElementDraft::image(red.as_str()).at(0.0, 0.0).sized(30.0, 30.0),
            ElementDraft::image(blue.as_str()).at(10.0, 10.0).sized(30.0, 30.0),
        ],
    );
    let mut r = renderer();
    let mut images = ImageCache::new();

    let out = r.render(&d, None, &mut images, &RenderOptions::preview()).unwrap();
    assert_eq!(out.surface.pixel(20, 20), Some([0, 0, 255, 255]));
    assert_eq!(out.surface.pixel(5, 5), Some([255, 0, 0, 255]));

    d.elements[0].z_index = 5;
    let out = r.render(&d, None, &mut images, &RenderOptions::preview()).unwrap();
    assert_eq!(out.surface.pixel(20, 20), Some([255, 0, 0, 255]));
}

#[test]
fn pending_images_paint_placeholder_and_are_reported() {
    let d = doc(
        20,
        20,
        "#ffffff",
        vec![ElementDraft::image("photos/a.png").at(0.0, 0.0).sized(10.0, 10.0)],
    );
    let mut images = ImageCache::new();
    let out = renderer()
        .render(&d, None, &mut images, &RenderOptions::preview())
        .unwrap();
    assert_eq!(out.pending, vec!["photos/a.png".to_string()]);
    assert_eq!(out.surface.pixel(5, 5), Some([0xe5, 0xe7, 0xeb, 255]));
    assert_eq!(out.surface.pixel(15, 15), Some([255, 255, 255, 255]));
    assert!(images.has_pending());
}

#[test]
fn empty_src_paints_nothing() {
    let d = doc(
        10,
        10,
        "#ffffff",
        vec![ElementDraft::image("").at(0.0, 0.0).sized(10.0, 10.0)],
    );
    let out = renderer()
        .render(&d, None, &mut ImageCache::new(), &RenderOptions::preview())
        .unwrap();
    assert_eq!(out.surface.pixel(5, 5), Some([255, 255, 255, 255]));
    assert!(out.pending.is_empty());
}

#[test]
fn opacity_blends_with_background() {
    let black = solid_png_uri([0, 0, 0, 255]);
    let mut draft = ElementDraft::image(black.as_str()).at(0.0, 0.0).sized(10.0, 10.0);
    draft.opacity = 0.5;
    let out = renderer()
        .render(
            &doc(10, 10, "#ffffff", vec![draft]),
            None,
            &mut ImageCache::new(),
            &RenderOptions::preview(),
        )
        .unwrap();
    let [r, g, b, a] = out.surface.pixel(5, 5).unwrap();
    assert_eq!(a, 255);
    for c in [r, g, b] {
        assert!((i32::from(c) - 128).abs() <= 2, "channel {c}");
    }
}

#[test]
fn filters_change_image_pixels() {
    let red = solid_png_uri([200, 40, 40, 255]);
    let mut draft = ElementDraft::image(red.as_str()).at(0.0, 0.0).sized(10.0, 10.0);
    if let ElementBody::Image(img) = &mut draft.body {
        img.filters.grayscale = 100.0;
    }
    let out = renderer()
        .render(
            &doc(10, 10, "#ffffff", vec![draft]),
            None,
            &mut ImageCache::new(),
            &RenderOptions::preview(),
        )
        .unwrap();
    let [r, g, b, _] = out.surface.pixel(5, 5).unwrap();
    assert!((i32::from(r) - i32::from(g)).abs() <= 1);
    assert!((i32::from(g) - i32::from(b)).abs() <= 1);
}

#[test]
fn selection_overlay_only_in_preview() {
    let d = doc(
        40,
        40,
        "#ffffff",
        vec![ElementDraft::text("").at(10.0, 10.0).sized(20.0, 20.0)],
    );
    let id = d.elements[0].id.clone();
    let mut r = renderer();
    let mut images = ImageCache::new();

    let preview = r
        .render(&d, Some(&id), &mut images, &RenderOptions::preview())
        .unwrap();
    assert_eq!(preview.surface.pixel(10, 20), Some([0x25, 0x63, 0xeb, 255]));
    assert_eq!(preview.surface.pixel(9, 9), Some([0x25, 0x63, 0xeb, 255]));
    assert_eq!(preview.surface.pixel(20, 20), Some([255, 255, 255, 255]));

    let export = r
        .render(&d, Some(&id), &mut images, &RenderOptions::export(96.0))
        .unwrap();
    assert_eq!(export.surface.pixel(10, 20), Some([255, 255, 255, 255]));
}

#[test]
fn dpi_scales_surface_and_content() {
    let red = solid_png_uri([255, 0, 0, 255]);
    let d = doc(
        20,
        10,
        "#ffffff",
        vec![ElementDraft::image(red.as_str()).at(10.0, 0.0).sized(10.0, 10.0)],
    );
    let out = renderer()
        .render(&d, None, &mut ImageCache::new(), &RenderOptions::export(192.0))
        .unwrap();
    assert_eq!(out.scale, 2.0);
    assert_eq!((out.surface.width, out.surface.height), (40, 20));
    assert_eq!(out.surface.pixel(30, 10), Some([255, 0, 0, 255]));
    assert_eq!(out.surface.pixel(10, 10), Some([255, 255, 255, 255]));
}

#[test]
fn invalid_inputs_are_rejected() {
    let mut r = renderer();
    let d = doc(10, 10, "#ffffff", vec![]);
    assert!(matches!(
        r.render(&d, None, &mut ImageCache::new(), &RenderOptions::export(0.0)),
        Err(StudioError::Validation(_))
    ));
    let huge = doc(60_000, 10, "#ffffff", vec![]);
    assert!(matches!(
        r.render(&huge, None, &mut ImageCache::new(), &RenderOptions::export(300.0)),
        Err(StudioError::Render(_))
    ));
}

#[test]
fn text_without_fonts_is_skipped() {
    let d = doc(
        100,
        60,
        "#ffffff",
        vec![ElementDraft::text("Edit me").at(10.0, 10.0)],
    );
    let out = renderer()
        .render(&d, None, &mut ImageCache::new(), &RenderOptions::preview())
        .unwrap();
    assert!(out.surface.data.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
}

fn checker_png_uri() -> String {
    let img = image::RgbaImage::from_fn(16, 16, |x, y| {
        if (x / 2 + y / 2) % 2 == 0 {
            image::Rgba([250, 20, 20, 255])
        } else {
            image::Rgba([20, 20, 250, 255])
        }
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(buf)
    )
}

#[test]
fn blurred_paint_does_not_depend_on_earlier_sizes() {
    let src = checker_png_uri();
    let blurred = |size: f64| {
        let mut d = doc(
            200,
            200,
            "#ffffff",
            vec![ElementDraft::image(src.as_str()).at(0.0, 0.0).sized(size, size)],
        );
        if let ElementBody::Image(img) = &mut d.elements[0].body {
            img.filters.blur = 5.0;
        }
        d
    };
    let mut images = ImageCache::new();
    let opts = RenderOptions::export(96.0);

    let fresh = renderer()
        .render(&blurred(40.0), None, &mut images, &opts)
        .unwrap();

    let mut warm = renderer();
    warm.render(&blurred(180.0), None, &mut images, &opts)
        .unwrap();
    let reused = warm.render(&blurred(40.0), None, &mut images, &opts).unwrap();
    assert_eq!(reused.surface.data, fresh.surface.data);

    warm.clear_paint_cache();
    let cleared = warm.render(&blurred(40.0), None, &mut images, &opts).unwrap();
    assert_eq!(cleared.surface.data, fresh.surface.data);
}
