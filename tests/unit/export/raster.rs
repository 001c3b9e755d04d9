use std::io::Cursor;

use super::*;
use crate::assets::loader::MemoryImageLoader;
use crate::config::StudioConfig;
use crate::foundation::ids::ElementId;
use crate::model::patch::ElementDraft;

fn png(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn renderer() -> CpuRenderer {
    CpuRenderer::new(&StudioConfig {
        load_system_fonts: false,
        ..StudioConfig::default()
    })
}

#[test]
fn quality_presets_map_to_dpi() {
    assert_eq!(ExportQuality::Standard.dpi(), 96.0);
    assert_eq!(ExportQuality::High.dpi(), 150.0);
    assert_eq!(ExportQuality::Professional.dpi(), 300.0);
    assert_eq!(
        "Professional".parse::<ExportQuality>().unwrap(),
        ExportQuality::Professional
    );
    assert_eq!(ExportQuality::High.to_string(), "high");
    assert!("ultra".parse::<ExportQuality>().is_err());
}

#[test]
fn require_painted_reports_surface_unavailable() {
    assert!(matches!(
        require_painted(None),
        Err(StudioError::SurfaceUnavailable(_))
    ));
    let s = RasterSurface::from_premul(1, 1, vec![0; 4]).unwrap();
    assert!(require_painted(Some(&s)).is_ok());
}

#[test]
fn export_waits_for_images_before_painting() {
    let mut loader = MemoryImageLoader::new();
    loader.insert("red.png", png([255, 0, 0, 255]));

    let doc = CanvasDocument {
        width: 20,
        height: 10,
        background_color: "#ffffff".into(),
        elements: vec![
            ElementDraft::image("red.png")
                .at(0.0, 0.0)
                .sized(10.0, 10.0)
                .into_element(ElementId::from("a"), 0),
        ],
    };
    let mut images = ImageCache::new();
    let out = pollster::block_on(export_raster(
        &mut renderer(),
        &doc,
        &mut images,
        &loader,
        ExportQuality::High.dpi(),
    ))
    .unwrap();

    assert_eq!((out.width, out.height), (31, 16));
    let decoded = image::load_from_memory(&out.png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (31, 16));
    assert_eq!(decoded.get_pixel(5, 5).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(28, 5).0, [255, 255, 255, 255]);
    assert!(!images.has_pending());
}

#[test]
fn failed_images_still_export_with_placeholder() {
    let loader = MemoryImageLoader::new();
    let doc = CanvasDocument {
        width: 10,
        height: 10,
        background_color: "#ffffff".into(),
        elements: vec![
            ElementDraft::image("gone.png")
                .at(0.0, 0.0)
                .sized(10.0, 10.0)
                .into_element(ElementId::from("a"), 0),
        ],
    };
    let mut images = ImageCache::new();
    let surface = pollster::block_on(render_for_export(
        &mut renderer(),
        &doc,
        &mut images,
        &loader,
        96.0,
    ))
    .unwrap();
    assert_eq!(surface.pixel(5, 5), Some([0xe5, 0xe7, 0xeb, 255]));
    assert!(images.failure("gone.png").is_some());
}
