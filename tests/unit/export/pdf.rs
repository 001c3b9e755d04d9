use super::*;
use crate::assets::loader::MemoryImageLoader;
use crate::config::StudioConfig;
use crate::export::pages::{ProductType, generate_pages};
use crate::foundation::ids::{ElementId, ProjectId};
use crate::model::patch::ElementDraft;

#[test]
fn orientation_is_landscape_only_when_wider() {
    assert_eq!(Orientation::for_size(2.0, 1.0), Orientation::Landscape);
    assert_eq!(Orientation::for_size(1.0, 1.0), Orientation::Portrait);
    assert_eq!(Orientation::for_size(1.0, 2.0), Orientation::Portrait);
}

#[test]
fn descriptor_uses_logical_size() {
    let d = PageDescriptor::from_raster(1, Arc::new(Vec::new()), 2500, 1875, 300.0 / 96.0);
    assert!((d.width_mm - 800.0 * PX_TO_MM).abs() < 1e-6);
    assert!((d.height_mm - 600.0 * PX_TO_MM).abs() < 1e-6);
    assert_eq!(d.orientation, Orientation::Landscape);

    let json = serde_json::to_value(&d).unwrap();
    assert_eq!(json["orientation"], "landscape");
    assert!(json.get("png").is_none());
}

#[test]
fn export_pages_renders_every_page_and_stores_content() {
    let elements: Vec<_> = (0..5)
        .map(|i| {
            ElementDraft::text("")
                .at(0.0, 0.0)
                .sized(10.0, 10.0)
                .into_element(ElementId::from(format!("t{i}").as_str()), i)
        })
        .collect();
    let doc = CanvasDocument {
        width: 40,
        height: 60,
        background_color: "#ffffff".into(),
        elements: elements.clone(),
    };
    let mut paged = generate_pages(ProjectId(2), ProductType::Book, &elements);
    let mut renderer = CpuRenderer::new(&StudioConfig {
        load_system_fonts: false,
        ..StudioConfig::default()
    });

    let descriptors = pollster::block_on(export_pages(
        &mut renderer,
        &doc,
        &mut paged,
        &mut ImageCache::new(),
        &MemoryImageLoader::new(),
        192.0,
    ))
    .unwrap();

    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[1].page_number, 2);
    assert_eq!(descriptors[0].orientation, Orientation::Portrait);
    assert!((descriptors[0].width_mm - 40.0 * PX_TO_MM).abs() < 1e-9);
    for page in &paged.pages {
        let content = page.content.as_ref().unwrap();
        assert_eq!((content.width_px, content.height_px), (80, 120));
        assert!(!content.png.is_empty());
    }
}

fn solid_png(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut buf),
            image::ImageFormat::Png,
        )
        .unwrap();
    buf
}

#[test]
fn export_waits_for_sources_only_pages_still_reference() {
    let stale = ElementDraft::image("old.png")
        .at(0.0, 0.0)
        .sized(20.0, 20.0)
        .into_element(ElementId::from("photo"), 0);
    let mut paged = generate_pages(ProjectId(1), ProductType::Poster, &[stale.clone()]);

    let mut current = stale;
    if let crate::model::element::ElementBody::Image(img) = &mut current.body {
        img.src = "new.png".into();
    }
    let doc = CanvasDocument {
        width: 20,
        height: 20,
        background_color: "#ffffff".into(),
        elements: vec![current],
    };

    let mut loader = MemoryImageLoader::new();
    loader.insert("old.png", solid_png([0, 0, 255, 255]));
    loader.insert("new.png", solid_png([255, 0, 0, 255]));
    let mut images = ImageCache::new();
    let mut renderer = CpuRenderer::new(&StudioConfig {
        load_system_fonts: false,
        ..StudioConfig::default()
    });

    let descriptors = pollster::block_on(export_pages(
        &mut renderer,
        &doc,
        &mut paged,
        &mut images,
        &loader,
        96.0,
    ))
    .unwrap();

    assert!(!images.has_pending());
    let page = image::load_from_memory(&descriptors[0].png)
        .unwrap()
        .to_rgba8();
    assert_eq!(page.get_pixel(10, 10).0, [0, 0, 255, 255]);
}
