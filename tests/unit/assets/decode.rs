use std::io::Cursor;

use super::*;

fn png_1x1(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_1x1([100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_svg_parse_ok_and_err() {
    let ok = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"></svg>"#;
    parse_svg(ok).unwrap();

    let bad = br#"<svg"#;
    assert!(parse_svg(bad).is_err());
}

#[test]
fn source_bytes_sniff_svg_and_raster() {
    let svg = br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="4" height="2"></svg>"#;
    assert!(matches!(
        decode_source_bytes(svg, None).unwrap(),
        ImageData::Svg(_)
    ));
    assert!(matches!(
        decode_source_bytes(&png_1x1([1, 2, 3, 255]), None).unwrap(),
        ImageData::Raster(_)
    ));
    assert!(decode_source_bytes(b"not an image", None).is_err());
}

#[test]
fn data_uris_decode_base64_and_percent_forms() {
    let png = png_1x1([9, 9, 9, 255]);
    let uri = format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(&png)
    );
    let (mime, bytes) = parse_data_uri(&uri).unwrap().unwrap();
    assert_eq!(mime.as_deref(), Some("image/png"));
    assert_eq!(bytes, png);

    let (mime, bytes) = parse_data_uri("data:image/svg+xml,%3Csvg%3E").unwrap().unwrap();
    assert_eq!(mime.as_deref(), Some("image/svg+xml"));
    assert_eq!(bytes, b"<svg>");

    assert!(parse_data_uri("photo.png").unwrap().is_none());
    assert!(parse_data_uri("data:image/png;base64").is_err());
    assert!(parse_data_uri("data:image/png;base64,@@@").is_err());
}
