use std::sync::Arc;

use anyhow::Context;
use base64::{Engine as _, engine::general_purpose};

use crate::foundation::core::premultiply_rgba8_in_place;
use crate::foundation::error::{StudioError, StudioResult};

#[derive(Clone, Debug)]
/// Decoded raster image.
pub struct PreparedImage {
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone)]
/// Parsed SVG document, rasterized on demand at the drawn size.
pub struct PreparedSvg {
    /// Parsed tree.
    pub tree: Arc<usvg::Tree>,
}

impl std::fmt::Debug for PreparedSvg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size = self.tree.size();
        f.debug_struct("PreparedSvg")
            .field("width", &size.width())
            .field("height", &size.height())
            .finish()
    }
}

#[derive(Clone, Debug)]
/// A decoded image source.
pub enum ImageData {
    /// PNG, JPEG, WebP, GIF, ...
    Raster(PreparedImage),
    /// Vector source.
    Svg(PreparedSvg),
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> StudioResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a prepared `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> StudioResult<PreparedSvg> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

/// Decode a source's bytes, choosing SVG when the mime type or the content says so.
pub fn decode_source_bytes(bytes: &[u8], mime: Option<&str>) -> StudioResult<ImageData> {
    let is_svg =
        mime.is_some_and(|m| m.eq_ignore_ascii_case("image/svg+xml")) || looks_like_svg(bytes);
    if is_svg {
        Ok(ImageData::Svg(parse_svg(bytes)?))
    } else {
        Ok(ImageData::Raster(decode_image(bytes)?))
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

/// Split a `data:` URI into its mime type and payload bytes.
///
/// Returns `Ok(None)` when `src` is not a data URI.
pub fn parse_data_uri(src: &str) -> StudioResult<Option<(Option<String>, Vec<u8>)>> {
    let Some(rest) = src.strip_prefix("data:") else {
        return Ok(None);
    };
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| StudioError::asset_load("data uri is missing ','"))?;

    let mut parts = meta.split(';');
    let mime = parts
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_owned);
    let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| StudioError::asset_load(format!("invalid base64 in data uri: {e}")))?
    } else {
        percent_decode(payload)?
    };
    Ok(Some((mime, bytes)))
}

fn percent_decode(s: &str) -> StudioResult<Vec<u8>> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s
                .get(i + 1..i + 3)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| StudioError::asset_load("invalid percent escape in data uri"))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
