use std::io::Cursor;

use anyhow::Context;

use crate::foundation::core::unpremultiply_rgba8_in_place;
use crate::foundation::error::{StudioError, StudioResult};

/// A painted raster: premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterSurface {
    /// Width in surface pixels.
    pub width: u32,
    /// Height in surface pixels.
    pub height: u32,
    /// Premultiplied pixels, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl RasterSurface {
    /// Wrap premultiplied pixels, checking the length.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> StudioResult<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(StudioError::render("surface byte length mismatch"));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Straight-alpha copy of the pixels.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// Lossless PNG encoding of the surface.
    pub fn to_png(&self) -> StudioResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.to_straight_rgba8())
            .ok_or_else(|| StudioError::render("surface buffer does not match its dimensions"))?;
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .context("encode surface as png")?;
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
