//! CPU interpretation of [`FilterPipeline`] over premultiplied RGBA8 pixels.
//!
//! Color primitives use the CSS Filter Effects matrices; blur is a separable Gaussian with a
//! fixed-point kernel.

use crate::filters::pipeline::{FilterOp, FilterPipeline};
use crate::foundation::error::{StudioError, StudioResult};

/// Largest blur radius (in source pixels) the kernel builder accepts.
const MAX_BLUR_RADIUS: u32 = 256;

/// Apply `pipeline` to a premultiplied RGBA8 buffer.
///
/// `px_scale` converts canvas pixels to source pixels, so `blur(4px)` on an image drawn at
/// half its natural size blurs with sigma 8 in source space.
pub fn apply_pipeline_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    pipeline: &FilterPipeline,
    px_scale: f64,
) -> StudioResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| StudioError::render("filter buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(StudioError::render(
            "filter input must match width*height*4",
        ));
    }

    let mut buf = src.to_vec();
    for op in &pipeline.ops {
        match *op {
            FilterOp::Blur(px) => {
                let sigma = (px * px_scale) as f32;
                let radius = ((sigma * 3.0).ceil() as u32).min(MAX_BLUR_RADIUS);
                if radius == 0 || sigma <= 0.0 {
                    continue;
                }
                buf = blur_rgba8_premul(&buf, width, height, radius, sigma)?;
            }
            color_op => color_matrix_rgba8_premul_in_place(&mut buf, color_matrix(color_op)),
        }
    }
    Ok(buf)
}

/// 4x5 row-major matrix over straight RGBA in `0..=1`.
fn color_matrix(op: FilterOp) -> [f32; 20] {
    fn rgb3(m: [f64; 9]) -> [f32; 20] {
        [
            m[0] as f32, m[1] as f32, m[2] as f32, 0.0, 0.0, //
            m[3] as f32, m[4] as f32, m[5] as f32, 0.0, 0.0, //
            m[6] as f32, m[7] as f32, m[8] as f32, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]
    }

    match op {
        FilterOp::Brightness(pct) => {
            let a = (pct / 100.0).max(0.0);
            rgb3([a, 0.0, 0.0, 0.0, a, 0.0, 0.0, 0.0, a])
        }
        FilterOp::Contrast(pct) => {
            let a = (pct / 100.0).max(0.0) as f32;
            let b = 0.5 - 0.5 * a;
            [
                a, 0.0, 0.0, 0.0, b, //
                0.0, a, 0.0, 0.0, b, //
                0.0, 0.0, a, 0.0, b, //
                0.0, 0.0, 0.0, 1.0, 0.0,
            ]
        }
        FilterOp::Saturate(pct) => {
            let s = (pct / 100.0).max(0.0);
            rgb3([
                0.213 + 0.787 * s,
                0.715 - 0.715 * s,
                0.072 - 0.072 * s,
                0.213 - 0.213 * s,
                0.715 + 0.285 * s,
                0.072 - 0.072 * s,
                0.213 - 0.213 * s,
                0.715 - 0.715 * s,
                0.072 + 0.928 * s,
            ])
        }
        FilterOp::HueRotate(deg) => {
            let (sin, cos) = deg.to_radians().sin_cos();
            rgb3([
                0.213 + cos * 0.787 - sin * 0.213,
                0.715 - cos * 0.715 - sin * 0.715,
                0.072 - cos * 0.072 + sin * 0.928,
                0.213 - cos * 0.213 + sin * 0.143,
                0.715 + cos * 0.285 + sin * 0.140,
                0.072 - cos * 0.072 - sin * 0.283,
                0.213 - cos * 0.213 - sin * 0.787,
                0.715 - cos * 0.715 + sin * 0.715,
                0.072 + cos * 0.928 + sin * 0.072,
            ])
        }
        FilterOp::Grayscale(pct) => {
            let k = 1.0 - (pct / 100.0).clamp(0.0, 1.0);
            rgb3([
                0.2126 + 0.7874 * k,
                0.7152 - 0.7152 * k,
                0.0722 - 0.0722 * k,
                0.2126 - 0.2126 * k,
                0.7152 + 0.2848 * k,
                0.0722 - 0.0722 * k,
                0.2126 - 0.2126 * k,
                0.7152 - 0.7152 * k,
                0.0722 + 0.9278 * k,
            ])
        }
        FilterOp::Sepia(pct) => {
            let k = 1.0 - (pct / 100.0).clamp(0.0, 1.0);
            rgb3([
                0.393 + 0.607 * k,
                0.769 - 0.769 * k,
                0.189 - 0.189 * k,
                0.349 - 0.349 * k,
                0.686 + 0.314 * k,
                0.168 - 0.168 * k,
                0.272 - 0.272 * k,
                0.534 - 0.534 * k,
                0.131 + 0.869 * k,
            ])
        }
        FilterOp::Blur(_) => rgb3([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]),
    }
}

fn color_matrix_rgba8_premul_in_place(buf: &mut [u8], m: [f32; 20]) {
    for px in buf.chunks_exact_mut(4) {
        let pa = px[3] as f32 / 255.0;
        if pa <= 0.0 {
            continue;
        }

        // premul -> straight
        let inv_a = 1.0 / pa;
        let r = (px[0] as f32 / 255.0) * inv_a;
        let g = (px[1] as f32 / 255.0) * inv_a;
        let b = (px[2] as f32 / 255.0) * inv_a;
        let a = pa;

        let out_r = (m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4]).clamp(0.0, 1.0);
        let out_g = (m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9]).clamp(0.0, 1.0);
        let out_b = (m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14]).clamp(0.0, 1.0);
        let out_a = (m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19]).clamp(0.0, 1.0);

        px[0] = (out_r * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        px[1] = (out_g * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        px[2] = (out_b * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        px[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

pub(crate) fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> StudioResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| StudioError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(StudioError::render(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> StudioResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(StudioError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(StudioError::render("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Fold rounding drift into the center tap so the kernel sums to exactly 1.0 in q16.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/filters/apply.rs"]
mod tests;
