//! CSS color strings as stored on documents and text elements.

use crate::foundation::core::Rgba8;
use crate::foundation::error::{StudioError, StudioResult};

/// Parse a CSS color string.
///
/// Accepted forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)`,
/// `hsl(h, s%, l%)`, `hsla(h, s%, l%, a)`, and a subset of named colors.
pub fn parse_css_color(s: &str) -> StudioResult<Rgba8> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).map_err(StudioError::validation);
    }

    let lower = s.to_ascii_lowercase();
    if let Some((name, args)) = split_function(&lower) {
        return match name {
            "rgb" | "rgba" => parse_rgb_args(args),
            "hsl" | "hsla" => parse_hsl_args(args),
            _ => Err(StudioError::validation(format!(
                "unsupported color function \"{name}\""
            ))),
        };
    }

    named_color(&lower)
        .ok_or_else(|| StudioError::validation(format!("unrecognized color \"{s}\"")))
}

fn split_function(s: &str) -> Option<(&str, &str)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    Some((s[..open].trim(), inner))
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }
    fn hex_nibble(c: &str) -> Result<u8, String> {
        let v = u8::from_str_radix(c, 16).map_err(|_| format!("invalid hex digit \"{c}\""))?;
        Ok(v * 17)
    }

    if !s.is_ascii() {
        return Err("hex color must be ascii".to_owned());
    }

    let (r, g, b, a) = match s.len() {
        3 | 4 => {
            let r = hex_nibble(&s[0..1])?;
            let g = hex_nibble(&s[1..2])?;
            let b = hex_nibble(&s[2..3])?;
            let a = if s.len() == 4 {
                hex_nibble(&s[3..4])?
            } else {
                255
            };
            (r, g, b, a)
        }
        6 | 8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = if s.len() == 8 {
                hex_byte(&s[6..8])?
            } else {
                255
            };
            (r, g, b, a)
        }
        _ => {
            return Err(
                "hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA (case-insensitive)"
                    .to_owned(),
            );
        }
    };

    Ok(Rgba8 { r, g, b, a })
}

fn split_args(args: &str) -> Vec<&str> {
    args.split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn parse_number(part: &str) -> StudioResult<f64> {
    let v: f64 = part
        .parse()
        .map_err(|_| StudioError::validation(format!("invalid color component \"{part}\"")))?;
    if !v.is_finite() {
        return Err(StudioError::validation("color component must be finite"));
    }
    Ok(v)
}

fn parse_alpha(part: Option<&&str>) -> StudioResult<f64> {
    match part {
        None => Ok(1.0),
        Some(p) => match p.strip_suffix('%') {
            Some(pct) => Ok((parse_number(pct)? / 100.0).clamp(0.0, 1.0)),
            None => Ok(parse_number(p)?.clamp(0.0, 1.0)),
        },
    }
}

fn unit_to_u8(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn parse_rgb_args(args: &str) -> StudioResult<Rgba8> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return Err(StudioError::validation(
            "rgb() expects 3 components plus optional alpha",
        ));
    }
    let channel = |p: &str| -> StudioResult<u8> {
        match p.strip_suffix('%') {
            Some(pct) => Ok(unit_to_u8(parse_number(pct)? / 100.0)),
            None => Ok(parse_number(p)?.round().clamp(0.0, 255.0) as u8),
        }
    };
    Ok(Rgba8 {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a: unit_to_u8(parse_alpha(parts.get(3))?),
    })
}

fn parse_hsl_args(args: &str) -> StudioResult<Rgba8> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return Err(StudioError::validation(
            "hsl() expects 3 components plus optional alpha",
        ));
    }
    let h = parse_number(parts[0].trim_end_matches("deg"))?;
    let pct = |p: &str| -> StudioResult<f64> {
        Ok(parse_number(p.trim_end_matches('%'))? / 100.0)
    };
    let (r, g, b) = hsl_to_rgb(h, pct(parts[1])?, pct(parts[2])?);
    Ok(Rgba8 {
        r: unit_to_u8(r),
        g: unit_to_u8(g),
        b: unit_to_u8(b),
        a: unit_to_u8(parse_alpha(parts.get(3))?),
    })
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return (l, l, l);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn named_color(name: &str) -> Option<Rgba8> {
    let c = match name {
        "transparent" => Rgba8 {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        },
        "black" => Rgba8::opaque(0, 0, 0),
        "white" => Rgba8::opaque(255, 255, 255),
        "red" => Rgba8::opaque(255, 0, 0),
        "green" => Rgba8::opaque(0, 128, 0),
        "lime" => Rgba8::opaque(0, 255, 0),
        "blue" => Rgba8::opaque(0, 0, 255),
        "yellow" => Rgba8::opaque(255, 255, 0),
        "cyan" | "aqua" => Rgba8::opaque(0, 255, 255),
        "magenta" | "fuchsia" => Rgba8::opaque(255, 0, 255),
        "gray" | "grey" => Rgba8::opaque(128, 128, 128),
        "silver" => Rgba8::opaque(192, 192, 192),
        "maroon" => Rgba8::opaque(128, 0, 0),
        "navy" => Rgba8::opaque(0, 0, 128),
        "olive" => Rgba8::opaque(128, 128, 0),
        "purple" => Rgba8::opaque(128, 0, 128),
        "teal" => Rgba8::opaque(0, 128, 128),
        "orange" => Rgba8::opaque(255, 165, 0),
        "pink" => Rgba8::opaque(255, 192, 203),
        "brown" => Rgba8::opaque(165, 42, 42),
        "gold" => Rgba8::opaque(255, 215, 0),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
