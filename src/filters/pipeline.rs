use std::fmt;

use crate::foundation::error::{StudioError, StudioResult};
use crate::model::element::FilterAdjustments;

/// One primitive of a backend filter pipeline.
///
/// Values carry the units of the pipeline grammar: percent for brightness, contrast, saturate,
/// grayscale and sepia; degrees for hue-rotate; pixels for blur.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterOp {
    /// `brightness(<p>%)`, 100 is identity.
    Brightness(f64),
    /// `contrast(<p>%)`, 100 is identity.
    Contrast(f64),
    /// `saturate(<p>%)`, 100 is identity.
    Saturate(f64),
    /// `hue-rotate(<deg>deg)`.
    HueRotate(f64),
    /// `blur(<px>px)`, Gaussian standard deviation in canvas pixels.
    Blur(f64),
    /// `grayscale(<p>%)`.
    Grayscale(f64),
    /// `sepia(<p>%)`.
    Sepia(f64),
}

impl FilterOp {
    fn name(self) -> &'static str {
        match self {
            FilterOp::Brightness(_) => "brightness",
            FilterOp::Contrast(_) => "contrast",
            FilterOp::Saturate(_) => "saturate",
            FilterOp::HueRotate(_) => "hue-rotate",
            FilterOp::Blur(_) => "blur",
            FilterOp::Grayscale(_) => "grayscale",
            FilterOp::Sepia(_) => "sepia",
        }
    }

    fn unit(self) -> &'static str {
        match self {
            FilterOp::HueRotate(_) => "deg",
            FilterOp::Blur(_) => "px",
            _ => "%",
        }
    }

    fn value(self) -> f64 {
        match self {
            FilterOp::Brightness(v)
            | FilterOp::Contrast(v)
            | FilterOp::Saturate(v)
            | FilterOp::HueRotate(v)
            | FilterOp::Blur(v)
            | FilterOp::Grayscale(v)
            | FilterOp::Sepia(v) => v,
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}{})", self.name(), self.value(), self.unit())
    }
}

/// Ordered list of filter primitives; the empty pipeline renders as `none`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterPipeline {
    /// Primitives in application order.
    pub ops: Vec<FilterOp>,
}

impl FilterPipeline {
    /// Map element adjustments to a pipeline.
    ///
    /// Order is fixed (brightness, contrast, saturation, hue, blur, grayscale, sepia) and neutral
    /// adjustments are omitted.
    pub fn from_adjustments(f: &FilterAdjustments) -> Self {
        let candidates = [
            (f.brightness, FilterOp::Brightness(100.0 + f.brightness)),
            (f.contrast, FilterOp::Contrast(100.0 + f.contrast)),
            (f.saturation, FilterOp::Saturate(100.0 + f.saturation)),
            (f.hue, FilterOp::HueRotate(f.hue)),
            (f.blur, FilterOp::Blur(f.blur)),
            (f.grayscale, FilterOp::Grayscale(f.grayscale)),
            (f.sepia, FilterOp::Sepia(f.sepia)),
        ];
        Self {
            ops: candidates
                .into_iter()
                .filter(|(v, _)| *v != 0.0)
                .map(|(_, op)| op)
                .collect(),
        }
    }

    /// `true` when no primitive is present.
    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// `true` when a blur primitive is present.
    pub fn has_blur(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, FilterOp::Blur(_)))
    }

    /// Parse the pipeline grammar back into primitives.
    ///
    /// Accepts `none` or whitespace-separated `name(<number><unit>)` tokens with the units
    /// produced by [`FilterPipeline::from_adjustments`].
    pub fn parse(s: &str) -> StudioResult<Self> {
        let s = s.trim();
        if s == "none" {
            return Ok(Self::default());
        }
        if s.is_empty() {
            return Err(StudioError::validation("filter pipeline must be non-empty"));
        }

        let mut ops = Vec::new();
        for token in s.split_whitespace() {
            ops.push(parse_op(token)?);
        }
        Ok(Self { ops })
    }
}

fn parse_op(token: &str) -> StudioResult<FilterOp> {
    let bad = || StudioError::validation(format!("invalid filter primitive \"{token}\""));

    let open = token.find('(').ok_or_else(bad)?;
    let name = &token[..open];
    let arg = token[open + 1..].strip_suffix(')').ok_or_else(bad)?;

    let number = |unit: &str| -> StudioResult<f64> {
        let digits = arg.strip_suffix(unit).ok_or_else(bad)?;
        let v: f64 = digits.parse().map_err(|_| bad())?;
        if !v.is_finite() {
            return Err(bad());
        }
        Ok(v)
    };

    match name {
        "brightness" => Ok(FilterOp::Brightness(number("%")?)),
        "contrast" => Ok(FilterOp::Contrast(number("%")?)),
        "saturate" => Ok(FilterOp::Saturate(number("%")?)),
        "hue-rotate" => Ok(FilterOp::HueRotate(number("deg")?)),
        "blur" => Ok(FilterOp::Blur(number("px")?)),
        "grayscale" => Ok(FilterOp::Grayscale(number("%")?)),
        "sepia" => Ok(FilterOp::Sepia(number("%")?)),
        _ => Err(bad()),
    }
}

impl fmt::Display for FilterPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return f.write_str("none");
        }
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

/// Render adjustments as a backend pipeline string, `none` when all are neutral.
pub fn filter_string(f: &FilterAdjustments) -> String {
    FilterPipeline::from_adjustments(f).to_string()
}

#[cfg(test)]
#[path = "../../tests/unit/filters/pipeline.rs"]
mod tests;
