use std::collections::HashMap;
use std::path::Path;

use crate::foundation::error::{StudioError, StudioResult};
use crate::model::element::{FontWeight, TextAlign};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color carried through Parley layouts.
pub struct TextBrush {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

struct LoadedFace {
    font: vello_cpu::peniko::FontData,
    family_name: String,
    font_ctx: parley::FontContext,
}

/// One glyph positioned in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    /// Glyph id in the resolved face.
    pub id: u32,
    /// Pen x.
    pub x: f32,
    /// Baseline y.
    pub y: f32,
}

/// A glyph run ready for painting.
#[derive(Clone, Debug)]
pub struct PlacedRun {
    /// Fill color.
    pub brush: TextBrush,
    /// Font size in pixels.
    pub font_size: f32,
    /// Glyphs in canvas coordinates.
    pub glyphs: Vec<PlacedGlyph>,
}

/// Shaped text, anchored per alignment with its first baseline at the requested y.
#[derive(Clone, Debug)]
pub struct PlacedText {
    /// Face used for every run.
    pub font: vello_cpu::peniko::FontData,
    /// Runs in layout order.
    pub runs: Vec<PlacedRun>,
    /// Advance width of the widest line.
    pub width: f32,
}

/// Parameters for [`FontBook::layout`].
#[derive(Clone, Copy, Debug)]
pub struct TextRequest<'a> {
    /// Content.
    pub text: &'a str,
    /// Requested family name.
    pub family: &'a str,
    /// Weight.
    pub weight: FontWeight,
    /// Size in pixels.
    pub size_px: f32,
    /// Anchor alignment.
    pub align: TextAlign,
    /// Fill color.
    pub brush: TextBrush,
    /// Anchor x in canvas pixels.
    pub x: f64,
    /// Baseline y in canvas pixels.
    pub baseline_y: f64,
}

/// Font resolution and text shaping.
///
/// Faces are looked up in a `fontdb` database (system fonts plus configured directories) by
/// family name and weight, falling back to the generic sans-serif family. Each resolved face gets
/// its own Parley font context so shaping always uses exactly the bytes that get painted.
pub struct FontBook {
    db: usvg::fontdb::Database,
    layout_ctx: parley::LayoutContext<TextBrush>,
    faces: HashMap<(String, FontWeight), Option<LoadedFace>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("db_faces", &self.db.len())
            .field("resolved", &self.faces.len())
            .finish()
    }
}

impl FontBook {
    /// Build a font book from system fonts (when enabled) and extra directories.
    pub fn new(load_system_fonts: bool, font_dirs: &[impl AsRef<Path>]) -> Self {
        let mut db = usvg::fontdb::Database::new();
        if load_system_fonts {
            db.load_system_fonts();
        }
        for dir in font_dirs {
            load_fonts_from_dir(&mut db, dir.as_ref());
        }
        tracing::debug!(faces = db.len(), "font database loaded");
        Self::with_database(db)
    }

    /// Font book over an existing database.
    pub fn with_database(db: usvg::fontdb::Database) -> Self {
        Self {
            db,
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
        }
    }

    /// Number of faces known to the database.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Register a font file's bytes.
    pub fn load_font_data(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
        self.faces.clear();
    }

    /// Family name of the face `family`/`weight` resolves to, if any.
    pub fn resolved_family(&mut self, family: &str, weight: FontWeight) -> Option<String> {
        self.face(family, weight).map(|f| f.family_name.clone())
    }

    /// Shape `req.text` and place it.
    ///
    /// Returns `Ok(None)` when no face resolves or the text is empty.
    pub fn layout(&mut self, req: &TextRequest<'_>) -> StudioResult<Option<PlacedText>> {
        if req.text.is_empty() {
            return Ok(None);
        }
        if !req.size_px.is_finite() || req.size_px <= 0.0 {
            return Err(StudioError::validation("font size must be finite and > 0"));
        }

        let key = (req.family.to_owned(), req.weight);
        if !self.faces.contains_key(&key) {
            let loaded = match self.load_face(req.family, req.weight) {
                Ok(Some(face)) => Some(face),
                Ok(None) => {
                    tracing::warn!(family = req.family, "no font face available, text skipped");
                    None
                }
                Err(e) => {
                    tracing::warn!(
                        family = req.family,
                        error = %e,
                        "font face unusable, text skipped"
                    );
                    None
                }
            };
            self.faces.insert(key.clone(), loaded);
        }
        let Some(face) = self.faces.get_mut(&key).and_then(Option::as_mut) else {
            return Ok(None);
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut face.font_ctx, req.text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(face.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(req.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(req.brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(req.text);
        layout.break_all_lines(None);

        let width = layout.width();
        let first_baseline = layout
            .lines()
            .next()
            .map(|line| line.metrics().baseline)
            .unwrap_or(0.0);
        let dx = req.x as f32 - align_offset(req.align, width);
        let dy = req.baseline_y as f32 - first_baseline;

        let mut runs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run
                    .glyphs()
                    .map(|g| PlacedGlyph {
                        id: g.id,
                        x: g.x + dx,
                        y: g.y + dy,
                    })
                    .collect();
                runs.push(PlacedRun {
                    brush: run.style().brush,
                    font_size: run.run().font_size(),
                    glyphs,
                });
            }
        }

        Ok(Some(PlacedText {
            font: face.font.clone(),
            runs,
            width,
        }))
    }

    fn face(&mut self, family: &str, weight: FontWeight) -> Option<&LoadedFace> {
        let key = (family.to_owned(), weight);
        if !self.faces.contains_key(&key) {
            let loaded = self.load_face(family, weight).ok().flatten();
            self.faces.insert(key.clone(), loaded);
        }
        self.faces.get(&key).and_then(Option::as_ref)
    }

    fn load_face(&self, family: &str, weight: FontWeight) -> StudioResult<Option<LoadedFace>> {
        use usvg::fontdb::{Family, Query, Weight};

        let families = [Family::Name(family), Family::SansSerif];
        let query = Query {
            families: &families,
            weight: match weight {
                FontWeight::Normal => Weight::NORMAL,
                FontWeight::Bold => Weight::BOLD,
            },
            ..Default::default()
        };
        let Some(id) = self.db.query(&query).or_else(|| self.db.faces().next().map(|f| f.id))
        else {
            return Ok(None);
        };
        let Some((bytes, index)) = self.db.with_face_data(id, |data, idx| (data.to_vec(), idx))
        else {
            return Ok(None);
        };

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| StudioError::render("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StudioError::render("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes),
            index,
        );
        Ok(Some(LoadedFace {
            font,
            family_name,
            font_ctx,
        }))
    }
}

fn align_offset(align: TextAlign, width: f32) -> f32 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => width / 2.0,
        TextAlign::Right => width,
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "font file skipped");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
