//! Font faces shared by text fitting, display layout and rasterisation.
//!
//! Faces are located through `fontdb` and parsed with `fontdue`. DejaVu
//! Sans ships inside the crate and stands in when the host has no usable
//! face, so every book built here can draw text. Only
//! [`FontBook::empty`] has no faces; it measures with [`EstimatedMetrics`]
//! and cannot be rendered with.

use crate::error::RenderError;
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use fontdue::{Font, FontSettings};
use std::fmt;
use std::sync::{Arc, OnceLock};
use thumb_core::{EstimatedMetrics, FontStyle, FontWeight, TextMeasure};

/// Family the editor asks for first.
pub const DEFAULT_FAMILY: &str = "Arial";

/// Families tried, in order, as the generic sans-serif when the host has them.
const SANS_CANDIDATES: [&str; 6] = [
    "Arial",
    "Helvetica",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
    "Roboto",
];

static BUNDLED_REGULAR: &[u8] = include_bytes!("../fonts/DejaVuSans.ttf");
static BUNDLED_BOLD: &[u8] = include_bytes!("../fonts/DejaVuSans-Bold.ttf");

/// Faces tried for glyphs the text face lacks (icons, arrows, symbols).
const SYMBOL_FAMILIES: [&str; 5] = [
    "Noto Emoji",
    "Segoe UI Symbol",
    "Segoe UI Emoji",
    "DejaVu Sans",
    "Noto Sans Symbols2",
];

/// Codepoints that modify a neighbour and take no advance.
pub fn is_zero_width(c: char) -> bool {
    matches!(c as u32, 0xFE00..=0xFE0F | 0x200B..=0x200D)
}

#[derive(Clone, Default)]
pub struct FontBook {
    /// Indexed by `bold * 2 + italic`.
    faces: [Option<Arc<Font>>; 4],
    fallbacks: Vec<Arc<Font>>,
}

fn slot(weight: FontWeight, style: FontStyle) -> usize {
    let bold = matches!(weight, FontWeight::Bold) as usize;
    let italic = matches!(style, FontStyle::Italic) as usize;
    bold * 2 + italic
}

impl FontBook {
    /// A book with no faces. It measures by estimate; rendering text with
    /// it fails with [`RenderError::Font`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// The faces compiled into the crate: DejaVu Sans regular and bold.
    /// Italic slots reuse the upright faces.
    pub fn bundled() -> Self {
        static BUNDLED: OnceLock<FontBook> = OnceLock::new();
        BUNDLED
            .get_or_init(|| {
                let regular = parse_bundled(BUNDLED_REGULAR);
                let bold = parse_bundled(BUNDLED_BOLD).or_else(|| regular.clone());
                FontBook {
                    faces: [regular.clone(), regular, bold.clone(), bold],
                    fallbacks: Vec::new(),
                }
            })
            .clone()
    }

    /// Scan the system fonts for `family` (falling back to the generic
    /// sans-serif family) plus symbol faces for icon glyphs.
    pub fn system(family: &str) -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!("font database: {} faces", db.len());
        prefer_installed_sans(&mut db);
        Self::from_database(&db, family)
    }

    /// Build a book from a single font file used for every style. Glyphs
    /// it lacks fall back to the bundled faces; no system scan is done.
    pub fn from_font_data(data: Vec<u8>) -> Result<Self, RenderError> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| RenderError::Font(e.to_string()))?;
        let font = Arc::new(font);
        let bundled = Self::bundled();
        Ok(Self {
            faces: [
                Some(font.clone()),
                Some(font.clone()),
                Some(font.clone()),
                Some(font),
            ],
            fallbacks: bundled.faces[0].iter().cloned().collect(),
        })
    }

    /// Append `other`'s regular face and symbol faces to the glyph
    /// fallbacks of this book.
    pub fn with_fallbacks(mut self, other: FontBook) -> Self {
        let FontBook { faces, fallbacks } = other;
        let [regular, ..] = faces;
        let mut merged: Vec<Arc<Font>> = regular.into_iter().chain(fallbacks).collect();
        merged.append(&mut self.fallbacks);
        self.fallbacks = merged;
        self
    }

    fn from_database(db: &Database, family: &str) -> Self {
        let mut book = Self::default();
        for (weight, style) in [
            (FontWeight::Normal, FontStyle::Normal),
            (FontWeight::Normal, FontStyle::Italic),
            (FontWeight::Bold, FontStyle::Normal),
            (FontWeight::Bold, FontStyle::Italic),
        ] {
            let query = Query {
                families: &[Family::Name(family), Family::SansSerif],
                weight: match weight {
                    FontWeight::Bold => Weight::BOLD,
                    FontWeight::Normal => Weight::NORMAL,
                },
                stretch: Stretch::Normal,
                style: match style {
                    FontStyle::Italic => Style::Italic,
                    FontStyle::Normal => Style::Normal,
                },
            };
            book.faces[slot(weight, style)] = db.query(&query).and_then(|id| load_face(db, id));
        }

        for name in SYMBOL_FAMILIES {
            let query = Query {
                families: &[Family::Name(name)],
                weight: Weight::NORMAL,
                stretch: Stretch::Normal,
                style: Style::Normal,
            };
            if let Some(font) = db.query(&query).and_then(|id| load_face(db, id)) {
                book.fallbacks.push(font);
            }
        }

        let bundled = Self::bundled();
        if !book.has_faces() {
            log::info!("no installed face for {family:?}; using DejaVu Sans");
            book.faces = bundled.faces.clone();
        }
        book.fallbacks.extend(bundled.faces[0].clone());
        book
    }

    pub fn has_faces(&self) -> bool {
        self.faces.iter().any(Option::is_some)
    }

    /// The face used for text in this style, if any was found.
    pub fn text_face(&self, weight: FontWeight, style: FontStyle) -> Option<&Font> {
        self.faces[slot(weight, style)]
            .as_deref()
            .or(self.faces[slot(weight, FontStyle::Normal)].as_deref())
            .or(self.faces[0].as_deref())
    }

    /// First face, in preference order, that has an outline for `c`.
    pub fn face_for(&self, c: char, weight: FontWeight, style: FontStyle) -> Option<&Font> {
        self.text_face(weight, style)
            .into_iter()
            .chain(self.fallbacks.iter().map(|f| &**f))
            .find(|f| f.lookup_glyph_index(c) != 0)
    }

    /// Whether every visible codepoint of `text` has a glyph in some face.
    pub fn covers(&self, text: &str) -> bool {
        text.chars()
            .filter(|c| !is_zero_width(*c))
            .all(|c| self.face_for(c, FontWeight::Normal, FontStyle::Normal).is_some())
    }

    /// `(ascent, descent)` at `size`; descent is negative.
    pub fn vertical_metrics(&self, size: f32, weight: FontWeight, style: FontStyle) -> (f32, f32) {
        self.text_face(weight, style)
            .and_then(|f| f.horizontal_line_metrics(size))
            .map(|m| (m.ascent, m.descent))
            .unwrap_or((size * 0.905, size * -0.212))
    }
}

/// Point fontdb's generic sans-serif at a family the host actually has.
/// Without this `Family::SansSerif` always means "Arial".
fn prefer_installed_sans(db: &mut Database) {
    let installed = SANS_CANDIDATES.into_iter().find(|candidate| {
        db.faces()
            .any(|face| face.families.iter().any(|(name, _)| name.as_str() == *candidate))
    });
    if let Some(name) = installed {
        log::debug!("sans-serif resolves to {name:?}");
        db.set_sans_serif_family(name);
    }
}

fn parse_bundled(data: &'static [u8]) -> Option<Arc<Font>> {
    match Font::from_bytes(data, FontSettings::default()) {
        Ok(font) => Some(Arc::new(font)),
        Err(e) => {
            log::error!("bundled font is unreadable: {e}");
            None
        }
    }
}

fn load_face(db: &Database, id: fontdb::ID) -> Option<Arc<Font>> {
    db.with_face_data(id, |data, index| {
        let settings = FontSettings {
            collection_index: index,
            ..FontSettings::default()
        };
        Font::from_bytes(data, settings)
    })
    .and_then(|res| match res {
        Ok(font) => Some(Arc::new(font)),
        Err(e) => {
            log::warn!("skipping unreadable face: {e}");
            None
        }
    })
}

impl TextMeasure for FontBook {
    fn measure(&self, text: &str, size: f32, weight: FontWeight, style: FontStyle) -> f32 {
        if !self.has_faces() {
            return EstimatedMetrics.measure(text, size, weight, style);
        }
        text.chars()
            .filter(|c| !is_zero_width(*c))
            .map(|c| match self.face_for(c, weight, style) {
                Some(face) => face.metrics(c, size).advance_width,
                None => EstimatedMetrics::advance_em(c) * size,
            })
            .sum()
    }
}

impl fmt::Debug for FontBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.faces.iter().filter(|f| f.is_some()).count())
            .field("fallbacks", &self.fallbacks.len())
            .finish()
    }
}
