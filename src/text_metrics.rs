//! Font-based text widths used to fit names into node boxes.
//!
//! Faces are resolved once per family list through the system font database.
//! Without a usable face every character counts as `FALLBACK_CHAR_WIDTH` em.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

const FALLBACK_CHAR_WIDTH: f32 = 0.56;
const ELLIPSIS: char = '\u{2026}';

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Width of `text` in the first available face of `font_family`, or `None`
/// when no face could be loaded.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

pub fn estimate_text_width(text: &str, font_size: f32, font_family: &str) -> f32 {
    measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| text.chars().count() as f32 * font_size * FALLBACK_CHAR_WIDTH)
}

/// `text` unchanged when it fits in `max_width`, otherwise the longest
/// prefix that fits once an ellipsis is appended.
pub fn fit_text(text: &str, max_width: f32, font_size: f32, font_family: &str) -> String {
    if estimate_text_width(text, font_size, font_family) <= max_width {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let (mut lo, mut hi) = (0usize, chars.len());
    while lo < hi {
        let mid = (lo + hi).div_ceil(2);
        let candidate = truncated(&chars, mid);
        if estimate_text_width(&candidate, font_size, font_family) <= max_width {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    truncated(&chars, lo)
}

fn truncated(chars: &[char], keep: usize) -> String {
    let mut out: String = chars[..keep].iter().collect();
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    out.push(ELLIPSIS);
    out
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = font_family.trim().to_string();
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font_family);
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get(&key)?.as_ref()?;
        Some(face.width(text, font_size))
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                _ => Family::Name(name.as_str()),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }
        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data, index))
            .flatten()
    }
}

/// Horizontal advances of one face, read eagerly so no borrowed parser is
/// kept around.
struct FontFace {
    units_per_em: f32,
    advances: HashMap<char, u16>,
    fallback_advance: u16,
}

impl FontFace {
    fn parse(data: &[u8], index: u32) -> Option<Self> {
        let face = Face::parse(data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut advances = HashMap::new();
        if let Some(table) = face.tables().cmap {
            for subtable in table.subtables.into_iter().filter(|s| s.is_unicode()) {
                subtable.codepoints(|code| {
                    let Some(ch) = char::from_u32(code) else {
                        return;
                    };
                    if let Some(advance) = subtable
                        .glyph_index(code)
                        .and_then(|glyph| face.glyph_hor_advance(glyph))
                    {
                        advances.entry(ch).or_insert(advance);
                    }
                });
            }
        }
        let fallback_advance = (units_per_em as f32 * FALLBACK_CHAR_WIDTH) as u16;
        Some(Self {
            units_per_em: units_per_em as f32,
            advances,
            fallback_advance,
        })
    }

    fn width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                *self
                    .advances
                    .get(&ch)
                    .unwrap_or(&self.fallback_advance) as u32
            })
            .sum();
        units as f32 * font_size / self.units_per_em
    }
}
