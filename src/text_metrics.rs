use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Width of `text` in the first installed face of `font_family`, or `None`
/// when no face matches.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FaceAdvances>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = normalize_family_key(font_family);
        if !self.cache.contains_key(&key) {
            let advances = self.load_advances(font_family);
            self.cache.insert(key.clone(), advances);
        }
        let advances = self.cache.get(&key)?.as_ref()?;
        Some(advances.width(text, font_size))
    }

    fn load_advances(&mut self, font_family: &str) -> Option<FaceAdvances> {
        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                "monospace" | "ui-monospace" => Family::Monospace,
                _ => Family::Name(*name),
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
            .with_face_data(id, |data, index| {
                Face::parse(data, index).ok().map(|face| FaceAdvances::from_face(&face))
            })
            .flatten()
    }
}

/// Horizontal advances for the printable ASCII range. Other characters are
/// estimated from the average advance.
struct FaceAdvances {
    units_per_em: f32,
    ascii: [u16; 128],
    average: f32,
}

impl FaceAdvances {
    fn from_face(face: &Face<'_>) -> Self {
        let mut ascii = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        let measured: Vec<u16> = ascii[32..127].iter().copied().filter(|a| *a > 0).collect();
        let average = if measured.is_empty() {
            0.0
        } else {
            measured.iter().map(|a| *a as f32).sum::<f32>() / measured.len() as f32
        };
        Self {
            units_per_em: face.units_per_em().max(1) as f32,
            ascii,
            average,
        }
    }

    fn width(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em;
        let fallback = if self.average > 0.0 {
            self.average * scale
        } else {
            font_size * 0.56
        };
        text.chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| match self.ascii.get(ch as usize) {
                Some(advance) if *advance > 0 => *advance as f32 * scale,
                _ => fallback,
            })
            .sum()
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
