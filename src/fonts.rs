//! Text measurement for the column filler.
//!
//! Pages are drawn with the PDF builtin Helvetica family, so by default widths
//! come from a Helvetica-like heuristic. Real metrics can be loaded from a
//! TTF/OTF file with `ttf-parser` for more accurate line breaking.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::style::Emphasis;

/// Line spacing as a multiple of the largest font size on the line.
pub const LEADING_FACTOR: f32 = 1.5;

/// Baseline offset below the top of a line box, as a fraction of font size.
pub const ASCENT_FACTOR: f32 = 0.75;

/// Metrics of a loaded face.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes (kept alive for ttf-parser's zero-copy API).
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
}

/// Measures text for each emphasis variant of the body face.
pub struct FontManager {
    fonts: HashMap<Emphasis, FontData>,
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }

    /// Measure every emphasis variant with the face in the file at `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let mut mgr = Self::new();
        for bold in [false, true] {
            for italic in [false, true] {
                mgr.load_font(Emphasis { bold, italic }, bytes.clone())
                    .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
            }
        }
        log::info!("Loaded font metrics from {}", path.display());
        Ok(mgr)
    }

    /// Load real metrics for one emphasis variant from TTF/OTF bytes.
    pub fn load_font(
        &mut self,
        emphasis: Emphasis,
        bytes: Vec<u8>,
    ) -> std::result::Result<(), String> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| format!("Failed to parse font: {e}"))?;
        let units_per_em = face.units_per_em() as f32;
        self.fonts.insert(
            emphasis,
            FontData {
                bytes,
                units_per_em,
            },
        );
        Ok(())
    }

    pub fn has_real_metrics(&self, emphasis: Emphasis) -> bool {
        self.fonts.contains_key(&emphasis)
    }

    /// Width of `text` in points at `font_size`.
    ///
    /// Without loaded metrics an average character width of 0.5 × size
    /// (0.55 × size for bold) is assumed.
    pub fn measure_text_width(&self, text: &str, font_size: f32, emphasis: Emphasis) -> f32 {
        let heuristic = |text: &str| {
            let avg = if emphasis.bold { 0.55 } else { 0.5 };
            text.chars().count() as f32 * font_size * avg
        };

        let Some(data) = self.fonts.get(&emphasis) else {
            return heuristic(text);
        };

        match ttf_parser::Face::parse(&data.bytes, 0) {
            Ok(face) => {
                let scale = font_size / data.units_per_em;
                text.chars()
                    .map(|ch| match face.glyph_index(ch) {
                        Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                        None => font_size * 0.5,
                    })
                    .sum()
            }
            Err(_) => heuristic(text),
        }
    }

    /// Height of a line whose largest font is `font_size`.
    pub fn line_height(&self, font_size: f32) -> f32 {
        font_size * LEADING_FACTOR
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_text_width() {
        let mgr = FontManager::default();
        let w = mgr.measure_text_width("Hello", 16.0, Emphasis::NONE);
        // 5 chars × 16 × 0.5 = 40
        assert!((w - 40.0).abs() < 0.1);
    }

    #[test]
    fn bold_is_wider() {
        let mgr = FontManager::default();
        let regular = mgr.measure_text_width("Hello", 8.0, Emphasis::NONE);
        let bold = mgr.measure_text_width("Hello", 8.0, Emphasis::BOLD);
        assert!(bold > regular);
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let mut mgr = FontManager::default();
        assert!(mgr.load_font(Emphasis::NONE, vec![0, 1, 2, 3]).is_err());
        assert!(!mgr.has_real_metrics(Emphasis::NONE));
    }

    #[test]
    fn missing_font_file_is_an_io_error() {
        let path = std::env::temp_dir().join("cpress-no-such-font.ttf");
        let err = FontManager::from_file(&path).err().unwrap();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn unparsable_font_file_is_a_font_error() {
        let name = format!("cpress-bad-font-{}.ttf", std::process::id());
        let path = std::env::temp_dir().join(name);
        fs::write(&path, b"not a font").unwrap();
        let result = FontManager::from_file(&path);
        fs::remove_file(&path).unwrap();
        match result {
            Err(Error::Font(msg)) => assert!(msg.contains("cpress-bad-font")),
            other => panic!("Expected a font error, got {:?}", other.err()),
        }
    }

    #[test]
    fn line_height_uses_leading() {
        let mgr = FontManager::default();
        assert!((mgr.line_height(8.0) - 12.0).abs() < 0.001);
    }
}
