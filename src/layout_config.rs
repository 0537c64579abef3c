//! Layout config – the intermediate representation between region flow and
//! PDF rendering. This is the "frozen" structure that encodes exactly what
//! goes on each page.

use serde::{Deserialize, Serialize};

use crate::flow::PageSurface;
use crate::fonts::{FontManager, ASCENT_FACTOR};
use crate::style::{Color, Emphasis};

/// A complete document layout ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Document title embedded in the PDF metadata.
    #[serde(default = "LayoutConfig::default_title")]
    pub title: String,
    #[serde(default)]
    pub info: DocumentInfo,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

/// Document information dictionary entries besides the title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub author: String,
    pub subject: String,
    pub keywords: Vec<String>,
    pub creator: String,
    pub language: String,
}

/// One page of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    pub spans: Vec<TextSpan>,
}

/// A single-style piece of text placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    /// Left edge, in points from the page's left edge.
    pub x: f32,
    /// Baseline, in points from the page's top edge.
    pub baseline: f32,
    /// Measured advance width.
    pub width: f32,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: [f32; 4],
    /// Link target for anchor text.
    pub link: Option<String>,
}

impl TextSpan {
    /// Top of the glyph box, for bounds checks.
    pub fn top(&self) -> f32 {
        self.baseline - self.font_size * ASCENT_FACTOR
    }
}

impl LayoutConfig {
    /// Create an empty US Letter layout config.
    pub fn letter() -> Self {
        Self {
            title: Self::default_title(),
            info: DocumentInfo::default(),
            page_width_pt: 612.0,
            page_height_pt: 792.0,
            pages: Vec::new(),
        }
    }

    fn default_title() -> String {
        "column-press output".to_string()
    }

    /// Every span on every page, in placement order.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.pages.iter().flat_map(|p| p.spans.iter())
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// A [`PageSurface`] that records spans into a [`LayoutConfig`].
pub struct PageRecorder<'f> {
    fonts: &'f FontManager,
    config: LayoutConfig,
    current: PageLayout,
    footer_color: Color,
}

impl<'f> PageRecorder<'f> {
    pub fn new(fonts: &'f FontManager, config: LayoutConfig) -> Self {
        Self {
            fonts,
            config,
            current: PageLayout {
                page_index: 0,
                spans: Vec::new(),
            },
            footer_color: Color::GRAY,
        }
    }

    /// Close the last page and return the finished layout.
    pub fn finish(mut self) -> LayoutConfig {
        self.config.pages.push(self.current);
        self.config
    }
}

impl PageSurface for PageRecorder<'_> {
    fn place_text(&mut self, span: TextSpan) {
        self.current.spans.push(span);
    }

    fn draw_centered(&mut self, text: &str, x: f32, baseline: f32, font_size: f32) {
        let width = self
            .fonts
            .measure_text_width(text, font_size, Emphasis::NONE);
        self.place_text(TextSpan {
            text: text.to_string(),
            x: x - width / 2.0,
            baseline,
            width,
            font_size,
            bold: false,
            italic: false,
            underline: false,
            color: self.footer_color.to_array(),
            link: None,
        });
    }

    fn new_page(&mut self) {
        let next = PageLayout {
            page_index: self.current.page_index + 1,
            spans: Vec::new(),
        };
        let done = std::mem::replace(&mut self.current, next);
        self.config.pages.push(done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_tracks_pages() {
        let fonts = FontManager::default();
        let mut recorder = PageRecorder::new(&fonts, LayoutConfig::letter());
        recorder.draw_centered("footer", 300.0, 777.0, 6.0);
        recorder.new_page();
        recorder.new_page();
        let config = recorder.finish();

        assert_eq!(config.pages.len(), 3);
        assert_eq!(config.pages[2].page_index, 2);
        let footer = &config.pages[0].spans[0];
        assert!((footer.x + footer.width / 2.0 - 300.0).abs() < 0.001);
        assert_eq!(footer.color, Color::GRAY.to_array());
    }

    #[test]
    fn json_roundtrip_keeps_info() {
        let mut config = LayoutConfig::letter();
        config.info.keywords = vec!["keto".to_string(), "diet".to_string()];
        let parsed = LayoutConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(parsed.info, config.info);
        assert!((parsed.page_height_pt - 792.0).abs() < 0.01);
    }
}
