//! Column text – the fill primitive used by the region flow.
//!
//! Elements are linearised into blocks (one per paragraph or list item) of
//! words, where a word is one or more styled segments with no whitespace
//! between them. Each call to [`ColumnText::fill`] breaks lines greedily to
//! the region width and places them top to bottom until the next line would
//! cross the region's bottom edge.

use crate::document::{Element, Inline, TextRun};
use crate::flow::{ColumnFiller, FillReport, FlowError, PageSurface, Rect};
use crate::fonts::FontManager;
use crate::layout_config::TextSpan;
use crate::style::{Color, Emphasis, StyleState, TextAlign};

// ---------------------------------------------------------------------------
// Linearised content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Segment {
    text: String,
    style: StyleState,
    link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct Word {
    segments: Vec<Segment>,
    /// A space separates this word from the previous one on the same line.
    space_before: bool,
    /// This word must start a new line.
    break_before: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Block {
    words: Vec<Word>,
    alignment: TextAlign,
    spacing_before: f32,
    indent: f32,
    marker: Option<String>,
    marker_size: f32,
}

/// Splits runs into words while tracking whitespace across run boundaries.
struct WordSplitter {
    words: Vec<Word>,
    pending_space: bool,
    pending_break: bool,
    /// The last word may still be extended by an adjacent run.
    open: bool,
}

impl WordSplitter {
    fn new() -> Self {
        Self {
            words: Vec::new(),
            pending_space: false,
            pending_break: false,
            open: false,
        }
    }

    fn push_run(&mut self, run: &TextRun, link: Option<&str>) {
        let mut word = String::new();
        for ch in run.text.chars() {
            if ch.is_whitespace() {
                self.end_word(&mut word, run, link);
                if ch == '\n' {
                    self.pending_break = true;
                } else {
                    self.pending_space = true;
                }
            } else {
                word.push(ch);
            }
        }
        if !word.is_empty() {
            self.append(word, run, link);
            self.open = true;
        }
    }

    fn end_word(&mut self, word: &mut String, run: &TextRun, link: Option<&str>) {
        if !word.is_empty() {
            self.append(std::mem::take(word), run, link);
        }
        self.open = false;
    }

    fn append(&mut self, text: String, run: &TextRun, link: Option<&str>) {
        let segment = Segment {
            text,
            style: run.style,
            link: link.map(str::to_string),
        };
        match self.words.last_mut() {
            Some(last) if self.open => last.segments.push(segment),
            _ => {
                let first = self.words.is_empty();
                self.words.push(Word {
                    segments: vec![segment],
                    space_before: self.pending_space && !self.pending_break && !first,
                    break_before: self.pending_break && !first,
                });
                self.pending_space = false;
                self.pending_break = false;
            }
        }
        self.open = true;
    }

    fn push_inlines(&mut self, children: &[Inline]) {
        for child in children {
            match child {
                Inline::Run(run) => self.push_run(run, None),
                Inline::Anchor(anchor) => {
                    for run in &anchor.runs {
                        self.push_run(run, Some(&anchor.href));
                    }
                }
            }
        }
    }

    fn finish(self) -> Vec<Word> {
        self.words
    }
}

fn words_of(children: &[Inline]) -> Vec<Word> {
    let mut splitter = WordSplitter::new();
    splitter.push_inlines(children);
    splitter.finish()
}

fn linearise(elements: &[Element]) -> Vec<Block> {
    let mut blocks = Vec::new();
    for element in elements {
        match element {
            Element::Paragraph(p) => blocks.push(Block {
                words: words_of(&p.children),
                alignment: p.alignment,
                spacing_before: p.spacing_before,
                indent: 0.0,
                marker: None,
                marker_size: 0.0,
            }),
            Element::List(list) => {
                for (n, item) in list.items.iter().enumerate() {
                    let words = words_of(&item.children);
                    let marker_size = words
                        .first()
                        .and_then(|w| w.segments.first())
                        .map(|s| s.style.size)
                        .unwrap_or(0.0);
                    blocks.push(Block {
                        words,
                        alignment: TextAlign::Left,
                        spacing_before: item.spacing_before,
                        indent: list.symbol_indent,
                        marker: list.ordered.then(|| format!("{}.", n + 1)),
                        marker_size,
                    });
                }
            }
        }
    }
    blocks
}

// ---------------------------------------------------------------------------
// Filler
// ---------------------------------------------------------------------------

/// Position inside the linearised content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentOffset {
    pub block: usize,
    pub word: usize,
}

/// One line chosen by the line breaker.
struct Line {
    end: usize,
    width: f32,
    height: f32,
}

/// Greedy line-breaking column filler over an element sequence.
pub struct ColumnText<'f> {
    fonts: &'f FontManager,
    blocks: Vec<Block>,
    offset: ContentOffset,
}

impl<'f> ColumnText<'f> {
    pub fn new(fonts: &'f FontManager, elements: &[Element]) -> Self {
        Self {
            fonts,
            blocks: linearise(elements),
            offset: ContentOffset::default(),
        }
    }

    pub fn offset(&self) -> ContentOffset {
        self.offset
    }

    pub fn has_more(&self) -> bool {
        self.offset.block < self.blocks.len()
    }

    fn segment_width(&self, segment: &Segment) -> f32 {
        self.fonts
            .measure_text_width(&segment.text, segment.style.size, segment.style.emphasis)
    }

    fn word_width(&self, word: &Word) -> f32 {
        word.segments.iter().map(|s| self.segment_width(s)).sum()
    }

    fn space_width(&self, word: &Word) -> f32 {
        match word.segments.first() {
            Some(s) => self.fonts.measure_text_width(" ", s.style.size, s.style.emphasis),
            None => 0.0,
        }
    }

    fn word_size(word: &Word) -> f32 {
        word.segments
            .iter()
            .map(|s| s.style.size)
            .fold(0.0, f32::max)
    }

    /// Pick the words of the next line starting at `start`. The first word is
    /// always taken, even when it is wider than `available`.
    fn break_line(&self, block: &Block, start: usize, available: f32) -> Line {
        let first = &block.words[start];
        let mut width = self.word_width(first);
        let mut size = Self::word_size(first);
        let mut end = start + 1;

        while let Some(word) = block.words.get(end) {
            if word.break_before {
                break;
            }
            let gap = if word.space_before {
                self.space_width(word)
            } else {
                0.0
            };
            let candidate = width + gap + self.word_width(word);
            if candidate > available {
                break;
            }
            width = candidate;
            size = size.max(Self::word_size(word));
            end += 1;
        }

        Line {
            end,
            width,
            height: self.fonts.line_height(size),
        }
    }

    fn place_line(
        &self,
        block: &Block,
        start: usize,
        line: &Line,
        region: &Rect,
        baseline: f32,
        surface: &mut dyn PageSurface,
    ) {
        let left = region.left + block.indent;
        let available = region.width() - block.indent;
        let mut x = match block.alignment {
            TextAlign::Left => left,
            TextAlign::Center => left + (available - line.width) / 2.0,
            TextAlign::Right => left + available - line.width,
        };

        if start == 0 {
            if let Some(marker) = &block.marker {
                let width = self
                    .fonts
                    .measure_text_width(marker, block.marker_size, Emphasis::NONE);
                surface.place_text(TextSpan {
                    text: marker.clone(),
                    x: region.left,
                    baseline,
                    width,
                    font_size: block.marker_size,
                    bold: false,
                    italic: false,
                    underline: false,
                    color: Color::BLACK.to_array(),
                    link: None,
                });
            }
        }

        for (i, word) in block.words[start..line.end].iter().enumerate() {
            if i > 0 && word.space_before {
                x += self.space_width(word);
            }
            for segment in &word.segments {
                let width = self.segment_width(segment);
                surface.place_text(TextSpan {
                    text: segment.text.clone(),
                    x,
                    baseline,
                    width,
                    font_size: segment.style.size,
                    bold: segment.style.emphasis.bold,
                    italic: segment.style.emphasis.italic,
                    underline: segment.link.is_some(),
                    color: segment.style.color.to_array(),
                    link: segment.link.clone(),
                });
                x += width;
            }
        }
    }
}

impl ColumnFiller for ColumnText<'_> {
    fn fill(
        &mut self,
        region: &Rect,
        surface: &mut dyn PageSurface,
    ) -> Result<FillReport, FlowError> {
        let mut y = region.top;
        let mut placed = 0usize;

        while let Some(block) = self.blocks.get(self.offset.block) {
            if block.words.is_empty() {
                self.offset = ContentOffset {
                    block: self.offset.block + 1,
                    word: 0,
                };
                continue;
            }

            let start = self.offset.word;
            let spacing = if start == 0 && placed > 0 {
                block.spacing_before
            } else {
                0.0
            };
            let line = self.break_line(block, start, region.width() - block.indent);
            let bottom = y + spacing + line.height;
            if bottom > region.bottom {
                break;
            }

            self.place_line(block, start, &line, region, bottom, surface);
            placed += 1;
            y = bottom;

            self.offset = if line.end >= block.words.len() {
                ContentOffset {
                    block: self.offset.block + 1,
                    word: 0,
                }
            } else {
                ContentOffset {
                    block: self.offset.block,
                    word: line.end,
                }
            };
        }

        Ok(FillReport {
            consumed: placed,
            has_more: self.has_more(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{build_document, DocumentStyle};
    use crate::layout_config::{LayoutConfig, PageRecorder};

    fn fill_once(markup: &str, region: Rect) -> (FillReport, LayoutConfig) {
        let fonts = FontManager::default();
        let elements = build_document(markup, &DocumentStyle::body());
        let mut text = ColumnText::new(&fonts, &elements);
        let mut recorder = PageRecorder::new(&fonts, LayoutConfig::letter());
        let report = text.fill(&region, &mut recorder).unwrap();
        (report, recorder.finish())
    }

    #[test]
    fn words_keep_spaces_across_runs() {
        let elements = build_document(
            "<p>Body <strong>bold</strong> text.</p>",
            &DocumentStyle::body(),
        );
        let blocks = linearise(&elements);
        let words = &blocks[0].words;
        assert_eq!(words.len(), 3);
        assert!(!words[0].space_before);
        assert!(words[1].space_before);
        assert!(words[1].segments[0].style.emphasis.bold);
        assert!(words[2].space_before);
        assert_eq!(words[2].segments[0].text, "text.");
    }

    #[test]
    fn adjacent_runs_glue_into_one_word() {
        let elements = build_document("<p>un<em>believ</em>able</p>", &DocumentStyle::body());
        let blocks = linearise(&elements);
        assert_eq!(blocks[0].words.len(), 1);
        assert_eq!(blocks[0].words[0].segments.len(), 3);
    }

    #[test]
    fn line_break_starts_a_new_line() {
        let (report, layout) = fill_once("<p>one<br>two</p>", Rect::new(0.0, 0.0, 500.0, 500.0));
        assert_eq!(report.consumed, 2);
        let spans = &layout.pages[0].spans;
        assert!(spans[1].baseline > spans[0].baseline);
        assert_eq!(spans[1].x, 0.0);
    }

    #[test]
    fn everything_fits_in_a_large_region() {
        let (report, layout) = fill_once(
            "<h1>Title</h1><p>Body <strong>bold</strong> text.</p>",
            Rect::new(36.0, 54.0, 288.0, 756.0),
        );
        assert!(!report.has_more);
        assert_eq!(report.consumed, 2);
        let texts: Vec<&str> = layout.spans().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Title", "Body", "bold", "text."]);
        for span in layout.spans() {
            assert!(span.x >= 36.0 && span.x + span.width <= 288.0 + 0.01);
        }
    }

    #[test]
    fn narrow_region_wraps_lines() {
        let (report, layout) = fill_once(
            "<p>alpha beta gamma delta epsilon</p>",
            Rect::new(0.0, 0.0, 60.0, 500.0),
        );
        assert!(report.consumed > 1);
        let baselines: Vec<f32> = layout.spans().map(|s| s.baseline).collect();
        assert!(baselines.windows(2).any(|w| w[1] > w[0]));
    }

    #[test]
    fn short_region_leaves_content_for_the_next() {
        let fonts = FontManager::default();
        let elements = build_document("<p>one</p><p>two</p><p>three</p>", &DocumentStyle::body());
        let mut text = ColumnText::new(&fonts, &elements);
        let mut recorder = PageRecorder::new(&fonts, LayoutConfig::letter());

        // Body lines are 12 pt tall: room for two.
        let region = Rect::new(0.0, 0.0, 200.0, 25.0);
        let first = text.fill(&region, &mut recorder).unwrap();
        assert_eq!(first.consumed, 2);
        assert!(first.has_more);
        assert_eq!(text.offset(), ContentOffset { block: 2, word: 0 });

        let second = text.fill(&region, &mut recorder).unwrap();
        assert_eq!(second.consumed, 1);
        assert!(!second.has_more);
    }

    #[test]
    fn region_shorter_than_a_line_places_nothing() {
        let (report, layout) = fill_once("<p>tall</p>", Rect::new(0.0, 0.0, 200.0, 5.0));
        assert_eq!(report.consumed, 0);
        assert!(report.has_more);
        assert_eq!(layout.spans().count(), 0);
    }

    #[test]
    fn overlong_word_is_forced_onto_its_own_line() {
        let (report, _) = fill_once(
            "<p>supercalifragilisticexpialidocious</p>",
            Rect::new(0.0, 0.0, 20.0, 100.0),
        );
        assert_eq!(report.consumed, 1);
        assert!(!report.has_more);
    }

    #[test]
    fn ordered_list_items_get_numbers() {
        let (_, layout) = fill_once(
            "<ol><li>first</li><li>second</li></ol>",
            Rect::new(10.0, 0.0, 300.0, 500.0),
        );
        let texts: Vec<&str> = layout.spans().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["1.", "first", "2.", "second"]);
        let spans: Vec<&TextSpan> = layout.spans().collect();
        assert_eq!(spans[0].x, 10.0);
        assert_eq!(spans[1].x, 22.0);
    }

    #[test]
    fn unordered_list_has_no_symbol() {
        let (_, layout) = fill_once("<ul><li>item</li></ul>", Rect::new(0.0, 0.0, 300.0, 500.0));
        let texts: Vec<&str> = layout.spans().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["item"]);
    }

    #[test]
    fn anchor_text_is_underlined_and_linked() {
        let (_, layout) = fill_once(
            r#"<p>go <a href="http://x">there</a></p>"#,
            Rect::new(0.0, 0.0, 300.0, 500.0),
        );
        let link = layout.spans().find(|s| s.text == "there").unwrap();
        assert!(link.underline);
        assert_eq!(link.link.as_deref(), Some("http://x"));
        let plain = layout.spans().find(|s| s.text == "go").unwrap();
        assert!(!plain.underline);
    }

    #[test]
    fn centered_paragraph_is_centered() {
        let fonts = FontManager::default();
        let elements = build_document("<p>mid</p>", &DocumentStyle::info());
        let mut text = ColumnText::new(&fonts, &elements);
        let mut recorder = PageRecorder::new(&fonts, LayoutConfig::letter());
        text.fill(&Rect::new(0.0, 0.0, 100.0, 100.0), &mut recorder)
            .unwrap();
        let layout = recorder.finish();
        let span = &layout.pages[0].spans[0];
        let center = span.x + span.width / 2.0;
        assert!((center - 50.0).abs() < 0.01);
    }

    #[test]
    fn header_spacing_is_skipped_at_region_top() {
        let (_, layout) = fill_once("<h1>Top</h1><h2>Next</h2>", Rect::new(0.0, 0.0, 300.0, 500.0));
        let spans: Vec<&TextSpan> = layout.spans().collect();
        // 12 pt header: 18 pt line, no spacing before the first.
        assert!((spans[0].baseline - 18.0).abs() < 0.01);
        // Second header adds 20 pt spacing plus its own 18 pt line.
        assert!((spans[1].baseline - 56.0).abs() < 0.01);
    }

    #[test]
    fn fresh_column_has_pending_blocks() {
        let fonts = FontManager::default();
        let elements = build_document("<p>a</p><p>b</p>", &DocumentStyle::body());
        let text = ColumnText::new(&fonts, &elements);
        assert!(text.has_more());
        assert_eq!(text.blocks.len(), 2);
        assert_eq!(text.offset(), ContentOffset::default());
    }
}
