//! Pipeline – ties together markup parsing, the header block, region flow
//! and rendering into a single function call.

use crate::column::ColumnText;
use crate::config::DocumentConfig;
use crate::document::{
    build_document, DocumentStyle, Element, Inline, Paragraph, ParagraphKind, TextRun,
};
use crate::error::Result;
use crate::flow::{flow_regions, ColumnFiller, Footer, Rect};
use crate::fonts::FontManager;
use crate::layout_config::{DocumentInfo, LayoutConfig, PageRecorder};
use crate::page::PageSetup;
use crate::render::render_pdf;
use crate::style::{Color, Emphasis, StyleState, TextAlign};

/// Fonts, page geometry and styles for one run of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub page: PageSetup,
    /// Style for the body markup.
    pub body_style: DocumentStyle,
    /// Style for the info block under the title.
    pub info_style: DocumentStyle,
    pub title_size: f32,
    pub sub_header_size: f32,
    pub footer_size: f32,
    /// Value of the document language entry.
    pub language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page: PageSetup::letter(),
            body_style: DocumentStyle::body(),
            info_style: DocumentStyle::info(),
            title_size: 16.0,
            sub_header_size: 8.0,
            footer_size: 6.0,
            language: "en".to_string(),
        }
    }
}

/// A centered, bold, dark gray single-run paragraph.
fn header_line(text: &str, size: f32) -> Option<Element> {
    if text.trim().is_empty() {
        return None;
    }
    let mut paragraph = Paragraph::new(ParagraphKind::Body, TextAlign::Center);
    paragraph.children.push(Inline::Run(TextRun {
        text: text.to_string(),
        style: StyleState {
            emphasis: Emphasis::BOLD,
            size,
            alignment: TextAlign::Center,
            color: Color::DARK_GRAY,
        },
    }));
    Some(Element::Paragraph(paragraph))
}

/// Fill `region` once with `elements`; whatever does not fit is dropped.
fn fill_fixed(
    fonts: &FontManager,
    elements: &[Element],
    region: &Rect,
    recorder: &mut PageRecorder<'_>,
    what: &str,
) -> Result<()> {
    if elements.is_empty() {
        return Ok(());
    }
    let mut text = ColumnText::new(fonts, elements);
    let report = text.fill(region, recorder)?;
    if report.has_more {
        log::warn!("{what} does not fit its header area; the overflow is dropped");
    }
    Ok(())
}

fn document_info(doc: &DocumentConfig, config: &PipelineConfig) -> DocumentInfo {
    DocumentInfo {
        author: doc.website.clone(),
        subject: doc.title.clone(),
        keywords: doc.keyword_list(),
        creator: doc.creator.clone(),
        language: config.language.clone(),
    }
}

/// Lay out a document with explicit font metrics.
pub fn compute_layout_with_fonts(
    doc: &DocumentConfig,
    config: &PipelineConfig,
    fonts: &FontManager,
) -> Result<LayoutConfig> {
    let geometry = config.page.geometry();

    let mut layout = LayoutConfig::letter();
    layout.page_width_pt = config.page.width;
    layout.page_height_pt = config.page.height;
    layout.title = doc.document_title();
    layout.info = document_info(doc, config);

    for url in [&doc.image_url, &doc.overlay_url] {
        if !url.is_empty() {
            log::info!("Skipping cover image {url}");
        }
    }

    let mut recorder = PageRecorder::new(fonts, layout);

    // 1. Header block, page 1 only
    let title: Vec<Element> = [
        header_line(&doc.title, config.title_size),
        header_line(&doc.sub_header1, config.sub_header_size),
    ]
    .into_iter()
    .flatten()
    .collect();
    fill_fixed(fonts, &title, &geometry.title, &mut recorder, "Title")?;

    let info = build_document(&doc.sub_header2, &config.info_style);
    fill_fixed(fonts, &info, &geometry.info, &mut recorder, "Sub-header")?;

    // 2. Body, flowed through the columns
    let body = build_document(&doc.body, &config.body_style);
    let mut column = ColumnText::new(fonts, &body);
    let footer = Footer::new(doc.footer.clone(), config.footer_size);
    let summary = flow_regions(
        &mut column,
        &mut recorder,
        &geometry.region_layout(),
        &footer,
    )?;
    log::debug!(
        "Flowed {} element(s) over {} page(s) in {} fill(s)",
        body.len(),
        summary.pages,
        summary.fills
    );

    Ok(recorder.finish())
}

/// Lay out a document with the default heuristic metrics (no rendering).
pub fn compute_layout(doc: &DocumentConfig, config: &PipelineConfig) -> Result<LayoutConfig> {
    compute_layout_with_fonts(doc, config, &FontManager::default())
}

/// Full pipeline: document config → PDF bytes.
///
/// Returns `(pdf_bytes, layout_config)`.
pub fn generate_pdf(
    doc: &DocumentConfig,
    config: &PipelineConfig,
) -> Result<(Vec<u8>, LayoutConfig)> {
    generate_pdf_with_fonts(doc, config, &FontManager::default())
}

/// [`generate_pdf`] with line breaking measured by `fonts`.
pub fn generate_pdf_with_fonts(
    doc: &DocumentConfig,
    config: &PipelineConfig,
    fonts: &FontManager,
) -> Result<(Vec<u8>, LayoutConfig)> {
    let layout = compute_layout_with_fonts(doc, config, fonts)?;
    let bytes = render_pdf(&layout)?;
    Ok((bytes, layout))
}

/// Convenience: parse a JSON document config and render it with defaults.
pub fn generate_pdf_from_json(json: &str) -> Result<Vec<u8>> {
    let doc = DocumentConfig::from_json(json)?;
    let (bytes, _) = generate_pdf(&doc, &PipelineConfig::default())?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> DocumentConfig {
        DocumentConfig {
            title: "Keto Basics".into(),
            website: "example.com".into(),
            keywords: "keto, diet".into(),
            creator: "press".into(),
            sub_header1: "A short guide".into(),
            sub_header2: "<p>By <strong>someone</strong></p>".into(),
            body: body.into(),
            footer: "example.com".into(),
            ..Default::default()
        }
    }

    #[test]
    fn pipeline_basic() {
        let (bytes, layout) =
            generate_pdf(&doc("<h1>Hello</h1><p>World</p>"), &PipelineConfig::default()).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(layout.pages.len(), 1);
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn metadata_is_mapped() {
        let layout = compute_layout(&doc("<p>x</p>"), &PipelineConfig::default()).unwrap();
        assert_eq!(layout.title, "example.com - Keto Basics");
        assert_eq!(layout.info.author, "example.com");
        assert_eq!(layout.info.subject, "Keto Basics");
        assert_eq!(layout.info.keywords, vec!["keto", "diet"]);
        assert_eq!(layout.info.creator, "press");
        assert_eq!(layout.info.language, "en");
    }

    #[test]
    fn header_block_is_styled() {
        let layout = compute_layout(&doc(""), &PipelineConfig::default()).unwrap();
        let geometry = PageSetup::letter().geometry();

        let title = layout.spans().find(|s| s.text == "Keto").unwrap();
        assert_eq!(title.font_size, 16.0);
        assert!(title.bold);
        assert_eq!(title.color, Color::DARK_GRAY.to_array());
        assert!(title.baseline > geometry.title.top && title.baseline <= geometry.title.bottom);

        let guide = layout.spans().find(|s| s.text == "guide").unwrap();
        assert_eq!(guide.font_size, 8.0);

        let info = layout.spans().find(|s| s.text == "someone").unwrap();
        assert!(info.bold);
        assert!(info.baseline > geometry.info.top && info.baseline <= geometry.info.bottom);
    }

    #[test]
    fn body_starts_in_the_first_column() {
        let layout = compute_layout(&doc("<p>Body</p>"), &PipelineConfig::default()).unwrap();
        let geometry = PageSetup::letter().geometry();
        let body = layout.spans().find(|s| s.text == "Body").unwrap();
        let column = geometry.first_page[0];
        assert_eq!(body.x, column.left);
        assert!(body.baseline > column.top && body.baseline <= column.bottom);
    }

    #[test]
    fn empty_body_is_a_single_page() {
        let layout =
            compute_layout(&DocumentConfig::default(), &PipelineConfig::default()).unwrap();
        assert_eq!(layout.pages.len(), 1);
        assert_eq!(layout.spans().count(), 0);
    }

    #[test]
    fn generate_from_json() {
        let bytes = generate_pdf_from_json(r#"{"title":"T","body":"<p>hi</p>"}"#).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert!(generate_pdf_from_json("nope").is_err());
    }

    #[test]
    fn default_metrics_match_the_plain_pipeline() {
        let doc = doc("<p>Some words that wrap across the column.</p>");
        let config = PipelineConfig::default();
        let (_, plain) = generate_pdf(&doc, &config).unwrap();
        let (bytes, measured) =
            generate_pdf_with_fonts(&doc, &config, &FontManager::default()).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert_eq!(plain.to_json(), measured.to_json());
    }
}
