//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use printpdf::*;

use crate::error::Error;
use crate::layout_config::{LayoutConfig, TextSpan};

/// Underline offset below the baseline, as a fraction of font size.
const UNDERLINE_OFFSET: f32 = 0.1;

/// Render a LayoutConfig into PDF bytes.
///
/// Spans are drawn with the builtin Helvetica family; anchor spans are
/// underlined in their text colour.
pub fn render_pdf(config: &LayoutConfig) -> Result<Vec<u8>, Error> {
    if config.page_width_pt <= 0.0 || config.page_height_pt <= 0.0 {
        return Err(Error::Render(format!(
            "Invalid page size {}x{} pt",
            config.page_width_pt, config.page_height_pt
        )));
    }

    let page_w = Mm(config.page_width_pt * 0.352778); // pt → mm
    let page_h = Mm(config.page_height_pt * 0.352778);

    let mut doc = PdfDocument::new(&config.title);
    let info = &mut doc.metadata.info;
    info.author = config.info.author.clone();
    info.subject = config.info.subject.clone();
    info.keywords = config.info.keywords.clone();
    info.creator = config.info.creator.clone();

    let mut pages = Vec::with_capacity(config.pages.len().max(1));
    for page_layout in &config.pages {
        let mut ops = Vec::new();
        for span in &page_layout.spans {
            render_span(&mut ops, span, config.page_height_pt);
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    // Ensure at least one page.
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    log::debug!("Rendering {} page(s)", pages.len());
    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());

    Ok(bytes)
}

fn builtin_font(span: &TextSpan) -> BuiltinFont {
    match (span.bold, span.italic) {
        (true, true) => BuiltinFont::HelveticaBoldOblique,
        (true, false) => BuiltinFont::HelveticaBold,
        (false, true) => BuiltinFont::HelveticaOblique,
        (false, false) => BuiltinFont::Helvetica,
    }
}

fn rgb(color: [f32; 4]) -> Color {
    Color::Rgb(Rgb {
        r: color[0],
        g: color[1],
        b: color[2],
        icc_profile: None,
    })
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

/// Emit the ops for one span. Layout uses a top-left origin; PDF uses
/// bottom-left.
fn render_span(ops: &mut Vec<Op>, span: &TextSpan, page_height: f32) {
    if span.text.is_empty() {
        return;
    }
    let font = builtin_font(span);
    let baseline = page_height - span.baseline;

    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(span.x),
            y: Pt(baseline),
        },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(span.font_size),
        font,
    });
    ops.push(Op::SetFillColor {
        col: rgb(span.color),
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(to_winansi(&span.text))],
        font,
    });
    ops.push(Op::EndTextSection);

    if span.underline {
        let underline_y = baseline - span.font_size * UNDERLINE_OFFSET;
        ops.push(Op::SetOutlineThickness { pt: Pt(0.5) });
        ops.push(Op::SetOutlineColor {
            col: rgb(span.color),
        });
        ops.push(Op::DrawLine {
            line: Line {
                points: vec![
                    point(span.x, underline_y),
                    point(span.x + span.width, underline_y),
                ],
                is_closed: false,
            },
        });
    }
}

/// Characters Windows-1252 places in 0x80-0x9F.
const WINANSI_EXTRAS: &[char] = &[
    '\u{20AC}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{017D}', '\u{2018}',
    '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}', '\u{02DC}',
    '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{017E}', '\u{0178}',
];

/// Restrict text to what builtin fonts can show. printpdf encodes the result
/// with WinAnsiEncoding; anything outside that repertoire becomes `?`.
fn to_winansi(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{00A0}' => ' ',
            c if (c as u32) < 0x80 || ('\u{00A1}'..='\u{00FF}').contains(&c) => c,
            c if WINANSI_EXTRAS.contains(&c) => c,
            _ => '?',
        })
        .collect()
}
