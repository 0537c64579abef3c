//! Region flow – pours an element sequence through a cyclic list of column
//! regions, stamping a footer and turning the page at fixed points.
//!
//! Page 1 has its own group of regions (two columns under the title block).
//! Every later page reuses one shared group. Measuring and placing text is
//! delegated to a [`ColumnFiller`]; footer text and page turns go to a
//! [`PageSurface`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout_config::TextSpan;

/// Index of the first region used on pages after the first.
pub const FIRST_SUBSEQUENT_PAGE_REGION: usize = 2;
/// Number of regions (columns) filled per page.
pub const REGIONS_PER_PAGE_GROUP: usize = 2;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle in page points, origin at the top-left corner
/// (`top < bottom`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }
}

/// The fixed, ordered list of content regions for one document plus the
/// footer region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionLayout {
    regions: Vec<Rect>,
    first_subsequent_page_region: usize,
    footer: Rect,
}

impl RegionLayout {
    /// `regions[..first_subsequent_page_region]` belong to page 1; the rest
    /// are reused by every following page.
    pub fn new(
        regions: Vec<Rect>,
        first_subsequent_page_region: usize,
        footer: Rect,
    ) -> Result<Self, FlowError> {
        if regions.is_empty() {
            return Err(FlowError::EmptyRegionList);
        }
        if first_subsequent_page_region >= regions.len() {
            return Err(FlowError::InvalidPageGroup {
                first: first_subsequent_page_region,
                regions: regions.len(),
            });
        }
        Ok(Self {
            regions,
            first_subsequent_page_region,
            footer,
        })
    }

    /// Two columns on page 1, two shared columns on every later page.
    pub fn two_column(first_page: [Rect; 2], later_pages: [Rect; 2], footer: Rect) -> Self {
        let mut regions = Vec::with_capacity(FIRST_SUBSEQUENT_PAGE_REGION + REGIONS_PER_PAGE_GROUP);
        regions.extend(first_page);
        regions.extend(later_pages);
        Self {
            regions,
            first_subsequent_page_region: FIRST_SUBSEQUENT_PAGE_REGION,
            footer,
        }
    }

    pub fn regions(&self) -> &[Rect] {
        &self.regions
    }

    pub fn footer(&self) -> &Rect {
        &self.footer
    }

    pub fn first_subsequent_page_region(&self) -> usize {
        self.first_subsequent_page_region
    }

    pub fn regions_per_page_group(&self) -> usize {
        self.regions.len() - self.first_subsequent_page_region
    }
}

/// Fixed text stamped at the bottom of every completed page.
#[derive(Debug, Clone, PartialEq)]
pub struct Footer {
    pub text: String,
    pub font_size: f32,
}

impl Footer {
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
        }
    }

    /// `(x, baseline)` of the centered footer inside `region`: horizontally
    /// centered, half a font size below the region's upper edge.
    pub fn anchor(&self, region: &Rect) -> (f32, f32) {
        (region.center_x(), region.top + self.font_size / 2.0)
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Result of filling one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillReport {
    /// Units of content placed (lines, for [`crate::column::ColumnText`]).
    pub consumed: usize,
    pub has_more: bool,
}

/// The drawing side of a page: placed text, fixed text and page turns.
pub trait PageSurface {
    /// Put one span of flowed text on the current page.
    fn place_text(&mut self, span: TextSpan);

    /// Draw `text` horizontally centered on `x` with its baseline at
    /// `baseline`.
    fn draw_centered(&mut self, text: &str, x: f32, baseline: f32, font_size: f32);

    /// Finish the current page and start a new one.
    fn new_page(&mut self);
}

/// Places as much remaining content as fits into a region.
///
/// The filler owns its content offset and advances it on every call.
pub trait ColumnFiller {
    fn fill(
        &mut self,
        region: &Rect,
        surface: &mut dyn PageSurface,
    ) -> Result<FillReport, FlowError>;
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    /// No content regions were configured.
    #[error("Region layout has no content regions")]
    EmptyRegionList,

    /// The subsequent-page group does not start inside the region list.
    #[error("Subsequent-page regions start at {first}, but only {regions} regions exist")]
    InvalidPageGroup { first: usize, regions: usize },

    /// Every region was tried without placing anything.
    #[error("Content at offset {offset} does not fit in any region (last tried region {region})")]
    Oversized { region: usize, offset: usize },
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Position of the flow: which region is next and how much content has
/// been placed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowCursor {
    pub region_index: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowState {
    Filling(usize),
    Done,
}

/// What a completed flow produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowSummary {
    pub pages: usize,
    pub fills: usize,
    pub footers: usize,
    pub cursor: FlowCursor,
}

/// Fill regions in order until the filler reports no more content.
///
/// After the last page-1 region, and after the last shared region, the
/// footer is drawn and a new page started; the shared group then repeats.
/// The page on which content runs out gets no footer.
pub fn flow_regions(
    filler: &mut dyn ColumnFiller,
    surface: &mut dyn PageSurface,
    layout: &RegionLayout,
    footer: &Footer,
) -> Result<FlowSummary, FlowError> {
    let regions = layout.regions();
    let first_subsequent = layout.first_subsequent_page_region();

    let mut cursor = FlowCursor::default();
    let mut state = FlowState::Filling(0);
    let mut summary = FlowSummary {
        pages: 1,
        fills: 0,
        footers: 0,
        cursor,
    };
    let mut stalled = 0usize;

    while let FlowState::Filling(index) = state {
        let report = filler.fill(&regions[index], surface)?;
        summary.fills += 1;
        cursor.offset += report.consumed;
        log::debug!(
            "Filled region {index}: {} placed, more={}",
            report.consumed,
            report.has_more
        );

        if !report.has_more {
            state = FlowState::Done;
            continue;
        }

        if report.consumed == 0 {
            stalled += 1;
            if stalled >= regions.len() {
                log::warn!("No region can hold the content at offset {}", cursor.offset);
                return Err(FlowError::Oversized {
                    region: index,
                    offset: cursor.offset,
                });
            }
        } else {
            stalled = 0;
        }

        let mut next = index + 1;
        if next == first_subsequent || next == regions.len() {
            let (x, baseline) = footer.anchor(layout.footer());
            surface.draw_centered(&footer.text, x, baseline, footer.font_size);
            surface.new_page();
            summary.footers += 1;
            summary.pages += 1;
            log::debug!("Started page {}", summary.pages);
            if next == regions.len() {
                next = first_subsequent;
            }
        }
        cursor.region_index = next;
        state = FlowState::Filling(next);
    }

    summary.cursor = cursor;
    Ok(summary)
}
