//! Page geometry – where the header block, the body columns and the footer
//! sit on a page.

use crate::flow::{RegionLayout, Rect};

/// Height reserved for the info block under the title.
const INFO_HEIGHT: f32 = 68.0;
/// Aspect ratio of the cover image slot (width / height).
const IMAGE_ASPECT: f32 = 640.0 / 480.0;

/// Physical page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageSetup {
    /// US Letter with half-inch margins.
    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin: 36.0,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }

    /// Convert a PDF (bottom-left origin) box to a top-left origin [`Rect`].
    fn flipped(&self, llx: f32, lly: f32, urx: f32, ury: f32) -> Rect {
        Rect::new(llx, self.height - ury, urx, self.height - lly)
    }

    pub fn geometry(&self) -> PageGeometry {
        let m = self.margin;
        let w = self.content_width();
        let h = self.content_height();

        let header_h = h / 16.0;
        let image_h = header_h + m + INFO_HEIGHT;
        let image_w = image_h * IMAGE_ASPECT;
        let header_w = w - image_w;
        let title_h = image_h - INFO_HEIGHT;

        let left_x = (m, m + w / 2.0 - m / 2.0);
        let right_llx = m + w / 2.0 + m / 2.0;
        let right_x = (right_llx, right_llx + w / 2.0 - m);

        let first_top = m + h - (image_h - m / 2.0);
        let later_top = m + h - m / 2.0;

        let title_lly = self.height - (title_h + m / 2.0);
        let info_lly = self.height - image_h + 4.0;

        PageGeometry {
            title: self.flipped(m, title_lly, m + header_w, title_lly + title_h),
            info: self.flipped(m, info_lly, m + header_w, info_lly + INFO_HEIGHT),
            first_page: [
                self.flipped(left_x.0, m, left_x.1, first_top),
                self.flipped(right_x.0, m, right_x.1, first_top),
            ],
            later_pages: [
                self.flipped(left_x.0, m, left_x.1, later_top),
                self.flipped(right_x.0, m, right_x.1, later_top),
            ],
            footer: self.flipped(m, 0.0, w, m / 2.0),
        }
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::letter()
    }
}

/// Every fixed rectangle of the page, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Title and first sub-header, page 1 only.
    pub title: Rect,
    /// Second sub-header, page 1 only.
    pub info: Rect,
    /// Body columns under the header block.
    pub first_page: [Rect; 2],
    /// Full-height body columns on every later page.
    pub later_pages: [Rect; 2],
    pub footer: Rect,
}

impl PageGeometry {
    pub fn region_layout(&self) -> RegionLayout {
        RegionLayout::two_column(self.first_page, self.later_pages, self.footer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Footer;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn letter_columns() {
        let g = PageSetup::letter().geometry();
        let [left, right] = g.first_page;
        assert!(close(left.left, 36.0) && close(left.right, 288.0));
        assert!(close(right.left, 324.0) && close(right.right, 558.0));
        assert!(close(left.top, 167.0) && close(left.bottom, 756.0));
        assert!(close(left.height(), right.height()));

        let [later_left, later_right] = g.later_pages;
        assert!(close(later_left.top, 54.0) && close(later_left.bottom, 756.0));
        assert!(close(later_right.left, 324.0));
    }

    #[test]
    fn header_block_sits_above_the_columns() {
        let g = PageSetup::letter().geometry();
        assert!(close(g.title.top, 18.0) && close(g.title.bottom, 99.0));
        assert!(close(g.info.top, 77.0) && close(g.info.bottom, 145.0));
        assert!(g.info.bottom < g.first_page[0].top);
        assert!(g.title.right < 612.0 - 36.0);
    }

    #[test]
    fn footer_baseline_is_fifteen_points_above_the_bottom() {
        let g = PageSetup::letter().geometry();
        let (x, baseline) = Footer::new("f", 6.0).anchor(&g.footer);
        assert!(close(x, 288.0));
        assert!(close(baseline, 777.0));
    }

    #[test]
    fn region_layout_has_two_groups() {
        let layout = PageSetup::letter().geometry().region_layout();
        assert_eq!(layout.regions().len(), 4);
        assert_eq!(layout.first_subsequent_page_region(), 2);
        assert_eq!(layout.regions_per_page_group(), 2);
    }
}
