//! # Sheet Layout Engine
//!
//! Turns an ordered list of tag rectangles into an ordered list of pages.
//!
//! The algorithm is a single greedy pass that never looks back:
//!
//! 1. Open a page. Its orientation comes from the per-page override map or
//!    the global default. Usable area is the paper minus padding on both
//!    sides of each axis, clamped to at least 1 cm.
//! 2. Build a row from the cursor: take tags while they fit across the page.
//!    The first tag of a row is taken even when it alone is too wide.
//! 3. Ask whether the row fits below the rows already placed. If it does,
//!    commit it and advance the cursor. If not, close the page and retry the
//!    same row as the first row of the next page. A first row is always
//!    committed, however tall.
//! 4. Repeat until every tag is placed or the page ceiling is reached.
//!
//! There is no rebalancing and no reordering. The output is a pure function
//! of the input, which matters because it is recomputed on every render
//! rather than cached.

pub mod flow;
pub mod page_break;

use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{AppConfiguration, FlowDirection, ItemId, Orientation, OrientationMap, PaperSize, TagItem};
use flow::{build_run, run_offsets, Run, Size};
use page_break::{decide_row, RowDecision};

/// Hard ceiling on pages per layout pass.
pub const MAX_PAGES: usize = 100;

/// Smallest usable extent on either axis, whatever the padding says.
pub const MIN_USABLE_EXTENT: f64 = 1.0;

/// Everything the engine needs to know about the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetConfig {
    pub paper: PaperSize,
    pub padding_x: f64,
    pub padding_y: f64,
    pub gap_x: f64,
    pub gap_y: f64,
    /// Size used by tags that do not override width or height.
    pub default_width: f64,
    pub default_height: f64,
    pub flow: FlowDirection,
    pub orientations: OrientationMap,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig::from_configuration(&AppConfiguration::default())
    }
}

impl SheetConfig {
    pub fn from_configuration(config: &AppConfiguration) -> Self {
        SheetConfig {
            paper: config.paper,
            padding_x: config.sheet.padding_x,
            padding_y: config.sheet.padding_y,
            gap_x: config.sheet.gap_x,
            gap_y: config.sheet.gap_y,
            default_width: config.visual.tag_width,
            default_height: config.visual.tag_height,
            flow: config.sheet.flow,
            orientations: config.orientation_map(),
        }
    }

    /// Usable (width, height) inside the padding for one orientation.
    pub fn usable_area(&self, orientation: Orientation) -> (f64, f64) {
        let (w, h) = self.paper.dimensions(orientation);
        (
            (w - 2.0 * self.padding_x).max(MIN_USABLE_EXTENT),
            (h - 2.0 * self.padding_y).max(MIN_USABLE_EXTENT),
        )
    }

    /// The rectangle an item occupies: its own overrides, else the defaults.
    pub fn item_size(&self, item: &TagItem) -> Size {
        let style = item.style.as_ref();
        let width = style
            .and_then(|s| s.tag_width)
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(self.default_width);
        let height = style
            .and_then(|s| s.tag_height)
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or(self.default_height);
        Size::new(width, height)
    }

    fn gaps(&self) -> (f64, f64) {
        match self.flow {
            FlowDirection::Row => (self.gap_x, self.gap_y),
            FlowDirection::Column => (self.gap_y, self.gap_x),
        }
    }
}

/// The result of one layout pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetLayout {
    pub pages: Vec<LayoutPage>,
    /// True when the page ceiling stopped layout before every tag was placed.
    pub truncated: bool,
}

impl SheetLayout {
    /// Input indices on each page, in order.
    pub fn page_items(&self) -> Vec<Vec<usize>> {
        self.pages
            .iter()
            .map(|p| p.tags.iter().map(|t| t.item).collect())
            .collect()
    }

    pub fn orientations(&self) -> Vec<Orientation> {
        self.pages.iter().map(|p| p.orientation).collect()
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|p| p.tags.len()).sum()
    }

    /// Which page an input index landed on.
    pub fn page_of(&self, item: usize) -> Option<usize> {
        self.pages
            .iter()
            .position(|p| p.tags.iter().any(|t| t.item == item))
    }
}

/// One physical sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPage {
    pub index: usize,
    pub orientation: Orientation,
    /// Paper size in this page's orientation.
    pub width: f64,
    pub height: f64,
    pub rows: Vec<RowSpan>,
    pub tags: Vec<PlacedTag>,
}

/// A committed row: a contiguous slice of the input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSpan {
    pub start: usize,
    pub end: usize,
    /// Offset of the row from the top (or left, under column flow) of the
    /// usable area.
    pub offset: f64,
    pub extent: f64,
}

/// A positioned tag.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTag {
    /// Index into the input list.
    pub item: usize,
    pub id: Option<ItemId>,
    /// Row number within the page.
    pub row: usize,
    /// Absolute position on the page (top-left corner), in centimetres.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Lay out tag items.
pub fn layout(items: &[TagItem], config: &SheetConfig) -> SheetLayout {
    let sizes: Vec<Size> = items.iter().map(|item| config.item_size(item)).collect();
    let mut sheet = layout_sizes(&sizes, config);
    for page in &mut sheet.pages {
        for tag in &mut page.tags {
            tag.id = Some(items[tag.item].id);
        }
    }
    sheet
}

/// Lay out raw rectangles. Same algorithm as [`layout`], without identities.
pub fn layout_sizes(sizes: &[Size], config: &SheetConfig) -> SheetLayout {
    let mut sheet = SheetLayout::default();
    if sizes.is_empty() {
        return sheet;
    }

    let flow = config.flow;
    let (main_gap, cross_gap) = config.gaps();
    let mut cursor = 0;

    while cursor < sizes.len() {
        let index = sheet.pages.len();
        if index >= MAX_PAGES {
            warn!(
                placed = cursor,
                total = sizes.len(),
                "page ceiling of {} reached; remaining tags not laid out",
                MAX_PAGES
            );
            sheet.truncated = true;
            break;
        }

        let orientation = config.orientations.resolve(index);
        let (page_width, page_height) = config.paper.dimensions(orientation);
        let (usable_width, usable_height) = config.usable_area(orientation);
        let (main_available, cross_available) = match flow {
            FlowDirection::Row => (usable_width, usable_height),
            FlowDirection::Column => (usable_height, usable_width),
        };

        let mut page = LayoutPage {
            index,
            orientation,
            width: page_width,
            height: page_height,
            rows: Vec::new(),
            tags: Vec::new(),
        };
        let mut used = 0.0;

        while cursor < sizes.len() {
            let run = build_run(sizes, cursor, flow, main_gap, main_available);
            if decide_row(used, page.rows.len(), run.cross_extent, cross_gap, cross_available)
                == RowDecision::MoveToNextPage
            {
                break;
            }

            let offset = if page.rows.is_empty() {
                0.0
            } else {
                used + cross_gap
            };
            place_run(&mut page, sizes, &run, offset, config, main_gap);
            used = offset + run.cross_extent;
            cursor = run.end;
        }

        debug!(
            page = index,
            ?orientation,
            rows = page.rows.len(),
            tags = page.tags.len(),
            "page closed"
        );
        sheet.pages.push(page);
    }

    sheet
}

fn place_run(
    page: &mut LayoutPage,
    sizes: &[Size],
    run: &Run,
    offset: f64,
    config: &SheetConfig,
    main_gap: f64,
) {
    let row = page.rows.len();
    let offsets = run_offsets(sizes, run, config.flow, main_gap);

    for (i, main_offset) in (run.start..run.end).zip(offsets) {
        let size = sizes[i];
        let (x, y) = match config.flow {
            FlowDirection::Row => (config.padding_x + main_offset, config.padding_y + offset),
            FlowDirection::Column => (config.padding_x + offset, config.padding_y + main_offset),
        };
        page.tags.push(PlacedTag {
            item: i,
            id: None,
            row,
            x,
            y,
            width: size.width,
            height: size.height,
        });
    }

    page.rows.push(RowSpan {
        start: run.start,
        end: run.end,
        offset,
        extent: run.cross_extent,
    });
}

// ── Serializable layout geometry (for renderers / print surfaces) ──

/// Complete page geometry for a layout pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    pub pages: Vec<PageInfo>,
    pub truncated: bool,
}

/// Geometry of a single page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub index: usize,
    pub orientation: Orientation,
    pub width: f64,
    pub height: f64,
    pub rows: Vec<RowSpan>,
    pub tags: Vec<TagInfo>,
}

/// Geometry of one tag on a page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagInfo {
    pub item: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub row: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutInfo {
    pub fn from_layout(sheet: &SheetLayout) -> Self {
        LayoutInfo {
            pages: sheet
                .pages
                .iter()
                .map(|page| PageInfo {
                    index: page.index,
                    orientation: page.orientation,
                    width: page.width,
                    height: page.height,
                    rows: page.rows.clone(),
                    tags: page
                        .tags
                        .iter()
                        .map(|t| TagInfo {
                            item: t.item,
                            id: t.id,
                            row: t.row,
                            x: t.x,
                            y: t.y,
                            width: t.width,
                            height: t.height,
                        })
                        .collect(),
                })
                .collect(),
            truncated: sheet.truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config() -> SheetConfig {
        SheetConfig {
            paper: PaperSize::A4,
            padding_x: 1.0,
            padding_y: 1.0,
            gap_x: 0.4,
            gap_y: 0.6,
            default_width: 6.0,
            default_height: 4.0,
            flow: FlowDirection::Row,
            orientations: OrientationMap::default(),
        }
    }

    fn uniform(n: usize, w: f64, h: f64) -> Vec<Size> {
        vec![Size::new(w, h); n]
    }

    #[test]
    fn empty_input_gives_no_pages() {
        let sheet = layout_sizes(&[], &config());
        assert!(sheet.pages.is_empty());
        assert!(!sheet.truncated);
    }

    #[test]
    fn default_tags_fill_a4_rows() {
        // 19 cm usable: 6 + 0.4 + 6 + 0.4 + 6 = 18.8 fits three per row
        let sheet = layout_sizes(&uniform(7, 6.0, 4.0), &config());
        assert_eq!(sheet.pages.len(), 1);
        let rows: Vec<(usize, usize)> = sheet.pages[0].rows.iter().map(|r| (r.start, r.end)).collect();
        assert_eq!(rows, vec![(0, 3), (3, 6), (6, 7)]);
    }

    #[test]
    fn five_large_tags_span_two_pages() {
        let sheet = layout_sizes(&uniform(5, 10.0, 7.5), &config());
        assert_eq!(sheet.page_items(), vec![vec![0, 1, 2], vec![3, 4]]);
        let offsets: Vec<f64> = sheet.pages[0].rows.iter().map(|r| r.offset).collect();
        assert!((offsets[1] - 8.1).abs() < 1e-9);
        assert!((offsets[2] - 16.2).abs() < 1e-9);
    }

    #[test]
    fn positions_are_page_absolute() {
        let sheet = layout_sizes(&uniform(4, 6.0, 4.0), &config());
        let tags = &sheet.pages[0].tags;
        assert_eq!((tags[0].x, tags[0].y), (1.0, 1.0));
        assert!((tags[1].x - 7.4).abs() < 1e-9);
        assert!((tags[3].y - 5.6).abs() < 1e-9);
        assert_eq!(tags[3].row, 1);
    }

    #[test]
    fn oversized_tag_gets_its_own_row() {
        let sizes = vec![Size::new(2.0, 2.0), Size::new(50.0, 2.0), Size::new(2.0, 2.0)];
        let sheet = layout_sizes(&sizes, &config());
        let rows: Vec<(usize, usize)> = sheet.pages[0].rows.iter().map(|r| (r.start, r.end)).collect();
        assert_eq!(rows, vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn over_tall_tag_is_placed_alone_on_a_fresh_page() {
        let sizes = vec![Size::new(10.0, 5.0), Size::new(10.0, 60.0), Size::new(10.0, 5.0)];
        let sheet = layout_sizes(&sizes, &config());
        assert_eq!(sheet.page_items(), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn per_page_orientation_override() {
        let mut overrides = BTreeMap::new();
        overrides.insert(1, Orientation::Landscape);
        let config = SheetConfig {
            orientations: OrientationMap::new(Orientation::Portrait, overrides),
            ..config()
        };
        let sheet = layout_sizes(&uniform(40, 6.0, 4.0), &config);
        assert_eq!(
            sheet.orientations()[..3],
            [Orientation::Portrait, Orientation::Landscape, Orientation::Portrait]
        );
        // Portrait: 3 across x 6 down. Landscape 27.7 x 19: 4 across x 4 down.
        assert_eq!(sheet.pages[0].tags.len(), 18);
        assert_eq!(sheet.pages[1].tags.len(), 16);
        assert_eq!(sheet.pages[2].tags.len(), 6);
        assert_eq!(sheet.pages[1].width, 29.7);
    }

    #[test]
    fn degenerate_padding_is_clamped() {
        let config = SheetConfig {
            padding_x: 50.0,
            padding_y: 50.0,
            ..config()
        };
        let sheet = layout_sizes(&uniform(3, 6.0, 4.0), &config);
        assert_eq!(sheet.item_count(), 3);
        assert_eq!(sheet.pages.len(), 3);
    }

    #[test]
    fn page_ceiling_truncates() {
        let sheet = layout_sizes(&uniform(MAX_PAGES + 5, 30.0, 40.0), &config());
        assert_eq!(sheet.pages.len(), MAX_PAGES);
        assert!(sheet.truncated);
        assert_eq!(sheet.item_count(), MAX_PAGES);
    }

    #[test]
    fn column_flow_runs_down_then_across() {
        let config = SheetConfig {
            flow: FlowDirection::Column,
            ..config()
        };
        // 27.7 usable height: six 4 cm tags with 0.6 gaps take 27.0
        let sheet = layout_sizes(&uniform(8, 6.0, 4.0), &config);
        let page = &sheet.pages[0];
        assert_eq!(page.rows[0].end, 6);
        let seventh = &page.tags[6];
        assert!((seventh.x - 7.4).abs() < 1e-9);
        assert_eq!(seventh.y, 1.0);
    }

    #[test]
    fn item_overrides_change_size() {
        let mut item = TagItem::new("Big", "1", 10.0, 5.0);
        item.style = Some(crate::model::VisualOverrides {
            tag_width: Some(12.0),
            ..Default::default()
        });
        let size = config().item_size(&item);
        assert_eq!(size, Size::new(12.0, 4.0));
    }

    #[test]
    fn layout_carries_item_ids() {
        let items = vec![TagItem::new("A", "1", 1.0, 1.0), TagItem::new("B", "1", 1.0, 1.0)];
        let sheet = layout(&items, &config());
        assert_eq!(sheet.pages[0].tags[1].id, Some(items[1].id));
        assert_eq!(sheet.page_of(1), Some(0));
    }
}
