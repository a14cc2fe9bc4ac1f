//! # Row Building
//!
//! Lower-level helpers for the sheet engine: axis mapping and the greedy
//! accumulation of one row of tags. The page loop lives in the parent module.

use serde::Serialize;

use crate::model::FlowDirection;

/// A tag rectangle in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    /// Extent along the flow direction.
    pub fn main(&self, flow: FlowDirection) -> f64 {
        match flow {
            FlowDirection::Row => self.width,
            FlowDirection::Column => self.height,
        }
    }

    /// Extent across the flow direction.
    pub fn cross(&self, flow: FlowDirection) -> f64 {
        match flow {
            FlowDirection::Row => self.height,
            FlowDirection::Column => self.width,
        }
    }
}

/// One row (or column, under column flow) of consecutive tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Index of the first tag in this run.
    pub start: usize,
    /// One past the last tag (exclusive end).
    pub end: usize,
    /// Sum of tag extents plus gaps along the flow axis.
    pub main_extent: f64,
    /// Largest tag extent across the flow axis.
    pub cross_extent: f64,
}

impl Run {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Accumulate tags from `start` into one run.
///
/// A tag joins while `run + gap + size <= available` (no gap before the first
/// tag). The first tag is always taken even if it alone overflows, so a tag
/// wider than the page still gets a run of its own and the caller always
/// makes progress.
pub fn build_run(
    sizes: &[Size],
    start: usize,
    flow: FlowDirection,
    gap: f64,
    available: f64,
) -> Run {
    let mut end = start;
    let mut main_extent = 0.0;
    let mut cross_extent: f64 = 0.0;

    for size in &sizes[start..] {
        let needed = if end == start {
            size.main(flow)
        } else {
            gap + size.main(flow)
        };
        if end > start && main_extent + needed > available {
            break;
        }
        main_extent += needed;
        cross_extent = cross_extent.max(size.cross(flow));
        end += 1;
    }

    Run {
        start,
        end,
        main_extent,
        cross_extent,
    }
}

/// Offsets of each tag along the flow axis, relative to the run origin.
pub fn run_offsets(sizes: &[Size], run: &Run, flow: FlowDirection, gap: f64) -> Vec<f64> {
    let mut offsets = Vec::with_capacity(run.len());
    let mut cursor = 0.0;
    for size in &sizes[run.start..run.end] {
        offsets.push(cursor);
        cursor += size.main(flow) + gap;
    }
    offsets
}
