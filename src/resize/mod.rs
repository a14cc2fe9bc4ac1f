//! # Interactive Resize
//!
//! A drag gesture on a tag's handle, turned into new dimensions.
//!
//! The gesture owns everything transient: the start values, the last preview
//! and one [`SnapAxis`] per dimension. Pointer moves only update the preview.
//! Nothing reaches the durable state until [`ResizeGesture::finish`] consumes
//! the gesture and returns a [`ResizeCommit`], which the caller applies as a
//! command. Dropping or cancelling the gesture discards it, lock state and
//! all.

pub mod snap;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::model::{ItemId, PX_PER_CM};
use snap::{SnapAxis, SnapTuning};

/// Smallest width or height a single-axis drag can produce, in centimetres.
pub const MIN_TAG_SIZE: f64 = 0.5;
/// Height floor for proportional resizing.
pub const MIN_PROPORTIONAL_HEIGHT: f64 = 3.0;
/// Font-scale floor for proportional resizing.
pub const MIN_FONT_SCALE: f64 = 0.5;

/// Which handle is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragAxis {
    /// Right edge: width only.
    Width,
    /// Bottom edge: height only.
    Height,
    /// Corner: width drives height and font scale by the same ratio.
    Proportional,
}

/// What the gesture resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeTarget {
    /// One tag's overrides.
    Item(ItemId),
    /// The global default every tag inherits.
    Defaults,
}

/// Pointer position in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// The dimensions a resize gesture controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub font_scale: f64,
}

/// The final value of a gesture, ready to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeCommit {
    pub target: ResizeTarget,
    pub axis: DragAxis,
    pub dimensions: Dimensions,
}

/// An in-progress drag.
#[derive(Debug, Clone)]
pub struct ResizeGesture {
    target: ResizeTarget,
    axis: DragAxis,
    start: Dimensions,
    origin: Point,
    preview: Dimensions,
    width_snap: SnapAxis,
    height_snap: SnapAxis,
}

impl ResizeGesture {
    pub fn begin(target: ResizeTarget, axis: DragAxis, start: Dimensions, pointer: Point) -> Self {
        Self::with_tuning(target, axis, start, pointer, SnapTuning::default())
    }

    pub fn with_tuning(
        target: ResizeTarget,
        axis: DragAxis,
        start: Dimensions,
        pointer: Point,
        tuning: SnapTuning,
    ) -> Self {
        ResizeGesture {
            target,
            axis,
            start,
            origin: pointer,
            preview: start,
            width_snap: SnapAxis::new(tuning),
            height_snap: SnapAxis::new(tuning),
        }
    }

    pub fn target(&self) -> ResizeTarget {
        self.target
    }

    pub fn axis(&self) -> DragAxis {
        self.axis
    }

    /// The latest previewed dimensions.
    pub fn preview(&self) -> Dimensions {
        self.preview
    }

    /// Feed one pointer sample; returns the new preview.
    pub fn pointer_move(&mut self, pointer: Point, now: Instant) -> Dimensions {
        let dx = (pointer.x - self.origin.x) / PX_PER_CM;
        let dy = (pointer.y - self.origin.y) / PX_PER_CM;

        self.preview = match self.axis {
            DragAxis::Width => {
                let width = self.width_snap.evaluate(self.start.width + dx, now);
                Dimensions {
                    width: width.max(MIN_TAG_SIZE),
                    ..self.start
                }
            }
            DragAxis::Height => {
                let height = self.height_snap.evaluate(self.start.height + dy, now);
                Dimensions {
                    height: height.max(MIN_TAG_SIZE),
                    ..self.start
                }
            }
            DragAxis::Proportional => {
                let width = self
                    .width_snap
                    .evaluate(self.start.width + dx, now)
                    .max(MIN_TAG_SIZE);
                // A degenerate start cannot scale; only the width moves.
                let ratio = if self.start.width > 0.0 && self.start.width.is_finite() {
                    width / self.start.width
                } else {
                    1.0
                };
                Dimensions {
                    width,
                    height: (self.start.height * ratio).max(MIN_PROPORTIONAL_HEIGHT),
                    font_scale: (self.start.font_scale * ratio).max(MIN_FONT_SCALE),
                }
            }
        };
        self.preview
    }

    /// End the gesture, committing the last preview.
    pub fn finish(self) -> ResizeCommit {
        ResizeCommit {
            target: self.target,
            axis: self.axis,
            dimensions: self.preview,
        }
    }

    /// End the gesture without committing anything.
    pub fn cancel(self) {}
}
