//! Pointer interaction modes.
//!
//! Exactly one mode is active at a time. Each variant carries the state its
//! gesture needs, so there is no combination of flags to keep consistent.

use dd_core::geometry::normalize_rect;
use dd_core::{Point, Rect, Shape, ShapeId, Vec2};

/// Straight-line lock for pen strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisLock {
    Horizontal,
    Vertical,
}

impl AxisLock {
    /// Lock to the axis with the larger displacement. Ties go vertical.
    pub fn from_delta(delta: Vec2) -> Self {
        if delta.x.abs() > delta.y.abs() {
            AxisLock::Horizontal
        } else {
            AxisLock::Vertical
        }
    }

    /// Snap `p` onto the locked axis through `from`.
    pub fn snap(self, from: Point, p: Point) -> Point {
        match self {
            AxisLock::Horizontal => Point::new(p.x, from.y),
            AxisLock::Vertical => Point::new(from.x, p.y),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    /// Pen stroke in progress on polyline `id`.
    Drawing {
        id: ShapeId,
        axis_lock: Option<AxisLock>,
    },
    /// Hand drag. `last` is in surface pixels.
    Panning { last: Point },
    /// Dragging the selection. `start` is in scene space; `originals` are
    /// the selected shapes as they were at gesture start.
    MovingSelection { start: Point, originals: Vec<Shape> },
    /// Rubber-band selection, corners in surface pixels.
    Marquee { start: Point, current: Point },
}

impl Interaction {
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "idle",
            Interaction::Drawing { .. } => "drawing",
            Interaction::Panning { .. } => "panning",
            Interaction::MovingSelection { .. } => "moving",
            Interaction::Marquee { .. } => "marquee",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// Normalized marquee rectangle in surface pixels, if one is active.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match self {
            Interaction::Marquee { start, current } => Some(normalize_rect(*start, *current)),
            _ => None,
        }
    }
}
