//! Backend-neutral display list produced by the render pass.

use crate::cache::Bitmap;
use dd_core::{Affine, Color, ImageSourceId, Point, Rect};
use std::sync::Arc;

/// Geometry of a fill or stroke command.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect(Rect),
    Circle { center: Point, radius: f64 },
    /// Open polyline through the points, in order.
    Polyline(Vec<Point>),
    /// Both diagonals of a box (broken-image marker).
    Cross(Rect),
}

/// One drawing command. Transforms nest through `Save`/`Restore`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Save,
    Restore,
    /// Post-multiply the current transform.
    Transform(Affine),
    Fill {
        primitive: Primitive,
        color: Color,
    },
    Stroke {
        primitive: Primitive,
        color: Color,
        width: f64,
        /// `[on, off]` dash lengths; solid when `None`.
        dash: Option<[f64; 2]>,
    },
    /// Draw `bitmap` stretched over `rect`.
    Image {
        source: ImageSourceId,
        bitmap: Arc<Bitmap>,
        rect: Rect,
    },
}

/// Output of one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub commands: Vec<DrawCmd>,
    /// Image sources referenced by the scene that were not in the cache.
    pub missing_images: Vec<ImageSourceId>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub(crate) fn push(&mut self, cmd: DrawCmd) {
        self.commands.push(cmd);
    }
}
