//! Hit testing: scene point or rectangle → shape positions.
//!
//! Results are positions into the current scene ordering, topmost first
//! (descending `stack_index`). Callers that keep a selection across
//! mutations should translate them to `ShapeId`s immediately.

use dd_core::geometry::{point_distance, point_near_polyline, rect_contains_point, rect_contains_rect};
use dd_core::{Point, Rect, Scene, Shape, ShapeKind};
use smallvec::SmallVec;

/// Positions of hit shapes. Point hits rarely exceed a handful.
pub type HitList = SmallVec<[usize; 4]>;

/// Every shape under scene point `p`, topmost first.
///
/// Rectangles and images use an inclusive box test, circles a radius test,
/// and polylines the loose [`point_near_polyline`] test with `tolerance`.
pub fn hit_test(scene: &Scene, p: Point, tolerance: f64) -> HitList {
    let mut hits: SmallVec<[(usize, usize); 4]> = scene
        .iter()
        .enumerate()
        .filter(|(_, shape)| shape_contains(shape, p, tolerance))
        .map(|(i, shape)| (i, shape.stack_index))
        .collect();
    hits.sort_by(|a, b| b.1.cmp(&a.1));
    hits.into_iter().map(|(i, _)| i).collect()
}

fn shape_contains(shape: &Shape, p: Point, tolerance: f64) -> bool {
    let origin = shape.position;
    match &shape.kind {
        ShapeKind::Rect { width, height } | ShapeKind::Image { width, height, .. } => {
            rect_contains_point(p, origin.x, origin.y, *width, *height)
        }
        ShapeKind::Circle { radius } => point_distance(p, origin) <= *radius,
        ShapeKind::Polyline { points } => point_near_polyline(p, points, tolerance),
    }
}

/// Shapes selected by a marquee `area` (scene space), topmost first.
///
/// Boxes (rectangles, images, circles) must lie fully inside the area;
/// a polyline qualifies as soon as any one of its points is inside.
/// A zero-area marquee selects nothing.
pub fn hit_test_rect(scene: &Scene, area: Rect) -> Vec<usize> {
    let area = area.abs();
    if area.area() == 0.0 {
        return Vec::new();
    }

    let mut hits: Vec<(usize, usize)> = scene
        .iter()
        .enumerate()
        .filter(|(_, shape)| marquee_selects(shape, area))
        .map(|(i, shape)| (i, shape.stack_index))
        .collect();
    hits.sort_by(|a, b| b.1.cmp(&a.1));
    hits.into_iter().map(|(i, _)| i).collect()
}

fn marquee_selects(shape: &Shape, area: Rect) -> bool {
    match &shape.kind {
        ShapeKind::Polyline { points } => points
            .iter()
            .any(|p| rect_contains_point(*p, area.x0, area.y0, area.width(), area.height())),
        _ => rect_contains_rect(area, shape.bounds()),
    }
}
