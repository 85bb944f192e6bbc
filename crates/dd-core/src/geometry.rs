//! Plain geometry helpers shared by hit testing, selection and rendering.
//!
//! All coordinates are scene space unless stated otherwise.

use kurbo::{Point, Rect};

/// Default slack, in scene units, for [`point_near_polyline`].
pub const POLYLINE_TOLERANCE: f64 = 1.0;

/// Euclidean length of the segment `a`–`b`.
pub fn segment_length(a: Point, b: Point) -> f64 {
    point_distance(a, b)
}

/// Euclidean distance between two points.
pub fn point_distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Approximate "is `p` on the polyline" test.
///
/// For each consecutive pair `(p1, p2)` the point qualifies when
/// `|p-p1| + |p-p2|` lies within `±tolerance` of `|p1-p2|`. This is a
/// degenerate-ellipse test, not a perpendicular distance: the accepted
/// region is widest at the segment midpoint and pinches at the endpoints.
/// A single-point polyline has no segments and never matches.
pub fn point_near_polyline(p: Point, points: &[Point], tolerance: f64) -> bool {
    points.windows(2).any(|pair| {
        let (p1, p2) = (pair[0], pair[1]);
        let via = point_distance(p, p1) + point_distance(p, p2);
        let direct = segment_length(p1, p2);
        via >= direct - tolerance && via <= direct + tolerance
    })
}

/// Axis-aligned bounding box of a point set.
///
/// A single point yields a zero-area box at that point. Returns `None`
/// only for an empty set.
pub fn bounding_box_of(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let mut bbox = Rect::from_points(*first, *first);
    for p in &points[1..] {
        bbox.x0 = bbox.x0.min(p.x);
        bbox.y0 = bbox.y0.min(p.y);
        bbox.x1 = bbox.x1.max(p.x);
        bbox.y1 = bbox.y1.max(p.y);
    }
    Some(bbox)
}

/// Inclusive bounds test: `x <= p.x <= x + w` and `y <= p.y <= y + h`.
pub fn rect_contains_point(p: Point, x: f64, y: f64, w: f64, h: f64) -> bool {
    p.x >= x && p.x <= x + w && p.y >= y && p.y <= y + h
}

/// Inclusive containment of `inner` in `outer` (both normalized).
pub fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
}

/// Rectangle spanned by two arbitrary corners, with `x0 <= x1` and `y0 <= y1`.
pub fn normalize_rect(a: Point, b: Point) -> Rect {
    Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}
