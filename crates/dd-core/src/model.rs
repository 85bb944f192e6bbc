//! Core shape model for the drawing surface.
//!
//! A `Scene` is a flat, ordered list of shapes. A shape's position in the
//! list is its paint order, mirrored in `stack_index`, which is renumbered
//! on every structural change so the indices always form `0..N`.
//! Shapes are addressed by their stable `ShapeId`; positions are only
//! meaningful for the current ordering.

use crate::geometry::bounding_box_of;
use crate::id::{ImageSourceId, ShapeId};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

// ─── Colors & Style ──────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let digits = hex
            .bytes()
            .map(hex_val)
            .collect::<Option<Vec<u8>>>()?;

        let channels: Vec<u8> = match digits.len() {
            3 | 4 => digits.iter().map(|d| d * 17).collect(),
            6 | 8 => digits.chunks(2).map(|p| p[0] << 4 | p[1]).collect(),
            _ => return None,
        };
        let alpha = channels.get(3).copied().unwrap_or(255);
        Some(Self::rgba(
            channels[0] as f32 / 255.0,
            channels[1] as f32 / 255.0,
            channels[2] as f32 / 255.0,
            alpha as f32 / 255.0,
        ))
    }

    /// 8-bit channels, rounded.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Emit as shortest valid hex string (alpha omitted when opaque).
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

/// Fill and stroke of one shape. Extents live on `ShapeKind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: Some(Color::WHITE),
            stroke_width: 2.0,
        }
    }
}

// ─── Shapes ──────────────────────────────────────────────────────────────

/// Variant payload of a shape.
///
/// The anchor in `Shape::position` is the top-left corner for `Rect` and
/// `Image`, the center for `Circle`, and the first point for `Polyline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    Rect { width: f64, height: f64 },
    Circle { radius: f64 },
    /// Scene-space points, append-only while being drawn.
    Polyline { points: Vec<Point> },
    Image {
        source: ImageSourceId,
        width: f64,
        height: f64,
    },
}

impl ShapeKind {
    /// Short lowercase tag, used as ID prefix.
    pub fn tag(&self) -> &'static str {
        match self {
            ShapeKind::Rect { .. } => "rect",
            ShapeKind::Circle { .. } => "circle",
            ShapeKind::Polyline { .. } => "polyline",
            ShapeKind::Image { .. } => "image",
        }
    }

    /// Human label used for generated display names.
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Rect { .. } => "Rectangle",
            ShapeKind::Circle { .. } => "Circle",
            ShapeKind::Polyline { .. } => "Line",
            ShapeKind::Image { .. } => "Image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub position: Point,
    /// Paint and hit-test priority; higher is on top.
    pub stack_index: usize,
    pub kind: ShapeKind,
    pub display_name: String,
    pub style: Style,
}

impl Shape {
    /// Create a shape with a fresh identity. `stack_index` and
    /// `display_name` are assigned by `Scene::push`.
    pub fn new(kind: ShapeKind, position: Point) -> Self {
        Self {
            id: ShapeId::next(),
            position,
            stack_index: 0,
            kind,
            display_name: String::new(),
            style: Style::default(),
        }
    }

    pub fn rect(origin: Point, width: f64, height: f64) -> Self {
        Self::new(ShapeKind::Rect { width, height }, origin)
    }

    pub fn circle(center: Point, radius: f64) -> Self {
        Self::new(ShapeKind::Circle { radius }, center)
    }

    /// A polyline seeded with a single point.
    pub fn polyline(seed: Point) -> Self {
        Self::new(ShapeKind::Polyline { points: vec![seed] }, seed)
    }

    pub fn image(source: ImageSourceId, origin: Point, width: f64, height: f64) -> Self {
        Self::new(
            ShapeKind::Image {
                source,
                width,
                height,
            },
            origin,
        )
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Kind-specific axis-aligned bounds in scene space.
    ///
    /// A polyline with a single point yields a zero-area box.
    pub fn bounds(&self) -> Rect {
        match &self.kind {
            ShapeKind::Rect { width, height }
            | ShapeKind::Image { width, height, .. } => {
                Rect::from_origin_size(self.position, (*width, *height))
            }
            ShapeKind::Circle { radius } => Rect::new(
                self.position.x - radius,
                self.position.y - radius,
                self.position.x + radius,
                self.position.y + radius,
            ),
            ShapeKind::Polyline { points } => bounding_box_of(points)
                .unwrap_or_else(|| Rect::from_points(self.position, self.position)),
        }
    }

    /// Shift the anchor and, for polylines, every point.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
        if let ShapeKind::Polyline { points } = &mut self.kind {
            for p in points.iter_mut() {
                *p += delta;
            }
        }
    }

    /// A copy of this shape shifted by `delta`.
    pub fn translated(&self, delta: Vec2) -> Self {
        let mut moved = self.clone();
        moved.translate(delta);
        moved
    }

    /// Polyline points, or `None` for other kinds.
    pub fn points(&self) -> Option<&[Point]> {
        match &self.kind {
            ShapeKind::Polyline { points } => Some(points.as_slice()),
            _ => None,
        }
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// Error returned by [`Scene::check_stack_order`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stack index {stack_index} at position {position} breaks the dense 0..N ordering")]
pub struct StackOrderError {
    pub position: usize,
    pub stack_index: usize,
}

/// The ordered collection of all shapes on the canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    shapes: Vec<Shape>,
    /// Monotonic counter for generated display names.
    serial: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Shapes in positional (paint) order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    pub fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id == id)
    }

    pub fn get_by_id(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn get_by_id_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.index_of(id).is_some()
    }

    /// Append a shape on top of the stack. Returns its position.
    pub fn push(&mut self, mut shape: Shape) -> usize {
        self.serial += 1;
        if shape.display_name.is_empty() {
            shape.display_name = format!("{} {}", shape.kind.label(), self.serial);
        }
        shape.stack_index = self.shapes.len();
        log::debug!("scene: push {} as {:?}", shape.id, shape.display_name);
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    /// Remove a shape by identity, renumbering the rest.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.index_of(id)?;
        let removed = self.shapes.remove(index);
        self.renumber();
        log::debug!("scene: removed {}", removed.id);
        Some(removed)
    }

    /// Remove every shape in `ids`. Returns how many were removed.
    pub fn remove_all(&mut self, ids: &[ShapeId]) -> usize {
        let before = self.shapes.len();
        self.shapes.retain(|s| !ids.contains(&s.id));
        self.renumber();
        before - self.shapes.len()
    }

    /// Replace the stored shape with the same identity.
    pub fn replace_shape(&mut self, shape: Shape) -> bool {
        match self.index_of(shape.id) {
            Some(index) => {
                let stack_index = self.shapes[index].stack_index;
                self.shapes[index] = Shape {
                    stack_index,
                    ..shape
                };
                true
            }
            None => false,
        }
    }

    pub fn translate(&mut self, id: ShapeId, delta: Vec2) -> bool {
        match self.get_by_id_mut(id) {
            Some(shape) => {
                shape.translate(delta);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    /// Move the shape at position `from` to position `to` (layer-list
    /// drag-and-drop). Every shape is renumbered.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.shapes.len() || to >= self.shapes.len() || from == to {
            return false;
        }
        let shape = self.shapes.remove(from);
        self.shapes.insert(to, shape);
        self.renumber();
        true
    }

    /// Move each listed shape one step toward the top, keeping the group's
    /// relative order.
    pub fn bring_forward(&mut self, ids: &[ShapeId]) -> bool {
        let mut changed = false;
        for i in (0..self.shapes.len().saturating_sub(1)).rev() {
            if ids.contains(&self.shapes[i].id) && !ids.contains(&self.shapes[i + 1].id) {
                self.shapes.swap(i, i + 1);
                changed = true;
            }
        }
        if changed {
            self.renumber();
        }
        changed
    }

    /// Move each listed shape one step toward the bottom.
    pub fn send_backward(&mut self, ids: &[ShapeId]) -> bool {
        let mut changed = false;
        for i in 1..self.shapes.len() {
            if ids.contains(&self.shapes[i].id) && !ids.contains(&self.shapes[i - 1].id) {
                self.shapes.swap(i, i - 1);
                changed = true;
            }
        }
        if changed {
            self.renumber();
        }
        changed
    }

    /// Lift the listed shapes above everything else.
    pub fn bring_to_front(&mut self, ids: &[ShapeId]) -> bool {
        let before = self.order();
        let (mut rest, lifted): (Vec<_>, Vec<_>) = std::mem::take(&mut self.shapes)
            .into_iter()
            .partition(|s| !ids.contains(&s.id));
        rest.extend(lifted);
        self.shapes = rest;
        self.renumber();
        before != self.order()
    }

    /// Drop the listed shapes below everything else.
    pub fn send_to_back(&mut self, ids: &[ShapeId]) -> bool {
        let before = self.order();
        let (mut lowered, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.shapes)
            .into_iter()
            .partition(|s| ids.contains(&s.id));
        lowered.extend(rest);
        self.shapes = lowered;
        self.renumber();
        before != self.order()
    }

    fn order(&self) -> Vec<ShapeId> {
        self.shapes.iter().map(|s| s.id).collect()
    }

    /// Reassign `stack_index` so it matches each shape's position.
    pub fn renumber(&mut self) {
        for (i, shape) in self.shapes.iter_mut().enumerate() {
            shape.stack_index = i;
        }
    }

    /// Verify that `stack_index` values form a permutation of `0..N`.
    pub fn check_stack_order(&self) -> Result<(), StackOrderError> {
        let mut seen = HashSet::with_capacity(self.shapes.len());
        for (position, shape) in self.shapes.iter().enumerate() {
            if shape.stack_index >= self.shapes.len() || !seen.insert(shape.stack_index) {
                return Err(StackOrderError {
                    position,
                    stack_index: shape.stack_index,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn three_rects() -> (Scene, [ShapeId; 3]) {
        let mut scene = Scene::new();
        let a = Shape::rect(Point::new(0.0, 0.0), 10.0, 10.0);
        let b = Shape::rect(Point::new(20.0, 0.0), 10.0, 10.0);
        let c = Shape::rect(Point::new(40.0, 0.0), 10.0, 10.0);
        let ids = [a.id, b.id, c.id];
        scene.push(a);
        scene.push(b);
        scene.push(c);
        (scene, ids)
    }

    fn stack_of(scene: &Scene) -> Vec<usize> {
        scene.iter().map(|s| s.stack_index).collect()
    }

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#FF8000").unwrap();
        assert_eq!(c.to_rgba8(), [255, 128, 0, 255]);
        assert_eq!(c.to_hex(), "#FF8000");

        let short = Color::from_hex("fff8").unwrap();
        assert_eq!(short.to_rgba8(), [255, 255, 255, 136]);
        assert_eq!(short.to_hex(), "#FFFFFF88");

        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("#GGGGGG").is_none());
    }

    #[test]
    fn push_assigns_dense_stack_and_names() {
        let (scene, _) = three_rects();
        assert_eq!(stack_of(&scene), vec![0, 1, 2]);
        assert_eq!(scene.get(0).unwrap().display_name, "Rectangle 1");
        assert_eq!(scene.get(2).unwrap().display_name, "Rectangle 3");
        assert!(scene.check_stack_order().is_ok());
    }

    #[test]
    fn reorder_renumbers_every_shape() {
        let (mut scene, [a, b, c]) = three_rects();
        assert!(scene.reorder(0, 2));
        let order: Vec<_> = scene.iter().map(|s| s.id).collect();
        assert_eq!(order, vec![b, c, a]);
        assert_eq!(stack_of(&scene), vec![0, 1, 2]);

        assert!(!scene.reorder(1, 1));
        assert!(!scene.reorder(0, 9));
    }

    #[test]
    fn remove_renumbers() {
        let (mut scene, [a, b, c]) = three_rects();
        assert!(scene.remove(b).is_some());
        assert_eq!(scene.iter().map(|s| s.id).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(stack_of(&scene), vec![0, 1]);
        assert!(scene.remove(b).is_none());
    }

    #[test]
    fn z_order_steps_keep_group_order() {
        let (mut scene, [a, b, c]) = three_rects();
        assert!(scene.bring_forward(&[a, b]));
        assert_eq!(scene.iter().map(|s| s.id).collect::<Vec<_>>(), vec![c, a, b]);
        assert!(!scene.bring_forward(&[a, b]));

        assert!(scene.send_backward(&[b]));
        assert_eq!(scene.iter().map(|s| s.id).collect::<Vec<_>>(), vec![c, b, a]);
        assert!(scene.check_stack_order().is_ok());
    }

    #[test]
    fn to_front_and_back() {
        let (mut scene, [a, b, c]) = three_rects();
        assert!(scene.bring_to_front(&[a]));
        assert_eq!(scene.iter().map(|s| s.id).collect::<Vec<_>>(), vec![b, c, a]);
        assert!(!scene.bring_to_front(&[a]));

        assert!(scene.send_to_back(&[c, a]));
        assert_eq!(scene.iter().map(|s| s.id).collect::<Vec<_>>(), vec![c, a, b]);
        assert_eq!(stack_of(&scene), vec![0, 1, 2]);
    }

    #[test]
    fn check_stack_order_reports_duplicates() {
        let (mut scene, [_, b, _]) = three_rects();
        scene.get_by_id_mut(b).unwrap().stack_index = 0;
        let err = scene.check_stack_order().unwrap_err();
        assert_eq!(err.position, 1);
        assert_eq!(
            err.to_string(),
            "stack index 0 at position 1 breaks the dense 0..N ordering"
        );
    }

    #[test]
    fn translate_moves_polyline_points() {
        let mut line = Shape::polyline(Point::new(1.0, 1.0));
        if let ShapeKind::Polyline { points } = &mut line.kind {
            points.push(Point::new(5.0, 3.0));
        }
        line.translate(Vec2::new(10.0, -1.0));
        assert_eq!(line.position, Point::new(11.0, 0.0));
        assert_eq!(
            line.points().unwrap(),
            &[Point::new(11.0, 0.0), Point::new(15.0, 2.0)]
        );
    }

    #[test]
    fn bounds_per_kind() {
        let r = Shape::rect(Point::new(50.0, 50.0), 40.0, 40.0);
        assert_eq!(r.bounds(), Rect::new(50.0, 50.0, 90.0, 90.0));

        let c = Shape::circle(Point::new(10.0, 10.0), 4.0);
        assert_eq!(c.bounds(), Rect::new(6.0, 6.0, 14.0, 14.0));

        let seed = Shape::polyline(Point::new(3.0, 3.0));
        assert_eq!(seed.bounds().area(), 0.0);
    }

    #[test]
    fn replace_keeps_stack_index() {
        let (mut scene, [_, b, _]) = three_rects();
        let moved = scene.get_by_id(b).unwrap().translated(Vec2::new(5.0, 5.0));
        assert!(scene.replace_shape(Shape {
            stack_index: 99,
            ..moved
        }));
        assert_eq!(scene.get_by_id(b).unwrap().stack_index, 1);
        assert_eq!(scene.get_by_id(b).unwrap().position, Point::new(25.0, 5.0));
    }
}
