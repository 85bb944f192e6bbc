//! Replay a [`Frame`] onto a Vello scene.

use crate::display::{DrawCmd, Frame, Primitive};
use dd_core::Color;
use kurbo::{Affine, BezPath, Circle, Point, Rect, Stroke};
use peniko::{Blob, Fill, Image, ImageFormat};
use vello::Scene;

/// Encode every command of `frame` into `scene`, on top of `base`.
///
/// `base` maps surface pixels to the render target and is usually
/// `Affine::IDENTITY`. Unbalanced `Restore`s are ignored.
pub fn encode_frame(scene: &mut Scene, frame: &Frame, base: Affine) {
    let mut stack: Vec<Affine> = Vec::new();
    let mut current = base;

    for cmd in &frame.commands {
        match cmd {
            DrawCmd::Save => stack.push(current),
            DrawCmd::Restore => {
                if let Some(saved) = stack.pop() {
                    current = saved;
                }
            }
            DrawCmd::Transform(affine) => current *= *affine,
            DrawCmd::Fill { primitive, color } => {
                let color = to_peniko(*color);
                match primitive {
                    Primitive::Rect(rect) => scene.fill(Fill::NonZero, current, color, None, rect),
                    Primitive::Circle { center, radius } => scene.fill(
                        Fill::NonZero,
                        current,
                        color,
                        None,
                        &Circle::new(*center, *radius),
                    ),
                    // Open paths have no interior.
                    Primitive::Polyline(_) | Primitive::Cross(_) => {}
                }
            }
            DrawCmd::Stroke {
                primitive,
                color,
                width,
                dash,
            } => {
                let mut stroke = Stroke::new(*width);
                if let Some([on, off]) = dash {
                    stroke = stroke.with_dashes(0.0, [*on, *off]);
                }
                let color = to_peniko(*color);
                match primitive {
                    Primitive::Rect(rect) => scene.stroke(&stroke, current, color, None, rect),
                    Primitive::Circle { center, radius } => scene.stroke(
                        &stroke,
                        current,
                        color,
                        None,
                        &Circle::new(*center, *radius),
                    ),
                    Primitive::Polyline(points) => {
                        scene.stroke(&stroke, current, color, None, &polyline_path(points))
                    }
                    Primitive::Cross(rect) => {
                        scene.stroke(&stroke, current, color, None, &cross_path(*rect))
                    }
                }
            }
            DrawCmd::Image { bitmap, rect, .. } => {
                let image = Image::new(
                    Blob::new(bitmap.pixels.clone()),
                    ImageFormat::Rgba8,
                    bitmap.width,
                    bitmap.height,
                );
                let transform = current
                    * Affine::translate(rect.origin().to_vec2())
                    * Affine::scale_non_uniform(
                        rect.width() / bitmap.width as f64,
                        rect.height() / bitmap.height as f64,
                    );
                scene.draw_image(&image, transform);
            }
        }
    }

    if !stack.is_empty() {
        log::warn!("encode: frame left {} unbalanced Save(s)", stack.len());
    }
}

fn to_peniko(color: Color) -> peniko::Color {
    let [r, g, b, a] = color.to_rgba8();
    peniko::Color::from_rgba8(r, g, b, a)
}

fn polyline_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
    }
    path
}

fn cross_path(rect: Rect) -> BezPath {
    let mut path = BezPath::new();
    path.move_to((rect.x0, rect.y0));
    path.line_to((rect.x1, rect.y1));
    path.move_to((rect.x1, rect.y0));
    path.line_to((rect.x0, rect.y1));
    path
}
