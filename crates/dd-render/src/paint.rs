//! Scene → display list.
//!
//! The render pass is a pure function of its inputs: it never touches the
//! bitmap cache beyond reading it, and running it twice on the same state
//! yields the same frame. Image sources that missed the cache are reported
//! in `Frame::missing_images` for the caller to schedule.

use crate::cache::{BitmapCache, Lookup};
use crate::display::{DrawCmd, Frame, Primitive};
use dd_core::{Color, Rect, Scene, Shape, ShapeId, ShapeKind, Size, ViewTransform};

/// Colors for chrome the render pass draws itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub selection: Color,
    pub marquee_fill: Color,
    pub marquee_stroke: Color,
    pub placeholder: Color,
}

impl Theme {
    /// Dark canvas, the default.
    pub fn dark() -> Self {
        Self {
            background: Color::rgba(0.118, 0.118, 0.118, 1.0),
            selection: Color::rgba(0.310, 0.765, 0.969, 1.0),
            marquee_fill: Color::rgba(0.310, 0.765, 0.969, 0.12),
            marquee_stroke: Color::rgba(0.310, 0.765, 0.969, 0.8),
            placeholder: Color::rgba(0.525, 0.525, 0.545, 1.0),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::rgba(0.961, 0.961, 0.969, 1.0),
            selection: Color::rgba(0.0, 0.478, 1.0, 1.0),
            marquee_fill: Color::rgba(0.0, 0.478, 1.0, 0.08),
            marquee_stroke: Color::rgba(0.0, 0.478, 1.0, 0.7),
            placeholder: Color::rgba(0.525, 0.525, 0.545, 1.0),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

const HIGHLIGHT_WIDTH: f64 = 1.5;
const HIGHLIGHT_DASH: [f64; 2] = [6.0, 4.0];
const MARQUEE_DASH: [f64; 2] = [4.0, 4.0];

/// Everything one render pass reads.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub scene: &'a Scene,
    pub view: &'a ViewTransform,
    pub selection: &'a [ShapeId],
    /// Active marquee in surface space.
    pub marquee: Option<Rect>,
    /// Surface pixel size.
    pub surface: Size,
    pub theme: &'a Theme,
    /// Outset of the selection outline around a shape's bounds.
    pub selection_margin: f64,
}

/// Paint the scene into a fresh display list.
pub fn render_scene(input: &RenderInput<'_>, cache: &BitmapCache) -> Frame {
    let mut frame = Frame::default();

    frame.push(DrawCmd::Fill {
        primitive: Primitive::Rect(Rect::from_origin_size((0.0, 0.0), input.surface)),
        color: input.theme.background,
    });

    frame.push(DrawCmd::Save);
    frame.push(DrawCmd::Transform(input.view.affine()));

    let mut ordered: Vec<&Shape> = input.scene.iter().collect();
    ordered.sort_by_key(|shape| shape.stack_index);

    // Keep outline thickness constant on screen.
    let zoom = input.view.zoom;
    for shape in ordered {
        paint_shape(&mut frame, shape, cache, input.theme);
        if input.selection.contains(&shape.id) {
            frame.push(DrawCmd::Stroke {
                primitive: Primitive::Rect(
                    shape
                        .bounds()
                        .inflate(input.selection_margin, input.selection_margin),
                ),
                color: input.theme.selection,
                width: HIGHLIGHT_WIDTH / zoom,
                dash: Some([HIGHLIGHT_DASH[0] / zoom, HIGHLIGHT_DASH[1] / zoom]),
            });
        }
    }

    frame.push(DrawCmd::Restore);

    if let Some(marquee) = input.marquee {
        paint_marquee(&mut frame, marquee.abs(), input.theme);
    }

    log::trace!(
        "render: {} commands, {} missing images",
        frame.commands.len(),
        frame.missing_images.len()
    );
    frame
}

fn paint_shape(frame: &mut Frame, shape: &Shape, cache: &BitmapCache, theme: &Theme) {
    let style = &shape.style;
    let primitive = match &shape.kind {
        ShapeKind::Rect { .. } => Primitive::Rect(shape.bounds()),
        ShapeKind::Circle { radius } => Primitive::Circle {
            center: shape.position,
            radius: *radius,
        },
        ShapeKind::Polyline { points } => {
            // A lone seed point has nothing to draw yet.
            if points.len() < 2 {
                return;
            }
            Primitive::Polyline(points.clone())
        }
        ShapeKind::Image { source, .. } => {
            paint_image(frame, shape, *source, cache, theme);
            return;
        }
    };

    if let Some(fill) = style.fill
        && !matches!(primitive, Primitive::Polyline(_))
    {
        frame.push(DrawCmd::Fill {
            primitive: primitive.clone(),
            color: fill,
        });
    }
    if let Some(stroke) = style.stroke {
        frame.push(DrawCmd::Stroke {
            primitive,
            color: stroke,
            width: style.stroke_width,
            dash: None,
        });
    }
}

fn paint_image(
    frame: &mut Frame,
    shape: &Shape,
    source: dd_core::ImageSourceId,
    cache: &BitmapCache,
    theme: &Theme,
) {
    let rect = shape.bounds();
    match cache.lookup(source) {
        Lookup::Ready(bitmap) => frame.push(DrawCmd::Image {
            source,
            bitmap: bitmap.clone(),
            rect,
        }),
        Lookup::Failed(_) => {
            for primitive in [Primitive::Rect(rect), Primitive::Cross(rect)] {
                frame.push(DrawCmd::Stroke {
                    primitive,
                    color: theme.placeholder,
                    width: 1.0,
                    dash: None,
                });
            }
        }
        Lookup::Pending => {}
        Lookup::Missing => {
            if !frame.missing_images.contains(&source) {
                frame.missing_images.push(source);
            }
        }
    }
}

fn paint_marquee(frame: &mut Frame, rect: Rect, theme: &Theme) {
    if rect.width() < 1.0 && rect.height() < 1.0 {
        return;
    }
    frame.push(DrawCmd::Fill {
        primitive: Primitive::Rect(rect),
        color: theme.marquee_fill,
    });
    frame.push(DrawCmd::Stroke {
        primitive: Primitive::Rect(rect),
        color: theme.marquee_stroke,
        width: 1.0,
        dash: Some(MARQUEE_DASH),
    });
}
