pub mod geometry;
pub mod id;
pub mod model;
pub mod view;

pub use id::{ImageSourceId, ShapeId};
pub use model::*;
pub use view::{SurfaceMetrics, ViewTransform, ZoomDirection};

// Re-export kurbo geometry so downstream crates share one version
pub use kurbo::{Affine, Point, Rect, Size, Vec2};
