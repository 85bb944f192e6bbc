//! Pan/zoom view transform and pointer coordinate conversion.
//!
//! Three spaces are involved:
//!
//! - **client**: pointer coordinates as reported by input events
//! - **surface**: the render surface's own pixel grid (client scaled by the
//!   backing-store / layout size ratio, relative to the surface origin)
//! - **scene**: logical drawing coordinates, invariant under pan/zoom
//!
//! Rendering applies `translate(pan) · scale(zoom)` to go scene → surface;
//! [`ViewTransform::surface_to_scene`] is its exact inverse.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom multiplier for one wheel notch toward the viewer.
pub const ZOOM_IN_FACTOR: f64 = 1.1;
/// Zoom multiplier for one wheel notch away from the viewer.
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Where the render surface sits on screen and how large its pixel grid is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMetrics {
    /// Surface placement in client coordinates.
    pub client_rect: Rect,
    /// Backing-store size in pixels.
    pub pixel_size: Size,
}

impl SurfaceMetrics {
    pub fn new(client_rect: Rect, pixel_size: Size) -> Self {
        Self {
            client_rect,
            pixel_size,
        }
    }

    /// A surface at the client origin whose pixel grid matches its layout size.
    pub fn unscaled(width: f64, height: f64) -> Self {
        Self::new(
            Rect::new(0.0, 0.0, width, height),
            Size::new(width, height),
        )
    }

    /// Pixels per client unit on each axis. A collapsed layout box maps 1:1.
    fn scale(&self) -> Vec2 {
        let ratio = |pixels: f64, client: f64| if client > 0.0 { pixels / client } else { 1.0 };
        Vec2::new(
            ratio(self.pixel_size.width, self.client_rect.width()),
            ratio(self.pixel_size.height, self.client_rect.height()),
        )
    }

    pub fn client_to_surface(&self, p: Point) -> Point {
        let s = self.scale();
        Point::new(
            (p.x - self.client_rect.x0) * s.x,
            (p.y - self.client_rect.y0) * s.y,
        )
    }

    pub fn surface_to_client(&self, p: Point) -> Point {
        let s = self.scale();
        Point::new(
            p.x / s.x + self.client_rect.x0,
            p.y / s.y + self.client_rect.y0,
        )
    }

    /// Center of the pixel grid, in surface space.
    pub fn center(&self) -> Point {
        Point::new(self.pixel_size.width / 2.0, self.pixel_size.height / 2.0)
    }
}

/// Direction of a zoom gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Scrolling up (negative delta) zooms in.
    pub fn from_wheel(delta_y: f64) -> Self {
        if delta_y < 0.0 {
            ZoomDirection::In
        } else {
            ZoomDirection::Out
        }
    }
}

/// Pan offset (surface pixels) and zoom factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub pan: Vec2,
    pub zoom: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    /// Scene → surface transform used by the render pass.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    pub fn surface_to_scene(&self, p: Point) -> Point {
        ((p.to_vec2() - self.pan) / self.zoom).to_point()
    }

    pub fn scene_to_surface(&self, p: Point) -> Point {
        (p.to_vec2() * self.zoom + self.pan).to_point()
    }

    /// Map a pointer position to scene space.
    pub fn to_scene_space(&self, client: Point, surface: &SurfaceMetrics) -> Point {
        self.surface_to_scene(surface.client_to_surface(client))
    }

    /// Map a scene point back to pointer (client) coordinates.
    pub fn to_device_space(&self, scene: Point, surface: &SurfaceMetrics) -> Point {
        surface.surface_to_client(self.scene_to_surface(scene))
    }

    /// Hand-tool drag: shift by the raw surface-space pointer delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Set a new zoom while keeping the scene point under `anchor`
    /// (surface space) fixed on screen.
    pub fn zoom_about(&mut self, anchor: Point, new_zoom: f64) {
        let scene_anchor = self.surface_to_scene(anchor);
        self.zoom = new_zoom;
        self.pan = anchor.to_vec2() - scene_anchor.to_vec2() * new_zoom;
    }

    /// One zoom step about `anchor`, clamped to `[min_zoom, max_zoom]`.
    /// Swapped bounds are reordered; a step that would leave the zoom
    /// non-finite or non-positive is dropped.
    pub fn zoom_step(
        &mut self,
        anchor: Point,
        direction: ZoomDirection,
        factors: (f64, f64),
        min_zoom: f64,
        max_zoom: f64,
    ) {
        let (zoom_in, zoom_out) = factors;
        let factor = match direction {
            ZoomDirection::In => zoom_in,
            ZoomDirection::Out => zoom_out,
        };
        let (lo, hi) = (min_zoom.min(max_zoom), min_zoom.max(max_zoom));
        let new_zoom = (self.zoom * factor).max(lo).min(hi);
        if !(new_zoom.is_finite() && new_zoom > 0.0) {
            log::warn!("zoom step to {new_zoom} rejected");
            return;
        }
        self.zoom_about(anchor, new_zoom);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    fn hidpi_surface() -> SurfaceMetrics {
        // 400×300 layout box at (20, 40) backed by an 800×600 pixel grid.
        SurfaceMetrics::new(Rect::new(20.0, 40.0, 420.0, 340.0), Size::new(800.0, 600.0))
    }

    #[test]
    fn identity_view_maps_client_to_scene_directly() {
        let view = ViewTransform::default();
        let surface = SurfaceMetrics::unscaled(800.0, 600.0);
        let p = view.to_scene_space(Point::new(60.0, 60.0), &surface);
        assert!(close(p, Point::new(60.0, 60.0)));
    }

    #[test]
    fn scene_space_accounts_for_pixel_ratio_pan_and_zoom() {
        let view = ViewTransform {
            pan: Vec2::new(100.0, 50.0),
            zoom: 2.0,
        };
        let surface = hidpi_surface();
        // client (70, 90) → surface ((70-20)*2, (90-40)*2) = (100, 100)
        // scene = ((100-100)/2, (100-50)/2) = (0, 25)
        let p = view.to_scene_space(Point::new(70.0, 90.0), &surface);
        assert!(close(p, Point::new(0.0, 25.0)), "got {p:?}");
    }

    #[test]
    fn device_space_is_inverse_of_scene_space() {
        let surface = hidpi_surface();
        let views = [
            ViewTransform::default(),
            ViewTransform {
                pan: Vec2::new(-37.5, 12.25),
                zoom: 0.35,
            },
            ViewTransform {
                pan: Vec2::new(400.0, -900.0),
                zoom: 7.0,
            },
        ];
        let points = [
            Point::new(0.0, 0.0),
            Point::new(20.0, 40.0),
            Point::new(133.3, 77.7),
            Point::new(-50.0, 1000.0),
        ];
        for view in views {
            for p in points {
                let scene = view.to_scene_space(p, &surface);
                let back = view.to_device_space(scene, &surface);
                assert!(close(back, p), "{p:?} → {scene:?} → {back:?} under {view:?}");
            }
        }
    }

    #[test]
    fn affine_matches_scene_to_surface() {
        let view = ViewTransform {
            pan: Vec2::new(15.0, -4.0),
            zoom: 1.5,
        };
        let p = Point::new(10.0, 20.0);
        assert!(close(view.affine() * p, view.scene_to_surface(p)));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut view = ViewTransform {
            pan: Vec2::new(30.0, 10.0),
            zoom: 1.3,
        };
        let anchor = Point::new(250.0, 175.0);
        let before = view.surface_to_scene(anchor);

        view.zoom_step(anchor, ZoomDirection::In, (ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR), 0.1, 20.0);
        assert!((view.zoom - 1.43).abs() < EPS);
        assert!(close(view.scene_to_surface(before), anchor));

        view.zoom_step(anchor, ZoomDirection::Out, (ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR), 0.1, 20.0);
        assert!(close(view.scene_to_surface(before), anchor));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = ViewTransform::default();
        for _ in 0..100 {
            view.zoom_step(Point::ZERO, ZoomDirection::Out, (1.1, 0.9), 0.25, 4.0);
        }
        assert_eq!(view.zoom, 0.25);
    }

    #[test]
    fn swapped_zoom_bounds_do_not_panic() {
        let mut view = ViewTransform::default();
        view.zoom_step(Point::ZERO, ZoomDirection::In, (1.1, 0.9), 4.0, 2.0);
        assert_eq!(view.zoom, 2.0);

        view.zoom_step(Point::ZERO, ZoomDirection::In, (1.1, 0.9), f64::NAN, f64::NAN);
        assert!((view.zoom - 2.2).abs() < EPS);
    }

    #[test]
    fn pan_is_raw_delta() {
        let mut view = ViewTransform::default();
        view.pan_by(Vec2::new(5.0, -3.0));
        view.pan_by(Vec2::new(1.0, 1.0));
        assert_eq!(view.pan, Vec2::new(6.0, -2.0));
    }

    #[test]
    fn wheel_direction() {
        assert_eq!(ZoomDirection::from_wheel(-120.0), ZoomDirection::In);
        assert_eq!(ZoomDirection::from_wheel(120.0), ZoomDirection::Out);
    }
}
