use bevy::prelude::*;

use crate::input::leading_number;

/// Pixels per degree of longitude.
pub const LNG_SCALE: f64 = 10_000.0;
/// Pixels per degree of latitude.
pub const LAT_SCALE: f64 = 11_000.0;

pub const TULARE: GeoPoint = GeoPoint {
    lat: 36.2077,
    lng: -119.3473,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 300.0,
        }
    }
}

/// Flat local projection around `center`. Only meaningful within a few
/// kilometres of the center; no pole or antimeridian handling.
pub fn project(point: GeoPoint, center: GeoPoint, viewport: Viewport) -> ScreenPoint {
    ScreenPoint {
        x: viewport.width / 2.0 + (point.lng - center.lng) * LNG_SCALE,
        y: viewport.height / 2.0 - (point.lat - center.lat) * LAT_SCALE,
    }
}

/// Inverse of [`project`] for the same center and viewport.
pub fn unproject(screen: ScreenPoint, center: GeoPoint, viewport: Viewport) -> GeoPoint {
    let dx = screen.x - viewport.width / 2.0;
    let dy = screen.y - viewport.height / 2.0;
    GeoPoint {
        lat: center.lat - dy / LAT_SCALE,
        lng: center.lng + dx / LNG_SCALE,
    }
}

/// Focal point and size of the hotspot map.
#[derive(Resource, Debug, Clone, Copy)]
pub struct MapView {
    pub center: GeoPoint,
    pub viewport: Viewport,
    home: GeoPoint,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new(TULARE, Viewport::default())
    }
}

impl MapView {
    pub fn new(home: GeoPoint, viewport: Viewport) -> Self {
        Self {
            center: home,
            viewport,
            home,
        }
    }

    pub fn home(&self) -> GeoPoint {
        self.home
    }

    pub fn project(&self, point: GeoPoint) -> ScreenPoint {
        project(point, self.center, self.viewport)
    }

    pub fn unproject(&self, screen: ScreenPoint) -> GeoPoint {
        unproject(screen, self.center, self.viewport)
    }

    pub fn recenter(&mut self, center: GeoPoint) {
        self.center = center;
    }

    pub fn recenter_home(&mut self) {
        self.center = self.home;
    }

    /// Ignores non-positive or non-finite sizes.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return false;
        }
        self.viewport = Viewport { width, height };
        true
    }
}

/// Lenient coordinate parsing for form input: blank or garbage reads as 0.
pub fn parse_coordinate(input: &str) -> f64 {
    leading_number(input).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPSILON, "{} != {}", a, b);
    }

    #[test]
    fn project_center_lands_mid_viewport() {
        let viewport = Viewport {
            width: 400.0,
            height: 300.0,
        };
        let screen = project(TULARE, TULARE, viewport);
        assert_eq!(screen, ScreenPoint { x: 200.0, y: 150.0 });
    }

    #[test]
    fn project_north_east_moves_up_and_right() {
        let viewport = Viewport::default();
        let point = GeoPoint::new(TULARE.lat + 0.001, TULARE.lng + 0.001);
        let screen = project(point, TULARE, viewport);
        assert_close(screen.x, 200.0 + 10.0);
        assert_close(screen.y, 150.0 - 11.0);
    }

    #[test]
    fn unproject_inverts_project() {
        let viewport = Viewport {
            width: 375.0,
            height: 280.0,
        };
        let points = [
            GeoPoint::new(36.3302, -119.2921),
            GeoPoint::new(36.2077, -119.3473),
            GeoPoint::new(-33.8688, 151.2093),
            GeoPoint::new(0.0, 0.0),
        ];

        for point in points {
            let screen = project(point, TULARE, viewport);
            let back = unproject(screen, TULARE, viewport);
            assert!((back.lat - point.lat).abs() < 1e-6);
            assert!((back.lng - point.lng).abs() < 1e-6);
        }
    }

    #[test]
    fn unproject_viewport_origin_is_north_west_of_center() {
        let viewport = Viewport {
            width: 200.0,
            height: 220.0,
        };
        let corner = unproject(ScreenPoint { x: 0.0, y: 0.0 }, TULARE, viewport);
        assert_close(corner.lng, TULARE.lng - 0.01);
        assert_close(corner.lat, TULARE.lat + 0.01);
    }

    #[test]
    fn map_view_recenter_home_restores_home() {
        let mut view = MapView::default();
        view.recenter(GeoPoint::new(1.0, 2.0));
        assert_eq!(view.center, GeoPoint::new(1.0, 2.0));
        view.recenter_home();
        assert_eq!(view.center, TULARE);
    }

    #[test]
    fn map_view_resize_rejects_degenerate_sizes() {
        let mut view = MapView::default();
        assert!(!view.resize(0.0, 100.0));
        assert!(!view.resize(f64::NAN, 100.0));
        assert!(view.resize(640.0, 480.0));
        assert_eq!(view.viewport.width, 640.0);
        assert_eq!(view.project(view.center), ScreenPoint { x: 320.0, y: 240.0 });
    }

    #[test]
    fn parse_coordinate_defaults_to_zero() {
        assert_eq!(parse_coordinate(""), 0.0);
        assert_eq!(parse_coordinate("north"), 0.0);
        assert_eq!(parse_coordinate(" 36.5 "), 36.5);
        assert_eq!(parse_coordinate("-119.25"), -119.25);
        assert_eq!(parse_coordinate("36.2N"), 36.2);
    }
}
