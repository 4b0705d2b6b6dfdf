use crate::core::constants::{
    DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, EARTH_RADIUS_M, MAX_PITCH, MIN_PITCH, TILE_SIZE,
};
use crate::core::geo::{EdgePadding, LatLng, LatLngBounds, Point, ScreenRect};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Camera state in logical units: center, zoom, bearing, pitch and view size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// Rotation in degrees, clockwise from north
    pub bearing: f64,
    /// Tilt in degrees
    pub pitch: f64,
    /// The size of the viewport in logical pixels
    pub size: Point,
    /// Insets that shift the visual center away from the geometric one
    pub padding: EdgePadding,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM),
            bearing: 0.0,
            pitch: 0.0,
            size,
            padding: EdgePadding::default(),
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }

    /// Sets the center, clamping latitude to the projectable range
    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(LatLng::clamp_lat(center.lat), center.lng);
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    pub fn set_pitch(&mut self, pitch: f64) {
        if pitch.is_finite() {
            self.pitch = pitch.clamp(MIN_PITCH, MAX_PITCH);
        }
    }

    /// Sets the bearing, normalized into `[0, 360)`
    pub fn set_bearing(&mut self, bearing: f64) {
        if bearing.is_finite() {
            let normalized = bearing.rem_euclid(360.0);
            self.bearing = if normalized >= 360.0 { 0.0 } else { normalized };
        }
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Sets the minimum zoom; the current zoom and maximum follow if needed
    pub fn set_min_zoom(&mut self, min_zoom: f64) {
        if !min_zoom.is_finite() {
            return;
        }
        self.min_zoom = min_zoom.clamp(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM);
        if self.max_zoom < self.min_zoom {
            self.max_zoom = self.min_zoom;
        }
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Sets the maximum zoom; the current zoom and minimum follow if needed
    pub fn set_max_zoom(&mut self, max_zoom: f64) {
        if !max_zoom.is_finite() {
            return;
        }
        self.max_zoom = max_zoom.clamp(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM);
        if self.min_zoom > self.max_zoom {
            self.min_zoom = self.max_zoom;
        }
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Gets the scale factor for the current zoom level
    pub fn scale(&self) -> f64 {
        2_f64.powf(self.zoom)
    }

    pub fn set_scale(&mut self, scale: f64) {
        if scale > 0.0 {
            self.set_zoom(scale.log2());
        }
    }

    /// World size in logical pixels at the given zoom
    pub fn world_size(zoom: f64) -> f64 {
        TILE_SIZE * 2_f64.powf(zoom)
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level
    pub fn project(lat_lng: &LatLng, zoom: f64) -> Point {
        let world = Self::world_size(zoom);
        let lat = LatLng::clamp_lat(lat_lng.lat).to_radians();
        let x = (lat_lng.lng + 180.0) / 360.0 * world;
        let y = (1.0 - (PI / 4.0 + lat / 2.0).tan().ln() / PI) / 2.0 * world;
        Point::new(x, y)
    }

    /// Unprojects world pixel coordinates back to LatLng at the given zoom level
    pub fn unproject(point: &Point, zoom: f64) -> LatLng {
        let world = Self::world_size(zoom);
        let lng = point.x / world * 360.0 - 180.0;
        let n = PI - 2.0 * PI * point.y / world;
        let lat = (0.5 * (n.exp() - (-n).exp())).atan().to_degrees();
        LatLng::new(lat, lng)
    }

    /// Screen position of the camera center, honoring content padding
    pub fn visual_center(&self) -> Point {
        Point::new(
            self.padding.left + (self.size.x - self.padding.left - self.padding.right) / 2.0,
            self.padding.top + (self.size.y - self.padding.top - self.padding.bottom) / 2.0,
        )
    }

    /// Converts a geographical coordinate to screen pixel coordinates
    pub fn pixel_for_lat_lng(&self, lat_lng: &LatLng) -> Point {
        let world = Self::project(lat_lng, self.zoom);
        let origin = Self::project(&self.center, self.zoom);
        let offset = world.subtract(&origin).rotate(-self.bearing.to_radians());
        self.visual_center().add(&offset)
    }

    /// Converts screen pixel coordinates back to geographical coordinates
    pub fn lat_lng_for_pixel(&self, pixel: &Point) -> LatLng {
        let offset = pixel
            .subtract(&self.visual_center())
            .rotate(self.bearing.to_radians());
        let origin = Self::project(&self.center, self.zoom);
        Self::unproject(&origin.add(&offset), self.zoom)
    }

    /// Pans so screen content moves by `delta`
    pub fn move_by(&mut self, delta: Point) {
        let target = self.visual_center().subtract(&delta);
        let center = self.lat_lng_for_pixel(&target);
        self.set_center(center);
    }

    /// Changes zoom keeping `anchor` fixed on screen, or around the center when `None`
    pub fn zoom_around(&mut self, zoom: f64, anchor: Option<Point>) {
        match anchor {
            Some(anchor) => {
                let pinned = self.lat_lng_for_pixel(&anchor);
                self.set_zoom(zoom);
                self.pin(&pinned, &anchor);
            }
            None => self.set_zoom(zoom),
        }
    }

    /// Changes bearing keeping `anchor` fixed on screen, or around the center when `None`
    pub fn rotate_around(&mut self, bearing: f64, anchor: Option<Point>) {
        match anchor {
            Some(anchor) => {
                let pinned = self.lat_lng_for_pixel(&anchor);
                self.set_bearing(bearing);
                self.pin(&pinned, &anchor);
            }
            None => self.set_bearing(bearing),
        }
    }

    /// Re-centers so that `lat_lng` lands on `screen`
    fn pin(&mut self, lat_lng: &LatLng, screen: &Point) {
        let drift = self.pixel_for_lat_lng(lat_lng).subtract(screen);
        let center = self.lat_lng_for_pixel(&self.visual_center().add(&drift));
        self.set_center(center);
    }

    /// Bearing change (degrees) of a drag from `start` to `end` around the visual center
    pub fn bearing_delta(&self, start: &Point, end: &Point) -> f64 {
        let center = self.visual_center();
        let first = start.subtract(&center);
        let second = end.subtract(&center);
        let cross = first.x * second.y - first.y * second.x;
        let dot = first.x * second.x + first.y * second.y;
        -cross.atan2(dot).to_degrees()
    }

    /// Fits the camera to contain the given bounds inside `padding`
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: &ScreenRect, bearing: f64) {
        self.set_bearing(bearing);
        let nw = Self::project(&LatLng::new(bounds.north_east.lat, bounds.south_west.lng), 0.0);
        let se = Self::project(&LatLng::new(bounds.south_west.lat, bounds.north_east.lng), 0.0);
        let span_x = (se.x - nw.x).abs().max(f64::EPSILON);
        let span_y = (se.y - nw.y).abs().max(f64::EPSILON);

        let available_x = (self.size.x - padding.left - padding.right).max(1.0);
        let available_y = (self.size.y - padding.top - padding.bottom).max(1.0);
        let scale = (available_x / span_x).min(available_y / span_y);

        let center_world = Point::new(
            (nw.x + se.x) / 2.0 - (padding.left - padding.right) / (2.0 * scale),
            (nw.y + se.y) / 2.0 - (padding.top - padding.bottom) / (2.0 * scale),
        );
        self.set_center(Self::unproject(&center_world, 0.0));
        self.set_zoom(scale.log2());
    }

    /// Gets the resolution in meters per pixel at the given latitude and zoom
    pub fn meters_per_pixel_at_latitude(lat: f64, zoom: f64) -> f64 {
        let lat = LatLng::clamp_lat(lat).to_radians();
        lat.cos() * 2.0 * PI * EARTH_RADIUS_M / Self::world_size(zoom)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(LatLng::new(40.7128, -74.0060), 10.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_non_finite_zoom_limits_ignored() {
        let mut viewport = viewport();
        viewport.set_min_zoom(f64::NAN);
        viewport.set_max_zoom(f64::INFINITY);
        viewport.set_max_zoom(f64::NAN);
        assert_eq!(viewport.min_zoom, DEFAULT_MIN_ZOOM);
        assert_eq!(viewport.max_zoom, DEFAULT_MAX_ZOOM);
        assert_eq!(viewport.zoom, 10.0);
    }

    #[test]
    fn test_center_projects_to_visual_center() {
        let viewport = viewport();
        let pixel = viewport.pixel_for_lat_lng(&viewport.center);
        assert!((pixel.x - 400.0).abs() < 1e-6);
        assert!((pixel.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_coordinate_conversion_round_trip() {
        let mut viewport = viewport();
        viewport.set_bearing(30.0);
        let target = LatLng::new(40.75, -73.98);
        let pixel = viewport.pixel_for_lat_lng(&target);
        let back = viewport.lat_lng_for_pixel(&pixel);
        assert!((back.lat - target.lat).abs() < 1e-9);
        assert!((back.lng - target.lng).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();
        viewport.set_min_zoom(2.0);
        viewport.set_max_zoom(15.0);

        viewport.set_zoom(1.0);
        assert_eq!(viewport.zoom, 2.0);

        viewport.set_zoom(20.0);
        assert_eq!(viewport.zoom, 15.0);
    }

    #[test]
    fn test_zoom_around_anchor_keeps_anchor_fixed() {
        let mut viewport = viewport();
        let anchor = Point::new(100.0, 120.0);
        let pinned = viewport.lat_lng_for_pixel(&anchor);
        viewport.zoom_around(12.0, Some(anchor));
        let after = viewport.pixel_for_lat_lng(&pinned);
        assert!((after.x - anchor.x).abs() < 1e-6);
        assert!((after.y - anchor.y).abs() < 1e-6);
        assert_eq!(viewport.zoom, 12.0);
    }

    #[test]
    fn test_move_by() {
        let mut viewport = viewport();
        let original = viewport.center;
        viewport.move_by(Point::new(100.0, 0.0));
        // content moved right, so the camera looks further west
        assert!(viewport.center.lng < original.lng);
        assert!((viewport.center.lat - original.lat).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_normalized() {
        let mut viewport = viewport();
        viewport.set_bearing(-90.0);
        assert_eq!(viewport.bearing, 270.0);
        viewport.set_bearing(720.0);
        assert_eq!(viewport.bearing, 0.0);
    }

    #[test]
    fn test_fit_bounds_contains_corners() {
        let mut viewport = viewport();
        let bounds = LatLngBounds::new(LatLng::new(10.0, 10.0), LatLng::new(20.0, 30.0));
        viewport.fit_bounds(&bounds, &ScreenRect::new(20.0, 20.0, 20.0, 20.0), 0.0);
        for corner in [bounds.south_west, bounds.north_east] {
            let pixel = viewport.pixel_for_lat_lng(&corner);
            assert!(pixel.x >= 19.0 && pixel.x <= 781.0, "x {}", pixel.x);
            assert!(pixel.y >= 19.0 && pixel.y <= 581.0, "y {}", pixel.y);
        }
    }

    #[test]
    fn test_meters_per_pixel_halves_per_zoom() {
        let z10 = Viewport::meters_per_pixel_at_latitude(0.0, 10.0);
        let z11 = Viewport::meters_per_pixel_at_latitude(0.0, 11.0);
        assert!((z10 / z11 - 2.0).abs() < 1e-9);
    }
}
