//! Camera commands and reads.
//!
//! Anchors and offsets arrive in physical pixels and are converted before
//! dispatch. An absent or NaN anchor tells the engine to pivot around the view
//! center. Center reads always come back with a wrapped longitude.

use super::MapBridge;
use crate::animation::transitions::{CameraTarget, CameraValues, EaseCurve, Transition};
use crate::core::geo::{LatLng, Point, ScreenRect};
use crate::core::units::PixelRatio;
use crate::engine::MapEngine;
use std::time::Duration;

fn logical_anchor(ratio: PixelRatio, anchor: Option<Point>) -> Option<Point> {
    anchor
        .filter(|point| !point.is_nan())
        .map(|point| ratio.point_to_logical(point))
}

impl<E: MapEngine> MapBridge<E> {
    /// Stops any running animation where it is
    pub fn cancel_transitions(&mut self) {
        if let Some(engine) = self.engine_mut("cancel_transitions") {
            engine.cancel_transitions();
        }
    }

    pub fn set_gesture_in_progress(&mut self, in_progress: bool) {
        if let Some(engine) = self.engine_mut("set_gesture_in_progress") {
            engine.set_gesture_in_progress(in_progress);
        }
    }

    pub fn move_by(&mut self, dx: f64, dy: f64, duration: Duration) {
        let ratio = self.pixel_ratio;
        if let Some(engine) = self.engine_mut("move_by") {
            engine.move_by(ratio.point_to_logical(Point::new(dx, dy)), duration);
        }
    }

    pub fn set_lat_lng(&mut self, center: LatLng, duration: Duration) {
        if let Some(engine) = self.engine_mut("set_lat_lng") {
            engine.set_lat_lng(center, duration);
        }
    }

    /// Camera center, longitude in `[-180, 180)`
    pub fn lat_lng(&self) -> LatLng {
        // read on every frame, refused silently after destroy
        self.engine("")
            .map(|engine| engine.lat_lng().wrap())
            .unwrap_or_default()
    }

    pub fn reset_position(&mut self) {
        if let Some(engine) = self.engine_mut("reset_position") {
            engine.reset_position();
        }
    }

    pub fn pitch(&self) -> f64 {
        self.engine("pitch").map(|e| e.pitch()).unwrap_or(0.0)
    }

    pub fn set_pitch(&mut self, pitch: f64, duration: Duration) {
        if let Some(engine) = self.engine_mut("set_pitch") {
            engine.set_pitch(pitch, duration);
        }
    }

    pub fn scale_by(&mut self, factor: f64, anchor: Option<Point>, duration: Duration) {
        let anchor = logical_anchor(self.pixel_ratio, anchor);
        if let Some(engine) = self.engine_mut("scale_by") {
            engine.scale_by(factor, anchor, duration);
        }
    }

    pub fn set_scale(&mut self, scale: f64, anchor: Option<Point>, duration: Duration) {
        let anchor = logical_anchor(self.pixel_ratio, anchor);
        if let Some(engine) = self.engine_mut("set_scale") {
            engine.set_scale(scale, anchor, duration);
        }
    }

    pub fn scale(&self) -> f64 {
        self.engine("scale").map(|e| e.scale()).unwrap_or(0.0)
    }

    pub fn set_zoom(&mut self, zoom: f64, duration: Duration) {
        if let Some(engine) = self.engine_mut("set_zoom") {
            engine.set_zoom(zoom, duration);
        }
    }

    pub fn zoom(&self) -> f64 {
        self.engine("zoom").map(|e| e.zoom()).unwrap_or(0.0)
    }

    pub fn reset_zoom(&mut self) {
        if let Some(engine) = self.engine_mut("reset_zoom") {
            engine.reset_zoom();
        }
    }

    pub fn set_min_zoom(&mut self, zoom: f64) {
        if let Some(engine) = self.engine_mut("set_min_zoom") {
            engine.set_min_zoom(zoom);
        }
    }

    pub fn min_zoom(&self) -> f64 {
        self.engine("min_zoom").map(|e| e.min_zoom()).unwrap_or(0.0)
    }

    pub fn set_max_zoom(&mut self, zoom: f64) {
        if let Some(engine) = self.engine_mut("set_max_zoom") {
            engine.set_max_zoom(zoom);
        }
    }

    pub fn max_zoom(&self) -> f64 {
        self.engine("max_zoom").map(|e| e.max_zoom()).unwrap_or(0.0)
    }

    /// Rotates by the angle a drag from `start` to `end` sweeps around the center.
    ///
    /// Both points are physical pixels and both are converted, `end` included;
    /// an engine expecting `end` in physical pixels will see a smaller sweep.
    pub fn rotate_by(&mut self, start: Point, end: Point, duration: Duration) {
        let ratio = self.pixel_ratio;
        if let Some(engine) = self.engine_mut("rotate_by") {
            engine.rotate_by(
                ratio.point_to_logical(start),
                ratio.point_to_logical(end),
                duration,
            );
        }
    }

    pub fn set_bearing(&mut self, bearing: f64, duration: Duration) {
        if let Some(engine) = self.engine_mut("set_bearing") {
            engine.set_bearing(bearing, None, duration);
        }
    }

    pub fn set_bearing_around(&mut self, bearing: f64, anchor: Option<Point>, duration: Duration) {
        let anchor = logical_anchor(self.pixel_ratio, anchor);
        if let Some(engine) = self.engine_mut("set_bearing_around") {
            engine.set_bearing(bearing, anchor, duration);
        }
    }

    pub fn bearing(&self) -> f64 {
        self.engine("bearing").map(|e| e.bearing()).unwrap_or(0.0)
    }

    pub fn reset_north(&mut self) {
        if let Some(engine) = self.engine_mut("reset_north") {
            engine.reset_north();
        }
    }

    pub fn jump_to(&mut self, target: CameraTarget) {
        self.dispatch_transition("jump_to", Transition::jump(target));
    }

    pub fn ease_to(&mut self, target: CameraTarget, duration: Duration, curve: impl Into<EaseCurve>) {
        self.dispatch_transition("ease_to", Transition::ease(target, duration, curve));
    }

    pub fn fly_to(&mut self, target: CameraTarget, duration: Duration) {
        self.dispatch_transition("fly_to", Transition::fly(target, duration));
    }

    pub fn transition(&mut self, transition: Transition) {
        self.dispatch_transition("transition", transition);
    }

    fn dispatch_transition(&mut self, op: &str, transition: Transition) {
        if let Some(engine) = self.engine_mut(op) {
            engine.apply_transition(transition.normalized());
        }
    }

    /// Center, bearing, pitch and zoom in one read; `None` after destroy
    pub fn camera_values(&self) -> Option<CameraValues> {
        self.engine("camera_values")
            .map(|engine| engine.camera_values().wrap())
    }

    /// Fits the camera around `coordinates`. `padding` is handed over as given.
    pub fn set_visible_coordinate_bounds(
        &mut self,
        coordinates: &[LatLng],
        padding: ScreenRect,
        bearing: f64,
        duration: Duration,
    ) {
        if let Some(engine) = self.engine_mut("set_visible_coordinate_bounds") {
            engine.set_visible_coordinate_bounds(coordinates, padding, bearing, duration);
        }
    }
}
