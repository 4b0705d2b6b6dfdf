//! Typed boundary toward the rendering engine.
//!
//! Everything crossing [`MapEngine`] is already in logical units. Pixel
//! conversion, argument validation and lifecycle checks belong to
//! [`crate::MapBridge`]; implementations only have to do the work.

#[cfg(feature = "headless")]
pub mod headless;

use crate::animation::transitions::{CameraValues, Transition};
use crate::core::config::{DeviceProfile, ResourceBudget};
use crate::core::geo::{EdgePadding, LatLng, Point, ProjectedMeters, ScreenRect};
use crate::core::units::PixelRatio;
use crate::data::annotations::{AnnotationId, Marker, Polygon, Polyline};
use crate::data::geojson::Feature;
use crate::data::image::Image;
use crate::data::style::{StyleLayer, StyleSource};
use crate::events::EventSink;
use crate::Result;
use once_cell::sync::OnceCell;
use std::time::Duration;

/// Opaque platform surface identifier handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Everything an engine needs to size itself at creation
#[derive(Debug, Clone)]
pub struct EngineParams {
    pub pixel_ratio: PixelRatio,
    pub device: DeviceProfile,
    pub budget: ResourceBudget,
    pub api_base_url: Option<String>,
}

/// Operations the bridge forwards to a concrete engine
pub trait MapEngine {
    /// Builds the engine-side resource. `events` is the only way back to the owner.
    fn create(params: &EngineParams, events: EventSink) -> Result<Self>
    where
        Self: Sized;

    /// Releases the engine-side resource; called exactly once
    fn destroy(&mut self);

    // Surface lifecycle

    fn initialize_display(&mut self);
    fn terminate_display(&mut self);
    fn initialize_context(&mut self);
    fn terminate_context(&mut self);
    fn create_surface(&mut self, surface: SurfaceHandle);
    fn destroy_surface(&mut self);
    fn update(&mut self);
    fn render(&mut self);
    fn resize_view(&mut self, width: u16, height: u16);
    fn resize_framebuffer(&mut self, width: u16, height: u16);

    // Style

    fn set_style_url(&mut self, url: &str);
    fn style_url(&self) -> Option<String>;
    fn set_style_json(&mut self, json: &str);
    fn style_json(&self) -> Option<String>;
    fn transition_duration(&self) -> Duration;
    fn set_transition_duration(&mut self, duration: Duration);
    fn transition_delay(&self) -> Duration;
    fn set_transition_delay(&mut self, delay: Duration);
    fn layer(&self, id: &str) -> Option<StyleLayer>;
    /// Inserts below `before` when given, on top otherwise
    fn add_layer(&mut self, layer: StyleLayer, before: Option<&str>) -> Result<()>;
    fn remove_layer(&mut self, id: &str) -> Option<StyleLayer>;
    fn source(&self, id: &str) -> Option<StyleSource>;
    fn add_source(&mut self, source: StyleSource) -> Result<()>;
    fn remove_source(&mut self, id: &str) -> Option<StyleSource>;
    /// `image` is always `Rgba8888`
    fn add_image(&mut self, name: &str, image: &Image, pixel_ratio: f32);
    fn remove_image(&mut self, name: &str);

    // Camera

    fn cancel_transitions(&mut self);
    fn set_gesture_in_progress(&mut self, in_progress: bool);
    fn move_by(&mut self, delta: Point, duration: Duration);
    fn set_lat_lng(&mut self, center: LatLng, duration: Duration);
    /// Raw center, longitude not necessarily wrapped
    fn lat_lng(&self) -> LatLng;
    fn reset_position(&mut self);
    fn pitch(&self) -> f64;
    fn set_pitch(&mut self, pitch: f64, duration: Duration);
    /// `anchor` of `None` pivots around the view center
    fn scale_by(&mut self, factor: f64, anchor: Option<Point>, duration: Duration);
    fn set_scale(&mut self, scale: f64, anchor: Option<Point>, duration: Duration);
    fn scale(&self) -> f64;
    fn set_zoom(&mut self, zoom: f64, duration: Duration);
    fn zoom(&self) -> f64;
    fn reset_zoom(&mut self);
    fn set_min_zoom(&mut self, zoom: f64);
    fn min_zoom(&self) -> f64;
    fn set_max_zoom(&mut self, zoom: f64);
    fn max_zoom(&self) -> f64;
    fn rotate_by(&mut self, start: Point, end: Point, duration: Duration);
    fn set_content_padding(&mut self, padding: EdgePadding);
    fn set_bearing(&mut self, bearing: f64, anchor: Option<Point>, duration: Duration);
    fn bearing(&self) -> f64;
    fn reset_north(&mut self);
    /// Jump, ease or fly; zero-duration modes arrive already collapsed to a jump
    fn apply_transition(&mut self, transition: Transition);
    fn camera_values(&self) -> CameraValues;
    fn set_visible_coordinate_bounds(
        &mut self,
        coordinates: &[LatLng],
        padding: ScreenRect,
        bearing: f64,
        duration: Duration,
    );

    // Annotations

    fn add_markers(&mut self, markers: &[Marker]) -> Vec<AnnotationId>;
    fn add_polylines(&mut self, polylines: &[Polyline]) -> Vec<AnnotationId>;
    fn add_polygons(&mut self, polygons: &[Polygon]) -> Vec<AnnotationId>;
    fn update_marker(&mut self, id: AnnotationId, position: LatLng, icon_id: &str);
    fn update_polyline(&mut self, id: AnnotationId, polyline: &Polyline);
    fn update_polygon(&mut self, id: AnnotationId, polygon: &Polygon);
    fn remove_annotations(&mut self, ids: &[AnnotationId]);
    fn query_point_annotations(&self, rect: ScreenRect) -> Vec<AnnotationId>;
    fn add_annotation_icon(&mut self, symbol: &str, width: u32, height: u32, scale: f32, pixels: &[u8]);
    fn top_offset_pixels_for_annotation_symbol(&self, symbol: &str) -> f64;

    // Queries and projections

    /// `None` means the engine had nothing to query, not an error
    fn query_rendered_features_at(&self, point: Point, layer_ids: &[String]) -> Option<Vec<Feature>>;
    fn query_rendered_features_in(&self, rect: ScreenRect, layer_ids: &[String]) -> Option<Vec<Feature>>;
    fn meters_per_pixel_at_latitude(&self, lat: f64, zoom: f64) -> f64;
    fn projected_meters_for_lat_lng(&self, lat_lng: LatLng) -> ProjectedMeters;
    fn lat_lng_for_projected_meters(&self, meters: ProjectedMeters) -> LatLng;
    fn pixel_for_lat_lng(&self, lat_lng: LatLng) -> Point;
    fn lat_lng_for_pixel(&self, pixel: Point) -> LatLng;

    // Diagnostics

    fn set_debug(&mut self, debug: bool);
    fn debug(&self) -> bool;
    fn cycle_debug_options(&mut self);
    fn set_enable_fps(&mut self, enable: bool);
    fn is_fully_loaded(&self) -> bool;
    fn on_low_memory(&mut self);
    fn set_reachability(&mut self, reachable: bool);
    fn set_api_base_url(&mut self, url: &str);
    /// Produces a snapshot on the next rendered frame
    fn take_snapshot(&mut self);
}

/// Process-wide engine state, created once by [`initialize`]
#[derive(Debug)]
pub struct EngineRuntime {
    worker_threads: usize,
}

impl EngineRuntime {
    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }
}

static RUNTIME: OnceCell<EngineRuntime> = OnceCell::new();

/// Prepares the process for engine use. Safe to call any number of times.
pub fn initialize() -> &'static EngineRuntime {
    RUNTIME.get_or_init(|| {
        let worker_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        log::info!("engine runtime initialized ({} workers)", worker_threads);
        EngineRuntime { worker_threads }
    })
}

pub fn is_initialized() -> bool {
    RUNTIME.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        let first = initialize() as *const EngineRuntime;
        let second = initialize() as *const EngineRuntime;
        assert_eq!(first, second);
        assert!(is_initialized());
        assert!(initialize().worker_threads() >= 1);
    }
}
