//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use maplet_bridge::prelude::*;
use maplet_bridge::{EngineParams, EventSink};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Once;

/// One forwarded engine call, with the arguments the engine actually saw
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Destroy,
    Render,
    ResizeView(u16, u16),
    ResizeFramebuffer(u16, u16),
    ContentPadding(EdgePadding),
    MoveBy(Point, Duration),
    ScaleBy(f64, Option<Point>, Duration),
    SetScale(f64, Option<Point>, Duration),
    SetBearing(f64, Option<Point>, Duration),
    RotateBy(Point, Point, Duration),
    Transition(Transition),
    VisibleBounds(Vec<LatLng>, ScreenRect),
    AddImage {
        name: String,
        format: PixelFormat,
        bytes: usize,
        pixel_ratio: f32,
    },
    AddIcon(String, u32, u32, f32),
    UpdateMarker(AnnotationId, LatLng),
    QueryFeaturesAt(Point, Vec<String>),
    QueryFeaturesIn(ScreenRect, Vec<String>),
    QueryPointAnnotations(ScreenRect),
    MetersPerPixel(f64, f64),
    TakeSnapshot,
    Other(&'static str),
}

/// Engine that records every call and answers with canned values
pub struct RecordingEngine {
    pub params: EngineParams,
    pub events: EventSink,
    pub calls: RefCell<Vec<Call>>,
    /// Center returned by reads, deliberately left unwrapped
    pub raw_center: LatLng,
    pub zoom: f64,
    pub features: Option<Vec<Feature>>,
    pub annotation_hits: Vec<AnnotationId>,
    pub next_id: AnnotationId,
}

impl RecordingEngine {
    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn last_call(&self) -> Option<Call> {
        self.calls.borrow().last().cloned()
    }

    fn ids(&mut self, count: usize) -> Vec<AnnotationId> {
        let first = self.next_id;
        self.next_id += count as AnnotationId;
        (first..self.next_id).collect()
    }
}

impl MapEngine for RecordingEngine {
    fn create(params: &EngineParams, events: EventSink) -> Result<Self> {
        Ok(Self {
            params: params.clone(),
            events,
            calls: RefCell::new(Vec::new()),
            raw_center: LatLng::new(0.0, 0.0),
            zoom: 0.0,
            features: None,
            annotation_hits: Vec::new(),
            next_id: 1,
        })
    }

    fn destroy(&mut self) {
        self.record(Call::Destroy);
    }

    fn initialize_display(&mut self) {
        self.record(Call::Other("initialize_display"));
    }

    fn terminate_display(&mut self) {
        self.record(Call::Other("terminate_display"));
    }

    fn initialize_context(&mut self) {
        self.record(Call::Other("initialize_context"));
    }

    fn terminate_context(&mut self) {
        self.record(Call::Other("terminate_context"));
    }

    fn create_surface(&mut self, _surface: SurfaceHandle) {
        self.record(Call::Other("create_surface"));
    }

    fn destroy_surface(&mut self) {
        self.record(Call::Other("destroy_surface"));
    }

    fn update(&mut self) {
        self.record(Call::Other("update"));
    }

    fn render(&mut self) {
        self.record(Call::Render);
    }

    fn resize_view(&mut self, width: u16, height: u16) {
        self.record(Call::ResizeView(width, height));
    }

    fn resize_framebuffer(&mut self, width: u16, height: u16) {
        self.record(Call::ResizeFramebuffer(width, height));
    }

    fn set_style_url(&mut self, _url: &str) {
        self.record(Call::Other("set_style_url"));
    }

    fn style_url(&self) -> Option<String> {
        Some("asset://recorded.json".to_string())
    }

    fn set_style_json(&mut self, _json: &str) {
        self.record(Call::Other("set_style_json"));
    }

    fn style_json(&self) -> Option<String> {
        None
    }

    fn transition_duration(&self) -> Duration {
        Duration::from_millis(300)
    }

    fn set_transition_duration(&mut self, _duration: Duration) {
        self.record(Call::Other("set_transition_duration"));
    }

    fn transition_delay(&self) -> Duration {
        Duration::ZERO
    }

    fn set_transition_delay(&mut self, _delay: Duration) {
        self.record(Call::Other("set_transition_delay"));
    }

    fn layer(&self, _id: &str) -> Option<StyleLayer> {
        None
    }

    fn add_layer(&mut self, layer: StyleLayer, _before: Option<&str>) -> Result<()> {
        self.record(Call::Other("add_layer"));
        if layer.id.is_empty() {
            return Err(MapError::CannotAddLayer("empty layer id".to_string()));
        }
        Ok(())
    }

    fn remove_layer(&mut self, _id: &str) -> Option<StyleLayer> {
        None
    }

    fn source(&self, _id: &str) -> Option<StyleSource> {
        None
    }

    fn add_source(&mut self, _source: StyleSource) -> Result<()> {
        self.record(Call::Other("add_source"));
        Ok(())
    }

    fn remove_source(&mut self, _id: &str) -> Option<StyleSource> {
        None
    }

    fn add_image(&mut self, name: &str, image: &Image, pixel_ratio: f32) {
        self.record(Call::AddImage {
            name: name.to_string(),
            format: image.format,
            bytes: image.pixels.len(),
            pixel_ratio,
        });
    }

    fn remove_image(&mut self, _name: &str) {
        self.record(Call::Other("remove_image"));
    }

    fn cancel_transitions(&mut self) {
        self.record(Call::Other("cancel_transitions"));
    }

    fn set_gesture_in_progress(&mut self, _in_progress: bool) {
        self.record(Call::Other("set_gesture_in_progress"));
    }

    fn move_by(&mut self, delta: Point, duration: Duration) {
        self.record(Call::MoveBy(delta, duration));
    }

    fn set_lat_lng(&mut self, center: LatLng, _duration: Duration) {
        self.raw_center = center;
    }

    fn lat_lng(&self) -> LatLng {
        self.raw_center
    }

    fn reset_position(&mut self) {
        self.record(Call::Other("reset_position"));
    }

    fn pitch(&self) -> f64 {
        12.0
    }

    fn set_pitch(&mut self, _pitch: f64, _duration: Duration) {
        self.record(Call::Other("set_pitch"));
    }

    fn scale_by(&mut self, factor: f64, anchor: Option<Point>, duration: Duration) {
        self.record(Call::ScaleBy(factor, anchor, duration));
    }

    fn set_scale(&mut self, scale: f64, anchor: Option<Point>, duration: Duration) {
        self.record(Call::SetScale(scale, anchor, duration));
    }

    fn scale(&self) -> f64 {
        2_f64.powf(self.zoom)
    }

    fn set_zoom(&mut self, zoom: f64, _duration: Duration) {
        self.zoom = zoom;
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn reset_zoom(&mut self) {
        self.zoom = 0.0;
    }

    fn set_min_zoom(&mut self, _zoom: f64) {
        self.record(Call::Other("set_min_zoom"));
    }

    fn min_zoom(&self) -> f64 {
        0.0
    }

    fn set_max_zoom(&mut self, _zoom: f64) {
        self.record(Call::Other("set_max_zoom"));
    }

    fn max_zoom(&self) -> f64 {
        25.5
    }

    fn rotate_by(&mut self, start: Point, end: Point, duration: Duration) {
        self.record(Call::RotateBy(start, end, duration));
    }

    fn set_content_padding(&mut self, padding: EdgePadding) {
        self.record(Call::ContentPadding(padding));
    }

    fn set_bearing(&mut self, bearing: f64, anchor: Option<Point>, duration: Duration) {
        self.record(Call::SetBearing(bearing, anchor, duration));
    }

    fn bearing(&self) -> f64 {
        90.0
    }

    fn reset_north(&mut self) {
        self.record(Call::Other("reset_north"));
    }

    fn apply_transition(&mut self, transition: Transition) {
        self.record(Call::Transition(transition));
    }

    fn camera_values(&self) -> CameraValues {
        CameraValues {
            center: self.raw_center,
            bearing: 90.0,
            pitch: 12.0,
            zoom: self.zoom,
        }
    }

    fn set_visible_coordinate_bounds(
        &mut self,
        coordinates: &[LatLng],
        padding: ScreenRect,
        _bearing: f64,
        _duration: Duration,
    ) {
        self.record(Call::VisibleBounds(coordinates.to_vec(), padding));
    }

    fn add_markers(&mut self, markers: &[Marker]) -> Vec<AnnotationId> {
        self.ids(markers.len())
    }

    fn add_polylines(&mut self, polylines: &[Polyline]) -> Vec<AnnotationId> {
        self.ids(polylines.len())
    }

    fn add_polygons(&mut self, polygons: &[Polygon]) -> Vec<AnnotationId> {
        self.ids(polygons.len())
    }

    fn update_marker(&mut self, id: AnnotationId, position: LatLng, _icon_id: &str) {
        self.record(Call::UpdateMarker(id, position));
    }

    fn update_polyline(&mut self, _id: AnnotationId, _polyline: &Polyline) {
        self.record(Call::Other("update_polyline"));
    }

    fn update_polygon(&mut self, _id: AnnotationId, _polygon: &Polygon) {
        self.record(Call::Other("update_polygon"));
    }

    fn remove_annotations(&mut self, _ids: &[AnnotationId]) {
        self.record(Call::Other("remove_annotations"));
    }

    fn query_point_annotations(&self, rect: ScreenRect) -> Vec<AnnotationId> {
        self.record(Call::QueryPointAnnotations(rect));
        self.annotation_hits.clone()
    }

    fn add_annotation_icon(&mut self, symbol: &str, width: u32, height: u32, scale: f32, _pixels: &[u8]) {
        self.record(Call::AddIcon(symbol.to_string(), width, height, scale));
    }

    fn top_offset_pixels_for_annotation_symbol(&self, _symbol: &str) -> f64 {
        -12.5
    }

    fn query_rendered_features_at(&self, point: Point, layer_ids: &[String]) -> Option<Vec<Feature>> {
        self.record(Call::QueryFeaturesAt(point, layer_ids.to_vec()));
        self.features.clone()
    }

    fn query_rendered_features_in(&self, rect: ScreenRect, layer_ids: &[String]) -> Option<Vec<Feature>> {
        self.record(Call::QueryFeaturesIn(rect, layer_ids.to_vec()));
        self.features.clone()
    }

    fn meters_per_pixel_at_latitude(&self, lat: f64, zoom: f64) -> f64 {
        self.record(Call::MetersPerPixel(lat, zoom));
        1.0
    }

    fn projected_meters_for_lat_lng(&self, lat_lng: LatLng) -> ProjectedMeters {
        ProjectedMeters::from_lat_lng(&lat_lng)
    }

    fn lat_lng_for_projected_meters(&self, _meters: ProjectedMeters) -> LatLng {
        self.raw_center
    }

    /// Identity projection, so unit conversion is visible in results
    fn pixel_for_lat_lng(&self, lat_lng: LatLng) -> Point {
        Point::new(lat_lng.lng, lat_lng.lat)
    }

    fn lat_lng_for_pixel(&self, pixel: Point) -> LatLng {
        LatLng::new(pixel.y, pixel.x)
    }

    fn set_debug(&mut self, _debug: bool) {
        self.record(Call::Other("set_debug"));
    }

    fn debug(&self) -> bool {
        true
    }

    fn cycle_debug_options(&mut self) {
        self.record(Call::Other("cycle_debug_options"));
    }

    fn set_enable_fps(&mut self, _enable: bool) {
        self.record(Call::Other("set_enable_fps"));
    }

    fn is_fully_loaded(&self) -> bool {
        true
    }

    fn on_low_memory(&mut self) {
        self.record(Call::Other("on_low_memory"));
    }

    fn set_reachability(&mut self, _reachable: bool) {
        self.record(Call::Other("set_reachability"));
    }

    fn set_api_base_url(&mut self, _url: &str) {
        self.record(Call::Other("set_api_base_url"));
    }

    fn take_snapshot(&mut self) {
        self.record(Call::TakeSnapshot);
    }
}

/// View host counting the callbacks it receives
#[derive(Default)]
pub struct RecordingView {
    pub invalidations: Cell<usize>,
    pub fps: RefCell<Vec<f64>>,
    pub size: Cell<(i32, i32)>,
}

impl MapViewHost for RecordingView {
    fn on_invalidate(&self) {
        self.invalidations.set(self.invalidations.get() + 1);
    }

    fn on_fps_changed(&self, fps: f64) {
        self.fps.borrow_mut().push(fps);
    }

    fn width(&self) -> i32 {
        self.size.get().0
    }

    fn height(&self) -> i32 {
        self.size.get().1
    }
}

thread_local! {
    static CAPTURED: RefCell<Vec<(log::Level, String)>> = RefCell::new(Vec::new());
}

/// Logger that keeps each test thread's records apart
struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        CAPTURED.with(|lines| {
            lines
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static CAPTURE_LOGGER: CaptureLogger = CaptureLogger;
static INSTALL_LOGGER: Once = Once::new();

/// Installs the capturing logger for this test binary
pub fn capture_logs() {
    INSTALL_LOGGER.call_once(|| {
        if log::set_logger(&CAPTURE_LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
}

/// Drains the records logged on the current thread
pub fn take_logs() -> Vec<(log::Level, String)> {
    CAPTURED.with(|lines| lines.borrow_mut().drain(..).collect())
}

/// Error-level messages logged on the current thread since the last take
pub fn take_errors() -> Vec<String> {
    take_logs()
        .into_iter()
        .filter(|(level, _)| *level == log::Level::Error)
        .map(|(_, message)| message)
        .collect()
}

/// Bridge over a recording engine, with its view
pub fn recording_bridge(density: f32) -> (MapBridge<RecordingEngine>, Rc<RecordingView>) {
    capture_logs();
    initialize();
    let view = Rc::new(RecordingView::default());
    view.size.set((1080, 1920));
    let host: Rc<dyn MapViewHost> = view.clone();
    let bridge = MapBridge::new(&DisplayContext::new(density), Some(host))
        .expect("bridge creation");
    (bridge, view)
}

/// Calls seen by the engine so far
pub fn calls(bridge: &MapBridge<RecordingEngine>) -> Vec<Call> {
    bridge.engine("").map(|e| e.calls()).unwrap_or_default()
}

pub fn last_call(bridge: &MapBridge<RecordingEngine>) -> Option<Call> {
    bridge.engine("").and_then(|e| e.last_call())
}
