//! In-memory engine used for tests and server-side camera math.
//!
//! Keeps the full camera model, the runtime style store and the annotation
//! table, and emits the same notifications a rendering engine would. It draws
//! nothing: a "frame" only advances animations, and snapshots are solid
//! images of the framebuffer size.

use crate::animation::transitions::{
    CameraAnimation, CameraTarget, CameraValues, EaseCurve, Transition, TransitionMode,
};
use crate::core::config::ResourceBudget;
use crate::core::constants::{DEBUG_OPTION_COUNT, DEFAULT_MIN_ZOOM};
use crate::core::geo::{EdgePadding, LatLng, LatLngBounds, Point, ProjectedMeters, ScreenRect};
use crate::core::units::PixelRatio;
use crate::core::viewport::Viewport;
use crate::data::annotations::{AnnotationId, Marker, Polygon, Polyline};
use crate::data::geojson::{Feature, GeoJson};
use crate::data::image::Image;
use crate::data::style::{SourceKind, StyleLayer, StyleSource};
use crate::engine::{EngineParams, MapEngine, SurfaceHandle};
use crate::events::{EventSink, MapChange};
use crate::{MapError, Result};
use fxhash::FxHashMap;
use instant::Instant;
use std::time::Duration;

/// Radius in logical pixels around a point query that still counts as a hit
const POINT_QUERY_TOLERANCE: f64 = 4.0;

const RESET_NORTH_DURATION: Duration = Duration::from_millis(500);

/// Background of produced snapshots
const SNAPSHOT_FILL: [u8; 4] = [0xf0, 0xed, 0xe5, 0xff];

#[derive(Debug, Clone)]
enum Annotation {
    Marker(Marker),
    Polyline(Polyline),
    Polygon(Polygon),
}

#[derive(Debug, Clone)]
struct AnnotationIcon {
    width: u32,
    height: u32,
    scale: f32,
    pixels: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Default)]
struct GlState {
    display: bool,
    context: bool,
    surface: Option<SurfaceHandle>,
}

pub struct HeadlessEngine {
    events: EventSink,
    pixel_ratio: PixelRatio,
    budget: ResourceBudget,
    api_base_url: Option<String>,
    reachable: bool,

    gl: GlState,
    framebuffer: (u16, u16),

    viewport: Viewport,
    animation: Option<CameraAnimation>,
    gesture_in_progress: bool,

    style_url: Option<String>,
    style_json: Option<String>,
    style_loaded: bool,
    transition_duration: Duration,
    transition_delay: Duration,
    layers: Vec<StyleLayer>,
    sources: FxHashMap<String, StyleSource>,
    images: FxHashMap<String, (Image, f32)>,

    annotations: FxHashMap<AnnotationId, Annotation>,
    icons: FxHashMap<String, AnnotationIcon>,
    next_annotation_id: AnnotationId,

    debug_options: u8,
    fps_enabled: bool,
    last_frame: Option<Instant>,
    frames: u64,
    snapshot_pending: bool,
    low_memory_events: u32,
    destroyed: bool,
}

impl HeadlessEngine {
    pub fn budget(&self) -> &ResourceBudget {
        &self.budget
    }

    pub fn pixel_ratio(&self) -> PixelRatio {
        self.pixel_ratio
    }

    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }

    pub fn framebuffer_size(&self) -> (u16, u16) {
        self.framebuffer
    }

    /// Logical view size
    pub fn view_size(&self) -> Point {
        self.viewport.size
    }

    pub fn content_padding(&self) -> EdgePadding {
        self.viewport.padding
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_gesture_in_progress(&self) -> bool {
        self.gesture_in_progress
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    pub fn low_memory_events(&self) -> u32 {
        self.low_memory_events
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn layer_ids(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.id.clone()).collect()
    }

    pub fn image(&self, name: &str) -> Option<(&Image, f32)> {
        self.images.get(name).map(|(image, ratio)| (image, *ratio))
    }

    pub fn has_annotation_icon(&self, symbol: &str) -> bool {
        self.icons.contains_key(symbol)
    }

    /// Icon dimensions in physical pixels
    pub fn annotation_icon_size(&self, symbol: &str) -> Option<(u32, u32)> {
        self.icons.get(symbol).map(|icon| (icon.width, icon.height))
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    pub fn marker(&self, id: AnnotationId) -> Option<&Marker> {
        match self.annotations.get(&id) {
            Some(Annotation::Marker(marker)) => Some(marker),
            _ => None,
        }
    }

    pub fn polyline(&self, id: AnnotationId) -> Option<&Polyline> {
        match self.annotations.get(&id) {
            Some(Annotation::Polyline(polyline)) => Some(polyline),
            _ => None,
        }
    }

    pub fn polygon(&self, id: AnnotationId) -> Option<&Polygon> {
        match self.annotations.get(&id) {
            Some(Annotation::Polygon(polygon)) => Some(polygon),
            _ => None,
        }
    }

    /// Viewport with any in-flight animation applied
    fn current(&self) -> Viewport {
        let mut viewport = self.viewport.clone();
        if let Some(animation) = &self.animation {
            Self::apply_target(&mut viewport, &animation.sample());
        }
        viewport
    }

    fn apply_target(viewport: &mut Viewport, target: &CameraTarget) {
        viewport.set_center(target.center);
        viewport.set_zoom(target.zoom);
        viewport.set_bearing(target.bearing);
        viewport.set_pitch(target.pitch);
    }

    /// Freezes an in-flight animation at its current sample
    fn commit(&mut self) {
        if let Some(animation) = self.animation.take() {
            let sample = animation.sample();
            Self::apply_target(&mut self.viewport, &sample);
        }
    }

    fn transition_to(&mut self, target: CameraTarget, mode: TransitionMode) {
        self.commit();
        let mut target = target;
        target.zoom = target
            .zoom
            .clamp(self.viewport.min_zoom, self.viewport.max_zoom);

        let from = CameraTarget::from_viewport(&self.viewport);
        match CameraAnimation::start(from, target, mode) {
            Some(animation) => {
                self.events.map_changed(MapChange::RegionWillChangeAnimated);
                self.animation = Some(animation);
            }
            None => {
                self.events.map_changed(MapChange::RegionWillChange);
                Self::apply_target(&mut self.viewport, &target);
                self.events.map_changed(MapChange::RegionDidChange);
            }
        }
        self.events.invalidate();
    }

    /// Eases to the camera `edit` produces from the current one
    fn animate_with<F>(&mut self, duration: Duration, edit: F)
    where
        F: FnOnce(&mut Viewport),
    {
        let mut next = self.current();
        edit(&mut next);
        let target = CameraTarget::from_viewport(&next);
        self.transition_to(
            target,
            TransitionMode::Ease {
                duration,
                curve: EaseCurve::Eased,
            },
        );
    }

    fn finish_animation_if_done(&mut self) {
        let finished = self
            .animation
            .as_ref()
            .map(|animation| animation.is_finished())
            .unwrap_or(false);
        if finished {
            self.commit();
            self.events.map_changed(MapChange::RegionDidChangeAnimated);
        } else if self.animation.is_some() {
            self.events.map_changed(MapChange::RegionIsChanging);
            self.events.invalidate();
        }
    }

    fn load_style(&mut self, parsed: bool) {
        self.events.map_changed(MapChange::WillStartLoadingMap);
        self.style_loaded = parsed;
        if parsed {
            self.events.map_changed(MapChange::DidFinishLoadingStyle);
            self.events.map_changed(MapChange::DidFinishLoadingMap);
        } else {
            self.events.map_changed(MapChange::DidFailLoadingMap);
        }
        self.events.invalidate();
    }

    fn collect_features<F>(&self, layer_ids: &[String], hit: F) -> Option<Vec<Feature>>
    where
        F: Fn(&ScreenRect) -> bool,
    {
        if !self.style_loaded {
            return None;
        }
        let viewport = self.current();
        let mut features = Vec::new();

        // top-most layer first
        for layer in self.layers.iter().rev() {
            if !layer_ids.is_empty() && !layer_ids.contains(&layer.id) {
                continue;
            }
            let Some(source) = layer.source.as_ref().and_then(|id| self.sources.get(id)) else {
                continue;
            };
            if source.kind != SourceKind::GeoJson {
                continue;
            }
            let collection = match GeoJson::from_value(&source.data) {
                Ok(collection) => collection,
                Err(e) => {
                    log::warn!("source {} holds invalid GeoJSON: {}", source.id, e);
                    continue;
                }
            };
            for feature in collection.into_features() {
                let Some(bounds) = feature.geometry.as_ref().and_then(|g| g.bounds()) else {
                    continue;
                };
                if hit(&Self::screen_bounds(&viewport, &bounds)) {
                    features.push(feature);
                }
            }
        }
        Some(features)
    }

    /// Screen-space box around geographic bounds
    fn screen_bounds(viewport: &Viewport, bounds: &LatLngBounds) -> ScreenRect {
        let corners = [
            LatLng::new(bounds.north_east.lat, bounds.south_west.lng),
            bounds.north_east,
            LatLng::new(bounds.south_west.lat, bounds.north_east.lng),
            bounds.south_west,
        ]
        .map(|corner| viewport.pixel_for_lat_lng(&corner));

        let mut rect = ScreenRect::new(corners[0].x, corners[0].y, corners[0].x, corners[0].y);
        for corner in &corners[1..] {
            rect.left = rect.left.min(corner.x);
            rect.top = rect.top.min(corner.y);
            rect.right = rect.right.max(corner.x);
            rect.bottom = rect.bottom.max(corner.y);
        }
        rect
    }

    fn insert_annotation(&mut self, annotation: Annotation) -> AnnotationId {
        let id = self.next_annotation_id;
        self.next_annotation_id += 1;
        let annotation = match annotation {
            Annotation::Marker(mut m) => {
                m.id = Some(id);
                Annotation::Marker(m)
            }
            Annotation::Polyline(mut p) => {
                p.id = Some(id);
                Annotation::Polyline(p)
            }
            Annotation::Polygon(mut p) => {
                p.id = Some(id);
                Annotation::Polygon(p)
            }
        };
        self.annotations.insert(id, annotation);
        id
    }
}

impl MapEngine for HeadlessEngine {
    fn create(params: &EngineParams, events: EventSink) -> Result<Self> {
        if params.budget.worker_threads == 0 {
            return Err(MapError::Engine(
                "resource budget must allow at least one worker thread".to_string(),
            ));
        }
        log::debug!(
            "headless engine created: ratio {}, {} workers, {} byte tile cache",
            params.pixel_ratio.get(),
            params.budget.worker_threads,
            params.budget.tile_cache_bytes
        );

        Ok(Self {
            events,
            pixel_ratio: params.pixel_ratio,
            budget: params.budget.clone(),
            api_base_url: params.api_base_url.clone(),
            reachable: true,
            gl: GlState::default(),
            framebuffer: (0, 0),
            viewport: Viewport::default(),
            animation: None,
            gesture_in_progress: false,
            style_url: None,
            style_json: None,
            style_loaded: false,
            transition_duration: Duration::ZERO,
            transition_delay: Duration::ZERO,
            layers: Vec::new(),
            sources: FxHashMap::default(),
            images: FxHashMap::default(),
            annotations: FxHashMap::default(),
            icons: FxHashMap::default(),
            next_annotation_id: 1,
            debug_options: 0,
            fps_enabled: false,
            last_frame: None,
            frames: 0,
            snapshot_pending: false,
            low_memory_events: 0,
            destroyed: false,
        })
    }

    fn destroy(&mut self) {
        self.animation = None;
        self.layers.clear();
        self.sources.clear();
        self.images.clear();
        self.annotations.clear();
        self.icons.clear();
        self.gl = GlState::default();
        self.destroyed = true;
        log::debug!("headless engine destroyed after {} frames", self.frames);
    }

    fn initialize_display(&mut self) {
        self.gl.display = true;
    }

    fn terminate_display(&mut self) {
        self.gl.display = false;
    }

    fn initialize_context(&mut self) {
        self.gl.context = true;
    }

    fn terminate_context(&mut self) {
        self.gl.context = false;
    }

    fn create_surface(&mut self, surface: SurfaceHandle) {
        self.gl.surface = Some(surface);
        self.events.invalidate();
    }

    fn destroy_surface(&mut self) {
        self.gl.surface = None;
    }

    fn update(&mut self) {
        self.finish_animation_if_done();
    }

    fn render(&mut self) {
        if self.gl.surface.is_none() {
            log::trace!("render skipped, no surface");
            return;
        }
        self.finish_animation_if_done();

        self.events.map_changed(MapChange::WillStartRenderingFrame);
        self.frames += 1;
        let settled = self.animation.is_none() && self.style_loaded;
        self.events.map_changed(if settled {
            MapChange::DidFinishRenderingFrameFullyRendered
        } else {
            MapChange::DidFinishRenderingFrame
        });

        let now = Instant::now();
        if self.fps_enabled {
            if let Some(last) = self.last_frame {
                let elapsed = now.duration_since(last).as_secs_f64();
                if elapsed > 0.0 {
                    self.events.fps_changed(1.0 / elapsed);
                }
            }
        }
        self.last_frame = Some(now);

        if self.snapshot_pending {
            self.snapshot_pending = false;
            let (width, height) = self.framebuffer;
            let image = (width > 0 && height > 0)
                .then(|| Image::filled(width as u32, height as u32, SNAPSHOT_FILL));
            self.events.snapshot_ready(image);
        }
    }

    fn resize_view(&mut self, width: u16, height: u16) {
        self.viewport
            .set_size(Point::new(width as f64, height as f64));
        self.events.invalidate();
    }

    fn resize_framebuffer(&mut self, width: u16, height: u16) {
        self.framebuffer = (width, height);
    }

    fn set_style_url(&mut self, url: &str) {
        self.style_url = Some(url.to_string());
        self.style_json = None;
        // a url can only be fetched while the network is up
        let reachable = self.reachable;
        self.load_style(reachable);
    }

    fn style_url(&self) -> Option<String> {
        self.style_url.clone()
    }

    fn set_style_json(&mut self, json: &str) {
        let parsed = match serde_json::from_str::<serde_json::Value>(json) {
            Ok(value) => value.is_object(),
            Err(e) => {
                log::warn!("style JSON rejected: {}", e);
                false
            }
        };
        self.style_url = None;
        self.style_json = Some(json.to_string());
        self.load_style(parsed);
    }

    fn style_json(&self) -> Option<String> {
        self.style_json.clone()
    }

    fn transition_duration(&self) -> Duration {
        self.transition_duration
    }

    fn set_transition_duration(&mut self, duration: Duration) {
        self.transition_duration = duration;
    }

    fn transition_delay(&self) -> Duration {
        self.transition_delay
    }

    fn set_transition_delay(&mut self, delay: Duration) {
        self.transition_delay = delay;
    }

    fn layer(&self, id: &str) -> Option<StyleLayer> {
        self.layers.iter().find(|l| l.id == id).cloned()
    }

    fn add_layer(&mut self, layer: StyleLayer, before: Option<&str>) -> Result<()> {
        if self.layers.iter().any(|l| l.id == layer.id) {
            return Err(MapError::CannotAddLayer(format!(
                "layer {} already exists",
                layer.id
            )));
        }
        let index = match before {
            Some(before) => self
                .layers
                .iter()
                .position(|l| l.id == before)
                .ok_or_else(|| {
                    MapError::CannotAddLayer(format!("layer {} does not exist", before))
                })?,
            None => self.layers.len(),
        };
        log::debug!("adding layer {} at {}", layer.id, index);
        self.layers.insert(index, layer);
        self.events.invalidate();
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Option<StyleLayer> {
        let index = self.layers.iter().position(|l| l.id == id)?;
        let removed = self.layers.remove(index);
        self.events.invalidate();
        Some(removed)
    }

    fn source(&self, id: &str) -> Option<StyleSource> {
        self.sources.get(id).cloned()
    }

    fn add_source(&mut self, source: StyleSource) -> Result<()> {
        if self.sources.contains_key(&source.id) {
            return Err(MapError::CannotAddSource(format!(
                "source {} already exists",
                source.id
            )));
        }
        self.sources.insert(source.id.clone(), source);
        self.events.map_changed(MapChange::SourceDidChange);
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Option<StyleSource> {
        let removed = self.sources.remove(id)?;
        self.events.map_changed(MapChange::SourceDidChange);
        Some(removed)
    }

    fn add_image(&mut self, name: &str, image: &Image, pixel_ratio: f32) {
        self.images
            .insert(name.to_string(), (image.clone(), pixel_ratio));
    }

    fn remove_image(&mut self, name: &str) {
        self.images.remove(name);
    }

    fn cancel_transitions(&mut self) {
        if self.animation.is_some() {
            self.commit();
            self.events.map_changed(MapChange::RegionDidChange);
        }
    }

    fn set_gesture_in_progress(&mut self, in_progress: bool) {
        self.gesture_in_progress = in_progress;
    }

    fn move_by(&mut self, delta: Point, duration: Duration) {
        self.animate_with(duration, |viewport| viewport.move_by(delta));
    }

    fn set_lat_lng(&mut self, center: LatLng, duration: Duration) {
        self.animate_with(duration, |viewport| viewport.set_center(center));
    }

    fn lat_lng(&self) -> LatLng {
        self.current().center
    }

    fn reset_position(&mut self) {
        self.transition_to(
            CameraTarget::new(LatLng::new(0.0, 0.0), DEFAULT_MIN_ZOOM),
            TransitionMode::Jump,
        );
    }

    fn pitch(&self) -> f64 {
        self.current().pitch
    }

    fn set_pitch(&mut self, pitch: f64, duration: Duration) {
        self.animate_with(duration, |viewport| viewport.set_pitch(pitch));
    }

    fn scale_by(&mut self, factor: f64, anchor: Option<Point>, duration: Duration) {
        if factor <= 0.0 {
            return;
        }
        self.animate_with(duration, |viewport| {
            let zoom = viewport.zoom + factor.log2();
            viewport.zoom_around(zoom, anchor);
        });
    }

    fn set_scale(&mut self, scale: f64, anchor: Option<Point>, duration: Duration) {
        if scale <= 0.0 {
            return;
        }
        self.animate_with(duration, |viewport| viewport.zoom_around(scale.log2(), anchor));
    }

    fn scale(&self) -> f64 {
        self.current().scale()
    }

    fn set_zoom(&mut self, zoom: f64, duration: Duration) {
        self.animate_with(duration, |viewport| viewport.set_zoom(zoom));
    }

    fn zoom(&self) -> f64 {
        self.current().zoom
    }

    fn reset_zoom(&mut self) {
        self.animate_with(Duration::ZERO, |viewport| viewport.set_zoom(DEFAULT_MIN_ZOOM));
    }

    fn set_min_zoom(&mut self, zoom: f64) {
        self.commit();
        self.viewport.set_min_zoom(zoom);
    }

    fn min_zoom(&self) -> f64 {
        self.viewport.min_zoom
    }

    fn set_max_zoom(&mut self, zoom: f64) {
        self.commit();
        self.viewport.set_max_zoom(zoom);
    }

    fn max_zoom(&self) -> f64 {
        self.viewport.max_zoom
    }

    fn rotate_by(&mut self, start: Point, end: Point, duration: Duration) {
        self.animate_with(duration, |viewport| {
            let bearing = viewport.bearing + viewport.bearing_delta(&start, &end);
            viewport.set_bearing(bearing);
        });
    }

    fn set_content_padding(&mut self, padding: EdgePadding) {
        self.viewport.padding = padding;
        self.events.invalidate();
    }

    fn set_bearing(&mut self, bearing: f64, anchor: Option<Point>, duration: Duration) {
        self.animate_with(duration, |viewport| viewport.rotate_around(bearing, anchor));
    }

    fn bearing(&self) -> f64 {
        self.current().bearing
    }

    fn reset_north(&mut self) {
        self.animate_with(RESET_NORTH_DURATION, |viewport| viewport.set_bearing(0.0));
    }

    fn apply_transition(&mut self, transition: Transition) {
        let Transition { target, mode } = transition.normalized();
        self.transition_to(target, mode);
    }

    fn camera_values(&self) -> CameraValues {
        let viewport = self.current();
        CameraValues {
            center: viewport.center,
            bearing: viewport.bearing,
            pitch: viewport.pitch,
            zoom: viewport.zoom,
        }
    }

    fn set_visible_coordinate_bounds(
        &mut self,
        coordinates: &[LatLng],
        padding: ScreenRect,
        bearing: f64,
        duration: Duration,
    ) {
        let Some(bounds) = LatLngBounds::from_points(coordinates) else {
            log::debug!("no coordinates to fit");
            return;
        };
        self.animate_with(duration, |viewport| {
            viewport.fit_bounds(&bounds, &padding, bearing)
        });
    }

    fn add_markers(&mut self, markers: &[Marker]) -> Vec<AnnotationId> {
        let ids = markers
            .iter()
            .map(|m| self.insert_annotation(Annotation::Marker(m.clone())))
            .collect();
        self.events.invalidate();
        ids
    }

    fn add_polylines(&mut self, polylines: &[Polyline]) -> Vec<AnnotationId> {
        let ids = polylines
            .iter()
            .map(|p| self.insert_annotation(Annotation::Polyline(p.clone())))
            .collect();
        self.events.invalidate();
        ids
    }

    fn add_polygons(&mut self, polygons: &[Polygon]) -> Vec<AnnotationId> {
        let ids = polygons
            .iter()
            .map(|p| self.insert_annotation(Annotation::Polygon(p.clone())))
            .collect();
        self.events.invalidate();
        ids
    }

    fn update_marker(&mut self, id: AnnotationId, position: LatLng, icon_id: &str) {
        match self.annotations.get_mut(&id) {
            Some(Annotation::Marker(marker)) => {
                marker.position = position;
                marker.icon_id = icon_id.to_string();
                self.events.invalidate();
            }
            _ => log::warn!("no marker with id {}", id),
        }
    }

    fn update_polyline(&mut self, id: AnnotationId, polyline: &Polyline) {
        match self.annotations.get_mut(&id) {
            Some(Annotation::Polyline(existing)) => {
                *existing = Polyline {
                    id: Some(id),
                    ..polyline.clone()
                };
                self.events.invalidate();
            }
            _ => log::warn!("no polyline with id {}", id),
        }
    }

    fn update_polygon(&mut self, id: AnnotationId, polygon: &Polygon) {
        match self.annotations.get_mut(&id) {
            Some(Annotation::Polygon(existing)) => {
                *existing = Polygon {
                    id: Some(id),
                    ..polygon.clone()
                };
                self.events.invalidate();
            }
            _ => log::warn!("no polygon with id {}", id),
        }
    }

    fn remove_annotations(&mut self, ids: &[AnnotationId]) {
        for id in ids {
            self.annotations.remove(id);
        }
        self.events.invalidate();
    }

    fn query_point_annotations(&self, rect: ScreenRect) -> Vec<AnnotationId> {
        let viewport = self.current();
        let mut ids: Vec<AnnotationId> = self
            .annotations
            .iter()
            .filter_map(|(id, annotation)| match annotation {
                Annotation::Marker(marker) => {
                    let pixel = viewport.pixel_for_lat_lng(&marker.position);
                    rect.contains(&pixel).then_some(*id)
                }
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        ids
    }

    fn add_annotation_icon(&mut self, symbol: &str, width: u32, height: u32, scale: f32, pixels: &[u8]) {
        self.icons.insert(
            symbol.to_string(),
            AnnotationIcon {
                width,
                height,
                scale,
                pixels: pixels.to_vec(),
            },
        );
    }

    fn top_offset_pixels_for_annotation_symbol(&self, symbol: &str) -> f64 {
        match self.icons.get(symbol) {
            Some(icon) if icon.scale > 0.0 => -(icon.height as f64 / icon.scale as f64) / 2.0,
            _ => 0.0,
        }
    }

    fn query_rendered_features_at(&self, point: Point, layer_ids: &[String]) -> Option<Vec<Feature>> {
        let probe = ScreenRect::new(
            point.x - POINT_QUERY_TOLERANCE,
            point.y - POINT_QUERY_TOLERANCE,
            point.x + POINT_QUERY_TOLERANCE,
            point.y + POINT_QUERY_TOLERANCE,
        );
        self.collect_features(layer_ids, |bounds| bounds.intersects(&probe))
    }

    fn query_rendered_features_in(&self, rect: ScreenRect, layer_ids: &[String]) -> Option<Vec<Feature>> {
        self.collect_features(layer_ids, |bounds| bounds.intersects(&rect))
    }

    fn meters_per_pixel_at_latitude(&self, lat: f64, zoom: f64) -> f64 {
        Viewport::meters_per_pixel_at_latitude(lat, zoom)
    }

    fn projected_meters_for_lat_lng(&self, lat_lng: LatLng) -> ProjectedMeters {
        ProjectedMeters::from_lat_lng(&lat_lng)
    }

    fn lat_lng_for_projected_meters(&self, meters: ProjectedMeters) -> LatLng {
        meters.to_lat_lng()
    }

    fn pixel_for_lat_lng(&self, lat_lng: LatLng) -> Point {
        self.current().pixel_for_lat_lng(&lat_lng)
    }

    fn lat_lng_for_pixel(&self, pixel: Point) -> LatLng {
        self.current().lat_lng_for_pixel(&pixel)
    }

    fn set_debug(&mut self, debug: bool) {
        self.debug_options = u8::from(debug);
        self.events.invalidate();
    }

    fn debug(&self) -> bool {
        self.debug_options != 0
    }

    fn cycle_debug_options(&mut self) {
        self.debug_options = (self.debug_options + 1) % (DEBUG_OPTION_COUNT + 1);
        self.events.invalidate();
    }

    fn set_enable_fps(&mut self, enable: bool) {
        self.fps_enabled = enable;
        if !enable {
            self.last_frame = None;
        }
    }

    fn is_fully_loaded(&self) -> bool {
        self.style_loaded && self.animation.is_none()
    }

    fn on_low_memory(&mut self) {
        self.low_memory_events += 1;
        self.snapshot_pending = false;
        log::info!(
            "low memory, holding {} icon bytes",
            self.icons.values().map(|icon| icon.pixels.len()).sum::<usize>()
        );
    }

    fn set_reachability(&mut self, reachable: bool) {
        let regained = reachable && !self.reachable;
        self.reachable = reachable;
        if regained && self.style_url.is_some() && !self.style_loaded {
            log::debug!("network reachable again, reloading style");
            self.load_style(true);
        }
    }

    fn set_api_base_url(&mut self, url: &str) {
        self.api_base_url = Some(url.to_string());
    }

    fn take_snapshot(&mut self) {
        self.snapshot_pending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DisplayContext;
    use crate::data::geojson::FeatureGeometry;
    use crate::events::{self, EngineEvent, EventQueue};
    use serde_json::json;

    fn engine() -> (HeadlessEngine, EventQueue) {
        let display = DisplayContext::new(2.0);
        let device = display.device_profile().unwrap();
        let params = EngineParams {
            pixel_ratio: PixelRatio::new(2.0).unwrap(),
            device,
            budget: ResourceBudget::default(),
            api_base_url: None,
        };
        let (sink, queue) = events::channel();
        let mut engine = HeadlessEngine::create(&params, sink).unwrap();
        engine.resize_view(400, 300);
        queue.drain();
        (engine, queue)
    }

    fn changes(queue: &EventQueue) -> Vec<MapChange> {
        queue
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                EngineEvent::MapChanged(change) => Some(change),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_jump_applies_immediately() {
        let (mut engine, queue) = engine();
        engine.apply_transition(Transition::jump(
            CameraTarget::new(LatLng::new(10.0, 20.0), 5.0).with_bearing(30.0),
        ));
        assert_eq!(engine.lat_lng(), LatLng::new(10.0, 20.0));
        assert_eq!(engine.zoom(), 5.0);
        assert_eq!(engine.bearing(), 30.0);
        assert!(!engine.is_animating());
        assert_eq!(
            changes(&queue),
            vec![MapChange::RegionWillChange, MapChange::RegionDidChange]
        );
    }

    #[test]
    fn test_zoom_clamped_by_engine() {
        let (mut engine, _queue) = engine();
        engine.set_max_zoom(12.0);
        engine.set_zoom(18.0, Duration::ZERO);
        assert_eq!(engine.zoom(), 12.0);
    }

    #[test]
    fn test_cancel_keeps_interpolated_camera() {
        let (mut engine, queue) = engine();
        engine.apply_transition(Transition::ease(
            CameraTarget::new(LatLng::new(0.0, 90.0), 0.0),
            Duration::from_secs(3600),
            false,
        ));
        assert!(engine.is_animating());
        std::thread::sleep(Duration::from_millis(20));
        engine.cancel_transitions();
        assert!(!engine.is_animating());

        let lng = engine.lat_lng().lng;
        assert!(lng > 0.0 && lng < 90.0, "camera should freeze mid-way, got {}", lng);
        assert!(changes(&queue).contains(&MapChange::RegionDidChange));
    }

    #[test]
    fn test_anchored_zoom_keeps_anchor_in_place() {
        let (mut engine, _queue) = engine();
        engine.set_zoom(4.0, Duration::ZERO);
        let anchor = Point::new(50.0, 60.0);
        let before = engine.lat_lng_for_pixel(anchor);
        engine.scale_by(2.0, Some(anchor), Duration::ZERO);
        assert!((engine.zoom() - 5.0).abs() < 1e-9);
        let after = engine.lat_lng_for_pixel(anchor);
        assert!((before.lat - after.lat).abs() < 1e-6);
        assert!((before.lng - after.lng).abs() < 1e-6);
    }

    #[test]
    fn test_layer_insertion_rules() {
        let (mut engine, _queue) = engine();
        engine.add_layer(StyleLayer::new("water", "fill"), None).unwrap();
        engine.add_layer(StyleLayer::new("roads", "line"), None).unwrap();
        engine
            .add_layer(StyleLayer::new("land", "fill"), Some("roads"))
            .unwrap();
        assert_eq!(engine.layer_ids(), vec!["water", "land", "roads"]);

        assert!(matches!(
            engine.add_layer(StyleLayer::new("water", "fill"), None),
            Err(MapError::CannotAddLayer(_))
        ));
        assert!(matches!(
            engine.add_layer(StyleLayer::new("labels", "symbol"), Some("missing")),
            Err(MapError::CannotAddLayer(_))
        ));
        assert_eq!(engine.remove_layer("land").map(|l| l.id), Some("land".into()));
        assert!(engine.remove_layer("land").is_none());
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let (mut engine, queue) = engine();
        engine
            .add_source(StyleSource::geojson("points", json!({"type": "FeatureCollection", "features": []})))
            .unwrap();
        assert!(matches!(
            engine.add_source(StyleSource::geojson("points", json!({}))),
            Err(MapError::CannotAddSource(_))
        ));
        assert_eq!(changes(&queue), vec![MapChange::SourceDidChange]);
    }

    #[test]
    fn test_feature_queries() {
        let (mut engine, _queue) = engine();
        assert!(engine
            .query_rendered_features_at(Point::new(200.0, 150.0), &[])
            .is_none());

        engine.set_style_json(r#"{"version": 8, "layers": []}"#);
        let feature = Feature::new(FeatureGeometry::Point {
            coordinates: [0.0, 0.0],
        })
        .with_id("origin");
        engine
            .add_source(StyleSource::geojson(
                "points",
                json!({"type": "FeatureCollection", "features": [feature]}),
            ))
            .unwrap();
        engine
            .add_layer(StyleLayer::new("dots", "circle").with_source("points"), None)
            .unwrap();

        let center = engine.pixel_for_lat_lng(LatLng::new(0.0, 0.0));
        let hits = engine.query_rendered_features_at(center, &[]).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, Some(json!("origin")));

        let filtered = engine
            .query_rendered_features_at(center, &["other".to_string()])
            .unwrap();
        assert!(filtered.is_empty());

        let far = engine
            .query_rendered_features_in(ScreenRect::new(0.0, 0.0, 10.0, 10.0), &[])
            .unwrap();
        assert!(far.is_empty());
    }

    #[test]
    fn test_point_annotation_hit_test() {
        let (mut engine, _queue) = engine();
        let ids = engine.add_markers(&[
            Marker::new(LatLng::new(0.0, 0.0), "pin"),
            Marker::new(LatLng::new(60.0, 120.0), "pin"),
        ]);
        assert_eq!(ids.len(), 2);
        let center = engine.pixel_for_lat_lng(LatLng::new(0.0, 0.0));
        let rect = ScreenRect::new(center.x - 1.0, center.y - 1.0, center.x + 1.0, center.y + 1.0);
        assert_eq!(engine.query_point_annotations(rect), vec![ids[0]]);

        engine.update_marker(ids[0], LatLng::new(60.0, 120.0), "flag");
        assert!(engine.query_point_annotations(rect).is_empty());
        assert_eq!(engine.marker(ids[0]).map(|m| m.icon_id.as_str()), Some("flag"));

        engine.remove_annotations(&ids);
        assert_eq!(engine.annotation_count(), 0);
    }

    #[test]
    fn test_top_offset_uses_icon_scale() {
        let (mut engine, _queue) = engine();
        engine.add_annotation_icon("pin", 20, 40, 2.0, &[0; 20 * 40 * 4]);
        assert_eq!(engine.top_offset_pixels_for_annotation_symbol("pin"), -10.0);
        assert_eq!(engine.top_offset_pixels_for_annotation_symbol("none"), 0.0);
    }

    #[test]
    fn test_snapshot_on_next_frame() {
        let (mut engine, queue) = engine();
        engine.take_snapshot();
        engine.render();
        // no surface yet, nothing rendered
        assert!(queue.drain().is_empty());

        engine.create_surface(SurfaceHandle(7));
        engine.resize_framebuffer(4, 2);
        engine.render();
        let snapshot = queue.drain().into_iter().find_map(|event| match event {
            EngineEvent::SnapshotReady(image) => Some(image),
            _ => None,
        });
        let image = snapshot.flatten().unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(engine.frames_rendered(), 1);
    }

    #[test]
    fn test_debug_option_cycle_wraps() {
        let (mut engine, _queue) = engine();
        assert!(!engine.debug());
        for _ in 0..DEBUG_OPTION_COUNT {
            engine.cycle_debug_options();
            assert!(engine.debug());
        }
        engine.cycle_debug_options();
        assert!(!engine.debug());
    }

    #[test]
    fn test_style_url_waits_for_network() {
        let (mut engine, queue) = engine();
        engine.set_reachability(false);
        engine.set_style_url("asset://style.json");
        assert!(!engine.is_fully_loaded());
        assert!(changes(&queue).contains(&MapChange::DidFailLoadingMap));

        engine.set_reachability(true);
        assert!(engine.is_fully_loaded());
        assert!(changes(&queue).contains(&MapChange::DidFinishLoadingStyle));
    }
}
