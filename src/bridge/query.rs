//! Feature queries, annotation hit tests and projections.

use super::MapBridge;
use crate::core::geo::{LatLng, Point, ProjectedMeters, ScreenRect};
use crate::data::annotations::AnnotationId;
use crate::data::geojson::Feature;
use crate::engine::MapEngine;

impl<E: MapEngine> MapBridge<E> {
    /// Features rendered under `point` (physical pixels). An empty
    /// `layer_ids` queries every layer.
    pub fn query_rendered_features_at(&self, point: Point, layer_ids: &[String]) -> Vec<Feature> {
        let point = self.pixel_ratio.point_to_logical(point);
        self.engine("query_rendered_features_at")
            .and_then(|e| e.query_rendered_features_at(point, layer_ids))
            .unwrap_or_default()
    }

    /// Features rendered inside `rect` (physical pixels)
    pub fn query_rendered_features_in(&self, rect: ScreenRect, layer_ids: &[String]) -> Vec<Feature> {
        let rect = self.pixel_ratio.rect_to_logical(rect);
        self.engine("query_rendered_features_in")
            .and_then(|e| e.query_rendered_features_in(rect, layer_ids))
            .unwrap_or_default()
    }

    /// Ids of point annotations inside `rect`.
    ///
    /// Unlike the feature queries, `rect` reaches the engine exactly as given,
    /// in physical pixels.
    pub fn query_point_annotations(&self, rect: ScreenRect) -> Vec<AnnotationId> {
        self.engine("query_point_annotations")
            .map(|e| e.query_point_annotations(rect))
            .unwrap_or_default()
    }

    /// Logical-unit offset from an icon's anchor to its top edge
    pub fn top_offset_pixels_for_annotation_symbol(&self, symbol: &str) -> f64 {
        self.engine("top_offset_pixels_for_annotation_symbol")
            .map(|e| e.top_offset_pixels_for_annotation_symbol(symbol))
            .unwrap_or(0.0)
    }

    /// Meters covered by one pixel at `lat`, at the current zoom
    pub fn meters_per_pixel_at_latitude(&self, lat: f64) -> f64 {
        self.engine("meters_per_pixel_at_latitude")
            .map(|e| e.meters_per_pixel_at_latitude(lat, e.zoom()))
            .unwrap_or(0.0)
    }

    pub fn projected_meters_for_lat_lng(&self, lat_lng: LatLng) -> Option<ProjectedMeters> {
        self.engine("projected_meters_for_lat_lng")
            .map(|e| e.projected_meters_for_lat_lng(lat_lng))
    }

    pub fn lat_lng_for_projected_meters(&self, meters: ProjectedMeters) -> LatLng {
        self.engine("lat_lng_for_projected_meters")
            .map(|e| e.lat_lng_for_projected_meters(meters).wrap())
            .unwrap_or_default()
    }

    /// Screen position of `lat_lng` in physical pixels
    pub fn pixel_for_lat_lng(&self, lat_lng: LatLng) -> Point {
        let ratio = self.pixel_ratio;
        self.engine("pixel_for_lat_lng")
            .map(|e| ratio.point_to_physical(e.pixel_for_lat_lng(lat_lng)))
            .unwrap_or_default()
    }

    pub fn lat_lng_for_pixel(&self, pixel: Point) -> LatLng {
        let pixel = self.pixel_ratio.point_to_logical(pixel);
        self.engine("lat_lng_for_pixel")
            .map(|e| e.lat_lng_for_pixel(pixel).wrap())
            .unwrap_or_default()
    }
}
