//! Marker, polyline and polygon annotations plus their icons.

use super::MapBridge;
use crate::data::annotations::{AnnotationId, Icon, Marker, Polygon, Polyline};
use crate::engine::MapEngine;
use crate::{MapError, Result};

fn require_id(kind: &str, id: Option<AnnotationId>) -> Result<AnnotationId> {
    id.ok_or_else(|| {
        MapError::InvalidArgument(format!("{} has not been added to the map yet.", kind))
    })
}

impl<E: MapEngine> MapBridge<E> {
    /// Returns the new id, 0 after destroy
    pub fn add_marker(&mut self, marker: &Marker) -> AnnotationId {
        self.engine_mut("add_marker")
            .and_then(|e| e.add_markers(std::slice::from_ref(marker)).first().copied())
            .unwrap_or(0)
    }

    pub fn add_markers(&mut self, markers: &[Marker]) -> Vec<AnnotationId> {
        self.engine_mut("add_markers")
            .map(|e| e.add_markers(markers))
            .unwrap_or_default()
    }

    pub fn add_polyline(&mut self, polyline: &Polyline) -> AnnotationId {
        self.engine_mut("add_polyline")
            .and_then(|e| e.add_polylines(std::slice::from_ref(polyline)).first().copied())
            .unwrap_or(0)
    }

    pub fn add_polylines(&mut self, polylines: &[Polyline]) -> Vec<AnnotationId> {
        self.engine_mut("add_polylines")
            .map(|e| e.add_polylines(polylines))
            .unwrap_or_default()
    }

    pub fn add_polygon(&mut self, polygon: &Polygon) -> AnnotationId {
        self.engine_mut("add_polygon")
            .and_then(|e| e.add_polygons(std::slice::from_ref(polygon)).first().copied())
            .unwrap_or(0)
    }

    pub fn add_polygons(&mut self, polygons: &[Polygon]) -> Vec<AnnotationId> {
        self.engine_mut("add_polygons")
            .map(|e| e.add_polygons(polygons))
            .unwrap_or_default()
    }

    /// Moves a marker and swaps its icon. The marker must carry its id.
    pub fn update_marker(&mut self, marker: &Marker) -> Result<()> {
        let Some(engine) = self.engine_mut("update_marker") else {
            return Ok(());
        };
        let id = require_id("marker", marker.id)?;
        engine.update_marker(id, marker.position, &marker.icon_id);
        Ok(())
    }

    pub fn update_polyline(&mut self, polyline: &Polyline) -> Result<()> {
        let Some(engine) = self.engine_mut("update_polyline") else {
            return Ok(());
        };
        let id = require_id("polyline", polyline.id)?;
        engine.update_polyline(id, polyline);
        Ok(())
    }

    pub fn update_polygon(&mut self, polygon: &Polygon) -> Result<()> {
        let Some(engine) = self.engine_mut("update_polygon") else {
            return Ok(());
        };
        let id = require_id("polygon", polygon.id)?;
        engine.update_polygon(id, polygon);
        Ok(())
    }

    pub fn remove_annotation(&mut self, id: AnnotationId) {
        if let Some(engine) = self.engine_mut("remove_annotation") {
            engine.remove_annotations(&[id]);
        }
    }

    pub fn remove_annotations(&mut self, ids: &[AnnotationId]) {
        if let Some(engine) = self.engine_mut("remove_annotations") {
            engine.remove_annotations(ids);
        }
    }

    /// Registers raw RGBA icon pixels under `symbol`
    pub fn add_annotation_icon(
        &mut self,
        symbol: &str,
        width: u32,
        height: u32,
        scale: f32,
        pixels: &[u8],
    ) -> Result<()> {
        let Some(engine) = self.engine_mut("add_annotation_icon") else {
            return Ok(());
        };
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(MapError::InvalidArgument(format!(
                "icon {} needs {} bytes of RGBA data, got {}",
                symbol,
                expected,
                pixels.len()
            )));
        }
        engine.add_annotation_icon(symbol, width, height, scale, pixels);
        Ok(())
    }

    /// Registers an [`Icon`], converting its image and using its density as scale
    pub fn add_icon(&mut self, icon: &Icon) -> Result<()> {
        let scale = icon.image.pixel_ratio();
        let image = icon.image.clone().into_rgba8888();
        self.add_annotation_icon(&icon.id, image.width, image.height, scale, &image.pixels)
    }
}
