use crate::core::geo::LatLng;
use crate::data::image::Image;
use serde::{Deserialize, Serialize};

/// Engine-assigned annotation handle
pub type AnnotationId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Assigned by the engine once added
    pub id: Option<AnnotationId>,
    pub position: LatLng,
    pub icon_id: String,
}

impl Marker {
    pub fn new(position: LatLng, icon_id: impl Into<String>) -> Self {
        Self {
            id: None,
            position,
            icon_id: icon_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub id: Option<AnnotationId>,
    pub points: Vec<LatLng>,
    /// ARGB color
    pub color: u32,
    pub width: f32,
    pub alpha: f32,
}

impl Polyline {
    pub fn new(points: Vec<LatLng>) -> Self {
        Self {
            id: None,
            points,
            color: 0xFF00_0000,
            width: 1.0,
            alpha: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub id: Option<AnnotationId>,
    pub points: Vec<LatLng>,
    pub fill_color: u32,
    pub stroke_color: u32,
    pub alpha: f32,
}

impl Polygon {
    pub fn new(points: Vec<LatLng>) -> Self {
        Self {
            id: None,
            points,
            fill_color: 0xFF00_0000,
            stroke_color: 0xFF00_0000,
            alpha: 1.0,
        }
    }
}

/// Marker icon registered under a symbol name
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    pub id: String,
    pub image: Image,
}

impl Icon {
    pub fn new(id: impl Into<String>, image: Image) -> Self {
        Self {
            id: id.into(),
            image,
        }
    }
}
