//! Prelude module for common bridge types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use maplet_bridge::prelude::*;`

pub use crate::animation::transitions::{
    CameraTarget, CameraValues, EaseCurve, Transition, TransitionMode,
};

pub use crate::bridge::MapBridge;

pub use crate::core::{
    config::{BridgeOptions, DisplayContext},
    geo::{EdgePadding, LatLng, LatLngBounds, Point, ProjectedMeters, ScreenRect},
    units::PixelRatio,
};

pub use crate::data::{
    annotations::{AnnotationId, Icon, Marker, Polygon, Polyline},
    geojson::{Feature, FeatureGeometry},
    image::{Image, PixelFormat},
    style::{SourceKind, StyleLayer, StyleSource},
};

pub use crate::engine::{initialize, MapEngine, SurfaceHandle};

#[cfg(feature = "headless")]
pub use crate::engine::headless::HeadlessEngine;

pub use crate::events::{listeners::ListenerId, MapChange, MapViewHost};

pub use crate::logging::init_logging;

pub use crate::{MapError, Result};

pub use std::time::Duration;
