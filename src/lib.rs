//! # maplet-bridge
//!
//! The boundary object between a UI layer and a native map rendering engine.
//!
//! A [`MapBridge`] owns exactly one engine handle. It forwards view lifecycle
//! events, camera requests, style mutations and spatial queries to the engine
//! through the typed [`MapEngine`] trait, converting physical pixels (UI side)
//! into logical, density-independent units (engine side) and back.
//!
//! Engine notifications arrive through an [`EventSink`] that may be used from
//! any thread; [`MapBridge::dispatch_events`] drains them on the owner thread.

pub mod animation;
pub mod bridge;
pub mod core;
pub mod data;
pub mod engine;
pub mod events;
pub mod logging;
pub mod prelude;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{BridgeOptions, DeviceProfile, DisplayContext, ResourceBudget, ResourceProfile},
    geo::{EdgePadding, LatLng, LatLngBounds, Point, ProjectedMeters, ScreenRect},
    units::PixelRatio,
};

pub use animation::transitions::{CameraTarget, CameraValues, EaseCurve, Transition, TransitionMode};

pub use bridge::MapBridge;

pub use data::{
    annotations::{AnnotationId, Icon, Marker, Polygon, Polyline},
    geojson::{Feature, FeatureGeometry},
    image::{Image, PixelFormat},
    style::{SourceKind, StyleLayer, StyleSource},
};

pub use engine::{initialize, is_initialized, EngineParams, MapEngine, SurfaceHandle};

#[cfg(feature = "headless")]
pub use engine::headless::HeadlessEngine;

pub use events::{
    listeners::{ListenerId, ListenerSet},
    EngineEvent, EventSink, MapChange, MapViewHost,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot add layer: {0}")]
    CannotAddLayer(String),

    #[error("Cannot add source: {0}")]
    CannotAddSource(String),

    #[error("Engine not initialized, call `maplet_bridge::initialize()` at startup")]
    EngineNotInitialized,

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;
