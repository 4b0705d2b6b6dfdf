//! Runtime style objects as the engine stores them.
//!
//! Paint and layout properties stay opaque JSON; parsing them is engine work.

use serde::{Deserialize, Serialize};

/// A style layer, identified by `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleLayer {
    pub id: String,
    /// Layer type such as `fill`, `line`, `symbol` or `background`
    #[serde(rename = "type")]
    pub layer_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub properties: serde_json::Value,
}

impl StyleLayer {
    pub fn new(id: impl Into<String>, layer_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layer_type: layer_type.into(),
            source: None,
            properties: serde_json::Value::Null,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = properties;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Vector,
    Raster,
    GeoJson,
    Image,
}

/// A style source, identified by `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSource {
    pub id: String,
    pub kind: SourceKind,
    /// Inline data (GeoJSON) or a descriptor such as `{"url": ...}`
    #[serde(default)]
    pub data: serde_json::Value,
}

impl StyleSource {
    pub fn new(id: impl Into<String>, kind: SourceKind, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            kind,
            data,
        }
    }

    pub fn geojson(id: impl Into<String>, data: serde_json::Value) -> Self {
        Self::new(id, SourceKind::GeoJson, data)
    }
}
