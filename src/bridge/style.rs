//! Runtime style access: style document, layers, sources and images.

use super::MapBridge;
use crate::data::image::Image;
use crate::data::style::{StyleLayer, StyleSource};
use crate::engine::MapEngine;
use crate::Result;
use std::time::Duration;

impl<E: MapEngine> MapBridge<E> {
    pub fn set_style_url(&mut self, url: &str) {
        if let Some(engine) = self.engine_mut("set_style_url") {
            engine.set_style_url(url);
        }
    }

    pub fn style_url(&self) -> Option<String> {
        self.engine("style_url").and_then(|e| e.style_url())
    }

    pub fn set_style_json(&mut self, json: &str) {
        if let Some(engine) = self.engine_mut("set_style_json") {
            engine.set_style_json(json);
        }
    }

    pub fn style_json(&self) -> Option<String> {
        self.engine("style_json").and_then(|e| e.style_json())
    }

    pub fn transition_duration(&self) -> Duration {
        self.engine("transition_duration")
            .map(|e| e.transition_duration())
            .unwrap_or_default()
    }

    pub fn set_transition_duration(&mut self, duration: Duration) {
        if let Some(engine) = self.engine_mut("set_transition_duration") {
            engine.set_transition_duration(duration);
        }
    }

    pub fn transition_delay(&self) -> Duration {
        self.engine("transition_delay")
            .map(|e| e.transition_delay())
            .unwrap_or_default()
    }

    pub fn set_transition_delay(&mut self, delay: Duration) {
        if let Some(engine) = self.engine_mut("set_transition_delay") {
            engine.set_transition_delay(delay);
        }
    }

    pub fn layer(&self, id: &str) -> Option<StyleLayer> {
        self.engine("layer").and_then(|e| e.layer(id))
    }

    /// Adds `layer` on top of the stack
    pub fn add_layer(&mut self, layer: StyleLayer) -> Result<()> {
        match self.engine_mut("add_layer") {
            Some(engine) => engine.add_layer(layer, None),
            None => Ok(()),
        }
    }

    /// Adds `layer` directly below the layer `before`
    pub fn add_layer_below(&mut self, layer: StyleLayer, before: &str) -> Result<()> {
        match self.engine_mut("add_layer_below") {
            Some(engine) => engine.add_layer(layer, Some(before)),
            None => Ok(()),
        }
    }

    pub fn remove_layer(&mut self, id: &str) -> Option<StyleLayer> {
        self.engine_mut("remove_layer")
            .and_then(|e| e.remove_layer(id))
    }

    pub fn source(&self, id: &str) -> Option<StyleSource> {
        self.engine("source").and_then(|e| e.source(id))
    }

    pub fn add_source(&mut self, source: StyleSource) -> Result<()> {
        match self.engine_mut("add_source") {
            Some(engine) => engine.add_source(source),
            None => Ok(()),
        }
    }

    pub fn remove_source(&mut self, id: &str) -> Option<StyleSource> {
        self.engine_mut("remove_source")
            .and_then(|e| e.remove_source(id))
    }

    /// Registers a style image. Non-RGBA8888 data is converted first and the
    /// image density becomes its pixel ratio.
    pub fn add_image(&mut self, name: &str, image: Image) {
        let Some(engine) = self.engine_mut("add_image") else {
            return;
        };
        let pixel_ratio = image.pixel_ratio();
        let image = image.into_rgba8888();
        log::debug!(
            "adding image {} ({}x{} @{})",
            name,
            image.width,
            image.height,
            pixel_ratio
        );
        engine.add_image(name, &image, pixel_ratio);
    }

    pub fn remove_image(&mut self, name: &str) {
        if let Some(engine) = self.engine_mut("remove_image") {
            engine.remove_image(name);
        }
    }
}
