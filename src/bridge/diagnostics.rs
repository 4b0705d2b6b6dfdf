use super::MapBridge;
use crate::engine::MapEngine;

impl<E: MapEngine> MapBridge<E> {
    pub fn set_debug(&mut self, debug: bool) {
        if let Some(engine) = self.engine_mut("set_debug") {
            engine.set_debug(debug);
        }
    }

    pub fn debug(&self) -> bool {
        self.engine("debug").map(|e| e.debug()).unwrap_or(false)
    }

    /// Steps through the engine's debug overlays
    pub fn cycle_debug_options(&mut self) {
        if let Some(engine) = self.engine_mut("cycle_debug_options") {
            engine.cycle_debug_options();
        }
    }

    pub fn set_enable_fps(&mut self, enable: bool) {
        if let Some(engine) = self.engine_mut("set_enable_fps") {
            engine.set_enable_fps(enable);
        }
    }

    pub fn is_fully_loaded(&self) -> bool {
        self.engine("is_fully_loaded")
            .map(|e| e.is_fully_loaded())
            .unwrap_or(false)
    }

    pub fn on_low_memory(&mut self) {
        if let Some(engine) = self.engine_mut("on_low_memory") {
            engine.on_low_memory();
        }
    }

    pub fn set_reachability(&mut self, reachable: bool) {
        if let Some(engine) = self.engine_mut("set_reachability") {
            engine.set_reachability(reachable);
        }
    }

    pub fn set_api_base_url(&mut self, url: &str) {
        if let Some(engine) = self.engine_mut("set_api_base_url") {
            engine.set_api_base_url(url);
        }
    }

    /// Asks the engine for a snapshot of the next rendered frame
    pub fn schedule_take_snapshot(&mut self) {
        if let Some(engine) = self.engine_mut("schedule_take_snapshot") {
            engine.take_snapshot();
        }
    }
}
