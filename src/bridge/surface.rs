//! Render surface lifecycle and view geometry.

use super::MapBridge;
use crate::core::constants::MAX_DIMENSION;
use crate::core::geo::EdgePadding;
use crate::engine::{MapEngine, SurfaceHandle};
use crate::{MapError, Result};

impl<E: MapEngine> MapBridge<E> {
    pub fn initialize_display(&mut self) {
        if let Some(engine) = self.engine_mut("initialize_display") {
            engine.initialize_display();
        }
    }

    pub fn terminate_display(&mut self) {
        if let Some(engine) = self.engine_mut("terminate_display") {
            engine.terminate_display();
        }
    }

    pub fn initialize_context(&mut self) {
        if let Some(engine) = self.engine_mut("initialize_context") {
            engine.initialize_context();
        }
    }

    pub fn terminate_context(&mut self) {
        if let Some(engine) = self.engine_mut("terminate_context") {
            engine.terminate_context();
        }
    }

    pub fn create_surface(&mut self, surface: SurfaceHandle) {
        if let Some(engine) = self.engine_mut("create_surface") {
            engine.create_surface(surface);
        }
    }

    pub fn destroy_surface(&mut self) {
        if let Some(engine) = self.engine_mut("destroy_surface") {
            engine.destroy_surface();
        }
    }

    pub fn update(&mut self) {
        if let Some(engine) = self.engine_mut("update") {
            engine.update();
        }
    }

    pub fn render(&mut self) {
        if let Some(engine) = self.engine_mut("render") {
            engine.render();
        }
    }

    /// Resizes the view, given in physical pixels.
    ///
    /// Some devices report absurd sizes; anything above 65535 logical units is
    /// capped (and logged) rather than rejected. Negative sizes are an error.
    pub fn resize_view(&mut self, width: i32, height: i32) -> Result<()> {
        let ratio = self.pixel_ratio;
        let Some(engine) = self.engine_mut("resize_view") else {
            return Ok(());
        };
        let width = view_dimension("width", ratio.to_logical_size(width))?;
        let height = view_dimension("height", ratio.to_logical_size(height))?;
        engine.resize_view(width, height);
        Ok(())
    }

    /// Resizes the framebuffer, given in device buffer units. No clamping here.
    pub fn resize_framebuffer(&mut self, width: i32, height: i32) -> Result<()> {
        let Some(engine) = self.engine_mut("resize_framebuffer") else {
            return Ok(());
        };
        let width = framebuffer_dimension("width", width)?;
        let height = framebuffer_dimension("height", height)?;
        engine.resize_framebuffer(width, height);
        Ok(())
    }

    /// `padding` is `[left, top, right, bottom]` in physical pixels
    pub fn set_content_padding(&mut self, padding: [i32; 4]) {
        let ratio = self.pixel_ratio;
        let Some(engine) = self.engine_mut("set_content_padding") else {
            return;
        };
        let [left, top, right, bottom] = padding.map(|p| ratio.to_logical(p as f64));
        engine.set_content_padding(EdgePadding::new(top, left, bottom, right));
    }
}

fn view_dimension(name: &str, logical: i32) -> Result<u16> {
    if logical < 0 {
        return Err(MapError::InvalidArgument(format!("{} cannot be negative.", name)));
    }
    if logical > MAX_DIMENSION {
        log::error!(
            "Device returned an out of range {} size, capping value at {} instead of {}",
            name,
            MAX_DIMENSION,
            logical
        );
        return Ok(MAX_DIMENSION as u16);
    }
    Ok(logical as u16)
}

fn framebuffer_dimension(name: &str, value: i32) -> Result<u16> {
    if value < 0 {
        return Err(MapError::InvalidArgument(format!(
            "framebuffer {} cannot be negative.",
            name
        )));
    }
    if value > MAX_DIMENSION {
        return Err(MapError::InvalidArgument(format!(
            "framebuffer {} cannot be greater than {}.",
            name, MAX_DIMENSION
        )));
    }
    Ok(value as u16)
}
