//! Conversion between physical pixels (UI side) and logical units (engine side).
//!
//! Every pixel offset, dimension and anchor crossing into the engine is divided
//! by the display's pixel ratio; every pixel result coming back is multiplied.
//! Integer sizes are truncated toward zero after conversion, so a round trip can
//! lose up to one ratio's worth of precision.

use crate::core::geo::{Point, ScreenRect};
use crate::{MapError, Result};

/// Display density ratio, fixed when the bridge is created
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRatio(f32);

impl PixelRatio {
    /// Creates a ratio; it must be finite and strictly positive
    pub fn new(ratio: f32) -> Result<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(MapError::InvalidArgument(format!(
                "pixel ratio must be a positive number, got {}",
                ratio
            )));
        }
        Ok(Self(ratio))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    pub fn to_logical(self, physical: f64) -> f64 {
        physical / self.0 as f64
    }

    pub fn to_physical(self, logical: f64) -> f64 {
        logical * self.0 as f64
    }

    /// Converts an integer dimension, truncating toward zero
    pub fn to_logical_size(self, physical: i32) -> i32 {
        (physical as f32 / self.0) as i32
    }

    pub fn point_to_logical(self, point: Point) -> Point {
        Point::new(self.to_logical(point.x), self.to_logical(point.y))
    }

    pub fn point_to_physical(self, point: Point) -> Point {
        Point::new(self.to_physical(point.x), self.to_physical(point.y))
    }

    pub fn rect_to_logical(self, rect: ScreenRect) -> ScreenRect {
        ScreenRect::new(
            self.to_logical(rect.left),
            self.to_logical(rect.top),
            self.to_logical(rect.right),
            self.to_logical(rect.bottom),
        )
    }
}

impl Default for PixelRatio {
    fn default() -> Self {
        Self(1.0)
    }
}
