//! Raw pixel buffers crossing the engine boundary.
//!
//! The engine only accepts 4-channel `Rgba8888` data, so any other format is
//! expanded before dispatch.

use crate::core::constants::DENSITY_DEFAULT;
use crate::{MapError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 4 bytes per pixel, R G B A
    Rgba8888,
    /// 2 bytes per pixel, little endian `rrrrrggg gggbbbbb`
    Rgb565,
    /// 2 bytes per pixel, little endian `rrrrgggg bbbbaaaa`
    Argb4444,
    /// 1 byte per pixel, alpha only
    Alpha8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8888 => 4,
            PixelFormat::Rgb565 | PixelFormat::Argb4444 => 2,
            PixelFormat::Alpha8 => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Dots per inch the image was authored for, `DENSITY_NONE` if unknown
    pub density: u32,
    pub pixels: Vec<u8>,
}

impl Image {
    /// Wraps a pixel buffer, checking its length against the dimensions
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(MapError::InvalidArgument(format!(
                "image of {}x{} {:?} needs {} bytes, got {}",
                width,
                height,
                format,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            density: DENSITY_DEFAULT,
            pixels,
        })
    }

    /// Solid RGBA image
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            format: PixelFormat::Rgba8888,
            density: DENSITY_DEFAULT,
            pixels,
        }
    }

    pub fn with_density(mut self, density: u32) -> Self {
        self.density = density;
        self
    }

    /// Ratio of the image density to the baseline density.
    ///
    /// `DENSITY_NONE` is not normalized to the baseline; it is used as-is and
    /// yields a ratio of zero.
    pub fn pixel_ratio(&self) -> f32 {
        self.density as f32 / DENSITY_DEFAULT as f32
    }

    /// Returns the image in `Rgba8888`, converting if necessary
    pub fn into_rgba8888(self) -> Image {
        let pixels = match self.format {
            PixelFormat::Rgba8888 => return self,
            PixelFormat::Rgb565 => self
                .pixels
                .chunks_exact(2)
                .flat_map(|px| {
                    let v = u16::from_le_bytes([px[0], px[1]]);
                    let r = ((v >> 11) & 0x1f) as u8;
                    let g = ((v >> 5) & 0x3f) as u8;
                    let b = (v & 0x1f) as u8;
                    [
                        (r << 3) | (r >> 2),
                        (g << 2) | (g >> 4),
                        (b << 3) | (b >> 2),
                        0xff,
                    ]
                })
                .collect(),
            PixelFormat::Argb4444 => self
                .pixels
                .chunks_exact(2)
                .flat_map(|px| {
                    let v = u16::from_le_bytes([px[0], px[1]]);
                    let expand = |n: u16| ((n & 0xf) as u8) * 0x11;
                    [expand(v >> 12), expand(v >> 8), expand(v >> 4), expand(v)]
                })
                .collect(),
            PixelFormat::Alpha8 => self.pixels.iter().flat_map(|&a| [0, 0, 0, a]).collect(),
        };
        Image {
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgba8888,
            density: self.density,
            pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::DENSITY_NONE;

    #[test]
    fn test_length_checked() {
        assert!(Image::new(2, 2, PixelFormat::Rgba8888, vec![0; 15]).is_err());
        assert!(Image::new(2, 2, PixelFormat::Rgb565, vec![0; 8]).is_ok());
    }

    #[test]
    fn test_rgb565_expands_to_four_channels() {
        // pure red, pure green
        let pixels = [0xF800_u16, 0x07E0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let image = Image::new(2, 1, PixelFormat::Rgb565, pixels)
            .unwrap()
            .into_rgba8888();
        assert_eq!(image.format, PixelFormat::Rgba8888);
        assert_eq!(image.pixels, vec![255, 0, 0, 255, 0, 255, 0, 255]);
    }

    #[test]
    fn test_alpha8_and_4444() {
        let alpha = Image::new(1, 1, PixelFormat::Alpha8, vec![0x80])
            .unwrap()
            .into_rgba8888();
        assert_eq!(alpha.pixels, vec![0, 0, 0, 0x80]);

        let packed = Image::new(1, 1, PixelFormat::Argb4444, 0xF08F_u16.to_le_bytes().to_vec())
            .unwrap()
            .into_rgba8888();
        assert_eq!(packed.pixels, vec![0xff, 0x00, 0x88, 0xff]);
    }

    #[test]
    fn test_pixel_ratio_from_density() {
        let image = Image::filled(1, 1, [0; 4]);
        assert_eq!(image.clone().with_density(320).pixel_ratio(), 2.0);
        assert_eq!(image.clone().with_density(DENSITY_DEFAULT).pixel_ratio(), 1.0);
        assert_eq!(image.with_density(DENSITY_NONE).pixel_ratio(), 0.0);
    }
}
