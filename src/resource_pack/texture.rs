//! Texture decoding and PNG encoding.

use crate::error::{IconError, Result};
use image::{ImageEncoder, RgbaImage};

/// Raw texture data decoded from PNG.
#[derive(Debug, Clone)]
pub struct TextureData {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
    /// Whether this texture looks like a vertical animation strip.
    pub is_animated: bool,
    /// Animation frame count (1 if not animated).
    pub frame_count: u32,
}

impl TextureData {
    /// Create a new texture from RGBA data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
            is_animated: false,
            frame_count: 1,
        }
    }

    /// A single-colour texture.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = (0..width * height).flat_map(|_| color).collect();
        Self::new(width, height, pixels)
    }

    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Nearest-neighbour lookup with image-space coordinates in 0..1 (v top-down).
    pub fn sample_nearest(&self, u: f32, v: f32) -> [u8; 4] {
        let x = ((u * self.width as f32).floor() as i64).clamp(0, self.width as i64 - 1);
        let y = ((v * self.height as f32).floor() as i64).clamp(0, self.height as i64 - 1);
        self.get_pixel(x as u32, y as u32)
    }

    /// Get the first frame of an animated texture (or the whole texture if not animated).
    pub fn first_frame(&self) -> TextureData {
        if !self.is_animated || self.frame_count <= 1 {
            return self.clone();
        }

        let frame_height = self.height / self.frame_count;
        let frame_size = (self.width * frame_height * 4) as usize;

        Self::new(self.width, frame_height, self.pixels[..frame_size].to_vec())
    }
}

/// Decode a texture from PNG bytes.
pub fn load_texture_from_bytes(data: &[u8]) -> Result<TextureData> {
    let img = image::load_from_memory(data)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    // Animation strips are taller than wide, with height a multiple of width
    let is_animated = width > 0 && height > width && height % width == 0;
    let frame_count = if is_animated { height / width } else { 1 };

    Ok(TextureData {
        width,
        height,
        pixels: rgba.into_raw(),
        is_animated,
        frame_count,
    })
}

/// Encode an RGBA canvas as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let cursor = std::io::Cursor::new(&mut bytes);
    let encoder = image::codecs::png::PngEncoder::new(cursor);

    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| IconError::RenderFailure(format!("Failed to encode PNG: {}", e)))?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_texture() {
        let tex = TextureData::solid(3, 2, [1, 2, 3, 4]);
        assert_eq!(tex.pixels.len(), 3 * 2 * 4);
        assert_eq!(tex.get_pixel(2, 1), [1, 2, 3, 4]);
        assert!(!tex.is_animated);
    }

    #[test]
    fn test_get_pixel() {
        let tex = TextureData::new(
            2,
            2,
            vec![255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 255, 255, 255, 255],
        );

        assert_eq!(tex.get_pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(tex.get_pixel(1, 0), [0, 255, 0, 255]);
        assert_eq!(tex.get_pixel(0, 1), [0, 0, 255, 255]);
        assert_eq!(tex.sample_nearest(0.99, 0.99), [255, 255, 255, 255]);
        assert_eq!(tex.sample_nearest(-1.0, 2.0), [0, 0, 255, 255]);
    }

    #[test]
    fn test_png_round_trip_detects_animation() {
        let strip = RgbaImage::from_pixel(4, 12, image::Rgba([10, 20, 30, 255]));
        let png = encode_png(&strip).unwrap();

        let tex = load_texture_from_bytes(&png).unwrap();
        assert!(tex.is_animated);
        assert_eq!(tex.frame_count, 3);
        assert_eq!(tex.first_frame().height, 4);
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        assert!(load_texture_from_bytes(b"not a png").is_err());
    }
}
