//! A small 2D canvas over an RGBA buffer.
//!
//! Mirrors the usual immediate-mode canvas model: a current affine transform
//! composed by `translate`/`transform`, a global alpha, an optional polygon
//! clip, and `save`/`restore`. Images are drawn nearest-neighbour.

use super::raster::blend;
use crate::resource_pack::TextureData;
use glam::{Affine2, Vec2};
use image::RgbaImage;

#[derive(Debug, Clone)]
struct CanvasState {
    transform: Affine2,
    global_alpha: f32,
    /// Clip polygon in device space.
    clip: Option<Vec<Vec2>>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            global_alpha: 1.0,
            clip: None,
        }
    }
}

/// Source and destination rectangles for [`Canvas::draw_image`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

pub struct Canvas {
    pixels: RgbaImage,
    state: CanvasState,
    stack: Vec<CanvasState>,
}

impl Canvas {
    /// A transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            state: CanvasState::default(),
            stack: Vec::new(),
        }
    }

    pub fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform * Affine2::from_translation(Vec2::new(x, y));
    }

    /// Multiply the current transform by `[a c e; b d f]`.
    pub fn transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.state.transform = self.state.transform * Affine2::from_cols_array(&[a, b, c, d, e, f]);
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.state.global_alpha = alpha.clamp(0.0, 1.0);
    }

    /// Clip later drawing to a polygon given in current coordinates.
    ///
    /// Intersecting with an earlier clip is not supported; the new one replaces it.
    pub fn clip_polygon(&mut self, points: &[Vec2]) {
        let transform = self.state.transform;
        self.state.clip = Some(
            points
                .iter()
                .map(|p| transform.transform_point2(*p))
                .collect(),
        );
    }

    /// Draw the whole image into `dst`.
    pub fn draw_image(&mut self, image: &TextureData, dst: Rect) {
        let src = Rect::new(0.0, 0.0, image.width as f32, image.height as f32);
        self.draw_image_region(image, src, dst);
    }

    /// Draw the `src` region of an image into `dst`, both before transform.
    pub fn draw_image_region(&mut self, image: &TextureData, src: Rect, dst: Rect) {
        if dst.width == 0.0 || dst.height == 0.0 || image.width == 0 || image.height == 0 {
            return;
        }

        let transform = self.state.transform;
        let inverse = transform.inverse();
        if !inverse.is_finite() {
            return;
        }

        let corners = [
            Vec2::new(dst.x, dst.y),
            Vec2::new(dst.x + dst.width, dst.y),
            Vec2::new(dst.x + dst.width, dst.y + dst.height),
            Vec2::new(dst.x, dst.y + dst.height),
        ]
        .map(|p| transform.transform_point2(p));

        let (width, height) = (self.pixels.width() as i64, self.pixels.height() as i64);
        let min = corners.iter().fold(Vec2::splat(f32::MAX), |acc, p| acc.min(*p));
        let max = corners.iter().fold(Vec2::splat(f32::MIN), |acc, p| acc.max(*p));
        let (x0, x1) = ((min.x.floor() as i64).max(0), (max.x.ceil() as i64).min(width - 1));
        let (y0, y1) = ((min.y.floor() as i64).max(0), (max.y.ceil() as i64).min(height - 1));

        for y in y0..=y1 {
            for x in x0..=x1 {
                let device = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if let Some(clip) = &self.state.clip {
                    if !point_in_polygon(device, clip) {
                        continue;
                    }
                }

                let local = inverse.transform_point2(device);
                let u = (local.x - dst.x) / dst.width;
                let v = (local.y - dst.y) / dst.height;
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }

                let sx = (src.x + u * src.width).floor() as i64;
                let sy = (src.y + v * src.height).floor() as i64;
                if sx < 0 || sy < 0 || sx >= image.width as i64 || sy >= image.height as i64 {
                    continue;
                }

                let texel = image.get_pixel(sx as u32, sy as u32);
                blend(
                    self.pixels.get_pixel_mut(x as u32, y as u32),
                    texel,
                    self.state.global_alpha,
                );
            }
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Even-odd point-in-polygon test.
fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
