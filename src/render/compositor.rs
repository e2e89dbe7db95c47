//! Cheap 2D isometric icons from a single texture, or from a model's bounds.

use super::canvas::{Canvas, Rect};
use super::{check_surface_edge, Icon, RenderStrategy};
use crate::error::{IconError, Result};
use crate::resource_pack::{load_texture_from_bytes, BoxElement, ModelDescriptor, TextureData};
use crate::source::AssetFetcher;
use glam::{Vec2, Vec3};
use image::RgbaImage;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Renders cube, head and flat icons by compositing one texture under
/// fixed affine transforms.
pub struct IsometricCompositor<F> {
    fetcher: Rc<F>,
    /// Keyed by (texture location, size). Never evicted.
    heads: RefCell<HashMap<(String, u32), Icon>>,
}

impl<F: AssetFetcher> IsometricCompositor<F> {
    pub fn new(fetcher: Rc<F>) -> Self {
        Self {
            fetcher,
            heads: RefCell::new(HashMap::new()),
        }
    }

    async fn load(&self, location: &str) -> Result<TextureData> {
        let bytes = self.fetcher.fetch(location).await?;
        Ok(load_texture_from_bytes(&bytes)?.first_frame())
    }

    /// Three skewed copies of the texture forming a cube.
    pub async fn render_cube(&self, location: &str, size: u32) -> Result<Icon> {
        check_surface_edge(size)?;
        let texture = self.load(location).await?;
        Icon::from_image(&cube_image(&texture, size), RenderStrategy::Cube)
    }

    /// A mob head from an entity skin atlas. Results are cached.
    pub async fn render_head(&self, location: &str, size: u32) -> Result<Icon> {
        check_surface_edge(size)?;
        let key = (location.to_string(), size);
        let cached = self.heads.borrow().get(&key).cloned();
        if let Some(icon) = cached {
            debug!(texture = location, size, "head cache hit");
            return Ok(icon);
        }

        // Decode failures propagate; only successes are cached
        let texture = self.load(location).await?;
        let icon = Icon::from_image(&head_image(&texture, size), RenderStrategy::Head)?;
        self.heads.borrow_mut().insert(key, icon.clone());
        Ok(icon)
    }

    /// The texture drawn flat and centred.
    pub async fn render_flat(&self, location: &str, size: u32) -> Result<Icon> {
        check_surface_edge(size)?;
        let texture = self.load(location).await?;
        Icon::from_image(&flat_image(&texture, size), RenderStrategy::Flat)
    }

    /// Left, right and top faces sized from the model's element bounds.
    ///
    /// Sides use texture `0` (else `particle`), the top uses `1` (else the
    /// side texture). `texture_urls` maps texture variables to locations.
    pub async fn render_model_composite(
        &self,
        model: &ModelDescriptor,
        texture_urls: &IndexMap<String, String>,
        size: u32,
    ) -> Result<Icon> {
        check_surface_edge(size)?;
        let bounds = ElementBounds::of(model.elements())
            .ok_or_else(|| IconError::RenderFailure("model has no extent".to_string()))?;

        let mut textures = HashMap::new();
        for key in ["0", "1", "particle"] {
            let Some(url) = texture_urls.get(key) else {
                continue;
            };
            match self.load(url).await {
                Ok(texture) => {
                    textures.insert(key, texture);
                }
                Err(e) => debug!(texture = key, url = %url, error = %e, "composite texture failed"),
            }
        }

        let side = textures
            .get("0")
            .or_else(|| textures.get("particle"))
            .ok_or_else(|| IconError::RenderFailure("no side texture".to_string()))?;
        let top = textures.get("1").unwrap_or(side);
        Icon::from_image(
            &model_composite_image(&bounds, side, top, size),
            RenderStrategy::ModelComposite,
        )
    }

    /// Number of cached head icons.
    pub fn cached_heads(&self) -> usize {
        self.heads.borrow().len()
    }
}

/// Axis-aligned extent of a set of elements, in model units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ElementBounds {
    /// Bounds of all elements, or `None` when width plus depth is not positive.
    pub fn of(elements: &[BoxElement]) -> Option<Self> {
        let mut min = Vec3::splat(16.0);
        let mut max = Vec3::ZERO;
        for element in elements {
            min = min.min(Vec3::from(element.from));
            max = max.max(Vec3::from(element.to));
        }
        let bounds = Self { min, max };
        (bounds.size().x + bounds.size().z > 0.0).then_some(bounds)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Composite a model's bounding box: left face at 70% opacity, right at 60%,
/// top at 100%, scaled so width plus depth spans the icon.
pub fn model_composite_image(
    bounds: &ElementBounds,
    side: &TextureData,
    top: &TextureData,
    size: u32,
) -> RgbaImage {
    let size_f = size as f32;
    let extent = bounds.size();
    let scale = size_f / (extent.x + extent.z);
    let (width, height, depth) = (extent.x * scale, extent.y * scale, extent.z * scale);
    let center = size_f / 2.0;

    let mut canvas = Canvas::new(size, size);

    canvas.save();
    canvas.translate(center - width * 0.5, center);
    canvas.transform(1.0, 0.5, 0.0, 1.0, 0.0, 0.0);
    canvas.set_global_alpha(0.7);
    canvas.draw_image(side, Rect::new(0.0, -height, depth, height));
    canvas.restore();

    canvas.save();
    canvas.translate(center + width * 0.5, center);
    canvas.transform(-1.0, -0.5, 0.0, 1.0, 0.0, 0.0);
    canvas.set_global_alpha(0.6);
    canvas.draw_image(side, Rect::new(0.0, -height, width, height));
    canvas.restore();

    canvas.save();
    canvas.translate(center, center - height);
    canvas.transform(1.0, -0.5, 1.0, 0.5, 0.0, 0.0);
    canvas.draw_image(top, Rect::new(-width / 2.0, -depth / 2.0, width, depth));
    canvas.restore();

    canvas.into_image()
}

/// Composite a cube: left face at 80% opacity, right at 65%, clipped top at 100%.
pub fn cube_image(texture: &TextureData, size: u32) -> RgbaImage {
    let size_f = size as f32;
    let cube = size_f * 0.9;
    let center_x = size_f / 2.0;
    let center_y = size_f / 2.0 + size_f * 0.1;
    let full = Rect::new(0.0, 0.0, cube, cube);

    let mut canvas = Canvas::new(size, size);

    canvas.save();
    canvas.translate(center_x - cube * 0.5, center_y - cube * 0.15);
    canvas.transform(1.0, 0.5, 0.0, 1.0, 0.0, 0.0);
    canvas.set_global_alpha(0.8);
    canvas.draw_image(texture, full);
    canvas.restore();

    canvas.save();
    canvas.translate(center_x + cube * 0.5, center_y - cube * 0.15);
    canvas.transform(-1.0, -0.5, 0.0, 1.0, 0.0, 0.0);
    canvas.set_global_alpha(0.65);
    canvas.draw_image(texture, full);
    canvas.restore();

    canvas.save();
    canvas.translate(center_x, center_y - cube * 0.65);
    canvas.clip_polygon(&[
        Vec2::new(0.0, -cube * 0.25),
        Vec2::new(cube * 0.5, 0.0),
        Vec2::new(0.0, cube * 0.25),
        Vec2::new(-cube * 0.5, 0.0),
    ]);
    canvas.set_global_alpha(1.0);
    canvas.translate(-cube / 2.0, -cube / 2.0);
    canvas.draw_image(texture, full);
    canvas.restore();

    canvas.into_image()
}

/// Composite a head from the 8×8 top (8,0), front (8,8) and side (16,8) regions.
pub fn head_image(texture: &TextureData, size: u32) -> RgbaImage {
    let size_f = size as f32;
    let scale = size_f / 24.0 * 1.5;
    let face = 12.0 * scale;

    let mut canvas = Canvas::new(size, size);

    canvas.save();
    canvas.translate(size_f / 2.0, size_f / 4.0);
    canvas.transform(1.0, -0.5, 1.0, 0.5, 0.0, 0.0);
    canvas.draw_image_region(
        texture,
        Rect::new(8.0, 0.0, 8.0, 8.0),
        Rect::new(-6.0 * scale, -6.0 * scale, face, face),
    );
    canvas.restore();

    canvas.save();
    canvas.translate(size_f / 2.0 - face, size_f / 2.0 - 12.0);
    canvas.transform(1.0, 0.5, 0.0, 1.0, 0.0, 0.0);
    canvas.draw_image_region(
        texture,
        Rect::new(8.0, 8.0, 8.0, 8.0),
        Rect::new(0.0, 0.0, face, face),
    );
    canvas.restore();

    canvas.save();
    canvas.translate(size_f / 2.0, size_f / 2.0);
    canvas.transform(1.0, -0.5, 0.0, 1.0, 0.0, 0.0);
    canvas.set_global_alpha(0.8);
    canvas.draw_image_region(
        texture,
        Rect::new(16.0, 8.0, 8.0, 8.0),
        Rect::new(0.0, 0.0, face, face),
    );
    canvas.restore();

    canvas.into_image()
}

/// Draw the texture centred at `min(0.7 × size, width, height)`.
pub fn flat_image(texture: &TextureData, size: u32) -> RgbaImage {
    let size_f = size as f32;
    let edge = (size_f * 0.7)
        .min(texture.width as f32)
        .min(texture.height as f32);
    let offset = (size_f - edge) / 2.0;

    let mut canvas = Canvas::new(size, size);
    canvas.draw_image(texture, Rect::new(offset, offset, edge, edge));
    canvas.into_image()
}
