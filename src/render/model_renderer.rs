//! 3D icon rendering of box-element models.

use super::camera::{CameraPreset, OrthoCamera};
use super::geometry::{face_uv_transform, Mesh};
use super::raster::{Material, Surface, NEUTRAL_GREY};
use super::resources::{RenderContext, ResourceTracker, Tracked};
use super::{check_surface_edge, Icon, MAX_SURFACE_EDGE};
use crate::config::RenderConfig;
use crate::error::{IconError, Result};
use crate::resource_pack::{
    load_texture_from_bytes, FaceDescriptor, ModelDescriptor, TextureData, TextureRef,
};
use crate::source::AssetFetcher;
use crate::types::Direction;
use image::imageops::{self, FilterType};
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use tracing::{debug, trace, warn};

type ModelContext = RenderContext<Mesh, Material, Rc<TextureData>, Surface>;

/// Identity of one render: model content, texture locations, size and camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RenderKey {
    model: u64,
    textures: u64,
    size: u32,
    preset: CameraPreset,
}

impl RenderKey {
    fn new(
        model: &ModelDescriptor,
        texture_urls: &IndexMap<String, String>,
        size: u32,
        preset: CameraPreset,
    ) -> Result<Self> {
        let mut hasher = DefaultHasher::new();
        serde_json::to_string(model)?.hash(&mut hasher);
        let model = hasher.finish();

        let mut hasher = DefaultHasher::new();
        for (key, url) in texture_urls {
            key.hash(&mut hasher);
            url.hash(&mut hasher);
        }
        let textures = hasher.finish();

        Ok(Self {
            model,
            textures,
            size,
            preset,
        })
    }
}

/// Rasterizes resolved models into icons.
///
/// Every mesh, material, texture and surface of a call lives in a
/// [`RenderContext`] registered with this renderer's [`ResourceTracker`] and is
/// released when the call returns. Finished icons are cached for the lifetime
/// of the renderer.
pub struct ModelRenderer<F> {
    fetcher: Rc<F>,
    config: RenderConfig,
    tracker: ResourceTracker,
    cache: RefCell<HashMap<RenderKey, Icon>>,
    render_count: Cell<usize>,
}

impl<F: AssetFetcher> ModelRenderer<F> {
    pub fn new(fetcher: Rc<F>, config: RenderConfig) -> Self {
        Self {
            fetcher,
            config,
            tracker: ResourceTracker::new(),
            cache: RefCell::new(HashMap::new()),
            render_count: Cell::new(0),
        }
    }

    /// Render a merged model at `size`×`size`.
    ///
    /// `texture_urls` maps a texture variable name (or a concrete texture path
    /// used directly by a face) to the location of its image. Faces whose
    /// texture cannot be loaded are drawn flat grey; faces without a texture
    /// are not drawn.
    pub async fn render_model(
        &self,
        model: &ModelDescriptor,
        texture_urls: &IndexMap<String, String>,
        size: u32,
        preset: CameraPreset,
    ) -> Result<Icon> {
        let key = RenderKey::new(model, texture_urls, size, preset)?;
        let cached = self.cache.borrow().get(&key).cloned();
        if let Some(icon) = cached {
            trace!(size, preset = preset.name(), "render cache hit");
            return Ok(icon);
        }

        if !model.has_elements() {
            return Err(IconError::RenderFailure("model has no elements".to_string()));
        }
        check_surface_edge(size)?;

        let mut context = ModelContext::new(&self.tracker);
        self.load_textures(&mut context, texture_urls).await;

        let icon = self.draw(&mut context, model, size, preset)?;
        debug!(
            size,
            preset = preset.name(),
            handles = context.handle_count(),
            "rendered model"
        );
        drop(context);

        self.render_count.set(self.render_count.get() + 1);
        self.cache.borrow_mut().insert(key, icon.clone());
        Ok(icon)
    }

    /// Handles currently held by in-flight renders.
    pub fn live_handles(&self) -> usize {
        self.tracker.live_handles()
    }

    /// How many times rasterization actually ran.
    pub fn render_count(&self) -> usize {
        self.render_count.get()
    }

    /// Number of cached icons.
    pub fn cached_renders(&self) -> usize {
        self.cache.borrow().len()
    }

    async fn load_textures(
        &self,
        context: &mut ModelContext,
        texture_urls: &IndexMap<String, String>,
    ) {
        let mut loaded: HashMap<&str, Rc<TextureData>> = HashMap::new();
        for (key, url) in texture_urls {
            if let Some(texture) = loaded.get(url.as_str()) {
                context.add_texture(key.clone(), Rc::clone(texture));
                continue;
            }

            match self.load_texture(url).await {
                Ok(texture) => {
                    let texture = Rc::new(texture);
                    loaded.insert(url.as_str(), Rc::clone(&texture));
                    context.add_texture(key.clone(), texture);
                }
                Err(e) => warn!(texture = %key, url = %url, error = %e, "texture failed to load"),
            }
        }
    }

    async fn load_texture(&self, url: &str) -> Result<TextureData> {
        let bytes = self.fetcher.fetch(url).await?;
        Ok(load_texture_from_bytes(&bytes)?.first_frame())
    }

    fn draw(
        &self,
        context: &mut ModelContext,
        model: &ModelDescriptor,
        size: u32,
        preset: CameraPreset,
    ) -> Result<Icon> {
        let mut draws = Vec::new();
        for element in model.elements() {
            let geometry = context.add_geometry(Mesh::from_element(element));
            let mut materials = Vec::with_capacity(Direction::BOX_ORDER.len());
            for direction in Direction::BOX_ORDER {
                let material = face_material(&context.textures, element.face(direction), preset);
                materials.push(context.add_material(material));
            }
            draws.push((geometry, materials));
        }

        // Large icons get less supersampling so the surface stays within bounds
        let supersample = match preset {
            CameraPreset::Pipe => self.config.pipe_supersample,
            CameraPreset::Generic { .. } => self.config.generic_supersample,
        }
        .min(MAX_SURFACE_EDGE / size)
        .max(1);
        context.set_surface(Surface::new(size * supersample, size * supersample)?);

        let camera = OrthoCamera::from_preset(preset);
        let surface = context
            .surface
            .as_mut()
            .ok_or_else(|| IconError::RenderFailure("surface missing".to_string()))?;
        for (geometry, material_ids) in &draws {
            let materials: Vec<&Material> =
                material_ids.iter().map(|id| &*context.materials[*id]).collect();
            surface.draw_mesh(&context.geometries[*geometry], &materials, &camera);
        }

        let image = imageops::resize(surface.image(), size, size, FilterType::Triangle);
        Icon::from_image(&image, preset.into())
    }
}

/// Material for one face of a box.
fn face_material(
    textures: &HashMap<String, Tracked<Rc<TextureData>>>,
    face: Option<&FaceDescriptor>,
    preset: CameraPreset,
) -> Material {
    let Some(face) = face else {
        return Material::Invisible;
    };
    let key = match &face.texture {
        Some(TextureRef::Reference(key)) => key,
        Some(TextureRef::Concrete(path)) => path,
        None => return Material::Invisible,
    };

    match textures.get(key) {
        Some(texture) => Material::Textured {
            texture: Rc::clone(&**texture),
            uv_transform: face_uv_transform(face),
            alpha_test: preset.alpha_test(),
        },
        None => Material::Solid(NEUTRAL_GREY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderStrategy;
    use crate::resource_pack::encode_png;
    use crate::source::MemoryFetcher;
    use image::{Rgba, RgbaImage};
    use serde_json::json;

    fn cube_model(texture: &str) -> ModelDescriptor {
        let face = json!({ "texture": texture });
        serde_json::from_value(json!({
            "textures": { "0": "pylonbase:block/tin_pipe" },
            "elements": [{
                "from": [0, 0, 0],
                "to": [16, 16, 16],
                "faces": {
                    "north": face, "south": face, "east": face,
                    "west": face, "up": face, "down": face
                }
            }]
        }))
        .unwrap()
    }

    fn urls(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn renderer() -> (Rc<MemoryFetcher>, ModelRenderer<MemoryFetcher>) {
        let fetcher = Rc::new(MemoryFetcher::new());
        let red = RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 255]));
        fetcher.insert("tex/red.png", encode_png(&red).unwrap());
        let renderer = ModelRenderer::new(Rc::clone(&fetcher), RenderConfig::default());
        (fetcher, renderer)
    }

    fn centre_pixel(icon: &Icon) -> [u8; 4] {
        let image = image::load_from_memory(&icon.png).unwrap().to_rgba8();
        image.get_pixel(icon.width / 2, icon.height / 2).0
    }

    #[tokio::test]
    async fn test_render_textured_cube() {
        let (_, renderer) = renderer();
        let icon = renderer
            .render_model(&cube_model("#0"), &urls(&[("0", "tex/red.png")]), 48, CameraPreset::Pipe)
            .await
            .unwrap();

        assert_eq!((icon.width, icon.height), (48, 48));
        assert_eq!(icon.strategy, RenderStrategy::PipeModel);
        assert_eq!(centre_pixel(&icon), [255, 0, 0, 255]);
    }

    #[tokio::test]
    async fn test_cache_skips_rendering() {
        let (fetcher, renderer) = renderer();
        let model = cube_model("#0");
        let textures = urls(&[("0", "tex/red.png")]);

        let first = renderer.render_model(&model, &textures, 32, CameraPreset::Pipe).await.unwrap();
        let second = renderer.render_model(&model, &textures, 32, CameraPreset::Pipe).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(renderer.render_count(), 1);
        assert_eq!(fetcher.request_count("tex/red.png"), 1);

        renderer.render_model(&model, &textures, 64, CameraPreset::Pipe).await.unwrap();
        assert_eq!(renderer.render_count(), 2);
        assert_eq!(renderer.cached_renders(), 2);
    }

    #[tokio::test]
    async fn test_missing_texture_is_grey() {
        let (_, renderer) = renderer();
        let icon = renderer
            .render_model(
                &cube_model("#0"),
                &urls(&[("0", "tex/missing.png")]),
                48,
                CameraPreset::Generic { wide: false },
            )
            .await
            .unwrap();
        assert_eq!(centre_pixel(&icon), NEUTRAL_GREY);
    }

    #[tokio::test]
    async fn test_concrete_face_texture_uses_path_key() {
        let (_, renderer) = renderer();
        let icon = renderer
            .render_model(
                &cube_model("pylonbase:block/red"),
                &urls(&[("pylonbase:block/red", "tex/red.png")]),
                48,
                CameraPreset::Pipe,
            )
            .await
            .unwrap();
        assert_eq!(centre_pixel(&icon), [255, 0, 0, 255]);
    }

    #[tokio::test]
    async fn test_untextured_faces_draw_nothing() {
        let (_, renderer) = renderer();
        let model: ModelDescriptor = serde_json::from_value(json!({
            "elements": [{ "from": [0, 0, 0], "to": [16, 16, 16], "faces": { "north": {} } }]
        }))
        .unwrap();

        let icon = renderer
            .render_model(&model, &IndexMap::new(), 16, CameraPreset::Pipe)
            .await
            .unwrap();
        let image = image::load_from_memory(&icon.png).unwrap().to_rgba8();
        assert!(image.pixels().all(|p| p[3] == 0));
    }

    #[tokio::test]
    async fn test_no_elements_fails() {
        let (_, renderer) = renderer();
        let model: ModelDescriptor =
            serde_json::from_value(json!({ "textures": { "layer0": "item/stick" } })).unwrap();

        let result = renderer
            .render_model(&model, &IndexMap::new(), 48, CameraPreset::Pipe)
            .await;
        assert!(matches!(result, Err(IconError::RenderFailure(_))));
        assert_eq!(renderer.render_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_icon_fails_without_fetching() {
        let (fetcher, renderer) = renderer();
        let result = renderer
            .render_model(
                &cube_model("#0"),
                &urls(&[("0", "tex/red.png")]),
                13108,
                CameraPreset::Pipe,
            )
            .await;
        assert!(matches!(result, Err(IconError::RenderFailure(_))));
        assert_eq!(fetcher.total_requests(), 0);
        assert_eq!(renderer.live_handles(), 0);
    }

    #[tokio::test]
    async fn test_no_live_handles_after_renders() {
        let (_, renderer) = renderer();
        for size in [16, 24, 32, 40] {
            renderer
                .render_model(
                    &cube_model("#0"),
                    &urls(&[("0", "tex/red.png"), ("1", "tex/missing.png")]),
                    size,
                    CameraPreset::Generic { wide: true },
                )
                .await
                .unwrap();
        }
        // Rejected before anything is fetched or registered
        let overflow = renderer
            .render_model(
                &cube_model("#0"),
                &urls(&[("0", "tex/red.png")]),
                u32::MAX,
                CameraPreset::Pipe,
            )
            .await;
        assert!(overflow.is_err());

        assert_eq!(renderer.render_count(), 4);
        assert_eq!(renderer.live_handles(), 0);
    }
}
