//! Strategy selection with ordered fallback.

use super::camera::CameraPreset;
use super::compositor::IsometricCompositor;
use super::model_renderer::ModelRenderer;
use super::Icon;
use crate::config::IconConfig;
use crate::error::{IconError, Result};
use crate::resolver::ResolvedModel;
use crate::resource_pack::TextureRef;
use crate::source::AssetFetcher;
use crate::types::{Namespace, TexturePath};
use indexmap::IndexMap;
use std::rc::Rc;
use tracing::{debug, error};

/// Requested kind of icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderKind {
    /// Mob head from an entity skin.
    Head,
    /// 2D isometric cube from one texture.
    Cube,
    /// The texture drawn flat.
    Pipe,
    /// A resolved model, rendered in 3D when possible.
    CompositeModel,
}

impl RenderKind {
    pub fn name(&self) -> &'static str {
        match self {
            RenderKind::Head => "head",
            RenderKind::Cube => "cube",
            RenderKind::Pipe => "pipe",
            RenderKind::CompositeModel => "model",
        }
    }

    /// Parse a kind name. `pylon-3d` is accepted for composite models.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "head" => Some(RenderKind::Head),
            "cube" => Some(RenderKind::Cube),
            "pipe" => Some(RenderKind::Pipe),
            "model" | "pylon-3d" => Some(RenderKind::CompositeModel),
            _ => None,
        }
    }
}

/// What to render.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPayload {
    /// A texture location, with an optional second location to try.
    Texture {
        location: String,
        fallback: Option<String>,
    },
    /// A resolved model and the reference it came from.
    Model { source: String, model: ResolvedModel },
}

impl RenderPayload {
    pub fn texture(location: impl Into<String>) -> Self {
        RenderPayload::Texture {
            location: location.into(),
            fallback: None,
        }
    }

    /// The value handed back when nothing could be rendered.
    pub fn source(&self) -> &str {
        match self {
            RenderPayload::Texture { location, .. } => location,
            RenderPayload::Model { source, .. } => source,
        }
    }
}

/// A rendered icon, or the input returned unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutput {
    Image(Icon),
    Passthrough(String),
}

impl RenderOutput {
    pub fn icon(&self) -> Option<&Icon> {
        match self {
            RenderOutput::Image(icon) => Some(icon),
            RenderOutput::Passthrough(_) => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, RenderOutput::Image(_))
    }
}

/// Chooses between the 2D compositor and the 3D model renderer.
///
/// Never fails: every error ends in a fallback or a passthrough.
pub struct RenderDispatcher<F> {
    config: Rc<IconConfig>,
    compositor: IsometricCompositor<F>,
    /// `None` when 3D rendering is disabled.
    models: Option<ModelRenderer<F>>,
}

impl<F: AssetFetcher> RenderDispatcher<F> {
    pub fn new(fetcher: Rc<F>, config: Rc<IconConfig>) -> Self {
        let models = config
            .render
            .enable_3d
            .then(|| ModelRenderer::new(Rc::clone(&fetcher), config.render.clone()));
        Self {
            compositor: IsometricCompositor::new(fetcher),
            models,
            config,
        }
    }

    pub fn compositor(&self) -> &IsometricCompositor<F> {
        &self.compositor
    }

    pub fn model_renderer(&self) -> Option<&ModelRenderer<F>> {
        self.models.as_ref()
    }

    /// Render a payload as the given kind.
    pub async fn render(
        &self,
        kind: RenderKind,
        payload: &RenderPayload,
        size: u32,
    ) -> RenderOutput {
        match (kind, payload) {
            (RenderKind::CompositeModel, RenderPayload::Model { source, model }) => {
                self.render_model(source, model, size).await
            }
            (RenderKind::CompositeModel, RenderPayload::Texture { .. })
            | (_, RenderPayload::Model { .. }) => {
                debug!(kind = kind.name(), "payload does not match render kind");
                RenderOutput::Passthrough(payload.source().to_string())
            }
            (_, RenderPayload::Texture { location, fallback }) => {
                self.render_texture(kind, location, fallback.as_deref(), size)
                    .await
            }
        }
    }

    async fn render_texture(
        &self,
        kind: RenderKind,
        location: &str,
        fallback: Option<&str>,
        size: u32,
    ) -> RenderOutput {
        let error = match self.composite(kind, location, size).await {
            Ok(icon) => return RenderOutput::Image(icon),
            Err(e) => e,
        };
        debug!(texture = location, kind = kind.name(), error = %error, "texture render failed");

        if let Some(fallback) = fallback {
            match self.composite(kind, fallback, size).await {
                Ok(icon) => return RenderOutput::Image(icon),
                Err(e) => debug!(texture = fallback, error = %e, "fallback render failed"),
            }
        }
        RenderOutput::Passthrough(location.to_string())
    }

    async fn composite(&self, kind: RenderKind, location: &str, size: u32) -> Result<Icon> {
        match kind {
            RenderKind::Head => self.compositor.render_head(location, size).await,
            RenderKind::Cube => self.compositor.render_cube(location, size).await,
            RenderKind::Pipe => self.compositor.render_flat(location, size).await,
            RenderKind::CompositeModel => Err(IconError::RenderFailure(
                "models are not composited from a texture".to_string(),
            )),
        }
    }

    /// 3D first, then (when enabled) a composite of the element bounds, then a
    /// cube of the representative texture, then passthrough.
    async fn render_model(
        &self,
        source: &str,
        resolved: &ResolvedModel,
        size: u32,
    ) -> RenderOutput {
        let texture_urls = self.texture_urls(resolved);
        if let Some(models) = &self.models {
            let preset = CameraPreset::for_texture_count(
                resolved.distinct_textures().len(),
                self.config.render.pipe_texture_limit,
            );
            match models
                .render_model(&resolved.model, &texture_urls, size, preset)
                .await
            {
                Ok(icon) => return RenderOutput::Image(icon),
                Err(e) => error!(model = %resolved.location, error = %e, "3D render failed"),
            }
        }

        if self.config.render.bounds_composite && resolved.model.has_elements() {
            match self
                .compositor
                .render_model_composite(&resolved.model, &texture_urls, size)
                .await
            {
                Ok(icon) => return RenderOutput::Image(icon),
                Err(e) => debug!(model = %resolved.location, error = %e, "bounds composite failed"),
            }
        }

        if let Some(texture) = resolved.representative_texture(&self.config.texture_priority) {
            let location = self.config.texture_location(&texture);
            match self.compositor.render_cube(&location, size).await {
                Ok(icon) => return RenderOutput::Image(icon),
                Err(e) => debug!(texture = %location, error = %e, "cube fallback failed"),
            }
        }

        RenderOutput::Passthrough(source.to_string())
    }

    /// Image locations for every texture variable with a concrete value, plus
    /// concrete paths that faces name directly.
    fn texture_urls(&self, resolved: &ResolvedModel) -> IndexMap<String, String> {
        let mut urls = IndexMap::new();
        for (key, value) in resolved.resolved_textures() {
            if let Some(path) = value.as_concrete() {
                let texture = TexturePath::parse(path, Namespace::Minecraft);
                urls.insert(key, self.config.texture_location(&texture));
            }
        }

        for element in resolved.model.elements() {
            for face in element.faces.values() {
                if let Some(TextureRef::Concrete(path)) = &face.texture {
                    if !urls.contains_key(path) {
                        let texture = TexturePath::parse(path, Namespace::Minecraft);
                        urls.insert(path.clone(), self.config.texture_location(&texture));
                    }
                }
            }
        }
        urls
    }
}
