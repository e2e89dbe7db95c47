//! Reference-to-icon pipeline.
//!
//! [`IconPipeline`] ties an [`AssetResolver`] to a [`RenderDispatcher`]. Each
//! request's state trace is returned with its [`IconResult`]; the pipeline
//! keeps no per-request history.

use crate::catalog::{CatalogItem, ImageReference};
use crate::config::IconConfig;
use crate::render::{RenderDispatcher, RenderKind, RenderOutput, RenderPayload};
use crate::resolver::{AssetResolver, ResolvedAsset, ResolvedModel};
use crate::source::AssetFetcher;
use std::rc::Rc;
use tracing::{debug, warn};

/// Stage of one icon request.
///
/// ```text
/// Requested -> Resolving -> ResolutionFailed -> FlatFallback
///                        -> Resolved -> Rendering -> RenderFailed -> FlatFallback
///                                                 -> Rendered -> Cached
/// ```
///
/// References that already name a texture go straight from `Requested` to
/// `Resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    Requested,
    Resolving,
    ResolutionFailed,
    Resolved,
    Rendering,
    RenderFailed,
    Rendered,
    FlatFallback,
    Cached,
}

impl RequestState {
    /// States reachable in one step.
    pub fn successors(&self) -> &'static [RequestState] {
        use RequestState::*;
        match self {
            Requested => &[Resolving, Resolved],
            Resolving => &[ResolutionFailed, Resolved],
            ResolutionFailed => &[FlatFallback],
            Resolved => &[Rendering],
            Rendering => &[RenderFailed, Rendered],
            RenderFailed => &[FlatFallback],
            Rendered => &[Cached],
            FlatFallback | Cached => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}

/// The states one request went through, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTrace {
    pub reference: String,
    pub states: Vec<RequestState>,
}

impl RequestTrace {
    fn new(reference: &str) -> Self {
        Self {
            reference: reference.to_string(),
            states: vec![RequestState::Requested],
        }
    }

    fn advance(&mut self, next: RequestState) {
        let current = self.current();
        if !current.successors().contains(&next) {
            warn!(
                reference = %self.reference,
                from = ?current,
                to = ?next,
                "unexpected request transition"
            );
        }
        self.states.push(next);
    }

    pub fn current(&self) -> RequestState {
        self.states
            .last()
            .copied()
            .unwrap_or(RequestState::Requested)
    }

    /// Whether the request reached a terminal state.
    pub fn is_complete(&self) -> bool {
        self.current().is_terminal()
    }
}

/// Outcome of one icon request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconResult {
    pub reference: ImageReference,
    /// A rendered icon, or the location of an image to show as is.
    pub output: RenderOutput,
    /// Location derived from the item's fallback reference, if it had one.
    pub fallback: Option<String>,
    pub trace: RequestTrace,
}

enum Target {
    Texture(String),
    Model(ResolvedModel),
}

/// Resolves image references and renders them into icons.
pub struct IconPipeline<F> {
    fetcher: Rc<F>,
    config: Rc<IconConfig>,
    resolver: AssetResolver<F>,
    dispatcher: RenderDispatcher<F>,
}

impl<F: AssetFetcher> IconPipeline<F> {
    pub fn new(fetcher: Rc<F>, config: IconConfig) -> Self {
        let config = Rc::new(config);
        Self {
            resolver: AssetResolver::new(Rc::clone(&fetcher), Rc::clone(&config)),
            dispatcher: RenderDispatcher::new(Rc::clone(&fetcher), Rc::clone(&config)),
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &IconConfig {
        &self.config
    }

    /// The fetcher shared by resolution and rendering.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn resolver(&self) -> &AssetResolver<F> {
        &self.resolver
    }

    pub fn dispatcher(&self) -> &RenderDispatcher<F> {
        &self.dispatcher
    }

    /// Icon for a catalog item.
    pub async fn icon_for_item(&self, item: &CatalogItem, size: Option<u32>) -> IconResult {
        self.icon_for(&item.image, item.fallback.as_deref(), size).await
    }

    /// Icon for an image reference.
    ///
    /// Models render in 3D (or as a cube of their main texture), skull
    /// references render as heads, other textures are drawn flat. When
    /// nothing can be drawn the output is the location of an image to show
    /// instead. `size` defaults to the configured icon size.
    pub async fn icon_for(
        &self,
        image: &str,
        fallback: Option<&str>,
        size: Option<u32>,
    ) -> IconResult {
        let size = size.unwrap_or(self.config.render.default_size);
        let reference = ImageReference::parse(image);
        let fallback = fallback.map(|f| self.direct_location(&ImageReference::parse(f)));
        let mut trace = RequestTrace::new(image);

        let target = if reference.is_direct_texture() {
            Some(Target::Texture(self.direct_location(&reference)))
        } else {
            trace.advance(RequestState::Resolving);
            match self.resolver.resolve(&reference.resolver_reference()).await {
                Ok(ResolvedAsset::Texture(texture)) => {
                    Some(Target::Texture(self.config.texture_location(&texture)))
                }
                Ok(ResolvedAsset::Model(model)) => Some(Target::Model(model)),
                Err(e) => {
                    debug!(reference = %reference, error = %e, "resolution failed");
                    None
                }
            }
        };

        let output = match target {
            Some(target) => {
                trace.advance(RequestState::Resolved);
                self.render(&reference, image, target, fallback.clone(), size, &mut trace)
                    .await
            }
            None => {
                trace.advance(RequestState::ResolutionFailed);
                trace.advance(RequestState::FlatFallback);
                RenderOutput::Passthrough(self.direct_location(&reference))
            }
        };

        IconResult {
            reference,
            output,
            fallback,
            trace,
        }
    }

    async fn render(
        &self,
        reference: &ImageReference,
        image: &str,
        target: Target,
        fallback: Option<String>,
        size: u32,
        trace: &mut RequestTrace,
    ) -> RenderOutput {
        trace.advance(RequestState::Rendering);

        let is_model = matches!(target, Target::Model(_));
        let (kind, payload) = match target {
            Target::Model(model) => (
                RenderKind::CompositeModel,
                RenderPayload::Model {
                    source: image.to_string(),
                    model,
                },
            ),
            Target::Texture(location) => {
                let kind = if reference.is_head() {
                    RenderKind::Head
                } else {
                    RenderKind::Pipe
                };
                let payload = RenderPayload::Texture {
                    location,
                    fallback: fallback.clone(),
                };
                (kind, payload)
            }
        };

        match self.dispatcher.render(kind, &payload, size).await {
            RenderOutput::Image(icon) => {
                trace.advance(RequestState::Rendered);
                trace.advance(RequestState::Cached);
                RenderOutput::Image(icon)
            }
            RenderOutput::Passthrough(location) => {
                trace.advance(RequestState::RenderFailed);
                trace.advance(RequestState::FlatFallback);
                // A model reference is no image location; show a texture instead
                if is_model {
                    RenderOutput::Passthrough(
                        fallback.unwrap_or_else(|| self.direct_location(reference)),
                    )
                } else {
                    RenderOutput::Passthrough(location)
                }
            }
        }
    }

    /// The texture location a reference names without any resolution.
    pub fn direct_location(&self, reference: &ImageReference) -> String {
        match reference {
            ImageReference::Pylon(path) => self.config.pylon.texture_url(path),
            ImageReference::Minecraft(path) => self.config.minecraft.texture_url(path),
            ImageReference::Direct(location) => location.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MirrorConfig;
    use crate::render::RenderStrategy;
    use crate::resource_pack::encode_png;
    use crate::source::MemoryFetcher;
    use image::{Rgba, RgbaImage};
    use serde_json::json;
    use RequestState::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(width, height, Rgba([90, 140, 200, 255]))).unwrap()
    }

    fn create_pipeline() -> (Rc<MemoryFetcher>, IconPipeline<MemoryFetcher>) {
        let fetcher = Rc::new(MemoryFetcher::new());
        let config = IconConfig::default()
            .with_minecraft_mirror(MirrorConfig::with_base("mc"))
            .with_pylon_mirror(MirrorConfig::with_base("pylon"));
        (Rc::clone(&fetcher), IconPipeline::new(fetcher, config))
    }

    fn insert_tin_pipe(fetcher: &MemoryFetcher) {
        fetcher.insert_json(
            "pylon/items/machines/pipes/tin_pipe.json",
            &json!({ "model": { "type": "model", "model": "pylonbase:item/tin_pipe" } }),
        );
        fetcher.insert_json(
            "pylon/models/item/tin_pipe.json",
            &json!({
                "textures": { "0": "pylonbase:block/tin_pipe", "particle": "#0" },
                "elements": [{
                    "from": [6, 6, 0],
                    "to": [10, 10, 16],
                    "faces": {
                        "north": { "uv": [0, 0, 4, 4], "texture": "#0" },
                        "east": { "uv": [0, 4, 16, 8], "texture": "#0" },
                        "up": { "uv": [0, 4, 16, 8], "texture": "#0" }
                    }
                }]
            }),
        );
        fetcher.insert("pylon/textures/block/tin_pipe.png", png(16, 16));
    }

    #[tokio::test]
    async fn test_pipe_renders_in_3d() {
        let (fetcher, pipeline) = create_pipeline();
        insert_tin_pipe(&fetcher);

        let result = pipeline
            .icon_for("pylon:machines/pipes/tin_pipe", None, Some(32))
            .await;
        let icon = result.output.icon().unwrap();
        assert_eq!(icon.strategy, RenderStrategy::PipeModel);
        assert_eq!(icon.width, 32);
        assert_eq!(
            result.trace.states,
            vec![Requested, Resolving, Resolved, Rendering, Rendered, Cached]
        );
        assert!(result.trace.is_complete());
    }

    #[tokio::test]
    async fn test_vanilla_item_draws_flat_texture() {
        let (fetcher, pipeline) = create_pipeline();
        fetcher.insert_json("mc/items/diamond.json", &json!({ "model": "minecraft:item/diamond" }));
        fetcher.insert_json(
            "mc/models/item/diamond.json",
            &json!({ "parent": "minecraft:item/generated", "textures": { "layer0": "minecraft:item/diamond" } }),
        );
        fetcher.insert("mc/textures/item/diamond.png", png(16, 16));

        let result = pipeline.icon_for("minecraft:item/diamond", None, None).await;
        let icon = result.output.icon().unwrap();
        assert_eq!(icon.strategy, RenderStrategy::Flat);
        assert_eq!(icon.width, 48);
    }

    #[tokio::test]
    async fn test_skeleton_skull_renders_head() {
        let (fetcher, pipeline) = create_pipeline();
        fetcher.insert_json(
            "mc/items/skeleton_skull.json",
            &json!({ "model": {
                "type": "minecraft:special",
                "model": { "type": "minecraft:head", "kind": "skeleton" }
            } }),
        );
        fetcher.insert("mc/textures/entity/skeleton/skeleton.png", png(64, 32));

        let result = pipeline
            .icon_for("minecraft:item/skeleton_skull", None, Some(48))
            .await;
        assert_eq!(result.output.icon().unwrap().strategy, RenderStrategy::Head);
    }

    #[tokio::test]
    async fn test_direct_texture_skips_resolution() {
        let (fetcher, pipeline) = create_pipeline();
        fetcher.insert("pylon/textures/block/tin_pipe.png", png(16, 16));

        let result = pipeline.icon_for("pylon:block/tin_pipe", None, Some(24)).await;
        assert!(result.output.is_image());
        assert_eq!(
            result.trace.states,
            vec![Requested, Resolved, Rendering, Rendered, Cached]
        );
        assert_eq!(fetcher.total_requests(), 1);
    }

    #[tokio::test]
    async fn test_unresolvable_falls_back_to_direct_location() {
        let (_, pipeline) = create_pipeline();

        let result = pipeline
            .icon_for("pylon:tools/unknown", Some("pylon:item/unknown.png"), None)
            .await;
        assert_eq!(
            result.output,
            RenderOutput::Passthrough("pylon/textures/tools/unknown.png".to_string())
        );
        assert_eq!(result.fallback.as_deref(), Some("pylon/textures/item/unknown.png"));
        assert_eq!(
            result.trace.states,
            vec![Requested, Resolving, ResolutionFailed, FlatFallback]
        );
    }

    #[tokio::test]
    async fn test_failed_model_render_shows_fallback() {
        let (fetcher, pipeline) = create_pipeline();
        // Textures only, and the texture itself is missing
        fetcher.insert_json(
            "pylon/items/tools/hammer.json",
            &json!({ "model": "pylonbase:item/hammer" }),
        );
        fetcher.insert_json(
            "pylon/models/item/hammer.json",
            &json!({ "textures": { "layer0": "pylonbase:item/hammer" } }),
        );

        let result = pipeline
            .icon_for("pylon:tools/hammer", Some("minecraft:item/iron_pickaxe.png"), None)
            .await;
        assert_eq!(
            result.output,
            RenderOutput::Passthrough("mc/textures/item/iron_pickaxe.png".to_string())
        );
        assert_eq!(result.trace.current(), FlatFallback);
        assert!(result.trace.states.contains(&RenderFailed));
    }

    #[tokio::test]
    async fn test_each_result_carries_its_own_trace() {
        let (fetcher, pipeline) = create_pipeline();
        insert_tin_pipe(&fetcher);

        let item = CatalogItem {
            id: "tin_pipe".to_string(),
            name: "Tin Pipe".to_string(),
            name_en: "Tin Pipe".to_string(),
            description: String::new(),
            tag: String::new(),
            image: "pylon:machines/pipes/tin_pipe".to_string(),
            fallback: None,
        };
        let traces = [
            pipeline.icon_for_item(&item, Some(16)).await.trace,
            pipeline.icon_for_item(&item, Some(16)).await.trace,
            pipeline.icon_for("minecraft:item/nothing", None, None).await.trace,
        ];
        assert!(traces.iter().all(RequestTrace::is_complete));
        assert_eq!(traces[0], traces[1]);
        assert_eq!(traces[0].reference, "pylon:machines/pipes/tin_pipe");
        assert_eq!(traces[2].reference, "minecraft:item/nothing");
        assert_eq!(traces[2].current(), FlatFallback);
        assert_eq!(traces[2].states, vec![Requested, Resolving, ResolutionFailed, FlatFallback]);

        let renderer = pipeline.dispatcher().model_renderer().unwrap();
        assert_eq!(renderer.render_count(), 1);
        assert_eq!(renderer.live_handles(), 0);
    }

    #[test]
    fn test_state_machine_edges() {
        assert!(Requested.successors().contains(&Resolving));
        assert!(Rendering.successors().contains(&RenderFailed));
        assert!(FlatFallback.is_terminal());
        assert!(Cached.is_terminal());
        assert!(!Rendered.is_terminal());
    }
}
