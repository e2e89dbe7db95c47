//! Asset reference resolution.
//!
//! Turns a symbolic reference (`pylon:machines/pipes/tin_pipe`, `item/diamond`,
//! `block/stone`, `entity/steve.png`) into either one concrete texture or one
//! fully merged model. The choice is made here, once; callers match on
//! [`ResolvedAsset`] and never inspect shapes again.

pub mod descriptors;
pub mod item_resolver;
pub mod model_resolver;
pub mod state_resolver;
pub mod texture_refs;

pub use descriptors::DescriptorSource;
pub use item_resolver::{ItemResolver, ItemTarget};
pub use model_resolver::{merge_models, ModelResolver, MAX_INHERITANCE_DEPTH};
pub use state_resolver::StateResolver;
pub use texture_refs::{
    representative_texture, resolve_texture_references, MAX_SUBSTITUTION_PASSES,
};

use crate::config::IconConfig;
use crate::error::{IconError, Result};
use crate::resource_pack::{ModelDescriptor, TextureMap};
use crate::source::AssetFetcher;
use crate::types::{
    normalize_model_path, ModelLocation, Namespace, TexturePath, MINECRAFT_NAMESPACE,
    PYLON_REFERENCE_PREFIX,
};
use std::rc::Rc;
use tracing::{debug, warn};

/// A fully merged model together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    pub location: ModelLocation,
    pub model: Rc<ModelDescriptor>,
}

impl ResolvedModel {
    /// Texture map with every resolvable indirection dereferenced.
    pub fn resolved_textures(&self) -> TextureMap {
        resolve_texture_references(&self.model.textures)
    }

    /// Distinct concrete textures, in declaration order.
    pub fn distinct_textures(&self) -> Vec<TexturePath> {
        let mut distinct: Vec<TexturePath> = Vec::new();
        for value in self.resolved_textures().values() {
            let Some(concrete) = value.as_concrete() else {
                continue;
            };
            let texture = TexturePath::parse(concrete, Namespace::Minecraft);
            if !distinct.contains(&texture) {
                distinct.push(texture);
            }
        }
        distinct
    }

    /// The texture that best represents this model.
    pub fn representative_texture(&self, priority: &[String]) -> Option<TexturePath> {
        representative_texture(&self.resolved_textures(), priority)
            .map(|value| TexturePath::parse(&value, Namespace::Minecraft))
    }
}

/// Result of resolving a reference.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedAsset {
    /// A single image, relative to a mirror's textures root.
    Texture(TexturePath),
    /// A model with geometry or textures to render.
    Model(ResolvedModel),
}

/// Resolves references against the two asset mirrors.
///
/// Owns every resolution cache; they live as long as the resolver and are
/// never evicted.
pub struct AssetResolver<F> {
    source: Rc<DescriptorSource<F>>,
    models: ModelResolver<F>,
    states: StateResolver<F>,
    items: ItemResolver<F>,
}

impl<F: AssetFetcher> AssetResolver<F> {
    pub fn new(fetcher: Rc<F>, config: Rc<IconConfig>) -> Self {
        let source = Rc::new(DescriptorSource::new(fetcher, config));
        Self {
            models: ModelResolver::new(Rc::clone(&source)),
            states: StateResolver::new(Rc::clone(&source)),
            items: ItemResolver::new(Rc::clone(&source)),
            source,
        }
    }

    pub fn config(&self) -> &IconConfig {
        self.source.config()
    }

    /// Resolve a reference to a texture or a model.
    pub async fn resolve(&self, reference: &str) -> Result<ResolvedAsset> {
        let pylon_path = reference
            .strip_prefix(PYLON_REFERENCE_PREFIX)
            .and_then(|rest| rest.strip_prefix(':'));

        if reference.ends_with(".png") {
            let texture = match pylon_path {
                Some(path) => TexturePath::new(Namespace::Pylon, path),
                None => TexturePath::parse(reference, Namespace::Minecraft),
            };
            return Ok(ResolvedAsset::Texture(texture));
        }

        let resolved = match pylon_path {
            Some(path) => self.resolve_pylon(path).await,
            None => match ModelLocation::parse(reference) {
                Some(location) if location.namespace == Namespace::Pylon => {
                    self.resolve_model_reference(location).await
                }
                _ => self.resolve_minecraft(reference).await,
            },
        };

        resolved.ok_or_else(|| {
            warn!(reference, "failed to resolve");
            IconError::NotFound(reference.to_string())
        })
    }

    /// Resolve one model's inheritance chain.
    pub async fn resolve_model(&self, location: &ModelLocation) -> Result<Rc<ModelDescriptor>> {
        self.models.resolve(location).await
    }

    /// Representative texture of a model, if it has any concrete one.
    pub async fn texture_from_model(&self, location: &ModelLocation) -> Option<TexturePath> {
        let model = self.models.resolve(location).await.ok()?;
        ResolvedModel {
            location: location.clone(),
            model,
        }
        .representative_texture(&self.config().texture_priority)
    }

    /// Whether a block is known to have no blockstate file.
    pub fn is_known_without_blockstate(&self, namespace: Namespace, block_id: &str) -> bool {
        self.states.is_known_missing(namespace, block_id)
    }

    /// Addon references: block or item strategy first depending on the path.
    async fn resolve_pylon(&self, path: &str) -> Option<ResolvedAsset> {
        let model = if self.config().is_block_like(path) {
            match self.pylon_block_model(path).await {
                Some(model) => Some(model),
                None => self.pylon_item_model(path).await,
            }
        } else {
            match self.pylon_item_model(path).await {
                Some(model) => Some(model),
                None => self.pylon_block_model(path).await,
            }
        };

        model.map(ResolvedAsset::Model)
    }

    /// Block strategy: blockstate model, then `block/<path>`. Needs geometry.
    async fn pylon_block_model(&self, path: &str) -> Option<ResolvedModel> {
        if let Some(reference) = self.states.first_variant_model(Namespace::Pylon, path).await {
            if let Some(location) = ModelLocation::parse(&reference) {
                if let Some(model) = self.model_with_elements(location).await {
                    return Some(model);
                }
            }
        }

        let location = ModelLocation::new(Namespace::Pylon, format!("block/{}", path));
        self.model_with_elements(location).await
    }

    /// Item strategy: the item definition's model. Any non-empty model wins.
    async fn pylon_item_model(&self, path: &str) -> Option<ResolvedModel> {
        let ItemTarget::Model(location) = self.items.resolve(Namespace::Pylon, path).await? else {
            return None;
        };

        let model = self.models.resolve(&location).await.ok()?;
        if model.is_empty() {
            return None;
        }
        Some(ResolvedModel { location, model })
    }

    async fn model_with_elements(&self, location: ModelLocation) -> Option<ResolvedModel> {
        match self.models.resolve(&location).await {
            Ok(model) if model.has_elements() => Some(ResolvedModel { location, model }),
            Ok(_) => {
                debug!(model = %location, "model has no elements");
                None
            }
            Err(e) => {
                debug!(model = %location, error = %e, "model unavailable");
                None
            }
        }
    }

    /// A direct `pylonbase:` model reference.
    async fn resolve_model_reference(&self, location: ModelLocation) -> Option<ResolvedAsset> {
        let model = self.models.resolve(&location).await.ok()?;
        if model.is_empty() {
            return None;
        }
        Some(ResolvedAsset::Model(ResolvedModel { location, model }))
    }

    /// Vanilla references always end in a single texture.
    async fn resolve_minecraft(&self, reference: &str) -> Option<ResolvedAsset> {
        let path = reference
            .strip_prefix(MINECRAFT_NAMESPACE)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(reference);
        let path = normalize_model_path(path);
        let location = ModelLocation::new(Namespace::Minecraft, path.clone());

        if path.starts_with("item/") {
            match self.items.resolve(Namespace::Minecraft, &path).await {
                Some(ItemTarget::HeadTexture(texture)) => {
                    return Some(ResolvedAsset::Texture(TexturePath::new(
                        Namespace::Minecraft,
                        texture,
                    )));
                }
                Some(ItemTarget::Model(model)) => {
                    if let Some(texture) = self.texture_from_model(&model).await {
                        return Some(ResolvedAsset::Texture(texture));
                    }
                }
                None => {}
            }
        } else if let Some(block_id) = path.strip_prefix("block/") {
            if let Some(reference) = self
                .states
                .first_variant_model(Namespace::Minecraft, block_id)
                .await
            {
                if let Some(model) = ModelLocation::parse(&reference) {
                    if let Some(texture) = self.texture_from_model(&model).await {
                        return Some(ResolvedAsset::Texture(texture));
                    }
                }
            }
        }

        self.texture_from_model(&location)
            .await
            .map(ResolvedAsset::Texture)
    }
}
