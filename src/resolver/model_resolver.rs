//! Model inheritance resolution.

use super::descriptors::DescriptorSource;
use crate::error::{IconError, Result};
use crate::resource_pack::ModelDescriptor;
use crate::source::AssetFetcher;
use crate::types::ModelLocation;
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};

/// Maximum depth for model inheritance to prevent infinite loops.
pub const MAX_INHERITANCE_DEPTH: usize = 10;

/// Resolves model inheritance chains into single merged models.
///
/// Fully merged models are cached by location for the resolver's lifetime.
pub struct ModelResolver<F> {
    source: Rc<DescriptorSource<F>>,
    cache: RefCell<HashMap<ModelLocation, Rc<ModelDescriptor>>>,
}

impl<F: AssetFetcher> ModelResolver<F> {
    pub fn new(source: Rc<DescriptorSource<F>>) -> Self {
        Self {
            source,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve a model with all inherited properties.
    pub async fn resolve(&self, location: &ModelLocation) -> Result<Rc<ModelDescriptor>> {
        // Check cache first
        let cached = self.cache.borrow().get(location).cloned();
        if let Some(model) = cached {
            return Ok(model);
        }

        let resolved = Rc::new(self.resolve_at(location.clone(), 0).await?);

        self.cache
            .borrow_mut()
            .insert(location.clone(), Rc::clone(&resolved));

        Ok(resolved)
    }

    /// Number of fully merged models held.
    pub fn cached_count(&self) -> usize {
        self.cache.borrow().len()
    }

    fn resolve_at(
        &self,
        location: ModelLocation,
        depth: usize,
    ) -> LocalBoxFuture<'_, Result<ModelDescriptor>> {
        async move {
            if depth > MAX_INHERITANCE_DEPTH {
                warn!(model = %location, depth, "model inheritance too deep");
                return Err(IconError::InheritanceTooDeep(location.to_string()));
            }

            let base_model = self.source.model(&location).await?;

            let parent_location = match base_model.parent.as_deref() {
                Some(parent) if !is_builtin(parent) => ModelLocation::parse(parent),
                // No parent, or a builtin one with nothing to fetch
                _ => None,
            };
            let Some(parent_location) = parent_location else {
                return Ok(ModelDescriptor {
                    parent: None,
                    ..(*base_model).clone()
                });
            };

            // A parent that cannot be resolved leaves the child with its own data
            match self.resolve_at(parent_location.clone(), depth + 1).await {
                Ok(parent_model) => Ok(merge_models(&parent_model, &base_model)),
                Err(e) => {
                    if !matches!(e, IconError::InheritanceTooDeep(_)) {
                        debug!(model = %location, parent = %parent_location, error = %e, "parent model unavailable");
                    }
                    Ok(ModelDescriptor {
                        parent: None,
                        ..(*base_model).clone()
                    })
                }
            }
        }
        .boxed_local()
    }
}

/// Merge a parent model into a child model.
///
/// Child textures override parent ones on key collision, keeping the parent's
/// key order first. Elements come from the child when it declares any.
pub fn merge_models(parent: &ModelDescriptor, child: &ModelDescriptor) -> ModelDescriptor {
    let mut textures = parent.textures.clone();
    for (key, value) in &child.textures {
        textures.insert(key.clone(), value.clone());
    }

    ModelDescriptor {
        parent: None,
        textures,
        elements: child.elements.clone().or_else(|| parent.elements.clone()),
    }
}

/// Builtin parents (`builtin/generated`, `builtin/entity`) have no file.
fn is_builtin(parent: &str) -> bool {
    parent
        .strip_prefix("minecraft:")
        .unwrap_or(parent)
        .starts_with("builtin/")
}
