//! Item definition resolution.

use super::descriptors::DescriptorSource;
use crate::source::AssetFetcher;
use crate::types::{ModelLocation, Namespace};
use std::rc::Rc;
use tracing::debug;

/// What an item definition points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemTarget {
    /// A model to resolve.
    Model(ModelLocation),
    /// An entity texture rendered as a head, e.g. `entity/skeleton/skeleton.png`.
    HeadTexture(String),
}

/// Reads `items/<id>.json` definitions.
pub struct ItemResolver<F> {
    source: Rc<DescriptorSource<F>>,
}

impl<F: AssetFetcher> ItemResolver<F> {
    pub fn new(source: Rc<DescriptorSource<F>>) -> Self {
        Self { source }
    }

    /// Resolve an item id (an `item/` prefix is dropped) to its target.
    pub async fn resolve(&self, namespace: Namespace, item_path: &str) -> Option<ItemTarget> {
        let item_id = item_path.strip_prefix("item/").unwrap_or(item_path);

        let definition = match self.source.item(namespace, item_id).await {
            Ok(definition) => definition,
            Err(e) => {
                debug!(%namespace, item = item_id, error = %e, "no item definition");
                return None;
            }
        };

        if let Some(texture) = definition.model.head_texture() {
            return Some(ItemTarget::HeadTexture(texture));
        }

        let reference = definition.model.model_reference()?;
        match ModelLocation::parse(reference) {
            Some(location) => Some(ItemTarget::Model(location)),
            None => {
                debug!(item = item_id, reference, "item model outside known namespaces");
                None
            }
        }
    }
}
