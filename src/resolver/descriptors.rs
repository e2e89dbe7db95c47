//! Raw descriptor fetching with per-location caching.

use crate::config::IconConfig;
use crate::error::Result;
use crate::resource_pack::{BlockstateDefinition, ItemDefinition, ModelDescriptor};
use crate::source::{fetch_json, AssetFetcher};
use crate::types::{DescriptorKind, ModelLocation, Namespace};
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::trace;

/// Parsed descriptors keyed by fetch location.
///
/// Entries are never evicted. Failed fetches are not cached here.
#[derive(Debug)]
struct DescriptorCache<T> {
    entries: RefCell<HashMap<String, Rc<T>>>,
}

impl<T> Default for DescriptorCache<T> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }
}

impl<T: DeserializeOwned> DescriptorCache<T> {
    async fn get_or_fetch<F: AssetFetcher>(&self, fetcher: &F, location: &str) -> Result<Rc<T>> {
        let cached = self.entries.borrow().get(location).cloned();
        if let Some(hit) = cached {
            trace!(location, "descriptor cache hit");
            return Ok(hit);
        }

        let value: Rc<T> = Rc::new(fetch_json(fetcher, location).await?);
        self.entries
            .borrow_mut()
            .insert(location.to_string(), Rc::clone(&value));
        Ok(value)
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// Fetches model, blockstate and item descriptors from the configured mirrors.
pub struct DescriptorSource<F> {
    fetcher: Rc<F>,
    config: Rc<IconConfig>,
    models: DescriptorCache<ModelDescriptor>,
    blockstates: DescriptorCache<BlockstateDefinition>,
    items: DescriptorCache<ItemDefinition>,
}

impl<F: AssetFetcher> DescriptorSource<F> {
    pub fn new(fetcher: Rc<F>, config: Rc<IconConfig>) -> Self {
        Self {
            fetcher,
            config,
            models: DescriptorCache::default(),
            blockstates: DescriptorCache::default(),
            items: DescriptorCache::default(),
        }
    }

    pub fn config(&self) -> &IconConfig {
        &self.config
    }

    /// Raw (unmerged) model descriptor.
    pub async fn model(&self, location: &ModelLocation) -> Result<Rc<ModelDescriptor>> {
        let url = self
            .config
            .mirror(location.namespace)
            .descriptor_url(DescriptorKind::Model, &location.path);
        self.models.get_or_fetch(&*self.fetcher, &url).await
    }

    /// Blockstate file for a block id (no `block/` prefix).
    pub async fn blockstate(
        &self,
        namespace: Namespace,
        block_id: &str,
    ) -> Result<Rc<BlockstateDefinition>> {
        let url = self
            .config
            .mirror(namespace)
            .descriptor_url(DescriptorKind::Blockstate, block_id);
        self.blockstates.get_or_fetch(&*self.fetcher, &url).await
    }

    /// Item definition for an item id (no `item/` prefix).
    pub async fn item(&self, namespace: Namespace, item_id: &str) -> Result<Rc<ItemDefinition>> {
        let url = self
            .config
            .mirror(namespace)
            .descriptor_url(DescriptorKind::Item, item_id);
        self.items.get_or_fetch(&*self.fetcher, &url).await
    }

    /// Number of cached descriptors of all kinds.
    pub fn cached_count(&self) -> usize {
        self.models.len() + self.blockstates.len() + self.items.len()
    }
}
