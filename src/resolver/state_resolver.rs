//! Blockstate to model reference resolution.

use super::descriptors::DescriptorSource;
use crate::source::AssetFetcher;
use crate::types::Namespace;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::debug;

/// Picks a model from a block's blockstate file.
///
/// Variant selection does not match block properties; the first declared
/// variant (first entry when it is a list) is always used. Blocks found to
/// have no usable blockstate are remembered and never requested again.
pub struct StateResolver<F> {
    source: Rc<DescriptorSource<F>>,
    missing: RefCell<HashSet<(Namespace, String)>>,
}

impl<F: AssetFetcher> StateResolver<F> {
    /// Create a resolver whose negative cache starts with the configured addon paths.
    pub fn new(source: Rc<DescriptorSource<F>>) -> Self {
        let missing = source
            .config()
            .known_without_blockstate
            .iter()
            .map(|path| (Namespace::Pylon, path.clone()))
            .collect();

        Self {
            source,
            missing: RefCell::new(missing),
        }
    }

    /// Model reference of the first declared variant of `block_id`.
    pub async fn first_variant_model(&self, namespace: Namespace, block_id: &str) -> Option<String> {
        if self.is_known_missing(namespace, block_id) {
            return None;
        }

        let model = match self.source.blockstate(namespace, block_id).await {
            Ok(definition) if definition.has_variants() => {
                definition.first_variant_model().map(str::to_string)
            }
            Ok(_) => None,
            Err(e) => {
                debug!(%namespace, block = block_id, error = %e, "no blockstate");
                None
            }
        };

        if model.is_none() {
            self.missing
                .borrow_mut()
                .insert((namespace, block_id.to_string()));
        }
        model
    }

    /// Whether `block_id` is known to lack a blockstate.
    pub fn is_known_missing(&self, namespace: Namespace, block_id: &str) -> bool {
        self.missing
            .borrow()
            .contains(&(namespace, block_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IconConfig, MirrorConfig};
    use crate::source::MemoryFetcher;
    use serde_json::json;

    fn create_resolver() -> (Rc<MemoryFetcher>, StateResolver<MemoryFetcher>) {
        let fetcher = Rc::new(MemoryFetcher::new());
        let config = IconConfig::default()
            .with_minecraft_mirror(MirrorConfig::with_base("mc"))
            .with_pylon_mirror(MirrorConfig::with_base("pylon"));
        let source = Rc::new(DescriptorSource::new(Rc::clone(&fetcher), Rc::new(config)));
        (fetcher, StateResolver::new(source))
    }

    #[tokio::test]
    async fn test_first_declared_variant_wins() {
        let (fetcher, resolver) = create_resolver();
        fetcher.insert(
            "mc/blockstates/furnace.json",
            br#"{ "variants": {
                "facing=south,lit=false": { "model": "minecraft:block/furnace_south" },
                "facing=east,lit=false": { "model": "minecraft:block/furnace_east" },
                "facing=north,lit=false": [
                    { "model": "minecraft:block/furnace" },
                    { "model": "minecraft:block/furnace_alt" }
                ]
            } }"#
                .to_vec(),
        );

        for _ in 0..3 {
            assert_eq!(
                resolver.first_variant_model(Namespace::Minecraft, "furnace").await,
                Some("minecraft:block/furnace_south".to_string())
            );
        }
        assert_eq!(fetcher.request_count("mc/blockstates/furnace.json"), 1);
    }

    #[tokio::test]
    async fn test_list_variant_takes_first_entry() {
        let (fetcher, resolver) = create_resolver();
        fetcher.insert_json(
            "mc/blockstates/stone.json",
            &json!({ "variants": { "": [
                { "model": "minecraft:block/stone" },
                { "model": "minecraft:block/stone_mirrored", "y": 180 }
            ] } }),
        );

        assert_eq!(
            resolver.first_variant_model(Namespace::Minecraft, "stone").await,
            Some("minecraft:block/stone".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_blockstate_is_remembered() {
        let (fetcher, resolver) = create_resolver();

        assert_eq!(resolver.first_variant_model(Namespace::Pylon, "machines/press").await, None);
        assert!(resolver.is_known_missing(Namespace::Pylon, "machines/press"));
        assert_eq!(resolver.first_variant_model(Namespace::Pylon, "machines/press").await, None);
        assert_eq!(fetcher.request_count("pylon/blockstates/machines/press.json"), 1);
    }

    #[tokio::test]
    async fn test_multipart_counts_as_missing() {
        let (fetcher, resolver) = create_resolver();
        fetcher.insert_json("mc/blockstates/fence.json", &json!({ "multipart": [] }));
        assert_eq!(resolver.first_variant_model(Namespace::Minecraft, "fence").await, None);
        assert!(resolver.is_known_missing(Namespace::Minecraft, "fence"));
    }

    #[tokio::test]
    async fn test_seeded_paths_skip_fetch() {
        let (fetcher, resolver) = create_resolver();
        assert_eq!(
            resolver
                .first_variant_model(Namespace::Pylon, "machines/pipes/tin_pipe")
                .await,
            None
        );
        assert_eq!(fetcher.total_requests(), 0);
    }
}
