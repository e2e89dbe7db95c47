//! Item catalog records and image references.
//!
//! The catalog is a `_categories.json` index listing category files, each
//! holding display records whose `image` field names the asset to draw.

use crate::error::Result;
use crate::source::{fetch_json, AssetFetcher};
use crate::types::{MINECRAFT_NAMESPACE, PYLON_REFERENCE_PREFIX};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// File name of the category index.
pub const CATEGORY_INDEX: &str = "_categories.json";

/// Head textures are detected by name in the image reference.
const HEAD_MARKERS: [&str; 2] = ["skeleton_skull", "wither_skeleton_skull"];

/// `_categories.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryIndex {
    pub files: Vec<String>,
}

/// One category file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<CatalogItem>,
}

/// A display record for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "nameEn")]
    pub name_en: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tag: String,
    /// Image reference, see [`ImageReference`].
    pub image: String,
    /// Second image reference used when the first cannot be drawn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl CatalogItem {
    pub fn image_reference(&self) -> ImageReference {
        ImageReference::parse(&self.image)
    }

    pub fn fallback_reference(&self) -> Option<ImageReference> {
        self.fallback.as_deref().map(ImageReference::parse)
    }
}

/// Where an image reference points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageReference {
    /// `pylon:<path>`
    Pylon(String),
    /// `minecraft:<path>`
    Minecraft(String),
    /// Anything else, used as a location unchanged.
    Direct(String),
}

impl ImageReference {
    pub fn parse(reference: &str) -> Self {
        if let Some(path) = strip_namespace(reference, PYLON_REFERENCE_PREFIX) {
            ImageReference::Pylon(path.to_string())
        } else if let Some(path) = strip_namespace(reference, MINECRAFT_NAMESPACE) {
            ImageReference::Minecraft(path.to_string())
        } else {
            ImageReference::Direct(reference.to_string())
        }
    }

    /// The path after the prefix, or the whole reference.
    pub fn path(&self) -> &str {
        match self {
            ImageReference::Pylon(path)
            | ImageReference::Minecraft(path)
            | ImageReference::Direct(path) => path,
        }
    }

    /// Addon paths that already name a texture and skip model resolution.
    pub fn is_direct_texture(&self) -> bool {
        match self {
            ImageReference::Pylon(path) => {
                path.contains(".png") || path.starts_with("block/") || path.starts_with("item/")
            }
            ImageReference::Minecraft(path) => path.contains(".png"),
            ImageReference::Direct(_) => true,
        }
    }

    /// Whether the image is a mob head skin.
    pub fn is_head(&self) -> bool {
        HEAD_MARKERS.iter().any(|marker| self.path().contains(marker))
    }

    /// The reference in the form the resolver accepts.
    pub fn resolver_reference(&self) -> String {
        match self {
            ImageReference::Pylon(path) => format!("{}:{}", PYLON_REFERENCE_PREFIX, path),
            ImageReference::Minecraft(path) | ImageReference::Direct(path) => path.clone(),
        }
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageReference::Pylon(path) => write!(f, "{}:{}", PYLON_REFERENCE_PREFIX, path),
            ImageReference::Minecraft(path) => write!(f, "{}:{}", MINECRAFT_NAMESPACE, path),
            ImageReference::Direct(path) => f.write_str(path),
        }
    }
}

fn strip_namespace<'a>(reference: &'a str, namespace: &str) -> Option<&'a str> {
    reference.strip_prefix(namespace)?.strip_prefix(':')
}

/// Load every category listed in `<base>/_categories.json`.
///
/// A missing or malformed index is an error. Category files that fail are
/// logged and skipped.
pub async fn load_catalog<F: AssetFetcher>(fetcher: &F, base: &str) -> Result<Vec<Category>> {
    let base = base.trim_end_matches('/');
    let index: CategoryIndex = fetch_json(fetcher, &join(base, CATEGORY_INDEX)).await?;

    let mut categories = Vec::with_capacity(index.files.len());
    for file in &index.files {
        match fetch_json::<Category, _>(fetcher, &join(base, file)).await {
            Ok(category) => {
                debug!(file = %file, items = category.items.len(), "loaded category");
                categories.push(category);
            }
            Err(e) => warn!(file = %file, error = %e, "failed to load category"),
        }
    }
    Ok(categories)
}

fn join(base: &str, file: &str) -> String {
    if base.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", base, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryFetcher;
    use serde_json::json;

    #[test]
    fn test_parse_references() {
        assert_eq!(
            ImageReference::parse("pylon:machines/pipes/tin_pipe"),
            ImageReference::Pylon("machines/pipes/tin_pipe".to_string())
        );
        assert_eq!(
            ImageReference::parse("minecraft:item/diamond"),
            ImageReference::Minecraft("item/diamond".to_string())
        );
        assert_eq!(
            ImageReference::parse("images/logo.png"),
            ImageReference::Direct("images/logo.png".to_string())
        );
        // Only a full prefix counts
        assert!(matches!(
            ImageReference::parse("pylonbase:block/x"),
            ImageReference::Direct(_)
        ));
    }

    #[test]
    fn test_direct_textures() {
        assert!(ImageReference::parse("pylon:block/tin_pipe").is_direct_texture());
        assert!(ImageReference::parse("pylon:gui/icon.png").is_direct_texture());
        assert!(!ImageReference::parse("pylon:tools/hammer").is_direct_texture());
        assert!(!ImageReference::parse("minecraft:item/diamond").is_direct_texture());
        assert!(ImageReference::parse("minecraft:entity/steve.png").is_direct_texture());
    }

    #[test]
    fn test_head_detection() {
        assert!(ImageReference::parse("minecraft:item/skeleton_skull").is_head());
        assert!(ImageReference::parse("minecraft:item/wither_skeleton_skull").is_head());
        assert!(!ImageReference::parse("minecraft:item/zombie_head").is_head());
    }

    #[test]
    fn test_item_field_names() {
        let item: CatalogItem = serde_json::from_value(json!({
            "id": "tin_pipe",
            "name": "錫管",
            "nameEn": "Tin Pipe",
            "description": "Moves fluids",
            "tag": "machine",
            "image": "pylon:machines/pipes/tin_pipe",
            "fallback": "pylon:block/tin_pipe.png"
        }))
        .unwrap();
        assert_eq!(item.name_en, "Tin Pipe");
        assert_eq!(
            item.fallback_reference(),
            Some(ImageReference::Pylon("block/tin_pipe.png".to_string()))
        );
        assert_eq!(item.image_reference().resolver_reference(), "pylon:machines/pipes/tin_pipe");
    }

    #[tokio::test]
    async fn test_load_catalog_skips_broken_categories() {
        let fetcher = MemoryFetcher::new();
        fetcher.insert_json(
            "data/items/_categories.json",
            &json!({ "files": ["tools.json", "missing.json", "broken.json"] }),
        );
        fetcher.insert_json(
            "data/items/tools.json",
            &json!({
                "id": "tools",
                "name": "Tools",
                "items": [{ "id": "hammer", "name": "Hammer", "image": "pylon:tools/hammer" }]
            }),
        );
        fetcher.insert("data/items/broken.json", b"{".to_vec());

        let categories = load_catalog(&fetcher, "data/items/").await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].items[0].id, "hammer");
        assert_eq!(categories[0].items[0].fallback, None);
        assert_eq!(fetcher.request_count("data/items/missing.json"), 1);
    }

    #[tokio::test]
    async fn test_missing_index_is_an_error() {
        let fetcher = MemoryFetcher::new();
        let result = load_catalog(&fetcher, "data/items").await;
        assert!(result.unwrap_err().is_not_found());
    }
}
