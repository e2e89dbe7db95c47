//! Shared types used throughout the library.

mod direction;

pub use direction::Direction;

use serde::{Deserialize, Serialize};

/// Namespace id of the vanilla asset mirror.
pub const MINECRAFT_NAMESPACE: &str = "minecraft";
/// Namespace id of the addon asset mirror.
pub const PYLON_NAMESPACE: &str = "pylonbase";
/// Prefix used by catalog image references that point into the addon mirror.
pub const PYLON_REFERENCE_PREFIX: &str = "pylon";

/// One of the two asset mirrors a reference can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Minecraft,
    Pylon,
}

impl Namespace {
    /// The namespace id as it appears in model files (`minecraft`, `pylonbase`).
    pub fn id(&self) -> &'static str {
        match self {
            Namespace::Minecraft => MINECRAFT_NAMESPACE,
            Namespace::Pylon => PYLON_NAMESPACE,
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Kinds of JSON descriptor a mirror serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Model,
    Blockstate,
    Item,
}

impl DescriptorKind {
    /// Directory name under the mirror base location.
    pub fn dir(&self) -> &'static str {
        match self {
            DescriptorKind::Model => "models",
            DescriptorKind::Blockstate => "blockstates",
            DescriptorKind::Item => "items",
        }
    }
}

/// A namespaced model location, e.g. `pylonbase:block/tin_pipe`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelLocation {
    pub namespace: Namespace,
    pub path: String,
}

impl ModelLocation {
    pub fn new(namespace: Namespace, path: impl Into<String>) -> Self {
        Self {
            namespace,
            path: path.into(),
        }
    }

    /// Parse a model reference as written in model, blockstate and item files.
    ///
    /// Paths without a namespace belong to `minecraft`; paths without a
    /// `block/` or `item/` prefix are treated as `block/<path>`.
    /// Returns `None` for namespaces neither mirror serves.
    pub fn parse(reference: &str) -> Option<Self> {
        let (namespace, path) = match reference.split_once(':') {
            Some((MINECRAFT_NAMESPACE, path)) => (Namespace::Minecraft, path),
            Some((PYLON_NAMESPACE, path)) => (Namespace::Pylon, path),
            Some(_) => return None,
            None => (Namespace::Minecraft, reference),
        };
        Some(Self::new(namespace, normalize_model_path(path)))
    }
}

impl std::fmt::Display for ModelLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// Default a bare path to the `block/` category.
/// "stone" -> "block/stone", "item/stick" -> "item/stick"
pub fn normalize_model_path(path: &str) -> String {
    if path.starts_with("block/") || path.starts_with("item/") {
        path.to_string()
    } else {
        format!("block/{}", path)
    }
}

/// A concrete texture reference, relative to a mirror's textures root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TexturePath {
    pub namespace: Namespace,
    /// e.g. `block/stone` or `entity/skeleton/skeleton.png`
    pub path: String,
}

impl TexturePath {
    pub fn new(namespace: Namespace, path: impl Into<String>) -> Self {
        Self {
            namespace,
            path: path.into(),
        }
    }

    /// Parse a concrete texture value from a model's texture map.
    /// "pylonbase:block/tin" -> (Pylon, "block/tin"), "block/stone" -> (Minecraft, "block/stone")
    pub fn parse(value: &str, default_namespace: Namespace) -> Self {
        match value.split_once(':') {
            Some((MINECRAFT_NAMESPACE, path)) => Self::new(Namespace::Minecraft, path),
            Some((PYLON_NAMESPACE, path)) => Self::new(Namespace::Pylon, path),
            _ => Self::new(default_namespace, value),
        }
    }
}
