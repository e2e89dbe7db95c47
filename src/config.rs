//! Configuration for asset mirrors, resolution heuristics and rendering.

use crate::error::{IconError, Result};
use crate::render::MAX_SURFACE_EDGE;
use crate::types::{DescriptorKind, Namespace, TexturePath};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const MINECRAFT_BASE_URL: &str =
    "https://raw.githubusercontent.com/InventivetalentDev/minecraft-assets/1.21.10/assets/minecraft";
const MINECRAFT_TEXTURES_URL: &str = "https://assets.mcasset.cloud/1.21.8/assets/minecraft/textures";
const PYLON_BASE_URL: &str =
    "https://cdn.jsdelivr.net/gh/pylonmc/pylon-resource-pack@pack-generator/input/assets/pylonbase";

/// Where one namespace's descriptors and textures live.
///
/// Locations are plain string joins, so the same config works for URLs,
/// directory-relative paths and ZIP entry names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Root exposing `models/`, `blockstates/` and `items/`.
    pub base_url: String,
    /// Root that texture paths are appended to.
    pub textures_url: String,
}

impl MirrorConfig {
    pub fn new(base_url: impl Into<String>, textures_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            textures_url: textures_url.into(),
        }
    }

    /// A mirror whose textures live under `<base>/textures`.
    pub fn with_base(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let textures_url = format!("{}/textures", base_url.trim_end_matches('/'));
        Self {
            base_url,
            textures_url,
        }
    }

    /// Location of a JSON descriptor, e.g. `<base>/models/block/stone.json`.
    pub fn descriptor_url(&self, kind: DescriptorKind, path: &str) -> String {
        format!(
            "{}/{}/{}.json",
            self.base_url.trim_end_matches('/'),
            kind.dir(),
            path
        )
    }

    /// Location of a texture image. `.png` is appended when missing.
    pub fn texture_url(&self, path: &str) -> String {
        let root = self.textures_url.trim_end_matches('/');
        if path.ends_with(".png") {
            format!("{}/{}", root, path)
        } else {
            format!("{}/{}.png", root, path)
        }
    }
}

/// Rendering switches and tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Whether the 3D box renderer is available at all.
    pub enable_3d: bool,
    /// Models with at most this many distinct textures use the pipe preset.
    pub pipe_texture_limit: usize,
    /// Supersampling factor for the pipe preset.
    pub pipe_supersample: u32,
    /// Supersampling factor for the generic preset.
    pub generic_supersample: u32,
    /// Icon edge length used when a caller does not ask for one.
    pub default_size: u32,
    /// Try a 2D composite sized from the element bounds before the cube
    /// fallback when a model cannot be rendered in 3D.
    pub bounds_composite: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enable_3d: true,
            pipe_texture_limit: 2,
            pipe_supersample: 5,
            generic_supersample: 4,
            default_size: 48,
            bounds_composite: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    /// Vanilla asset mirror.
    pub minecraft: MirrorConfig,
    /// Addon asset mirror.
    pub pylon: MirrorConfig,
    /// Addon paths under these prefixes try block resolution before item resolution.
    pub block_like_prefixes: Vec<String>,
    /// Texture keys checked in order when picking a representative texture.
    pub texture_priority: Vec<String>,
    /// Addon block paths known to have no blockstate file.
    pub known_without_blockstate: Vec<String>,
    /// Rendering options.
    pub render: RenderConfig,
    /// Per-request timeout for the HTTP fetcher, in seconds.
    pub http_timeout_secs: Option<u64>,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            minecraft: MirrorConfig::new(MINECRAFT_BASE_URL, MINECRAFT_TEXTURES_URL),
            pylon: MirrorConfig::with_base(PYLON_BASE_URL),
            block_like_prefixes: vec!["machines/".to_string()],
            texture_priority: ["layer0", "particle", "all", "texture", "north", "up"]
                .into_iter()
                .map(String::from)
                .collect(),
            known_without_blockstate: ["wood", "tin", "iron", "bronze", "steel", "copper"]
                .into_iter()
                .map(|metal| format!("machines/pipes/{}_pipe", metal))
                .collect(),
            render: RenderConfig::default(),
            http_timeout_secs: Some(30),
        }
    }
}

impl IconConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make rendering impossible.
    pub fn validate(&self) -> Result<()> {
        if self.render.default_size == 0 || self.render.default_size > MAX_SURFACE_EDGE {
            return Err(IconError::InvalidConfig(format!(
                "render.default_size must be within 1..={}",
                MAX_SURFACE_EDGE
            )));
        }
        if self.render.pipe_supersample == 0 || self.render.generic_supersample == 0 {
            return Err(IconError::InvalidConfig(
                "supersampling factors must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Mirror serving a namespace.
    pub fn mirror(&self, namespace: Namespace) -> &MirrorConfig {
        match namespace {
            Namespace::Minecraft => &self.minecraft,
            Namespace::Pylon => &self.pylon,
        }
    }

    /// Location of a concrete texture in its namespace's mirror.
    pub fn texture_location(&self, texture: &TexturePath) -> String {
        self.mirror(texture.namespace).texture_url(&texture.path)
    }

    /// Whether an addon path should try block resolution first.
    pub fn is_block_like(&self, path: &str) -> bool {
        self.block_like_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }

    pub fn with_minecraft_mirror(mut self, mirror: MirrorConfig) -> Self {
        self.minecraft = mirror;
        self
    }

    pub fn with_pylon_mirror(mut self, mirror: MirrorConfig) -> Self {
        self.pylon = mirror;
        self
    }

    pub fn with_block_like_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.block_like_prefixes = prefixes;
        self
    }

    pub fn with_known_without_blockstate(mut self, paths: Vec<String>) -> Self {
        self.known_without_blockstate = paths;
        self
    }

    pub fn with_3d(mut self, enabled: bool) -> Self {
        self.render.enable_3d = enabled;
        self
    }

    pub fn with_default_size(mut self, size: u32) -> Self {
        self.render.default_size = size;
        self
    }

    pub fn with_bounds_composite(mut self, enabled: bool) -> Self {
        self.render.bounds_composite = enabled;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.http_timeout_secs = timeout.map(|t| t.as_secs());
        self
    }
}
