//! Model descriptor parsing.
//!
//! Model descriptors define the geometry of blocks and items as cuboid
//! elements, plus a texture map whose values are either concrete texture
//! paths or `#key` indirections into the same map.

use crate::types::Direction;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Texture variables of one model, in declaration order.
pub type TextureMap = IndexMap<String, TextureRef>;

/// A texture map value: a concrete resource path or an indirection to another key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TextureRef {
    /// e.g. `block/stone` or `pylonbase:block/tin_pipe`
    Concrete(String),
    /// e.g. `#all`, stored without the `#`
    Reference(String),
}

impl TextureRef {
    /// Parse the string form used in model files.
    pub fn parse(value: &str) -> Self {
        match value.strip_prefix('#') {
            Some(key) => TextureRef::Reference(key.to_string()),
            None => TextureRef::Concrete(value.to_string()),
        }
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self, TextureRef::Concrete(_))
    }

    /// The concrete path, if this is not an indirection.
    pub fn as_concrete(&self) -> Option<&str> {
        match self {
            TextureRef::Concrete(path) => Some(path),
            TextureRef::Reference(_) => None,
        }
    }

    /// The key this value points at, if it is an indirection.
    pub fn referenced_key(&self) -> Option<&str> {
        match self {
            TextureRef::Concrete(_) => None,
            TextureRef::Reference(key) => Some(key),
        }
    }
}

impl From<String> for TextureRef {
    fn from(value: String) -> Self {
        match value.strip_prefix('#') {
            Some(key) => TextureRef::Reference(key.to_string()),
            None => TextureRef::Concrete(value),
        }
    }
}

impl From<TextureRef> for String {
    fn from(value: TextureRef) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for TextureRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextureRef::Concrete(path) => f.write_str(path),
            TextureRef::Reference(key) => write!(f, "#{}", key),
        }
    }
}

/// A parsed model from models/*.json.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Parent model to inherit from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Texture variable definitions.
    #[serde(default)]
    pub textures: TextureMap,

    /// Model elements (cuboids). `None` when the file declares no `elements` key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<BoxElement>>,
}

impl ModelDescriptor {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared elements, or an empty slice.
    pub fn elements(&self) -> &[BoxElement] {
        self.elements.as_deref().unwrap_or(&[])
    }

    /// Check if this model carries any geometry.
    pub fn has_elements(&self) -> bool {
        !self.elements().is_empty()
    }

    /// A model with neither geometry nor textures.
    pub fn is_empty(&self) -> bool {
        !self.has_elements() && self.textures.is_empty()
    }
}

/// A cuboid element within a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxElement {
    /// Minimum corner (0-16 range).
    pub from: [f32; 3],
    /// Maximum corner (0-16 range).
    pub to: [f32; 3],
    /// Face definitions.
    #[serde(default)]
    pub faces: IndexMap<Direction, FaceDescriptor>,
}

impl BoxElement {
    /// Get the size of this element in model coordinates (0-16).
    pub fn size(&self) -> [f32; 3] {
        [
            self.to[0] - self.from[0],
            self.to[1] - self.from[1],
            self.to[2] - self.from[2],
        ]
    }

    /// Get the normalized center (unit cube centered at the origin).
    pub fn normalized_center(&self) -> [f32; 3] {
        [
            (self.from[0] + self.to[0]) / 32.0 - 0.5,
            (self.from[1] + self.to[1]) / 32.0 - 0.5,
            (self.from[2] + self.to[2]) / 32.0 - 0.5,
        ]
    }

    /// Get the normalized size.
    pub fn normalized_size(&self) -> [f32; 3] {
        let s = self.size();
        [s[0] / 16.0, s[1] / 16.0, s[2] / 16.0]
    }

    pub fn face(&self, direction: Direction) -> Option<&FaceDescriptor> {
        self.faces.get(&direction)
    }
}

/// A face of a model element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDescriptor {
    /// UV coordinates [u1, v1, u2, v2] in 0-16 range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv: Option<[f32; 4]>,
    /// Texture reference (e.g., "#side" or "block/stone").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<TextureRef>,
    /// UV rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub rotation: i32,
}

impl FaceDescriptor {
    pub fn textured(texture: &str) -> Self {
        Self {
            uv: None,
            texture: Some(TextureRef::parse(texture)),
            rotation: 0,
        }
    }
}
