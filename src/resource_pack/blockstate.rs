//! Blockstate definition parsing.
//!
//! Blockstates map property combinations to model variants. Only the
//! "variants" format selects a model here; "multipart" files parse but
//! yield nothing.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// A blockstate definition from blockstates/*.json.
#[derive(Debug, Clone)]
pub enum BlockstateDefinition {
    /// Property combinations map to models, in declaration order.
    Variants(IndexMap<String, Vec<ModelVariant>>),
    /// Conditional model application (not evaluated).
    Multipart(Vec<serde_json::Value>),
}

impl<'de> Deserialize<'de> for BlockstateDefinition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawBlockstate {
            variants: Option<IndexMap<String, VariantValue>>,
            multipart: Option<Vec<serde_json::Value>>,
        }

        let raw = RawBlockstate::deserialize(deserializer)?;

        if let Some(variants) = raw.variants {
            let parsed = variants
                .into_iter()
                .map(|(k, v)| (k, v.into_vec()))
                .collect();
            Ok(BlockstateDefinition::Variants(parsed))
        } else if let Some(multipart) = raw.multipart {
            Ok(BlockstateDefinition::Multipart(multipart))
        } else {
            Ok(BlockstateDefinition::Variants(IndexMap::new()))
        }
    }
}

impl BlockstateDefinition {
    /// The model of the first declared variant (first entry when it is a list).
    ///
    /// This does not match block properties; declaration order alone decides.
    pub fn first_variant_model(&self) -> Option<&str> {
        match self {
            BlockstateDefinition::Variants(variants) => variants
                .values()
                .next()
                .and_then(|list| list.first())
                .map(|variant| variant.model.as_str()),
            BlockstateDefinition::Multipart(_) => None,
        }
    }

    /// Whether this definition declares any variant.
    pub fn has_variants(&self) -> bool {
        matches!(self, BlockstateDefinition::Variants(v) if !v.is_empty())
    }
}

/// A variant value can be a single model or an array of weighted models.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum VariantValue {
    Single(ModelVariant),
    Multiple(Vec<ModelVariant>),
}

impl VariantValue {
    fn into_vec(self) -> Vec<ModelVariant> {
        match self {
            VariantValue::Single(v) => vec![v],
            VariantValue::Multiple(v) => v,
        }
    }
}

/// A model variant reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVariant {
    /// Model resource location (e.g., "block/stone" or "pylonbase:block/tin_pipe").
    pub model: String,
    /// X rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub x: i32,
    /// Y rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub y: i32,
}
