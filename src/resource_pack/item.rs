//! Item definition parsing (items/*.json, the 1.21+ format).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A parsed item definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDefinition {
    pub model: ItemModel,
}

/// The `model` node of an item definition.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemModel {
    /// A plain model reference, either bare or as `{"type": "model", "model": ...}`.
    Reference(String),
    /// A conditional node; only the false and fallback branches are consulted.
    Condition {
        on_false: Option<Box<ItemModel>>,
        fallback: Option<Box<ItemModel>>,
    },
    /// A `special` node wrapping a mob head.
    Head { kind: String, texture: Option<String> },
    /// Anything else (select, range_dispatch, composite, other special models).
    Unsupported(String),
}

impl<'de> Deserialize<'de> for ItemModel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(ItemModel::from_value(&value))
    }
}

impl ItemModel {
    fn from_value(value: &Value) -> Self {
        let object = match value {
            Value::String(reference) => return ItemModel::Reference(reference.clone()),
            Value::Object(object) => object,
            other => return ItemModel::Unsupported(other.to_string()),
        };

        let node_type = object
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let node_type = node_type.strip_prefix("minecraft:").unwrap_or(node_type);

        match node_type {
            "model" => match object.get("model").and_then(Value::as_str) {
                Some(reference) => ItemModel::Reference(reference.to_string()),
                None => ItemModel::Unsupported(node_type.to_string()),
            },
            "condition" => ItemModel::Condition {
                on_false: object.get("on_false").map(|v| Box::new(Self::from_value(v))),
                fallback: object.get("fallback").map(|v| Box::new(Self::from_value(v))),
            },
            "special" => {
                let special = object.get("model").and_then(Value::as_object);
                let head = special.filter(|s| {
                    let kind = s.get("type").and_then(Value::as_str).unwrap_or_default();
                    kind.strip_prefix("minecraft:").unwrap_or(kind) == "head"
                });
                match head.and_then(|h| h.get("kind").and_then(Value::as_str)) {
                    Some(kind) => ItemModel::Head {
                        kind: kind.to_string(),
                        texture: head
                            .and_then(|h| h.get("texture"))
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    },
                    None => ItemModel::Unsupported("special".to_string()),
                }
            }
            other => ItemModel::Unsupported(other.to_string()),
        }
    }

    /// The model reference this node renders with, if any.
    ///
    /// Conditions take their `on_false` branch, then their `fallback`.
    pub fn model_reference(&self) -> Option<&str> {
        match self {
            ItemModel::Reference(reference) => Some(reference),
            ItemModel::Condition { on_false, fallback } => on_false
                .as_deref()
                .and_then(ItemModel::model_reference)
                .or_else(|| fallback.as_deref().and_then(ItemModel::model_reference)),
            ItemModel::Head { .. } | ItemModel::Unsupported(_) => None,
        }
    }

    /// The entity texture of a head node, e.g. `entity/skeleton/skeleton.png`.
    ///
    /// An explicit `texture` field wins over the kind table.
    pub fn head_texture(&self) -> Option<String> {
        match self {
            ItemModel::Head {
                texture: Some(texture),
                ..
            } => Some(format!("entity/{}.png", texture)),
            ItemModel::Head { kind, texture: None } => {
                HeadKind::from_kind(kind).map(|k| k.texture_path().to_string())
            }
            _ => None,
        }
    }
}

/// Mob head kinds with a known entity texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadKind {
    Skeleton,
    WitherSkeleton,
    Zombie,
    Creeper,
    Piglin,
    Dragon,
    Player,
}

impl HeadKind {
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "skeleton" => Some(HeadKind::Skeleton),
            "wither_skeleton" => Some(HeadKind::WitherSkeleton),
            "zombie" => Some(HeadKind::Zombie),
            "creeper" => Some(HeadKind::Creeper),
            "piglin" => Some(HeadKind::Piglin),
            "dragon" => Some(HeadKind::Dragon),
            "player" => Some(HeadKind::Player),
            _ => None,
        }
    }

    /// Entity texture path relative to the textures root.
    pub fn texture_path(&self) -> &'static str {
        match self {
            HeadKind::Skeleton => "entity/skeleton/skeleton.png",
            HeadKind::WitherSkeleton => "entity/skeleton/wither_skeleton.png",
            HeadKind::Zombie => "entity/zombie/zombie.png",
            HeadKind::Creeper => "entity/creeper/creeper.png",
            HeadKind::Piglin => "entity/piglin/piglin.png",
            HeadKind::Dragon => "entity/enderdragon/dragon.png",
            HeadKind::Player => "entity/steve.png",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ItemDefinition {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_plain_string_model() {
        let def = parse(r#"{ "model": "pylonbase:item/hammer" }"#);
        assert_eq!(def.model.model_reference(), Some("pylonbase:item/hammer"));
    }

    #[test]
    fn test_model_node() {
        let def = parse(r#"{ "model": { "type": "minecraft:model", "model": "minecraft:item/diamond" } }"#);
        assert_eq!(def.model.model_reference(), Some("minecraft:item/diamond"));
    }

    #[test]
    fn test_condition_uses_false_branch() {
        let def = parse(
            r#"{ "model": {
                "type": "condition",
                "property": "using_item",
                "on_true": { "type": "model", "model": "pylonbase:item/drill_active" },
                "on_false": { "type": "model", "model": "pylonbase:item/drill" }
            } }"#,
        );
        assert_eq!(def.model.model_reference(), Some("pylonbase:item/drill"));
    }

    #[test]
    fn test_condition_falls_back() {
        let def = parse(
            r#"{ "model": {
                "type": "minecraft:condition",
                "on_false": { "type": "select" },
                "fallback": { "type": "model", "model": "pylonbase:item/fallback" }
            } }"#,
        );
        assert_eq!(def.model.model_reference(), Some("pylonbase:item/fallback"));
    }

    #[test]
    fn test_skeleton_head_uses_kind_table() {
        let def = parse(
            r#"{ "model": {
                "type": "minecraft:special",
                "base": "minecraft:item/template_skull",
                "model": { "type": "minecraft:head", "kind": "skeleton" }
            } }"#,
        );
        assert_eq!(def.model.model_reference(), None);
        assert_eq!(
            def.model.head_texture(),
            Some("entity/skeleton/skeleton.png".to_string())
        );
    }

    #[test]
    fn test_explicit_head_texture_overrides_kind() {
        let def = parse(
            r#"{ "model": {
                "type": "minecraft:special",
                "model": { "type": "minecraft:head", "kind": "zombie", "texture": "zombie/drowned" }
            } }"#,
        );
        assert_eq!(def.model.head_texture(), Some("entity/zombie/drowned.png".to_string()));
    }

    #[test]
    fn test_unknown_head_kind() {
        let def = parse(
            r#"{ "model": { "type": "special", "model": { "type": "head", "kind": "unknown" } } }"#,
        );
        assert_eq!(def.model.head_texture(), None);
    }

    #[test]
    fn test_unsupported_node() {
        let def = parse(r#"{ "model": { "type": "minecraft:range_dispatch" } }"#);
        assert_eq!(def.model, ItemModel::Unsupported("range_dispatch".to_string()));
        assert_eq!(def.model.model_reference(), None);
    }
}
