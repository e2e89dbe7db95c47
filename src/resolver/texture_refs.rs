//! Texture variable dereferencing.
//!
//! Resolves chains like `#side -> #all -> block/stone` within one texture
//! map. Substitution is bounded; anything still pointing at a key after the
//! last pass (cycles, missing keys) stays a literal indirection.

use crate::resource_pack::{TextureMap, TextureRef};

/// Maximum substitution passes over one texture map.
pub const MAX_SUBSTITUTION_PASSES: usize = 20;

/// Dereference every indirection whose chain ends in a concrete value.
pub fn resolve_texture_references(textures: &TextureMap) -> TextureMap {
    resolve_with_pass_count(textures).0
}

/// Like [`resolve_texture_references`], also returning the passes used.
pub fn resolve_with_pass_count(textures: &TextureMap) -> (TextureMap, usize) {
    let mut resolved = textures.clone();
    let mut passes = 0;
    let mut unresolved = true;

    while unresolved && passes < MAX_SUBSTITUTION_PASSES {
        unresolved = false;
        passes += 1;

        // In place, so a value resolved earlier in this pass is visible to later keys
        for index in 0..resolved.len() {
            let Some(key) = resolved[index].referenced_key() else {
                continue;
            };

            match resolved.get(key).filter(|target| target.is_concrete()).cloned() {
                Some(target) => resolved[index] = target,
                None => unresolved = true,
            }
        }
    }

    (resolved, passes)
}

/// Pick the texture that best represents a model.
///
/// Keys in `priority` are checked first; otherwise the first concrete value
/// in declaration order wins. A `minecraft:` prefix is stripped.
pub fn representative_texture(resolved: &TextureMap, priority: &[String]) -> Option<String> {
    let from_priority = priority
        .iter()
        .find_map(|key| resolved.get(key.as_str()).and_then(TextureRef::as_concrete));

    from_priority
        .or_else(|| resolved.values().find_map(TextureRef::as_concrete))
        .map(|value| value.strip_prefix("minecraft:").unwrap_or(value).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> TextureMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), TextureRef::parse(v)))
            .collect()
    }

    fn default_priority() -> Vec<String> {
        crate::config::IconConfig::default().texture_priority
    }

    #[test]
    fn test_chain_resolves_within_three_passes() {
        let textures = map(&[("a", "#b"), ("b", "#c"), ("c", "concrete")]);
        let (resolved, passes) = resolve_with_pass_count(&textures);

        assert_eq!(resolved["a"], TextureRef::Concrete("concrete".to_string()));
        assert_eq!(resolved["b"], TextureRef::Concrete("concrete".to_string()));
        assert!(passes <= 3);
    }

    #[test]
    fn test_reverse_declaration_order_still_resolves() {
        let textures = map(&[("c", "concrete"), ("b", "#c"), ("a", "#b")]);
        let (resolved, passes) = resolve_with_pass_count(&textures);

        assert_eq!(resolved["a"], TextureRef::Concrete("concrete".to_string()));
        assert_eq!(passes, 1);
    }

    #[test]
    fn test_cycle_stays_literal() {
        let textures = map(&[("a", "#b"), ("b", "#a")]);
        let (resolved, passes) = resolve_with_pass_count(&textures);

        assert_eq!(resolved["a"], TextureRef::Reference("b".to_string()));
        assert_eq!(resolved["b"], TextureRef::Reference("a".to_string()));
        assert_eq!(passes, MAX_SUBSTITUTION_PASSES);
    }

    #[test]
    fn test_missing_key_stays_literal() {
        let textures = map(&[("particle", "#missing"), ("all", "block/stone")]);
        let resolved = resolve_texture_references(&textures);
        assert_eq!(resolved["particle"], TextureRef::Reference("missing".to_string()));
        assert_eq!(resolved["all"], TextureRef::Concrete("block/stone".to_string()));
    }

    #[test]
    fn test_representative_prefers_priority_keys() {
        let textures = map(&[("side", "block/side"), ("all", "minecraft:block/stone")]);
        assert_eq!(
            representative_texture(&textures, &default_priority()),
            Some("block/stone".to_string())
        );
    }

    #[test]
    fn test_representative_falls_back_to_first_concrete() {
        let textures = map(&[("0", "#1"), ("1", "pylonbase:block/tin"), ("2", "block/x")]);
        assert_eq!(
            representative_texture(&textures, &default_priority()),
            Some("pylonbase:block/tin".to_string())
        );
    }

    #[test]
    fn test_representative_none_when_nothing_concrete() {
        let textures = map(&[("layer0", "#a"), ("a", "#layer0")]);
        let resolved = resolve_texture_references(&textures);
        assert_eq!(representative_texture(&resolved, &default_priority()), None);
    }
}
