//! Deep merge of configuration mappings
//!
//! Merge semantics:
//! - Mappings: deep merge recursively
//! - Scalars: `source` wins (last-writer-wins)
//! - Sequences: `source` replaces entirely
//! - Null in `source`: overwrites like any other scalar
//! - Type mismatch: `source` wins

use crate::value::{Mapping, Value};

/// Deep-merge `source` on top of `target`.
///
/// When both sides hold a mapping under the same key the two are merged
/// recursively; in every other case the source value replaces the target's.
pub fn deep_merge(mut target: Mapping, source: Mapping) -> Mapping {
    for (key, source_value) in source {
        match (target.get_mut(&key), source_value) {
            (Some(Value::Mapping(target_map)), Value::Mapping(source_map)) => {
                let merged = deep_merge(std::mem::take(target_map), source_map);
                *target_map = merged;
            }
            (_, source_value) => {
                target.insert(key, source_value);
            }
        }
    }
    target
}

/// Deep-merge `maps` left to right, later maps overriding earlier ones.
///
/// No maps yields an empty mapping and a single map is returned as is.
pub fn merge_all<I>(maps: I) -> Mapping
where
    I: IntoIterator<Item = Mapping>,
{
    let mut maps = maps.into_iter();
    let first = maps.next().unwrap_or_default();
    maps.fold(first, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mapping(yaml: &str) -> Mapping {
        match Value::from_yaml(serde_yaml::from_str(yaml).unwrap()) {
            Value::Mapping(m) => m,
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_source_wins_and_target_keys_kept() {
        let target = mapping("key1: 3\nkey2: val1\nkey3:\n  key4: true\n");
        let source = mapping("key5: 3\nkey1: false\nkey3:\n  key5: val2\n");

        let merged = deep_merge(target, source);

        assert_eq!(merged["key1"], Value::Bool(false));
        assert_eq!(merged["key2"], Value::from("val1"));
        assert_eq!(merged["key5"], Value::Integer(3));
        let child = merged["key3"].as_mapping().unwrap();
        assert_eq!(child["key4"], Value::Bool(true));
        assert_eq!(child["key5"], Value::from("val2"));
    }

    #[test]
    fn test_merge_sequence_replaced() {
        let target = mapping("servers: [a, b]\n");
        let source = mapping("servers: [c]\n");

        let merged = deep_merge(target, source);
        assert_eq!(merged["servers"], Value::from(vec!["c"]));
    }

    #[test]
    fn test_merge_type_mismatch_source_wins() {
        let merged = deep_merge(
            mapping("database:\n  host: localhost\n"),
            mapping("database: connection-string\n"),
        );
        assert_eq!(merged["database"], Value::from("connection-string"));

        let merged = deep_merge(
            mapping("database: connection-string\n"),
            mapping("database:\n  host: localhost\n"),
        );
        assert_eq!(merged["database"], Value::Mapping(mapping("host: localhost")));
    }

    #[test]
    fn test_merge_null_overwrites() {
        let merged = deep_merge(mapping("feature:\n  config: value\n"), mapping("feature:\n  config: ~\n"));
        let feature = merged["feature"].as_mapping().unwrap();
        assert_eq!(feature.get("config"), Some(&Value::Null));
    }

    #[test]
    fn test_merge_deeply_nested() {
        let merged = deep_merge(
            mapping("a:\n  b:\n    c: 1\n    d: 2\n"),
            mapping("a:\n  b:\n    d: 3\n    e: 4\n"),
        );
        assert_eq!(merged, mapping("a:\n  b:\n    c: 1\n    d: 3\n    e: 4\n"));
    }

    #[test]
    fn test_merge_all_empty() {
        assert!(merge_all(Vec::<Mapping>::new()).is_empty());
    }

    #[test]
    fn test_merge_all_single_unchanged() {
        let only = mapping("a:\n  b: [1, 2]\nc: x\n");
        assert_eq!(merge_all(vec![only.clone()]), only);
    }

    #[test]
    fn test_merge_all_later_wins() {
        let merged = merge_all(vec![
            mapping("a: 1\nb: 1\n"),
            mapping("b: 2\nc: 2\n"),
            mapping("c: 3\n"),
        ]);
        assert_eq!(merged, mapping("a: 1\nb: 2\nc: 3\n"));
    }
}
