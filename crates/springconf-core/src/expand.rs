//! Expansion of dotted compound keys into nested mappings
//!
//! `a.b: 1` and `a.c: 2` become `a: {b: 1, c: 2}`. When a mapping and a
//! scalar compete for the same slot the mapping wins, whichever key comes
//! first in the document, so sibling order never changes the final shape.

use crate::path::build_path;
use crate::value::{Mapping, Value};

/// Rewrite `mapping` so that no key at any level contains `delimiter`.
pub fn expand(mapping: Mapping, delimiter: &str) -> Mapping {
    let mut nested = Mapping::new();

    for (key, value) in mapping {
        match split_head(&key, delimiter) {
            Some((head, tail)) => match nested.get_mut(&head) {
                Some(Value::Mapping(child)) => insert_plain(child, tail, value),
                // a scalar already in the slot is dropped
                _ => {
                    nested.insert(head, Value::Mapping(Mapping::from([(tail, value)])));
                }
            },
            None => insert_plain(&mut nested, key, value),
        }
    }

    for value in nested.values_mut() {
        if let Value::Mapping(child) = value {
            *child = expand(std::mem::take(child), delimiter);
        }
    }

    nested
}

/// First segment and the rejoined remainder, for keys with two or more segments
fn split_head(key: &str, delimiter: &str) -> Option<(String, String)> {
    let path = build_path(key, delimiter);
    if path.len() < 2 {
        return None;
    }
    Some((path[0].to_string(), path[1..].join(delimiter)))
}

/// Insert under `key`, merging mappings key by key so that at every depth
/// a mapping beats a scalar and otherwise the later value wins
fn insert_plain(nested: &mut Mapping, key: String, value: Value) {
    if let Some(Value::Mapping(existing)) = nested.get_mut(&key) {
        match value {
            Value::Mapping(incoming) => {
                for (k, v) in incoming {
                    insert_plain(existing, k, v);
                }
            }
            scalar => log::trace!(
                "Dropping scalar '{}' = {} in favour of a mapping",
                key,
                scalar
            ),
        }
        return;
    }
    nested.insert(key, value);
}
