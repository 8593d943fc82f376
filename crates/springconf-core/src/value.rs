//! Configuration value types
//!
//! Represents parsed configuration values. Values can be scalars
//! (string, int, float, bool, null), sequences (arrays), or
//! mappings (objects). Merging and key expansion match on these
//! variants instead of inspecting types at runtime.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A mapping level of the configuration tree, in document key order
pub type Mapping = IndexMap<String, Value>;

/// A configuration value that may contain unresolved placeholders
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value (may contain placeholders like ${KEY:default})
    String(String),
    /// Sequence of values
    Sequence(Vec<Value>),
    /// Mapping of string keys to values
    Mapping(Mapping),
}

impl Value {
    /// Get as i64 if this is an Integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as str if this is a String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as slice if this is a Sequence
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Get as mapping if this is a Mapping
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Walk nested mappings along `path`.
    ///
    /// Every segment but the last must land on a mapping. An empty
    /// path returns `self`.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let mut current = self;
        for segment in path {
            current = current.as_mapping()?.get(*segment)?;
        }
        Some(current)
    }

    /// Returns the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Text substituted for this value inside a placeholder.
    ///
    /// Strings are used verbatim and null becomes the empty string.
    pub fn to_plain_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Convert a parsed YAML value, stringifying non-string keys
    /// and dropping tags.
    pub fn from_yaml(value: serde_yaml::Value) -> Value {
        match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => number_value(n.as_i64(), n.as_f64()),
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Value::from_yaml).collect())
            }
            serde_yaml::Value::Mapping(map) => Value::Mapping(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), Value::from_yaml(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Value::from_yaml(tagged.value),
        }
    }

    /// Convert a parsed JSON value
    pub fn from_json(value: serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => number_value(n.as_i64(), n.as_f64()),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(seq) => {
                Value::Sequence(seq.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

fn number_value(int: Option<i64>, float: Option<f64>) -> Value {
    match (int, float) {
        (Some(i), _) => Value::Integer(i),
        (None, Some(f)) => Value::Float(f),
        (None, None) => Value::Null,
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match Value::from_yaml(key) {
        Value::String(s) => s,
        other => other.to_plain_string(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Sequence(seq) => {
                write!(f, "[")?;
                for (i, v) in seq.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Mapping(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(text: &str) -> Value {
        Value::from_yaml(serde_yaml::from_str(text).unwrap())
    }

    #[test]
    fn test_lookup_nested() {
        let value = yaml("database:\n  host: localhost\n  port: 5432\n");

        assert_eq!(
            value.lookup(&["database", "host"]).unwrap().as_str(),
            Some("localhost")
        );
        assert_eq!(
            value.lookup(&["database", "port"]).unwrap().as_i64(),
            Some(5432)
        );
    }

    #[test]
    fn test_lookup_empty_path_returns_self() {
        let value = yaml("a: 1");
        assert_eq!(value.lookup(&[]), Some(&value));
    }

    #[test]
    fn test_lookup_through_scalar_fails() {
        let value = yaml("a: 1");
        assert!(value.lookup(&["a", "b"]).is_none());
        assert!(value.lookup(&["missing"]).is_none());
    }

    #[test]
    fn test_from_yaml_stringifies_keys() {
        let value = yaml("1: one\ntrue: yes\n2.5: half\n");
        let map = value.as_mapping().unwrap();

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["1", "true", "2.5"]);
    }

    #[test]
    fn test_from_yaml_scalars() {
        let value = yaml("s: text\ni: -3\nf: 1.5\nb: True\nn: ~\nl: [3, 4]\n");

        assert_eq!(value.lookup(&["s"]), Some(&Value::from("text")));
        assert_eq!(value.lookup(&["i"]), Some(&Value::Integer(-3)));
        assert_eq!(value.lookup(&["f"]), Some(&Value::Float(1.5)));
        assert_eq!(value.lookup(&["b"]), Some(&Value::Bool(true)));
        assert_eq!(value.lookup(&["n"]), Some(&Value::Null));
        assert_eq!(value.lookup(&["l"]), Some(&Value::from(vec![3, 4])));
    }

    #[test]
    fn test_from_yaml_drops_tags() {
        let value = yaml("secret: !vault token\n");
        assert_eq!(value.lookup(&["secret"]).unwrap().as_str(), Some("token"));
    }

    #[test]
    fn test_from_json() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"a": {"b": [1, 2.5, "x", null, false]}}"#).unwrap();
        let value = Value::from_json(json);

        assert_eq!(
            value.lookup(&["a", "b"]),
            Some(&Value::Sequence(vec![
                Value::Integer(1),
                Value::Float(2.5),
                Value::from("x"),
                Value::Null,
                Value::Bool(false),
            ]))
        );
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(Value::Null.to_plain_string(), "");
        assert_eq!(Value::from("x").to_plain_string(), "x");
        assert_eq!(Value::Integer(8080).to_plain_string(), "8080");
        assert_eq!(Value::Bool(false).to_plain_string(), "false");
        assert_eq!(Value::from(vec!["a", "b"]).to_plain_string(), "[a, b]");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Float(1.0).type_name(), "float");
        assert_eq!(Value::Mapping(Mapping::new()).type_name(), "mapping");
    }
}
