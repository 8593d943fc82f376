//! Main Config type for springconf
//!
//! A `Config` is an immutable tree of merged documents. Values are read
//! through dotted paths and string values have their `${...}`
//! placeholders resolved at read time against the process environment
//! and the tree itself.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;

use crate::coerce;
use crate::document::parse_docs;
use crate::env::{Environment, ProcessEnvironment};
use crate::error::{Error, Result};
use crate::merge::{deep_merge, merge_all};
use crate::path::{build_path, DEFAULT_DELIMITER};
use crate::placeholder::{self, PlaceholderSyntax, DEFAULT_MAX_SUBSTITUTIONS};
use crate::profile::{filter_documents, ProfileSet};
use crate::value::{Mapping, Value};

/// Options controlling how a tree is addressed and resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOptions {
    /// Separator between path segments in keys
    pub delimiter: String,
    /// Placeholder delimiters and default separator
    pub placeholder: PlaceholderSyntax,
    /// Substitutions allowed while resolving one string
    pub max_substitutions: usize,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            placeholder: PlaceholderSyntax::default(),
            max_substitutions: DEFAULT_MAX_SUBSTITUTIONS,
        }
    }
}

/// The main configuration object
///
/// Cloning is cheap: the tree and the environment are shared.
#[derive(Debug, Clone)]
pub struct Config {
    /// The root mapping
    raw: Arc<Mapping>,
    /// Configuration options
    options: ConfigOptions,
    /// Source of environment variables for placeholders
    env: Arc<dyn Environment>,
}

impl Config {
    /// Create a new Config from a mapping
    pub fn new(mapping: Mapping) -> Self {
        Self::with_options(mapping, ConfigOptions::default())
    }

    /// Create a Config with custom options
    pub fn with_options(mapping: Mapping, options: ConfigOptions) -> Self {
        Self {
            raw: Arc::new(mapping),
            options,
            env: Arc::new(ProcessEnvironment),
        }
    }

    /// A Config with no keys
    pub fn empty() -> Self {
        Self::new(Mapping::new())
    }

    /// Merge documents in order, later documents winning
    pub fn from_documents<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = Mapping>,
    {
        Self::new(merge_all(documents))
    }

    /// Parse multi-document YAML text and merge every document
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(Self::from_documents(parse_docs(text)?))
    }

    /// Parse multi-document YAML text, keeping only the documents that
    /// apply under `profiles`
    pub fn from_yaml_with_profiles(text: &str, profiles: &ProfileSet) -> Result<Self> {
        Ok(Self::from_documents(filter_documents(
            parse_docs(text)?,
            profiles,
        )))
    }

    /// Replace the environment used to resolve placeholders
    pub fn with_environment(mut self, env: impl Environment + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }

    /// The root mapping, unresolved
    pub fn mapping(&self) -> &Mapping {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.mapping().is_empty()
    }

    /// Get the stored value at `key` without resolving placeholders
    ///
    /// The empty key addresses the root, which is read through
    /// [`Config::mapping`] instead.
    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        lookup_in(&self.raw, &self.path(key))
    }

    /// Whether `key` addresses a stored value or the root
    pub fn has(&self, key: &str) -> bool {
        let path = self.path(key);
        path.is_empty() || lookup_in(&self.raw, &path).is_some()
    }

    /// Get the value at `key`, resolving placeholders in string values
    ///
    /// A cyclic placeholder is logged and reported as a missing value;
    /// use [`Config::try_get`] to see the error.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("{}", err);
                None
            }
        }
    }

    /// Get the value at `key`, surfacing resolution errors
    ///
    /// The empty key returns the whole root mapping.
    pub fn try_get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path(key);
        if path.is_empty() {
            return Ok(Some(Value::Mapping((*self.raw).clone())));
        }
        match lookup_in(&self.raw, &path) {
            Some(Value::String(s)) => {
                let resolved = self.interpolate(s).map_err(|e| e.with_path(key))?;
                Ok(Some(Value::String(resolved)))
            }
            Some(other) => Ok(Some(other.clone())),
            None => Ok(None),
        }
    }

    /// Resolve placeholders in arbitrary text against this tree
    pub fn interpolate(&self, text: &str) -> Result<String> {
        placeholder::resolve(
            text,
            &self.options.placeholder,
            self.options.max_substitutions,
            |key| self.lookup_replacement(key),
        )
    }

    /// The subtree at `key`, sharing options and environment
    pub fn sub(&self, key: &str) -> Option<Config> {
        match self.get(key)? {
            Value::Mapping(mapping) => Some(Self {
                raw: Arc::new(mapping),
                options: self.options.clone(),
                env: Arc::clone(&self.env),
            }),
            _ => None,
        }
    }

    /// A new tree with `other` merged over this one
    ///
    /// Neither input is modified. When either side is empty the other is
    /// returned as is.
    pub fn merge(&self, other: &Config) -> Config {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        Self {
            raw: Arc::new(deep_merge((*self.raw).clone(), (*other.raw).clone())),
            options: self.options.clone(),
            env: Arc::clone(&self.env),
        }
    }

    pub fn get_string(&self, key: &str) -> String {
        self.coerce(key, "string", coerce::to_string)
            .unwrap_or_default()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.coerce(key, "bool", coerce::to_bool).unwrap_or_default()
    }

    pub fn get_i64(&self, key: &str) -> i64 {
        self.coerce(key, "i64", coerce::to_i64).unwrap_or_default()
    }

    pub fn get_i32(&self, key: &str) -> i32 {
        self.coerce(key, "i32", coerce::to_i32).unwrap_or_default()
    }

    pub fn get_u64(&self, key: &str) -> u64 {
        self.coerce(key, "u64", coerce::to_u64).unwrap_or_default()
    }

    pub fn get_u32(&self, key: &str) -> u32 {
        self.coerce(key, "u32", coerce::to_u32).unwrap_or_default()
    }

    pub fn get_f64(&self, key: &str) -> f64 {
        self.coerce(key, "f64", coerce::to_f64).unwrap_or_default()
    }

    pub fn get_duration(&self, key: &str) -> Duration {
        self.coerce(key, "duration", coerce::to_duration)
            .unwrap_or_default()
    }

    /// Timestamp at `key`; the Unix epoch when missing or unparsable
    pub fn get_time(&self, key: &str) -> OffsetDateTime {
        self.coerce(key, "time", coerce::to_time)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    pub fn get_int_slice(&self, key: &str) -> Vec<i64> {
        self.coerce(key, "integer list", coerce::to_int_slice)
            .unwrap_or_default()
    }

    pub fn get_string_slice(&self, key: &str) -> Vec<String> {
        self.coerce(key, "string list", coerce::to_string_slice)
            .unwrap_or_default()
    }

    /// Mapping at `key`, unresolved; empty when missing or not a mapping
    pub fn get_string_map(&self, key: &str) -> Mapping {
        self.coerce(key, "mapping", |v| v.as_mapping().cloned())
            .unwrap_or_default()
    }

    /// Export the tree as a Value
    ///
    /// # Arguments
    /// * `resolve` - If true, resolve placeholders in every string leaf.
    pub fn to_value(&self, resolve: bool) -> Result<Value> {
        if !resolve {
            return Ok(Value::Mapping((*self.raw).clone()));
        }
        self.resolve_mapping(&self.raw, "").map(Value::Mapping)
    }

    /// Export the tree as YAML
    pub fn to_yaml(&self, resolve: bool) -> Result<String> {
        let value = self.to_value(resolve)?;
        serde_yaml::to_string(&value).map_err(|e| Error::parse(e.to_string()))
    }

    /// Export the tree as pretty JSON with a four-space indent
    pub fn to_json(&self, resolve: bool) -> Result<String> {
        let value = self.to_value(resolve)?;
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|e| Error::parse(e.to_string()))?;
        String::from_utf8(out).map_err(|e| Error::parse(e.to_string()))
    }

    fn path<'a>(&self, key: &'a str) -> Vec<&'a str> {
        build_path(key, &self.options.delimiter)
    }

    fn lookup_replacement(&self, key: &str) -> Option<String> {
        replacement(&self.raw, self.env.as_ref(), &self.options.delimiter, key)
    }

    fn coerce<T>(
        &self,
        key: &str,
        target: &str,
        convert: impl FnOnce(&Value) -> Option<T>,
    ) -> Option<T> {
        let value = self.get(key)?;
        let converted = convert(&value);
        if converted.is_none() {
            log::trace!(
                "Cannot read '{}' as {}, found {}",
                key,
                target,
                value.type_name()
            );
        }
        converted
    }

    fn resolve_value(&self, value: &Value, path: &str) -> Result<Value> {
        match value {
            Value::String(s) => {
                let resolved = self.interpolate(s).map_err(|e| e.with_path(path))?;
                Ok(Value::String(resolved))
            }
            Value::Sequence(seq) => {
                let resolved = seq
                    .iter()
                    .enumerate()
                    .map(|(i, v)| self.resolve_value(v, &format!("{}[{}]", path, i)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Sequence(resolved))
            }
            Value::Mapping(map) => self.resolve_mapping(map, path).map(Value::Mapping),
            other => Ok(other.clone()),
        }
    }

    fn resolve_mapping(&self, map: &Mapping, path: &str) -> Result<Mapping> {
        let mut resolved = Mapping::with_capacity(map.len());
        for (k, v) in map {
            let child = if path.is_empty() {
                k.clone()
            } else {
                format!("{}{}{}", path, self.options.delimiter, k)
            };
            resolved.insert(k.clone(), self.resolve_value(v, &child)?);
        }
        Ok(resolved)
    }
}

/// Value at `path` below `root`; `None` for the empty path
pub(crate) fn lookup_in<'a>(root: &'a Mapping, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    root.get(*first)?.lookup(rest)
}

/// Replacement text for a placeholder key: the environment first, then
/// the unresolved tree. An empty key never resolves.
pub(crate) fn replacement(
    root: &Mapping,
    env: &dyn Environment,
    delimiter: &str,
    key: &str,
) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    if let Some(value) = env.var(key) {
        return Some(value);
    }
    lookup_in(root, &build_path(key, delimiter)).map(Value::to_plain_string)
}

impl Default for Config {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Mapping> for Config {
    fn from(mapping: Mapping) -> Self {
        Self::new(mapping)
    }
}
