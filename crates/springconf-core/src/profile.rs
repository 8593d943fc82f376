//! Profile-based document selection
//!
//! A document opts in or out of a load through its top-level `profiles`
//! key, a comma-separated list such as `development,travis` or `!prod`.
//! Exclusions take precedence over inclusions; a document without the
//! key applies to every profile set.

use std::collections::HashSet;
use std::fmt;

use crate::coerce;
use crate::config::replacement;
use crate::env::ProcessEnvironment;
use crate::path::DEFAULT_DELIMITER;
use crate::placeholder::{self, PlaceholderSyntax, DEFAULT_MAX_SUBSTITUTIONS};
use crate::value::{Mapping, Value};

/// Reserved top-level key holding a document's profile directive
pub const PROFILES_KEY: &str = "profiles";

/// The ordered, immutable list of active profile names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSet {
    names: Vec<String>,
}

impl ProfileSet {
    /// Build from names, trimming them and skipping empty ones
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.as_ref().trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Build from a comma-separated list such as `"development,local"`
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

impl fmt::Display for ProfileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join(","))
    }
}

impl<S: AsRef<str>> FromIterator<S> for ProfileSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// A parsed `profiles` directive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileRule {
    include: HashSet<String>,
    exclude: HashSet<String>,
}

impl ProfileRule {
    /// Parse a directive; `None` when it is blank and so imposes nothing
    pub fn parse(directive: &str) -> Option<Self> {
        if directive.trim().is_empty() {
            return None;
        }

        let mut rule = Self::default();
        for entry in directive.split(',').map(str::trim) {
            match entry.strip_prefix('!') {
                Some(name) => {
                    let name = name.trim();
                    if !name.is_empty() {
                        rule.exclude.insert(name.to_string());
                    }
                }
                None if !entry.is_empty() => {
                    rule.include.insert(entry.to_string());
                }
                None => {}
            }
        }
        Some(rule)
    }

    /// Whether a document carrying this rule applies under `active`
    pub fn matches(&self, active: &ProfileSet) -> bool {
        if active.iter().any(|p| self.exclude.contains(p)) {
            return false;
        }
        active.iter().any(|p| self.include.contains(p))
    }
}

/// The document's profile directive, read like any other key
///
/// Placeholders resolve against the process environment and the
/// document itself. Sequences and mappings read as `""`.
pub fn directive(document: &Mapping) -> String {
    match document.get(PROFILES_KEY) {
        Some(Value::String(text)) => placeholder::resolve(
            text,
            &PlaceholderSyntax::default(),
            DEFAULT_MAX_SUBSTITUTIONS,
            |key| replacement(document, &ProcessEnvironment, DEFAULT_DELIMITER, key),
        )
        .unwrap_or_else(|err| {
            log::warn!("{}", err.with_path(PROFILES_KEY));
            String::new()
        }),
        Some(other) => coerce::to_string(other).unwrap_or_default(),
        None => String::new(),
    }
}

/// Whether `document` applies under the `active` profiles
pub fn should_include(document: &Mapping, active: &ProfileSet) -> bool {
    match ProfileRule::parse(&directive(document)) {
        Some(rule) => rule.matches(active),
        None => true,
    }
}

/// Keep the documents that apply under `active`, in order
pub fn filter_documents(documents: Vec<Mapping>, active: &ProfileSet) -> Vec<Mapping> {
    let total = documents.len();
    let kept: Vec<Mapping> = documents
        .into_iter()
        .filter(|doc| should_include(doc, active))
        .collect();
    log::trace!(
        "Profiles [{}] kept {} of {} document(s)",
        active,
        kept.len(),
        total
    );
    kept
}
