//! Environment variable lookup used by placeholder resolution
//!
//! Lookups are made every time a placeholder is resolved; nothing is
//! cached, so a changed variable is visible on the next read.

use std::collections::HashMap;
use std::fmt;

/// A source of environment variables
pub trait Environment: Send + Sync {
    /// Value of the variable `name`, if set
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        if name.is_empty() || name.contains(['=', '\0']) {
            return None;
        }
        std::env::var(name).ok()
    }
}

/// Fixed variables, for tests and embedding
impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl fmt::Debug for dyn Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Environment")
    }
}
