//! Placeholder resolution
//!
//! Resolves placeholders embedded in string values:
//! - `${KEY}` - environment variable or dotted config path
//! - `${KEY:DEFAULT}` - same, falling back to `DEFAULT`
//!
//! After every substitution the scan restarts from the beginning of the
//! string, so a value that itself holds a placeholder is resolved too.
//! Nested or escaped braces are not supported.

use std::ops::Range;

use crate::error::{Error, Result};

/// Default cap on substitutions while resolving one string
pub const DEFAULT_MAX_SUBSTITUTIONS: usize = 1000;

/// Delimiters of a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSyntax {
    opener: String,
    closer: String,
    default_separator: String,
}

impl PlaceholderSyntax {
    /// Create a syntax; opener and closer must be non-empty
    pub fn new(
        opener: impl Into<String>,
        closer: impl Into<String>,
        default_separator: impl Into<String>,
    ) -> Result<Self> {
        let syntax = Self {
            opener: opener.into(),
            closer: closer.into(),
            default_separator: default_separator.into(),
        };
        if syntax.opener.is_empty() || syntax.closer.is_empty() {
            return Err(Error::invalid_syntax(format!(
                "opener {:?} and closer {:?}",
                syntax.opener, syntax.closer
            )));
        }
        Ok(syntax)
    }

    pub fn opener(&self) -> &str {
        &self.opener
    }

    pub fn closer(&self) -> &str {
        &self.closer
    }

    pub fn default_separator(&self) -> &str {
        &self.default_separator
    }

    /// Find the first complete placeholder in `text`.
    ///
    /// Returns the byte range of the whole span (delimiters included) and
    /// the parsed body. `None` when there is no opener, or when the first
    /// opener has no closer after it.
    pub fn find<'a>(&self, text: &'a str) -> Option<(Range<usize>, Placeholder<'a>)> {
        let start = text.find(&self.opener)?;
        let body_start = start + self.opener.len();
        let body_len = text[body_start..].find(&self.closer)?;
        let body_end = body_start + body_len;
        let span = start..body_end + self.closer.len();
        Some((span, self.parse_body(&text[body_start..body_end])))
    }

    /// Split a placeholder body at the first default separator
    pub fn parse_body<'a>(&self, body: &'a str) -> Placeholder<'a> {
        if !self.default_separator.is_empty() {
            if let Some((key, default)) = body.split_once(self.default_separator.as_str()) {
                return Placeholder {
                    key,
                    default: Some(default),
                };
            }
        }
        Placeholder { key: body, default: None }
    }
}

impl Default for PlaceholderSyntax {
    fn default() -> Self {
        Self {
            opener: "${".into(),
            closer: "}".into(),
            default_separator: ":".into(),
        }
    }
}

/// A parsed `${KEY:DEFAULT}` reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Environment variable name or dotted config path
    pub key: &'a str,
    /// Text used when `key` does not resolve
    pub default: Option<&'a str>,
}

/// Substitute every placeholder in `text`.
///
/// `lookup` returns the replacement for a key, or `None` when the key is
/// unknown, in which case the default (or the empty string) is used.
/// Fails with `CyclicPlaceholder` once more than `max_substitutions`
/// substitutions were needed.
pub fn resolve<F>(
    text: &str,
    syntax: &PlaceholderSyntax,
    max_substitutions: usize,
    mut lookup: F,
) -> Result<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut current = text.to_string();
    let mut substitutions = 0;

    while let Some((span, placeholder)) = syntax.find(&current) {
        if substitutions == max_substitutions {
            return Err(Error::cyclic_placeholder(text, max_substitutions));
        }
        substitutions += 1;

        let replacement = lookup(placeholder.key)
            .or_else(|| placeholder.default.map(str::to_string))
            .unwrap_or_default();
        current.replace_range(span, &replacement);
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashMap;

    fn resolve_with(text: &str, vars: &[(&str, &str)]) -> Result<String> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        resolve(text, &PlaceholderSyntax::default(), DEFAULT_MAX_SUBSTITUTIONS, |key| {
            vars.get(key).map(|v| v.to_string())
        })
    }

    #[test]
    fn test_no_placeholder_is_unchanged() {
        assert_eq!(resolve_with("plain $text {}", &[]).unwrap(), "plain $text {}");
    }

    #[test]
    fn test_simple_substitution() {
        assert_eq!(
            resolve_with("http://${host}:8080", &[("host", "localhost")]).unwrap(),
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_multiple_substitutions() {
        assert_eq!(
            resolve_with("${a}:${b}:${c}", &[("a", "1"), ("b", "2"), ("c", "3")]).unwrap(),
            "1:2:3"
        );
    }

    #[test]
    fn test_default_used_when_missing() {
        assert_eq!(
            resolve_with("${missing.key:fallback}", &[]).unwrap(),
            "fallback"
        );
    }

    #[test]
    fn test_default_splits_at_first_separator() {
        assert_eq!(
            resolve_with("${SPRING_CONFIG_URI:http://config-server:8888}", &[]).unwrap(),
            "http://config-server:8888"
        );
    }

    #[test]
    fn test_missing_without_default_is_empty() {
        assert_eq!(resolve_with("[${missing}]", &[]).unwrap(), "[]");
    }

    #[test]
    fn test_found_value_beats_default() {
        assert_eq!(resolve_with("${a:b}", &[("a", "x")]).unwrap(), "x");
    }

    #[test]
    fn test_replacement_is_rescanned() {
        assert_eq!(
            resolve_with("${outer}", &[("outer", "<${inner}>"), ("inner", "ok")]).unwrap(),
            "<ok>"
        );
    }

    #[test]
    fn test_unterminated_placeholder_is_literal() {
        assert_eq!(resolve_with("cost: ${price", &[("price", "1")]).unwrap(), "cost: ${price");
        assert_eq!(
            resolve_with("${a} then ${b", &[("a", "x")]).unwrap(),
            "x then ${b"
        );
    }

    #[test]
    fn test_self_reference_is_cyclic() {
        let err = resolve_with("${a}", &[("a", "${a}")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CyclicPlaceholder);
    }

    #[test]
    fn test_growing_cycle_is_cyclic() {
        let err = resolve_with("${a}", &[("a", "x${b}"), ("b", "y${a}")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CyclicPlaceholder);
    }

    #[test]
    fn test_limit_counts_substitutions() {
        let syntax = PlaceholderSyntax::default();
        let lookup = |_: &str| Some("v".to_string());

        assert_eq!(resolve("${a}${b}", &syntax, 2, lookup).unwrap(), "vv");
        assert!(resolve("${a}${b}${c}", &syntax, 2, lookup).is_err());
    }

    #[test]
    fn test_find_reports_span() {
        let syntax = PlaceholderSyntax::default();
        let (span, placeholder) = syntax.find("ab${key:dflt}cd").unwrap();

        assert_eq!(span, 2..13);
        assert_eq!(placeholder.key, "key");
        assert_eq!(placeholder.default, Some("dflt"));
    }

    #[test]
    fn test_find_empty_default() {
        let syntax = PlaceholderSyntax::default();
        let (_, placeholder) = syntax.find("${key:}").unwrap();
        assert_eq!(placeholder.default, Some(""));
    }

    #[test]
    fn test_custom_syntax() {
        let syntax = PlaceholderSyntax::new("#{", "}#", "|").unwrap();
        let result = resolve("#{a|x}#-#{b}#", &syntax, 10, |key| {
            (key == "b").then(|| "y".to_string())
        })
        .unwrap();
        assert_eq!(result, "x-y");
    }

    #[test]
    fn test_empty_opener_rejected() {
        let err = PlaceholderSyntax::new("", "}", ":").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSyntax);
    }
}
