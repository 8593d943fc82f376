//! Dotted key paths

/// Default delimiter between path segments
pub const DEFAULT_DELIMITER: &str = ".";

/// Split `key` on `delimiter`, dropping empty segments.
///
/// Leading, trailing and repeated delimiters are tolerated, so
/// `".a..b."` and `"a.b"` address the same value.
pub fn build_path<'a>(key: &'a str, delimiter: &str) -> Vec<&'a str> {
    key.split(delimiter).filter(|s| !s.is_empty()).collect()
}
