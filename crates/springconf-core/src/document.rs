//! Splitting multi-document YAML text into property maps
//!
//! A line starting with `---` ends the current document. Each block is
//! parsed as YAML and its dotted keys are expanded. A parse failure in
//! any block fails the whole text.

use std::io::BufRead;

use crate::error::{Error, Result, SourceLocation};
use crate::expand::expand;
use crate::path::DEFAULT_DELIMITER;
use crate::value::{Mapping, Value};

/// Marker that separates documents in one text
pub const DOCUMENT_SEPARATOR: &str = "---";

/// File name reported for text that did not come from a file
pub const TEXT_SOURCE: &str = "<text>";

/// Read `reader` line by line and parse every document in it.
///
/// The separator line itself is discarded. A separator always closes a
/// document, even an empty one; the block after the last separator is
/// parsed only if it has at least one line.
pub fn fetch_docs<R: BufRead>(reader: R) -> Result<Vec<Mapping>> {
    let mut docs = Vec::new();
    let mut lines: Vec<String> = Vec::new();
    let mut first_line = 1;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(TEXT_SOURCE, &e))?;
        if line.starts_with(DOCUMENT_SEPARATOR) {
            docs.push(parse_block(&lines, docs.len(), first_line)?);
            lines.clear();
            first_line = idx + 2;
        } else {
            lines.push(line);
        }
    }

    if !lines.is_empty() {
        docs.push(parse_block(&lines, docs.len(), first_line)?);
    }

    log::debug!("Split text into {} document(s)", docs.len());
    Ok(docs)
}

/// Parse every document in an in-memory text
pub fn parse_docs(text: &str) -> Result<Vec<Mapping>> {
    fetch_docs(text.as_bytes())
}

/// Parse one document body into an expanded mapping.
///
/// An empty body (or one holding only comments) is an empty mapping.
pub fn parse_document(body: &str) -> Result<Mapping> {
    let parsed: serde_yaml::Value = serde_yaml::from_str(body).map_err(|e| {
        Error::parse(e.to_string()).with_source_location(SourceLocation {
            file: TEXT_SOURCE.into(),
            document: None,
            line: e.location().map(|loc| loc.line()),
        })
    })?;

    match Value::from_yaml(parsed) {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(map) => Ok(expand(map, DEFAULT_DELIMITER)),
        other => Err(Error::parse(format!(
            "Expected a mapping at the top of the document, found {}",
            other.type_name()
        ))),
    }
}

fn parse_block(lines: &[String], index: usize, first_line: usize) -> Result<Mapping> {
    parse_document(&lines.join("\n")).map_err(|mut err| {
        let loc = err
            .source_location
            .get_or_insert_with(|| SourceLocation::file(TEXT_SOURCE));
        loc.document = Some(index);
        loc.line = Some(loc.line.map_or(first_line, |line| line + first_line - 1));
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    const MULTI: &str = r#"
a: Easy!
b:
  c: 2
  d: [3, 4]
  e:
    a: tra-ta-ta
    b: 345
    c: True
---
e:
  - 1
  - 2
"#;

    #[test]
    fn test_fetch_multiple_docs() {
        let docs = parse_docs(MULTI).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["a"], Value::from("Easy!"));
        assert_eq!(docs[1]["e"], Value::from(vec![1, 2]));
    }

    #[test]
    fn test_marker_count_with_trailing_block() {
        let docs = parse_docs("a: 1\n---\nb: 2\n---\nc: 3\n").unwrap();
        assert_eq!(docs.len(), 3);
    }

    #[test]
    fn test_marker_count_without_trailing_block() {
        let docs = parse_docs("a: 1\n---\nb: 2\n---\n").unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_leading_marker_yields_empty_document() {
        let docs = parse_docs("---\na: 1\n").unwrap();

        assert_eq!(docs.len(), 2);
        assert!(docs[0].is_empty());
        assert_eq!(docs[1]["a"], Value::Integer(1));
    }

    #[test]
    fn test_marker_with_trailing_content() {
        let docs = parse_docs("a: 1\n--- # next\nb: 2\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert!(!docs[1].contains_key("a"));
    }

    #[test]
    fn test_empty_text() {
        assert!(parse_docs("").unwrap().is_empty());
    }

    #[test]
    fn test_documents_are_expanded() {
        let docs = parse_docs("spring.application.name: api-chat\n").unwrap();
        let spring = docs[0]["spring"].as_mapping().unwrap();
        let application = spring["application"].as_mapping().unwrap();
        assert_eq!(application["name"], Value::from("api-chat"));
    }

    #[test]
    fn test_crlf_lines() {
        let docs = parse_docs("a: 1\r\n---\r\nb: 2\r\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["b"], Value::Integer(2));
    }

    #[test]
    fn test_parse_failure_aborts() {
        let err = parse_docs("a: 1\n---\nb: [unclosed\n---\nc: 3\n").unwrap_err();

        assert_eq!(err.kind, ErrorKind::Parse);
        let loc = err.source_location.unwrap();
        assert_eq!(loc.document, Some(1));
        assert!(loc.line.unwrap() >= 3);
    }

    #[test]
    fn test_non_mapping_document_is_parse_error() {
        let err = parse_docs("a: 1\n---\n- just\n- a list\n").unwrap_err();

        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.source_location.unwrap().document, Some(1));
    }
}
