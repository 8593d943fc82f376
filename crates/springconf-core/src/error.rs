//! Error types for springconf
//!
//! Errors are structured: a kind, the config path or file involved,
//! an optional source location and an actionable help message.
//! Only parsing and file access are hard failures; lookups and
//! coercions never produce an `Error`.

use std::fmt;

/// Result type alias for springconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for springconf operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Config key where the error occurred (e.g., "spring.cloud.config.uri")
    pub path: Option<String>,
    /// Source location (file, line) if available
    pub source_location: Option<SourceLocation>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Location in a source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    /// Zero-based index of the document inside a multi-document text
    pub document: Option<usize>,
    pub line: Option<usize>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// Malformed document text
    #[error("Parse error")]
    Parse,
    /// Reading a file or stream failed for a reason other than absence
    #[error("I/O error")]
    Io,
    /// A required file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: String },
    /// Placeholder substitution did not terminate within the limit
    #[error("Cyclic placeholder detected")]
    CyclicPlaceholder,
    /// Fetching configuration from a remote source failed
    #[error("Remote fetch failed: {url}")]
    RemoteFetch { url: String, status: Option<u16> },
    /// Placeholder syntax cannot be used for scanning
    #[error("Invalid placeholder syntax")]
    InvalidSyntax,
}

impl Error {
    fn with_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            source_location: None,
            help: None,
            cause: None,
        }
    }

    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::with_kind(ErrorKind::Parse)
        }
    }

    /// Create an I/O error for the given file
    pub fn io(file: impl Into<String>, err: &std::io::Error) -> Self {
        let file = file.into();
        Self {
            source_location: Some(SourceLocation::file(file)),
            cause: Some(err.to_string()),
            ..Self::with_kind(ErrorKind::Io)
        }
    }

    /// Create a file not found error
    pub fn file_not_found(file: impl Into<String>) -> Self {
        let file = file.into();
        Self {
            help: Some(format!(
                "Create '{}' or remove the profile that requires it",
                file
            )),
            ..Self::with_kind(ErrorKind::FileNotFound { path: file })
        }
    }

    /// Create a cyclic placeholder error
    pub fn cyclic_placeholder(text: impl Into<String>, limit: usize) -> Self {
        Self {
            help: Some(
                "Break the cycle by removing a placeholder that refers back to itself".into(),
            ),
            cause: Some(format!(
                "Gave up after {} substitutions while resolving \"{}\"",
                limit,
                text.into()
            )),
            ..Self::with_kind(ErrorKind::CyclicPlaceholder)
        }
    }

    /// Create a remote fetch error
    pub fn remote_fetch(
        url: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        let url = url.into();
        Self {
            help: Some(format!(
                "Check that the config server at '{}' is reachable",
                url
            )),
            cause: Some(message.into()),
            ..Self::with_kind(ErrorKind::RemoteFetch { url, status })
        }
    }

    /// Create an invalid placeholder syntax error
    pub fn invalid_syntax(message: impl Into<String>) -> Self {
        Self {
            help: Some("Placeholder opener and closer must be non-empty".into()),
            cause: Some(message.into()),
            ..Self::with_kind(ErrorKind::InvalidSyntax)
        }
    }

    /// Whether this error reports a missing file
    pub fn is_file_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::FileNotFound { .. })
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add source location to the error
    pub fn with_source_location(mut self, loc: SourceLocation) -> Self {
        self.source_location = Some(loc);
        self
    }

    /// Set the file name of the source location, keeping document and line
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        let file = file.into();
        match &mut self.source_location {
            Some(loc) => loc.file = file,
            None => self.source_location = Some(SourceLocation::file(file)),
        }
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl SourceLocation {
    /// A location naming only the file
    pub fn file(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            document: None,
            line: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let ErrorKind::RemoteFetch {
            status: Some(status),
            ..
        } = &self.kind
        {
            write!(f, " (status {})", status)?;
        }

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(loc) = &self.source_location {
            write!(f, "\n  File: {}", loc.file)?;
            if let Some(line) = loc.line {
                write!(f, ":{}", line)?;
            }
            if let Some(document) = loc.document {
                write!(f, " (document {})", document)?;
            }
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
