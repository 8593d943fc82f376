//! springconf-core: Spring-style layered YAML configuration
//!
//! This crate loads multi-document YAML files, keeps the documents that
//! match the active profiles, deep-merges them in order and resolves
//! `${KEY:DEFAULT}` placeholders at read time.
//!
//! # Example
//!
//! ```rust
//! use springconf_core::{Config, ProfileSet};
//!
//! let yaml = r#"
//! database.host: localhost
//! database.port: 5432
//! url: postgres://${database.host}:${database.port}
//! ---
//! profiles: prod
//! database.host: db.internal
//! "#;
//!
//! let config = Config::from_yaml_with_profiles(yaml, &ProfileSet::parse("dev")).unwrap();
//! assert_eq!(config.get_string("database.host"), "localhost");
//! assert_eq!(config.get_u32("database.port"), 5432);
//! assert_eq!(config.get_string("url"), "postgres://localhost:5432");
//! ```

pub mod coerce;
pub mod document;
pub mod env;
pub mod error;
pub mod expand;
pub mod loader;
pub mod merge;
pub mod path;
pub mod placeholder;
pub mod profile;
pub mod remote;
pub mod value;

mod config;

pub use config::{Config, ConfigOptions};
pub use env::{Environment, ProcessEnvironment};
pub use error::{Error, ErrorKind, Result};
pub use loader::Loader;
pub use placeholder::PlaceholderSyntax;
pub use profile::ProfileSet;
#[cfg(feature = "http")]
pub use remote::SpringCloudClient;
pub use remote::{RemoteRequest, RemoteSource};
pub use value::{Mapping, Value};
