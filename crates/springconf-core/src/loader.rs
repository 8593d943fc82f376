//! Loading configuration from a directory
//!
//! Sources are merged in this order, later sources winning:
//! 1. `application.yml`, then `application-<profile>.yml` per active profile
//! 2. documents from the remote source, when `bootstrap.yml` enables it
//! 3. files named by `spring.config.location` in `bootstrap.yml`
//!
//! Every file is filtered by the active profiles before it is merged.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use crate::config::{Config, ConfigOptions};
use crate::document::fetch_docs;
use crate::error::{Error, Result};
use crate::merge::merge_all;
use crate::profile::{filter_documents, ProfileSet};
use crate::remote::{RemoteRequest, RemoteSource};

pub const BOOTSTRAP_FILE: &str = "bootstrap.yml";
pub const APPLICATION_NAME: &str = "application";

/// Entries of `spring.config.location` that name a local YAML file
pub const LOCATION_PATTERN: &str = r"^file:(/\w.+\.ya?ml)$";

const CLOUD_ENABLED_KEY: &str = "spring.cloud.config.enabled";
const CLOUD_URI_KEY: &str = "spring.cloud.config.uri";
const CLOUD_LABEL_KEY: &str = "spring.cloud.config.label";
const CLOUD_TOKEN_KEY: &str = "spring.cloud.config.vault_token";
const APP_NAME_KEY: &str = "spring.application.name";
const LOCATION_KEY: &str = "spring.config.location";

/// Loads and merges the configuration files of one directory
#[derive(Clone)]
pub struct Loader {
    dir: PathBuf,
    profiles: ProfileSet,
    remote: Option<Arc<dyn RemoteSource>>,
    options: ConfigOptions,
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("dir", &self.dir)
            .field("profiles", &self.profiles)
            .field("remote", &self.remote.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl Loader {
    /// A loader for `dir` with no active profiles
    ///
    /// With the `http` feature the remote source defaults to a
    /// [`SpringCloudClient`](crate::remote::SpringCloudClient).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            profiles: ProfileSet::default(),
            remote: default_remote(),
            options: ConfigOptions::default(),
        }
    }

    pub fn with_profiles(mut self, profiles: ProfileSet) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn with_remote_source(mut self, remote: impl RemoteSource + 'static) -> Self {
        self.remote = Some(Arc::new(remote));
        self
    }

    /// Never contact a remote source, even when bootstrap enables it
    pub fn without_remote_source(mut self) -> Self {
        self.remote = None;
        self
    }

    /// Options for the loaded trees
    pub fn with_options(mut self, options: ConfigOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn profiles(&self) -> &ProfileSet {
        &self.profiles
    }

    /// Load and merge every source
    pub fn load(&self) -> Result<Config> {
        let bootstrap = self.load_bootstrap()?;
        let mut config = self.load_local()?;

        if let Some(remote) = self.load_remote(&bootstrap) {
            config = config.merge(&remote);
        }

        if bootstrap.has(LOCATION_KEY) {
            match self.load_external(&bootstrap) {
                Ok(external) => config = config.merge(&external),
                Err(err) => log::warn!("Skipping {}: {}", LOCATION_KEY, err),
            }
        }

        Ok(config)
    }

    /// Load one file, keeping the documents that match the active profiles
    pub fn load_yaml(&self, path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let file = std::fs::File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(&display)
            } else {
                Error::io(&display, &e)
            }
        })?;
        let docs = fetch_docs(std::io::BufReader::new(file)).map_err(|e| e.in_file(&display))?;

        let total = docs.len();
        let docs = filter_documents(docs, &self.profiles);
        log::debug!(
            "Loaded {} ({} of {} document(s) apply)",
            display,
            docs.len(),
            total
        );

        Ok(Config::with_options(merge_all(docs), self.options.clone()))
    }

    /// `bootstrap.yml`, or an empty tree when the file does not exist
    pub fn load_bootstrap(&self) -> Result<Config> {
        match self.load_yaml(self.dir.join(BOOTSTRAP_FILE)) {
            Err(err) if err.is_file_not_found() => {
                log::debug!("No {} in {}", BOOTSTRAP_FILE, self.dir.display());
                Ok(Config::with_options(Default::default(), self.options.clone()))
            }
            other => other,
        }
    }

    /// `application.yml` and one `application-<profile>.yml` per profile
    pub fn load_local(&self) -> Result<Config> {
        let mut paths = vec![self.dir.join(format!("{}.yml", APPLICATION_NAME))];
        paths.extend(
            self.profiles
                .iter()
                .map(|p| self.dir.join(format!("{}-{}.yml", APPLICATION_NAME, p))),
        );
        self.load_merged(&paths)
    }

    /// Load files in order and merge them; every file is required
    pub fn load_merged<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Config> {
        paths.iter().try_fold(
            Config::with_options(Default::default(), self.options.clone()),
            |merged, path| Ok(merged.merge(&self.load_yaml(path)?)),
        )
    }

    /// The request a remote source would receive for this bootstrap
    pub fn remote_request(&self, bootstrap: &Config) -> RemoteRequest {
        let token = bootstrap.get_string(CLOUD_TOKEN_KEY);
        RemoteRequest {
            base_url: bootstrap.get_string(CLOUD_URI_KEY),
            name: bootstrap.get_string(APP_NAME_KEY),
            profiles: self.profiles.as_slice().to_vec(),
            label: bootstrap.get_string(CLOUD_LABEL_KEY),
            token: (!token.is_empty()).then_some(token),
        }
    }

    fn load_remote(&self, bootstrap: &Config) -> Option<Config> {
        if !bootstrap.get_bool(CLOUD_ENABLED_KEY) {
            return None;
        }
        let Some(remote) = &self.remote else {
            log::debug!("Remote config enabled but no remote source is set");
            return None;
        };

        let request = self.remote_request(bootstrap);
        match remote.fetch(&request) {
            Ok(docs) => {
                log::debug!("Merging {} remote document(s)", docs.len());
                Some(Config::with_options(merge_all(docs), self.options.clone()))
            }
            Err(err) => {
                log::warn!("Remote config from '{}' skipped: {}", request.base_url, err);
                None
            }
        }
    }

    fn load_external(&self, bootstrap: &Config) -> Result<Config> {
        let paths = external_locations(&bootstrap.get_string(LOCATION_KEY))?;
        self.load_merged(&paths)
    }
}

/// Local file paths named by a `spring.config.location` value
///
/// Entries that are not `file:` URLs of `.yml`/`.yaml` files are ignored.
pub fn external_locations(setting: &str) -> Result<Vec<PathBuf>> {
    let pattern = Regex::new(LOCATION_PATTERN).map_err(|e| Error::parse(e.to_string()))?;
    Ok(setting
        .split(',')
        .map(str::trim)
        .filter_map(|entry| pattern.captures(entry))
        .filter_map(|caps| caps.get(1))
        .map(|m| PathBuf::from(m.as_str()))
        .collect())
}

#[cfg(feature = "http")]
fn default_remote() -> Option<Arc<dyn RemoteSource>> {
    Some(Arc::new(crate::remote::SpringCloudClient::new()))
}

#[cfg(not(feature = "http"))]
fn default_remote() -> Option<Arc<dyn RemoteSource>> {
    None
}
