//! Remote configuration sources
//!
//! The loader asks a [`RemoteSource`] for extra documents once local files
//! are merged. With the `http` feature, [`SpringCloudClient`] fetches them
//! from a Spring Cloud Config server.

use crate::error::Result;
use crate::value::Mapping;

/// What to ask a remote source for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteRequest {
    /// Server base URL, e.g. `http://config-server:8888`
    pub base_url: String,
    /// Application name
    pub name: String,
    /// Active profiles; `default` is requested when empty
    pub profiles: Vec<String>,
    /// Branch or label; omitted from the request when empty
    pub label: String,
    /// Token sent as `X-Config-Token`
    pub token: Option<String>,
}

impl RemoteRequest {
    /// The profiles path segment
    pub fn profiles_segment(&self) -> String {
        if self.profiles.is_empty() {
            "default".to_string()
        } else {
            self.profiles.join(",")
        }
    }
}

/// A source of documents outside the local directory
///
/// Documents are returned lowest priority first, so merging them in order
/// lets later documents win.
pub trait RemoteSource: Send + Sync {
    fn fetch(&self, request: &RemoteRequest) -> Result<Vec<Mapping>>;
}

impl<F> RemoteSource for F
where
    F: Fn(&RemoteRequest) -> Result<Vec<Mapping>> + Send + Sync,
{
    fn fetch(&self, request: &RemoteRequest) -> Result<Vec<Mapping>> {
        self(request)
    }
}

#[cfg(feature = "http")]
pub use self::spring_cloud::{SpringCloudClient, ACCEPT, DEFAULT_TIMEOUT, TOKEN_HEADER};

#[cfg(feature = "http")]
mod spring_cloud {
    use std::time::Duration;

    use serde::Deserialize;

    use super::{RemoteRequest, RemoteSource};
    use crate::error::{Error, Result};
    use crate::expand::expand;
    use crate::path::DEFAULT_DELIMITER;
    use crate::value::{Mapping, Value};

    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const ACCEPT: &str = "application/json, application/*+json";
    pub const TOKEN_HEADER: &str = "X-Config-Token";

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct EnvironmentResponse {
        #[serde(default)]
        name: String,
        #[serde(default)]
        property_sources: Vec<PropertySource>,
    }

    #[derive(Debug, Deserialize)]
    struct PropertySource {
        #[serde(default)]
        name: String,
        #[serde(default)]
        source: serde_json::Map<String, serde_json::Value>,
    }

    /// Client for the Spring Cloud Config server environment endpoint
    #[derive(Debug, Clone)]
    pub struct SpringCloudClient {
        timeout: Duration,
    }

    impl Default for SpringCloudClient {
        fn default() -> Self {
            Self {
                timeout: DEFAULT_TIMEOUT,
            }
        }
    }

    impl SpringCloudClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        /// `<base>/<name>/<profiles>[/<label>]`, segments percent-encoded
        pub fn build_url(&self, request: &RemoteRequest) -> Result<url::Url> {
            let invalid = |message: String| Error::remote_fetch(&request.base_url, None, message);

            let mut url = url::Url::parse(&request.base_url)
                .map_err(|e| invalid(format!("Invalid URL: {}", e)))?;
            {
                let mut segments = url
                    .path_segments_mut()
                    .map_err(|_| invalid("URL cannot have a path".into()))?;
                segments
                    .pop_if_empty()
                    .push(&request.name)
                    .push(&request.profiles_segment());
                if !request.label.is_empty() {
                    segments.push(&request.label);
                }
            }
            Ok(url)
        }
    }

    impl RemoteSource for SpringCloudClient {
        fn fetch(&self, request: &RemoteRequest) -> Result<Vec<Mapping>> {
            let url = self.build_url(request)?;
            let url = url.as_str();

            let config = ureq::Agent::config_builder()
                .timeout_global(Some(self.timeout))
                .build();
            let agent: ureq::Agent = config.into();

            let mut call = agent.get(url).header("Accept", ACCEPT);
            if let Some(token) = request.token.as_deref().filter(|t| !t.is_empty()) {
                call = call.header(TOKEN_HEADER, token);
            }

            let response = call.call().map_err(|e| match e {
                ureq::Error::StatusCode(code) => {
                    Error::remote_fetch(url, Some(code), format!("HTTP {}", code))
                }
                ureq::Error::Timeout(kind) => {
                    Error::remote_fetch(url, None, format!("Request timeout: {:?}", kind))
                }
                ureq::Error::Io(io_err) => {
                    Error::remote_fetch(url, None, format!("Connection error: {}", io_err))
                }
                other => Error::remote_fetch(url, None, other.to_string()),
            })?;

            let body = response
                .into_body()
                .read_to_string()
                .map_err(|e| Error::remote_fetch(url, None, e.to_string()))?;
            let environment: EnvironmentResponse = serde_json::from_str(&body)
                .map_err(|e| Error::remote_fetch(url, None, format!("Invalid response: {}", e)))?;

            log::debug!(
                "Fetched {} property source(s) for '{}' from {}",
                environment.property_sources.len(),
                environment.name,
                url
            );

            // The server lists the highest priority source first. Merging folds
            // later sources over earlier ones, so reverse to let it win.
            Ok(environment
                .property_sources
                .into_iter()
                .rev()
                .map(|source| {
                    log::trace!("Property source '{}'", source.name);
                    match Value::from_json(serde_json::Value::Object(source.source)) {
                        Value::Mapping(map) => expand(map, DEFAULT_DELIMITER),
                        _ => Mapping::new(),
                    }
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_segment() {
        let mut request = RemoteRequest::default();
        assert_eq!(request.profiles_segment(), "default");

        request.profiles = vec!["development".into(), "local".into()];
        assert_eq!(request.profiles_segment(), "development,local");
    }

    #[test]
    fn test_closure_source() {
        let source = |request: &RemoteRequest| -> Result<Vec<Mapping>> {
            let mut map = Mapping::new();
            map.insert("name".into(), request.name.as_str().into());
            Ok(vec![map])
        };
        let request = RemoteRequest {
            name: "api-chat".into(),
            ..Default::default()
        };

        let docs = source.fetch(&request).unwrap();
        assert_eq!(docs[0]["name"], crate::value::Value::from("api-chat"));
    }
}
