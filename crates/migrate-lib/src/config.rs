//! Space and synchronization configuration

use crate::error::{Result, SyncError};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default management API root
pub const DEFAULT_API_BASE: &str = "https://api.contentful.com";

/// Contentful allows 10 req/s on the management API; stay comfortably below it
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 7;

/// Default number of items processed concurrently within one sync
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// A Contentful space: where every resource URL is rooted
#[derive(Debug, Clone)]
pub struct Space {
    id: String,
    token: String,
    root: Url,
    url: String,
}

impl Space {
    /// Create a space rooted at the given API base
    pub fn new(id: impl Into<String>, token: impl Into<String>, api_base: &str) -> Result<Self> {
        let id = id.into();
        let token = token.into();

        if id.trim().is_empty() {
            return Err(SyncError::Config("space id must not be empty".into()));
        }
        if token.trim().is_empty() {
            return Err(SyncError::Config("management token must not be empty".into()));
        }

        let base = Url::parse(api_base)
            .map_err(|e| SyncError::Config(format!("invalid API base URL {api_base}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(SyncError::Config(format!(
                "API base URL {api_base} cannot carry paths"
            )));
        }

        let mut root = base;
        if let Ok(mut segments) = root.path_segments_mut() {
            segments.pop_if_empty().extend(["spaces", id.as_str()]);
        }
        let url = root.as_str().to_string();
        Ok(Self {
            id,
            token,
            root,
            url,
        })
    }

    /// Space id as configured
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Bearer token sent with every request
    pub fn token(&self) -> &str {
        &self.token
    }

    /// `{api_base}/spaces/{id}`
    pub fn url(&self) -> &str {
        &self.url
    }

    /// `{space}/content_types/{id}`, with the id percent-encoded as one segment
    pub fn content_type_url(&self, id: &str) -> String {
        self.resource(&["content_types", id])
    }

    /// Collection URL used to create entries with server-assigned ids
    pub fn entries_url(&self) -> String {
        self.resource(&["entries"])
    }

    /// `{space}/entries/{id}`, with the id percent-encoded as one segment
    pub fn entry_url(&self, id: &str) -> String {
        self.resource(&["entries", id])
    }

    fn resource(&self, path: &[&str]) -> String {
        let mut url = self.root.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(path);
        }
        url.into()
    }
}

/// Configuration for a migrator
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Space id
    pub space_id: String,
    /// Content management token
    pub token: String,
    /// Directory holding content type descriptors
    pub models_path: PathBuf,
    /// Directory holding entry descriptors
    pub entries_path: PathBuf,
    /// Management API root
    pub api_base: String,
    /// Throttle ceiling
    pub requests_per_second: u32,
    /// Items in flight per sync
    pub max_concurrency: usize,
    /// Per-request timeout applied by the HTTP transport
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            space_id: String::new(),
            token: String::new(),
            models_path: PathBuf::from("models"),
            entries_path: PathBuf::from("entries"),
            api_base: DEFAULT_API_BASE.to_string(),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl SyncConfig {
    /// Check the configuration and derive the space from it
    pub fn space(&self) -> Result<Space> {
        if self.requests_per_second == 0 {
            return Err(SyncError::Config(
                "requests per second must be at least 1".into(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(SyncError::Config("max concurrency must be at least 1".into()));
        }
        Space::new(&self.space_id, &self.token, &self.api_base)
    }
}

/// Builder for [`SyncConfig`]
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    config: SyncConfig,
}

impl SyncConfigBuilder {
    /// Start from defaults for the given space and token
    pub fn new(space_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            config: SyncConfig {
                space_id: space_id.into(),
                token: token.into(),
                ..Default::default()
            },
        }
    }

    /// Directory read by the content type pass
    pub fn models_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.models_path = path.into();
        self
    }

    /// Directory read by the entry passes
    pub fn entries_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.entries_path = path.into();
        self
    }

    /// Management API root, e.g. a mock server in tests
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    /// Throttle ceiling per rolling second
    pub fn requests_per_second(mut self, rate: u32) -> Self {
        self.config.requests_per_second = rate;
        self
    }

    /// Items synced at once within a pass
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.config.max_concurrency = limit;
        self
    }

    /// Timeout for each HTTP request
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<SyncConfig> {
        self.config.space()?;
        Ok(self.config)
    }
}
