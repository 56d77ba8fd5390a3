//! Configuration management for the CLI

use anyhow::{Context, Result};
use migrate_lib::{SyncConfig, SyncConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings gathered from flags, a config file and `CFM_*` variables
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub space_id: Option<String>,
    pub token: Option<String>,
    pub models_path: Option<PathBuf>,
    pub entries_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub requests_per_second: Option<u32>,
    pub max_concurrency: Option<usize>,
    pub request_timeout_secs: Option<u64>,
}

impl Settings {
    /// Load from the given file (required) or the default file (optional),
    /// then from `CFM_*` environment variables
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match explicit {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(path) = Self::default_path() {
                    builder = builder.add_source(config::File::from(path).required(false));
                }
            }
        }

        let config = builder
            .add_source(config::Environment::with_prefix("CFM").try_parsing(true))
            .build()
            .context("Failed to load configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// `~/.config/cfm/config.toml`
    fn default_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("cfm").join("config.toml"))
    }

    /// Fill every unset value from `base`
    pub fn overlay(self, base: Settings) -> Settings {
        Settings {
            space_id: self.space_id.or(base.space_id),
            token: self.token.or(base.token),
            models_path: self.models_path.or(base.models_path),
            entries_path: self.entries_path.or(base.entries_path),
            base_url: self.base_url.or(base.base_url),
            requests_per_second: self.requests_per_second.or(base.requests_per_second),
            max_concurrency: self.max_concurrency.or(base.max_concurrency),
            request_timeout_secs: self.request_timeout_secs.or(base.request_timeout_secs),
        }
    }

    pub fn into_sync_config(self) -> Result<SyncConfig> {
        let space_id = self
            .space_id
            .context("Missing space id: pass --space-id or set CONTENTFUL_SPACE_ID")?;
        let token = self
            .token
            .context("Missing management token: pass --token or set CONTENTFUL_MANAGEMENT_TOKEN")?;

        let mut builder = SyncConfigBuilder::new(space_id, token);
        if let Some(path) = self.models_path {
            builder = builder.models_path(path);
        }
        if let Some(path) = self.entries_path {
            builder = builder.entries_path(path);
        }
        if let Some(base) = self.base_url {
            builder = builder.api_base(base);
        }
        if let Some(rate) = self.requests_per_second {
            builder = builder.requests_per_second(rate);
        }
        if let Some(limit) = self.max_concurrency {
            builder = builder.max_concurrency(limit);
        }
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_overlay_prefers_flags() {
        let flags = Settings {
            space_id: Some("from-flag".into()),
            ..Default::default()
        };
        let file = Settings {
            space_id: Some("from-file".into()),
            token: Some("file-token".into()),
            ..Default::default()
        };
        let merged = flags.overlay(file);
        assert_eq!(merged.space_id.as_deref(), Some("from-flag"));
        assert_eq!(merged.token.as_deref(), Some("file-token"));
    }

    #[test]
    fn test_missing_space_id() {
        let settings = Settings {
            token: Some("t".into()),
            ..Default::default()
        };
        let err = settings.into_sync_config().unwrap_err();
        assert!(err.to_string().contains("space id"));
    }

    #[test]
    fn test_into_sync_config_defaults() {
        let settings = Settings {
            space_id: Some("s".into()),
            token: Some("t".into()),
            ..Default::default()
        };
        let config = settings.into_sync_config().unwrap();
        assert_eq!(config.requests_per_second, 7);
        assert_eq!(config.api_base, "https://api.contentful.com");
        assert_eq!(config.models_path, PathBuf::from("models"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cfm.toml");
        std::fs::write(
            &path,
            "space_id = \"file-space\"\nmodels_path = \"content/models\"\nrequests_per_second = 5\n",
        )
        .unwrap();

        let settings = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(settings.space_id.as_deref(), Some("file-space"));
        assert_eq!(settings.models_path, Some(PathBuf::from("content/models")));
        assert_eq!(settings.requests_per_second, Some(5));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(Settings::load(Some(path.as_path())).is_err());
    }
}
