//! Descriptor sources
//!
//! A source lists raw JSON documents; turning them into typed descriptors
//! happens in [`crate::models`].

use crate::error::{Result, SyncError};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A raw descriptor document and the name it was loaded under
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub value: Value,
}

impl Document {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Anything that can produce descriptor documents for one sync pass
pub trait DescriptorSource: Send + Sync {
    fn documents(&self) -> Result<Vec<Document>>;
}

/// Reads every `*.json` file of a directory, in file name order
#[derive(Debug, Clone)]
pub struct DirectorySource {
    path: PathBuf,
}

impl DirectorySource {
    /// Source reading `*.json` files from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Directory being read
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DescriptorSource for DirectorySource {
    fn documents(&self) -> Result<Vec<Document>> {
        let io_error = |source| SyncError::Io {
            path: self.path.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.path).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') || path.extension().and_then(|e| e.to_str()) != Some("json")
            {
                debug!(file = %path.display(), "Skipping non-descriptor file");
                continue;
            }
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        files
            .into_iter()
            .map(|path| {
                let content = fs::read_to_string(&path).map_err(|source| SyncError::Io {
                    path: path.clone(),
                    source,
                })?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let value = serde_json::from_str(&content).map_err(|e| SyncError::Descriptor {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
                Ok(Document { name, value })
            })
            .collect()
    }
}

/// Fixed in-memory documents
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: Vec<Document>,
}

impl StaticSource {
    /// Source serving fixed documents
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

impl DescriptorSource for StaticSource {
    fn documents(&self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }
}
