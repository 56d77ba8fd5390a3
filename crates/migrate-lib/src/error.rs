//! Error types for space synchronization

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors produced while loading descriptors or talking to the management API
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A descriptor directory or file could not be read
    #[error("failed to read descriptors from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A descriptor document could not be turned into a typed descriptor
    #[error("invalid descriptor {name}: {message}")]
    Descriptor { name: String, message: String },

    /// Entry creation needs to know which content type it instantiates
    #[error("create requires a content type id for entry")]
    MissingContentType,

    /// Entry update needs a known entry id
    #[error("entry requires an id to update")]
    MissingEntryId,

    /// The request never produced a response
    #[error("transport error calling {url}: {message}")]
    Transport { url: String, message: String },

    /// The management API answered with a non-2xx status
    #[error("{method} {url} rejected with status {status}: {body}")]
    Remote {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// A successful response lacked data the protocol depends on
    #[error("malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    /// One or more items of a fail-visible batch failed
    #[error("{} of {total} items failed to sync", .failures.len())]
    Batch {
        total: usize,
        failures: Vec<ItemFailure>,
    },
}

impl SyncError {
    /// Whether the error was raised locally without touching the network
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingContentType | Self::MissingEntryId)
    }

    /// Status code of a remote rejection, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A single failed item inside a batch
#[derive(Debug)]
pub struct ItemFailure {
    /// Descriptor id, or its position in the flattened batch when it has none
    pub item: String,
    pub error: SyncError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_message_counts_failures() {
        let err = SyncError::Batch {
            total: 3,
            failures: vec![ItemFailure {
                item: "post".to_string(),
                error: SyncError::MissingEntryId,
            }],
        };
        assert_eq!(err.to_string(), "1 of 3 items failed to sync");
    }

    #[test]
    fn test_validation_errors() {
        assert!(SyncError::MissingContentType.is_validation());
        assert!(SyncError::MissingEntryId.is_validation());
        assert!(!SyncError::Config("x".into()).is_validation());
    }

    #[test]
    fn test_remote_status() {
        let err = SyncError::Remote {
            method: "PUT".into(),
            url: "https://api.contentful.com/spaces/s/entries/e".into(),
            status: 409,
            body: "{}".into(),
        };
        assert_eq!(err.status(), Some(409));
        assert_eq!(SyncError::MissingEntryId.status(), None);
    }
}
