//! Contentful space migration library
//!
//! This crate provides the core functionality for:
//! - Loading content type and entry descriptors from disk
//! - Rate-limited, authenticated calls to the management API
//! - The create/update/publish protocols for content types and entries
//! - Structured logging and metrics for sync passes

pub mod config;
pub mod error;
pub mod migrator;
pub mod models;
pub mod observability;
pub mod source;
pub mod sync;

pub use config::{Space, SyncConfig, SyncConfigBuilder};
pub use error::{ItemFailure, Result, SyncError};
pub use migrator::{EntryReport, Migrator};
pub use models::{EntryDescriptor, FieldDescriptor, ModelDescriptor};
pub use observability::{SyncLogger, SyncMetrics};
pub use source::{DescriptorSource, DirectorySource, Document, StaticSource};
