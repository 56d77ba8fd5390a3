//! CLI command implementations

pub mod content_types;
pub mod entries;
