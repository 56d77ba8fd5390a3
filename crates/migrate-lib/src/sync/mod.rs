//! Synchronization with the Contentful management API
//!
//! This module provides:
//! - A rate-limited request throttle shared by every call
//! - A transport seam with a `reqwest` implementation
//! - An authenticated client for one space
//! - The content type and entry protocols

mod client;
mod content_types;
mod entries;
mod throttle;
mod transport;


pub use client::{
    expect_success, merge_headers, probe_version, require_version, sys_id, sys_version,
    CallOptions, ManagementClient, CONTENT_TYPE_HEADER, MANAGEMENT_MEDIA_TYPE, VERSION_HEADER,
};
pub use content_types::{sync_content_type, ContentTypeOutcome};
pub use entries::{create_entry, update_entry, EntryAction, EntryOutcome};
pub use throttle::Throttle;
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};
