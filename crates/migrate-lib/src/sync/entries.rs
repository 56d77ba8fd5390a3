//! Entry protocols: create-then-publish and update-then-publish

use super::client::{
    expect_success, require_version, sys_id, sys_version, CallOptions, ManagementClient,
    CONTENT_TYPE_HEADER,
};
use super::transport::Method;
use crate::error::{Result, SyncError};
use crate::models::EntryDescriptor;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Which protocol produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryAction {
    Created,
    Updated,
}

impl EntryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

impl fmt::Display for EntryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Responses collected while syncing one entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryOutcome {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub action: EntryAction,
    pub entry: Value,
    pub publish: Value,
}

impl EntryOutcome {
    /// Version reported by the publish call
    pub fn published_version(&self) -> Option<u64> {
        sys_version(&self.publish)
    }
}

/// Create an entry (PUT with a known id, POST otherwise) and publish it
pub async fn create_entry(
    client: &ManagementClient,
    entry: &EntryDescriptor,
) -> Result<EntryOutcome> {
    let content_type = entry
        .content_type_id()
        .ok_or(SyncError::MissingContentType)?;

    let (method, url) = match entry.entry_id() {
        Some(id) => (Method::Put, client.space().entry_url(id)),
        None => (Method::Post, client.space().entries_url()),
    };
    let options = CallOptions::new(method)
        .header(CONTENT_TYPE_HEADER, content_type)
        .body(entry.body());

    let response = client.call(&url, options).await?;
    let created = expect_success(method, &url, response)?;

    let id = match entry.entry_id() {
        Some(id) => id.to_string(),
        None => sys_id(&created)
            .ok_or_else(|| SyncError::MalformedResponse {
                url: url.clone(),
                message: "created entry has no sys.id".to_string(),
            })?
            .to_string(),
    };
    let version = require_version(&url, &created)?;
    let publish = publish_entry(client, &id, version).await?;

    client
        .logger()
        .log_entry_synced(&id, EntryAction::Created.as_str(), sys_version(&publish));

    Ok(EntryOutcome {
        id,
        content_type: Some(content_type.to_string()),
        action: EntryAction::Created,
        entry: created,
        publish,
    })
}

/// Update an existing entry with its current version and republish it
pub async fn update_entry(
    client: &ManagementClient,
    entry: &EntryDescriptor,
) -> Result<EntryOutcome> {
    let id = entry.entry_id().ok_or(SyncError::MissingEntryId)?;
    let url = client.space().entry_url(id);

    let response = client.call(&url, CallOptions::get()).await?;
    let current = expect_success(Method::Get, &url, response)?;
    let version = require_version(&url, &current)?;

    let response = client
        .call(&url, CallOptions::put().version(version).body(entry.body()))
        .await?;
    let updated = expect_success(Method::Put, &url, response)?;

    let version = require_version(&url, &updated)?;
    let publish = publish_entry(client, id, version).await?;

    client
        .logger()
        .log_entry_synced(id, EntryAction::Updated.as_str(), sys_version(&publish));

    Ok(EntryOutcome {
        id: id.to_string(),
        content_type: entry.content_type_id().map(str::to_string),
        action: EntryAction::Updated,
        entry: updated,
        publish,
    })
}

async fn publish_entry(client: &ManagementClient, id: &str, version: u64) -> Result<Value> {
    let url = format!("{}/published", client.space().entry_url(id));
    let response = client
        .call(&url, CallOptions::put().version(version))
        .await?;
    expect_success(Method::Put, &url, response)
}
