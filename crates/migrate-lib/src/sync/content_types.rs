//! Content type protocol: probe, upsert, publish, editor interface

use super::client::{
    expect_success, probe_version, require_version, sys_version, CallOptions, ManagementClient,
};
use super::transport::Method;
use crate::error::Result;
use crate::models::ModelDescriptor;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

/// Responses collected while syncing one content type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentTypeOutcome {
    pub id: String,
    /// Version seen by the probe; `None` when the content type was new
    pub previous_version: Option<u64>,
    pub upsert: Value,
    pub publish: Value,
    /// Present only when some field carried an appearance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_interface: Option<Value>,
}

impl ContentTypeOutcome {
    /// Version of the published content type
    pub fn published_version(&self) -> Option<u64> {
        sys_version(&self.publish)
    }

    /// Whether the content type did not exist before this sync
    pub fn created(&self) -> bool {
        self.previous_version.is_none()
    }
}

/// Create or update a content type, publish it and sync its editor interface
pub async fn sync_content_type(
    client: &ManagementClient,
    model: ModelDescriptor,
) -> Result<ContentTypeOutcome> {
    let prepared = model.prepare()?;
    let resource_url = client.space().content_type_url(&prepared.id);

    let probe = client.call(&resource_url, CallOptions::get()).await?;
    let previous_version = probe_version(&resource_url, probe)?;
    debug!(content_type = %prepared.id, version = ?previous_version, "Probed content type");

    let mut upsert = CallOptions::put().body(prepared.body);
    if let Some(version) = previous_version {
        upsert = upsert.version(version);
    }
    let response = client.call(&resource_url, upsert).await?;
    let upsert = expect_success(Method::Put, &resource_url, response)?;

    // Publishing needs the version the upsert just produced
    let publish_url = format!("{resource_url}/published");
    let version = require_version(&resource_url, &upsert)?;
    let response = client
        .call(&publish_url, CallOptions::put().version(version))
        .await?;
    let publish = expect_success(Method::Put, &publish_url, response)?;

    let editor_interface = if prepared.controls.is_empty() {
        None
    } else {
        let interface_url = format!("{resource_url}/editor_interface");
        let probe = client.call(&interface_url, CallOptions::get()).await?;
        let current = probe_version(&interface_url, probe)?;

        let mut update = CallOptions::put().body(json!({ "controls": prepared.controls }));
        if let Some(version) = current {
            update = update.version(version);
        }
        let response = client.call(&interface_url, update).await?;
        Some(expect_success(Method::Put, &interface_url, response)?)
    };

    client.logger().log_content_type_synced(
        &prepared.id,
        sys_version(&publish),
        prepared.controls.len(),
    );

    Ok(ContentTypeOutcome {
        id: prepared.id,
        previous_version,
        upsert,
        publish,
        editor_interface,
    })
}
