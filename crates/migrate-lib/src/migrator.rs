//! Space migrator
//!
//! Holds the client and both descriptor sources, and runs one sync pass per
//! call. Items of a pass run concurrently (bounded by `max_concurrency`) and
//! share the client's throttle.
//!
//! Content type sync is fail-visible: every item runs to completion and any
//! failure turns the whole pass into [`SyncError::Batch`]. Entry syncs log and
//! report failures but never fail the pass for them.

use crate::config::SyncConfig;
use crate::error::{ItemFailure, Result, SyncError};
use crate::models::{load_entries, load_models, EntryDescriptor};
use crate::source::{DescriptorSource, DirectorySource};
use crate::sync::{
    create_entry, sync_content_type, update_entry, ContentTypeOutcome, EntryOutcome,
    ManagementClient, Throttle, Transport,
};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

const CONTENT_TYPES: &str = "migrate_content_types";
const MIGRATE_ENTRIES: &str = "migrate_entries";
const SEED_ENTRIES: &str = "seed_entries";

/// Result of an entry pass
#[derive(Debug, Default)]
pub struct EntryReport {
    pub succeeded: Vec<EntryOutcome>,
    pub failed: Vec<ItemFailure>,
}

impl EntryReport {
    /// Number of entries attempted
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// True when no entry failed
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Pushes local descriptors to one space
pub struct Migrator {
    client: ManagementClient,
    models: Box<dyn DescriptorSource>,
    entries: Box<dyn DescriptorSource>,
    max_concurrency: usize,
}

impl Migrator {
    /// Migrator talking to the management API over HTTP
    pub fn new(config: SyncConfig) -> Result<Self> {
        let client = ManagementClient::from_config(&config)?;
        Ok(Self::with_client(config, client))
    }

    /// Migrator using a caller-supplied transport
    pub fn with_transport(config: SyncConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let space = config.space()?;
        let client = ManagementClient::new(
            space,
            transport,
            Throttle::per_second(config.requests_per_second),
        );
        Ok(Self::with_client(config, client))
    }

    fn with_client(config: SyncConfig, client: ManagementClient) -> Self {
        Self {
            client,
            models: Box::new(DirectorySource::new(config.models_path)),
            entries: Box::new(DirectorySource::new(config.entries_path)),
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    /// Underlying client, for metrics and direct calls
    pub fn client(&self) -> &ManagementClient {
        &self.client
    }

    /// Read content types from another directory on the next pass
    pub fn set_models_path(&mut self, path: impl Into<PathBuf>) {
        self.models = Box::new(DirectorySource::new(path));
    }

    /// Read entries from another directory on the next pass
    pub fn set_entries_path(&mut self, path: impl Into<PathBuf>) {
        self.entries = Box::new(DirectorySource::new(path));
    }

    /// Replace where content types are read from
    pub fn set_model_source(&mut self, source: impl DescriptorSource + 'static) {
        self.models = Box::new(source);
    }

    /// Replace where entries are read from
    pub fn set_entry_source(&mut self, source: impl DescriptorSource + 'static) {
        self.entries = Box::new(source);
    }

    /// Create or update, publish and lay out every content type
    pub async fn migrate_content_types(&self) -> Result<Vec<ContentTypeOutcome>> {
        let models = load_models(self.models.as_ref())?;
        let total = models.len();
        let logger = self.client.logger();
        let metrics = self.client.metrics();
        logger.log_sync_started(CONTENT_TYPES, total);
        let started = Instant::now();

        let client = &self.client;
        let results: Vec<_> = stream::iter(models)
            .map(|model| {
                let label = model.id.clone();
                async move { (label, sync_content_type(client, model).await) }
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut outcomes = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for (item, result) in results {
            match result {
                Ok(outcome) => {
                    metrics.inc_synced("content_type");
                    outcomes.push(outcome);
                }
                Err(error) => {
                    metrics.inc_failures("content_type");
                    logger.log_item_failed(CONTENT_TYPES, &item, &error);
                    failures.push(ItemFailure { item, error });
                }
            }
        }

        logger.log_sync_finished(CONTENT_TYPES, outcomes.len(), failures.len(), started.elapsed());
        if failures.is_empty() {
            Ok(outcomes)
        } else {
            Err(SyncError::Batch { total, failures })
        }
    }

    /// Update every entry in place and republish it
    pub async fn migrate_entries(&self) -> Result<EntryReport> {
        let entries = load_entries(self.entries.as_ref())?;
        Ok(self
            .run_entries(MIGRATE_ENTRIES, entries, |client, entry| async move {
                update_entry(client, &entry).await
            })
            .await)
    }

    /// Create and publish every entry
    pub async fn seed_entries(&self) -> Result<EntryReport> {
        let entries = load_entries(self.entries.as_ref())?;
        Ok(self
            .run_entries(SEED_ENTRIES, entries, |client, entry| async move {
                create_entry(client, &entry).await
            })
            .await)
    }

    async fn run_entries<'a, F, Fut>(
        &'a self,
        operation: &str,
        entries: Vec<EntryDescriptor>,
        protocol: F,
    ) -> EntryReport
    where
        F: Fn(&'a ManagementClient, EntryDescriptor) -> Fut,
        Fut: Future<Output = Result<EntryOutcome>> + 'a,
    {
        let logger = self.client.logger();
        let metrics = self.client.metrics();
        logger.log_sync_started(operation, entries.len());
        let started = Instant::now();

        let client = &self.client;
        let protocol = &protocol;
        let results: Vec<_> = stream::iter(entries.into_iter().enumerate())
            .map(|(index, entry)| {
                let label = entry
                    .entry_id()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{index}"));
                async move { (label, protocol(client, entry).await) }
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut report = EntryReport::default();
        for (item, result) in results {
            match result {
                Ok(outcome) => {
                    metrics.inc_synced("entry");
                    report.succeeded.push(outcome);
                }
                Err(error) => {
                    metrics.inc_failures("entry");
                    logger.log_item_failed(operation, &item, &error);
                    report.failed.push(ItemFailure { item, error });
                }
            }
        }

        logger.log_sync_finished(
            operation,
            report.succeeded.len(),
            report.failed.len(),
            started.elapsed(),
        );
        report
    }
}
