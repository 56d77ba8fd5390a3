//! Content type CLI commands

use anyhow::Result;
use migrate_lib::sync::ContentTypeOutcome;
use migrate_lib::{Migrator, SyncError};
use tabled::Tabled;

use crate::output::{
    color_action, format_version, print_error, print_success, print_table, print_warning,
    OutputFormat,
};

/// Row for content types table
#[derive(Tabled)]
struct ContentTypeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Editor Interface")]
    editor_interface: String,
}

/// Create or update, publish and lay out every content type
pub async fn migrate(migrator: &Migrator, format: OutputFormat) -> Result<()> {
    match migrator.migrate_content_types().await {
        Ok(outcomes) => {
            render(&outcomes, format)?;
            Ok(())
        }
        Err(SyncError::Batch { total, failures }) => {
            for failure in &failures {
                print_error(&format!("{}: {}", failure.item, failure.error));
            }
            anyhow::bail!("{} of {} content types failed to sync", failures.len(), total)
        }
        Err(e) => Err(e.into()),
    }
}

fn render(outcomes: &[ContentTypeOutcome], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(outcomes)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            if outcomes.is_empty() {
                print_warning("No content types found");
                return Ok(());
            }

            let rows: Vec<ContentTypeRow> = outcomes
                .iter()
                .map(|o| ContentTypeRow {
                    id: o.id.clone(),
                    action: color_action(if o.created() { "created" } else { "updated" }),
                    version: format_version(o.published_version()),
                    editor_interface: if o.editor_interface.is_some() {
                        "✓".to_string()
                    } else {
                        "".to_string()
                    },
                })
                .collect();

            print_table(rows);
            print_success(&format!("{} content types published", outcomes.len()));
        }
    }

    Ok(())
}
