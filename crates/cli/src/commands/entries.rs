//! Entry CLI commands
//!
//! Entry passes never fail the command for individual entries; failures are
//! listed after the table.

use anyhow::Result;
use migrate_lib::{EntryReport, Migrator};
use serde_json::json;
use tabled::Tabled;

use crate::output::{
    color_action, format_version, print_error, print_success, print_table, print_warning,
    OutputFormat,
};

/// Row for entries table
#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Content Type")]
    content_type: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Version")]
    version: String,
}

/// Update existing entries and republish them
pub async fn migrate(migrator: &Migrator, format: OutputFormat) -> Result<()> {
    let report = migrator.migrate_entries().await?;
    render(&report, format)
}

/// Create and publish every entry
pub async fn seed(migrator: &Migrator, format: OutputFormat) -> Result<()> {
    let report = migrator.seed_entries().await?;
    render(&report, format)
}

fn render(report: &EntryReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let failed: Vec<_> = report
                .failed
                .iter()
                .map(|f| json!({ "item": f.item, "error": f.error.to_string() }))
                .collect();
            let json = serde_json::to_string_pretty(&json!({
                "succeeded": report.succeeded,
                "failed": failed,
            }))?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            if report.total() == 0 {
                print_warning("No entries found");
                return Ok(());
            }

            if !report.succeeded.is_empty() {
                let rows: Vec<EntryRow> = report
                    .succeeded
                    .iter()
                    .map(|o| EntryRow {
                        id: o.id.clone(),
                        content_type: o.content_type.clone().unwrap_or_default(),
                        action: color_action(o.action.as_str()),
                        version: format_version(o.published_version()),
                    })
                    .collect();
                print_table(rows);
            }

            for failure in &report.failed {
                print_error(&format!("{}: {}", failure.item, failure.error));
            }

            if report.is_clean() {
                print_success(&format!("{} entries published", report.succeeded.len()));
            } else {
                print_warning(&format!(
                    "{} of {} entries published, {} failed",
                    report.succeeded.len(),
                    report.total(),
                    report.failed.len()
                ));
            }
        }
    }

    Ok(())
}
