//! Contentful Migrate CLI
//!
//! A command-line tool for pushing locally defined content types and
//! entries to a Contentful space.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{content_types, entries};
use migrate_lib::Migrator;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Contentful Migrate CLI
#[derive(Parser)]
#[command(name = "cfm")]
#[command(author, version, about = "Contentful Migrate: push content types and entries to a space", long_about = None)]
pub struct Cli {
    /// Space id (can also be set via CONTENTFUL_SPACE_ID env var)
    #[arg(long, env = "CONTENTFUL_SPACE_ID")]
    pub space_id: Option<String>,

    /// Content management token (can also be set via CONTENTFUL_MANAGEMENT_TOKEN env var)
    #[arg(long, env = "CONTENTFUL_MANAGEMENT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Directory of content type descriptors
    #[arg(long)]
    pub models: Option<PathBuf>,

    /// Directory of entry descriptors
    #[arg(long)]
    pub entries: Option<PathBuf>,

    /// Management API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Maximum requests per second
    #[arg(long)]
    pub rate: Option<u32>,

    /// Items synced concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Config file (defaults to ~/.config/cfm/config.toml when present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Print Prometheus metrics to stderr after the run
    #[arg(long)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or update, publish and lay out every content type
    ContentTypes,

    /// Update existing entries and republish them
    Entries,

    /// Create and publish every entry
    Seed,
}

impl Cli {
    fn settings(&self) -> config::Settings {
        config::Settings {
            space_id: self.space_id.clone(),
            token: self.token.clone(),
            models_path: self.models.clone(),
            entries_path: self.entries.clone(),
            base_url: self.base_url.clone(),
            requests_per_second: self.rate,
            max_concurrency: self.concurrency,
            request_timeout_secs: None,
        }
    }
}

/// Filter used when `RUST_LOG` is unset
fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output; logs go to stderr
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    // Load configuration: flags win over the file and CFM_* variables
    let file_settings = config::Settings::load(cli.config.as_deref())?;
    let sync_config = cli.settings().overlay(file_settings).into_sync_config()?;
    debug!(space = %sync_config.space_id, "Configured");

    let migrator = Migrator::new(sync_config)?;

    let result = match cli.command {
        Commands::ContentTypes => content_types::migrate(&migrator, cli.format).await,
        Commands::Entries => entries::migrate(&migrator, cli.format).await,
        Commands::Seed => entries::seed(&migrator, cli.format).await,
    };

    // stderr keeps `--format json` output parseable
    if cli.print_metrics {
        eprint!("{}", migrator.client().metrics().render());
    }

    result
}
