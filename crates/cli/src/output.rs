//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print rows as a rounded table
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Format an optional version for display
pub fn format_version(version: Option<u64>) -> String {
    version.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Color an action based on its value
pub fn color_action(action: &str) -> String {
    match action {
        "created" => action.green().to_string(),
        "updated" => action.blue().to_string(),
        "failed" => action.red().to_string(),
        _ => action.to_string(),
    }
}
