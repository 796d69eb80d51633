//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// YAML format
    Yaml,
}

/// Print a table from a list of items
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No items found".yellow());
                return Ok(());
            }
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&items)?);
        }
    }
    Ok(())
}

/// Print an error message
#[allow(dead_code)]
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Format a possibly-empty instance name for display
pub fn format_instance(instance: &str) -> String {
    if instance.is_empty() {
        "(aggregate)".dimmed().to_string()
    } else {
        instance.to_string()
    }
}

/// Color an interval according to its sampling mode
pub fn color_interval(interval_id: i32, current: bool) -> String {
    if current {
        format!("{}s (live)", interval_id).green().to_string()
    } else {
        format!("{}s (historical)", interval_id).blue().to_string()
    }
}
