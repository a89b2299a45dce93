// SPDX-License-Identifier: PMPL-1.0-or-later
//! Output formatting for the harvest CLI.
//!
//! Supports two output formats:
//! - Plain text (default, human-readable)
//! - JSON (machine-readable)
//!
//! Log lines go through tracing; this module only prints command results.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use harvest_metadata::RunSummary;
use serde::Serialize;

use crate::config::Config;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text output (human-readable)
    #[default]
    Plain,
    /// JSON output (machine-readable)
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" | "human" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unknown output format: {}. Valid formats: plain, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Output handler for consistent formatting across commands
#[derive(Debug, Clone)]
pub struct Outputter {
    format: OutputFormat,
}

impl Outputter {
    /// Create a new outputter with the specified format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Output a serializable value as pretty JSON
    pub fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Output the configuration, token masked
    pub fn output_config(&self, config: &Config) -> Result<()> {
        let config = config.redacted();
        match self.format {
            OutputFormat::Json => self.output(&config)?,
            OutputFormat::Plain => println!("{}", toml::to_string_pretty(&config)?),
        }
        Ok(())
    }

    /// Output a run summary
    pub fn output_summary(&self, summary: &RunSummary, output_dir: &Path) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.output(summary)?,
            OutputFormat::Plain => print_summary(summary, output_dir),
        }
        Ok(())
    }

    /// Output a success message
    pub fn success(&self, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                self.output(&serde_json::json!({ "status": "success", "message": message }))?
            }
            OutputFormat::Plain => println!("{} {}", "✓".green(), message),
        }
        Ok(())
    }

    /// Output a failure message (the command still exits normally)
    pub fn failure(&self, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                self.output(&serde_json::json!({ "status": "failure", "message": message }))?
            }
            OutputFormat::Plain => println!("{} {}", "✗".red(), message),
        }
        Ok(())
    }
}

fn print_summary(summary: &RunSummary, output_dir: &Path) {
    println!();
    println!("{}", "Metadata Summary".bold());
    println!("{}", "================".bold());
    println!("  Total plugins:    {}", summary.total_plugins);
    println!(
        "  Valid:            {}",
        summary.valid_plugins.to_string().green()
    );
    println!(
        "  Archived:         {}",
        colorize_count(summary.archived_plugins, |s| s.yellow())
    );
    println!(
        "  Renamed:          {}",
        colorize_count(summary.renamed_plugins, |s| s.yellow())
    );
    println!(
        "  Skipped:          {}",
        colorize_count(summary.skipped_plugins, |s| s.red())
    );
    println!("  Duration:         {:.2}s", summary.execution_time_seconds);
    println!("  Output:           {}", output_dir.display());
}

fn colorize_count(count: usize, paint: fn(&str) -> colored::ColoredString) -> String {
    let text = count.to_string();
    if count == 0 {
        text
    } else {
        paint(&text).to_string()
    }
}
