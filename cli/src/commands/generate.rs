// SPDX-License-Identifier: PMPL-1.0-or-later
//! Generate command implementation.
//!
//! Validates every repository in the plugin list and writes the metadata
//! files. Individual plugin failures are logged and skipped; only a broken
//! plugin list or an unwritable output directory fails the command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use harvest_adapters::HostingApi;
use harvest_metadata::BatchRunner;
use tracing::info;

use super::build_adapter;
use crate::config::Config;
use crate::exit_codes;
use crate::output::{OutputFormat, Outputter};

/// Arguments for the generate command
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// JSON file listing plugin repositories as "owner/repo"
    #[arg(short, long)]
    pub plugins: Option<PathBuf>,

    /// Directory the metadata files are written to
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the generate command
pub async fn execute(args: GenerateArgs, config: &Config, format: OutputFormat) -> Result<i32> {
    let plugin_list = args.plugins.unwrap_or_else(|| config.paths.plugin_list.clone());
    let output_dir = args.output.unwrap_or_else(|| config.paths.output_dir.clone());

    let api: Arc<dyn HostingApi> = Arc::new(build_adapter(config)?);
    info!(
        "Generating plugin metadata from {} into {}",
        plugin_list.display(),
        output_dir.display()
    );

    let summary = BatchRunner::new(api)
        .with_options(config.pipeline_options())
        .with_compare_ignore(config.metadata.compare_ignore.clone())
        .run(&plugin_list, &output_dir)
        .await
        .with_context(|| format!("Metadata generation into {} failed", output_dir.display()))?;

    Outputter::new(format).output_summary(&summary, &output_dir)?;
    Ok(exit_codes::SUCCESS)
}
