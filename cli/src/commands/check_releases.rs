// SPDX-License-Identifier: PMPL-1.0-or-later
//! Check-releases command implementation.
//!
//! Preflight for newly submitted plugins: the repository must exist and
//! publish at least one release.

use anyhow::Result;
use clap::Args;
use harvest_metadata::check_releases;
use tracing::error;

use super::build_adapter;
use crate::config::Config;
use crate::exit_codes;
use crate::output::{OutputFormat, Outputter};

/// Arguments for the check-releases command
#[derive(Args, Debug)]
pub struct CheckReleasesArgs {
    /// Repository to check, as "owner/repo"
    pub repo: String,
}

/// Execute the check-releases command
pub async fn execute(args: CheckReleasesArgs, config: &Config, format: OutputFormat) -> Result<i32> {
    let adapter = build_adapter(config)?;
    let count = check_releases(&adapter, &args.repo).await?;

    let outputter = Outputter::new(format);
    if count == 0 {
        error!("::error::No releases found for {}", args.repo);
        outputter.failure(&format!("{} has no releases", args.repo))?;
        return Ok(exit_codes::NO_RELEASES);
    }

    outputter.success(&format!("{} has {} release(s)", args.repo, count))?;
    Ok(exit_codes::SUCCESS)
}
