// SPDX-License-Identifier: PMPL-1.0-or-later
//! Command implementations for the harvest CLI.
//!
//! Each submodule implements a specific CLI command with its own
//! arguments and execution logic.

pub mod check_releases;
pub mod generate;

use anyhow::{Context, Result};
use harvest_adapters::github::DEFAULT_API_URL;
use harvest_adapters::{create_adapter, GitHubAdapter};
use tracing::warn;

use crate::config::Config;

/// Build the GitHub client described by the `[github]` section
pub fn build_adapter(config: &Config) -> Result<GitHubAdapter> {
    let github = &config.github;
    if !github.has_token() {
        warn!("::warning::No GitHub token configured, using anonymous rate limits");
    }

    let base_url = github.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
    let adapter = match github.user_agent.as_deref() {
        Some(user_agent) => GitHubAdapter::builder(github.token.as_deref(), base_url, user_agent),
        None => create_adapter(github.token.as_deref(), Some(base_url)),
    };
    adapter.with_context(|| format!("Failed to create GitHub client for {}", base_url))
}
