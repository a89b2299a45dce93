// SPDX-License-Identifier: PMPL-1.0-or-later
//! Preflight check that a repository publishes releases

use std::sync::OnceLock;

use harvest_adapters::HostingApi;
use regex::Regex;
use tracing::info;

use crate::error::{HarvestError, Result};

fn repository_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("valid repository pattern")
    })
}

/// Accept only `owner/repo` identifiers
pub fn validate_repository(repo: &str) -> Result<&str> {
    let repo = repo.trim();
    if repository_pattern().is_match(repo) {
        Ok(repo)
    } else {
        Err(HarvestError::InvalidRepository(repo.to_string()))
    }
}

/// Count the releases of `repo`; zero is a valid answer, the caller decides
pub async fn check_releases(api: &dyn HostingApi, repo: &str) -> Result<usize> {
    let repo = validate_repository(repo)?;
    let releases = api.list_releases(repo).await?;
    let count = releases.data.len();
    info!("{} has {} release(s)", repo, count);
    Ok(count)
}
