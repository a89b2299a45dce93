// SPDX-License-Identifier: PMPL-1.0-or-later
//! Hosting adapters for plugin-harvest
//!
//! Provides the typed boundary to the source-code host the harvester reads
//! plugin repositories from:
//!
//! - **HostingApi** - the trait every pipeline step talks to
//! - **GitHub** - GitHub.com and GitHub Enterprise via the REST v3 API
//!
//! # Example
//!
//! ```rust,no_run
//! use harvest_adapters::{GitHubAdapter, HostingApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = GitHubAdapter::new(std::env::var("GITHUB_TOKEN").ok().as_deref())?;
//!
//!     let repo = adapter.get_repository("owner/repo").await?;
//!     println!("{} (etag {:?})", repo.data.full_name, repo.etag);
//!
//!     let releases = adapter.list_releases("owner/repo").await?;
//!     println!("{} releases", releases.data.len());
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod github;
pub mod hosting;

// Re-export core types for convenience
pub use error::{AdapterError, ErrorKind};
pub use github::GitHubAdapter;
pub use hosting::{
    DirEntry, EntryKind, Etagged, HostingApi, ReleaseAsset, ReleaseRecord, RepositorySnapshot,
};

/// Create a GitHub adapter, optionally against a custom API URL
///
/// # Arguments
/// * `token` - Optional authentication token; `None` uses anonymous access
/// * `base_url` - Optional custom base URL (GitHub Enterprise, test servers)
pub fn create_adapter(
    token: Option<&str>,
    base_url: Option<&str>,
) -> Result<GitHubAdapter, AdapterError> {
    match base_url {
        Some(url) => GitHubAdapter::with_base_url(token, url),
        None => GitHubAdapter::new(token),
    }
}
