// SPDX-License-Identifier: PMPL-1.0-or-later
//! Common hosting traits and types
//!
//! This module defines the typed boundary between the metadata harvester and
//! a source-code hosting API. Everything the pipeline needs from the host is
//! expressed through [`HostingApi`], so tests can substitute an in-memory
//! implementation for the real GitHub adapter.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A response payload together with the `ETag` the host returned for it
#[derive(Debug, Clone, PartialEq)]
pub struct Etagged<T> {
    pub data: T,
    pub etag: Option<String>,
}

impl<T> Etagged<T> {
    pub fn new(data: T, etag: Option<String>) -> Self {
        Self { data, etag }
    }
}

/// Repository facts as returned by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub id: u64,
    /// Canonical, case-correct `owner/repo`
    pub full_name: String,
    pub archived: bool,
    pub default_branch: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub open_issues_count: u64,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub forks_count: u64,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// One published release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub tag_name: String,
    pub prerelease: bool,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A downloadable asset attached to a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub size: Option<u64>,
    pub download_count: Option<u64>,
    /// `sha256:<hex>` when the host computed it
    pub digest: Option<String>,
    pub browser_download_url: Option<String>,
    pub url: Option<String>,
    /// Asset payload exactly as received
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl ReleaseAsset {
    /// Build an asset from its raw JSON payload, keeping the payload around.
    ///
    /// Returns `None` when the payload has no `name`.
    pub fn from_payload(raw: serde_json::Value) -> Option<Self> {
        let name = raw.get("name")?.as_str()?.to_string();
        let text = |key: &str| {
            raw.get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let number = |key: &str| raw.get(key).and_then(|v| v.as_u64());

        Some(Self {
            size: number("size"),
            download_count: number("download_count"),
            digest: text("digest"),
            browser_download_url: text("browser_download_url"),
            url: text("url"),
            name,
            raw,
        })
    }
}

/// Kind of a directory listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One entry of a repository directory listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Unified interface to a source-code hosting API
///
/// Every method may fail with [`AdapterError::NotFound`],
/// [`AdapterError::RateLimited`] or a transport-class error.
///
/// [`AdapterError::NotFound`]: crate::AdapterError::NotFound
/// [`AdapterError::RateLimited`]: crate::AdapterError::RateLimited
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Base URL of the API
    fn base_url(&self) -> &str;

    /// Fetch repository facts for `owner/repo`
    async fn get_repository(&self, full_name: &str) -> Result<Etagged<RepositorySnapshot>>;

    /// List every release of a repository, in host order
    async fn list_releases(&self, full_name: &str) -> Result<Etagged<Vec<ReleaseRecord>>>;

    /// List a directory at `git_ref`; an empty `path` lists the repository root
    async fn list_directory(
        &self,
        full_name: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<DirEntry>>;

    /// Fetch a file at `git_ref`, returning its base64-encoded content
    async fn get_file_content(&self, full_name: &str, path: &str, git_ref: &str)
        -> Result<String>;

    /// HTTP session to reuse for auxiliary downloads, if the client has one
    fn http_session(&self) -> Option<reqwest::Client> {
        None
    }
}
