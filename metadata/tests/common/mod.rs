// SPDX-License-Identifier: PMPL-1.0-or-later
//! Shared fixtures for metadata integration tests
//!
//! [`FakeHost`] is an in-memory [`HostingApi`] that records every call, so
//! tests can assert both outcomes and which stages touched the host.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use harvest_adapters::{
    AdapterError, DirEntry, EntryKind, Etagged, HostingApi, ReleaseAsset, ReleaseRecord,
    RepositorySnapshot,
};
use serde_json::{json, Value};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn setup_test_logging() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .try_init();
}

/// How a fake repository lookup fails
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    NotFound,
    RateLimited,
    Transport,
}

impl Failure {
    fn into_error(self, what: &str) -> AdapterError {
        match self {
            Failure::NotFound => AdapterError::NotFound(what.to_string()),
            Failure::RateLimited => AdapterError::RateLimited(1_700_000_000),
            Failure::Transport => AdapterError::ApiError(format!("HTTP 502 for {}", what)),
        }
    }
}

#[derive(Default)]
pub struct FakeHost {
    repositories: HashMap<String, RepositorySnapshot>,
    failures: HashMap<String, Failure>,
    releases: HashMap<String, Vec<ReleaseRecord>>,
    directories: HashMap<String, Vec<DirEntry>>,
    files: HashMap<String, String>,
    session: Option<reqwest::Client>,
    calls: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `requested` (any case) with `snapshot`
    pub fn with_repository(mut self, requested: &str, snapshot: RepositorySnapshot) -> Self {
        self.repositories.insert(requested.to_lowercase(), snapshot);
        self
    }

    pub fn with_failure(mut self, requested: &str, failure: Failure) -> Self {
        self.failures.insert(requested.to_lowercase(), failure);
        self
    }

    pub fn with_releases(mut self, repo: &str, releases: Vec<ReleaseRecord>) -> Self {
        self.releases.insert(repo.to_string(), releases);
        self
    }

    pub fn with_directory(mut self, repo: &str, path: &str, entries: Vec<DirEntry>) -> Self {
        self.directories.insert(key(repo, path), entries);
        self
    }

    pub fn with_file(mut self, repo: &str, path: &str, content: String) -> Self {
        self.files.insert(key(repo, path), content);
        self
    }

    pub fn with_session(mut self, session: reqwest::Client) -> Self {
        self.session = Some(session);
        self
    }

    /// Register a complete, valid plugin layout for `repo`
    pub fn with_plugin(
        self,
        repo: &str,
        id: u64,
        domain: &str,
        manifest: Value,
        releases: Vec<ReleaseRecord>,
    ) -> Self {
        self.with_repository(repo, snapshot(repo, id, false))
            .with_releases(repo, releases)
            .with_directory(
                repo,
                "",
                vec![dir("custom_plugins"), file("README.md"), dir(".github")],
            )
            .with_directory(
                repo,
                "custom_plugins",
                vec![dir(domain), file("custom_plugins/.gitkeep")],
            )
            .with_file(
                repo,
                &format!("custom_plugins/{}/manifest.json", domain),
                encode_manifest(&manifest),
            )
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl HostingApi for FakeHost {
    fn base_url(&self) -> &str {
        "memory://fake"
    }

    async fn get_repository(
        &self,
        full_name: &str,
    ) -> harvest_adapters::error::Result<Etagged<RepositorySnapshot>> {
        self.record(format!("get_repository {}", full_name));
        let lookup = full_name.to_lowercase();
        if let Some(failure) = self.failures.get(&lookup) {
            return Err(failure.into_error(full_name));
        }
        match self.repositories.get(&lookup) {
            Some(repo) => Ok(Etagged::new(repo.clone(), Some(format!("W/\"repo-{}\"", repo.id)))),
            None => Err(AdapterError::NotFound(full_name.to_string())),
        }
    }

    async fn list_releases(
        &self,
        full_name: &str,
    ) -> harvest_adapters::error::Result<Etagged<Vec<ReleaseRecord>>> {
        self.record(format!("list_releases {}", full_name));
        match self.releases.get(full_name) {
            Some(releases) => Ok(Etagged::new(releases.clone(), Some("W/\"releases\"".into()))),
            None => Err(AdapterError::NotFound(full_name.to_string())),
        }
    }

    async fn list_directory(
        &self,
        full_name: &str,
        path: &str,
        git_ref: &str,
    ) -> harvest_adapters::error::Result<Vec<DirEntry>> {
        self.record(format!("list_directory {}:{}@{}", full_name, path, git_ref));
        self.directories
            .get(&key(full_name, path))
            .cloned()
            .ok_or_else(|| AdapterError::NotFound(key(full_name, path)))
    }

    async fn get_file_content(
        &self,
        full_name: &str,
        path: &str,
        git_ref: &str,
    ) -> harvest_adapters::error::Result<String> {
        self.record(format!("get_file_content {}:{}@{}", full_name, path, git_ref));
        self.files
            .get(&key(full_name, path))
            .cloned()
            .ok_or_else(|| AdapterError::NotFound(key(full_name, path)))
    }

    fn http_session(&self) -> Option<reqwest::Client> {
        self.session.clone()
    }
}

fn key(repo: &str, path: &str) -> String {
    format!("{}:{}", repo, path)
}

pub fn snapshot(full_name: &str, id: u64, archived: bool) -> RepositorySnapshot {
    RepositorySnapshot {
        id,
        full_name: full_name.to_string(),
        archived,
        default_branch: "main".into(),
        updated_at: Some(timestamp("2025-02-01T08:00:00Z")),
        open_issues_count: 2,
        stargazers_count: 17,
        watchers_count: 17,
        forks_count: 4,
        topics: vec!["rotorhazard".into(), "plugin".into()],
    }
}

pub fn timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
}

pub fn release(tag: &str, prerelease: bool, created_at: &str, assets: Vec<Value>) -> ReleaseRecord {
    ReleaseRecord {
        tag_name: tag.to_string(),
        prerelease,
        created_at: timestamp(created_at),
        published_at: Some(timestamp(created_at)),
        assets: assets
            .into_iter()
            .filter_map(ReleaseAsset::from_payload)
            .collect(),
    }
}

/// Asset payload with a host-computed digest
pub fn digested_asset(name: &str, hex: &str) -> Value {
    json!({
        "name": name,
        "size": 1024,
        "download_count": 5,
        "digest": format!("sha256:{}", hex),
        "browser_download_url": format!("http://127.0.0.1:1/{}", name)
    })
}

pub fn dir(name: &str) -> DirEntry {
    DirEntry {
        name: name.rsplit('/').next().unwrap_or(name).to_string(),
        path: name.to_string(),
        kind: EntryKind::Dir,
    }
}

pub fn file(name: &str) -> DirEntry {
    DirEntry {
        name: name.rsplit('/').next().unwrap_or(name).to_string(),
        path: name.to_string(),
        kind: EntryKind::File,
    }
}

/// Base64 as the contents API returns it, wrapped at 60 columns
pub fn encode_manifest(manifest: &Value) -> String {
    let encoded = STANDARD.encode(serde_json::to_vec(manifest).unwrap());
    encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| format!("{}\n", std::str::from_utf8(chunk).unwrap()))
        .collect()
}

pub fn manifest(domain: &str, version: &str) -> Value {
    json!({
        "domain": domain,
        "name": "Example Plugin",
        "description": "Does example things",
        "version": version,
        "category": ["Utilities"],
        "documentation_uri": "https://example.com/docs",
        "zip_filename": format!("{}.zip", domain)
    })
}
