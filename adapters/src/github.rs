// SPDX-License-Identifier: PMPL-1.0-or-later
//! GitHub hosting adapter
//!
//! Implementation of the HostingApi trait for the GitHub REST v3 API.
//! Supports both GitHub.com and GitHub Enterprise via configurable base URL.
//! Authentication is optional: without a token requests run against the
//! anonymous rate limit.

use crate::error::{AdapterError, Result};
use crate::hosting::{DirEntry, Etagged, HostingApi, ReleaseAsset, ReleaseRecord, RepositorySnapshot};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, ETAG, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Default public API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const DEFAULT_USER_AGENT: &str = concat!("plugin-harvest/", env!("CARGO_PKG_VERSION"));
const RELEASES_PER_PAGE: u32 = 100;
const MAX_PAGES: u32 = 100;

/// GitHub adapter configuration
#[derive(Debug, Clone)]
pub struct GitHubAdapter {
    client: reqwest::Client,
    base_url: String,
    authenticated: bool,
}

impl GitHubAdapter {
    /// Create new GitHub adapter against api.github.com
    pub fn new(token: Option<&str>) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_API_URL)
    }

    /// Create with custom base URL (for GitHub Enterprise or test servers)
    pub fn with_base_url(token: Option<&str>, base_url: &str) -> Result<Self> {
        Self::builder(token, base_url, DEFAULT_USER_AGENT)
    }

    /// Create with a custom base URL and user agent
    pub fn builder(token: Option<&str>, base_url: &str, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|_| AdapterError::ConfigError("Invalid user agent".into()))?,
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let token = token.map(str::trim).filter(|t| !t.is_empty());
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| AdapterError::ConfigError("Invalid token".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            authenticated: token.is_some(),
        })
    }

    /// Whether requests carry a bearer token
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Issue a GET and map the status line onto the error taxonomy
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;
        check_status(response, url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Etagged<T>> {
        let response = self.get(url, query).await?;
        let etag = etag_of(&response);
        let body = response.bytes().await?;
        let data = serde_json::from_slice(&body)?;
        Ok(Etagged::new(data, etag))
    }

    /// Helper to make GET requests with pagination support.
    ///
    /// The returned ETag is the one of the first page.
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        url: &str,
        per_page: u32,
    ) -> Result<Etagged<Vec<T>>> {
        let mut all_results = Vec::new();
        let mut etag = None;
        let mut page = 1;

        loop {
            let query = [
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ];
            let response: Etagged<Vec<T>> = self.get_json(url, &query).await?;
            if page == 1 {
                etag = response.etag;
            }

            let count = response.data.len();
            all_results.extend(response.data);
            if count < per_page as usize {
                break;
            }

            page += 1;
            if page > MAX_PAGES {
                break;
            }
        }

        Ok(Etagged::new(all_results, etag))
    }

    fn contents_url(&self, full_name: &str, path: &str) -> String {
        let path = path.trim_matches('/');
        if path.is_empty() {
            format!("{}/repos/{}/contents", self.base_url, full_name)
        } else {
            format!("{}/repos/{}/contents/{}", self.base_url, full_name, path)
        }
    }
}

#[async_trait]
impl HostingApi for GitHubAdapter {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_repository(&self, full_name: &str) -> Result<Etagged<RepositorySnapshot>> {
        let url = format!("{}/repos/{}", self.base_url, full_name);
        let response: Etagged<GitHubRepo> = self.get_json(&url, &[]).await?;
        let r = response.data;

        Ok(Etagged::new(
            RepositorySnapshot {
                id: r.id,
                full_name: r.full_name,
                archived: r.archived,
                default_branch: r.default_branch,
                updated_at: r.updated_at,
                open_issues_count: r.open_issues_count,
                stargazers_count: r.stargazers_count,
                watchers_count: r.watchers_count,
                forks_count: r.forks_count,
                topics: r.topics,
            },
            response.etag,
        ))
    }

    async fn list_releases(&self, full_name: &str) -> Result<Etagged<Vec<ReleaseRecord>>> {
        let url = format!("{}/repos/{}/releases", self.base_url, full_name);
        let response: Etagged<Vec<GitHubRelease>> =
            self.get_paginated(&url, RELEASES_PER_PAGE).await?;

        let releases = response
            .data
            .into_iter()
            .map(|r| ReleaseRecord {
                tag_name: r.tag_name,
                prerelease: r.prerelease,
                created_at: r.created_at,
                published_at: r.published_at,
                assets: r
                    .assets
                    .into_iter()
                    .filter_map(ReleaseAsset::from_payload)
                    .collect(),
            })
            .collect();

        Ok(Etagged::new(releases, response.etag))
    }

    async fn list_directory(
        &self,
        full_name: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<DirEntry>> {
        let url = self.contents_url(full_name, path);
        let response: Etagged<serde_json::Value> =
            self.get_json(&url, &[("ref", git_ref.to_string())]).await?;

        match response.data {
            serde_json::Value::Array(_) => Ok(serde_json::from_value(response.data)?),
            _ => Err(AdapterError::ApiError(format!(
                "'{}' is not a directory in {}@{}",
                path, full_name, git_ref
            ))),
        }
    }

    async fn get_file_content(
        &self,
        full_name: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<String> {
        let url = self.contents_url(full_name, path);
        let response: Etagged<serde_json::Value> =
            self.get_json(&url, &[("ref", git_ref.to_string())]).await?;

        if response.data.is_array() {
            return Err(AdapterError::ApiError(format!(
                "'{}' is a directory in {}@{}",
                path, full_name, git_ref
            )));
        }

        let file: GitHubContent = serde_json::from_value(response.data)?;
        match (file.encoding.as_deref(), file.content) {
            (Some("base64") | None, Some(content)) => Ok(content),
            (Some(other), Some(_)) => Err(AdapterError::ApiError(format!(
                "Unsupported content encoding '{}' for {}",
                other, path
            ))),
            (_, None) => Err(AdapterError::ApiError(format!(
                "No content returned for {}",
                path
            ))),
        }
    }

    fn http_session(&self) -> Option<reqwest::Client> {
        Some(self.client.clone())
    }
}

/// Map HTTP status codes onto the adapter error taxonomy
fn check_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let headers = response.headers();
    let remaining = header_u64(headers, "x-ratelimit-remaining");
    let reset = header_u64(headers, "x-ratelimit-reset").unwrap_or(0);

    match status {
        StatusCode::NOT_FOUND => Err(AdapterError::NotFound(url.to_string())),
        StatusCode::TOO_MANY_REQUESTS => Err(AdapterError::RateLimited(reset)),
        StatusCode::FORBIDDEN if remaining == Some(0) => Err(AdapterError::RateLimited(reset)),
        _ => Err(AdapterError::ApiError(format!("HTTP {} for {}", status, url))),
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn etag_of(response: &Response) -> Option<String> {
    response
        .headers()
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ============== GitHub API Response Types ==============

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    id: u64,
    full_name: String,
    #[serde(default)]
    archived: bool,
    default_branch: String,
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    open_issues_count: u64,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    watchers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    #[serde(default)]
    prerelease: bool,
    created_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    assets: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GitHubContent {
    content: Option<String>,
    encoding: Option<String>,
}
