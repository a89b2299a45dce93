// SPDX-License-Identifier: PMPL-1.0-or-later
//! Per-plugin validation pipeline
//!
//! Drives one repository through a fixed sequence of stages:
//!
//! ```text
//! FetchRepoInfo → CheckArchived → FetchReleases → LocatePluginDomain →
//! FetchManifest → ValidateDomain → ValidateVersion → BuildRecord
//! ```
//!
//! Any stage may stop the run. Failures never propagate out of [`run`]: they
//! are logged into the plugin's buffer and reported as
//! [`PipelineOutcome::Failed`]. No stage retries.
//!
//! [`run`]: PluginValidationPipeline::run

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use harvest_adapters::{HostingApi, ReleaseRecord, RepositorySnapshot};
use serde_json::{json, Value};

use crate::assets::resolve_release_assets;
use crate::error::PipelineError;
use crate::log_buffer::{LogSink, PluginLogBuffer};
use crate::manifest::ManifestDocument;
use crate::record::{PluginMetadataRecord, ReleaseEntry};
use crate::validators::{validate_manifest_domain, validate_manifest_version};

pub const PLUGINS_ROOT: &str = "custom_plugins";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const RELEASES_LIMIT: usize = 5;

/// Knobs shared by every pipeline of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Folder holding the single plugin domain folder
    pub plugins_root: String,
    /// Newest releases kept in the record
    pub releases_limit: usize,
    /// Manifest keys left out of the record
    pub manifest_exclude_keys: Vec<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            plugins_root: PLUGINS_ROOT.to_string(),
            releases_limit: RELEASES_LIMIT,
            manifest_exclude_keys: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    FetchRepoInfo,
    CheckArchived,
    FetchReleases,
    LocatePluginDomain,
    FetchManifest,
    ValidateDomain,
    ValidateVersion,
    BuildRecord,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::FetchRepoInfo => "fetch repository info",
            PipelineStage::CheckArchived => "check archived",
            PipelineStage::FetchReleases => "fetch releases",
            PipelineStage::LocatePluginDomain => "locate plugin domain",
            PipelineStage::FetchManifest => "fetch manifest",
            PipelineStage::ValidateDomain => "validate domain",
            PipelineStage::ValidateVersion => "validate version",
            PipelineStage::BuildRecord => "build record",
        };
        write!(f, "{}", name)
    }
}

/// How a pipeline run ended
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Plugin validated; keyed by the repository's numeric id
    Valid {
        id: u64,
        record: Box<PluginMetadataRecord>,
    },
    /// Repository is archived; nothing past the archive check ran
    Archived { repository: String },
    Failed {
        stage: PipelineStage,
        error: PipelineError,
    },
}

impl PipelineOutcome {
    /// Output map entry: `{id: record}` or `{repo: {"archived": true}}`
    pub fn entry(&self) -> Result<Option<(String, Value)>, serde_json::Error> {
        Ok(match self {
            PipelineOutcome::Valid { id, record } => {
                Some((id.to_string(), serde_json::to_value(record)?))
            }
            PipelineOutcome::Archived { repository } => {
                Some((repository.clone(), json!({ "archived": true })))
            }
            PipelineOutcome::Failed { .. } => None,
        })
    }
}

/// Result of one pipeline run, with its log still buffered
#[derive(Debug)]
pub struct PipelineReport {
    /// Identifier as configured in the plugin list
    pub requested: String,
    /// Canonical name reported by the host, once known
    pub canonical: Option<String>,
    pub outcome: PipelineOutcome,
    pub log: PluginLogBuffer,
}

impl PipelineReport {
    /// Canonical name differs from the configured one, ignoring case
    pub fn is_renamed(&self) -> bool {
        self.canonical
            .as_deref()
            .is_some_and(|c| !c.eq_ignore_ascii_case(&self.requested))
    }
}

/// State accumulated while the stages run
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    /// Name used for API calls; the canonical name once resolved
    pub repo: String,
    pub canonical: Option<String>,
    pub etag_repository: Option<String>,
    /// Newest first
    pub releases: Vec<ReleaseRecord>,
    pub etag_release: Option<String>,
}

impl PipelineContext {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            ..Default::default()
        }
    }

    pub fn latest_stable(&self) -> Option<&str> {
        self.releases
            .iter()
            .find(|r| !r.prerelease)
            .map(|r| r.tag_name.as_str())
    }

    pub fn latest_prerelease(&self) -> Option<&str> {
        self.releases
            .iter()
            .find(|r| r.prerelease)
            .map(|r| r.tag_name.as_str())
    }

    /// Newest release tag, or the default branch when there are no releases
    pub fn used_ref<'a>(&'a self, repository: &'a RepositorySnapshot) -> &'a str {
        self.releases
            .first()
            .map(|r| r.tag_name.as_str())
            .unwrap_or(&repository.default_branch)
    }
}

struct StageFailure {
    stage: PipelineStage,
    error: PipelineError,
}

trait AtStage<T> {
    fn at(self, stage: PipelineStage) -> Result<T, StageFailure>;
}

impl<T> AtStage<T> for Result<T, PipelineError> {
    fn at(self, stage: PipelineStage) -> Result<T, StageFailure> {
        self.map_err(|error| StageFailure { stage, error })
    }
}

/// Validates one plugin repository and builds its metadata record
pub struct PluginValidationPipeline {
    api: Arc<dyn HostingApi>,
    options: Arc<PipelineOptions>,
    requested: String,
    ctx: PipelineContext,
    log: PluginLogBuffer,
}

impl PluginValidationPipeline {
    pub fn new(
        api: Arc<dyn HostingApi>,
        options: Arc<PipelineOptions>,
        repo: impl Into<String>,
    ) -> Self {
        let repo = repo.into();
        Self {
            api,
            options,
            log: PluginLogBuffer::new(repo.clone()),
            ctx: PipelineContext::new(repo.clone()),
            requested: repo,
        }
    }

    /// Run every stage; never fails
    pub async fn run(mut self) -> PipelineReport {
        let outcome = match self.drive().await {
            Ok(outcome) => outcome,
            Err(StageFailure { stage, error }) => {
                // validators already logged their own mismatch
                if !error.is_validation_mismatch() {
                    self.log.record(error.severity(), error_message(&error));
                }
                PipelineOutcome::Failed { stage, error }
            }
        };

        PipelineReport {
            requested: self.requested,
            canonical: self.ctx.canonical,
            outcome,
            log: self.log,
        }
    }

    async fn drive(&mut self) -> Result<PipelineOutcome, StageFailure> {
        let repository = self.fetch_repo_info().await.at(PipelineStage::FetchRepoInfo)?;

        if repository.archived {
            self.log.error("Repository is archived".into());
            return Ok(PipelineOutcome::Archived {
                repository: self.ctx.repo.clone(),
            });
        }

        self.fetch_releases().await.at(PipelineStage::FetchReleases)?;
        let used_ref = self.ctx.used_ref(&repository).to_string();

        let domain = self
            .locate_plugin_domain(&used_ref)
            .await
            .at(PipelineStage::LocatePluginDomain)?;

        let manifest = self
            .fetch_manifest(&domain, &used_ref)
            .await
            .at(PipelineStage::FetchManifest)?;

        if !validate_manifest_domain(&domain, &manifest, &mut self.log) {
            return Err(PipelineError::DomainMismatch {
                folder: domain,
                manifest: manifest.domain.clone(),
            })
            .at(PipelineStage::ValidateDomain);
        }
        self.log.info(format!(
            "Domain validated: '{}' matches manifest domain",
            domain
        ));

        if !validate_manifest_version(&manifest, &used_ref, &mut self.log) {
            return Err(PipelineError::VersionMismatch {
                manifest: manifest.version.clone(),
                release: used_ref,
            })
            .at(PipelineStage::ValidateVersion);
        }
        self.log
            .info(format!("Manifest version matches '{}'", used_ref));

        let record = self.build_record(&repository, &manifest, used_ref).await;
        self.log.info("Metadata successfully generated".into());

        Ok(PipelineOutcome::Valid {
            id: repository.id,
            record: Box::new(record),
        })
    }

    async fn fetch_repo_info(&mut self) -> Result<RepositorySnapshot, PipelineError> {
        self.log.info("Fetching repository metadata".into());
        let response = self
            .api
            .get_repository(&self.ctx.repo)
            .await
            .map_err(|e| PipelineError::from_repository_lookup(e, &self.ctx.repo))?;

        let repository = response.data;
        if !repository.full_name.eq_ignore_ascii_case(&self.requested) {
            self.log.error(format!(
                "Repository has been renamed to '{}'",
                repository.full_name
            ));
        }

        self.ctx.repo = repository.full_name.clone();
        self.ctx.canonical = Some(repository.full_name.clone());
        self.ctx.etag_repository = response.etag;
        Ok(repository)
    }

    async fn fetch_releases(&mut self) -> Result<(), PipelineError> {
        self.log.info("Fetching releases".into());
        let response = self
            .api
            .list_releases(&self.ctx.repo)
            .await
            .map_err(|e| PipelineError::from_adapter(e, format!("releases of {}", self.ctx.repo)))?;

        self.ctx.etag_release = response.etag;
        let mut releases = response.data;
        if releases.is_empty() {
            return Err(PipelineError::NoReleases);
        }

        releases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.ctx.releases = releases;

        self.log.info(format!(
            "Latest stable release: {}",
            self.ctx.latest_stable().unwrap_or("<none>")
        ));
        if let Some(prerelease) = self.ctx.latest_prerelease() {
            self.log.info(format!("Latest pre-release: {}", prerelease));
        }
        Ok(())
    }

    async fn locate_plugin_domain(&mut self, used_ref: &str) -> Result<String, PipelineError> {
        self.log.info("Fetching plugin domain".into());
        let root = &self.options.plugins_root;

        let entries = self
            .api
            .list_directory(&self.ctx.repo, "", used_ref)
            .await
            .map_err(|e| {
                PipelineError::from_adapter(e, format!("root of {}@{}", self.ctx.repo, used_ref))
            })?;
        if !entries.iter().any(|e| e.is_dir() && e.name == *root) {
            return Err(PipelineError::MissingPluginsRoot(root.clone()));
        }

        let entries = self
            .api
            .list_directory(&self.ctx.repo, root, used_ref)
            .await
            .map_err(|e| PipelineError::from_adapter(e, format!("'{}' in '{}'", root, used_ref)))?;
        let mut folders: Vec<_> = entries.into_iter().filter(|e| e.is_dir()).collect();
        if folders.len() != 1 {
            return Err(PipelineError::AmbiguousDomain {
                root: root.clone(),
                found: folders.len(),
            });
        }

        let domain = folders.remove(0).name;
        self.log.info(format!("Found domain '{}'", domain));
        Ok(domain)
    }

    async fn fetch_manifest(
        &mut self,
        domain: &str,
        used_ref: &str,
    ) -> Result<ManifestDocument, PipelineError> {
        let path = format!("{}/{}/{}", self.options.plugins_root, domain, MANIFEST_FILE);
        let content = self
            .api
            .get_file_content(&self.ctx.repo, &path, used_ref)
            .await
            .map_err(|e| PipelineError::from_adapter(e, format!("'{}' in '{}'", path, used_ref)))?;

        let manifest = ManifestDocument::from_base64(&content)?;
        self.log.info(format!(
            "Successfully fetched {} from '{}'",
            MANIFEST_FILE, used_ref
        ));
        Ok(manifest)
    }

    async fn build_record(
        &mut self,
        repository: &RepositorySnapshot,
        manifest: &ManifestDocument,
        used_ref: String,
    ) -> PluginMetadataRecord {
        let api = self.api.as_ref();
        let mut releases = Vec::new();
        for release in self.ctx.releases.iter().take(self.options.releases_limit) {
            let assets = resolve_release_assets(api, release, &mut self.log).await;
            releases.push(ReleaseEntry::new(release, assets));
        }

        if let (Some(zip), Some(newest)) = (manifest.zip_filename.as_deref(), releases.first()) {
            if !newest.has_asset(zip) {
                self.log.warning(format!(
                    "Declared zip_filename '{}' not found in assets of release {}",
                    zip, newest.tag_name
                ));
            }
        }

        PluginMetadataRecord {
            manifest: manifest.to_record(&self.options.manifest_exclude_keys),
            releases,
            etag_release: self.ctx.etag_release.clone(),
            etag_repository: self.ctx.etag_repository.clone(),
            forks_count: repository.forks_count,
            last_fetched: Utc::now(),
            last_prerelease: self.ctx.latest_prerelease().map(str::to_string),
            last_updated: repository.updated_at,
            last_version: self.ctx.latest_stable().map(str::to_string),
            open_issues: repository.open_issues_count,
            repository: self.ctx.repo.clone(),
            stargazers_count: repository.stargazers_count,
            topics: repository.topics.clone(),
            used_ref,
            watchers_count: repository.watchers_count,
        }
    }
}

fn error_message(error: &PipelineError) -> String {
    match error {
        PipelineError::RepositoryNotFound(_) => "Repository not found".to_string(),
        PipelineError::RateLimited(_) => {
            "GitHub rate limit exceeded! Please try again later.".to_string()
        }
        PipelineError::NoReleases => "No releases found".to_string(),
        other => {
            let text = other.to_string();
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => text,
            }
        }
    }
}
