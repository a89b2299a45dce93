// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for the metadata pipeline and batch runner

use std::path::PathBuf;

use harvest_adapters::{AdapterError, ErrorKind};
use thiserror::Error;

use crate::log_buffer::LogLevel;

/// Why a single plugin's pipeline stopped.
///
/// Never escapes the pipeline: every variant is logged into the plugin's
/// buffer and turned into "no record for this plugin".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("repository {0} not found")]
    RepositoryNotFound(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("hosting API rate limit exceeded, quota resets at epoch {0}")]
    RateLimited(u64),

    #[error("hosting API error: {0}")]
    Transport(String),

    #[error("no releases found")]
    NoReleases,

    #[error("missing `{0}/` folder")]
    MissingPluginsRoot(String),

    #[error("expected one domain folder in `{root}/`, found: {found}")]
    AmbiguousDomain { root: String, found: usize },

    #[error("malformed manifest: {0}")]
    MalformedManifest(String),

    #[error("domain mismatch: folder '{folder}' vs manifest '{}'", .manifest.as_deref().unwrap_or("<none>"))]
    DomainMismatch {
        folder: String,
        manifest: Option<String>,
    },

    #[error("manifest version mismatch: '{}' (manifest) vs '{release}' (release)", .manifest.as_deref().unwrap_or("<none>"))]
    VersionMismatch {
        manifest: Option<String>,
        release: String,
    },
}

impl PipelineError {
    /// Convert an adapter error, naming what was being fetched
    pub fn from_adapter(err: AdapterError, what: impl Into<String>) -> Self {
        match err.kind() {
            ErrorKind::NotFound => PipelineError::NotFound(what.into()),
            ErrorKind::RateLimited => match err {
                AdapterError::RateLimited(reset) => PipelineError::RateLimited(reset),
                _ => PipelineError::RateLimited(0),
            },
            ErrorKind::Transport => PipelineError::Transport(format!("{}: {}", what.into(), err)),
        }
    }

    /// Convert a failed repository lookup
    pub fn from_repository_lookup(err: AdapterError, repo: &str) -> Self {
        match err.kind() {
            ErrorKind::NotFound => PipelineError::RepositoryNotFound(repo.to_string()),
            _ => Self::from_adapter(err, format!("repository {}", repo)),
        }
    }

    /// Severity the failure is reported with
    pub fn severity(&self) -> LogLevel {
        match self {
            PipelineError::RepositoryNotFound(_)
            | PipelineError::NotFound(_)
            | PipelineError::NoReleases
            | PipelineError::VersionMismatch { .. } => LogLevel::Warning,
            _ => LogLevel::Error,
        }
    }

    /// Domain or version disagreement between manifest and repository
    pub fn is_validation_mismatch(&self) -> bool {
        matches!(
            self,
            PipelineError::DomainMismatch { .. } | PipelineError::VersionMismatch { .. }
        )
    }
}

/// Batch-level failures; these abort the whole run
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid repository format `{0}`, expected 'owner/repo'")]
    InvalidRepository(String),

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
