// SPDX-License-Identifier: PMPL-1.0-or-later
//! Plugin metadata generation
//!
//! Validates community plugin repositories and builds one metadata record per
//! valid plugin:
//!
//! - **pipeline** - per-repository validation stages
//! - **assets** - release asset digests, downloaded only when the host has none
//! - **batch** - concurrent runs over a plugin list, output files and summary
//! - **log_buffer** - per-plugin log grouping for CI output
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use harvest_adapters::GitHubAdapter;
//! use harvest_metadata::BatchRunner;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Arc::new(GitHubAdapter::new(None)?);
//!     let summary = BatchRunner::new(api)
//!         .run(Path::new("plugins.json"), Path::new("output/plugin"))
//!         .await?;
//!     println!("{} valid plugins", summary.valid_plugins);
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod batch;
pub mod error;
pub mod log_buffer;
pub mod manifest;
pub mod pipeline;
pub mod record;
pub mod release_check;
pub mod summary;
pub mod validators;

pub use assets::{resolve_asset, resolve_release_assets, AssetInfo};
pub use batch::{default_compare_ignore, load_repo_list, write_outputs, BatchOutput, BatchRunner};
pub use error::{HarvestError, PipelineError};
pub use log_buffer::{LogEntry, LogLevel, LogSink, PluginLogBuffer};
pub use manifest::ManifestDocument;
pub use pipeline::{
    PipelineContext, PipelineOptions, PipelineOutcome, PipelineReport, PipelineStage,
    PluginValidationPipeline,
};
pub use record::{PluginMetadataRecord, ReleaseEntry};
pub use release_check::{check_releases, validate_repository};
pub use summary::RunSummary;
pub use validators::{normalize_version, validate_manifest_domain, validate_manifest_version};
