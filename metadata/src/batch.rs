// SPDX-License-Identifier: PMPL-1.0-or-later
//! Batch metadata generation
//!
//! Runs one [`PluginValidationPipeline`] per configured repository, all
//! concurrently over a shared hosting client, then writes the output files:
//!
//! | File | Content |
//! |------|---------|
//! | `data.json` | records keyed by repository id |
//! | `diff/after.json` | same records without volatile keys |
//! | `repositories.json` | canonical names of valid plugins, input order |
//! | `summary.json` | [`RunSummary`] |

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use harvest_adapters::HostingApi;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::error::{HarvestError, Result};
use crate::log_buffer::LogSink;
use crate::pipeline::{PipelineOptions, PipelineOutcome, PipelineReport, PluginValidationPipeline};
use crate::record::strip_keys;
use crate::summary::RunSummary;

pub const DATA_FILE: &str = "data.json";
pub const DIFF_FILE: &str = "diff/after.json";
pub const REPOSITORIES_FILE: &str = "repositories.json";
pub const SUMMARY_FILE: &str = "summary.json";

/// Keys left out of `diff/after.json` unless configured otherwise
pub fn default_compare_ignore() -> Vec<String> {
    ["last_fetched", "etag_release", "etag_repository"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Everything one batch produced, before it is written out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutput {
    /// Valid records keyed by repository id, in input order
    pub data: Map<String, Value>,
    pub repositories: Vec<String>,
    pub summary: RunSummary,
}

/// Generates metadata for a list of plugin repositories
pub struct BatchRunner {
    api: Arc<dyn HostingApi>,
    options: Arc<PipelineOptions>,
    compare_ignore: Vec<String>,
}

impl BatchRunner {
    pub fn new(api: Arc<dyn HostingApi>) -> Self {
        Self {
            api,
            options: Arc::new(PipelineOptions::default()),
            compare_ignore: default_compare_ignore(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = Arc::new(options);
        self
    }

    pub fn with_compare_ignore(mut self, keys: Vec<String>) -> Self {
        self.compare_ignore = keys;
        self
    }

    /// Read the plugin list, process every repository and write the outputs
    pub async fn run(&self, repo_list: &Path, output_dir: &Path) -> Result<RunSummary> {
        let repos = load_repo_list(repo_list)?;
        info!("Processing {} plugin repositories", repos.len());

        let output = self.process(repos).await;
        write_outputs(output_dir, &output, &self.compare_ignore)?;
        Ok(output.summary)
    }

    /// Process repositories concurrently; results keep the input order
    pub async fn process(&self, repos: Vec<String>) -> BatchOutput {
        let start_time = Instant::now();
        let mut summary = RunSummary::new(repos.len());

        let mut handles = Vec::with_capacity(repos.len());
        for repo in repos {
            let pipeline =
                PluginValidationPipeline::new(self.api.clone(), self.options.clone(), repo.clone());
            handles.push((repo, tokio::spawn(pipeline.run())));
        }

        let mut data = Map::new();
        let mut repositories = Vec::new();
        for (repo, handle) in handles {
            let mut report: PipelineReport = match handle.await {
                Ok(report) => report,
                Err(e) => {
                    error!("::error::<{}> Pipeline task failed: {}", repo, e);
                    summary.record_lost();
                    continue;
                }
            };

            report.log.flush();

            if let PipelineOutcome::Valid { record, .. } = &report.outcome {
                match report.outcome.entry() {
                    Ok(Some((id, value))) => {
                        data.insert(id, value);
                        repositories.push(record.repository.clone());
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!("::error::<{}> Failed to serialize metadata record: {}", repo, e);
                        summary.record_lost();
                        continue;
                    }
                }
            }
            summary.record(&report);
        }

        BatchOutput {
            data,
            repositories,
            summary: summary.finish(start_time.elapsed()),
        }
    }
}

/// Load the JSON array of `owner/repo` identifiers.
///
/// A missing file is an empty list; unreadable or invalid content is an error.
pub fn load_repo_list(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        warn!("::warning::Plugin list file not found. Using an empty list.");
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|source| HarvestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| HarvestError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the four output files under `output_dir`, creating directories
pub fn write_outputs(output_dir: &Path, output: &BatchOutput, compare_ignore: &[String]) -> Result<()> {
    write_json(
        &output_dir.join(DIFF_FILE),
        &strip_keys(&output.data, compare_ignore),
    )?;
    write_json(&output_dir.join(DATA_FILE), &output.data)?;
    write_json(&output_dir.join(REPOSITORIES_FILE), &output.repositories)?;
    write_json(&output_dir.join(SUMMARY_FILE), &output.summary)?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| write_error(parent, source))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| write_error(path, source))
}

fn write_error(path: &Path, source: std::io::Error) -> HarvestError {
    HarvestError::Write {
        path: PathBuf::from(path),
        source,
    }
}
