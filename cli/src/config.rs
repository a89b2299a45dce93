// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration handling for the harvest CLI.
//!
//! Supports loading configuration from:
//! - Project-local file (`harvest.toml` in the working directory)
//! - Command-line arguments (`--config`, TOML or JSON)
//! - Environment variables (`GITHUB_TOKEN`, `HARVEST_*`)
//!
//! Later sources win. Every setting has a default, so running without any
//! configuration file is valid.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use harvest_metadata::batch::default_compare_ignore;
use harvest_metadata::pipeline::{PipelineOptions, PLUGINS_ROOT, RELEASES_LIMIT};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Project-local configuration file name
pub const LOCAL_CONFIG: &str = "harvest.toml";

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hosting API settings
    pub github: GitHubConfig,

    /// Input and output locations
    pub paths: PathsConfig,

    /// Record generation settings
    pub metadata: MetadataConfig,
}

/// GitHub API configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Personal access token; anonymous access when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// API base URL (GitHub Enterprise, mirrors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// User-Agent header override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl GitHubConfig {
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Path configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// JSON array of `owner/repo` plugin repositories
    pub plugin_list: PathBuf,

    /// Directory receiving data.json, repositories.json, summary.json and diff/
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            plugin_list: PathBuf::from("plugins.json"),
            output_dir: PathBuf::from("output/plugin"),
        }
    }
}

/// Metadata generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Newest releases kept per plugin
    pub releases_limit: usize,

    /// Manifest keys left out of records
    pub manifest_exclude_keys: Vec<String>,

    /// Record keys left out of diff/after.json
    pub compare_ignore: Vec<String>,

    /// Repository folder holding the plugin domain folder
    pub plugins_root: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            releases_limit: RELEASES_LIMIT,
            manifest_exclude_keys: vec![],
            compare_ignore: default_compare_ignore(),
            plugins_root: PLUGINS_ROOT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the working directory and environment
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            config = config.merge_file(&local_config)?;
            debug!("Merged config from: {}", local_config.display());
        }

        config.apply_env_vars()
    }

    /// Load configuration from a specific file, then the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        Config::from_file(path)?.apply_env_vars()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&content).with_context(|| "Failed to parse TOML config"),
            "json" => {
                serde_json::from_str(&content).with_context(|| "Failed to parse JSON config")
            }
            _ => {
                // Try TOML first, then JSON
                if let Ok(config) = toml::from_str(&content) {
                    return Ok(config);
                }
                serde_json::from_str(&content).with_context(|| "Failed to parse config file")
            }
        }
    }

    /// Merge configuration from a file
    pub fn merge_file(self, path: &Path) -> Result<Self> {
        let other = Config::from_file(path)?;
        Ok(self.merge(other))
    }

    /// Merge two configurations (other takes precedence where it differs from the default)
    pub fn merge(mut self, other: Config) -> Self {
        // GitHub settings
        if other.github.token.is_some() {
            self.github.token = other.github.token;
        }
        if other.github.api_url.is_some() {
            self.github.api_url = other.github.api_url;
        }
        if other.github.user_agent.is_some() {
            self.github.user_agent = other.github.user_agent;
        }

        // Paths
        let default_paths = PathsConfig::default();
        if other.paths.plugin_list != default_paths.plugin_list {
            self.paths.plugin_list = other.paths.plugin_list;
        }
        if other.paths.output_dir != default_paths.output_dir {
            self.paths.output_dir = other.paths.output_dir;
        }

        // Metadata settings
        let default_metadata = MetadataConfig::default();
        if other.metadata.releases_limit != default_metadata.releases_limit {
            self.metadata.releases_limit = other.metadata.releases_limit;
        }
        if !other.metadata.manifest_exclude_keys.is_empty() {
            self.metadata.manifest_exclude_keys = other.metadata.manifest_exclude_keys;
        }
        if other.metadata.compare_ignore != default_metadata.compare_ignore {
            self.metadata.compare_ignore = other.metadata.compare_ignore;
        }
        if other.metadata.plugins_root != default_metadata.plugins_root {
            self.metadata.plugins_root = other.metadata.plugins_root;
        }

        self
    }

    /// Apply environment variables
    pub fn apply_env_vars(mut self) -> Result<Self> {
        // GITHUB_TOKEN
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.trim().is_empty() {
                self.github.token = Some(token);
            }
        }

        // HARVEST_API_URL
        if let Ok(url) = std::env::var("HARVEST_API_URL") {
            self.github.api_url = Some(url);
        }

        // HARVEST_PLUGIN_LIST
        if let Ok(path) = std::env::var("HARVEST_PLUGIN_LIST") {
            self.paths.plugin_list = PathBuf::from(path);
        }

        // HARVEST_OUTPUT_DIR
        if let Ok(dir) = std::env::var("HARVEST_OUTPUT_DIR") {
            self.paths.output_dir = PathBuf::from(dir);
        }

        Ok(self)
    }

    /// Pipeline settings derived from the `[metadata]` section
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            plugins_root: self.metadata.plugins_root.clone(),
            releases_limit: self.metadata.releases_limit,
            manifest_exclude_keys: self.metadata.manifest_exclude_keys.clone(),
        }
    }

    /// Copy safe to print: the token is masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.github.has_token() {
            config.github.token = Some("***".to_string());
        }
        config
    }
}
