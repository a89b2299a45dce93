// SPDX-License-Identifier: PMPL-1.0-or-later
//! Output records
//!
//! Field declaration order is the emitted key order: `manifest`, `releases`,
//! then the remaining keys alphabetically. Keep it that way when adding fields.

use chrono::{DateTime, Utc};
use harvest_adapters::ReleaseRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::assets::AssetInfo;

/// Metadata for one validated plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginMetadataRecord {
    pub manifest: Map<String, Value>,
    pub releases: Vec<ReleaseEntry>,
    pub etag_release: Option<String>,
    pub etag_repository: Option<String>,
    pub forks_count: u64,
    pub last_fetched: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_prerelease: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_version: Option<String>,
    pub open_issues: u64,
    pub repository: String,
    pub stargazers_count: u64,
    pub topics: Vec<String>,
    pub used_ref: String,
    pub watchers_count: u64,
}

/// One release as stored in the record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseEntry {
    pub tag_name: String,
    pub prerelease: bool,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub assets: Vec<AssetInfo>,
}

impl ReleaseEntry {
    pub fn new(release: &ReleaseRecord, assets: Vec<AssetInfo>) -> Self {
        Self {
            tag_name: release.tag_name.clone(),
            prerelease: release.prerelease,
            created_at: release.created_at,
            published_at: release.published_at,
            assets,
        }
    }

    pub fn has_asset(&self, name: &str) -> bool {
        self.assets.iter().any(|a| a.name == name)
    }
}

/// Copy of `records` with `ignore` keys dropped from every record.
///
/// Used for the comparison snapshot, so volatile fields do not show up as
/// changes between runs.
pub fn strip_keys(records: &Map<String, Value>, ignore: &[String]) -> Map<String, Value> {
    records
        .iter()
        .map(|(id, record)| {
            let filtered = match record {
                Value::Object(fields) => Value::Object(
                    fields
                        .iter()
                        .filter(|(key, _)| !ignore.iter().any(|i| i == *key))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                ),
                other => other.clone(),
            };
            (id.clone(), filtered)
        })
        .collect()
}
