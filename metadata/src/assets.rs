// SPDX-License-Identifier: PMPL-1.0-or-later
//! Release asset digests
//!
//! Resolves name, size, download count and SHA-256 for a release asset. The
//! host-provided digest is preferred; only when none is available is the
//! asset downloaded and hashed chunk by chunk.

use futures::StreamExt;
use harvest_adapters::{HostingApi, ReleaseAsset, ReleaseRecord};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::log_buffer::LogSink;

const SHA256_PREFIX: &str = "sha256:";

/// API asset URLs answer with JSON metadata unless the raw bytes are requested
const OCTET_STREAM: &str = "application/octet-stream";

/// Asset entry as stored in a release of the metadata record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl AssetInfo {
    fn partial(asset: &ReleaseAsset) -> Self {
        Self {
            name: asset.name.clone(),
            size: asset.size,
            download_count: asset.download_count,
            sha256: None,
        }
    }
}

/// Resolve one named asset of `release`.
///
/// Returns `None` only when the release has no asset with that name. Download
/// failures are logged as warnings and yield a record without `sha256`.
pub async fn resolve_asset(
    api: &dyn HostingApi,
    release: &ReleaseRecord,
    asset_name: &str,
    log: &mut dyn LogSink,
) -> Option<AssetInfo> {
    let Some(asset) = release.assets.iter().find(|a| a.name == asset_name) else {
        log.warning(format!(
            "Asset '{}' not found in release {}",
            asset_name, release.tag_name
        ));
        return None;
    };

    let mut info = AssetInfo::partial(asset);

    if let Some(digest) = known_digest(asset) {
        info.sha256 = Some(digest);
        return Some(info);
    }

    let Some(url) = asset
        .browser_download_url
        .as_deref()
        .or(asset.url.as_deref())
    else {
        return Some(info);
    };

    let session = match api.http_session() {
        Some(session) => session,
        None => match reqwest::Client::builder().build() {
            Ok(session) => session,
            Err(e) => {
                log.warning(format!(
                    "Failed to compute SHA256 for {}: {}",
                    asset_name, e
                ));
                return Some(info);
            }
        },
    };

    match download_sha256(&session, url).await {
        Ok(hash) => info.sha256 = Some(hash),
        Err(e) => log.warning(format!(
            "Failed to compute SHA256 for {}: {}",
            asset_name, e
        )),
    }

    Some(info)
}

/// Resolve every asset of `release`, keeping the first of duplicate names
pub async fn resolve_release_assets(
    api: &dyn HostingApi,
    release: &ReleaseRecord,
    log: &mut dyn LogSink,
) -> Vec<AssetInfo> {
    let mut names: Vec<&str> = Vec::new();
    for asset in &release.assets {
        if !names.contains(&asset.name.as_str()) {
            names.push(&asset.name);
        }
    }

    let mut resolved = Vec::with_capacity(names.len());
    for name in names {
        if let Some(info) = resolve_asset(api, release, name, log).await {
            resolved.push(info);
        }
    }
    resolved
}

/// Digest the host already computed: the typed field first, then the raw payload
fn known_digest(asset: &ReleaseAsset) -> Option<String> {
    asset
        .digest
        .as_deref()
        .and_then(strip_sha256)
        .or_else(|| raw_digest(&asset.raw))
        .map(str::to_string)
}

fn raw_digest(raw: &Value) -> Option<&str> {
    raw.get("digest")
        .and_then(Value::as_str)
        .and_then(strip_sha256)
        .or_else(|| {
            raw.pointer("/data/digest")
                .and_then(Value::as_str)
                .and_then(strip_sha256)
        })
}

fn strip_sha256(digest: &str) -> Option<&str> {
    digest
        .strip_prefix(SHA256_PREFIX)
        .filter(|hex| !hex.is_empty())
}

/// Stream `url` and hash the body incrementally
async fn download_sha256(session: &reqwest::Client, url: &str) -> Result<String, reqwest::Error> {
    debug!("Downloading {} for hashing", url);
    let response = session
        .get(url)
        .header(ACCEPT, OCTET_STREAM)
        .send()
        .await?
        .error_for_status()?;

    let mut hasher = Sha256::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        hasher.update(&chunk?);
    }

    Ok(hex::encode(hasher.finalize()))
}
