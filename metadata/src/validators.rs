// SPDX-License-Identifier: PMPL-1.0-or-later
//! Manifest consistency checks

use crate::log_buffer::LogSink;
use crate::manifest::ManifestDocument;

/// Strip every leading `v` from a version string; empty input is no version
pub fn normalize_version(version: Option<&str>) -> Option<&str> {
    version
        .filter(|v| !v.is_empty())
        .map(|v| v.trim_start_matches('v'))
}

/// The manifest's `domain` must equal the plugin folder name
pub fn validate_manifest_domain(
    domain: &str,
    manifest: &ManifestDocument,
    log: &mut dyn LogSink,
) -> bool {
    let manifest_domain = manifest.domain.as_deref();
    if manifest_domain == Some(domain) {
        return true;
    }

    log.error(format!(
        "Domain mismatch: folder '{}' vs manifest '{}'",
        domain,
        manifest_domain.unwrap_or("<none>")
    ));
    false
}

/// The manifest's `version` must equal the ref being harvested, ignoring `v` prefixes
pub fn validate_manifest_version(
    manifest: &ManifestDocument,
    used_ref: &str,
    log: &mut dyn LogSink,
) -> bool {
    let manifest_version = normalize_version(manifest.version.as_deref());
    let release_version = normalize_version(Some(used_ref));
    if manifest_version.is_some() && manifest_version == release_version {
        return true;
    }

    log.warning(format!(
        "Manifest version mismatch: '{}' (manifest) vs '{}' (release)",
        manifest.version.as_deref().unwrap_or("<none>"),
        used_ref
    ));
    false
}
