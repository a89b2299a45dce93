// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for batch runs, output files and the release check

mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use common::*;
use harvest_adapters::AdapterError;
use harvest_metadata::{
    check_releases, BatchRunner, HarvestError, PipelineOptions, RunSummary,
};
use serde_json::{json, Value};
use tempfile::TempDir;

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn write_list(dir: &TempDir, repos: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join("plugins.json");
    fs::write(&path, serde_json::to_string(repos).unwrap()).unwrap();
    path
}

fn releases(tag: &str) -> Vec<harvest_adapters::ReleaseRecord> {
    vec![release(
        tag,
        false,
        "2025-02-01T00:00:00Z",
        vec![digested_asset("foo.zip", "abc123")],
    )]
}

/// One plugin per outcome class: valid, renamed-valid, archived, missing, invalid
fn mixed_host() -> FakeHost {
    FakeHost::new()
        .with_plugin("owner/alpha", 11, "foo", manifest("foo", "1.0.0"), releases("v1.0.0"))
        .with_plugin("new/beta", 22, "bar", manifest("bar", "2.0.0"), releases("2.0.0"))
        .with_repository("old/beta", snapshot("new/beta", 22, false))
        .with_repository("owner/gamma", snapshot("owner/gamma", 33, true))
        .with_plugin("owner/delta", 44, "baz", manifest("baz", "0.9.0"), releases("v1.0.0"))
}

#[tokio::test]
async fn test_mixed_batch() {
    setup_test_logging();
    let dir = TempDir::new().unwrap();
    let list = write_list(
        &dir,
        &["owner/alpha", "old/beta", "owner/gamma", "owner/missing", "owner/delta"],
    );
    let out = dir.path().join("output/plugin");

    let summary = BatchRunner::new(Arc::new(mixed_host()))
        .run(&list, &out)
        .await
        .unwrap();

    assert_eq!(summary.total_plugins, 5);
    assert_eq!(summary.valid_plugins, 2);
    assert_eq!(summary.archived_plugins, 1);
    assert_eq!(summary.skipped_plugins, 2);
    assert_eq!(summary.renamed_plugins, 1);
    assert!(summary.execution_time_seconds >= 0.0);

    let data = read_json(&out.join("data.json"));
    let ids: Vec<_> = data.as_object().unwrap().keys().cloned().collect();
    assert_eq!(ids, vec!["11", "22"]);
    assert_eq!(data["22"]["repository"], "new/beta");
    assert!(data["11"].get("last_fetched").is_some());

    let keys: Vec<_> = data["11"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys[0], "manifest");
    assert_eq!(keys[1], "releases");
    assert_eq!(keys[2], "etag_release");

    let repositories = read_json(&out.join("repositories.json"));
    assert_eq!(repositories, json!(["owner/alpha", "new/beta"]));

    let diff = read_json(&out.join("diff/after.json"));
    for id in ["11", "22"] {
        let record = diff[id].as_object().unwrap();
        assert!(!record.contains_key("last_fetched"));
        assert!(!record.contains_key("etag_release"));
        assert!(!record.contains_key("etag_repository"));
        assert!(record.contains_key("used_ref"));
    }

    let written: RunSummary = serde_json::from_value(read_json(&out.join("summary.json"))).unwrap();
    assert_eq!(written, summary);
}

#[tokio::test]
async fn test_counts_add_up() {
    let runner = BatchRunner::new(Arc::new(mixed_host()));
    let output = runner
        .process(vec![
            "owner/alpha".into(),
            "old/beta".into(),
            "owner/gamma".into(),
            "owner/missing".into(),
            "owner/delta".into(),
        ])
        .await;

    let s = &output.summary;
    assert_eq!(
        s.valid_plugins + s.archived_plugins + s.skipped_plugins,
        s.total_plugins
    );
    assert_eq!(output.repositories.len(), s.valid_plugins);
    assert_eq!(output.data.len(), s.valid_plugins);
}

#[tokio::test]
async fn test_renamed_counted_even_when_skipped() {
    let host = FakeHost::new()
        .with_repository("old/name", snapshot("new/name", 5, false))
        .with_releases("new/name", vec![]);

    let output = BatchRunner::new(Arc::new(host))
        .process(vec!["old/name".into()])
        .await;

    assert_eq!(output.summary.skipped_plugins, 1);
    assert_eq!(output.summary.renamed_plugins, 1);
}

#[tokio::test]
async fn test_missing_plugin_list() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    let summary = BatchRunner::new(Arc::new(FakeHost::new()))
        .run(&dir.path().join("does-not-exist.json"), &out)
        .await
        .unwrap();

    assert_eq!(summary.total_plugins, 0);
    assert_eq!(summary.valid_plugins, 0);
    assert_eq!(summary.skipped_plugins, 0);
    assert_eq!(read_json(&out.join("data.json")), json!({}));
    assert_eq!(read_json(&out.join("diff/after.json")), json!({}));
    assert_eq!(read_json(&out.join("repositories.json")), json!([]));
}

#[tokio::test]
async fn test_invalid_plugin_list_is_fatal() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("plugins.json");
    fs::write(&list, "[\"owner/alpha\",").unwrap();

    let result = BatchRunner::new(Arc::new(FakeHost::new()))
        .run(&list, &dir.path().join("out"))
        .await;

    assert!(matches!(result, Err(HarvestError::Json { .. })));
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn test_custom_compare_ignore_and_options() {
    let dir = TempDir::new().unwrap();
    let list = write_list(&dir, &["owner/alpha"]);
    let out = dir.path().join("out");

    let options = PipelineOptions {
        manifest_exclude_keys: vec!["description".into()],
        ..Default::default()
    };
    BatchRunner::new(Arc::new(mixed_host()))
        .with_options(options)
        .with_compare_ignore(vec!["last_fetched".into(), "topics".into()])
        .run(&list, &out)
        .await
        .unwrap();

    let diff = read_json(&out.join("diff/after.json"));
    let record = diff["11"].as_object().unwrap();
    assert!(!record.contains_key("topics"));
    assert!(record.contains_key("etag_release"));
    assert!(record["manifest"].get("description").is_none());
}

// ============================================================================
// Release check
// ============================================================================

mod release_check {
    use super::*;

    #[tokio::test]
    async fn test_counts_releases() {
        let host = FakeHost::new().with_releases(
            "owner/alpha",
            vec![
                release("v1.0.0", false, "2025-01-01T00:00:00Z", vec![]),
                release("v1.1.0", false, "2025-01-02T00:00:00Z", vec![]),
            ],
        );
        assert_eq!(check_releases(&host, "owner/alpha").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_zero_releases_is_a_count() {
        let host = FakeHost::new().with_releases("owner/alpha", vec![]);
        assert_eq!(check_releases(&host, "owner/alpha").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejects_bad_identifier_before_calling_host() {
        let host = FakeHost::new();
        let err = check_releases(&host, "not-a-repo").await.unwrap_err();
        assert!(matches!(err, HarvestError::InvalidRepository(_)));
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_repository() {
        let err = check_releases(&FakeHost::new(), "owner/nope").await.unwrap_err();
        assert!(matches!(err, HarvestError::Adapter(AdapterError::NotFound(_))));
    }
}
