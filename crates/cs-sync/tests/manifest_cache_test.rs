//! Manifest resolution: one fetch per location per run, failures dropped,
//! order preserved.

use cs_core::plugin::PluginLocation;
use cs_integrations::mock::MockVersionControl;
use cs_sync::manifests::{resolve_manifests, ManifestCache, ManifestFetchError};

fn github() -> MockVersionControl {
    MockVersionControl::new()
        .with_file("acme", "pricing", "manifest.json", r#"{ "name": "pricing" }"#)
        .with_file("acme", "broken", "manifest.json", "{ not json")
        .with_file("acme", "nameless", "manifest.json", r#"{ "description": "x" }"#)
        .with_json(
            "https://start-stop.example.dev/manifest.json",
            serde_json::json!({ "name": "start-stop", "ubiquity:listeners": ["issue_comment.created"] }),
        )
}

#[tokio::test]
async fn each_location_is_fetched_once_per_run() {
    let vcs = github();
    let locations = vec![
        PluginLocation::repo("acme", "pricing", None),
        PluginLocation::repo("acme", "pricing", Some("main")),
        PluginLocation::url("https://start-stop.example.dev/manifest.json"),
    ];
    let mut cache = ManifestCache::new();

    let first = resolve_manifests(&vcs, &locations, &mut cache).await;
    let second = resolve_manifests(&vcs, &locations, &mut cache).await;

    assert_eq!(first.manifests.len(), 3);
    assert_eq!(second.manifests.len(), 3);
    assert_eq!(cache.len(), 2);
    assert_eq!(vcs.call_count("get_content acme/pricing/manifest.json@main"), 1);
    assert_eq!(vcs.call_count("fetch_json"), 1);
}

#[tokio::test]
async fn failures_are_dropped_and_order_is_kept() {
    let vcs = github();
    let locations = vec![
        PluginLocation::url("https://start-stop.example.dev/manifest.json"),
        PluginLocation::repo("acme", "missing", None),
        PluginLocation::repo("acme", "broken", None),
        PluginLocation::repo("acme", "nameless", None),
        PluginLocation::url("https://gone.example.dev/manifest.json"),
        PluginLocation::repo("acme", "pricing", None),
    ];
    let mut cache = ManifestCache::new();

    let resolved = resolve_manifests(&vcs, &locations, &mut cache).await;

    let names: Vec<&str> = resolved.manifests.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["start-stop", "pricing"]);
    assert_eq!(resolved.warnings.len(), 4);
    assert!(matches!(resolved.warnings[0], ManifestFetchError::NotFound { .. }));
    assert!(matches!(resolved.warnings[1], ManifestFetchError::Parse { .. }));
    assert!(matches!(resolved.warnings[2], ManifestFetchError::Invalid { .. }));
    assert!(matches!(resolved.warnings[3], ManifestFetchError::Fetch { .. }));
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn pinned_refs_are_requested() {
    let vcs = github();
    let locations = vec![PluginLocation::repo("acme", "pricing", Some("v2"))];
    let mut cache = ManifestCache::new();

    let resolved = resolve_manifests(&vcs, &locations, &mut cache).await;

    assert_eq!(resolved.manifests.len(), 1);
    assert_eq!(vcs.call_count("get_content acme/pricing/manifest.json@v2"), 1);
    assert!(cache.contains(&PluginLocation::repo("acme", "pricing", Some("v2"))));
    assert!(!cache.contains(&PluginLocation::repo("acme", "pricing", None)));
}

#[tokio::test]
async fn decoded_manifests_carry_defaults() {
    let vcs = github();
    let mut cache = ManifestCache::new();

    let resolved = resolve_manifests(
        &vcs,
        &[PluginLocation::repo("acme", "pricing", None)],
        &mut cache,
    )
    .await;

    let manifest = &resolved.manifests[0];
    assert!(manifest.commands.is_empty());
    assert!(manifest.listeners.is_empty());
    assert!(manifest.configuration.is_empty());
}
