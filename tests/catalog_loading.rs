//! Catalog building against a scripted source

mod helpers;

use appdex::catalog::{compute_stats, load_catalog, LoadError};
use appdex::fetch::FetchError;
use helpers::{MockFetcher, Scripted};
use serde_json::json;
use std::time::Duration;

fn ids(catalog: &appdex::models::Catalog) -> Vec<&str> {
    catalog.iter().map(|app| app.id.as_str()).collect()
}

#[tokio::test]
async fn test_catalog_is_ordered_subsequence_of_index() {
    let fetcher = MockFetcher::new();
    fetcher
        .index(&["Safari", "Xcode", "Notes", "Mail", "Maps"])
        .app("Safari")
        .app("Notes")
        .app("Maps")
        .respond("data/Xcode/manifest.json", Scripted::Status(500))
        .text("data/Mail/manifest.json", "[1, 2, 3]");

    // Slow first entries must not reorder the result
    fetcher.delay("data/Safari/manifest.json", Duration::from_millis(40));
    fetcher.delay("data/Notes/manifest.json", Duration::from_millis(20));

    let catalog = load_catalog(&fetcher).await.unwrap();
    assert_eq!(ids(&catalog), vec!["Safari", "Notes", "Maps"]);
}

#[tokio::test]
async fn test_missing_index_is_fatal() {
    let fetcher = MockFetcher::new();
    fetcher.app("Safari");

    let err = load_catalog(&fetcher).await.unwrap_err();
    assert!(matches!(err, LoadError::IndexUnavailable(FetchError::NotFound { .. })));
    // Nothing else was attempted
    assert_eq!(fetcher.requests(), vec!["data/index.json".to_string()]);
}

#[tokio::test]
async fn test_malformed_index_is_fatal() {
    let fetcher = MockFetcher::new();
    fetcher.text("data/index.json", "<html>not found</html>");
    assert!(matches!(
        load_catalog(&fetcher).await,
        Err(LoadError::IndexUnavailable(FetchError::Parse { .. }))
    ));

    // `apps` is required
    let fetcher = MockFetcher::new();
    fetcher.json("data/index.json", &json!({ "total_apps": 0 }));
    assert!(load_catalog(&fetcher).await.is_err());
}

#[tokio::test]
async fn test_one_failed_manifest_leaves_the_rest() {
    let ids_in_index = ["A", "B", "C", "D", "E"];
    let fetcher = MockFetcher::new();
    fetcher.index(&ids_in_index);
    for id in ids_in_index {
        fetcher.app(id);
    }
    fetcher.respond("data/C/manifest.json", Scripted::Unreachable);

    let catalog = load_catalog(&fetcher).await.unwrap();
    assert_eq!(catalog.len(), ids_in_index.len() - 1);
    assert_eq!(ids(&catalog), vec!["A", "B", "D", "E"]);
}

#[tokio::test]
async fn test_every_manifest_failing_gives_empty_catalog() {
    let fetcher = MockFetcher::new();
    fetcher.index(&["A", "B"]);

    let catalog = load_catalog(&fetcher).await.unwrap();
    assert!(catalog.is_empty());
}

#[tokio::test]
async fn test_identifier_overrides_payload_id() {
    let fetcher = MockFetcher::new();
    fetcher
        .index(&["Safari"])
        .manifest("Safari", &json!({ "id": "something-else", "name": "Safari", "bundle_version": "18.0" }));

    let catalog = load_catalog(&fetcher).await.unwrap();
    let safari = catalog.get("Safari").unwrap();
    assert_eq!(safari.id, "Safari");
    assert!(!safari.extra.contains_key("id"));
    assert_eq!(safari.extra["bundle_version"], "18.0");
}

#[tokio::test]
async fn test_invalid_identifiers_are_skipped() {
    let fetcher = MockFetcher::new();
    fetcher.index(&["Safari", "../etc", ""]).app("Safari");

    let catalog = load_catalog(&fetcher).await.unwrap();
    assert_eq!(ids(&catalog), vec!["Safari"]);
    assert!(!fetcher.requests().iter().any(|r| r.contains("..")));
}

#[tokio::test]
async fn test_duplicate_identifiers_are_kept() {
    let fetcher = MockFetcher::new();
    fetcher.index(&["Safari", "Safari"]).app("Safari");

    let catalog = load_catalog(&fetcher).await.unwrap();
    assert_eq!(ids(&catalog), vec!["Safari", "Safari"]);
}

#[tokio::test]
async fn test_generated_timestamp_is_carried() {
    let fetcher = MockFetcher::new();
    fetcher.json(
        "data/index.json",
        &json!({ "apps": [], "generated": "2025-01-15T10:00:00", "total_apps": "0" }),
    );

    let catalog = load_catalog(&fetcher).await.unwrap();
    assert_eq!(catalog.generated.as_deref(), Some("2025-01-15T10:00:00"));
}

#[tokio::test]
async fn test_stats_over_loaded_catalog() {
    let fetcher = MockFetcher::new();
    let ids: Vec<String> = (0..10).map(|i| format!("App{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    fetcher.index(&id_refs);

    for (i, id) in ids.iter().enumerate() {
        let sandboxed = if i < 4 { "Yes" } else { "No" };
        let signature = if i < 6 { "Valid on disk" } else { "code object is not signed at all" };
        let sdef_count = if i < 3 { 2 } else { 0 };
        fetcher.manifest(
            id,
            &json!({
                "name": id,
                "codesign": { "signature_status": signature },
                "sandbox": { "sandboxed": sandboxed },
                "sdef_count": sdef_count
            }),
        );
    }

    let catalog = load_catalog(&fetcher).await.unwrap();
    let stats = compute_stats(&catalog);
    assert_eq!((stats.total, stats.sandboxed, stats.signed, stats.with_sdef), (10, 4, 6, 3));
}
