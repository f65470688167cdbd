//! Catalog building module
//!
//! Responsible for:
//! - Fetching the snapshot index (the only fatal step of a load)
//! - Fanning out one manifest fetch per listed identifier
//! - Assembling surviving manifests in index order
//! - Computing aggregate statistics over a catalog

use crate::fetch::{fetch_json, join_successes, locator, FetchError, ResourceFetcher};
use crate::models::{AppIndex, Catalog, CatalogStats, Manifest};

/// A load that produced no catalog at all
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to load app data index: {0}")]
    IndexUnavailable(#[source] FetchError),
}

/// Build a catalog from the snapshot index.
///
/// Only a missing or unparseable index fails the load. Manifests that cannot
/// be fetched or parsed are left out; the rest keep their index order.
pub async fn load_catalog<F>(fetcher: &F) -> Result<Catalog, LoadError>
where
    F: ResourceFetcher + ?Sized,
{
    let index: AppIndex = fetch_json(fetcher, &locator::index())
        .await
        .map_err(LoadError::IndexUnavailable)?;
    log::info!("Index lists {} applications", index.apps.len());

    let tasks = index
        .apps
        .iter()
        .map(|id| (id.as_str(), load_manifest(fetcher, id)));
    let apps: Vec<Manifest> = join_successes(tasks)
        .await
        .into_iter()
        .map(|(_, manifest)| manifest)
        .collect();

    if apps.len() < index.apps.len() {
        log::warn!(
            "Loaded {} of {} manifests; the rest were skipped",
            apps.len(),
            index.apps.len()
        );
    }

    Ok(Catalog::new(apps, index.generated))
}

async fn load_manifest<F>(fetcher: &F, id: &str) -> Result<Manifest, FetchError>
where
    F: ResourceFetcher + ?Sized,
{
    let locator = locator::manifest(id)?;
    let manifest: Manifest = fetch_json(fetcher, &locator).await?;
    Ok(manifest.with_id(id))
}

/// Counts shown in the summary header
pub fn compute_stats(catalog: &Catalog) -> CatalogStats {
    CatalogStats {
        total: catalog.len(),
        sandboxed: catalog.iter().filter(|app| app.is_sandboxed()).count(),
        signed: catalog.iter().filter(|app| app.is_signed()).count(),
        with_sdef: catalog.iter().filter(|app| app.has_sdef()).count(),
    }
}
