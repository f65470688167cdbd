//! Browsing session state
//!
//! Owns the current catalog together with the search index derived from it,
//! the active query and the selection slot. The catalog is only ever
//! replaced through this type, which rebuilds the index in the same call.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::catalog::{compute_stats, load_catalog, LoadError};
use crate::detail::{self, SelectionSlot, SelectionTicket};
use crate::fetch::{locator, FetchError, ResourceFetcher};
use crate::models::{Catalog, CatalogStats, Manifest};
use crate::search::{SearchHit, SearchIndex};

pub struct BrowseSession {
    fetcher: Arc<dyn ResourceFetcher>,
    index: SearchIndex,
    query: String,
    selection: SelectionSlot,
}

impl BrowseSession {
    /// Load the catalog from `fetcher` and index it
    pub async fn load(fetcher: Arc<dyn ResourceFetcher>) -> Result<Self, LoadError> {
        let catalog = load_catalog(fetcher.as_ref()).await?;
        Ok(Self::with_catalog(fetcher, catalog))
    }

    pub fn with_catalog(fetcher: Arc<dyn ResourceFetcher>, catalog: Catalog) -> Self {
        Self {
            fetcher,
            index: SearchIndex::build(Arc::new(catalog)),
            query: String::new(),
            selection: SelectionSlot::new(),
        }
    }

    /// Load a fresh catalog. On failure the session is left untouched and the
    /// caller is expected to treat the error as fatal.
    pub async fn reload(&mut self) -> Result<(), LoadError> {
        let catalog = load_catalog(self.fetcher.as_ref()).await?;
        self.replace_catalog(catalog);
        Ok(())
    }

    /// Swap in a new catalog and rebuild the index before anything can query it
    pub fn replace_catalog(&mut self, catalog: Catalog) {
        self.index = SearchIndex::build(Arc::new(catalog));

        let current = self.selection.current();
        if let Some(id) = current.app_id() {
            if self.index.catalog().get(id).is_none() {
                log::debug!("Selected app {} is gone after reload", id);
                self.selection.close();
            }
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.index.catalog()
    }

    pub fn stats(&self) -> CatalogStats {
        compute_stats(self.catalog())
    }

    pub fn fetcher(&self) -> &Arc<dyn ResourceFetcher> {
        &self.fetcher
    }

    pub fn set_query(&mut self, term: impl Into<String>) {
        self.query = term.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The filtered view for the current query
    pub fn results(&self) -> Vec<&Manifest> {
        self.index.query(&self.query)
    }

    pub fn search(&self, term: &str) -> Vec<SearchHit<'_>> {
        self.index.search(term)
    }

    pub fn find(&self, id: &str) -> Option<&Manifest> {
        self.catalog().get(id)
    }

    pub fn selection(&self) -> &SelectionSlot {
        &self.selection
    }

    /// Resolve `id` into the selection slot. `None` when the id is not in
    /// the catalog, otherwise whether this call's result was committed.
    pub async fn open(&self, id: &str) -> Option<bool> {
        let app = self.find(id)?.clone();
        Some(detail::select(self.fetcher.as_ref(), &self.selection, app).await)
    }

    /// Resolve `id` on a background task
    pub fn open_in_background(&self, id: &str) -> Option<(SelectionTicket, JoinHandle<bool>)> {
        let app = self.find(id)?.clone();
        Some(detail::spawn_select(
            Arc::clone(&self.fetcher),
            self.selection.clone(),
            app,
        ))
    }

    pub fn close(&self) {
        self.selection.close();
    }

    /// Icon bytes, or `None` when the manifest declares no icon
    pub async fn icon(&self, app: &Manifest) -> Result<Option<Vec<u8>>, FetchError> {
        let Some(icon_path) = app.icon() else {
            return Ok(None);
        };
        let locator = locator::icon(&app.id, icon_path)?;
        self.fetcher.fetch_bytes(&locator).await.map(Some)
    }
}
