//! Fuzzy search over a catalog
//!
//! The index covers each entry's display name, bundle path and code-signing
//! identifier. It is built from one catalog and never updated in place; a new
//! catalog means a new index.

use std::sync::Arc;

use crate::constants::SEARCH_THRESHOLD;
use crate::models::{Catalog, Manifest};

pub mod fuzzy;

use fuzzy::{best_match, normalize};

/// One ranked search result
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    pub app: &'a Manifest,
    /// 0.0 is a perfect match; never above the inclusion threshold
    pub score: f64,
}

/// Searchable fields of one catalog entry, pre-normalized
struct IndexedEntry {
    fields: Vec<Vec<char>>,
}

impl IndexedEntry {
    fn new(app: &Manifest) -> Self {
        let fields = [app.name.as_deref(), app.path.as_deref(), app.bundle_identifier()]
            .into_iter()
            .flatten()
            .map(normalize)
            .collect();
        Self { fields }
    }

    fn score(&self, pattern: &[char]) -> Option<f64> {
        self.fields
            .iter()
            .map(|field| best_match(pattern, field).score)
            .filter(|score| *score <= SEARCH_THRESHOLD)
            .min_by(|a, b| a.total_cmp(b))
    }
}

pub struct SearchIndex {
    catalog: Arc<Catalog>,
    entries: Vec<IndexedEntry>,
}

impl SearchIndex {
    pub fn build(catalog: Arc<Catalog>) -> Self {
        let entries = catalog.iter().map(IndexedEntry::new).collect();
        Self { catalog, entries }
    }

    /// The catalog this index was built from
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Ranked matches for `term`, best first; ties keep catalog order.
    /// A blank term matches every entry, in catalog order.
    pub fn search(&self, term: &str) -> Vec<SearchHit<'_>> {
        let term = term.trim();
        if term.is_empty() {
            return self
                .catalog
                .iter()
                .map(|app| SearchHit { app, score: 0.0 })
                .collect();
        }

        let pattern = normalize(term);
        let mut hits: Vec<SearchHit<'_>> = self
            .catalog
            .iter()
            .zip(&self.entries)
            .filter_map(|(app, entry)| entry.score(&pattern).map(|score| SearchHit { app, score }))
            .collect();
        hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        hits
    }

    pub fn query(&self, term: &str) -> Vec<&Manifest> {
        self.search(term).into_iter().map(|hit| hit.app).collect()
    }
}
