//! In-memory search index over current asset views.

use atelier_core::{Asset, AssetId, AssetQuery, Page, PageRequest, TagCount};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

/// Newest first, id as tiebreak.
type OrderKey = (Reverse<DateTime<Utc>>, AssetId);

/// Secondary index answering filtered, paginated asset queries.
///
/// Assets are kept in result order (newest `created_at` first, then id) with
/// posting lists per tag and per MIME type, so a filtered query only walks
/// the smallest matching posting list. Every update replaces an asset's
/// entries as a unit under one write lock, so a query never sees an asset
/// half-indexed.
#[derive(Debug, Default)]
pub struct SearchIndex {
    state: RwLock<IndexState>,
}

#[derive(Debug, Default)]
struct IndexState {
    ordered: BTreeMap<OrderKey, Asset>,
    tags: BTreeMap<String, BTreeSet<OrderKey>>,
    mimetypes: HashMap<String, BTreeSet<OrderKey>>,
}

fn order_key(asset: &Asset) -> OrderKey {
    (Reverse(asset.created_at), asset.id)
}

impl IndexState {
    fn remove(&mut self, key: &OrderKey) {
        let Some(previous) = self.ordered.remove(key) else {
            return;
        };
        for tag in &previous.metadata.tags {
            if let Some(postings) = self.tags.get_mut(tag) {
                postings.remove(key);
                if postings.is_empty() {
                    self.tags.remove(tag);
                }
            }
        }
        let mimetype = previous.mimetype();
        if let Some(postings) = self.mimetypes.get_mut(mimetype) {
            postings.remove(key);
            if postings.is_empty() {
                self.mimetypes.remove(mimetype);
            }
        }
    }

    fn insert(&mut self, asset: Asset) {
        let key = order_key(&asset);
        for tag in &asset.metadata.tags {
            self.tags.entry(tag.clone()).or_default().insert(key);
        }
        self.mimetypes
            .entry(asset.mimetype().to_string())
            .or_default()
            .insert(key);
        self.ordered.insert(key, asset);
    }
}

impl SearchIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the indexed view of an asset.
    pub fn upsert(&self, asset: &Asset) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let key = order_key(asset);
        state.remove(&key);
        state.insert(asset.clone());
    }

    /// Number of indexed assets.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .ordered
            .len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run a conjunctive query and return the requested page.
    ///
    /// The query is expected to be normalized and its page validated.
    pub fn query(&self, query: &AssetQuery) -> Page<Asset> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);

        let matches = |asset: &Asset| {
            asset.metadata.has_all_tags(&query.tags)
                && query
                    .mimetype
                    .as_deref()
                    .is_none_or(|m| asset.mimetype() == m)
                && query
                    .text
                    .as_deref()
                    .is_none_or(|t| asset.metadata.matches_text(t))
        };

        // Narrow to the smallest posting list among the exact filters.
        let mut postings: Vec<Option<&BTreeSet<OrderKey>>> = query
            .tags
            .iter()
            .map(|tag| state.tags.get(tag))
            .collect();
        if let Some(mimetype) = &query.mimetype {
            postings.push(state.mimetypes.get(mimetype));
        }

        let page = if postings.is_empty() {
            query
                .page
                .slice(state.ordered.values().filter(|&asset| matches(asset)))
        } else if postings.iter().any(Option::is_none) {
            query.page.slice(std::iter::empty::<&Asset>())
        } else {
            let smallest = postings
                .into_iter()
                .flatten()
                .min_by_key(|set| set.len())
                .into_iter()
                .flatten();
            query.page.slice(
                smallest
                    .filter_map(|key| state.ordered.get(key))
                    .filter(|&asset| matches(asset)),
            )
        };
        page.map(|asset| asset.clone())
    }

    /// Tags in use, alphabetically, with the number of assets carrying each.
    ///
    /// `text`, when present, keeps only tags containing it (case-insensitive).
    pub fn tags(&self, text: Option<&str>, page: PageRequest) -> Page<TagCount> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let needle = text.map(str::to_lowercase);
        page.slice(
            state
                .tags
                .iter()
                .filter(|(name, _)| {
                    needle
                        .as_deref()
                        .is_none_or(|n| name.to_lowercase().contains(n))
                })
                .map(|(name, assets)| TagCount {
                    name: name.clone(),
                    assets: assets.len() as u64,
                }),
        )
    }
}
