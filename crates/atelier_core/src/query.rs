//! Search, pagination and page types.

use atelier_error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Largest page size a query may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1-based page number plus page size.
///
/// Out-of-range values are rejected rather than clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Items per page, 1-100
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 20 }
    }
}

impl PageRequest {
    /// Create a page request.
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Check page >= 1 and 1 <= size <= 100.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page == 0 {
            return Err(ValidationError::out_of_range(
                "page",
                0,
                1,
                u32::MAX as u64,
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.size) {
            return Err(ValidationError::out_of_range(
                "size",
                self.size as u64,
                1,
                MAX_PAGE_SIZE as u64,
            ));
        }
        Ok(())
    }

    /// Number of items preceding this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.size as usize)
    }

    /// Cut the requested window out of an already ordered sequence.
    pub fn slice<T, I>(&self, ordered: I) -> Page<T>
    where
        I: IntoIterator<Item = T>,
    {
        let mut total = 0u64;
        let mut items = Vec::with_capacity(self.size as usize);
        let offset = self.offset();
        for (index, item) in ordered.into_iter().enumerate() {
            total += 1;
            if index >= offset && items.len() < self.size as usize {
                items.push(item);
            }
        }
        Page {
            items,
            total,
            page: self.page,
            size: self.size,
        }
    }
}

/// Conjunctive asset filter plus pagination.
///
/// Every supplied filter must hold: `text` matches title or description
/// (case-insensitive substring), the asset carries every tag in `tags`, and
/// the current version's MIME type equals `mimetype`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssetQuery {
    /// Free-text query
    #[serde(default)]
    pub text: Option<String>,
    /// Required tags
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Exact MIME type
    #[serde(default)]
    pub mimetype: Option<String>,
    /// Page window
    #[serde(default)]
    pub page: PageRequest,
}

impl AssetQuery {
    /// Unfiltered query for the first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a text match.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Require a tag (may be called repeatedly).
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Require an exact MIME type.
    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    /// Select a page window.
    pub fn with_page(mut self, page: u32, size: u32) -> Self {
        self.page = PageRequest::new(page, size);
        self
    }

    /// Empty strings mean "no filter".
    pub fn normalized(mut self) -> Self {
        self.text = self.text.filter(|t| !t.trim().is_empty());
        self.mimetype = self.mimetype.filter(|m| !m.trim().is_empty());
        self.tags.retain(|t| !t.is_empty());
        self
    }
}

/// One page of results with the total match count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Matches across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    /// Requested page size
    pub size: u32,
}

impl<T> Page<T> {
    /// Number of pages needed to hold `total` items.
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(self.size as u64)
    }

    /// Convert every item, keeping the paging fields.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
        }
    }
}

/// A tag and how many assets carry it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagCount {
    /// Tag name
    pub name: String,
    /// Number of assets carrying the tag
    pub assets: u64,
}
