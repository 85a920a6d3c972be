//! Byte-budgeted LRU storage for renditions.

use crate::{Rendition, RenditionKey};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct StoredRendition {
    rendition: Rendition,
    stored_at: Instant,
    last_used: u64,
}

impl StoredRendition {
    fn is_expired(&self, max_age: Duration) -> bool {
        self.stored_at.elapsed() > max_age
    }
}

/// Rendition storage bounded by total bytes and entry age.
///
/// Access order is tracked with a monotonically increasing tick, so touching
/// and evicting are logarithmic.
#[derive(Debug)]
pub(crate) struct LruStore {
    byte_budget: u64,
    max_age: Duration,
    entries: HashMap<RenditionKey, StoredRendition>,
    access_order: BTreeMap<u64, RenditionKey>,
    tick: u64,
    bytes: u64,
}

impl LruStore {
    pub(crate) fn new(byte_budget: u64, max_age: Duration) -> Self {
        Self {
            byte_budget,
            max_age,
            entries: HashMap::new(),
            access_order: BTreeMap::new(),
            tick: 0,
            bytes: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Look up a rendition, dropping it if it has outlived the max age.
    pub(crate) fn get(&mut self, key: &RenditionKey) -> Option<Rendition> {
        let expired = self.entries.get(key)?.is_expired(self.max_age);
        if expired {
            tracing::debug!(key = %key, "Rendition expired");
            self.remove(key);
            return None;
        }

        let tick = self.next_tick();
        let entry = self.entries.get_mut(key)?;
        self.access_order.remove(&entry.last_used);
        entry.last_used = tick;
        self.access_order.insert(tick, key.clone());
        Some(entry.rendition.clone())
    }

    /// Store a rendition, evicting least-recently-used entries to fit.
    ///
    /// Returns the number of evicted entries. A rendition larger than the
    /// whole budget is not stored.
    pub(crate) fn insert(&mut self, rendition: Rendition) -> usize {
        let size = rendition.len() as u64;
        if size > self.byte_budget {
            tracing::debug!(key = %rendition.key(), size, "Rendition exceeds cache budget");
            return 0;
        }

        let key = rendition.key().clone();
        self.remove(&key);

        let mut evicted = 0;
        while self.bytes + size > self.byte_budget {
            let Some((_, oldest)) = self.access_order.pop_first() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&oldest) {
                self.bytes -= entry.rendition.len() as u64;
                evicted += 1;
                tracing::debug!(key = %oldest, "Evicted rendition");
            }
        }

        let tick = self.next_tick();
        self.access_order.insert(tick, key.clone());
        self.entries.insert(
            key,
            StoredRendition {
                rendition,
                stored_at: Instant::now(),
                last_used: tick,
            },
        );
        self.bytes += size;
        evicted
    }

    fn remove(&mut self, key: &RenditionKey) {
        if let Some(entry) = self.entries.remove(key) {
            self.access_order.remove(&entry.last_used);
            self.bytes -= entry.rendition.len() as u64;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn bytes(&self) -> u64 {
        self.bytes
    }
}
