//! Bounded geocode cache with frequency-ranked eviction.
//!
//! Entries are keyed by the normalized query. Every lookup that is served from
//! here bumps the entry's hit count. Eviction is pull-based: it only runs right
//! after an insertion pushes the size past `max_size + max_overflow`, and then
//! trims back to exactly `max_size` by dropping the entries with the fewest
//! hits. Ties are removed in no particular order.

use std::collections::HashMap;

use crate::coordinate::Coordinate;
use crate::query::Query;

/// One cached resolution and its usage statistics.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    /// Query text that populated the entry.
    pub query: String,
    pub coordinate: Coordinate,
    pub hits: u64,
}

#[derive(Debug)]
pub struct GeocodeCache {
    entries: HashMap<String, CacheEntry>,
    max_size: usize,
    max_overflow: usize,
}

impl GeocodeCache {
    pub fn new(max_size: usize, max_overflow: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_size,
            max_overflow,
        }
    }

    /// Returns a copy of the cached coordinate for `key`, counting the hit.
    pub fn lookup(&mut self, key: &str) -> Option<Coordinate> {
        let entry = self.entries.get_mut(key)?;
        entry.hits += 1;
        Some(entry.coordinate.clone())
    }

    /// Reads an entry without counting a hit.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Stores a successful resolution and returns how many entries were evicted.
    ///
    /// A key seen for the first time starts at zero hits. Re-inserting an
    /// existing key (two identical queries dispatched before either completed)
    /// replaces the coordinate and keeps the hit count; the size is unchanged so
    /// no eviction can follow.
    pub fn insert(&mut self, query: &Query, coordinate: Coordinate) -> usize {
        if let Some(entry) = self.entries.get_mut(query.key()) {
            entry.query = query.text().to_string();
            entry.coordinate = coordinate;
            return 0;
        }
        self.entries.insert(
            query.key().to_string(),
            CacheEntry {
                query: query.text().to_string(),
                coordinate,
                hits: 0,
            },
        );
        if self.entries.len() > self.max_size.saturating_add(self.max_overflow) {
            self.evict(query.key())
        } else {
            0
        }
    }

    /// Trims to `max_size`, ranking by ascending hits. The entry that was just
    /// inserted is ranked last so it only goes when nothing else is left.
    fn evict(&mut self, fresh_key: &str) -> usize {
        let excess = self.entries.len().saturating_sub(self.max_size);
        let mut ranked: Vec<(&String, u64)> = self
            .entries
            .iter()
            .filter(|(k, _)| k.as_str() != fresh_key)
            .map(|(k, e)| (k, e.hits))
            .collect();
        ranked.sort_unstable_by_key(|(_, hits)| *hits);
        let mut victims: Vec<String> = ranked
            .into_iter()
            .take(excess)
            .map(|(k, _)| k.clone())
            .collect();
        if victims.len() < excess {
            victims.push(fresh_key.to_string());
        }
        for key in &victims {
            self.entries.remove(key);
        }
        tracing::info!(
            evicted = victims.len(),
            remaining = self.entries.len(),
            "geocode cache evicted least-hit entries"
        );
        victims.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
