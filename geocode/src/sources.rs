//! Host-supplied resolution sources: manual overrides and the startup snapshot.
//!
//! Both are keyed by the exact address string (no case folding) and never
//! touch the network or the geocode cache.

use std::collections::HashMap;

use crate::coordinate::Coordinate;

/// Highest-priority source: coordinates pinned by the host application.
#[derive(Debug, Default)]
pub struct OverrideStore {
    entries: HashMap<String, Coordinate>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `overrides`.
    ///
    /// With `replace_all` the store becomes exactly the `Some` entries of the map.
    /// Otherwise entries are merged: `Some` inserts or replaces, `None` deletes.
    pub fn inject(&mut self, overrides: HashMap<String, Option<Coordinate>>, replace_all: bool) {
        if replace_all {
            self.entries = overrides
                .into_iter()
                .filter_map(|(k, v)| v.map(|c| (k, c)))
                .collect();
            return;
        }
        for (key, value) in overrides {
            match value {
                Some(c) => {
                    self.entries.insert(key, c);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
    }

    /// Removes every override whose coordinate matches `predicate`. Returns how many went.
    pub fn remove<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Coordinate) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|_, c| !predicate(c));
        before - self.entries.len()
    }

    pub fn get(&self, address: &str) -> Option<&Coordinate> {
        self.entries.get(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Second-priority source: a read-only snapshot seeded once at startup.
#[derive(Debug, Default)]
pub struct InitCache {
    entries: HashMap<String, Coordinate>,
}

impl InitCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot with `entries`.
    pub fn seed(&mut self, entries: HashMap<String, Coordinate>) {
        self.entries = entries;
    }

    pub fn get(&self, address: &str) -> Option<&Coordinate> {
        self.entries.get(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> Coordinate {
        Coordinate::new(48.85, 2.35)
    }

    fn london() -> Coordinate {
        Coordinate::new(51.5, -0.12)
    }

    #[test]
    fn merge_inserts_and_none_deletes() {
        let mut store = OverrideStore::new();
        store.inject(
            HashMap::from([
                ("Paris".to_string(), Some(paris())),
                ("London".to_string(), Some(london())),
            ]),
            false,
        );
        assert_eq!(store.len(), 2);

        store.inject(HashMap::from([("London".to_string(), None)]), false);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("Paris"), Some(&paris()));
        assert!(store.get("London").is_none());
    }

    #[test]
    fn replace_all_drops_previous_entries_and_skips_none() {
        let mut store = OverrideStore::new();
        store.inject(HashMap::from([("Paris".to_string(), Some(paris()))]), false);
        store.inject(
            HashMap::from([
                ("London".to_string(), Some(london())),
                ("Nowhere".to_string(), None),
            ]),
            true,
        );
        assert_eq!(store.len(), 1);
        assert!(store.get("Paris").is_none());
        assert!(store.get("Nowhere").is_none());
    }

    #[test]
    fn keys_are_exact_match() {
        let mut store = OverrideStore::new();
        store.inject(HashMap::from([("Paris".to_string(), Some(paris()))]), false);
        assert!(store.get("paris").is_none());
    }

    #[test]
    fn remove_by_predicate() {
        let mut store = OverrideStore::new();
        store.inject(
            HashMap::from([
                ("Paris".to_string(), Some(paris())),
                ("London".to_string(), Some(london())),
            ]),
            false,
        );
        let removed = store.remove(|c| c.longitude < 0.0);
        assert_eq!(removed, 1);
        assert!(store.get("London").is_none());
        assert!(store.get("Paris").is_some());
    }

    #[test]
    fn seed_replaces_snapshot() {
        let mut init = InitCache::new();
        init.seed(HashMap::from([("Paris".to_string(), paris())]));
        init.seed(HashMap::from([("London".to_string(), london())]));
        assert!(init.get("Paris").is_none());
        assert_eq!(init.get("London"), Some(&london()));
        assert_eq!(init.len(), 1);
    }
}
