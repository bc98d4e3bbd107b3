//! Per-event hit container.
//!
//! A key-to-index map over an append-only sequence: insertion order is
//! preserved so output ordering is stable and testable. The store owns every
//! hit for the currently-open event and is cleared once per event after
//! draining.

use std::collections::HashMap;

use types::{Hit, RegionId};

use crate::HitKey;

#[derive(Debug, Default)]
pub struct HitStore {
    index: HashMap<HitKey, usize>,
    hits: Vec<Hit>,
}

impl HitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the hit for `key`, inserting a freshly zero-valued one tagged
    /// with `copy_no` if the key has not been seen this event.
    pub fn find_or_create(&mut self, key: HitKey, region: RegionId, copy_no: i32) -> &mut Hit {
        let idx = *self.index.entry(key).or_insert_with(|| {
            self.hits.push(Hit::new(region, copy_no));
            self.hits.len() - 1
        });
        &mut self.hits[idx]
    }

    /// Append a hit without registering a key. Used for boundary-crossing
    /// optical hits, which are never deduplicated.
    pub fn append(&mut self, hit: Hit) {
        self.hits.push(hit);
    }

    /// All hits held for the current event, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Hit> {
        self.hits.iter()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Reset for the next event. No state carries over.
    pub fn clear(&mut self) {
        self.index.clear();
        self.hits.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::TrackId;

    #[test]
    fn find_or_create_deduplicates_by_key() {
        let mut store = HitStore::new();
        let key = HitKey::per_volume(RegionId(6), 11);

        store.find_or_create(key, RegionId(6), 11).edep_mev += 1.0;
        store.find_or_create(key, RegionId(6), 11).edep_mev += 2.0;

        assert_eq!(store.len(), 1);
        assert_eq!(store.iter().next().unwrap().edep_mev, 3.0);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut store = HitStore::new();
        for copy in [5, 3, 9] {
            store.find_or_create(HitKey::per_volume(RegionId(6), copy), RegionId(6), copy);
        }
        let copies: Vec<i32> = store.iter().map(|h| h.copy_no).collect();
        assert_eq!(copies, vec![5, 3, 9]);
    }

    #[test]
    fn clear_discards_prior_event_state() {
        let mut store = HitStore::new();
        let key = HitKey::per_track(RegionId(2), &[], TrackId(1));

        store.find_or_create(key, RegionId(2), 0).edep_mev = 4.2;
        store.clear();
        assert!(store.is_empty());

        let hit = store.find_or_create(key, RegionId(2), 0);
        assert_eq!(hit.edep_mev, 0.0);
        assert_eq!(hit.t_min_ns, f64::INFINITY);
    }

    #[test]
    fn append_skips_deduplication() {
        let mut store = HitStore::new();
        let mut hit = Hit::new(RegionId(3), 1);
        hit.is_optical = true;
        store.append(hit.clone());
        store.append(hit);
        assert_eq!(store.len(), 2);
    }
}
