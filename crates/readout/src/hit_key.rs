//! 64-bit hit identity over volume ancestry and track.
//!
//! An FNV-1a-style running hash, computed once per step. The key is opaque:
//! it is only ever compared for equality and used as a map key, never
//! interpreted.

use types::{PlacementId, RegionId, TrackId};

use crate::step::PathNode;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;

/// Opaque 64-bit hit identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitKey(u64);

impl HitKey {
    /// Identity of a hit deduplicated by volume instance alone: region tag
    /// plus copy number. Contributions from all tracks merge into one hit.
    pub fn per_volume(region: RegionId, copy_no: i32) -> Self {
        let mut key = FNV_OFFSET_BASIS;
        key = mix(key, region.0 as u64);
        key = mix(key, copy_no as u64);
        HitKey(key)
    }

    /// Identity of a hit deduplicated by (volume path, track).
    ///
    /// Folds in each ancestry level from the struck volume outward: copy
    /// number first, then the placement handle; the track id last. A path
    /// with no ancestry beyond the struck volume still yields a valid key.
    pub fn per_track(region: RegionId, path: &[PathNode], track: TrackId) -> Self {
        let mut key = FNV_OFFSET_BASIS;
        key = mix(key, region.0 as u64);
        for node in path {
            key = mix(key, node.copy_no as u64);
            key = mix(key, placement_bits(node.placement));
        }
        key = mix(key, track.0 as u64);
        HitKey(key)
    }
}

fn placement_bits(p: PlacementId) -> u64 {
    p.0
}

#[inline]
fn mix(mut key: u64, v: u64) -> u64 {
    key ^= v
        .wrapping_add(GOLDEN)
        .wrapping_add(key << 6)
        .wrapping_add(key >> 2);
    key.wrapping_mul(FNV_PRIME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::PlacementId;

    fn path() -> Vec<PathNode> {
        vec![
            PathNode { placement: PlacementId(23), copy_no: 1005 },
            PathNode { placement: PlacementId(21), copy_no: 0 },
            PathNode { placement: PlacementId(20), copy_no: 3 },
            PathNode { placement: PlacementId(2), copy_no: 0 },
        ]
    }

    #[test]
    fn identical_inputs_produce_identical_keys() {
        let a = HitKey::per_track(RegionId(3), &path(), TrackId(7));
        let b = HitKey::per_track(RegionId(3), &path(), TrackId(7));
        assert_eq!(a, b);
    }

    #[test]
    fn track_id_alone_separates_keys() {
        let a = HitKey::per_track(RegionId(3), &path(), TrackId(7));
        let b = HitKey::per_track(RegionId(3), &path(), TrackId(8));
        assert_ne!(a, b);
    }

    #[test]
    fn ancestry_depth_separates_keys() {
        let deep = path();
        let shallow = &deep[..1];
        let a = HitKey::per_track(RegionId(3), &deep, TrackId(7));
        let b = HitKey::per_track(RegionId(3), shallow, TrackId(7));
        assert_ne!(a, b);
    }

    #[test]
    fn empty_ancestry_is_a_valid_key() {
        let a = HitKey::per_track(RegionId(0), &[], TrackId(1));
        let b = HitKey::per_track(RegionId(0), &[], TrackId(2));
        assert_ne!(a, b);
    }

    #[test]
    fn per_volume_ignores_track_but_not_region() {
        let a = HitKey::per_volume(RegionId(2), 0);
        let b = HitKey::per_volume(RegionId(0), 0);
        assert_ne!(a, b);
        assert_eq!(a, HitKey::per_volume(RegionId(2), 0));
    }
}
