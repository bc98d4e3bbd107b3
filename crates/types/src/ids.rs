//! Identifier types for the read-out pipeline.
//!
//! Newtypes for everything that must not be confused with a plain integer:
//! track identity, sensitive-region tags, and volume-placement handles.

use derive_more::{Add, From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event number within a run (unique per run, assigned by the runner).
pub type EventId = u64;

/// PDG particle code.
pub type Pdg = i32;

/// Identifier of a particle track within one event.
///
/// Track 0 is reserved: a record whose parent track is 0 belongs to a
/// primary particle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default, Add,
    From, Into,
)]
pub struct TrackId(pub i32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Track#{}", self.0)
    }
}

/// Integer tag of a sensitive region (veto, calorimeter, fiber plane, ...).
///
/// Tags are sparse by design: the standard instrument leaves id 4 unused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
    From, Into,
)]
pub struct RegionId(pub i32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Region#{}", self.0)
    }
}

/// Opaque handle identifying one volume placement in the geometry.
///
/// A placement may be instantiated many times (replicated modules, crystal
/// grid); the copy number distinguishes instances. Handles are unique within
/// a run but carry no meaning across runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
    From, Into,
)]
pub struct PlacementId(pub u64);

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Placement#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_ids_are_ordered_and_hashable() {
        assert!(TrackId(1) < TrackId(2));
        assert_eq!(TrackId(3) + TrackId(4), TrackId(7));
    }

    #[test]
    fn region_id_display() {
        assert_eq!(RegionId(6).to_string(), "Region#6");
    }
}
