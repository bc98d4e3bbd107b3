//! Sensitive-region configuration.
//!
//! Region behavior is dispatched through a closed set of kind variants looked
//! up in an immutable [`RegionTable`] built once at run begin. There is no
//! open-ended detector hierarchy: a region is deposit-only, a fiber plane, or
//! a crystal grid, optionally also counting optical boundary crossings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{CRYSTAL_GRID_STRIDE, FIBER_Y_COPY_OFFSET, Plane, RegionId};

/// How steps within a region collapse into hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionKind {
    /// Plain energy-deposit region: strips, veto shell, trigger panels.
    Deposit,
    /// One orientation of the fiber tracker; copy numbers encode layer/row
    /// above the plane's base offset.
    FiberPlane { plane: Plane, copy_offset: i32 },
    /// Calorimeter crystal grid; copy numbers encode `ix * stride + iy`.
    CrystalGrid { stride: i32 },
}

/// Deduplication policy applied uniformly across all regions.
///
/// The two source lineages of this design disagreed on hit identity; the
/// policy is explicit and configurable rather than implied by region kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DedupPolicy {
    /// One hit per struck volume instance; deposits from all tracks summed.
    PerVolume,
    /// One hit per (volume path, track); a volume instance may host many
    /// concurrent hits in the same event.
    #[default]
    PerVolumeTrack,
}

/// Static description of one sensitive region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionDef {
    pub id: RegionId,
    pub name: String,
    pub kind: RegionKind,
    /// Whether optical-photon boundary crossings are recorded for this region.
    pub optics: bool,
}

/// Immutable id-to-definition table, resolved once at run begin.
///
/// Lookup tolerates unknown ids: a step in an unregistered region is simply
/// not a sensitive step.
#[derive(Debug, Clone)]
pub struct RegionTable {
    defs: Vec<RegionDef>,
    by_id: HashMap<RegionId, usize>,
    /// Region whose deposits count as the veto signal.
    pub veto: RegionId,
    /// Region whose deposits count as the absorber (calorimeter) signal.
    pub absorber: RegionId,
}

impl RegionTable {
    pub fn new(defs: Vec<RegionDef>, veto: RegionId, absorber: RegionId) -> Self {
        let by_id = defs
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id, i))
            .collect();
        Self {
            defs,
            by_id,
            veto,
            absorber,
        }
    }

    /// The standard stacked instrument: two trigger panels, veto shell,
    /// X/Y fiber planes, and the calorimeter crystal grid. Region id 4 is
    /// intentionally unused.
    pub fn standard() -> Self {
        let defs = vec![
            RegionDef {
                id: RegionId(0),
                name: "TriggerTop".into(),
                kind: RegionKind::Deposit,
                optics: false,
            },
            RegionDef {
                id: RegionId(1),
                name: "TriggerBottom".into(),
                kind: RegionKind::Deposit,
                optics: false,
            },
            RegionDef {
                id: RegionId(2),
                name: "Veto".into(),
                kind: RegionKind::Deposit,
                optics: false,
            },
            RegionDef {
                id: RegionId(3),
                name: "FiberX".into(),
                kind: RegionKind::FiberPlane {
                    plane: Plane::X,
                    copy_offset: 0,
                },
                optics: true,
            },
            RegionDef {
                id: RegionId(5),
                name: "FiberY".into(),
                kind: RegionKind::FiberPlane {
                    plane: Plane::Y,
                    copy_offset: FIBER_Y_COPY_OFFSET,
                },
                optics: true,
            },
            RegionDef {
                id: RegionId(6),
                name: "Calorimeter".into(),
                kind: RegionKind::CrystalGrid {
                    stride: CRYSTAL_GRID_STRIDE,
                },
                optics: false,
            },
        ];
        Self::new(defs, RegionId(2), RegionId(6))
    }

    pub fn get(&self, id: RegionId) -> Option<&RegionDef> {
        self.by_id.get(&id).map(|&i| &self.defs[i])
    }

    /// Position of a region in table order (the column order of the
    /// per-event energy summary).
    pub fn ordinal(&self, id: RegionId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionDef> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
