//! Synthetic instrument geometry.
//!
//! A fixed stack, top to bottom: upper trigger panel, the X/Y fiber tracker
//! (modules of three-layer planes), lower trigger panel, veto shell, and the
//! calorimeter crystal grid. Only the placement ancestry and copy-number
//! encodings matter here; no physical dimensions are modelled.

use readout::{ModuleResolver, PathNode, VolumePath};
use smallvec::smallvec;
use types::{FIBER_LAYER_STRIDE, FIBER_Y_COPY_OFFSET, Plane, PlacementId};

pub const WORLD: PlacementId = PlacementId(1);
pub const INSTRUMENT: PlacementId = PlacementId(2);
pub const VETO: PlacementId = PlacementId(10);
pub const TRIGGER_TOP: PlacementId = PlacementId(11);
pub const TRIGGER_BOTTOM: PlacementId = PlacementId(12);
pub const FIBER_MODULE: PlacementId = PlacementId(20);
pub const FIBER_PLANE_X: PlacementId = PlacementId(21);
pub const FIBER_PLANE_Y: PlacementId = PlacementId(22);
pub const FIBER_X: PlacementId = PlacementId(23);
pub const FIBER_Y: PlacementId = PlacementId(24);
pub const CRYSTAL: PlacementId = PlacementId(30);

/// Segment counts of the synthetic stack.
#[derive(Debug, Clone, Copy)]
pub struct ToyGeometry {
    pub crystal_rows: i32,
    pub fiber_rows: i32,
    pub fiber_layers: i32,
    pub fiber_modules: i32,
    pub trigger_segments: i32,
}

impl Default for ToyGeometry {
    fn default() -> Self {
        Self {
            crystal_rows: 2,
            fiber_rows: 48,
            fiber_layers: 3,
            fiber_modules: 5,
            trigger_segments: 7,
        }
    }
}

impl ToyGeometry {
    pub fn crystal_path(&self, ix: i32, iy: i32) -> VolumePath {
        let copy_no = ix * 10 + iy;
        smallvec![
            PathNode { placement: CRYSTAL, copy_no },
            PathNode { placement: INSTRUMENT, copy_no: 0 },
            PathNode { placement: WORLD, copy_no: 0 },
        ]
    }

    /// Ancestry of one fiber: fiber, plane, module, instrument, world. The
    /// fiber copy number packs `layer * 1000 + row` above the plane offset.
    pub fn fiber_path(&self, plane: Plane, module: i32, layer: i32, row: i32) -> VolumePath {
        let (fiber, plane_vol, offset) = match plane {
            Plane::X => (FIBER_X, FIBER_PLANE_X, 0),
            Plane::Y => (FIBER_Y, FIBER_PLANE_Y, FIBER_Y_COPY_OFFSET),
        };
        let copy_no = offset + layer * FIBER_LAYER_STRIDE + row;
        smallvec![
            PathNode { placement: fiber, copy_no },
            PathNode { placement: plane_vol, copy_no: 0 },
            PathNode { placement: FIBER_MODULE, copy_no: module },
            PathNode { placement: INSTRUMENT, copy_no: 0 },
            PathNode { placement: WORLD, copy_no: 0 },
        ]
    }

    pub fn veto_path(&self) -> VolumePath {
        smallvec![
            PathNode { placement: VETO, copy_no: 0 },
            PathNode { placement: INSTRUMENT, copy_no: 0 },
            PathNode { placement: WORLD, copy_no: 0 },
        ]
    }

    pub fn trigger_path(&self, top: bool, segment: i32) -> VolumePath {
        let panel = if top { TRIGGER_TOP } else { TRIGGER_BOTTOM };
        smallvec![
            PathNode { placement: panel, copy_no: segment },
            PathNode { placement: INSTRUMENT, copy_no: 0 },
            PathNode { placement: WORLD, copy_no: 0 },
        ]
    }
}

impl ModuleResolver for ToyGeometry {
    fn module_index(&self, path: &[PathNode]) -> Option<i32> {
        path.iter()
            .find(|node| node.placement == FIBER_MODULE)
            .map(|node| node.copy_no)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fiber_path_resolves_module() {
        let geo = ToyGeometry::default();
        let path = geo.fiber_path(Plane::Y, 3, 2, 17);
        assert_eq!(path[0].copy_no, FIBER_Y_COPY_OFFSET + 2017);
        assert_eq!(geo.module_index(&path), Some(3));
    }

    #[test]
    fn non_fiber_paths_have_no_module() {
        let geo = ToyGeometry::default();
        assert_eq!(geo.module_index(&geo.crystal_path(1, 1)), None);
        assert_eq!(geo.module_index(&geo.veto_path()), None);
    }
}
