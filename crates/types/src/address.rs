//! Pure decode functions for the ad hoc integer copy-number encodings.
//!
//! The geometry packs fiber row/layer into a single copy number
//! (`layer * 1000 + row`, Y plane offset by 50000) and calorimeter crystal
//! coordinates into `ix * 10 + iy`. Decoding happens exactly once, at hit
//! creation; the rest of the pipeline works with these explicit structs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CRYSTAL_GRID_STRIDE, FIBER_LAYER_STRIDE, UNKNOWN_INDEX};

/// Orientation of a fiber plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plane {
    X,
    Y,
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plane::X => write!(f, "X"),
            Plane::Y => write!(f, "Y"),
        }
    }
}

/// Decoded address of a fiber within the tracker.
///
/// `module` is resolved separately from the volume ancestry (the copy number
/// alone does not identify the module); it stays at the unknown sentinel
/// until the geometry layer provides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiberAddress {
    pub plane: Plane,
    pub module: i32,
    pub layer: i32,
    pub row: i32,
}

/// Decoded grid position of a calorimeter crystal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrystalIndex {
    pub ix: i32,
    pub iy: i32,
}

/// Decode a fiber copy number into layer/row for the given plane.
///
/// `copy_offset` is the plane's base offset (0 for X, 50000 for Y). Decode is
/// best-effort: a copy number below the offset yields sentinel indices rather
/// than an error.
pub fn decode_fiber(copy_no: i32, plane: Plane, copy_offset: i32) -> FiberAddress {
    let raw = copy_no - copy_offset;
    let (layer, row) = if raw >= 0 {
        (raw / FIBER_LAYER_STRIDE, raw % FIBER_LAYER_STRIDE)
    } else {
        (UNKNOWN_INDEX, UNKNOWN_INDEX)
    };
    FiberAddress {
        plane,
        module: UNKNOWN_INDEX,
        layer,
        row,
    }
}

/// Decode a crystal copy number into grid coordinates.
///
/// Negative copy numbers yield sentinel indices.
pub fn decode_crystal(copy_no: i32) -> CrystalIndex {
    if copy_no >= 0 {
        CrystalIndex {
            ix: copy_no / CRYSTAL_GRID_STRIDE,
            iy: copy_no % CRYSTAL_GRID_STRIDE,
        }
    } else {
        CrystalIndex {
            ix: UNKNOWN_INDEX,
            iy: UNKNOWN_INDEX,
        }
    }
}
