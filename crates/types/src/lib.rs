//! Core types for the detector read-out pipeline.
//!
//! This crate provides all shared data types used across the pipeline:
//! identifier newtypes, per-event records (hits, primaries, interactions,
//! secondaries), the sensitive-region configuration table, and the pure
//! copy-number decode functions for fiber and crystal addressing.

use serde::{Deserialize, Serialize};

mod address;
mod ids;
mod records;
mod region;

pub use address::{CrystalIndex, FiberAddress, Plane, decode_crystal, decode_fiber};
pub use ids::{EventId, Pdg, PlacementId, RegionId, TrackId};
pub use records::{
    EventSummary, Hit, InteractionRecord, PrimaryRecord, RunCounters, SecondaryRecord,
    is_retained_process,
};
pub use region::{DedupPolicy, RegionDef, RegionKind, RegionTable};

// =============================================================================
// Constants
// =============================================================================

/// Copy-number offset distinguishing the Y fiber plane from the X plane.
pub const FIBER_Y_COPY_OFFSET: i32 = 50_000;

/// Copy-number stride separating fiber layers (`copy = layer * 1000 + row`).
pub const FIBER_LAYER_STRIDE: i32 = 1_000;

/// Copy-number stride for calorimeter crystals (`copy = ix * 10 + iy`).
pub const CRYSTAL_GRID_STRIDE: i32 = 10;

/// Sentinel for an index that could not be decoded.
pub const UNKNOWN_INDEX: i32 = -1;

// =============================================================================
// Geometry vector
// =============================================================================

/// A plain 3-vector in detector-local coordinates (mm for positions,
/// dimensionless for directions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}
