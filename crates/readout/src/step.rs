//! Per-step context delivered by the transport engine.

use smallvec::SmallVec;

use types::{Pdg, PlacementId, RegionId, TrackId, Vec3};

/// One level of the volume-placement ancestry enclosing a step's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathNode {
    pub placement: PlacementId,
    pub copy_no: i32,
}

/// Ordered ancestry, deepest (struck) volume first. Stays inline for the
/// nesting depths real geometries produce.
pub type VolumePath = SmallVec<[PathNode; 8]>;

/// Everything the collector needs to know about one simulated step.
///
/// The caller resolves the sensitive region and transforms the position into
/// the struck volume's local frame; for boundary-crossing optical steps the
/// path describes the post-step point, otherwise the pre-step point.
#[derive(Debug, Clone)]
pub struct StepContext {
    /// Sensitive region owning the step, or `None` for a non-sensitive step.
    pub region: Option<RegionId>,
    /// Energy deposited by this step, MeV. May be zero.
    pub edep_mev: f64,
    /// Pre-step global time, ns.
    pub time_ns: f64,
    /// Volume ancestry, deepest first.
    pub path: VolumePath,
    /// Step position in the struck volume's local frame, mm.
    pub local_pos_mm: Vec3,
    pub particle: String,
    pub pdg: Pdg,
    pub track_id: TrackId,
    pub parent_track_id: TrackId,
    /// True for an optical-photon carrier.
    pub is_optical_photon: bool,
    /// True when the post-step point lies exactly on a geometric boundary.
    pub on_boundary: bool,
}

impl StepContext {
    /// Copy number of the struck (deepest) volume, or the unknown sentinel
    /// for a step with no ancestry at all.
    pub fn copy_no(&self) -> i32 {
        self.path
            .first()
            .map_or(types::UNKNOWN_INDEX, |n| n.copy_no)
    }
}
