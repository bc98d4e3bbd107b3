//! Per-event and per-run record types.

use derive_more::{Add, AddAssign, Sum};
use serde::{Deserialize, Serialize};

use crate::{CrystalIndex, EventId, FiberAddress, Pdg, RegionId, TrackId, Vec3};

/// Processes whose interaction records survive the drain filter:
/// Compton scatter, photoelectric absorption, pair production.
pub const RETAINED_PROCESSES: [&str; 3] = ["compt", "phot", "conv"];

/// Whether an interaction's process is one of the retained kinds.
pub fn is_retained_process(process: &str) -> bool {
    RETAINED_PROCESSES.contains(&process)
}

// =============================================================================
// Hit
// =============================================================================

/// Aggregated energy deposit in one physical-volume instance, for one event.
///
/// Deposit accumulates and the minimum time monotonically decreases as steps
/// merge in; position, species, and track metadata are last-write-wins by
/// design. Fiber and crystal addresses are decoded once, at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    pub region: RegionId,
    pub copy_no: i32,
    /// Accumulated deposit, MeV. Non-negative, monotonically increasing.
    pub edep_mev: f64,
    /// Earliest step time seen, ns. The first particle wins the timestamp.
    pub t_min_ns: f64,
    /// Time of the last-processed step, ns.
    pub t_ns: f64,
    /// Local position of the last-processed step, mm.
    pub pos_local_mm: Vec3,
    pub particle: String,
    pub pdg: Pdg,
    pub track_id: TrackId,
    pub parent_track_id: TrackId,
    /// Set for optical boundary-crossing hits, which are never deduplicated
    /// and bypass drain-time thresholds.
    pub is_optical: bool,
    pub fiber: Option<FiberAddress>,
    pub crystal: Option<CrystalIndex>,
}

impl Hit {
    /// A freshly zero-valued hit for the given volume instance.
    pub fn new(region: RegionId, copy_no: i32) -> Self {
        Self {
            region,
            copy_no,
            edep_mev: 0.0,
            t_min_ns: f64::INFINITY,
            t_ns: 0.0,
            pos_local_mm: Vec3::ZERO,
            particle: String::new(),
            pdg: 0,
            track_id: TrackId(0),
            parent_track_id: TrackId(0),
            is_optical: false,
            fiber: None,
            crystal: None,
        }
    }

    /// A hit whose parent track is non-zero belongs to a secondary particle.
    pub fn is_secondary(&self) -> bool {
        self.parent_track_id.0 > 0
    }
}

// =============================================================================
// Event-scoped records
// =============================================================================

/// One simulated source particle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryRecord {
    /// Event-local sequence index.
    pub index: i32,
    pub name: String,
    pub pdg: Pdg,
    pub energy_mev: f64,
    pub dir: Vec3,
    pub pos_mm: Vec3,
    pub t0_ns: f64,
}

/// One noteworthy scattering/absorption of a tracked particle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub track_id: TrackId,
    pub parent_track_id: TrackId,
    /// Transport-engine process name ("compt", "phot", "conv", ...).
    pub process: String,
    pub volume: String,
    pub pos_mm: Vec3,
    /// Kinetic energy of the first secondary produced, MeV (0 if none).
    pub secondary_energy_mev: f64,
}

/// One particle newly created during a step. Captured unfiltered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryRecord {
    pub track_id: TrackId,
    pub parent_track_id: TrackId,
    pub parent_name: String,
    pub parent_pdg: Pdg,
    pub process: String,
    pub birth_volume: String,
    pub name: String,
    pub pdg: Pdg,
    pub energy_mev: f64,
    pub dir: Vec3,
    pub t0_ns: f64,
}

/// Per-event rollup emitted once per drained event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EventSummary {
    pub event_id: EventId,
    pub n_primaries: i32,
    pub n_hits: i32,
}

// =============================================================================
// Run counters
// =============================================================================

/// Cross-worker scalar counters, accumulated independently per worker and
/// combined by summation at run end.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Add, AddAssign, Sum,
)]
pub struct RunCounters {
    /// Events with an absorber signal and no veto signal.
    pub crystal_only: u64,
    /// Events with both a veto signal and an absorber signal.
    pub crystal_and_veto: u64,
}

impl RunCounters {
    /// Commutative, associative merge of per-worker counters.
    pub fn merge(self, other: RunCounters) -> RunCounters {
        self + other
    }
}
