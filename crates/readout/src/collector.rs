//! Per-step collection into the event's hit store.

use std::sync::Arc;

use types::{
    DedupPolicy, Hit, RegionKind, RegionTable, decode_crystal, decode_fiber,
};

use crate::{HitKey, HitStore, PathNode, StepContext};

/// Geometry boundary: given a volume ancestry, recover the fiber-module
/// index, if any ancestor is the module container.
pub trait ModuleResolver: Send + Sync {
    fn module_index(&self, path: &[PathNode]) -> Option<i32>;
}

/// Resolver for geometries without fiber modules.
#[derive(Debug, Default)]
pub struct NoModules;

impl ModuleResolver for NoModules {
    fn module_index(&self, _path: &[PathNode]) -> Option<i32> {
        None
    }
}

impl<F> ModuleResolver for F
where
    F: Fn(&[PathNode]) -> Option<i32> + Send + Sync,
{
    fn module_index(&self, path: &[PathNode]) -> Option<i32> {
        self(path)
    }
}

/// Receives one step at a time from the transport engine and folds it into
/// the per-event [`HitStore`]. Mutates the store only; never touches a sink.
pub struct StepCollector {
    regions: Arc<RegionTable>,
    policy: DedupPolicy,
    /// Gates optical boundary-crossing collection for the whole run.
    track_optics: bool,
    modules: Arc<dyn ModuleResolver>,
    store: HitStore,
}

impl StepCollector {
    pub fn new(
        regions: Arc<RegionTable>,
        policy: DedupPolicy,
        track_optics: bool,
        modules: Arc<dyn ModuleResolver>,
    ) -> Self {
        Self {
            regions,
            policy,
            track_optics,
            modules,
            store: HitStore::new(),
        }
    }

    /// Handle one step notification. Total from the engine's point of view:
    /// always returns control, never escalates.
    pub fn on_step(&mut self, ctx: &StepContext) {
        let Some(region) = ctx.region else { return };
        // Unregistered region tags are tolerated: not a sensitive step.
        let Some(def) = self.regions.get(region) else { return };

        if ctx.is_optical_photon && def.optics && self.track_optics {
            if ctx.on_boundary {
                self.record_optical(ctx);
            }
            return;
        }

        if ctx.edep_mev <= 0.0 {
            return;
        }

        let copy_no = ctx.copy_no();
        let key = match self.policy {
            DedupPolicy::PerVolume => HitKey::per_volume(region, copy_no),
            DedupPolicy::PerVolumeTrack => HitKey::per_track(region, &ctx.path, ctx.track_id),
        };

        let kind = def.kind;
        let modules = Arc::clone(&self.modules);
        let hit = self.store.find_or_create(key, region, copy_no);

        hit.edep_mev += ctx.edep_mev;
        hit.t_min_ns = hit.t_min_ns.min(ctx.time_ns);

        // Last write wins for everything positional and identifying.
        hit.t_ns = ctx.time_ns;
        hit.pos_local_mm = ctx.local_pos_mm;
        hit.particle.clone_from(&ctx.particle);
        hit.pdg = ctx.pdg;
        hit.track_id = ctx.track_id;
        hit.parent_track_id = ctx.parent_track_id;

        // Addresses decode once, at first contact.
        match kind {
            RegionKind::Deposit => {}
            RegionKind::FiberPlane { plane, copy_offset } => {
                if hit.fiber.is_none() {
                    let mut addr = decode_fiber(copy_no, plane, copy_offset);
                    if let Some(module) = modules.module_index(&ctx.path) {
                        addr.module = module;
                    }
                    hit.fiber = Some(addr);
                }
            }
            RegionKind::CrystalGrid { .. } => {
                if hit.crystal.is_none() {
                    hit.crystal = Some(decode_crystal(copy_no));
                }
            }
        }
    }

    /// Boundary-crossing optical hit: appended unconditionally, no
    /// deduplication, no threshold at any stage.
    fn record_optical(&mut self, ctx: &StepContext) {
        let region = match ctx.region {
            Some(r) => r,
            None => return,
        };
        let mut hit = Hit::new(region, ctx.copy_no());
        hit.is_optical = true;
        hit.t_min_ns = ctx.time_ns;
        hit.t_ns = ctx.time_ns;
        hit.pos_local_mm = ctx.local_pos_mm;
        hit.particle.clone_from(&ctx.particle);
        hit.pdg = ctx.pdg;
        hit.track_id = ctx.track_id;
        hit.parent_track_id = ctx.parent_track_id;
        self.store.append(hit);
    }

    pub fn store(&self) -> &HitStore {
        &self.store
    }

    /// Drop all hits for the finished event.
    pub fn clear(&mut self) {
        self.store.clear();
    }
}
