//! The dual persistence sink.

use std::path::Path;
use std::sync::Arc;

use recorder::RowSink;
use tracing::error;
use types::{
    EventId, EventSummary, Hit, InteractionRecord, PrimaryRecord, RegionTable, SecondaryRecord,
    UNKNOWN_INDEX,
};

use crate::shard::ShardSet;
use crate::store::SqliteStore;

/// Routes every emitted row to both backends: the shared sqlite ntuple store
/// and this worker's CSV shards.
///
/// One `DualSink` per worker. The sqlite connection is shared and internally
/// locked; the shard files are exclusively this worker's until the run-end
/// merge. A failed sqlite insert is logged and dropped, matching the
/// shard-stream policy: output trouble never stops the event loop.
pub struct DualSink {
    store: Arc<SqliteStore>,
    shards: ShardSet,
    regions: Arc<RegionTable>,
}

impl DualSink {
    pub fn new(
        store: Arc<SqliteStore>,
        regions: Arc<RegionTable>,
        dir: &Path,
        segment: &str,
    ) -> Self {
        let shards = ShardSet::create(dir, segment, &regions);
        Self {
            store,
            shards,
            regions,
        }
    }
}

impl RowSink for DualSink {
    fn primary(&mut self, event: EventId, rec: &PrimaryRecord) {
        if let Err(e) = self.store.fill_primary_row(event, rec) {
            error!(event, error = %e, "primary ntuple insert failed");
        }
        self.shards.primaries.write_row(format_args!(
            "{},{},{:.6},{:.6},{:.6},{:.6}",
            event, rec.name, rec.energy_mev, rec.dir.x, rec.dir.y, rec.dir.z,
        ));
    }

    fn interaction(&mut self, event: EventId, rec: &InteractionRecord) {
        if let Err(e) = self.store.fill_interaction_row(event, rec) {
            error!(event, error = %e, "interaction ntuple insert failed");
        }
    }

    fn secondary(&mut self, event: EventId, rec: &SecondaryRecord) {
        self.shards.secondaries.write_row(format_args!(
            "{},{},{},{},{},{},{},{},{},{:.6},{:.6},{:.6},{:.6},{:.3}",
            event,
            rec.track_id.0,
            rec.parent_track_id.0,
            rec.parent_pdg,
            rec.parent_name,
            rec.process,
            rec.birth_volume,
            rec.name,
            rec.pdg,
            rec.energy_mev,
            rec.dir.x,
            rec.dir.y,
            rec.dir.z,
            rec.t0_ns,
        ));
    }

    fn hit(&mut self, event: EventId, hit: &Hit) {
        let det_name = self.regions
            .get(hit.region)
            .map(|def| def.name.clone())
            .unwrap_or_else(|| "unknown".to_string());

        if let Err(e) = self.store.fill_hit_row(event, &det_name, hit) {
            error!(event, error = %e, "hit ntuple insert failed");
        }

        // Fiber and crystal address columns carry sentinels when the hit
        // belongs to neither detector kind.
        let plane = hit
            .fiber
            .map_or_else(|| UNKNOWN_INDEX.to_string(), |f| f.plane.to_string());
        let (module_id, layer_id, row_id) = hit
            .fiber
            .map_or((UNKNOWN_INDEX, UNKNOWN_INDEX, UNKNOWN_INDEX), |f| {
                (f.module, f.layer, f.row)
            });
        let (crystal_ix, crystal_iy) = hit
            .crystal
            .map_or((UNKNOWN_INDEX, UNKNOWN_INDEX), |c| (c.ix, c.iy));

        self.shards.hits.write_row(format_args!(
            "{},{},{},{},{},{},{},{},{},{:.6},{},{},{},{},{},{}",
            event,
            hit.track_id.0,
            hit.parent_track_id.0,
            hit.is_secondary() as u8,
            hit.particle,
            hit.pdg,
            hit.region.0,
            det_name,
            hit.copy_no,
            hit.edep_mev,
            plane,
            module_id,
            layer_id,
            row_id,
            crystal_ix,
            crystal_iy,
        ));

        if let Some(fiber) = hit.fiber {
            self.shards.fibers.write_row(format_args!(
                "{},{},{},{},{},{},{},{:.6},{:.3}",
                event,
                hit.particle,
                fiber.plane,
                fiber.module,
                fiber.layer,
                fiber.row,
                hit.copy_no,
                hit.edep_mev,
                hit.t_ns,
            ));
        }

        if let Some(crystal) = hit.crystal {
            self.shards.crystals.write_row(format_args!(
                "{},{},{},{},{:.6},{:.3},{}",
                event, hit.copy_no, crystal.ix, crystal.iy, hit.edep_mev, hit.t_ns, hit.particle,
            ));
        }
    }

    fn energy_summary(&mut self, event: EventId, per_region_mev: &[f64], total_mev: f64) {
        // Column order matches the header: veto first, then the remaining
        // regions in table order, then the total.
        let mut row = format!("{event}");
        if let Some(veto_ord) = self.regions.ordinal(self.regions.veto) {
            row.push_str(&format!(",{:.6}", per_region_mev[veto_ord]));
        }
        for (ord, def) in self.regions.iter().enumerate() {
            if def.id != self.regions.veto {
                row.push_str(&format!(",{:.6}", per_region_mev[ord]));
            }
        }
        row.push_str(&format!(",{total_mev:.6}"));
        self.shards.edep.write_row(format_args!("{row}"));
    }

    fn event_summary(&mut self, summary: &EventSummary) {
        if let Err(e) = self.store.fill_event_row(summary) {
            error!(event = summary.event_id, error = %e, "event ntuple insert failed");
        }
    }

    fn finish(&mut self) {
        self.shards.flush();
    }
}
