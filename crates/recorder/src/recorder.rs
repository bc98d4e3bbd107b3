//! Per-event record buffering and thresholded drain.

use std::sync::Arc;

use readout::{ModuleResolver, StepCollector, StepContext};
use types::{
    EventId, EventSummary, InteractionRecord, PrimaryRecord, RegionTable, RunCounters,
    SecondaryRecord, is_retained_process,
};

use crate::{RowSink, RunConfig};

/// Owns all event-scoped state on one worker and drains it into the sink at
/// end of event. Events on a worker are strictly sequential: `begin_event`,
/// any number of appends and step notifications, then `end_event`.
pub struct EventRecorder<S: RowSink> {
    regions: Arc<RegionTable>,
    collector: StepCollector,
    veto_threshold_mev: f64,
    crystal_threshold_mev: f64,
    prim_buf: Vec<PrimaryRecord>,
    inter_buf: Vec<InteractionRecord>,
    sec_buf: Vec<SecondaryRecord>,
    counters: RunCounters,
    sink: S,
    event_id: EventId,
    has_crystal: bool,
    has_veto: bool,
}

impl<S: RowSink> EventRecorder<S> {
    pub fn new(
        cfg: &RunConfig,
        regions: Arc<RegionTable>,
        modules: Arc<dyn ModuleResolver>,
        sink: S,
    ) -> Self {
        let collector = StepCollector::new(
            Arc::clone(&regions),
            cfg.dedup,
            cfg.track_optics,
            modules,
        );
        Self {
            regions,
            collector,
            veto_threshold_mev: cfg.veto_threshold_mev,
            crystal_threshold_mev: cfg.crystal_threshold_mev,
            prim_buf: Vec::new(),
            inter_buf: Vec::new(),
            sec_buf: Vec::new(),
            counters: RunCounters::default(),
            sink,
            event_id: 0,
            has_crystal: false,
            has_veto: false,
        }
    }

    /// Open a new event: reset event-scoped counters and flags.
    pub fn begin_event(&mut self, event_id: EventId) {
        self.event_id = event_id;
        self.has_crystal = false;
        self.has_veto = false;
    }

    pub fn add_primary(&mut self, rec: PrimaryRecord) {
        self.prim_buf.push(rec);
    }

    pub fn add_interaction(&mut self, rec: InteractionRecord) {
        self.inter_buf.push(rec);
    }

    pub fn add_secondary(&mut self, rec: SecondaryRecord) {
        self.sec_buf.push(rec);
    }

    /// Route one step notification to the collector.
    pub fn on_step(&mut self, ctx: &StepContext) {
        self.collector.on_step(ctx);
    }

    /// Drain the event in fixed order: primaries, retained interactions,
    /// secondaries, thresholded hits, energy summary, event summary; then
    /// clear everything and fold the signal flags into the run counters.
    pub fn end_event(&mut self) {
        let event = self.event_id;

        let n_primaries = self.prim_buf.len() as i32;
        for rec in self.prim_buf.drain(..) {
            self.sink.primary(event, &rec);
        }

        for rec in self.inter_buf.drain(..) {
            if is_retained_process(&rec.process) {
                self.sink.interaction(event, &rec);
            }
        }

        for rec in self.sec_buf.drain(..) {
            self.sink.secondary(event, &rec);
        }

        let n_hits = self.drain_hits(event);

        self.sink.event_summary(&EventSummary {
            event_id: event,
            n_primaries,
            n_hits,
        });

        self.collector.clear();

        if self.has_crystal && !self.has_veto {
            self.counters.crystal_only += 1;
        }
        if self.has_crystal && self.has_veto {
            self.counters.crystal_and_veto += 1;
        }
    }

    fn drain_hits(&mut self, event: EventId) -> i32 {
        let mut per_region = vec![0.0f64; self.regions.len()];
        let mut n_hits = 0;

        for hit in self.collector.store().iter() {
            // Thresholds gate row emission, never the summary totals.
            if let Some(ord) = self.regions.ordinal(hit.region) {
                per_region[ord] += hit.edep_mev;
            }

            if !hit.is_optical {
                if hit.region == self.regions.veto && hit.edep_mev <= self.veto_threshold_mev {
                    continue;
                }
                if hit.region == self.regions.absorber
                    && hit.edep_mev <= self.crystal_threshold_mev
                {
                    continue;
                }
            }

            self.sink.hit(event, hit);
            n_hits += 1;

            if hit.edep_mev > 0.0 {
                if hit.region == self.regions.absorber {
                    self.has_crystal = true;
                } else if hit.region == self.regions.veto {
                    self.has_veto = true;
                }
            }
        }

        let total: f64 = per_region.iter().sum();
        self.sink.energy_summary(event, &per_region, total);

        n_hits
    }

    /// Run counters accumulated so far on this worker.
    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Flush the sink and hand back the worker's counters.
    pub fn finish(mut self) -> RunCounters {
        self.sink.finish();
        self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readout::{NoModules, PathNode};
    use smallvec::smallvec;
    use types::{PlacementId, RegionId, TrackId, Vec3};

    use crate::MemSink;

    fn recorder(veto_thr: f64, crystal_thr: f64) -> EventRecorder<MemSink> {
        let cfg = RunConfig {
            veto_threshold_mev: veto_thr,
            crystal_threshold_mev: crystal_thr,
            ..RunConfig::default()
        };
        EventRecorder::new(
            &cfg,
            Arc::new(RegionTable::standard()),
            Arc::new(NoModules),
            MemSink::new(),
        )
    }

    fn step(region: i32, copy_no: i32, edep: f64) -> StepContext {
        StepContext {
            region: Some(RegionId(region)),
            edep_mev: edep,
            time_ns: 1.0,
            path: smallvec![PathNode { placement: PlacementId(30), copy_no }],
            local_pos_mm: Vec3::ZERO,
            particle: "e-".into(),
            pdg: 11,
            track_id: TrackId(1),
            parent_track_id: TrackId(0),
            is_optical_photon: false,
            on_boundary: false,
        }
    }

    fn primary() -> PrimaryRecord {
        PrimaryRecord {
            index: 0,
            name: "gamma".into(),
            pdg: 22,
            energy_mev: 1.0,
            dir: Vec3::new(0.0, 0.0, -1.0),
            pos_mm: Vec3::ZERO,
            t0_ns: 0.0,
        }
    }

    #[test]
    fn bare_absorber_event_emits_exactly_one_hit_and_one_summary() {
        let mut rec = recorder(0.0, 0.0);
        rec.begin_event(7);
        rec.on_step(&step(6, 11, 2.5));
        rec.end_event();

        let sink = rec.sink();
        assert!(sink.primaries.is_empty());
        assert!(sink.interactions.is_empty());
        assert!(sink.secondaries.is_empty());
        assert_eq!(sink.hits.len(), 1);
        assert_eq!(sink.event_summaries.len(), 1);
        let summary = sink.event_summaries[0];
        assert_eq!(summary.event_id, 7);
        assert_eq!(summary.n_primaries, 0);
        assert_eq!(summary.n_hits, 1);
    }

    #[test]
    fn veto_hit_at_threshold_is_suppressed_but_summed() {
        let mut rec = recorder(0.3, 0.0);
        rec.begin_event(1);
        rec.on_step(&step(2, 0, 0.3)); // exactly at threshold
        rec.end_event();

        let sink = rec.sink();
        assert!(sink.hits.is_empty());
        assert_eq!(sink.event_summaries[0].n_hits, 0);

        let (_, per_region, total) = &sink.energy_summaries[0];
        let veto_ord = 2; // table order: TriggerTop, TriggerBottom, Veto, ...
        assert_eq!(per_region[veto_ord], 0.3);
        assert_eq!(*total, 0.3);
        // Suppressed hit never sets the veto flag.
        assert_eq!(rec.counters(), RunCounters::default());
    }

    #[test]
    fn interaction_filter_keeps_only_retained_processes() {
        let mut rec = recorder(0.0, 0.0);
        rec.begin_event(1);
        for process in ["compt", "eIoni", "phot", "msc", "conv"] {
            rec.add_interaction(InteractionRecord {
                track_id: TrackId(1),
                parent_track_id: TrackId(0),
                process: process.into(),
                volume: "CsICrystal_0_0PV".into(),
                pos_mm: Vec3::ZERO,
                secondary_energy_mev: 0.1,
            });
        }
        rec.end_event();

        let kept: Vec<&str> = rec
            .sink()
            .interactions
            .iter()
            .map(|(_, r)| r.process.as_str())
            .collect();
        assert_eq!(kept, vec!["compt", "phot", "conv"]);
    }

    #[test]
    fn counters_track_signal_combinations() {
        let mut rec = recorder(0.0, 0.0);

        // Absorber only.
        rec.begin_event(0);
        rec.on_step(&step(6, 11, 1.0));
        rec.end_event();

        // Both veto and absorber.
        rec.begin_event(1);
        rec.on_step(&step(6, 11, 1.0));
        rec.on_step(&step(2, 0, 0.5));
        rec.end_event();

        // Veto only: neither counter moves.
        rec.begin_event(2);
        rec.on_step(&step(2, 0, 0.5));
        rec.end_event();

        assert_eq!(
            rec.counters(),
            RunCounters {
                crystal_only: 1,
                crystal_and_veto: 1
            }
        );
    }

    #[test]
    fn buffers_and_store_are_cleared_between_events() {
        let mut rec = recorder(0.0, 0.0);
        rec.begin_event(0);
        rec.add_primary(primary());
        rec.on_step(&step(6, 11, 1.0));
        rec.end_event();

        rec.begin_event(1);
        rec.end_event();

        let sink = rec.sink();
        assert_eq!(sink.primaries.len(), 1);
        assert_eq!(sink.hits.len(), 1);
        assert_eq!(sink.event_summaries[1].n_primaries, 0);
        assert_eq!(sink.event_summaries[1].n_hits, 0);
        assert_eq!(sink.energy_summaries[1].2, 0.0);
    }

    #[test]
    fn drain_order_is_primaries_then_hits_then_summary() {
        let mut rec = recorder(0.0, 0.0);
        rec.begin_event(0);
        rec.add_primary(primary());
        rec.add_primary(primary());
        rec.on_step(&step(0, 3, 0.2));
        rec.on_step(&step(6, 11, 1.0));
        rec.end_event();

        let sink = rec.sink();
        assert_eq!(sink.primaries.len(), 2);
        // Hits drain in insertion order.
        assert_eq!(sink.hits[0].1.region, RegionId(0));
        assert_eq!(sink.hits[1].1.region, RegionId(6));
        assert_eq!(sink.event_summaries[0].n_primaries, 2);
        assert_eq!(sink.event_summaries[0].n_hits, 2);
    }
}
