//! Multi-worker event loop.
//!
//! Events are partitioned into contiguous per-worker ranges so every worker
//! owns a disjoint slice of event ids. Each worker drives its own recorder
//! and sink; the only cross-worker merge is the summation of run counters
//! after the join barrier.

use std::sync::Arc;
use std::thread;

use readout::ModuleResolver;
use tracing::{debug, info};
use types::{EventId, RegionTable, RunCounters};

use crate::{EventRecorder, RowSink, RunConfig};

/// Fills one event with primaries, step notifications, and optional
/// interaction and secondary records. Called between `begin_event` and
/// `end_event`; implementations must not call either themselves.
pub trait EventSource: Sync {
    fn fill_event(
        &self,
        worker: usize,
        event_id: EventId,
        recorder: &mut EventRecorder<Box<dyn RowSink>>,
    );
}

/// Result of a completed run.
#[derive(Debug, Clone, Copy)]
pub struct RunOutcome {
    /// Events actually processed across all workers.
    pub events: u64,
    pub counters: RunCounters,
}

/// Run `cfg.events` events across `cfg.workers` worker threads.
///
/// `make_sink` is invoked once per worker, on the worker's own thread, so a
/// sink may hold non-`Sync` state such as open file handles. Workers with an
/// empty event range still open and finish a sink.
pub fn run_events(
    cfg: &RunConfig,
    regions: Arc<RegionTable>,
    modules: Arc<dyn ModuleResolver>,
    source: &dyn EventSource,
    make_sink: impl Fn(usize) -> Box<dyn RowSink> + Sync,
) -> RunOutcome {
    info!(events = cfg.events, workers = cfg.workers, "starting run");

    let counters = thread::scope(|scope| {
        let handles: Vec<_> = (0..cfg.workers)
            .map(|worker| {
                let regions = Arc::clone(&regions);
                let modules = Arc::clone(&modules);
                let make_sink = &make_sink;
                scope.spawn(move || {
                    run_worker(cfg, worker, regions, modules, source, make_sink(worker))
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker panicked"))
            .sum::<RunCounters>()
    });

    info!(
        crystal_only = counters.crystal_only,
        crystal_and_veto = counters.crystal_and_veto,
        "run complete"
    );

    RunOutcome {
        events: cfg.events,
        counters,
    }
}

fn run_worker(
    cfg: &RunConfig,
    worker: usize,
    regions: Arc<RegionTable>,
    modules: Arc<dyn ModuleResolver>,
    source: &dyn EventSource,
    sink: Box<dyn RowSink>,
) -> RunCounters {
    let range = cfg.event_range(worker);
    debug!(worker, start = range.start, end = range.end, "worker range");

    let mut recorder = EventRecorder::new(cfg, regions, modules, sink);
    for event_id in range {
        recorder.begin_event(event_id);
        source.fill_event(worker, event_id, &mut recorder);
        recorder.end_event();
    }
    recorder.finish()
}
