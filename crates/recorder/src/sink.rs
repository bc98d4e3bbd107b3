//! Row emission boundary.
//!
//! The recorder emits rows through this trait and knows nothing about
//! backends. The production implementation (sqlite ntuples plus per-worker
//! CSV shards) lives in the `storage` crate; [`MemSink`] and [`NullSink`]
//! exist for tests.

use types::{EventId, EventSummary, Hit, InteractionRecord, PrimaryRecord, SecondaryRecord};

/// Append-only row sink, one instance per worker.
///
/// Implementations that share a backing store across workers must provide
/// their own thread-safety; the recorder itself never shares a sink.
pub trait RowSink: Send {
    fn primary(&mut self, event: EventId, rec: &PrimaryRecord);
    fn interaction(&mut self, event: EventId, rec: &InteractionRecord);
    fn secondary(&mut self, event: EventId, rec: &SecondaryRecord);
    fn hit(&mut self, event: EventId, hit: &Hit);
    /// Per-event deposit totals for every configured region, in region-table
    /// order, plus their sum. Always emitted, thresholds notwithstanding.
    fn energy_summary(&mut self, event: EventId, per_region_mev: &[f64], total_mev: f64);
    fn event_summary(&mut self, summary: &EventSummary);
    /// Flush any buffered output. Called once per worker at run end.
    fn finish(&mut self) {}
}

impl<T: RowSink + ?Sized> RowSink for Box<T> {
    fn primary(&mut self, event: EventId, rec: &PrimaryRecord) {
        (**self).primary(event, rec);
    }

    fn interaction(&mut self, event: EventId, rec: &InteractionRecord) {
        (**self).interaction(event, rec);
    }

    fn secondary(&mut self, event: EventId, rec: &SecondaryRecord) {
        (**self).secondary(event, rec);
    }

    fn hit(&mut self, event: EventId, hit: &Hit) {
        (**self).hit(event, hit);
    }

    fn energy_summary(&mut self, event: EventId, per_region_mev: &[f64], total_mev: f64) {
        (**self).energy_summary(event, per_region_mev, total_mev);
    }

    fn event_summary(&mut self, summary: &EventSummary) {
        (**self).event_summary(summary);
    }

    fn finish(&mut self) {
        (**self).finish();
    }
}

/// A sink that drops everything. Useful for benchmarks and wiring tests.
#[derive(Debug, Default)]
pub struct NullSink;

impl RowSink for NullSink {
    fn primary(&mut self, _event: EventId, _rec: &PrimaryRecord) {}
    fn interaction(&mut self, _event: EventId, _rec: &InteractionRecord) {}
    fn secondary(&mut self, _event: EventId, _rec: &SecondaryRecord) {}
    fn hit(&mut self, _event: EventId, _hit: &Hit) {}
    fn energy_summary(&mut self, _event: EventId, _per_region_mev: &[f64], _total_mev: f64) {}
    fn event_summary(&mut self, _summary: &EventSummary) {}
}

/// In-memory sink capturing every emitted row, in emission order.
#[derive(Debug, Default)]
pub struct MemSink {
    pub primaries: Vec<(EventId, PrimaryRecord)>,
    pub interactions: Vec<(EventId, InteractionRecord)>,
    pub secondaries: Vec<(EventId, SecondaryRecord)>,
    pub hits: Vec<(EventId, Hit)>,
    pub energy_summaries: Vec<(EventId, Vec<f64>, f64)>,
    pub event_summaries: Vec<EventSummary>,
    pub finished: bool,
}

impl MemSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowSink for MemSink {
    fn primary(&mut self, event: EventId, rec: &PrimaryRecord) {
        self.primaries.push((event, rec.clone()));
    }

    fn interaction(&mut self, event: EventId, rec: &InteractionRecord) {
        self.interactions.push((event, rec.clone()));
    }

    fn secondary(&mut self, event: EventId, rec: &SecondaryRecord) {
        self.secondaries.push((event, rec.clone()));
    }

    fn hit(&mut self, event: EventId, hit: &Hit) {
        self.hits.push((event, hit.clone()));
    }

    fn energy_summary(&mut self, event: EventId, per_region_mev: &[f64], total_mev: f64) {
        self.energy_summaries
            .push((event, per_region_mev.to_vec(), total_mev));
    }

    fn event_summary(&mut self, summary: &EventSummary) {
        self.event_summaries.push(*summary);
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}
