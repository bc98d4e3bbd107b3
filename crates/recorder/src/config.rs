//! Run configuration consumed by the recorder and runner.

use std::path::PathBuf;

use types::DedupPolicy;

/// Parameters of one read-out run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Total events to process across all workers.
    pub events: u64,
    /// Worker thread count (degree of parallelism).
    pub workers: usize,
    /// Veto deposits at or below this threshold are not emitted as hit rows.
    pub veto_threshold_mev: f64,
    /// Calorimeter deposits at or below this threshold are not emitted.
    pub crystal_threshold_mev: f64,
    /// Whether optical boundary-crossing hits are tracked at all.
    pub track_optics: bool,
    /// Hit identity policy, applied uniformly to every region.
    pub dedup: DedupPolicy,
    /// Directory receiving shard files and merged outputs.
    pub output_dir: PathBuf,
    /// Base name for run-level outputs (structured store file, summary).
    pub file_stem: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            events: 1_000,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            veto_threshold_mev: 0.0,
            crystal_threshold_mev: 0.0,
            track_optics: false,
            dedup: DedupPolicy::default(),
            output_dir: PathBuf::from("out"),
            file_stem: "detector".to_string(),
        }
    }
}

impl RunConfig {
    /// Events assigned to worker `w`: a contiguous id range, the last worker
    /// absorbing the remainder.
    pub fn event_range(&self, worker: usize) -> std::ops::Range<u64> {
        let workers = self.workers.max(1) as u64;
        let chunk = self.events.div_ceil(workers);
        let start = chunk * worker as u64;
        let end = (start + chunk).min(self.events);
        start.min(self.events)..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ranges_cover_all_events_disjointly() {
        let cfg = RunConfig {
            events: 10,
            workers: 3,
            ..RunConfig::default()
        };
        let ranges: Vec<_> = (0..3).map(|w| cfg.event_range(w)).collect();
        assert_eq!(ranges[0], 0..4);
        assert_eq!(ranges[1], 4..8);
        assert_eq!(ranges[2], 8..10);
    }

    #[test]
    fn surplus_workers_get_empty_ranges() {
        let cfg = RunConfig {
            events: 2,
            workers: 4,
            ..RunConfig::default()
        };
        assert_eq!(cfg.event_range(0), 0..1);
        assert_eq!(cfg.event_range(3), 2..2);
    }
}
