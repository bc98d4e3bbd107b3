//! CLI argument parsing for the read-out binary.

use std::path::PathBuf;

use clap::Parser;
use recorder::RunConfig;
use types::DedupPolicy;

/// Detector read-out and event-record pipeline
#[derive(Parser, Debug)]
#[command(name = "detector-sim")]
#[command(about = "Simulated detector read-out with multi-worker shard output")]
#[command(version)]
pub struct Args {
    /// Total events to process
    #[arg(long, default_value_t = 1000, env = "DET_EVENTS")]
    pub events: u64,

    /// Worker threads (0 = one per available core)
    #[arg(long, default_value_t = 0, env = "DET_THREADS")]
    pub threads: usize,

    /// Veto energy threshold in MeV; deposits at or below are not emitted
    #[arg(long, default_value_t = 0.0)]
    pub veto_threshold: f64,

    /// Calorimeter energy threshold in MeV
    #[arg(long, default_value_t = 0.0)]
    pub crystal_threshold: f64,

    /// Record optical boundary-crossing hits in the fiber planes
    #[arg(long)]
    pub use_optics: bool,

    /// Merge deposits per volume instance instead of per (volume, track)
    #[arg(long)]
    pub merge_tracks: bool,

    /// Output directory for the database, shards, and merged CSV files
    #[arg(long, default_value = "out", env = "DET_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Base name for run-level outputs
    #[arg(long, default_value = "detector")]
    pub stem: String,

    /// Base random seed for the synthetic flux
    #[arg(long, default_value_t = 42, env = "DET_SEED")]
    pub seed: u64,
}

impl Args {
    pub fn run_config(&self) -> RunConfig {
        let defaults = RunConfig::default();
        RunConfig {
            events: self.events,
            workers: if self.threads == 0 {
                defaults.workers
            } else {
                self.threads
            },
            veto_threshold_mev: self.veto_threshold,
            crystal_threshold_mev: self.crystal_threshold,
            track_optics: self.use_optics,
            dedup: if self.merge_tracks {
                DedupPolicy::PerVolume
            } else {
                DedupPolicy::PerVolumeTrack
            },
            output_dir: self.output_dir.clone(),
            file_stem: self.stem.clone(),
        }
    }
}
