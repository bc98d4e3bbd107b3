//! Detector read-out pipeline - main binary
//!
//! Drives the synthetic flux through the full pipeline: worker threads each
//! own an event recorder and a dual sink (shared sqlite ntuple store plus
//! per-worker CSV shards); after the join barrier the main thread merges the
//! shards and writes the run summary.

mod config;
mod geometry;
mod source;

use std::fs;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use recorder::{RunConfig, RunOutcome, run_events};
use storage::{DualSink, SqliteStore, merge_all};
use tracing::info;
use types::RegionTable;

use crate::config::Args;
use crate::geometry::ToyGeometry;
use crate::source::FluxSource;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cfg = args.run_config();

    fs::create_dir_all(&cfg.output_dir).with_context(|| {
        format!("creating output directory {}", cfg.output_dir.display())
    })?;

    let db_path = cfg.output_dir.join(format!("{}.sqlite", cfg.file_stem));
    let store = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("opening ntuple store {}", db_path.display()))?,
    );

    let regions = Arc::new(RegionTable::standard());
    let geometry = ToyGeometry::default();
    let source = FluxSource::new(geometry, args.seed);

    let start = Instant::now();
    let outcome = {
        let store = Arc::clone(&store);
        let regions_for_sinks = Arc::clone(&regions);
        let dir = cfg.output_dir.clone();
        run_events(
            &cfg,
            Arc::clone(&regions),
            Arc::new(geometry),
            &source,
            move |worker| {
                Box::new(DualSink::new(
                    Arc::clone(&store),
                    Arc::clone(&regions_for_sinks),
                    &dir,
                    &worker.to_string(),
                ))
            },
        )
    };
    let elapsed = start.elapsed();

    // Shards are closed once every worker has joined; merge single-threaded.
    let merged = merge_all(&cfg.output_dir);

    write_summary(&cfg, &outcome)?;

    info!(
        events = outcome.events,
        elapsed_s = format!("{:.2}", elapsed.as_secs_f64()),
        merged_tables = merged,
        crystal_only = outcome.counters.crystal_only,
        crystal_and_veto = outcome.counters.crystal_and_veto,
        hits = store.count("hits").unwrap_or(-1),
        "run finished"
    );

    Ok(())
}

/// Write `info_<stem>.txt` next to the data files.
fn write_summary(cfg: &RunConfig, outcome: &RunOutcome) -> anyhow::Result<()> {
    let path = cfg.output_dir.join(format!("info_{}.txt", cfg.file_stem));
    let mut file = fs::File::create(&path)
        .with_context(|| format!("creating run summary {}", path.display()))?;
    writeln!(file, "events: {}", outcome.events)?;
    writeln!(file, "workers: {}", cfg.workers)?;
    writeln!(file, "veto_threshold_MeV: {}", cfg.veto_threshold_mev)?;
    writeln!(file, "crystal_threshold_MeV: {}", cfg.crystal_threshold_mev)?;
    writeln!(file, "track_optics: {}", cfg.track_optics)?;
    writeln!(file, "dedup_policy: {:?}", cfg.dedup)?;
    writeln!(file, "crystal_only: {}", outcome.counters.crystal_only)?;
    writeln!(file, "crystal_and_veto: {}", outcome.counters.crystal_and_veto)?;
    Ok(())
}
