//! Event recording: per-event buffers, thresholded drain, worker runner.
//!
//! The [`EventRecorder`] owns everything event-scoped on one worker: the hit
//! store (via its step collector), the primary/interaction/secondary buffers,
//! and the two run counters. At end of event it drains, in a fixed order,
//! into an injected [`RowSink`] — never into global state, so tests can
//! substitute an in-memory sink.

mod config;
mod recorder;
mod runner;
mod sink;

pub use config::RunConfig;
pub use recorder::EventRecorder;
pub use runner::{EventSource, RunOutcome, run_events};
pub use sink::{MemSink, NullSink, RowSink};
