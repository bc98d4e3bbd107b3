//! Hit aggregation core: per-step deduplication into per-event hits.
//!
//! The transport engine delivers one [`StepContext`] per simulated step; the
//! [`StepCollector`] resolves the step's sensitive region, computes a
//! collision-resistant [`HitKey`] over the volume-placement ancestry, and
//! merges the step into the event's [`HitStore`]. Nothing in this crate
//! touches a sink or another thread: one collector, one store, one worker.

mod collector;
mod hit_key;
mod hit_store;
mod step;

pub use collector::{ModuleResolver, NoModules, StepCollector};
pub use hit_key::HitKey;
pub use hit_store::HitStore;
pub use step::{PathNode, StepContext, VolumePath};
