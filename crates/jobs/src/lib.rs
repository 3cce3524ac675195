//! Tick orchestration: pick the pull request, compare the tracked file, notify.
//!
//! Ticks hold no state between runs. A changed pull request that stays the most
//! recently updated one is reported again on every tick.

mod jobs;
pub mod notify;

pub use jobs::{TickError, TickJob, TickReport, process_tick_job, run_tick, spawn_tick_job};
