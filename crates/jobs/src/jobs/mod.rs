mod tick;

pub use tick::{TickError, TickJob, TickReport, process_tick_job, run_tick, spawn_tick_job};
