//! Per-worker solve context and progress reporting.
//!
//! Modules:
//! - [`worker_context`]: the `WorkerContext` state machine that drives sweeps and exchanges.
//! - [`progress`]: sinks for the periodic `Iteration {n}` report.

pub mod progress;
pub mod worker_context;

pub use progress::{LogProgress, NoProgress, StdoutProgress};
pub use worker_context::{Phase, WorkerContext, PROGRESS_INTERVAL};
