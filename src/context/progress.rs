//! Progress sinks for the solve loop.
//!
//! The loop calls [`ProgressSink::report`] every
//! [`PROGRESS_INTERVAL`](super::worker_context::PROGRESS_INTERVAL)
//! iterations, starting at iteration 0. Reporting never affects the result.

use crate::core::traits::ProgressSink;

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _rank: usize, _iteration: usize) {}
}

/// Logs `Iteration {n}` at info level, tagged with the worker rank.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, rank: usize, iteration: usize) {
        log::info!("[rank {rank}] Iteration {iteration}");
    }
}

/// Prints `Iteration {n}` on stdout, from rank 0 only.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutProgress;

impl ProgressSink for StdoutProgress {
    fn report(&mut self, rank: usize, iteration: usize) {
        if rank == 0 {
            println!("Iteration {iteration}");
        }
    }
}

/// Records the reported iteration numbers.
impl ProgressSink for Vec<usize> {
    fn report(&mut self, _rank: usize, iteration: usize) {
        self.push(iteration);
    }
}
