//! Per-worker solve context and the fixed-iteration solve loop.
//!
//! A `WorkerContext` owns everything one worker needs: its partition, the
//! coefficient cache and the halo buffer. It moves through four phases:
//!
//! ```text
//! Uninitialized --prime--> Primed --step--> Iterating --finish--> Done
//! ```
//!
//! Each step is one Jacobi sweep followed by one ghost exchange, so the
//! next sweep always reads ghosts that reflect the neighbors' latest
//! values. There is no convergence test; the run stops after exactly
//! `n_iterations` steps.
//!
//! # Usage
//!
//! 1. Build a context with [`WorkerContext::for_comm`].
//! 2. Call [`WorkerContext::solve_context`] (or `prime`/`step`/`finish` by hand).
//! 3. Take the owned values with [`WorkerContext::into_result`].

use log::debug;

use crate::core::traits::ProgressSink;
use crate::domain::{HaloBuffer, Partition, Side};
use crate::error::OdeError;
use crate::parallel::Comm;
use crate::problem::{CoefficientCache, OdeProblem};
use crate::solver::{exchange_boundaries, relax};
use crate::utils::convergence::{local_residual_sq, SolveStats};

/// Iterations between two progress reports.
pub const PROGRESS_INTERVAL: usize = 10_000;

/// Lifecycle of a worker's solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Buffers allocated, coefficients not yet sampled.
    Uninitialized,
    /// Coefficient cache filled.
    Primed,
    /// At least one sweep done, more to go.
    Iterating,
    /// All iterations done; the owned values are the result.
    Done,
}

pub struct WorkerContext {
    /// Slice of the mesh owned by this worker
    pub partition: Partition,
    ode: OdeProblem,
    cache: Option<CoefficientCache>,
    halo: HaloBuffer,
    phase: Phase,
    iterations_done: usize,
}

impl WorkerContext {
    pub fn new(partition: Partition, ode: OdeProblem) -> Self {
        let halo = HaloBuffer::new(partition.owned_count);
        Self {
            partition,
            ode,
            cache: None,
            halo,
            phase: Phase::Uninitialized,
            iterations_done: 0,
        }
    }

    /// Context for the worker behind `comm`.
    pub fn for_comm<C: Comm + ?Sized>(comm: &C, ode: OdeProblem) -> Result<Self, OdeError> {
        let partition = Partition::new(comm.rank(), comm.size(), ode.n_steps)?;
        Ok(Self::new(partition, ode))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn iterations_done(&self) -> usize {
        self.iterations_done
    }

    pub fn halo(&self) -> &HaloBuffer {
        &self.halo
    }

    pub fn cache(&self) -> Option<&CoefficientCache> {
        self.cache.as_ref()
    }

    pub fn problem(&self) -> &OdeProblem {
        &self.ode
    }

    /// Sample `r` and `f` at the owned points.
    pub fn prime(&mut self) -> Result<(), OdeError> {
        if self.phase != Phase::Uninitialized {
            return Err(OdeError::InvalidState("coefficients already primed"));
        }
        debug!("{:?}", self.ode);
        debug!(
            "ctx: rank {} of {}, first index {}, {} points",
            self.partition.rank,
            self.partition.workers,
            self.partition.first_global_index,
            self.partition.owned_count
        );
        self.cache = Some(CoefficientCache::prime(&self.partition, &self.ode));
        self.phase = Phase::Primed;
        Ok(())
    }

    /// One round: sweep, then refresh the ghosts.
    pub fn step<C, P>(&mut self, comm: &C, progress: &mut P) -> Result<(), OdeError>
    where
        C: Comm + ?Sized,
        P: ProgressSink + ?Sized,
    {
        match self.phase {
            Phase::Primed | Phase::Iterating => {}
            Phase::Uninitialized => return Err(OdeError::InvalidState("step before prime")),
            Phase::Done => return Err(OdeError::InvalidState("step after finish")),
        }
        if self.iterations_done >= self.ode.n_iterations {
            return Err(OdeError::InvalidState("iteration budget exhausted"));
        }
        let cache = self
            .cache
            .as_ref()
            .ok_or(OdeError::InvalidState("primed context without coefficients"))?;

        let i = self.iterations_done;
        if i % PROGRESS_INTERVAL == 0 {
            progress.report(self.partition.rank, i);
        }
        relax(&mut self.halo, cache, self.ode.step);
        exchange_boundaries(comm, &self.partition, &mut self.halo)?;

        self.iterations_done += 1;
        self.phase = Phase::Iterating;
        Ok(())
    }

    /// Close the run: compute the global residual (a collective call) and
    /// mark the context done.
    pub fn finish<C: Comm + ?Sized>(&mut self, comm: &C) -> Result<SolveStats<f64>, OdeError> {
        if self.phase != Phase::Iterating || self.iterations_done != self.ode.n_iterations {
            return Err(OdeError::InvalidState("finish before the last iteration"));
        }
        let cache = self
            .cache
            .as_ref()
            .ok_or(OdeError::InvalidState("iterating context without coefficients"))?;
        let local = local_residual_sq(self.halo.current(), cache, self.ode.step);
        let final_residual = comm.all_reduce(local)?.sqrt();
        debug!(
            "rank {}: done after {} iterations, residual {:e}",
            self.partition.rank, self.iterations_done, final_residual
        );
        self.phase = Phase::Done;
        Ok(SolveStats { iterations: self.iterations_done, final_residual })
    }

    /// Run the whole solve: prime, iterate `n_iterations` times, finish.
    ///
    /// # Returns
    /// * `Ok(SolveStats)` once every iteration ran
    /// * `Err(OdeError)` on the first exchange failure; the run is then lost
    pub fn solve_context<C, P>(&mut self, comm: &C, progress: &mut P) -> Result<SolveStats<f64>, OdeError>
    where
        C: Comm + ?Sized,
        P: ProgressSink + ?Sized,
    {
        if self.phase == Phase::Uninitialized {
            self.prime()?;
        }
        while self.iterations_done < self.ode.n_iterations {
            self.step(comm, progress)?;
        }
        self.finish(comm)
    }

    /// Ghost value on `side` of the current buffer.
    pub fn ghost(&self, side: Side) -> f64 {
        self.halo.ghost(side)
    }

    /// Owned values of a finished run, releasing the cache and buffers.
    pub fn into_result(self) -> Result<Vec<f64>, OdeError> {
        if self.phase != Phase::Done {
            return Err(OdeError::InvalidState("result requested before the solve finished"));
        }
        Ok(self.halo.into_owned())
    }
}
