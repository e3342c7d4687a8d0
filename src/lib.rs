//! jacobi-ode: distributed Jacobi relaxation for 1D boundary-value problems
//!
//! This crate solves `u'' + r(x) u = f(x)` on (0, 1) with `u(0) = u(1) = 0`
//! by finite differences and a fixed number of Jacobi sweeps. The mesh is
//! split into contiguous slices, one per worker; after every sweep workers
//! trade their edge values with their neighbors using a red/black ordering
//! that cannot deadlock. Workers are MPI processes (`mpi` feature) or
//! threads linked by bounded channels.

pub mod parallel;

pub mod config;
pub mod context;
pub mod core;
pub mod domain;
pub mod error;
pub mod io;
pub mod problem;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use crate::config::SolveOptions;
pub use crate::context::{Phase, WorkerContext};
pub use crate::core::traits::{ProgressSink, ScalarFn};
pub use crate::domain::{partition, HaloBuffer, Partition, Side, Sides};
pub use crate::error::OdeError;
pub use crate::parallel::{Comm, UniverseComm};
pub use crate::problem::{CoefficientCache, OdeProblem};

// Re-export SolveStats at the crate root for convenience
pub use crate::utils::convergence::SolveStats;

/// Solve `ode` on the worker behind `comm` and return its owned values with
/// the run statistics.
pub fn solve_worker<C, P>(
    comm: &C,
    ode: OdeProblem,
    progress: &mut P,
) -> Result<(Vec<f64>, SolveStats<f64>), OdeError>
where
    C: Comm + ?Sized,
    P: ProgressSink + ?Sized,
{
    let mut ctx = WorkerContext::for_comm(comm, ode)?;
    let stats = ctx.solve_context(comm, progress)?;
    Ok((ctx.into_result()?, stats))
}
