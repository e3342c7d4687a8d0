//! Communication between workers.
//!
//! The solver only ever needs a handful of operations: its own identity,
//! a paired scalar exchange with a neighbor, a global sum and a barrier.
//! `Comm` abstracts those so the same solve loop runs over MPI, over
//! in-process channels or on a single worker.

use crate::error::OdeError;

pub trait Comm {
    /// Rank of this worker, in `[0, size)`.
    fn rank(&self) -> usize;
    /// Number of workers in the group.
    fn size(&self) -> usize;
    /// Wait for every worker. Fails if a worker left the group first.
    fn barrier(&self) -> Result<(), OdeError>;
    /// Send `value` to `peer` and receive one value from the same peer, as
    /// a single paired operation.
    fn sendrecv(&self, value: f64, peer: usize) -> Result<f64, OdeError>;
    /// Sum of `x` over all workers, identical on every worker.
    fn all_reduce(&self, x: f64) -> Result<f64, OdeError>;
    /// Tear down the whole run. Never returns.
    fn abort(&self, _code: i32) -> ! {
        std::process::abort()
    }
}

#[cfg(feature = "mpi")]
pub mod mpi_comm;
#[cfg(feature = "mpi")]
pub use mpi_comm::MpiComm;

pub mod channel_comm;
pub use channel_comm::{run_workers, ChannelComm};

/// A group of one: both neighbors are physical boundaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialComm;

impl Comm for SerialComm {
    fn rank(&self) -> usize { 0 }
    fn size(&self) -> usize { 1 }
    fn barrier(&self) -> Result<(), OdeError> { Ok(()) }
    fn sendrecv(&self, _value: f64, peer: usize) -> Result<f64, OdeError> {
        Err(OdeError::Runtime(format!("single-worker run has no peer {peer}")))
    }
    fn all_reduce(&self, x: f64) -> Result<f64, OdeError> { Ok(x) }
}

pub enum UniverseComm {
    #[cfg(feature = "mpi")]
    Mpi(MpiComm),
    Channel(ChannelComm),
    Serial(SerialComm),
}

impl Comm for UniverseComm {
    fn rank(&self) -> usize {
        match self {
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.rank(),
            UniverseComm::Channel(comm) => comm.rank(),
            UniverseComm::Serial(comm) => comm.rank(),
        }
    }
    fn size(&self) -> usize {
        match self {
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.size(),
            UniverseComm::Channel(comm) => comm.size(),
            UniverseComm::Serial(comm) => comm.size(),
        }
    }
    fn barrier(&self) -> Result<(), OdeError> {
        match self {
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.barrier(),
            UniverseComm::Channel(comm) => comm.barrier(),
            UniverseComm::Serial(comm) => comm.barrier(),
        }
    }
    fn sendrecv(&self, value: f64, peer: usize) -> Result<f64, OdeError> {
        match self {
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.sendrecv(value, peer),
            UniverseComm::Channel(comm) => comm.sendrecv(value, peer),
            UniverseComm::Serial(comm) => comm.sendrecv(value, peer),
        }
    }
    fn all_reduce(&self, x: f64) -> Result<f64, OdeError> {
        match self {
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.all_reduce(x),
            UniverseComm::Channel(comm) => comm.all_reduce(x),
            UniverseComm::Serial(comm) => comm.all_reduce(x),
        }
    }
    fn abort(&self, code: i32) -> ! {
        match self {
            #[cfg(feature = "mpi")]
            UniverseComm::Mpi(comm) => comm.abort(code),
            UniverseComm::Channel(comm) => comm.abort(code),
            UniverseComm::Serial(comm) => comm.abort(code),
        }
    }
}

/// Split the machine's cores between `workers` in-process workers, so the
/// data-parallel sweeps do not oversubscribe. Only the first call takes
/// effect; later calls are ignored.
#[cfg(feature = "rayon")]
pub fn configure_sweep_threads(workers: usize) {
    let threads = (num_cpus::get() / workers.max(1)).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
