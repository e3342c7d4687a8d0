//! MPI-based communication.
//!
//! This module provides an implementation of the `Comm` trait over the
//! MPI world communicator, for runs launched with `mpiexec`. Each process
//! is one worker; its rank and the world size come from MPI.
//!
//! # Usage
//!
//! - `MpiComm::new` initializes MPI and keeps the `Universe` alive; MPI is
//!   finalized when the `MpiComm` is dropped.
//! - Neighbor exchanges use `MPI_Sendrecv`, so a paired send/receive never
//!   blocks on its own send.
//!
//! # Example
//! ```no_run
//! # #[cfg(feature = "mpi")]
//! # {
//! use jacobi_ode::parallel::{Comm, MpiComm};
//! let comm = MpiComm::new().unwrap();
//! println!("Rank: {} / {}", comm.rank(), comm.size());
//! comm.barrier().unwrap();
//! # }
//! ```

use mpi::collective::SystemOperation;
use mpi::environment::Universe;
use mpi::point_to_point as p2p;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use crate::error::OdeError;

/// MPI communicator wrapper for distributed runs.
///
/// Holds the world communicator, the rank of this process and the number
/// of processes.
pub struct MpiComm {
    /// The MPI world communicator (all processes in the job).
    pub world: SimpleCommunicator,
    /// The rank (ID) of this process within the communicator.
    pub rank: usize,
    /// The total number of processes in the communicator.
    pub size: usize,
    // dropped last: finalizes MPI
    _universe: Universe,
}

impl MpiComm {
    /// Initializes MPI and constructs a new `MpiComm` instance.
    ///
    /// # Errors
    /// Returns `OdeError::Runtime` if MPI was already initialized in this
    /// process.
    pub fn new() -> Result<Self, OdeError> {
        let universe = mpi::initialize()
            .ok_or_else(|| OdeError::Runtime("failed to init MPI: already initialized".into()))?;
        let world = universe.world();
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        Ok(MpiComm { world, rank, size, _universe: universe })
    }
}

impl super::Comm for MpiComm {
    /// Returns the rank (ID) of this process.
    fn rank(&self) -> usize { self.rank }
    /// Returns the total number of processes in the communicator.
    fn size(&self) -> usize { self.size }
    /// Synchronizes all processes at a barrier.
    fn barrier(&self) -> Result<(), OdeError> {
        self.world.barrier();
        Ok(())
    }

    /// Paired exchange of one `f64` with `peer`.
    ///
    /// MPI's default error handler aborts the job on transport failure, so
    /// a returned value is always a received one.
    fn sendrecv(&self, value: f64, peer: usize) -> Result<f64, OdeError> {
        if peer >= self.size {
            return Err(OdeError::Runtime(format!(
                "rank {} has no peer {peer} in a world of {}",
                self.rank, self.size
            )));
        }
        let process = self.world.process_at_rank(peer as i32);
        let mut received = 0.0_f64;
        p2p::send_receive_into(&value, &process, &mut received, &process);
        Ok(received)
    }

    /// Performs an all-reduce sum operation across all processes.
    ///
    /// Like `sendrecv`, a transport failure aborts the job inside MPI.
    fn all_reduce(&self, x: f64) -> Result<f64, OdeError> {
        let mut y = x;
        self.world.all_reduce_into(&x, &mut y, SystemOperation::sum());
        Ok(y)
    }

    /// Aborts every process in the job with `code`.
    fn abort(&self, code: i32) -> ! {
        self.world.abort(code)
    }
}
