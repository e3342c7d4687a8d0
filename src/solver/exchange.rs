//! Ghost refresh between neighboring workers.
//!
//! After each sweep, every worker sends its first owned value to the left
//! neighbor and its last owned value to the right neighbor, receiving the
//! matching ghosts in return. Ghosts on a physical boundary are reset to
//! the Dirichlet value instead.
//!
//! Each directional exchange is a blocking paired send/receive, so the
//! order in which a worker visits its neighbors matters: red (even) workers
//! go left then right, black (odd) workers right then left. Two neighbors
//! always have opposite colors and therefore reach their shared exchange in
//! the same step.

use crate::domain::{HaloBuffer, Partition, Side, Sides};
use crate::error::OdeError;
use crate::parallel::Comm;

/// `u(0) = u(1) = 0`.
pub const BOUNDARY_VALUE: f64 = 0.0;

/// Refresh one ghost: either the boundary value or a paired exchange with
/// the neighbor on `side`.
pub fn exchange_side<C: Comm + ?Sized>(
    comm: &C,
    part: &Partition,
    halo: &mut HaloBuffer,
    side: Side,
) -> Result<(), OdeError> {
    if part.boundary_sides().contains(Sides::from(side)) {
        halo.set_ghost(side, BOUNDARY_VALUE);
        return Ok(());
    }
    let peer = part
        .neighbor(side)
        .ok_or(OdeError::InvalidState("interior side without a neighbor"))?;
    let ghost = comm.sendrecv(halo.edge(side), peer)?;
    halo.set_ghost(side, ghost);
    Ok(())
}

/// Refresh both ghosts in red/black order.
pub fn exchange_boundaries<C: Comm + ?Sized>(
    comm: &C,
    part: &Partition,
    halo: &mut HaloBuffer,
) -> Result<(), OdeError> {
    for side in part.color().exchange_order() {
        exchange_side(comm, part, halo, side)?;
    }
    Ok(())
}
