//! Numerical kernels: the Jacobi sweep, the ghost exchange and a direct
//! reference solver.

pub mod direct;
pub use direct::DirectSolver;

pub mod exchange;
pub use exchange::{exchange_boundaries, BOUNDARY_VALUE};

pub mod jacobi;
pub use jacobi::{relax, sweep};
