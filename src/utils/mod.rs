//! Small helpers shared by the solver: worker coloring and residual stats.

pub mod coloring;
pub mod convergence;

pub use coloring::Color;
pub use convergence::SolveStats;
