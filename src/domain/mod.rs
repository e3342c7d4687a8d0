//! Mesh ownership: block partitioning and per-worker halo buffers.

pub mod halo;
pub mod partition;

pub use halo::HaloBuffer;
pub use partition::{partition, Partition, Side, Sides};
