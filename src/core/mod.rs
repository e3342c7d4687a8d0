//! Core abstractions shared across the crate.

pub mod traits;

pub use traits::{ProgressSink, ScalarFn};
