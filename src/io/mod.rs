//! Result files.

pub mod output;

pub use output::{assemble_curve, output_path, ResultWriter};
