//! Command-line or API options for a solve run.
//!
//! This module provides the `SolveOptions` struct, which carries the
//! iteration count, the mesh granularity and the output file prefix. It is
//! parsed by clap in the binary and can be built directly in library code.

use clap::builder::TypedValueParser;
use clap::Args;

pub const DEFAULT_ITERATIONS: usize = 1_000_000;
pub const DEFAULT_STEPS: usize = 1_000;
pub const DEFAULT_OUTPUT_PREFIX: &str = "output";

/// Run parameters & output location.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct SolveOptions {
    /// Number of Jacobi iterations
    #[arg(short = 'n', long = "n-iterations", default_value_t = DEFAULT_ITERATIONS,
          value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize))]
    pub n_iterations: usize,

    /// Number of interior points in the discretization
    #[arg(short = 's', long = "n-steps", default_value_t = DEFAULT_STEPS,
          value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize))]
    pub n_steps: usize,

    /// Prefix of the output files; they'll be <prefix>0.dat, <prefix>1.dat, ...
    #[arg(short = 'o', long = "output-prefix", default_value = DEFAULT_OUTPUT_PREFIX)]
    pub output_prefix: String,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            n_iterations: DEFAULT_ITERATIONS,
            n_steps: DEFAULT_STEPS,
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
        }
    }
}

impl SolveOptions {
    pub fn with_iterations(mut self, n: usize) -> Self {
        self.n_iterations = n;
        self
    }

    pub fn with_steps(mut self, n: usize) -> Self {
        self.n_steps = n;
        self
    }

    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }
}
