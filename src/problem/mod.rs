//! The boundary-value problem `u'' + r(x) u = f(x)` on (0, 1), `u(0) = u(1) = 0`.
//!
//! The interval is discretized with `n_steps` interior points spaced
//! `step = 1 / (n_steps + 1)` apart. Interior point `g` (0-based) sits at
//! `x = step * (g + 1)`; the two boundary points at `x = 0` and `x = 1` are
//! not part of any worker's slice.

pub mod cache;

pub use cache::CoefficientCache;

use std::fmt;
use std::sync::Arc;

use crate::config::SolveOptions;
use crate::core::traits::ScalarFn;
use crate::error::OdeError;

/// `r(x) = -e^{-x}`.
pub fn default_r(x: f64) -> f64 {
    -(-x).exp()
}

/// `f(x) = cos(10 x)`.
pub fn default_f(x: f64) -> f64 {
    (10.0 * x).cos()
}

/// Immutable problem definition shared by every worker.
#[derive(Clone)]
pub struct OdeProblem {
    r: Arc<dyn ScalarFn>,
    f: Arc<dyn ScalarFn>,
    /// Number of interior mesh points.
    pub n_steps: usize,
    /// Mesh spacing `1 / (n_steps + 1)`.
    pub step: f64,
    /// Fixed number of relaxation sweeps.
    pub n_iterations: usize,
}

impl OdeProblem {
    pub fn new<R, F>(r: R, f: F, n_steps: usize, n_iterations: usize) -> Result<Self, OdeError>
    where
        R: ScalarFn + 'static,
        F: ScalarFn + 'static,
    {
        if n_steps == 0 {
            return Err(OdeError::Config("number of steps must be positive".into()));
        }
        if n_iterations == 0 {
            return Err(OdeError::Config("number of iterations must be positive".into()));
        }
        Ok(Self {
            r: Arc::new(r),
            f: Arc::new(f),
            n_steps,
            step: 1.0 / (n_steps as f64 + 1.0),
            n_iterations,
        })
    }

    /// The reference problem `r(x) = -e^{-x}`, `f(x) = cos(10 x)` sized by `opts`.
    pub fn from_options(opts: &SolveOptions) -> Result<Self, OdeError> {
        Self::new(default_r, default_f, opts.n_steps, opts.n_iterations)
    }

    /// Coordinate of interior point `global_index`.
    pub fn coordinate(&self, global_index: usize) -> f64 {
        self.step * (global_index + 1) as f64
    }

    pub fn r(&self, x: f64) -> f64 {
        self.r.eval(x)
    }

    pub fn f(&self, x: f64) -> f64 {
        self.f.eval(x)
    }
}

impl fmt::Debug for OdeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdeProblem")
            .field("r", &"<function>")
            .field("f", &"<function>")
            .field("n_steps", &self.n_steps)
            .field("step", &self.step)
            .field("n_iterations", &self.n_iterations)
            .finish()
    }
}
